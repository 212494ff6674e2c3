// ============================================================
// CONFIGURATION
// ============================================================
// Environment-driven settings. Several variables grew alias spellings
// over deployments; all are accepted, with the first listed spelling
// winning.

use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;

use crate::domain::error::{AppError, Result};

const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Default, Deserialize)]
struct RawSettings {
    notion_token: Option<String>,
    sale_database_id: Option<String>,
    database_id_sale: Option<String>,
    rent_database_id: Option<String>,
    database_id_rent: Option<String>,
    database_id: Option<String>,
    leads_database_id: Option<String>,
    consultations_database_id: Option<String>,
    consult_db_id: Option<String>,
    consultation_database_id: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub notion_token: String,
    pub sale_db: Option<String>,
    pub rent_db: Option<String>,
    pub single_db: Option<String>,
    pub leads_db: Option<String>,
    pub consultations_db: Option<String>,
    pub port: u16,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RawSettings {
    fn resolve(self) -> Result<Settings> {
        let notion_token = non_empty(self.notion_token).ok_or_else(|| {
            AppError::ConfigError("NOTION_TOKEN is not set".to_string())
        })?;
        Ok(Settings {
            notion_token,
            sale_db: non_empty(self.sale_database_id).or(non_empty(self.database_id_sale)),
            rent_db: non_empty(self.rent_database_id).or(non_empty(self.database_id_rent)),
            single_db: non_empty(self.database_id),
            leads_db: non_empty(self.leads_database_id),
            consultations_db: non_empty(self.consultations_database_id)
                .or(non_empty(self.consult_db_id))
                .or(non_empty(self.consultation_database_id)),
            port: self.port.unwrap_or(DEFAULT_PORT),
        })
    }
}

impl Settings {
    /// Load from process environment. Fails fast when the API token is
    /// missing; database ids are checked at the point of use.
    pub fn from_env() -> Result<Self> {
        let raw: RawSettings = Figment::new()
            .merge(Env::raw())
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Invalid environment: {}", e)))?;
        raw.resolve()
    }
}
