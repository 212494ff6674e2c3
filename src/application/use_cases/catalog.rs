// ============================================================
// CATALOG USE CASE
// ============================================================
// Read path: select the database partitions for the requested scope,
// fetch them concurrently, normalize every page, and merge results in
// declaration order. A failing partition degrades to an error marker
// instead of failing the whole response.

use serde::Serialize;
use std::sync::Arc;

use crate::application::use_cases::record_normalizer::RecordNormalizer;
use crate::domain::error::{AppError, Result};
use crate::domain::listing::Listing;
use crate::infrastructure::notion::ContentStore;

/// Which slice of the catalog a query asks for. Unknown input falls
/// back to `All`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Sale,
    Rent,
}

impl Scope {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "sale" => Scope::Sale,
            "rent" => Scope::Rent,
            _ => Scope::All,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionError {
    pub database_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOutcome {
    pub listings: Vec<Listing>,
    pub errors: Vec<PartitionError>,
}

pub struct CatalogUseCase {
    store: Arc<dyn ContentStore>,
    normalizer: Arc<RecordNormalizer>,
    sale_db: Option<String>,
    rent_db: Option<String>,
    single_db: Option<String>,
}

impl CatalogUseCase {
    pub fn new(
        store: Arc<dyn ContentStore>,
        normalizer: Arc<RecordNormalizer>,
        sale_db: Option<String>,
        rent_db: Option<String>,
        single_db: Option<String>,
    ) -> Self {
        Self {
            store,
            normalizer,
            sale_db,
            rent_db,
            single_db,
        }
    }

    /// Database ids to query for a scope, in merge order. A scoped
    /// request whose database is not configured widens to the full
    /// partition set rather than failing.
    fn partitions(&self, scope: Scope) -> Result<Vec<String>> {
        let ids: Vec<String> = match scope {
            Scope::Sale if self.sale_db.is_some() => self.sale_db.iter().cloned().collect(),
            Scope::Rent if self.rent_db.is_some() => self.rent_db.iter().cloned().collect(),
            _ => {
                let both: Vec<String> = self
                    .sale_db
                    .iter()
                    .chain(self.rent_db.iter())
                    .cloned()
                    .collect();
                if both.is_empty() {
                    self.single_db.iter().cloned().collect()
                } else {
                    both
                }
            }
        };
        if ids.is_empty() {
            return Err(AppError::ConfigError(
                "No database configured".to_string(),
            ));
        }
        Ok(ids)
    }

    pub async fn fetch(&self, scope: Scope) -> Result<CatalogOutcome> {
        let ids = self.partitions(scope)?;

        let mut handles = Vec::with_capacity(ids.len());
        for id in ids {
            let store = Arc::clone(&self.store);
            handles.push((
                id.clone(),
                tokio::spawn(async move { store.query_pages(&id).await }),
            ));
        }

        let mut listings = Vec::new();
        let mut errors = Vec::new();
        for (id, handle) in handles {
            let result = handle
                .await
                .map_err(|e| AppError::Internal(format!("Query task panicked: {}", e)))?;
            match result {
                Ok(pages) => {
                    listings.extend(
                        pages
                            .iter()
                            .filter_map(|page| self.normalizer.normalize(page)),
                    );
                }
                Err(err) => {
                    tracing::warn!(database_id = %id, error = %err, "Partition query failed");
                    errors.push(PartitionError {
                        database_id: id,
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            listings = listings.len(),
            failed_partitions = errors.len(),
            "Catalog fetch complete"
        );
        Ok(CatalogOutcome { listings, errors })
    }
}
