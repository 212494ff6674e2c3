// ============================================================
// INTAKE USE CASES
// ============================================================
// Write path: validate the submission, normalize the phone, fetch the
// target database schema fresh, and encode whatever logical fields the
// schema can absorb. Validation fails before any remote call is made.

use serde::Deserialize;
use std::sync::Arc;

use crate::application::use_cases::record_encoder::{
    bangkok_timestamp, encode_properties, LogicalField,
};
use crate::domain::error::{AppError, Result};
use crate::domain::phone::{normalize_phone, PhoneRules};
use crate::domain::property::PropertyKind;
use crate::infrastructure::notion::ContentStore;

const SOURCE_VALUE: &str = "сайт";

const NAME_CANDIDATES: &[&str] = &[
    "пользователь",
    "имя",
    "client",
    "клиент",
    "name",
    "название",
];
const PROPERTY_TITLE_CANDIDATES: &[&str] = &[
    "объект",
    "объект/проект",
    "объект или проект",
    "project",
    "property",
    "object",
];
// Spellings observed in live databases, including trailing-space and
// misspelled variants.
const PROPERTY_ID_CANDIDATES: &[&str] = &[
    "id объекта",
    "id обьекта",
    "id объекта ",
    "id обьекта ",
    "id обекта",
    "id",
    "object id",
    "external id",
    "object external id",
    "ид объекта",
    "ид обьекта",
];
const DATE_CANDIDATES: &[&str] = &["дата", "date", "created date"];
const DEAL_TYPE_CANDIDATES: &[&str] = &["тип сделки", "вид сделки", "deal type"];
const SOURCE_CANDIDATES: &[&str] = &["источник", "source"];
const PHONE_CANDIDATES: &[&str] = &["телефон", "phone", "номер", "phone number"];
const CONTACT_METHOD_CANDIDATES: &[&str] = &[
    "способ связи",
    "contact method",
    "contact",
    "preferred contact",
];
const CONSULT_NAME_CANDIDATES: &[&str] = &["имя", "name"];

const TEXTUAL: &[PropertyKind] = &[PropertyKind::Title, PropertyKind::RichText];
const TEXTUAL_REVERSED: &[PropertyKind] = &[PropertyKind::RichText, PropertyKind::Title];
const ID_KINDS: &[PropertyKind] = &[
    PropertyKind::RichText,
    PropertyKind::Select,
    PropertyKind::MultiSelect,
    PropertyKind::Title,
    PropertyKind::Number,
];
const DATE_KINDS: &[PropertyKind] = &[PropertyKind::Date, PropertyKind::RichText];
const SELECTABLE: &[PropertyKind] = &[
    PropertyKind::Select,
    PropertyKind::MultiSelect,
    PropertyKind::RichText,
];
const DEAL_KINDS: &[PropertyKind] = &[PropertyKind::Select, PropertyKind::RichText];
const PHONE_KINDS: &[PropertyKind] = &[PropertyKind::PhoneNumber, PropertyKind::RichText];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub contact_method: String,
    #[serde(default)]
    pub property_title: String,
    #[serde(default)]
    pub deal_type: String,
    #[serde(default)]
    pub property_object_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

fn require_name_and_phone(name: &str, phone: &str) -> Result<()> {
    if name.trim().is_empty() || phone.trim().is_empty() {
        return Err(AppError::ValidationError(
            "name and phone required".to_string(),
        ));
    }
    Ok(())
}

fn normalize_submitted_phone(phone: &str) -> Result<String> {
    normalize_phone(phone, &PhoneRules::server())
        .map(|p| p.into_string())
        .map_err(|e| AppError::ValidationError(e.to_string()))
}

pub struct LeadIntakeUseCase {
    store: Arc<dyn ContentStore>,
    database_id: String,
}

impl LeadIntakeUseCase {
    pub fn new(store: Arc<dyn ContentStore>, database_id: String) -> Self {
        Self { store, database_id }
    }

    pub async fn submit(&self, request: LeadRequest) -> Result<String> {
        require_name_and_phone(&request.name, &request.phone)?;
        let phone = normalize_submitted_phone(&request.phone)?;

        let schema = self.store.fetch_schema(&self.database_id).await?;
        let fields = [
            LogicalField::title_preferring(NAME_CANDIDATES, request.name.trim(), TEXTUAL),
            LogicalField::new(
                PROPERTY_TITLE_CANDIDATES,
                request.property_title.trim(),
                TEXTUAL_REVERSED,
            ),
            LogicalField::new(
                PROPERTY_ID_CANDIDATES,
                request.property_object_id.trim(),
                ID_KINDS,
            ),
            LogicalField::new(DATE_CANDIDATES, bangkok_timestamp(), DATE_KINDS),
            LogicalField::new(DEAL_TYPE_CANDIDATES, request.deal_type.trim(), DEAL_KINDS),
            LogicalField::new(SOURCE_CANDIDATES, SOURCE_VALUE, SELECTABLE),
            LogicalField::new(PHONE_CANDIDATES, phone, PHONE_KINDS),
            LogicalField::new(
                CONTACT_METHOD_CANDIDATES,
                request.contact_method.trim(),
                SELECTABLE,
            ),
        ];
        let properties = encode_properties(&schema, &fields)?;

        let id = self.store.create_page(&self.database_id, properties).await?;
        tracing::info!(page_id = %id, "Lead recorded");
        Ok(id)
    }
}

pub struct ConsultationIntakeUseCase {
    store: Arc<dyn ContentStore>,
    database_id: String,
}

impl ConsultationIntakeUseCase {
    pub fn new(store: Arc<dyn ContentStore>, database_id: String) -> Self {
        Self { store, database_id }
    }

    pub async fn submit(&self, request: ConsultationRequest) -> Result<String> {
        require_name_and_phone(&request.name, &request.phone)?;
        let phone = normalize_submitted_phone(&request.phone)?;

        let schema = self.store.fetch_schema(&self.database_id).await?;
        let fields = [
            LogicalField::title_preferring(CONSULT_NAME_CANDIDATES, request.name.trim(), TEXTUAL),
            // A separate name column beside the title key gets the name
            // mirrored into it; an occupied title key is skipped.
            LogicalField::new(CONSULT_NAME_CANDIDATES, request.name.trim(), TEXTUAL_REVERSED),
            LogicalField::new(PHONE_CANDIDATES, phone, PHONE_KINDS),
            LogicalField::new(SOURCE_CANDIDATES, SOURCE_VALUE, SELECTABLE),
            LogicalField::new(DATE_CANDIDATES, bangkok_timestamp(), DATE_KINDS),
        ];
        let properties = encode_properties(&schema, &fields)?;

        let id = self.store.create_page(&self.database_id, properties).await?;
        tracing::info!(page_id = %id, "Consultation recorded");
        Ok(id)
    }
}
