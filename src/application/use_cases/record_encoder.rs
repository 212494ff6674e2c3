// ============================================================
// RECORD ENCODER
// ============================================================
// Type-directed encoding of outbound values against a live schema.
// Each logical field names its candidate keys, its value, and the
// declared kinds it can produce; anything that cannot be mapped is
// dropped silently. Only a fully empty outbound set is an error.

use chrono::{FixedOffset, Utc};
use std::collections::BTreeMap;
use std::fmt;

use crate::application::use_cases::schema_resolver::{resolve_key, resolve_title_key};
use crate::application::use_cases::value_decoder::parse_number;
use crate::domain::error::AppError;
use crate::domain::property::{
    OutboundDate, OutboundProperty, OutboundRun, OutboundSelect, PropertyKind, SchemaMap,
};

const TITLE_MAX_CHARS: usize = 200;
const RICH_TEXT_MAX_CHARS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// No logical field could be mapped onto the target schema.
    NoMappableProperties,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::NoMappableProperties => {
                write!(f, "Could not map any properties to the target schema")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl From<EncodeError> for AppError {
    fn from(err: EncodeError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

/// One logical field of a write request.
pub struct LogicalField {
    /// Acceptable schema-key spellings, in priority order.
    pub candidates: &'static [&'static str],
    /// Value to encode; empty values are skipped.
    pub value: String,
    /// Declared kinds this field knows how to produce.
    pub accepts: &'static [PropertyKind],
    /// Resolve via the schema's title-typed key before the candidate
    /// list (user-name style fields).
    pub prefer_title: bool,
}

impl LogicalField {
    pub fn new(
        candidates: &'static [&'static str],
        value: impl Into<String>,
        accepts: &'static [PropertyKind],
    ) -> Self {
        Self {
            candidates,
            value: value.into(),
            accepts,
            prefer_title: false,
        }
    }

    pub fn title_preferring(
        candidates: &'static [&'static str],
        value: impl Into<String>,
        accepts: &'static [PropertyKind],
    ) -> Self {
        Self {
            prefer_title: true,
            ..Self::new(candidates, value, accepts)
        }
    }
}

/// Encode all mappable logical fields against the schema. Partial
/// encoding is acceptable; an empty outbound set is not.
pub fn encode_properties(
    schema: &SchemaMap,
    fields: &[LogicalField],
) -> std::result::Result<BTreeMap<String, OutboundProperty>, EncodeError> {
    let mut props: BTreeMap<String, OutboundProperty> = BTreeMap::new();

    for field in fields {
        if field.value.trim().is_empty() {
            continue;
        }
        let key = if field.prefer_title {
            resolve_title_key(schema).or_else(|| resolve_key(schema, field.candidates))
        } else {
            resolve_key(schema, field.candidates)
        };
        let Some(key) = key else {
            continue;
        };
        if props.contains_key(&key) {
            continue;
        }
        let Some(kind) = schema.get(&key) else {
            continue;
        };
        if !field.accepts.contains(kind) {
            tracing::debug!(key = %key, kind = ?kind, "Skipping field with unsupported declared type");
            continue;
        }
        if let Some(encoded) = encode_for_kind(*kind, &field.value) {
            props.insert(key, encoded);
        }
    }

    if props.is_empty() {
        return Err(EncodeError::NoMappableProperties);
    }
    Ok(props)
}

fn encode_for_kind(kind: PropertyKind, value: &str) -> Option<OutboundProperty> {
    match kind {
        PropertyKind::Title => Some(OutboundProperty::Title(vec![OutboundRun::new(
            truncate_chars(value, TITLE_MAX_CHARS),
        )])),
        PropertyKind::RichText => Some(OutboundProperty::RichText(vec![OutboundRun::new(
            truncate_chars(value, RICH_TEXT_MAX_CHARS),
        )])),
        PropertyKind::Select => Some(OutboundProperty::Select(OutboundSelect {
            name: value.to_string(),
        })),
        PropertyKind::MultiSelect => Some(OutboundProperty::MultiSelect(vec![OutboundSelect {
            name: value.to_string(),
        }])),
        PropertyKind::PhoneNumber => Some(OutboundProperty::PhoneNumber(value.to_string())),
        PropertyKind::Date => Some(OutboundProperty::Date(OutboundDate {
            start: value.to_string(),
        })),
        // Never write a silent 0 over input that does not parse.
        PropertyKind::Number => parse_number(value).map(OutboundProperty::Number),
        _ => None,
    }
}

fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

/// Current instant rendered at fixed UTC+7, e.g.
/// `2024-05-01T17:03:09+07:00`. Independent of the host timezone.
pub fn bangkok_timestamp() -> String {
    let offset = FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset");
    Utc::now()
        .with_timezone(&offset)
        .format("%Y-%m-%dT%H:%M:%S%:z")
        .to_string()
}
