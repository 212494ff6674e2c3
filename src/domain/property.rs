// ============================================================
// PROPERTY MODEL
// ============================================================
// Typed model of the content store's per-record property bag and
// per-database schema. No I/O; serde shapes follow the Notion wire
// format (tag field selects the payload key).

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record's field-name -> typed-value mapping, as delivered by the
/// content store. Consumed once by the normalizer, never retained.
pub type PropertyBag = BTreeMap<String, PropertyValue>;

/// Field-name -> declared type mapping for one database, fetched fresh
/// before every write.
pub type SchemaMap = BTreeMap<String, PropertyKind>;

/// A single typed property value. The `type` tag selects which payload
/// shape is valid; tags this build does not know about fall into
/// `Unknown` carrying the raw value, which the decoder probes for a
/// generic `plain_text` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropertyValue {
    Title {
        #[serde(default)]
        title: Vec<RichTextRun>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<RichTextRun>,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    MultiSelect {
        #[serde(default)]
        multi_select: Vec<SelectOption>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Email {
        #[serde(default)]
        email: Option<String>,
    },
    PhoneNumber {
        #[serde(default)]
        phone_number: Option<String>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Files {
        #[serde(default)]
        files: Vec<FileRef>,
    },
    People {
        #[serde(default)]
        people: Vec<Person>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    UniqueId {
        #[serde(default)]
        unique_id: Option<UniqueId>,
    },
    CreatedTime {
        #[serde(default)]
        created_time: String,
    },
    LastEditedTime {
        #[serde(default)]
        last_edited_time: String,
    },
    Formula {
        #[serde(default)]
        formula: Option<FormulaValue>,
    },
    Rollup {
        #[serde(default)]
        rollup: Option<RollupValue>,
    },
    // Constructed only by `deserialize_bag`; never deserialized
    // directly.
    #[serde(skip)]
    Unknown(serde_json::Value),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichTextRun {
    #[serde(default)]
    pub plain_text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DateValue {
    #[serde(default)]
    pub start: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub file: Option<FileLink>,
    #[serde(default)]
    pub external: Option<FileLink>,
}

impl FileRef {
    /// Hosted-file URL, preferring the store-managed link over the
    /// external one.
    pub fn url(&self) -> &str {
        self.file
            .as_ref()
            .or(self.external.as_ref())
            .map(|link| link.url.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileLink {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniqueId {
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub number: Option<i64>,
}

/// Formula payload, tagged by the formula's declared result kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormulaValue {
    String {
        #[serde(default)]
        string: Option<String>,
    },
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Boolean {
        #[serde(default)]
        boolean: bool,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    #[serde(other)]
    Unsupported,
}

/// Rollup payload. The `array` kind nests full property values.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RollupValue {
    Number {
        #[serde(default)]
        number: Option<f64>,
    },
    Date {
        #[serde(default)]
        date: Option<DateValue>,
    },
    Array {
        #[serde(default)]
        array: Vec<PropertyValue>,
    },
    #[serde(other)]
    Unsupported,
}

/// Declared type tag of one schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Title,
    RichText,
    Select,
    MultiSelect,
    Number,
    Url,
    Email,
    PhoneNumber,
    Date,
    Files,
    People,
    Checkbox,
    UniqueId,
    CreatedTime,
    LastEditedTime,
    Formula,
    Rollup,
    #[serde(other)]
    Other,
}

/// One inbound record: page identity plus its property bag.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcePage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_bag")]
    pub properties: PropertyBag,
}

// A malformed or unrecognized value must degrade to `Unknown`, never
// fail the whole page, so each entry is decoded individually with the
// raw value retained for the decoder's generic probe.
fn deserialize_bag<'de, D>(deserializer: D) -> std::result::Result<PropertyBag, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: BTreeMap<String, serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let parsed = serde_json::from_value(value.clone())
                .unwrap_or(PropertyValue::Unknown(value));
            (name, parsed)
        })
        .collect())
}

// ---- outbound shapes ----

/// One outbound property payload for a page-creation request.
/// External tagging yields the store's wire shapes directly, e.g.
/// `{"select":{"name":"..."}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundProperty {
    Title(Vec<OutboundRun>),
    RichText(Vec<OutboundRun>),
    Select(OutboundSelect),
    MultiSelect(Vec<OutboundSelect>),
    PhoneNumber(String),
    Date(OutboundDate),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundRun {
    pub text: OutboundText,
}

impl OutboundRun {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            text: OutboundText {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundText {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundSelect {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundDate {
    pub start: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_tagged_values() {
        let json = r#"{
            "Цена": { "type": "number", "number": 120000 },
            "Статус": { "type": "select", "select": { "name": "Сдан" } },
            "Название": { "type": "title", "title": [ { "plain_text": "Villa" } ] }
        }"#;
        let bag: BTreeMap<String, serde_json::Value> = serde_json::from_str(json).unwrap();
        let price: PropertyValue = serde_json::from_value(bag["Цена"].clone()).unwrap();
        assert!(matches!(price, PropertyValue::Number { number: Some(n) } if n == 120000.0));
        let status: PropertyValue = serde_json::from_value(bag["Статус"].clone()).unwrap();
        match status {
            PropertyValue::Select { select: Some(opt) } => assert_eq!(opt.name, "Сдан"),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_tag_retains_raw_value() {
        let json = r#"{
            "id": "abc",
            "properties": {
                "Связь": { "type": "relation", "relation": [] }
            }
        }"#;
        let page: SourcePage = serde_json::from_str(json).unwrap();
        match &page.properties["Связь"] {
            PropertyValue::Unknown(raw) => assert_eq!(raw["type"], "relation"),
            other => panic!("unexpected value: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_entry_degrades_not_fails() {
        let json = r#"{
            "id": "abc",
            "properties": {
                "Хорошее": { "type": "checkbox", "checkbox": true },
                "Сломанное": 42
            }
        }"#;
        let page: SourcePage = serde_json::from_str(json).unwrap();
        assert!(matches!(
            page.properties["Хорошее"],
            PropertyValue::Checkbox { checkbox: true }
        ));
        assert!(matches!(
            page.properties["Сломанное"],
            PropertyValue::Unknown(_)
        ));
    }

    #[test]
    fn test_outbound_wire_shapes() {
        let select = OutboundProperty::Select(OutboundSelect {
            name: "сайт".to_string(),
        });
        assert_eq!(
            serde_json::to_string(&select).unwrap(),
            r#"{"select":{"name":"сайт"}}"#
        );

        let title = OutboundProperty::Title(vec![OutboundRun::new("Анна")]);
        assert_eq!(
            serde_json::to_string(&title).unwrap(),
            r#"{"title":[{"text":{"content":"Анна"}}]}"#
        );

        let phone = OutboundProperty::PhoneNumber("+79161234567".to_string());
        assert_eq!(
            serde_json::to_string(&phone).unwrap(),
            r#"{"phone_number":"+79161234567"}"#
        );
    }

    #[test]
    fn test_schema_kind_parsing() {
        let kind: PropertyKind = serde_json::from_str(r#""multi_select""#).unwrap();
        assert_eq!(kind, PropertyKind::MultiSelect);
        let kind: PropertyKind = serde_json::from_str(r#""status""#).unwrap();
        assert_eq!(kind, PropertyKind::Other);
    }
}
