// ============================================================
// PROPERTY VALUE DECODER
// ============================================================
// Total decode of one typed property value into a display string.
// Never fails: unrecoverable shapes yield "".

use crate::domain::property::{FormulaValue, PropertyValue, RollupValue};

const YES: &str = "Да";
const NO: &str = "Нет";

/// Decode one property value into its canonical display string.
pub fn decode_property(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Title { title } => join_runs(title),
        PropertyValue::RichText { rich_text } => join_runs(rich_text),
        PropertyValue::Select { select } => select
            .as_ref()
            .map(|opt| opt.name.clone())
            .unwrap_or_default(),
        PropertyValue::MultiSelect { multi_select } => multi_select
            .iter()
            .map(|opt| opt.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Number { number } => number.map(format_number).unwrap_or_default(),
        PropertyValue::Url { url } => url.clone().unwrap_or_default(),
        PropertyValue::Email { email } => email.clone().unwrap_or_default(),
        PropertyValue::PhoneNumber { phone_number } => {
            phone_number.clone().unwrap_or_default()
        }
        PropertyValue::Date { date } => date
            .as_ref()
            .map(|d| d.start.clone())
            .unwrap_or_default(),
        PropertyValue::Files { files } => files
            .iter()
            .map(|f| if f.name.is_empty() { "file" } else { f.name.as_str() })
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::People { people } => people
            .iter()
            .map(|p| p.name.as_deref().unwrap_or("user"))
            .collect::<Vec<_>>()
            .join(", "),
        PropertyValue::Checkbox { checkbox } => {
            if *checkbox { YES } else { NO }.to_string()
        }
        PropertyValue::UniqueId { unique_id } => match unique_id {
            Some(uid) => match (uid.prefix.as_deref(), uid.number) {
                (Some(prefix), Some(number)) if !prefix.is_empty() => {
                    format!("{}-{}", prefix, number)
                }
                (Some(prefix), None) => prefix.to_string(),
                (_, Some(number)) => number.to_string(),
                _ => String::new(),
            },
            None => String::new(),
        },
        PropertyValue::CreatedTime { created_time } => created_time.clone(),
        PropertyValue::LastEditedTime { last_edited_time } => last_edited_time.clone(),
        PropertyValue::Formula { formula } => formula
            .as_ref()
            .map(decode_formula)
            .unwrap_or_default(),
        PropertyValue::Rollup { rollup } => rollup
            .as_ref()
            .map(decode_rollup)
            .unwrap_or_default(),
        PropertyValue::Unknown(raw) => probe_display_text(raw),
    }
}

// Unrecognized tags still get one chance: the payload under the tag
// key may carry a generic `plain_text` field.
fn probe_display_text(raw: &serde_json::Value) -> String {
    raw.get("type")
        .and_then(serde_json::Value::as_str)
        .and_then(|tag| raw.get(tag))
        .and_then(|payload| payload.get("plain_text"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("")
        .to_string()
}

/// Numeric value of a property: a number payload passes through,
/// anything else is decoded to text and coerced.
pub fn decode_numeric(value: &PropertyValue) -> f64 {
    match value {
        PropertyValue::Number { number: Some(n) } => *n,
        other => coerce_number(&decode_property(other)),
    }
}

/// Coerce arbitrary text into a number: strip every character outside
/// `[0-9.]`, then parse. Invalid or empty input yields 0. Total by
/// contract; also used directly by price resolution.
pub fn coerce_number(text: &str) -> f64 {
    parse_number(text).unwrap_or(0.0)
}

/// Fallible variant of [`coerce_number`] for callers that must not
/// treat unparseable input as zero.
pub fn parse_number(text: &str) -> Option<f64> {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    digits.parse::<f64>().ok()
}

fn join_runs(runs: &[crate::domain::property::RichTextRun]) -> String {
    runs.iter()
        .map(|run| run.plain_text.as_str())
        .collect::<String>()
        .trim()
        .to_string()
}

fn decode_formula(formula: &FormulaValue) -> String {
    match formula {
        FormulaValue::String { string } => {
            string.as_deref().unwrap_or("").trim().to_string()
        }
        FormulaValue::Number { number } => number.map(format_number).unwrap_or_default(),
        FormulaValue::Boolean { boolean } => if *boolean { YES } else { NO }.to_string(),
        FormulaValue::Date { date } => date
            .as_ref()
            .map(|d| d.start.clone())
            .unwrap_or_default(),
        FormulaValue::Unsupported => String::new(),
    }
}

fn decode_rollup(rollup: &RollupValue) -> String {
    match rollup {
        RollupValue::Number { number } => number.map(format_number).unwrap_or_default(),
        RollupValue::Date { date } => date
            .as_ref()
            .map(|d| d.start.clone())
            .unwrap_or_default(),
        RollupValue::Array { array } => array
            .iter()
            .map(decode_property)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        RollupValue::Unsupported => String::new(),
    }
}

// Whole numbers render without a trailing ".0".
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
