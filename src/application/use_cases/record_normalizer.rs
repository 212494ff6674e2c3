// ============================================================
// RECORD NORMALIZER
// ============================================================
// Assemble a normalized listing from one raw property bag. Ordered
// candidate lists tolerate renamed and localized columns; decode
// failures degrade to empty values. Only a missing title drops the
// record.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::use_cases::value_decoder::{
    coerce_number, decode_numeric, decode_property,
};
use crate::domain::listing::Listing;
use crate::domain::property::{PropertyBag, PropertyValue, SourcePage};

const TITLE_CANDIDATES: &[&str] = &["Название проекта", "Название", "Title", "Name"];
const DEAL_TYPE_CANDIDATES: &[&str] = &["Тип сделки"];
const CATEGORY_CANDIDATES: &[&str] = &["Статус", "Категория"];
const PROPERTY_TYPE_CANDIDATES: &[&str] = &["Тип недвижимости"];
const DISTRICT_CANDIDATES: &[&str] =
    &["Район", "район", "Город", "город", "Локация", "локация"];
const PRICE_CANDIDATES: &[&str] = &["Цена"];
const IMAGE_CANDIDATES: &[&str] = &["Фото", "Изображение"];
const LINK_CANDIDATES: &[&str] = &["Ссылка", "URL"];
const DESCRIPTION_CANDIDATES: &[&str] = &["Описание", "Description"];
const CONDITIONS_CANDIDATES: &[&str] = &["Условия", "Conditions", "Оплата"];

/// Per-unit-type price columns, scanned in this order when no
/// dedicated price resolves. The minimum positive value wins
/// ("starting from" pricing for multi-unit sale listings).
const TYPOLOGY_PRICE_CANDIDATES: &[&str] = &[
    "Студия (THB)",
    "1BR (THB)",
    "2BR (THB)",
    "3BR (THB)",
    "Пентхаус (THB)",
];

/// Id-like columns, in resolution priority order.
const EXTERNAL_ID_CANDIDATES: &[&str] = &[
    "id",
    "ID",
    "Id",
    "№",
    "No",
    "Номер",
    "Номер объекта",
    "ID объекта",
    "Id объекта",
    "Id Объекта",
    "ID обьекта",
    "Id обьекта",
    "Object ID",
    "ObjectId",
    "External ID",
    "External Id",
];

/// Echo-map key carrying the resolved external id for display.
const PARSED_ID_KEY: &str = "ID объекта (parsed)";

static HTTP_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?:").unwrap());

/// Hook applied to a resolved image URL before it lands on the
/// listing (e.g. rewriting share links to direct-download form).
pub type LinkRewriter = Arc<dyn Fn(&str) -> String + Send + Sync>;

pub struct RecordNormalizer {
    link_rewriter: LinkRewriter,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordNormalizer {
    /// Normalizer with an identity image-link hook.
    pub fn new() -> Self {
        Self {
            link_rewriter: Arc::new(|url: &str| url.to_string()),
        }
    }

    pub fn with_link_rewriter(link_rewriter: LinkRewriter) -> Self {
        Self { link_rewriter }
    }

    /// Normalize one source page. Returns `None` when no title
    /// resolves; the record is dropped, not defaulted.
    pub fn normalize(&self, page: &SourcePage) -> Option<Listing> {
        let bag = &page.properties;

        let title = resolve_candidate(bag, TITLE_CANDIDATES)
            .map(decode_property)
            .unwrap_or_default();
        if title.is_empty() {
            tracing::debug!(page_id = %page.id, "Dropping page without resolvable title");
            return None;
        }

        let deal_type =
            canonicalize_deal_type(&decode_first_nonempty(bag, DEAL_TYPE_CANDIDATES));

        let mut category =
            canonicalize_category(&decode_first_nonempty(bag, CATEGORY_CANDIDATES));
        if category.is_empty() {
            category = decode_first_nonempty(bag, PROPERTY_TYPE_CANDIDATES);
        }

        let (price, currency) = resolve_price(bag);
        let district = decode_first_nonempty(bag, DISTRICT_CANDIDATES);
        let image_url = self.resolve_image_url(bag);
        let url = resolve_listing_url(bag, page);
        let description = decode_first_nonempty(bag, DESCRIPTION_CANDIDATES);
        let conditions = decode_first_nonempty(bag, CONDITIONS_CANDIDATES);
        let ext_id = decode_first_nonempty(bag, EXTERNAL_ID_CANDIDATES);

        let mut all_props: BTreeMap<String, String> = bag
            .iter()
            .map(|(name, value)| (name.clone(), decode_property(value)))
            .collect();
        if !ext_id.is_empty() {
            all_props.insert(PARSED_ID_KEY.to_string(), ext_id.clone());
        }

        Some(Listing {
            id: page.id.clone(),
            ext_id,
            title,
            deal_type,
            category,
            district,
            price,
            currency,
            image_url,
            url,
            description,
            conditions,
            created_time: page.created_time.clone().unwrap_or_default(),
            all_props,
        })
    }

    // Priority: url-typed field, then a text field holding an http(s)
    // URL, then the first attached file.
    fn resolve_image_url(&self, bag: &PropertyBag) -> String {
        for name in IMAGE_CANDIDATES {
            if let Some(PropertyValue::Url { url: Some(url) }) = lookup(bag, name) {
                if !url.is_empty() {
                    return (self.link_rewriter)(url);
                }
            }
        }

        for name in IMAGE_CANDIDATES {
            if let Some(value @ PropertyValue::RichText { .. }) = lookup(bag, name) {
                let text = decode_property(value);
                if HTTP_URL.is_match(&text) {
                    return (self.link_rewriter)(&text);
                }
            }
        }

        for name in IMAGE_CANDIDATES {
            if let Some(PropertyValue::Files { files }) = lookup(bag, name) {
                if let Some(first) = files.first() {
                    let url = first.url();
                    if !url.is_empty() {
                        return (self.link_rewriter)(url);
                    }
                }
            }
        }

        String::new()
    }
}

/// Canonicalize a deal-type value: known substring markers map onto
/// the fixed labels, bare rent defaults to long-term, anything else
/// passes through trimmed.
pub fn canonicalize_deal_type(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_lowercase();
    if lower.contains("продаж") {
        return "Продажа".to_string();
    }
    if lower.contains("аренда") {
        if lower.contains("долгосроч") {
            return "Аренда долгосрочная".to_string();
        }
        if lower.contains("краткосроч") {
            return "Аренда краткосрочная".to_string();
        }
        return "Аренда долгосрочная".to_string();
    }
    trimmed.to_string()
}

/// Canonicalize a construction-status value via exact match after
/// lowercase+trim; unrecognized values pass through trimmed.
pub fn canonicalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "сдан" => "Сданные".to_string(),
        "строится" => "Строящиеся".to_string(),
        _ => trimmed.to_string(),
    }
}

// Ordered price resolution: dedicated numeric field, then text
// coercion with currency markers, then the typology-column minimum.
fn resolve_price(bag: &PropertyBag) -> (f64, String) {
    if let Some(PropertyValue::Number { number: Some(n) }) =
        resolve_candidate(bag, PRICE_CANDIDATES)
    {
        if *n != 0.0 {
            return (*n, String::new());
        }
    }

    if let Some(value) = resolve_candidate(bag, PRICE_CANDIDATES) {
        let text = decode_property(value);
        let coerced = coerce_number(&text);
        if coerced != 0.0 {
            return (coerced, detect_currency(&text));
        }
    }

    let minimum = TYPOLOGY_PRICE_CANDIDATES
        .iter()
        .filter_map(|name| lookup(bag, name))
        .map(decode_numeric)
        .filter(|n| *n > 0.0)
        .fold(f64::INFINITY, f64::min);
    if minimum.is_finite() {
        return (minimum, "THB".to_string());
    }

    (0.0, String::new())
}

fn detect_currency(text: &str) -> String {
    let lower = text.to_lowercase();
    if lower.contains("thb") || lower.contains('฿') || lower.contains("бат") {
        "THB".to_string()
    } else {
        String::new()
    }
}

fn resolve_listing_url(bag: &PropertyBag, page: &SourcePage) -> String {
    for name in LINK_CANDIDATES {
        if let Some(PropertyValue::Url { url: Some(url) }) = lookup(bag, name) {
            if !url.is_empty() {
                return url.clone();
            }
        }
    }
    page.url.clone().unwrap_or_default()
}

fn lookup<'a>(bag: &'a PropertyBag, name: &str) -> Option<&'a PropertyValue> {
    bag.get(name)
}

/// First candidate present in the bag: exact-case pass over the whole
/// list, then a case-insensitive pass against a lowercase-keyed index.
pub fn resolve_candidate<'a>(
    bag: &'a PropertyBag,
    candidates: &[&str],
) -> Option<&'a PropertyValue> {
    for name in candidates {
        if let Some(value) = bag.get(*name) {
            return Some(value);
        }
    }
    let index: BTreeMap<String, &PropertyValue> = bag
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect();
    for name in candidates {
        if let Some(value) = index.get(&name.to_lowercase()) {
            return Some(value);
        }
    }
    None
}

/// First candidate whose decoded value is non-empty: exact-case pass,
/// then the case-insensitive pass. Order in the candidate list is the
/// priority order.
pub fn decode_first_nonempty(bag: &PropertyBag, candidates: &[&str]) -> String {
    for name in candidates {
        if let Some(value) = bag.get(*name) {
            let decoded = decode_property(value);
            if !decoded.is_empty() {
                return decoded;
            }
        }
    }
    let index: BTreeMap<String, &PropertyValue> = bag
        .iter()
        .map(|(name, value)| (name.to_lowercase(), value))
        .collect();
    for name in candidates {
        if let Some(value) = index.get(&name.to_lowercase()) {
            let decoded = decode_property(value);
            if !decoded.is_empty() {
                return decoded;
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::property::{FileLink, FileRef, RichTextRun, SelectOption};

    fn title_value(text: &str) -> PropertyValue {
        PropertyValue::Title {
            title: vec![RichTextRun {
                plain_text: text.to_string(),
            }],
        }
    }

    fn rich_text(text: &str) -> PropertyValue {
        PropertyValue::RichText {
            rich_text: vec![RichTextRun {
                plain_text: text.to_string(),
            }],
        }
    }

    fn select(name: &str) -> PropertyValue {
        PropertyValue::Select {
            select: Some(SelectOption {
                name: name.to_string(),
            }),
        }
    }

    fn number(n: f64) -> PropertyValue {
        PropertyValue::Number { number: Some(n) }
    }

    fn page(props: Vec<(&str, PropertyValue)>) -> SourcePage {
        SourcePage {
            id: "page-1".to_string(),
            url: Some("https://notion.so/page-1".to_string()),
            created_time: Some("2024-05-01T00:00:00.000Z".to_string()),
            properties: props
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn test_missing_title_drops_record() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![("Цена", number(100.0))]);
        assert!(normalizer.normalize(&page).is_none());
    }

    #[test]
    fn test_deal_type_canonicalization() {
        assert_eq!(canonicalize_deal_type("Продажа вилл"), "Продажа");
        assert_eq!(
            canonicalize_deal_type("Аренда (долгосрочная)"),
            "Аренда долгосрочная"
        );
        assert_eq!(
            canonicalize_deal_type("аренда краткосрочная"),
            "Аренда краткосрочная"
        );
        // Bare rent defaults to long-term.
        assert_eq!(canonicalize_deal_type("Аренда"), "Аренда долгосрочная");
        assert_eq!(canonicalize_deal_type("Обмен"), "Обмен");
    }

    #[test]
    fn test_deal_type_canonicalization_idempotent() {
        for label in ["Продажа", "Аренда долгосрочная", "Аренда краткосрочная"] {
            assert_eq!(canonicalize_deal_type(label), label);
        }
    }

    #[test]
    fn test_category_canonicalization() {
        assert_eq!(canonicalize_category("Сдан"), "Сданные");
        assert_eq!(canonicalize_category(" строится "), "Строящиеся");
        assert_eq!(canonicalize_category("Сданные"), "Сданные");
        assert_eq!(canonicalize_category("Вилла"), "Вилла");
    }

    #[test]
    fn test_price_from_dedicated_number() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("Цена", number(45000.0)),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.price, 45000.0);
        assert_eq!(listing.currency, "");
    }

    #[test]
    fn test_price_from_text_with_currency_marker() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("Цена", rich_text("120,000 THB в месяц")),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.price, 120000.0);
        assert_eq!(listing.currency, "THB");
    }

    #[test]
    fn test_price_typology_minimum_not_first() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("Студия (THB)", rich_text("3 000 000")),
            ("1BR (THB)", number(2500000.0)),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.price, 2500000.0);
        assert_eq!(listing.currency, "THB");
    }

    #[test]
    fn test_price_absent_stays_zero() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![("Название", title_value("A"))]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.price, 0.0);
        assert_eq!(listing.currency, "");
    }

    #[test]
    fn test_external_id_candidate_order() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("№", rich_text("77")),
            ("id", rich_text("OBJ-1")),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.ext_id, "OBJ-1");
        assert_eq!(listing.all_props["ID объекта (parsed)"], "OBJ-1");
    }

    #[test]
    fn test_external_id_case_insensitive_second_pass() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("нОМЕР ОБЪЕКТА", rich_text("15")),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.ext_id, "15");
    }

    #[test]
    fn test_external_id_never_synthesized() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![("Название", title_value("A"))]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.ext_id, "");
        assert!(!listing.all_props.contains_key("ID объекта (parsed)"));
    }

    #[test]
    fn test_district_fallback_order() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("Город", select("Пхукет")),
            ("Район", select("Банг Тао")),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.district, "Банг Тао");
    }

    #[test]
    fn test_image_url_priority() {
        let normalizer = RecordNormalizer::new();
        let with_url = page(vec![
            ("Название", title_value("A")),
            (
                "Фото",
                PropertyValue::Url {
                    url: Some("https://example.com/a.jpg".to_string()),
                },
            ),
            (
                "Изображение",
                PropertyValue::Files {
                    files: vec![FileRef {
                        name: "b.jpg".to_string(),
                        file: Some(FileLink {
                            url: "https://example.com/b.jpg".to_string(),
                        }),
                        external: None,
                    }],
                },
            ),
        ]);
        let listing = normalizer.normalize(&with_url).unwrap();
        assert_eq!(listing.image_url, "https://example.com/a.jpg");

        let with_text = page(vec![
            ("Название", title_value("A")),
            ("Фото", rich_text("https://example.com/c.jpg")),
        ]);
        let listing = normalizer.normalize(&with_text).unwrap();
        assert_eq!(listing.image_url, "https://example.com/c.jpg");

        let non_url_text = page(vec![
            ("Название", title_value("A")),
            ("Фото", rich_text("смотреть в альбоме")),
        ]);
        let listing = normalizer.normalize(&non_url_text).unwrap();
        assert_eq!(listing.image_url, "");
    }

    #[test]
    fn test_image_url_passes_through_rewriter() {
        let normalizer = RecordNormalizer::with_link_rewriter(Arc::new(|url: &str| {
            format!("{}?rewritten", url)
        }));
        let page = page(vec![
            ("Название", title_value("A")),
            (
                "Фото",
                PropertyValue::Url {
                    url: Some("https://example.com/a.jpg".to_string()),
                },
            ),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.image_url, "https://example.com/a.jpg?rewritten");
    }

    #[test]
    fn test_category_falls_back_to_property_type() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название", title_value("A")),
            ("Тип недвижимости", select("Кондо")),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.category, "Кондо");
    }

    #[test]
    fn test_end_to_end_normalization() {
        let normalizer = RecordNormalizer::new();
        let page = page(vec![
            ("Название проекта", title_value("A")),
            ("Тип сделки", rich_text("аренда, краткосрочный формат")),
            ("Статус", select("Сдан")),
        ]);
        let listing = normalizer.normalize(&page).unwrap();
        assert_eq!(listing.title, "A");
        assert_eq!(listing.deal_type, "Аренда краткосрочная");
        assert_eq!(listing.category, "Сданные");
        assert_eq!(listing.district, "");
        assert_eq!(listing.url, "https://notion.so/page-1");
        assert_eq!(listing.created_time, "2024-05-01T00:00:00.000Z");
        assert_eq!(listing.all_props["Статус"], "Сдан");
    }
}
