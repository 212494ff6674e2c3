use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized, immutable listing entity produced by the read path.
///
/// Construction is the normalizer's job; a source page without a
/// resolvable title never becomes a `Listing`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Source page id.
    pub id: String,
    /// Operator-assigned object id, resolved from id-like columns.
    /// Stays empty when no candidate matches; never synthesized.
    pub ext_id: String,
    pub title: String,
    /// Canonical deal-type label, or the source text when it matches
    /// no known marker.
    pub deal_type: String,
    /// Canonical construction-status label, or the source text.
    pub category: String,
    pub district: String,
    /// "Starting from" price; 0 when no positive value resolved.
    pub price: f64,
    /// ISO currency code, or empty when unknown.
    pub currency: String,
    pub image_url: String,
    pub url: String,
    pub description: String,
    pub conditions: String,
    pub created_time: String,
    /// Flat echo of every source field, decoded for display.
    pub all_props: BTreeMap<String, String>,
}
