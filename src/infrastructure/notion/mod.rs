pub mod client;

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::domain::error::Result;
use crate::domain::property::{OutboundProperty, SchemaMap, SourcePage};

pub use client::NotionClient;

/// Remote structured-content store. One implementation talks to the
/// Notion API; tests substitute their own.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All pages of one database, in the store's order.
    async fn query_pages(&self, database_id: &str) -> Result<Vec<SourcePage>>;

    /// Current field-name -> declared-type map of one database.
    /// Fetched fresh before every write; never cached.
    async fn fetch_schema(&self, database_id: &str) -> Result<SchemaMap>;

    /// Create one page with the given properties; returns the new
    /// page id.
    async fn create_page(
        &self,
        database_id: &str,
        properties: BTreeMap<String, OutboundProperty>,
    ) -> Result<String>;
}
