use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ContentStore;
use crate::domain::error::{AppError, Result};
use crate::domain::property::{OutboundProperty, PropertyKind, SchemaMap, SourcePage};

const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;

#[derive(Serialize)]
struct QueryRequest {
    page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_cursor: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<SourcePage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct DatabaseMeta {
    #[serde(default)]
    properties: BTreeMap<String, SchemaField>,
}

#[derive(Deserialize)]
struct SchemaField {
    #[serde(rename = "type")]
    kind: PropertyKind,
}

#[derive(Serialize)]
struct CreatePageRequest {
    parent: PageParent,
    properties: BTreeMap<String, OutboundProperty>,
}

#[derive(Serialize)]
struct PageParent {
    database_id: String,
}

#[derive(Deserialize)]
struct CreatedPage {
    id: String,
}

pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, "https://api.notion.com/v1")
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path))
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .header("Content-Type", "application/json")
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::NotionError(format!(
                "API error ({}): {}",
                status, text
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl ContentStore for NotionClient {
    async fn query_pages(&self, database_id: &str) -> Result<Vec<SourcePage>> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let body = QueryRequest {
                page_size: PAGE_SIZE,
                start_cursor: cursor.take(),
            };
            let response = self
                .request(
                    reqwest::Method::POST,
                    &format!("databases/{}/query", database_id),
                )
                .json(&body)
                .send()
                .await
                .map_err(|e| AppError::NotionError(format!("Request failed: {}", e)))?;

            let json: QueryResponse = Self::check(response)
                .await?
                .json()
                .await
                .map_err(|e| AppError::ParseError(format!("Failed to parse JSON: {}", e)))?;

            pages.extend(json.results);
            match (json.has_more, json.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(database_id, count = pages.len(), "Fetched pages");
        Ok(pages)
    }

    async fn fetch_schema(&self, database_id: &str) -> Result<SchemaMap> {
        let response = self
            .request(reqwest::Method::GET, &format!("databases/{}", database_id))
            .send()
            .await
            .map_err(|e| AppError::NotionError(format!("Request failed: {}", e)))?;

        let meta: DatabaseMeta = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        Ok(meta
            .properties
            .into_iter()
            .map(|(name, field)| (name, field.kind))
            .collect())
    }

    async fn create_page(
        &self,
        database_id: &str,
        properties: BTreeMap<String, OutboundProperty>,
    ) -> Result<String> {
        let body = CreatePageRequest {
            parent: PageParent {
                database_id: database_id.to_string(),
            },
            properties,
        };
        let response = self
            .request(reqwest::Method::POST, "pages")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::NotionError(format!("Request failed: {}", e)))?;

        let created: CreatedPage = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse JSON: {}", e)))?;

        tracing::info!(database_id, page_id = %created.id, "Created page");
        Ok(created.id)
    }
}
