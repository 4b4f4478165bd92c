use crate::error::{Result, SourceError};
use async_trait::async_trait;
use harvest_protocol::Part;
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:8080/query";
pub const DEFAULT_AUTHORITY: &str = "simple.wikipedia.org";

/// Source of a page's named sections.
#[async_trait]
pub trait SectionSource: Send + Sync {
    async fn fetch_parts(&self, page_name: &str) -> Result<Vec<Part>>;
}

/// Fetches page sections from the structured-content GraphQL service.
#[derive(Clone, Debug)]
pub struct GraphqlSectionFetcher {
    client: Client,
    endpoint: String,
    authority: String,
}

impl GraphqlSectionFetcher {
    pub fn new(client: Client, endpoint: impl Into<String>, authority: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            authority: authority.into(),
        }
    }
}

/// Builds the fixed-shape parts query. Both strings are embedded as escaped literals.
pub fn parts_query(authority: &str, page_name: &str) -> String {
    let authority = serde_json::Value::from(authority);
    let name = serde_json::Value::from(page_name);
    format!(
        "{{ page(name: {{authority: {authority}, name: {name}}}) {{ name dateModified hasPart(offset: 0) {{ name unsafe }} }} }}"
    )
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    errors: Vec<QueryError>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    page: Option<PageNode>,
    #[serde(default)]
    node: Option<PageNode>,
}

#[derive(Debug, Deserialize)]
struct PageNode {
    #[serde(rename = "hasPart", default)]
    has_part: Option<Vec<Part>>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    message: String,
}

#[async_trait]
impl SectionSource for GraphqlSectionFetcher {
    async fn fetch_parts(&self, page_name: &str) -> Result<Vec<Part>> {
        let body = serde_json::json!({ "query": parts_query(&self.authority, page_name) });
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: QueryResponse = serde_json::from_slice(&bytes)?;
        let node = parsed.data.and_then(|data| data.page.or(data.node));
        match node {
            Some(node) => {
                let parts = node.has_part.unwrap_or_default();
                log::debug!(target: "graphql", "\"{page_name}\" has {} parts", parts.len());
                Ok(parts)
            }
            None => {
                let detail = if parsed.errors.is_empty() {
                    None
                } else {
                    Some(
                        parsed
                            .errors
                            .iter()
                            .map(|e| e.message.as_str())
                            .collect::<Vec<_>>()
                            .join("; "),
                    )
                };
                Err(SourceError::NotFound {
                    page: page_name.to_string(),
                    detail,
                })
            }
        }
    }
}
