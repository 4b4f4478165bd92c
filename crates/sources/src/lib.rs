//! # Harvest Sources
//!
//! Network adapters for the topic harvester.
//!
//! ```text
//! page name ──> GraphqlSectionFetcher ──> [Part]
//! part text ──> RosetteClient ──────────> NluResponse (concepts, keyphrases, ...)
//! "Q..." ids ─> LabelCacheClient ───────> id → label (cached)
//! ```

mod error;
mod graphql;
mod labels;
mod nlu;
pub mod text;

pub use error::{Result, SourceError};
pub use graphql::{
    parts_query, GraphqlSectionFetcher, SectionSource, DEFAULT_AUTHORITY, DEFAULT_GRAPHQL_URL,
};
pub use labels::{LabelCacheClient, DEFAULT_LABELS_URL, MAX_IDS_PER_REQUEST};
pub use nlu::{ConceptExtractor, ContentMode, RosetteClient, API_KEY_HEADER, DEFAULT_NLU_URL};

use std::time::Duration;

/// Shared HTTP client for all adapters. Wikidata rejects requests without a user agent.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        "topic-harvest/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    Ok(builder.build()?)
}
