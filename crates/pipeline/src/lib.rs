//! # Harvest Pipeline
//!
//! Batch concept harvesting over a list of wiki pages.
//!
//! ## Pipeline
//!
//! ```text
//! page names (deduplicated)
//!     │
//!     ├──> SectionSource (one request per page)
//!     │      └─> parts
//!     │
//!     ├──> Pacer ──> ConceptExtractor (one request per part, sequential)
//!     │      └─> concepts, ranked and filtered
//!     │
//!     └──> ResultByPage ──> <name>-parts.json
//!            └─> ResultByTopic ──> <name>-topics.json
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use harvest_pipeline::{BatchOrchestrator, OutputTarget};
//! use harvest_sources::{http_client, GraphqlSectionFetcher, RosetteClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http = http_client(None)?;
//!     let sections = GraphqlSectionFetcher::new(
//!         http.clone(),
//!         "http://localhost:8080/query",
//!         "simple.wikipedia.org",
//!     );
//!     let nlu = RosetteClient::new(http, "https://api.rosette.com/rest/v1", None);
//!
//!     let mut orchestrator = BatchOrchestrator::new(Box::new(sections), Box::new(nlu));
//!     let report = orchestrator
//!         .run(&["Apple", "Banana"], &OutputTarget::new("data", "fruits"))
//!         .await;
//!     println!("{} pages, {} parts", report.pages, report.parts_processed);
//!     Ok(())
//! }
//! ```

mod error;
mod orchestrator;
mod output;
mod pacing;
mod presets;
mod rank;

pub use error::{PipelineError, Result};
pub use orchestrator::{dedupe_pages, BatchOrchestrator, RunReport};
pub use output::{
    read_json, write_json, write_json_logged, OutputTarget, DEFAULT_OUT_DIR, DEFAULT_RUN_NAME,
};
pub use pacing::{pacer, FixedDelay, IntervalGate, Pacer, PacingKind, Unpaced, DEFAULT_DELAY};
pub use presets::{preset, FRUITS, SCIENTISTS};
pub use rank::{by_topic, concept_ids, rank_concepts, record_part, RankPolicy, DEFAULT_CONCEPT_LIMIT};
