use crate::output::{write_json_logged, OutputTarget};
use crate::pacing::{FixedDelay, Pacer, DEFAULT_DELAY};
use crate::rank::{by_topic, rank_concepts, record_part, RankPolicy};
use chrono::{DateTime, Local};
use harvest_protocol::{NluEndpoint, PartTitle, ResultByPage};
use harvest_sources::{ConceptExtractor, SectionSource};
use indexmap::IndexSet;
use std::path::PathBuf;

/// Everything a run produced, including what it could not produce.
#[derive(Debug)]
pub struct RunReport {
    pub pages: usize,
    pub pages_failed: usize,
    pub parts_processed: usize,
    pub parts_failed: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub by_page: ResultByPage,
    /// `None` when the file could not be written.
    pub parts_path: Option<PathBuf>,
    pub topics_path: Option<PathBuf>,
}

/// Sequential page → parts → concepts harvester. One page or part failing never stops
/// the run; whatever was collected is written at the end.
pub struct BatchOrchestrator {
    sections: Box<dyn SectionSource>,
    extractor: Box<dyn ConceptExtractor>,
    pacer: Box<dyn Pacer>,
    policy: RankPolicy,
}

impl BatchOrchestrator {
    pub fn new(sections: Box<dyn SectionSource>, extractor: Box<dyn ConceptExtractor>) -> Self {
        Self {
            sections,
            extractor,
            pacer: Box::new(FixedDelay::new(DEFAULT_DELAY)),
            policy: RankPolicy::default(),
        }
    }

    pub fn with_pacer(mut self, pacer: Box<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn with_policy(mut self, policy: RankPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run<S: AsRef<str>>(&mut self, page_names: &[S], output: &OutputTarget) -> RunReport {
        let started_at = Local::now();
        let pages = dedupe_pages(page_names);

        let mut report = RunReport {
            pages: pages.len(),
            pages_failed: 0,
            parts_processed: 0,
            parts_failed: 0,
            started_at,
            finished_at: started_at,
            by_page: ResultByPage::new(),
            parts_path: None,
            topics_path: None,
        };

        for page in &pages {
            self.harvest_page(page, &mut report).await;
        }

        report.parts_path = write_json_logged(&output.parts_path(), &report.by_page).await;

        log::info!(target: "output", "Formatting by topic.");
        let topics = by_topic(&report.by_page);
        report.topics_path = write_json_logged(&output.topics_path(), &topics).await;

        report.finished_at = Local::now();
        log_summary(&report);
        report
    }

    async fn harvest_page(&mut self, page: &str, report: &mut RunReport) {
        log::info!(target: "graphql", "Fetching parts for \"{page}\"");
        let parts = match self.sections.fetch_parts(page).await {
            Ok(parts) => parts,
            Err(err) => {
                log::error!(target: "graphql", "{err}");
                report.pages_failed += 1;
                return;
            }
        };

        for part in parts {
            let title = PartTitle::new(page, part.name.as_str());
            self.pacer.ready().await;

            log::info!(target: "rosette", "Fetching concepts for \"{title}\"");
            match self.extractor.extract(NluEndpoint::Topics, &part.content).await {
                Ok(response) => {
                    let ranked = rank_concepts(response.concepts, &self.policy);
                    record_part(&mut report.by_page, &title, &ranked);
                    report.parts_processed += 1;
                }
                Err(err) => {
                    log::error!(target: "rosette", "({title}) {err}");
                    report.parts_failed += 1;
                }
            }
        }
    }
}

/// Set semantics over page names, keeping the first occurrence of each.
pub fn dedupe_pages<S: AsRef<str>>(page_names: &[S]) -> Vec<String> {
    let unique: IndexSet<&str> = page_names.iter().map(AsRef::as_ref).collect();
    unique.into_iter().map(str::to_string).collect()
}

fn log_summary(report: &RunReport) {
    if let (Some(parts), Some(topics)) = (&report.parts_path, &report.topics_path) {
        log::info!(
            target: "summary",
            "Success! Data available at {} and {}",
            parts.display(),
            topics.display()
        );
    }
    log::info!(target: "summary", "Number of pages: {}", report.pages);
    if report.pages_failed > 0 || report.parts_failed > 0 {
        log::warn!(
            target: "summary",
            "Failed pages: {}, failed parts: {}",
            report.pages_failed,
            report.parts_failed
        );
    }
    log::info!(target: "summary", "Started at: {}", report.started_at.format("%H:%M:%S %:z"));
    log::info!(target: "summary", "Ended at: {}", report.finished_at.format("%H:%M:%S %:z"));
}
