use super::{warn_missing_api_key, Clients};
use crate::config::HarvestConfig;
use crate::flags::{PacingFlag, PresetFlag};
use anyhow::{bail, Context as AnyhowContext, Result};
use clap::Args;
use harvest_pipeline::{
    concept_ids, pacer, preset, write_json_logged, BatchOrchestrator, OutputTarget, RankPolicy,
    RunReport, DEFAULT_RUN_NAME,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Args)]
pub(crate) struct AutofetchArgs {
    /// Page names to harvest
    pub pages: Vec<String>,

    /// Append a built-in page list
    #[arg(long, value_enum)]
    pub preset: Option<PresetFlag>,

    /// Append page names from a file (one per line, `#` starts a comment)
    #[arg(long)]
    pub pages_file: Option<PathBuf>,

    /// Run name used as the output file prefix
    #[arg(long, default_value = DEFAULT_RUN_NAME)]
    pub name: String,

    /// Output directory (overrides HARVEST_OUT_DIR and the config file)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Delay between NLU calls in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Pacing policy for NLU calls
    #[arg(long, value_enum, default_value = "fixed")]
    pub pacing: PacingFlag,

    /// Concepts kept per part before the entity id filter
    #[arg(long)]
    pub limit: Option<usize>,

    /// Keep only concepts with a salience strictly above this value
    #[arg(long)]
    pub min_salience: Option<f64>,

    /// Resolve concept ids to labels and write <name>-labels.json
    #[arg(long)]
    pub labels: bool,
}

/// Printed to stdout once the run is over.
#[derive(Serialize)]
struct AutofetchSummary {
    pages: usize,
    pages_failed: usize,
    parts_processed: usize,
    parts_failed: usize,
    concepts: usize,
    parts_path: Option<PathBuf>,
    topics_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels_path: Option<PathBuf>,
    started_at: String,
    finished_at: String,
}

impl AutofetchSummary {
    fn new(report: &RunReport, labels_path: Option<PathBuf>) -> Self {
        Self {
            pages: report.pages,
            pages_failed: report.pages_failed,
            parts_processed: report.parts_processed,
            parts_failed: report.parts_failed,
            concepts: report.by_page.values().map(Vec::len).sum(),
            parts_path: report.parts_path.clone(),
            topics_path: report.topics_path.clone(),
            labels_path,
            started_at: report.started_at.to_rfc3339(),
            finished_at: report.finished_at.to_rfc3339(),
        }
    }
}

pub(crate) async fn run(args: AutofetchArgs, cfg: &HarvestConfig) -> Result<String> {
    let pages = collect_pages(&args)?;
    if pages.is_empty() {
        bail!("No pages to harvest: pass page names, --preset or --pages-file");
    }
    warn_missing_api_key(cfg);

    let delay = args.delay_ms.map_or(cfg.delay, Duration::from_millis);
    let policy = rank_policy(&args);
    let output = OutputTarget::new(
        args.out_dir.clone().unwrap_or_else(|| cfg.out_dir.clone()),
        args.name.as_str(),
    );

    let clients = Clients::from_config(cfg)?;
    let mut orchestrator =
        BatchOrchestrator::new(Box::new(clients.sections), Box::new(clients.nlu))
            .with_pacer(pacer(args.pacing.as_domain(), delay))
            .with_policy(policy);
    let report = orchestrator.run(&pages, &output).await;

    let labels_path = if args.labels {
        let mut labels = clients.labels;
        let ids = concept_ids(&report.by_page);
        log::info!(target: "wikidata", "Fetching labels for {} concepts", ids.len());
        let resolved = labels.fetch_labels(&ids).await;
        write_json_logged(&output.labels_path(), &resolved).await
    } else {
        None
    };

    let summary = AutofetchSummary::new(&report, labels_path);
    serde_json::to_string_pretty(&summary).context("Failed to serialize run summary")
}

fn rank_policy(args: &AutofetchArgs) -> RankPolicy {
    let mut policy = RankPolicy::default();
    if let Some(limit) = args.limit {
        policy.limit = limit;
    }
    policy.min_salience = args.min_salience;
    policy
}

/// Positional pages, then the preset, then the pages file. Duplicates are left for the
/// orchestrator to drop.
fn collect_pages(args: &AutofetchArgs) -> Result<Vec<String>> {
    let mut pages = args.pages.clone();
    if let Some(flag) = args.preset {
        pages.extend(preset(flag.as_str())?.iter().map(|p| p.to_string()));
    }
    if let Some(path) = &args.pages_file {
        pages.extend(read_pages_file(path)?);
    }
    Ok(pages)
}

fn read_pages_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pages file {}", path.display()))?;
    Ok(parse_page_list(&text))
}

fn parse_page_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
