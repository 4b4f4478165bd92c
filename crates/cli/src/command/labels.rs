use super::Clients;
use crate::config::HarvestConfig;
use anyhow::{bail, Context as AnyhowContext, Result};
use clap::Args;

#[derive(Args)]
pub(crate) struct LabelsArgs {
    /// Knowledge-base ids to resolve (Q42 Q1490 ...)
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Primary label language (overrides HARVEST_LANG)
    #[arg(long)]
    pub lang: Option<String>,
}

pub(crate) async fn run(args: LabelsArgs, cfg: &HarvestConfig) -> Result<String> {
    let mut cfg = cfg.clone();
    if let Some(lang) = args.lang {
        cfg.language = lang;
    }
    let mut labels = Clients::from_config(&cfg)?.labels;
    let resolved = labels.fetch_labels(&args.ids).await;
    if resolved.is_empty() {
        bail!("No labels could be resolved");
    }
    serde_json::to_string_pretty(&resolved).context("Failed to serialize labels")
}
