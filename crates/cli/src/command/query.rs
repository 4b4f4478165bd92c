use super::{warn_missing_api_key, Clients};
use crate::config::HarvestConfig;
use crate::flags::{EndpointFlag, OutputFormat};
use crate::render::{
    category_rows, collect_concepts, concept_rows, entity_rows, keyphrase_rows, render_rows,
};
use anyhow::{anyhow, Context as AnyhowContext, Result};
use clap::Args;
use harvest_protocol::{NluEndpoint, NluResponse, Part, PartTitle};
use harvest_sources::{ConceptExtractor, SectionSource};
use rand::Rng;

pub(crate) const DEFAULT_PAGE: &str = "Philadelphia";

#[derive(Args)]
pub(crate) struct QueryArgs {
    /// Page name on the configured wiki
    #[arg(long, default_value = DEFAULT_PAGE)]
    pub page: String,

    /// Section name; a random one is picked when absent or not found
    #[arg(long)]
    pub part: Option<String>,

    /// NLU endpoint
    #[arg(long, value_enum, default_value = "topics")]
    pub endpoint: EndpointFlag,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

pub(crate) async fn run(args: QueryArgs, cfg: &HarvestConfig) -> Result<String> {
    warn_missing_api_key(cfg);
    let clients = Clients::from_config(cfg)?;

    log::info!(target: "graphql", "Fetching parts for \"{}\"", args.page);
    let parts = clients
        .sections
        .fetch_parts(&args.page)
        .await
        .with_context(|| format!("Failed to fetch parts for '{}'", args.page))?;

    let index = pick_part(&parts, args.part.as_deref(), &mut rand::thread_rng())
        .ok_or_else(|| anyhow!("Page '{}' has no parts", args.page))?;
    let part = &parts[index];
    if args.part.as_deref() != Some(part.name.as_str()) {
        log::info!("Random section picked: #{index} - {}", part.name);
    }

    let endpoint = args.endpoint.as_domain();
    let response = clients
        .nlu
        .extract(endpoint, &part.content)
        .await
        .with_context(|| format!("NLU request failed for '{} - {}'", args.page, part.name))?;

    let title = PartTitle::new(args.page.as_str(), part.name.as_str());
    render_response(&title, endpoint, args.output, response)
}

/// Index of the requested part, or a random one when it is absent or unknown.
fn pick_part(parts: &[Part], requested: Option<&str>, rng: &mut impl Rng) -> Option<usize> {
    if parts.is_empty() {
        return None;
    }
    requested
        .and_then(|name| parts.iter().position(|p| p.name == name))
        .or_else(|| Some(rng.gen_range(0..parts.len())))
}

fn render_response(
    title: &PartTitle,
    endpoint: NluEndpoint,
    format: OutputFormat,
    response: NluResponse,
) -> Result<String> {
    let mut out = vec![title.to_string(), format!("Endpoint: {endpoint}")];
    match endpoint {
        NluEndpoint::Topics => {
            out.push("-> Key phrases".to_string());
            if format != OutputFormat::Collectconcepts {
                out.push(render_rows(format, &keyphrase_rows(&response.keyphrases))?);
            }
            out.push("-> Concepts".to_string());
            if format == OutputFormat::Collectconcepts {
                let collected = collect_concepts(title, &response.concepts);
                out.push(
                    serde_json::to_string_pretty(&collected)
                        .context("Failed to serialize collected concepts")?,
                );
            } else {
                out.push(render_rows(format, &concept_rows(&response.concepts))?);
            }
        }
        NluEndpoint::Entities => out.push(render_rows(format, &entity_rows(response.entities))?),
        NluEndpoint::Categories => {
            out.push(render_rows(format, &category_rows(&response.categories))?)
        }
    }
    Ok(out.join("\n"))
}
