pub(crate) mod autofetch;
pub(crate) mod labels;
pub(crate) mod query;

use crate::config::HarvestConfig;
use anyhow::{Context as AnyhowContext, Result};
use harvest_sources::{http_client, GraphqlSectionFetcher, LabelCacheClient, RosetteClient};

/// Network adapters wired from resolved configuration, sharing one HTTP client.
pub(crate) struct Clients {
    pub sections: GraphqlSectionFetcher,
    pub nlu: RosetteClient,
    pub labels: LabelCacheClient,
}

impl Clients {
    pub(crate) fn from_config(cfg: &HarvestConfig) -> Result<Self> {
        let http = http_client(cfg.timeout).context("Failed to build HTTP client")?;
        Ok(Self {
            sections: GraphqlSectionFetcher::new(
                http.clone(),
                cfg.graphql_url.as_str(),
                cfg.authority.as_str(),
            ),
            nlu: RosetteClient::new(http.clone(), cfg.nlu_url.as_str(), cfg.nlu_api_key.clone())
                .with_language(cfg.nlu_language.clone())
                .with_content_mode(cfg.content_mode),
            labels: LabelCacheClient::new(
                http,
                cfg.labels_url.as_str(),
                cfg.language.as_str(),
                cfg.fallback_language.as_str(),
            ),
        })
    }
}

pub(crate) fn warn_missing_api_key(cfg: &HarvestConfig) {
    if cfg.nlu_api_key.is_none() {
        log::warn!(
            target: "rosette",
            "ROSETTE_API_KEY is not set; NLU requests will be sent without a key"
        );
    }
}
