use crate::error::{Result, SourceError};
use indexmap::{IndexMap, IndexSet};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

pub const DEFAULT_LABELS_URL: &str = "https://www.wikidata.org/w/api.php";
/// `wbgetentities` rejects more than 50 ids per request; stay below that.
pub const MAX_IDS_PER_REQUEST: usize = 40;

#[derive(Debug, Deserialize)]
struct EntitiesResponse {
    #[serde(default)]
    entities: HashMap<String, EntityLabels>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EntityLabels {
    #[serde(default)]
    labels: HashMap<String, LabelValue>,
}

#[derive(Debug, Deserialize)]
struct LabelValue {
    value: String,
}

/// Resolves knowledge-base identifiers to human-readable labels, remembering every
/// label it has resolved for the lifetime of the client.
#[derive(Debug)]
pub struct LabelCacheClient {
    client: Client,
    endpoint: String,
    language: String,
    fallback_language: String,
    cache: HashMap<String, String>,
}

impl LabelCacheClient {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        language: impl Into<String>,
        fallback_language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            language: language.into(),
            fallback_language: fallback_language.into(),
            cache: HashMap::new(),
        }
    }

    /// Returns a label for every requested non-empty id, in request order. Ids whose
    /// request chunk failed are left out.
    pub async fn fetch_labels<S: AsRef<str>>(&mut self, ids: &[S]) -> IndexMap<String, String> {
        let requested: IndexSet<&str> = ids
            .iter()
            .map(AsRef::as_ref)
            .filter(|id| !id.is_empty())
            .collect();
        let missing: Vec<&str> = requested
            .iter()
            .copied()
            .filter(|id| !self.cache.contains_key(*id))
            .collect();

        let mut fetched = HashMap::new();
        for chunk in missing.chunks(MAX_IDS_PER_REQUEST) {
            match self.request_chunk(chunk).await {
                Ok(entities) => fetched.extend(entities),
                Err(err) => {
                    log::warn!(target: "wikidata", "Label lookup for {} ids failed: {err}", chunk.len());
                }
            }
        }

        for (id, entity) in fetched {
            let label = self.pick_label(&id, entity);
            self.cache.insert(id, label);
        }

        requested
            .into_iter()
            .filter_map(|id| self.cache.get(id).map(|label| (id.to_string(), label.clone())))
            .collect()
    }

    fn pick_label(&self, id: &str, mut entity: EntityLabels) -> String {
        entity
            .labels
            .remove(&self.language)
            .or_else(|| entity.labels.remove(&self.fallback_language))
            .map(|l| l.value)
            .unwrap_or_else(|| id.to_string())
    }

    async fn request_chunk(&self, ids: &[&str]) -> Result<HashMap<String, EntityLabels>> {
        let ids_param = ids.join("|");
        let languages = format!("{}|{}", self.language, self.fallback_language);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "wbgetentities"),
                ("props", "labels"),
                ("ids", ids_param.as_str()),
                ("languages", languages.as_str()),
                ("origin", "*"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.endpoint.clone(),
            });
        }

        let parsed: EntitiesResponse = serde_json::from_slice(&response.bytes().await?)?;
        if let Some(error) = parsed.error {
            return Err(SourceError::LabelApi(error.to_string()));
        }
        Ok(parsed.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn labels_body(entries: &[(&str, Option<(&str, &str)>)]) -> serde_json::Value {
        let mut entities = serde_json::Map::new();
        for (id, label) in entries {
            let labels = match label {
                Some((lang, value)) => serde_json::json!({ *lang: {"language": lang, "value": value} }),
                None => serde_json::json!({}),
            };
            entities.insert(id.to_string(), serde_json::json!({"id": id, "labels": labels}));
        }
        serde_json::json!({ "entities": entities, "success": 1 })
    }

    fn client(server: &MockServer, lang: &str, fallback: &str) -> LabelCacheClient {
        LabelCacheClient::new(Client::new(), format!("{}/w/api.php", server.uri()), lang, fallback)
    }

    #[tokio::test]
    async fn resolves_with_language_fallback_and_raw_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "wbgetentities"))
            .and(query_param("languages", "de|en"))
            .and(query_param("ids", "Q1|Q2|Q3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(labels_body(&[
                ("Q1", Some(("de", "Universum"))),
                ("Q2", Some(("en", "Earth"))),
                ("Q3", None),
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let mut labels = client(&server, "de", "en");
        let out = labels.fetch_labels(&["Q1", "Q2", "Q3"]).await;
        let pairs: Vec<_> = out.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![("Q1", "Universum"), ("Q2", "Earth"), ("Q3", "Q3")]
        );
    }

    #[tokio::test]
    async fn cached_ids_are_not_requested_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("ids", "Q42"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(labels_body(&[("Q42", Some(("en", "Douglas Adams")))])),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("ids", "Q5"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(labels_body(&[("Q5", Some(("en", "human")))])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let mut labels = client(&server, "en", "en");
        let first = labels.fetch_labels(&["Q42"]).await;
        assert_eq!(first.get("Q42").map(String::as_str), Some("Douglas Adams"));

        let second = labels.fetch_labels(&["Q42", "Q5", ""]).await;
        assert_eq!(second.len(), 2);
        assert_eq!(second.get("Q42").map(String::as_str), Some("Douglas Adams"));
        assert_eq!(second.get("Q5").map(String::as_str), Some("human"));
        assert_eq!(labels.cache.len(), 2);
    }

    #[tokio::test]
    async fn splits_requests_into_chunks_of_forty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(labels_body(&[])))
            .expect(3)
            .mount(&server)
            .await;

        let ids: Vec<String> = (1..=81).map(|n| format!("Q{n}")).collect();
        let mut labels = client(&server, "en", "en");
        let out = labels.fetch_labels(&ids).await;
        // Entities missing from the response are not cached and not returned.
        assert!(out.is_empty());

        let requests = server.received_requests().await.unwrap_or_default();
        let sizes: Vec<usize> = requests
            .iter()
            .filter_map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "ids")
                    .map(|(_, v)| v.split('|').count())
            })
            .collect();
        assert_eq!(sizes, vec![40, 40, 1]);
    }

    #[tokio::test]
    async fn failed_chunk_is_swallowed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": {"code": "no-such-entity", "info": "Could not find an entity"}
            })))
            .mount(&server)
            .await;

        let mut labels = client(&server, "en", "en");
        let out = labels.fetch_labels(&["Q0"]).await;
        assert!(out.is_empty());
        assert_eq!(labels.cache.get("Q0"), None);
    }
}
