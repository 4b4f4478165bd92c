use crate::error::{Result, SourceError};
use crate::text;
use async_trait::async_trait;
use harvest_protocol::{NluEndpoint, NluResponse};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NLU_URL: &str = "https://api.rosette.com/rest/v1";
pub const API_KEY_HEADER: &str = "X-RosetteAPI-Key";

/// Concept/entity extraction backend.
#[async_trait]
pub trait ConceptExtractor: Send + Sync {
    async fn extract(&self, endpoint: NluEndpoint, text: &str) -> Result<NluResponse>;
}

/// How section content is prepared before it is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// Strip markup, collapse whitespace, apply size limits.
    #[default]
    PlainText,
    /// Collapse whitespace and apply size limits only.
    Raw,
}

#[derive(Clone, Debug)]
pub struct RosetteClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    language: Option<String>,
    content_mode: ContentMode,
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RosetteClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            language: None,
            content_mode: ContentMode::default(),
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_content_mode(mut self, mode: ContentMode) -> Self {
        self.content_mode = mode;
        self
    }

    fn prepare(&self, content: &str) -> String {
        match self.content_mode {
            ContentMode::PlainText => text::plain_text(content),
            ContentMode::Raw => text::raw_text(content),
        }
    }
}

#[async_trait]
impl ConceptExtractor for RosetteClient {
    async fn extract(&self, endpoint: NluEndpoint, content: &str) -> Result<NluResponse> {
        let prepared = self.prepare(content);
        if prepared.is_empty() {
            return Err(SourceError::EmptyContent);
        }

        let url = format!("{}/{}", self.base_url, endpoint.as_str());
        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .json(&ExtractRequest {
                content: &prepared,
                language: self.language.as_deref(),
            });
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(SourceError::NluApi {
                status: status.as_u16(),
                message: error_message(&bytes),
            });
        }

        let parsed: NluResponse = serde_json::from_slice(&bytes)?;
        log::debug!(
            target: "rosette",
            "{endpoint}: {} concepts, {} keyphrases, {} entities, {} categories",
            parsed.concepts.len(),
            parsed.keyphrases.len(),
            parsed.entities.len(),
            parsed.categories.len()
        );
        Ok(parsed)
    }
}

fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            code: Some(code),
            message: Some(message),
        }) => format!("{code}: {message}"),
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => message,
        _ => {
            let raw = String::from_utf8_lossy(body).trim().to_string();
            if raw.is_empty() {
                "empty response body".to_string()
            } else {
                raw
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RosetteClient {
        RosetteClient::new(Client::new(), server.uri(), Some("secret".to_string()))
    }

    #[tokio::test]
    async fn posts_plain_text_to_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/topics"))
            .and(header(API_KEY_HEADER, "secret"))
            .and(body_json(serde_json::json!({"content": "Apples are red."})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "concepts": [
                    {"phrase": "fruit", "conceptId": "Q3314483", "salience": 0.8}
                ],
                "keyphrases": [{"phrase": "red apples", "salience": 0.5}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let res = client(&server)
            .extract(NluEndpoint::Topics, "<p>Apples   are\n red.</p>")
            .await
            .unwrap();
        assert_eq!(res.concepts.len(), 1);
        assert_eq!(res.concepts[0].concept_id, "Q3314483");
        assert_eq!(res.keyphrases[0].phrase, "red apples");
    }

    #[tokio::test]
    async fn language_is_sent_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/entities"))
            .and(body_json(
                serde_json::json!({"content": "Pear", "language": "eng"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "entities": [{"type": "PRODUCT", "mention": "Pear", "count": 2}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let res = client(&server)
            .with_language(Some("eng".to_string()))
            .extract(NluEndpoint::Entities, "Pear")
            .await
            .unwrap();
        assert_eq!(res.entities[0].count, Some(2));
    }

    #[tokio::test]
    async fn api_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "unauthorized",
                "message": "missing key"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .extract(NluEndpoint::Topics, "Kiwi")
            .await
            .unwrap_err();
        match err {
            SourceError::NluApi { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "unauthorized: missing key");
            }
            other => panic!("expected NluApi, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_content_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .extract(NluEndpoint::Topics, "<p>  </p>")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::EmptyContent));
    }

    #[test]
    fn error_message_falls_back_to_body_text() {
        assert_eq!(error_message(b"rate limited"), "rate limited");
        assert_eq!(error_message(b""), "empty response body");
        assert_eq!(error_message(br#"{"message":"too big"}"#), "too big");
    }
}
