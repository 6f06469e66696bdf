//! Client for the hosted generative model.
//!
//! Callers build a [`GenerateRequest`] and hand it to anything implementing
//! [`GenerativeModel`]. [`GeminiClient`] is the real implementation and talks
//! to the `generateContent` REST endpoint.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::GeminiConfig;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no API key configured for the model provider")]
    MissingApiKey,
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("model request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("model returned no text")]
    EmptyResponse,
    #[error("model returned malformed JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    InlineImage { mime_type: String, data: Vec<u8> },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub thinking_budget: Option<u32>,
    pub response_mime_type: Option<String>,
    pub response_schema: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub parts: Vec<Part>,
    pub config: GenerationConfig,
}

impl GenerateRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(prompt.into())],
            config: GenerationConfig::default(),
        }
    }
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the response text, trimmed.
    async fn generate(&self, request: GenerateRequest) -> Result<String, RemoteError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct WireContent {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum WirePart {
    Text(String),
    InlineData(WireBlob),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<WireThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    candidates: Vec<WireCandidate>,
}

#[derive(Debug, Deserialize)]
struct WireCandidate {
    content: Option<WireResponseContent>,
}

#[derive(Debug, Deserialize)]
struct WireResponseContent {
    #[serde(default)]
    parts: Vec<WireResponsePart>,
}

#[derive(Debug, Deserialize)]
struct WireResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl From<GenerateRequest> for WireRequest {
    fn from(request: GenerateRequest) -> Self {
        let parts = request
            .parts
            .into_iter()
            .map(|part| match part {
                Part::Text(text) => WirePart::Text(text),
                Part::InlineImage { mime_type, data } => WirePart::InlineData(WireBlob {
                    mime_type,
                    data: STANDARD.encode(data),
                }),
            })
            .collect();

        let config = request.config;
        let generation_config = (config != GenerationConfig::default()).then(|| {
            WireGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
                thinking_config: config
                    .thinking_budget
                    .map(|thinking_budget| WireThinkingConfig { thinking_budget }),
                response_mime_type: config.response_mime_type,
                response_schema: config.response_schema,
            }
        });

        Self {
            contents: vec![WireContent {
                role: "user",
                parts,
            }],
            generation_config,
        }
    }
}

impl WireResponse {
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content
            .parts
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .collect();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self) -> Result<Url, RemoteError> {
        let path = format!("v1beta/models/{}:generateContent", self.config.model);
        Ok(self.config.base_url.join(&path)?)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String, RemoteError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(RemoteError::MissingApiKey)?;
        let url = self.endpoint()?;
        debug!(model = %self.config.model, "calling generateContent");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(&WireRequest::from(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status { status, body });
        }

        let payload: WireResponse = response.json().await?;
        payload.into_text().ok_or(RemoteError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn client_for(server: &MockServer, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: api_key.map(str::to_string),
            model: "gemini-2.5-flash".into(),
            base_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
        })
    }

    #[test]
    fn wire_request_encodes_images_and_config() {
        let request = GenerateRequest {
            parts: vec![
                Part::InlineImage {
                    mime_type: "image/png".into(),
                    data: b"abc".to_vec(),
                },
                Part::Text("read it".into()),
            ],
            config: GenerationConfig {
                temperature: Some(0.5),
                thinking_budget: Some(50),
                response_mime_type: Some("application/json".into()),
                ..GenerationConfig::default()
            },
        };
        let body = serde_json::to_value(WireRequest::from(request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "YWJj"}},
                        {"text": "read it"}
                    ]
                }],
                "generationConfig": {
                    "temperature": 0.5,
                    "thinkingConfig": {"thinkingBudget": 50},
                    "responseMimeType": "application/json"
                }
            })
        );
    }

    #[test]
    fn plain_prompt_omits_generation_config() {
        let body = serde_json::to_value(WireRequest::from(GenerateRequest::text("hi"))).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[tokio::test]
    async fn returns_trimmed_text_without_thoughts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({
                "contents": [{"parts": [{"text": "hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"parts": [
                        {"text": "pondering", "thought": true},
                        {"text": "  Keep your tyres inflated.\n"}
                    ]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server, Some("secret"))
            .generate(GenerateRequest::text("hello"))
            .await
            .unwrap();
        assert_eq!(text, "Keep your tyres inflated.");
    }

    #[tokio::test]
    async fn surfaces_http_failures() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("secret"))
            .generate(GenerateRequest::text("hello"))
            .await
            .unwrap_err();
        match err {
            RemoteError::Status { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_candidates_are_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server, Some("secret"))
            .generate(GenerateRequest::text("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::EmptyResponse));
    }

    #[tokio::test]
    async fn missing_key_fails_without_calling_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, None)
            .generate(GenerateRequest::text("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::MissingApiKey));
    }
}
