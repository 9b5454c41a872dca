//! Inference: send the encoded image to Gemini and return the raw report.
//!
//! [`GeminiClient`] speaks the REST `generateContent` endpoint directly with
//! `reqwest`. It is intentionally thin: prompts live in [`crate::prompts`],
//! rendering in [`crate::report`].
//!
//! One call is one request. There is no retry: a failed diagnosis is shown to
//! the user, who can simply press analyze again.
//!
//! ## Error mapping
//!
//! | Condition | Error |
//! |-----------|-------|
//! | no key configured (checked in [`GeminiClient::new`]) | `ConfigurationError` |
//! | HTTP 401/403, or body mentions `API_KEY_INVALID` / `API key not valid` | `AuthError` |
//! | anything else: transport, timeout, non-2xx, blocked, empty reply | `ServiceError` |

use crate::config::AnalysisConfig;
use crate::error::PlantDocError;
use crate::pipeline::encode::EncodedImage;
use crate::prompts::{SYSTEM_INSTRUCTION, USER_PROMPT};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The text and token usage of one successful inference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InferenceReply {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Anything that can turn an encoded plant photo into a report.
///
/// [`GeminiClient`] is the production implementation. Inject another through
/// [`crate::config::AnalysisConfigBuilder::analyzer`] for tests or to add
/// middleware such as caching.
#[async_trait]
pub trait PlantAnalyzer: Send + Sync {
    async fn analyze(&self, image: &EncodedImage) -> Result<InferenceReply, PlantDocError>;
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    system_prompt: String,
    generation: GenerationConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build a client from the configuration.
    ///
    /// The credential is resolved here, so a missing key fails before any
    /// connection is attempted.
    pub fn new(config: &AnalysisConfig) -> Result<Self, PlantDocError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| PlantDocError::ConfigurationError {
                hint: format!(
                    "Please set the {} environment variable or pass --api-key.",
                    config.api_key_env.join(" or ")
                ),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| PlantDocError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            endpoint: endpoint_url(&config.base_url, &config.model),
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| SYSTEM_INSTRUCTION.to_string()),
            generation: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
            },
        })
    }

    fn build_request<'a>(&'a self, image: &'a EncodedImage) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: &self.system_prompt,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: &image.data,
                        },
                    },
                    Part::Text { text: USER_PROMPT },
                ],
            }],
            generation_config: self.generation.clone(),
        }
    }
}

#[async_trait]
impl PlantAnalyzer for GeminiClient {
    async fn analyze(&self, image: &EncodedImage) -> Result<InferenceReply, PlantDocError> {
        let start = Instant::now();
        let body = self.build_request(image);
        info!("Requesting diagnosis from {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Gemini request failed: {e}");
                PlantDocError::ServiceError {
                    message: if e.is_timeout() {
                        "request timed out".to_string()
                    } else {
                        e.to_string()
                    },
                    status: None,
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| PlantDocError::ServiceError {
            message: format!("failed to read response body: {e}"),
            status: Some(status.as_u16()),
        })?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &text);
            warn!("Gemini returned HTTP {}: {}", status.as_u16(), err);
            return Err(err);
        }

        let reply = parse_response(&text)?;
        debug!(
            "{} input tokens, {} output tokens, {:?}",
            reply.input_tokens,
            reply.output_tokens,
            start.elapsed()
        );
        Ok(reply)
    }
}

/// Analyze an encoded image with the built-in Gemini client.
///
/// Fails with [`PlantDocError::ConfigurationError`] before any network
/// activity when no credential is configured.
pub async fn analyze(encoded: &str, mime_type: &str, config: &AnalysisConfig) -> Result<String, PlantDocError> {
    let client = GeminiClient::new(config)?;
    let image = EncodedImage {
        data: encoded.to_string(),
        mime_type: mime_type.to_string(),
    };
    client.analyze(&image).await.map(|r| r.text)
}

fn endpoint_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

/// Map a non-2xx response to an error.
pub fn classify_failure(status: u16, body: &str) -> PlantDocError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {status}"));

    let rejected_key = body.contains("API_KEY_INVALID") || body.contains("API key not valid");
    if status == 401 || status == 403 || rejected_key {
        PlantDocError::AuthError { detail: message }
    } else {
        PlantDocError::ServiceError {
            message,
            status: Some(status),
        }
    }
}

/// Extract the report text and usage from a 2xx response body.
pub fn parse_response(body: &str) -> Result<InferenceReply, PlantDocError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| PlantDocError::ServiceError {
            message: format!("malformed response: {e}"),
            status: None,
        })?;

    if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(PlantDocError::ServiceError {
            message: format!("request blocked: {reason}"),
            status: None,
        });
    }

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(PlantDocError::ServiceError {
            message: "empty response".to_string(),
            status: None,
        });
    }

    let usage = parsed.usage_metadata.unwrap_or_default();
    Ok(InferenceReply {
        text,
        input_tokens: usage.prompt_token_count,
        output_tokens: usage.candidates_token_count,
    })
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}
