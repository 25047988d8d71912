//! Gemini `generateContent` client.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::retry::{classify_status, BackoffPolicy, Sleeper, ThreadSleeper, Verdict};
use crate::error::ExtractionError;

/// Fixed instruction sent alongside every image.
pub const EXTRACTION_INSTRUCTION: &str = "Extract every player name and its score from this \
leaderboard image. Respond with only a JSON array of objects of the form \
{\"name\": \"<player name>\", \"number\": <score>} in the order they appear. \
Do not add any other text.";

/// Longest error-body excerpt carried into error messages.
const ERROR_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
pub struct InlineData {
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    /// Base64 (standard alphabet, padded)
    pub data: String,
}

impl GenerateContentRequest {
    /// Builds the single-turn request: instruction text + inline image.
    pub fn for_image(image_bytes: &[u8], mime_type: &str) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![
                    Part::Text {
                        text: EXTRACTION_INSTRUCTION.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: mime_type.to_string(),
                            data: general_purpose::STANDARD.encode(image_bytes),
                        },
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate's first part, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Human-readable message from an error response body.
fn error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        if !envelope.error.message.is_empty() {
            return envelope.error.message;
        }
    }
    body.trim().chars().take(ERROR_EXCERPT_CHARS).collect()
}

/// Raw HTTP reply as seen by the client.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Connectivity failure: nothing usable came back.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Sends one request. Split out so the retry logic can be tested offline.
pub trait Transport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<HttpReply, TransportError>;
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &GenerateContentRequest,
    ) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| TransportError(format!("failed to read response body: {}", e)))?;

        Ok(HttpReply { status, body })
    }
}

/// Why one attempt failed.
#[derive(Debug)]
enum AttemptError {
    Status { status: u16, message: String },
    Transport(TransportError),
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status, message } => write!(f, "HTTP {}: {}", status, message),
            Self::Transport(e) => write!(f, "network error: {}", e),
        }
    }
}

fn classify_attempt(error: &AttemptError) -> Verdict {
    match error {
        AttemptError::Status { status, .. } => classify_status(*status),
        AttemptError::Transport(_) => Verdict::Retry,
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub policy: BackoffPolicy,
}

pub struct GeminiClient {
    settings: GeminiSettings,
    transport: Box<dyn Transport>,
    sleeper: Box<dyn Sleeper>,
}

impl GeminiClient {
    /// Client with the real HTTP transport and real sleeps.
    pub fn new(settings: GeminiSettings, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::with_parts(
            settings,
            Box::new(ReqwestTransport::new(timeout)?),
            Box::new(ThreadSleeper),
        ))
    }

    pub fn with_parts(
        settings: GeminiSettings,
        transport: Box<dyn Transport>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            settings,
            transport,
            sleeper,
        }
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.api_base_url.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Sends the image and returns the model's raw text response.
    ///
    /// An envelope without candidate text yields `""`.
    pub fn fetch_extraction(
        &self,
        image_bytes: &[u8],
        mime_type: &str,
    ) -> Result<String, ExtractionError> {
        let api_key = self.settings.api_key.trim();
        if api_key.is_empty() {
            return Err(ExtractionError::Auth("no API key configured".to_string()));
        }

        let url = self.endpoint();
        let request = GenerateContentRequest::for_image(image_bytes, mime_type);

        let reply = self
            .settings
            .policy
            .run(self.sleeper.as_ref(), classify_attempt, |_attempt| {
                let reply = self
                    .transport
                    .post_json(&url, api_key, &request)
                    .map_err(AttemptError::Transport)?;
                if (200..300).contains(&reply.status) {
                    Ok(reply)
                } else {
                    Err(AttemptError::Status {
                        status: reply.status,
                        message: error_message(&reply.body),
                    })
                }
            })
            .map_err(|failure| match failure.error {
                AttemptError::Status { status: 403, message } => {
                    ExtractionError::Auth(format!("HTTP 403: {}", message))
                }
                AttemptError::Status { status, message } if status < 400 => {
                    ExtractionError::MalformedResponse(format!(
                        "unexpected HTTP {}: {}",
                        status, message
                    ))
                }
                AttemptError::Status { status, message } => {
                    ExtractionError::RateLimitOrTransient {
                        status,
                        attempts: failure.attempts,
                        message,
                    }
                }
                AttemptError::Transport(e) => ExtractionError::Network {
                    attempts: failure.attempts,
                    message: e.0,
                },
            })?;

        let envelope: GenerateContentResponse = serde_json::from_str(&reply.body)
            .map_err(|e| ExtractionError::MalformedResponse(format!("invalid envelope: {}", e)))?;

        Ok(envelope.first_text().unwrap_or_default().to_string())
    }
}
