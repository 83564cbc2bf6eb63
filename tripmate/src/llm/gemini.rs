use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// How a Gemini endpoint is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiMode {
    /// Free text, optionally grounded with Google Search.
    Chat { web_search: bool },
    /// `application/json` response mime type.
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    status: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    mode: GeminiMode,
}

impl GeminiClient {
    pub fn new(
        base_url: Option<&str>,
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        mode: GeminiMode,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                PlannerError::Initialization(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url
                .unwrap_or(GEMINI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            mode,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn mode(&self) -> GeminiMode {
        self.mode
    }

    pub fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        let (tools, generation_config) = match self.mode {
            GeminiMode::Chat { web_search: true } => (
                vec![Tool {
                    google_search: GoogleSearch {},
                }],
                None,
            ),
            GeminiMode::Chat { web_search: false } => (Vec::new(), None),
            GeminiMode::Json => (
                Vec::new(),
                Some(GenerationConfig {
                    response_mime_type: "application/json",
                }),
            ),
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            tools,
            generation_config,
        }
    }

    /// Send one prompt and return the reply text. Exactly one HTTP request is made.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(PlannerError::Validation("Prompt cannot be empty".to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| PlannerError::Upstream(format!("Invalid API key header: {e}")))?,
        );

        let request = self.build_request(prompt);
        let response = self
            .client
            .post(self.endpoint_url())
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| PlannerError::Upstream(format!("Request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_error_status(status, &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PlannerError::Upstream(format!("Failed to parse response: {e}")))?;

        Self::extract_text(body)
    }

    fn extract_text(response: GenerateContentResponse) -> Result<String> {
        let block_reason = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason);

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(PlannerError::Upstream(match block_reason {
                Some(reason) => format!("Prompt was blocked: {reason}"),
                None => "Model response contained no candidates".to_string(),
            }));
        };

        let text: String = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .collect();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(PlannerError::Upstream(format!(
                "Model response contained empty content (finish reason: {reason})"
            )));
        }

        Ok(text)
    }

    fn map_error_status(status: StatusCode, body: &str) -> PlannerError {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| match envelope.error.status {
                Some(code) => format!("{code}: {}", envelope.error.message),
                None => envelope.error.message,
            })
            .unwrap_or_else(|_| body.trim().to_string());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                PlannerError::Upstream(format!("Authentication failed: {message}"))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                PlannerError::Upstream(format!("Rate limit or quota exceeded: {message}"))
            }
            _ => PlannerError::Upstream(format!("API error {status}: {message}")),
        }
    }
}
