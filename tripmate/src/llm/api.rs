use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ResponseFormat,
    },
    Client,
};

use crate::error::{PlannerError, Result};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
    /// Ask for a JSON object instead of free text.
    pub json_mode: bool,
}

/// Chat-completions client for OpenAI-compatible providers.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.base_url.clone())
            .with_api_key(config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| {
                PlannerError::Initialization(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // async-openai retries 429/5xx internally with its own backoff; a zero
        // elapsed-time budget turns that off so every failure surfaces at once.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self { client, config })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(PlannerError::Validation("Prompt cannot be empty".to_string()));
        }

        let request = self.build_request(prompt)?;

        match self.client.chat().create(request).await {
            Ok(response) => Self::extract_content(response),
            Err(error) => Err(Self::map_openai_error(error)),
        }
    }

    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|error| PlannerError::Validation(format!("Invalid user prompt: {error}")))?
            .into()];

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.config.model.clone()).messages(messages);
        if self.config.json_mode {
            request.response_format(ResponseFormat::JsonObject);
        }

        request.build().map_err(|error| {
            PlannerError::Validation(format!("Invalid LLM completion request: {error}"))
        })
    }

    fn extract_content(response: CreateChatCompletionResponse) -> Result<String> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::Upstream("LLM response contained no choices".to_string()))?
            .message
            .content
            .unwrap_or_default();

        if message.trim().is_empty() {
            return Err(PlannerError::Upstream(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(message)
    }

    fn is_rate_limit_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("rate limit")
            || message.contains("too many requests")
            || error_type.contains("rate_limit")
            || code.contains("rate_limit")
            || code == "insufficient_quota"
    }

    fn is_auth_api_error(api_error: &ApiError) -> bool {
        let message = api_error.message.to_lowercase();
        let error_type = api_error.r#type.clone().unwrap_or_default().to_lowercase();
        let code = api_error.code.clone().unwrap_or_default().to_lowercase();

        message.contains("unauthorized")
            || message.contains("forbidden")
            || message.contains("authentication")
            || message.contains("invalid api key")
            || code.contains("invalid_api_key")
            || code.contains("authentication")
            || error_type.contains("authentication")
    }

    fn map_openai_error(error: OpenAIError) -> PlannerError {
        match error {
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS) =>
            {
                PlannerError::Upstream(format!("Rate limit or quota exceeded: {reqwest_error}"))
            }
            OpenAIError::Reqwest(reqwest_error)
                if reqwest_error.status() == Some(reqwest::StatusCode::UNAUTHORIZED)
                    || reqwest_error.status() == Some(reqwest::StatusCode::FORBIDDEN) =>
            {
                PlannerError::Upstream(format!("Authentication failed: {reqwest_error}"))
            }
            OpenAIError::Reqwest(reqwest_error) => {
                PlannerError::Upstream(format!("LLM request failed: {reqwest_error}"))
            }
            OpenAIError::ApiError(api_error) if Self::is_rate_limit_api_error(&api_error) => {
                PlannerError::Upstream(format!("Rate limit or quota exceeded: {api_error}"))
            }
            OpenAIError::ApiError(api_error) if Self::is_auth_api_error(&api_error) => {
                PlannerError::Upstream(format!("Authentication failed: {api_error}"))
            }
            OpenAIError::ApiError(api_error) => {
                PlannerError::Upstream(format!("LLM API error: {api_error}"))
            }
            OpenAIError::JSONDeserialize(err) => {
                PlannerError::Upstream(format!("Failed to parse LLM response: {err}"))
            }
            OpenAIError::InvalidArgument(message) => PlannerError::Validation(message),
            other => PlannerError::Upstream(other.to_string()),
        }
    }
}

pub fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => OPENAI_BASE_URL,
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => LMSTUDIO_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}
