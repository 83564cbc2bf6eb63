use crate::config::{parse_llm_provider_model, LlmConfig, GEMINI_PROVIDERS};
use crate::error::{PlannerError, Result};
use crate::llm::api::{default_base_url, ApiConfig, LlmApiClient};
use crate::llm::gemini::{GeminiClient, GeminiMode};
use crate::llm::prompts;
use crate::models::TripProposal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmBackend {
    Gemini,
    OpenAI,
    OpenRouter,
    Ollama,
    LmStudio,
    OpenAICompatible { base_url: String },
}

impl LlmBackend {
    fn detect(provider: &str, base_url: Option<&str>) -> Option<Self> {
        let provider = provider.to_lowercase();
        if GEMINI_PROVIDERS.contains(&provider.as_str()) {
            return Some(Self::Gemini);
        }
        match provider.as_str() {
            "openai" => Some(Self::OpenAI),
            "openrouter" => Some(Self::OpenRouter),
            "ollama" => Some(Self::Ollama),
            "lmstudio" => Some(Self::LmStudio),
            _ => base_url.map(|base_url| Self::OpenAICompatible {
                base_url: base_url.to_string(),
            }),
        }
    }

    fn needs_api_key(&self) -> bool {
        matches!(self, Self::Gemini | Self::OpenAI | Self::OpenRouter)
    }

    fn supports_web_search(&self) -> bool {
        matches!(self, Self::Gemini)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Free-text replies, web search augmented where the backend allows it.
    Conversational,
    /// Replies constrained to syntactically valid JSON.
    Structured,
}

#[derive(Clone)]
enum EndpointClient {
    Gemini(GeminiClient),
    OpenAICompatible(LlmApiClient),
}

/// One independently configured generation capability.
#[derive(Clone)]
pub struct ModelEndpoint {
    backend: LlmBackend,
    kind: EndpointKind,
    model: String,
    web_search: bool,
    client: EndpointClient,
}

impl ModelEndpoint {
    pub fn new(model: &str, kind: EndpointKind, config: &LlmConfig) -> Result<Self> {
        let (provider, model_name) = parse_llm_provider_model(model);
        let backend = LlmBackend::detect(provider, config.base_url.as_deref()).ok_or_else(|| {
            PlannerError::Initialization(format!(
                "Unknown provider in model '{model}' and no LLM_BASE_URL set"
            ))
        })?;

        if backend.needs_api_key() && config.api_key.is_none() {
            return Err(PlannerError::Initialization(format!(
                "API key required for model '{model}' (set LLM_API_KEY or GEMINI_API_KEY)"
            )));
        }

        let web_search = kind == EndpointKind::Conversational && config.enable_web_search;
        if web_search && !backend.supports_web_search() {
            tracing::warn!(
                model,
                "Web search augmentation is only available on Gemini models; continuing without it"
            );
        }
        let web_search = web_search && backend.supports_web_search();

        let client = match &backend {
            LlmBackend::Gemini => {
                let mode = match kind {
                    EndpointKind::Conversational => GeminiMode::Chat { web_search },
                    EndpointKind::Structured => GeminiMode::Json,
                };
                EndpointClient::Gemini(GeminiClient::new(
                    config.gemini_base_url.as_deref(),
                    config.api_key.as_deref().unwrap_or_default(),
                    model_name,
                    config.timeout_secs,
                    mode,
                )?)
            }
            other => {
                let base_url = match (other, &config.base_url) {
                    (LlmBackend::OpenAICompatible { base_url }, _) => base_url.clone(),
                    (_, Some(base_url)) => base_url.clone(),
                    (_, None) => default_base_url(provider).to_string(),
                };
                EndpointClient::OpenAICompatible(LlmApiClient::new(ApiConfig {
                    base_url,
                    api_key: config.api_key.clone(),
                    model: model_name.to_string(),
                    timeout_secs: config.timeout_secs,
                    json_mode: kind == EndpointKind::Structured,
                })?)
            }
        };

        Ok(Self {
            backend,
            kind,
            model: model.to_string(),
            web_search,
            client,
        })
    }

    pub fn backend(&self) -> &LlmBackend {
        &self.backend
    }

    pub fn kind(&self) -> EndpointKind {
        self.kind
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn web_search_enabled(&self) -> bool {
        self.web_search
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        match &self.client {
            EndpointClient::Gemini(client) => client.generate(prompt).await,
            EndpointClient::OpenAICompatible(client) => client.complete(prompt).await,
        }
    }
}

#[derive(Clone)]
enum GatewayState {
    Ready {
        chat: ModelEndpoint,
        structured: ModelEndpoint,
    },
    Uninitialized {
        reason: String,
    },
}

/// Entry point to the hosted model: one conversational and one structured
/// endpoint built from a single credential.
#[derive(Clone)]
pub struct ModelGateway {
    state: GatewayState,
}

impl ModelGateway {
    pub fn initialize(config: &LlmConfig) -> Result<Self> {
        let chat = ModelEndpoint::new(&config.chat_model, EndpointKind::Conversational, config)?;
        let structured =
            ModelEndpoint::new(&config.structured_model, EndpointKind::Structured, config)?;

        tracing::info!(
            chat_model = chat.model(),
            structured_model = structured.model(),
            web_search = chat.web_search_enabled(),
            "Model gateway initialized"
        );

        Ok(Self {
            state: GatewayState::Ready { chat, structured },
        })
    }

    /// A gateway that refuses every call. Used when initialization failed so
    /// the session can still list saved trips.
    pub fn uninitialized(reason: &str) -> Self {
        Self {
            state: GatewayState::Uninitialized {
                reason: reason.to_string(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GatewayState::Ready { .. })
    }

    pub fn chat_endpoint(&self) -> Option<&ModelEndpoint> {
        match &self.state {
            GatewayState::Ready { chat, .. } => Some(chat),
            GatewayState::Uninitialized { .. } => None,
        }
    }

    pub fn structured_endpoint(&self) -> Option<&ModelEndpoint> {
        match &self.state {
            GatewayState::Ready { structured, .. } => Some(structured),
            GatewayState::Uninitialized { .. } => None,
        }
    }

    fn endpoints(&self) -> Result<(&ModelEndpoint, &ModelEndpoint)> {
        match &self.state {
            GatewayState::Ready { chat, structured } => Ok((chat, structured)),
            GatewayState::Uninitialized { reason } => {
                Err(PlannerError::NotInitialized(reason.clone()))
            }
        }
    }

    /// Send the flattened conversation to the conversational endpoint.
    pub async fn converse(&self, context: &str) -> Result<String> {
        let (chat, _) = self.endpoints()?;
        tracing::debug!(context_len = context.len(), "Sending conversation to chat model");
        chat.generate(context).await
    }

    /// Ask the structured endpoint for a trip proposal built from `context`.
    pub async fn extract_structured_trip(&self, context: &str) -> Result<TripProposal> {
        let (_, structured) = self.endpoints()?;
        if context.trim().is_empty() {
            return Err(PlannerError::Validation(
                "Conversation context cannot be empty".to_string(),
            ));
        }

        let prompt = prompts::trip_extraction_prompt(context);
        let text = structured.generate(&prompt).await?;
        tracing::debug!(response_len = text.len(), "Structured trip response received");
        TripProposal::decode(&text)
    }
}
