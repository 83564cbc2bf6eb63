use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

pub const DEFAULT_CHAT_MODEL: &str = "gemini/gemini-2.5-pro";
pub const DEFAULT_STRUCTURED_MODEL: &str = "gemini/gemini-2.5-pro";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
    pub synchronous: String,
}

impl DatabaseConfig {
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "file:tripmate.db".to_string(),
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
        }
    }
}

/// Model gateway configuration. One credential drives both endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Conversational endpoint, `provider/model`.
    pub chat_model: String,
    /// Structured (JSON) endpoint, `provider/model`.
    pub structured_model: String,
    pub api_key: Option<String>,
    /// Base URL for OpenAI-compatible backends (`LLM_BASE_URL`). Never used
    /// for Gemini models.
    pub base_url: Option<String>,
    /// Override of the Gemini REST base URL (`GEMINI_BASE_URL`).
    pub gemini_base_url: Option<String>,
    pub timeout_secs: u64,
    pub enable_web_search: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            structured_model: DEFAULT_STRUCTURED_MODEL.to_string(),
            api_key: None,
            base_url: None,
            gemini_base_url: None,
            timeout_secs: 120,
            enable_web_search: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {s}")),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        let db_defaults = DatabaseConfig::default();
        let llm_defaults = LlmConfig::default();

        Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(db_defaults.url),
                busy_timeout_ms: parse_env_or(
                    "DATABASE_BUSY_TIMEOUT_MS",
                    db_defaults.busy_timeout_ms,
                ),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or(db_defaults.journal_mode),
                synchronous: env::var("DATABASE_SYNCHRONOUS").unwrap_or(db_defaults.synchronous),
            },
            llm: LlmConfig {
                chat_model: env::var("CHAT_MODEL").unwrap_or(llm_defaults.chat_model),
                structured_model: env::var("STRUCTURED_MODEL")
                    .unwrap_or(llm_defaults.structured_model),
                api_key: env_non_empty("LLM_API_KEY").or_else(|| env_non_empty("GEMINI_API_KEY")),
                base_url: env_non_empty("LLM_BASE_URL"),
                gemini_base_url: env_non_empty("GEMINI_BASE_URL"),
                timeout_secs: parse_env_or("LLM_TIMEOUT", llm_defaults.timeout_secs),
                enable_web_search: parse_env_or(
                    "ENABLE_WEB_SEARCH",
                    llm_defaults.enable_web_search,
                ),
            },
            logging: LoggingConfig {
                format: parse_env_or("LOG_FORMAT", LogFormat::default()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Providers reached through the native Gemini REST API.
pub const GEMINI_PROVIDERS: &[&str] = &["gemini", "google"];

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str())
            || GEMINI_PROVIDERS.contains(&prefix_lower.as_str())
        {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}
