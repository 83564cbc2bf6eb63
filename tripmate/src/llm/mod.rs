mod api;
pub mod gemini;
pub mod prompts;
mod provider;

pub use api::{ApiConfig, LlmApiClient};
pub use gemini::{GeminiClient, GeminiMode};
pub use provider::{EndpointKind, LlmBackend, ModelEndpoint, ModelGateway};
