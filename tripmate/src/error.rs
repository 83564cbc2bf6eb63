use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Model initialization failed: {0}")]
    Initialization(String),

    #[error("Model not initialized: {0}")]
    NotInitialized(String),

    #[error("Model request failed: {0}")]
    Upstream(String),

    #[error("Failed to decode structured response: {0}")]
    Decode(String),

    #[error("Incomplete trip proposal: {0}")]
    IncompleteProposal(String),

    #[error("Storage error: {0}")]
    Store(#[from] libsql::Error),

    #[error("Storage error: {0}")]
    Schema(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlannerError {
    /// Sentence shown to the user when a flow fails with this error.
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::Initialization(msg) => format!(
                "The assistant could not be started ({msg}). Check your API key and restart tripmate."
            ),
            PlannerError::NotInitialized(_) => {
                "The assistant is not available in this session. Restart tripmate after fixing the configuration."
                    .to_string()
            }
            PlannerError::Upstream(msg) => format!("Oops, something went wrong: {msg}"),
            PlannerError::Decode(msg) => {
                format!("The assistant's itinerary could not be read: {msg}")
            }
            PlannerError::IncompleteProposal(_) => {
                "⚠️ The assistant answered, but did not produce a usable structured itinerary. \
                 Keep chatting to add details, then try /generate again."
                    .to_string()
            }
            PlannerError::Store(e) => format!("Saving the trip failed: {e}"),
            PlannerError::Schema(msg) => format!("Saving the trip failed: {msg}"),
            PlannerError::Validation(msg) => msg.clone(),
            PlannerError::Io(e) => format!("Input/output error: {e}"),
        }
    }

    pub fn is_incomplete_proposal(&self) -> bool {
        matches!(self, PlannerError::IncompleteProposal(_))
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;
