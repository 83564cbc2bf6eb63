mod conversation;
mod planner;

pub use conversation::ConversationLog;
pub use planner::{
    GenerateOutcome, PlannerSession, SendOutcome, EMPTY_CONVERSATION_NOTICE, EXTRACTING_NOTICE,
    GREETING, STARTUP_FAILED,
};
