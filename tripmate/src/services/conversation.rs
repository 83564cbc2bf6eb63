use crate::models::{ConversationTurn, Role};

/// Ordered record of the current planning conversation.
///
/// Only grows between commits; a successful trip commit clears it.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::assistant(text));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last_role(&self) -> Option<Role> {
        self.turns.last().map(|turn| turn.role)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Flatten the log into model context, one `Label: text` line per turn.
    pub fn context_text(&self) -> String {
        self.turns
            .iter()
            .map(ConversationTurn::context_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
