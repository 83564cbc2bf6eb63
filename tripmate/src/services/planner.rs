use std::sync::Arc;

use crate::db::TripStore;
use crate::error::{PlannerError, Result};
use crate::llm::ModelGateway;
use crate::models::{Role, Trip, TripDetail};
use crate::render::Presenter;

use super::ConversationLog;

pub const GREETING: &str = "Hello! I'm your travel planning assistant. Where would you like to go?";
pub const STARTUP_FAILED: &str =
    "The assistant could not be started, so chatting is unavailable. Saved trips can still be listed with /trips.";
pub const EMPTY_CONVERSATION_NOTICE: &str =
    "Chat with the assistant about your trip first, then generate it!";
pub const EXTRACTING_NOTICE: &str = "Sure, I'm putting your full itinerary together and saving it...";

#[derive(Debug)]
pub enum SendOutcome {
    Replied,
    /// Blank input; nothing happened.
    Ignored,
    Failed(PlannerError),
}

#[derive(Debug)]
pub enum GenerateOutcome {
    Saved { trip_id: i64, name: String },
    /// Nothing to extract from; the gateway was not called.
    EmptyConversation,
    Failed(PlannerError),
}

/// One planning session: the conversation so far plus the model and store
/// it talks to. Every flow catches its own errors and renders them.
pub struct PlannerSession {
    gateway: ModelGateway,
    store: Arc<dyn TripStore>,
    presenter: Arc<dyn Presenter>,
    conversation: ConversationLog,
}

impl PlannerSession {
    pub fn new(
        gateway: ModelGateway,
        store: Arc<dyn TripStore>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            gateway,
            store,
            presenter,
            conversation: ConversationLog::new(),
        }
    }

    pub fn conversation(&self) -> &ConversationLog {
        &self.conversation
    }

    pub fn gateway(&self) -> &ModelGateway {
        &self.gateway
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    pub fn greet(&self) {
        let text = if self.gateway.is_ready() {
            GREETING
        } else {
            STARTUP_FAILED
        };
        self.presenter.render_message(Role::Assistant, text);
    }

    /// Append the user's message, ask the model and append its reply.
    ///
    /// If the model call fails the user turn stays in the log.
    pub async fn send_message(&mut self, input: &str) -> SendOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        self.presenter.render_message(Role::User, text);
        self.conversation.push_user(text);

        let context = self.conversation.context_text();
        self.presenter.set_busy(true);
        let result = self.gateway.converse(&context).await;
        self.presenter.set_busy(false);

        match result {
            Ok(reply) => {
                self.presenter.render_message(Role::Assistant, &reply);
                self.conversation.push_assistant(reply);
                SendOutcome::Replied
            }
            Err(error) => {
                tracing::error!(error = %error, turns = self.conversation.len(), "Chat request failed");
                self.presenter
                    .render_message(Role::Assistant, &error.user_message());
                SendOutcome::Failed(error)
            }
        }
    }

    /// Turn the conversation into a structured trip and save it. The log is
    /// cleared only after the trip has been committed.
    pub async fn generate_trip(&mut self) -> GenerateOutcome {
        if self.conversation.is_empty() {
            self.presenter.notify(EMPTY_CONVERSATION_NOTICE);
            return GenerateOutcome::EmptyConversation;
        }

        self.presenter.set_busy(true);
        self.presenter
            .render_message(Role::Assistant, EXTRACTING_NOTICE);
        let result = self.extract_and_commit().await;
        self.presenter.set_busy(false);

        match result {
            Ok((trip_id, name)) => {
                self.presenter.render_message(
                    Role::Assistant,
                    &format!("✅ Great! Your trip **{name}** has been saved!"),
                );
                self.conversation.clear();
                GenerateOutcome::Saved { trip_id, name }
            }
            Err(error) => {
                if error.is_incomplete_proposal() {
                    tracing::warn!(error = %error, "Structured reply was not a usable trip");
                } else {
                    tracing::error!(error = %error, "Trip generation failed");
                }
                self.presenter
                    .render_message(Role::Assistant, &error.user_message());
                GenerateOutcome::Failed(error)
            }
        }
    }

    async fn extract_and_commit(&self) -> Result<(i64, String)> {
        let context = self.conversation.context_text();
        let proposal = self.gateway.extract_structured_trip(&context).await?;
        let plan = proposal.into_plan()?;
        let trip_id = self.store.commit_trip(&plan).await?;

        tracing::info!(
            trip_id,
            daily_plans = plan.daily_plans.len(),
            items = plan.item_count(),
            "Trip saved from conversation"
        );
        Ok((trip_id, plan.display_name().to_string()))
    }

    /// Render every saved trip. Failures are reported with a notice.
    pub async fn show_trips(&self) -> Result<Vec<Trip>> {
        match self.store.list_trips().await {
            Ok(trips) => {
                self.presenter.render_trip_list(&trips);
                Ok(trips)
            }
            Err(error) => {
                tracing::error!(error = %error, "Failed to list trips");
                self.presenter.notify("Could not load the trip list!");
                Err(error)
            }
        }
    }

    pub async fn show_trip(&self, id: i64) -> Result<Option<TripDetail>> {
        match self.store.get_trip_detail(id).await {
            Ok(Some(detail)) => {
                self.presenter.render_trip_detail(&detail);
                Ok(Some(detail))
            }
            Ok(None) => {
                self.presenter.notify(&format!("No saved trip with id {id}."));
                Ok(None)
            }
            Err(error) => {
                tracing::error!(trip_id = id, error = %error, "Failed to load trip");
                self.presenter.notify("Could not load that trip!");
                Err(error)
            }
        }
    }
}
