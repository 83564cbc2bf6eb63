// Shared helpers for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use serde_json::{json, Value};
use tempfile::TempDir;

use tripmate::config::{DatabaseConfig, LlmConfig};
use tripmate::db::{Database, LibSqlBackend};
use tripmate::models::{Role, Trip, TripDetail};
use tripmate::render::Presenter;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const CHAT_MODEL: &str = "gemini-chat";
pub const JSON_MODEL: &str = "gemini-json";

pub const KYOTO_TRIP: &str = r#"{"trip":{"name":"Kyoto Getaway","country":"Japan","startDate":"2025-04-01","endDate":"2025-04-03"},"dailyPlans":[{"date":"2025-04-01","items":[{"name":"Fushimi Inari","type":"attraction"}]}]}"#;

pub fn chat_path() -> String {
    format!("/models/{CHAT_MODEL}:generateContent")
}

pub fn json_path() -> String {
    format!("/models/{JSON_MODEL}:generateContent")
}

/// Gemini configuration pointed at a mock server.
pub fn gemini_config(base_url: &str) -> LlmConfig {
    LlmConfig {
        chat_model: format!("gemini/{CHAT_MODEL}"),
        structured_model: format!("gemini/{JSON_MODEL}"),
        api_key: Some("test-key".to_string()),
        base_url: None,
        gemini_base_url: Some(base_url.to_string()),
        timeout_secs: 5,
        enable_web_search: true,
    }
}

/// A successful `generateContent` response carrying `text`.
pub fn gemini_body(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP",
            "index": 0
        }],
        "usageMetadata": {"promptTokenCount": 1, "candidatesTokenCount": 1, "totalTokenCount": 2}
    })
}

pub fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": content
                },
                "finish_reason": "stop"
            }
        ],
        "usage": {
            "prompt_tokens": 1,
            "completion_tokens": 1,
            "total_tokens": 2
        }
    })
}

/// File-backed store in a temporary directory. Keep the `TempDir` alive for
/// the duration of the test.
pub async fn temp_store() -> (TempDir, Arc<LibSqlBackend>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("tripmate_test.db");
    let config = DatabaseConfig::with_url(format!("file:{}", db_path.display()));

    let database = Database::new(&config)
        .await
        .expect("Failed to open test database");
    (temp_dir, Arc::new(LibSqlBackend::new(database)))
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Message(Role, String),
    TripList(Vec<Trip>),
    TripDetail(TripDetail),
    Busy(bool),
    Notice(String),
}

/// Presenter that records every call for later assertions.
#[derive(Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<PresenterEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<PresenterEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn messages(&self, role: Role) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Message(r, text) if r == role => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PresenterEvent::Notice(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Every `set_busy(true)` was followed by a `set_busy(false)`.
    pub fn busy_balanced(&self) -> bool {
        let mut busy = false;
        for event in self.events() {
            if let PresenterEvent::Busy(state) = event {
                if state == busy {
                    return false;
                }
                busy = state;
            }
        }
        !busy
    }

    fn record(&self, event: PresenterEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl Presenter for RecordingPresenter {
    fn render_message(&self, role: Role, text: &str) {
        self.record(PresenterEvent::Message(role, text.to_string()));
    }

    fn render_trip_list(&self, trips: &[Trip]) {
        self.record(PresenterEvent::TripList(trips.to_vec()));
    }

    fn render_trip_detail(&self, detail: &TripDetail) {
        self.record(PresenterEvent::TripDetail(detail.clone()));
    }

    fn set_busy(&self, busy: bool) {
        self.record(PresenterEvent::Busy(busy));
    }

    fn notify(&self, text: &str) {
        self.record(PresenterEvent::Notice(text.to_string()));
    }
}
