//! Conversational trip planner: chat with a hosted model about a trip, then
//! turn the conversation into a structured itinerary saved in a local
//! database.

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod render;
pub mod repl;
pub mod services;
