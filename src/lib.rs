//! Holiday-aware chat assistant on top of a local Ollama model.
//!
//! The model may answer directly or request the `get_holidays` tool; tool results are
//! fed back through a second, unbound chat turn. See [`orchestrator`] for the protocol.

pub mod assistant;
mod blocking;
pub mod config;
pub mod error;
pub mod holidays;
pub mod ollama;
pub mod orchestrator;
pub mod repl;
pub mod tools;

pub use assistant::{with_time_context, Assistant};
pub use config::AssistantConfig;
pub use error::{ConfigurationError, TurnError};
pub use orchestrator::{
    ToolCallOrchestrator, APOLOGY_MESSAGE, NOTHING_FOUND_MESSAGE, NO_ANSWER_MESSAGE,
};
pub use repl::run_repl;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}
