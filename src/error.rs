//! Error taxonomy for assistant construction and for a single answer turn.

use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. These are fatal: no assistant exists without a valid schema.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("cannot read tool schema {path:?}: {source}")]
    SchemaIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tool schema is not valid JSON or lacks a `tools` array: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("tool schema declares `{0}` more than once")]
    DuplicateTool(String),
    #[error("cannot open holiday source: {0}")]
    HolidaySource(String),
    #[error("cannot build model client: {0}")]
    ModelClient(String),
}

/// Per-turn failures. The orchestrator logs these and answers with a fixed apology.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("model returned no result")]
    ModelUnavailable,
    #[error("tool call #{index} lacks a function name or arguments")]
    MalformedToolCall { index: usize },
    #[error("argument `{argument}` is not an integer: {value:?}")]
    ArgumentCoercion { argument: &'static str, value: String },
    #[error("backend failure: {0:#}")]
    Backend(color_eyre::Report),
}

impl TurnError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            TurnError::ModelUnavailable => "model_unavailable",
            TurnError::MalformedToolCall { .. } => "malformed_tool_call",
            TurnError::ArgumentCoercion { .. } => "argument_coercion",
            TurnError::Backend(_) => "backend",
        }
    }
}

// `eyre::Report` is not `std::error::Error`, so `#[from]` is not available.
impl From<color_eyre::Report> for TurnError {
    fn from(value: color_eyre::Report) -> Self {
        TurnError::Backend(value)
    }
}
