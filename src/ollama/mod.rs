//! Ollama access: the tool-bound session and the plain follow-up chat client.

mod raw_chat;
mod session;
mod types;

pub use raw_chat::{ChatBackend, OllamaChatClient};
pub use session::{OllamaModelSession, ToolCallingModel};
pub use types::{ChatMessage, ChatResponse, StructuredResponse, ToolArguments, ToolCallRequest};
