//! Tool-call orchestration for a single user turn.
//!
//! Flow:
//! 1. ask the tool-bound session about the prompt
//! 2. walk its tool calls in order; the first registered call with complete arguments is dispatched
//! 3. an empty tool result short-circuits with [`NOTHING_FOUND_MESSAGE`]
//! 4. otherwise a follow-up prompt (tool result embedded, or the original prompt) goes to the plain chat
//!
//! Only one tool runs per turn even if the model asks for several.

use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::error::TurnError;
use crate::ollama::{ChatBackend, StructuredResponse, ToolCallingModel};
use crate::tools::{Dispatch, FunctionRegistry, ToolOutput};

/// Returned when any step of the turn fails.
pub const APOLOGY_MESSAGE: &str =
    "Desculpe, parece que houve um erro ao tentar responder. O que acha de reformular a pergunta?";

/// Returned when the follow-up reply carries no text content.
pub const NO_ANSWER_MESSAGE: &str = "Não foi possível encontrar uma resposta para a pergunta";

/// Returned when the holiday tool ran and found nothing.
pub const NOTHING_FOUND_MESSAGE: &str = "Nenhum feriado foi encontrado";

#[derive(Clone)]
pub struct ToolCallOrchestrator {
    session: Arc<dyn ToolCallingModel>,
    chat: Arc<dyn ChatBackend>,
    registry: FunctionRegistry,
}

impl ToolCallOrchestrator {
    pub fn new(
        session: Arc<dyn ToolCallingModel>,
        chat: Arc<dyn ChatBackend>,
        registry: FunctionRegistry,
    ) -> Self {
        Self { session, chat, registry }
    }

    /// Answer a prompt. Never fails: errors are logged and replaced by [`APOLOGY_MESSAGE`].
    pub fn answer(&self, prompt: &str) -> String {
        match self.try_answer(prompt) {
            Ok(text) => text,
            Err(e) => {
                error!(target: "assistant", kind = e.kind(), error = %e, "answer_failed");
                APOLOGY_MESSAGE.to_string()
            }
        }
    }

    /// Same as [`answer`](Self::answer) but surfaces the failure cause.
    #[instrument(name = "try_answer", skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub fn try_answer(&self, prompt: &str) -> Result<String, TurnError> {
        let response = self.session.invoke(prompt)?.ok_or(TurnError::ModelUnavailable)?;
        debug!(target: "assistant", response = %response, "session_response");

        let follow_up = match self.dispatch_first(&response)? {
            Some(output) if output.is_empty() => {
                info!(target: "assistant", "tool returned no items, skipping follow-up turn");
                return Ok(NOTHING_FOUND_MESSAGE.to_string());
            }
            Some(output) => follow_up_prompt(prompt, &output),
            None => prompt.to_string(),
        };

        let reply = self.chat.chat(&follow_up)?;
        match reply.content_text() {
            Some(text) => Ok(text.to_string()),
            None => {
                warn!(target: "assistant", "follow-up reply has no text content");
                Ok(NO_ANSWER_MESSAGE.to_string())
            }
        }
    }

    /// Walk the tool calls in order and dispatch the first one that runs.
    fn dispatch_first(&self, response: &StructuredResponse) -> Result<Option<ToolOutput>, TurnError> {
        for (index, call) in response.tool_calls().iter().enumerate() {
            let name_ok = call.name.as_deref().is_some_and(|n| !n.is_empty());
            let args_ok = call.args.as_ref().is_some_and(|a| !a.is_empty());
            if !name_ok || !args_ok {
                return Err(TurnError::MalformedToolCall { index });
            }

            match self.registry.dispatch(call)? {
                Dispatch::Completed(id, output) => {
                    let ignored = response.tool_calls().len() - index - 1;
                    if ignored > 0 {
                        debug!(target: "assistant", tool = %id, ignored, "single dispatch per turn, remaining calls dropped");
                    }
                    return Ok(Some(output));
                }
                Dispatch::Skipped(_) | Dispatch::Unregistered => continue,
            }
        }
        Ok(None)
    }
}

/// Prompt for the second turn, embedding the tool result.
pub fn follow_up_prompt(prompt: &str, output: &ToolOutput) -> String {
    format!(
        "Dada essa pergunta: '{prompt}', os feriados são: {}. Responda a pergunta de forma resumida e direta e como se estivesse conversando oralmente.",
        output.render()
    )
}
