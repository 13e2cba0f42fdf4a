//! Tool-bound model session over Ollama's OpenAI-compatible endpoint.

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use color_eyre::Result;
use tokio::runtime::Runtime;
use tracing::{debug, info, instrument};

use crate::blocking::outside_runtime;
use crate::config::AssistantConfig;
use crate::ollama::{StructuredResponse, ToolCallRequest};
use crate::tools::ToolSchema;

/// The first model turn: classify the prompt and maybe request a tool.
///
/// `Ok(None)` means the backend answered with nothing usable at all.
pub trait ToolCallingModel: Send + Sync {
    fn invoke(&self, prompt: &str) -> Result<Option<StructuredResponse>>;
}

pub struct OllamaModelSession {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    tools: Vec<ChatCompletionTool>,
}

impl OllamaModelSession {
    /// Bind `schema` to `config.model`. The model name cannot change afterwards.
    pub fn new(config: &AssistantConfig, schema: &ToolSchema) -> Self {
        // Ollama ignores the key but the OpenAI client insists on one.
        let openai_config = OpenAIConfig::new()
            .with_api_base(config.openai_api_base())
            .with_api_key("ollama");
        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            tools: schema.as_chat_tools(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(name = "session_invoke", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn invoke_async(&self, prompt: &str) -> Result<Option<StructuredResponse>> {
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        let req = if self.tools.is_empty() {
            CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages([user.into()])
                .max_completion_tokens(self.max_tokens)
                .build()?
        } else {
            CreateChatCompletionRequestArgs::default()
                .model(&self.model)
                .messages([user.into()])
                .tools(self.tools.clone())
                .max_completion_tokens(self.max_tokens)
                .build()?
        };

        info!(target: "ollama", "session_request: model={}, tools={}", self.model, self.tools.len());
        let resp = self.client.chat().create(req).await?;
        debug!(target: "ollama", "session_response_choices: {}", resp.choices.len());

        let Some(choice) = resp.choices.into_iter().next() else {
            return Ok(None);
        };

        let calls: Vec<ToolCallRequest> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .iter()
            .map(|c| ToolCallRequest::from_wire(&c.function.name, &c.function.arguments))
            .collect();

        Ok(Some(StructuredResponse::from_parts(choice.message.content, calls)))
    }
}

impl ToolCallingModel for OllamaModelSession {
    /// Blocking wrapper: builds a runtime for the call, like the other `_blocking` helpers.
    /// Inside an existing runtime the call runs on a helper thread instead of panicking.
    fn invoke(&self, prompt: &str) -> Result<Option<StructuredResponse>> {
        outside_runtime(|| {
            let rt = Runtime::new()?;
            rt.block_on(self.invoke_async(prompt))
        })
    }
}
