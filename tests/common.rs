#![allow(dead_code)]

use std::sync::{Arc, Mutex, Once};

use chrono::NaiveDate;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use holiday_assistant::holidays::{Holiday, HolidayProvider};
use holiday_assistant::ollama::{ChatBackend, ChatResponse, StructuredResponse, ToolCallRequest, ToolCallingModel};
use holiday_assistant::tools::FunctionRegistry;
use holiday_assistant::ToolCallOrchestrator;
use once_cell::sync::Lazy;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static START: Once = Once::new();
static _GUARD: Lazy<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> = Lazy::new(|| Mutex::new(None));

/// Initialize test environment: dotenv and tracing (stderr + file).
/// Idempotent: safe to call multiple times.
pub fn init() {
    START.call_once(|| {
        let _ = dotenvy::dotenv();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("debug"))
            .expect("env filter");

        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard);

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(file_nb);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();

        tracing::info!(target: "test_init", "Test tracing initialized (stderr + rotating file)");
    });
}

/// Tool-bound model that always returns the same scripted reply and records prompts.
pub struct ScriptedModel {
    reply: Option<StructuredResponse>,
    fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: StructuredResponse) -> Self {
        Self { reply: Some(reply), fail: false, prompts: Mutex::new(Vec::new()) }
    }

    pub fn silent() -> Self {
        Self { reply: None, fail: false, prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { reply: None, fail: true, prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ToolCallingModel for ScriptedModel {
    fn invoke(&self, prompt: &str) -> Result<Option<StructuredResponse>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(eyre!("connection refused"));
        }
        Ok(self.reply.clone())
    }
}

/// Follow-up chat backend with a fixed reply; records every prompt it receives.
pub struct RecordingChat {
    reply: ChatResponse,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingChat {
    pub fn replying(text: &str) -> Self {
        Self::with_response(ChatResponse::text(text))
    }

    pub fn with_response(reply: ChatResponse) -> Self {
        Self { reply, prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl ChatBackend for RecordingChat {
    fn chat(&self, prompt: &str) -> Result<ChatResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Holiday provider returning a fixed list and recording lookups.
pub struct FixedHolidays {
    items: Vec<Holiday>,
    pub lookups: Mutex<Vec<(String, i32, u32)>>,
}

impl FixedHolidays {
    pub fn new(items: Vec<Holiday>) -> Self {
        Self { items, lookups: Mutex::new(Vec::new()) }
    }

    pub fn christmas() -> Self {
        Self::new(vec![Holiday::national(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap(), "Natal")])
    }

    pub fn lookups(&self) -> Vec<(String, i32, u32)> {
        self.lookups.lock().unwrap().clone()
    }
}

impl HolidayProvider for FixedHolidays {
    fn get_holidays(&self, state: &str, year: i32, month: u32) -> Result<Vec<Holiday>> {
        self.lookups.lock().unwrap().push((state.to_string(), year, month));
        Ok(self.items.clone())
    }
}

pub fn holiday_call(pairs: &[(&str, &str)]) -> ToolCallRequest {
    ToolCallRequest::new("get_holidays", pairs.iter().map(|(k, v)| (*k, *v)))
}

pub struct Harness {
    pub orchestrator: ToolCallOrchestrator,
    pub model: Arc<ScriptedModel>,
    pub chat: Arc<RecordingChat>,
    pub holidays: Arc<FixedHolidays>,
}

pub fn harness(model: ScriptedModel, chat: RecordingChat, holidays: FixedHolidays) -> Harness {
    let model = Arc::new(model);
    let chat = Arc::new(chat);
    let holidays = Arc::new(holidays);
    let orchestrator = ToolCallOrchestrator::new(
        model.clone(),
        chat.clone(),
        FunctionRegistry::new(holidays.clone()),
    );
    Harness { orchestrator, model, chat, holidays }
}
