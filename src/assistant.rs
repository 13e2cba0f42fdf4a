//! Public entry point: adds date/time context and delegates to the orchestrator.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Local, TimeZone};
use tracing::{info, warn};

use crate::config::AssistantConfig;
use crate::error::ConfigurationError;
use crate::holidays::{HolidayProvider, RemoteHolidayService, SqliteHolidayStore};
use crate::ollama::{OllamaChatClient, OllamaModelSession};
use crate::orchestrator::ToolCallOrchestrator;
use crate::tools::{FunctionRegistry, ToolId, ToolSchema};

pub struct Assistant {
    orchestrator: ToolCallOrchestrator,
}

impl Assistant {
    pub fn new(orchestrator: ToolCallOrchestrator) -> Self {
        Self { orchestrator }
    }

    /// Wire the Ollama backends and the holiday source selected by `use_online_sources`.
    ///
    /// Fails if the schema cannot be used or a backend cannot be constructed.
    pub fn from_config(config: &AssistantConfig, schema: ToolSchema) -> Result<Self, ConfigurationError> {
        for id in ToolId::ALL {
            if schema.get(id.name()).is_none() {
                warn!(target: "assistant", tool = %id, "registered tool missing from schema; the model cannot request it");
            }
        }

        let holidays: Arc<dyn HolidayProvider> = if config.use_online_sources {
            Arc::new(
                RemoteHolidayService::new(&config.holiday_api_url, config.request_timeout)
                    .map_err(|e| ConfigurationError::HolidaySource(format!("{e:#}")))?,
            )
        } else {
            let store = SqliteHolidayStore::open_or_create(&config.holidays_db_path)
                .map_err(|e| ConfigurationError::HolidaySource(format!("{e:#}")))?;
            seed_if_empty(&store, Local::now().year())
                .map_err(|e| ConfigurationError::HolidaySource(format!("{e:#}")))?;
            Arc::new(store)
        };

        let session = OllamaModelSession::new(config, &schema);
        let chat = OllamaChatClient::from_config(config)
            .map_err(|e| ConfigurationError::ModelClient(format!("{e:#}")))?;
        info!(
            target: "assistant",
            model = %session.model(),
            tools = schema.tools().len(),
            online = config.use_online_sources,
            "assistant ready"
        );

        Ok(Self::new(ToolCallOrchestrator::new(
            Arc::new(session),
            Arc::new(chat),
            FunctionRegistry::new(holidays),
        )))
    }

    /// Answer `prompt` with the current local time as context.
    pub fn get_answer(&self, prompt: &str) -> String {
        self.get_answer_at(prompt, Local::now())
    }

    /// Answer `prompt` as if the current time were `now`.
    pub fn get_answer_at<Tz: TimeZone>(&self, prompt: &str, now: DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.orchestrator.answer(&with_time_context(prompt, &now))
    }
}

/// A fresh local dataset gets the fixed national holidays of this year and the next.
fn seed_if_empty(store: &SqliteHolidayStore, year: i32) -> color_eyre::Result<()> {
    if store.count()? > 0 {
        return Ok(());
    }
    warn!(target: "assistant", path = ?store.db_file_path(), "local holiday dataset is empty, seeding national holidays");
    store.seed_national(year)?;
    store.seed_national(year + 1)?;
    Ok(())
}

/// `[Metadata: Data e hora atual: 17/October/2026 09:30:00]\n---\n<prompt>`
pub fn with_time_context<Tz: TimeZone>(prompt: &str, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "[Metadata: Data e hora atual: {}]\n---\n{prompt}",
        now.format("%d/%B/%Y %H:%M:%S")
    )
}
