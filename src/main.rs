use std::io;

use color_eyre::Result;
use holiday_assistant::{run_repl, tools::ToolSchema, Assistant, AssistantConfig};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    color_eyre::install()?;

    // Optional .env with ASSISTANT_* / OLLAMA_HOST overrides.
    let _ = dotenvy::dotenv();

    // Logs go to a file only so they do not interleave with the conversation on stdout.
    let file_appender = rolling::daily("logs", "assistant.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    let config = AssistantConfig::from_env();
    let schema = ToolSchema::load(&config.tools_path)?;
    let assistant = Assistant::from_config(&config, schema)?;

    run_repl(&assistant, io::stdin().lock(), io::stdout().lock())
}
