//! Assistant configuration and defaults.
//!
//! Values come from `AssistantConfig::default()` and can be overridden by
//! environment variables (a `.env` file is honoured through `dotenvy`).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Default Ollama host (native API root, no `/v1` suffix).
pub const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

/// Default BrasilAPI-compatible holiday endpoint root.
pub const DEFAULT_HOLIDAY_API_URL: &str = "https://brasilapi.com.br";

/// Assistant configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantConfig {
    /// Model name served by Ollama, fixed for the lifetime of a session
    pub model: String,
    /// Ollama host URL
    pub ollama_host: String,
    /// Completion token cap for the tool-bound turn
    pub max_tokens: u32,
    /// Location of the `{"tools": [...]}` schema file
    pub tools_path: PathBuf,
    /// `true` selects the remote holiday service, `false` the local SQLite dataset
    pub use_online_sources: bool,
    /// SQLite file backing the local holiday dataset
    pub holidays_db_path: PathBuf,
    /// Root URL of the remote holiday service
    pub holiday_api_url: String,
    /// HTTP timeout applied to the blocking clients
    pub request_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "llama3.1".to_string(),
            ollama_host: DEFAULT_OLLAMA_HOST.to_string(),
            // NOTE: Keep in sync with tests/config_tests.rs.
            max_tokens: 1024,
            tools_path: PathBuf::from("assets/tools.json"),
            use_online_sources: false,
            holidays_db_path: PathBuf::from("holidays.sqlite"),
            holiday_api_url: DEFAULT_HOLIDAY_API_URL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl AssistantConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by an arbitrary key lookup. `from_env` delegates here;
    /// tests pass a closure over a map instead of mutating the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("ASSISTANT_MODEL") {
            cfg.model = v;
        }
        if let Some(v) = get("OLLAMA_HOST") {
            cfg.ollama_host = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("ASSISTANT_MAX_TOKENS") {
            cfg.max_tokens = parse_or("ASSISTANT_MAX_TOKENS", &v, cfg.max_tokens);
        }
        if let Some(v) = get("ASSISTANT_TOOLS_PATH") {
            cfg.tools_path = PathBuf::from(v);
        }
        if let Some(v) = get("ASSISTANT_USE_ONLINE_SOURCES") {
            cfg.use_online_sources = parse_flag(&v).unwrap_or_else(|| {
                warn!(target: "config", key = "ASSISTANT_USE_ONLINE_SOURCES", value = %v, "invalid flag, keeping default");
                cfg.use_online_sources
            });
        }
        if let Some(v) = get("ASSISTANT_HOLIDAYS_DB") {
            cfg.holidays_db_path = PathBuf::from(v);
        }
        if let Some(v) = get("HOLIDAY_API_URL") {
            cfg.holiday_api_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("ASSISTANT_REQUEST_TIMEOUT_SECS") {
            let secs = parse_or("ASSISTANT_REQUEST_TIMEOUT_SECS", &v, cfg.request_timeout.as_secs());
            cfg.request_timeout = Duration::from_secs(secs);
        }
        cfg
    }

    /// OpenAI-compatible API root exposed by Ollama.
    pub fn openai_api_base(&self) -> String {
        format!("{}/v1", self.ollama_host.trim_end_matches('/'))
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: &str, fallback: T) -> T {
    raw.parse().unwrap_or_else(|_| {
        warn!(target: "config", key, value = raw, "invalid number, keeping default");
        fallback
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing_accepts_common_spellings() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn api_base_has_single_slash() {
        let mut cfg = AssistantConfig::new();
        cfg.ollama_host = "http://gpu-box:11434/".into();
        assert_eq!(cfg.openai_api_base(), "http://gpu-box:11434/v1");
    }
}
