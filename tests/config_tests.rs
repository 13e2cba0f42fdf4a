use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use holiday_assistant::AssistantConfig;
mod common;

#[ctor::ctor]
fn _init() { common::init(); }

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn config_defaults() {
    let c = AssistantConfig::new();
    assert_eq!(c.model, "llama3.1");
    assert_eq!(c.ollama_host, "http://localhost:11434");
    assert_eq!(c.max_tokens, 1024);
    assert_eq!(c.tools_path, PathBuf::from("assets/tools.json"));
    assert!(!c.use_online_sources);
    assert_eq!(c.request_timeout, Duration::from_secs(120));
}

#[test]
fn overrides_from_lookup() {
    let c = AssistantConfig::from_lookup(lookup(&[
        ("ASSISTANT_MODEL", "llama3.2"),
        ("OLLAMA_HOST", "http://gpu:11434/"),
        ("ASSISTANT_USE_ONLINE_SOURCES", "true"),
        ("ASSISTANT_MAX_TOKENS", "256"),
        ("ASSISTANT_REQUEST_TIMEOUT_SECS", "5"),
        ("HOLIDAY_API_URL", "http://mirror.local/"),
    ]));
    assert_eq!(c.model, "llama3.2");
    assert_eq!(c.ollama_host, "http://gpu:11434");
    assert_eq!(c.openai_api_base(), "http://gpu:11434/v1");
    assert!(c.use_online_sources);
    assert_eq!(c.max_tokens, 256);
    assert_eq!(c.request_timeout, Duration::from_secs(5));
    assert_eq!(c.holiday_api_url, "http://mirror.local");
}

#[test]
fn invalid_values_keep_defaults() {
    let c = AssistantConfig::from_lookup(lookup(&[
        ("ASSISTANT_MAX_TOKENS", "lots"),
        ("ASSISTANT_USE_ONLINE_SOURCES", "perhaps"),
        ("ASSISTANT_MODEL", "   "),
    ]));
    assert_eq!(c, AssistantConfig::default());
}
