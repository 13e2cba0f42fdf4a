use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::Deserialize;
use serde_json::Value;

/// Raw tool arguments as produced by the model. Values are untyped text.
pub type ToolArguments = BTreeMap<String, String>;

/// One tool call requested by the model. Either half may be missing in a malformed reply.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolCallRequest {
    pub name: Option<String>,
    pub args: Option<ToolArguments>,
}

impl ToolCallRequest {
    pub fn new<N, I, K, V>(name: N, args: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: Some(name.into()),
            args: Some(args.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Build from an OpenAI-style `(name, arguments JSON string)` pair.
    ///
    /// Unparseable or non-object arguments become `None`. Scalars are rendered as text,
    /// JSON `null` entries are dropped.
    pub fn from_wire(name: &str, arguments: &str) -> Self {
        let name = Some(name.trim()).filter(|n| !n.is_empty()).map(str::to_string);
        let args = match serde_json::from_str::<Value>(arguments) {
            Ok(Value::Object(map)) => Some(
                map.into_iter()
                    .filter_map(|(k, v)| match v {
                        Value::Null => None,
                        Value::String(s) => Some((k, s)),
                        other => Some((k, other.to_string())),
                    })
                    .collect(),
            ),
            _ => None,
        };
        Self { name, args }
    }
}

/// Interpreted reply of the tool-bound model turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredResponse {
    PlainText(String),
    ToolCalls(Vec<ToolCallRequest>),
}

impl StructuredResponse {
    /// An empty call list is treated as a plain-text reply.
    pub fn from_parts(text: Option<String>, calls: Vec<ToolCallRequest>) -> Self {
        if calls.is_empty() {
            StructuredResponse::PlainText(text.unwrap_or_default())
        } else {
            StructuredResponse::ToolCalls(calls)
        }
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match self {
            StructuredResponse::ToolCalls(calls) => calls,
            StructuredResponse::PlainText(_) => &[],
        }
    }
}

impl Display for StructuredResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuredResponse::PlainText(t) => write!(f, "PlainText(len={})", t.len()),
            StructuredResponse::ToolCalls(calls) => {
                write!(f, "ToolCalls[")?;
                for (i, c) in calls.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}({:?})", c.name.as_deref().unwrap_or("?"), c.args)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Reply of the native `/api/chat` endpoint. Only `message.content` is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<Value>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            message: Some(ChatMessage {
                role: Some("assistant".to_string()),
                content: Some(Value::String(content.into())),
            }),
        }
    }

    /// `Some` only when `message.content` is a JSON string.
    pub fn content_text(&self) -> Option<&str> {
        self.message.as_ref()?.content.as_ref()?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_arguments_are_stringified() {
        let call = ToolCallRequest::from_wire("get_holidays", r#"{"state":"SP","year":2024,"month":"12","x":null}"#);
        let args = call.args.unwrap();
        assert_eq!(args["year"], "2024");
        assert_eq!(args["month"], "12");
        assert!(!args.contains_key("x"));
    }

    #[test]
    fn wire_garbage_arguments_are_missing() {
        let call = ToolCallRequest::from_wire("", "not json");
        assert_eq!(call, ToolCallRequest::default());
    }

    #[test]
    fn empty_call_list_becomes_plain_text() {
        let r = StructuredResponse::from_parts(Some("oi".into()), vec![]);
        assert_eq!(r, StructuredResponse::PlainText("oi".into()));
    }

    #[test]
    fn non_string_content_has_no_text() {
        let r: ChatResponse = serde_json::from_str(r#"{"message":{"role":"assistant","content":[1,2]}}"#).unwrap();
        assert!(r.content_text().is_none());
        assert_eq!(ChatResponse::text("ok").content_text(), Some("ok"));
    }
}
