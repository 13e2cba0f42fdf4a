use std::collections::HashSet;
use std::fs;
use std::path::Path;

use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use serde::Deserialize;
use serde_json::Value;

use crate::error::ConfigurationError;

/// Tool metadata handed to the model at binding time.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// JSON schema of the parameters object
    pub parameters: Value,
}

impl ToolDescriptor {
    /// OpenAI SDK `FunctionObject`
    pub fn function_object(&self) -> FunctionObject {
        FunctionObject {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: Some(self.parameters.clone()),
            strict: None,
        }
    }

    /// ChatCompletionTool form for the request `tools` vector
    pub fn as_chat_tool(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: self.function_object(),
        }
    }
}

/// Immutable list of tool descriptors loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSchema {
    tools: Vec<ToolDescriptor>,
}

#[derive(Deserialize)]
struct SchemaFile {
    tools: Vec<RawTool>,
}

// Entries may be written OpenAI style (`{"type":"function","function":{...}}`) or flat.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTool {
    Wrapped { function: RawFunction },
    Flat(RawFunction),
}

#[derive(Deserialize)]
struct RawFunction {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "empty_object")]
    parameters: Value,
}

fn empty_object() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl ToolSchema {
    pub fn new(tools: Vec<ToolDescriptor>) -> Result<Self, ConfigurationError> {
        let mut seen = HashSet::new();
        for t in &tools {
            if !seen.insert(t.name.as_str()) {
                return Err(ConfigurationError::DuplicateTool(t.name.clone()));
            }
        }
        Ok(Self { tools })
    }

    /// Parse a `{"tools": [...]}` document.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigurationError> {
        let file: SchemaFile = serde_json::from_str(text)?;
        let tools = file
            .tools
            .into_iter()
            .map(|raw| {
                let f = match raw {
                    RawTool::Wrapped { function } => function,
                    RawTool::Flat(f) => f,
                };
                ToolDescriptor { name: f.name, description: f.description, parameters: f.parameters }
            })
            .collect();
        Self::new(tools)
    }

    /// Read and parse a schema file. Any failure is a startup error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|source| ConfigurationError::SchemaIo {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn as_chat_tools(&self) -> Vec<ChatCompletionTool> {
        self.tools.iter().map(|t| t.as_chat_tool()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_and_flat_entries() {
        let schema = ToolSchema::from_json_str(
            r#"{"tools":[
                {"type":"function","function":{"name":"get_holidays","parameters":{"type":"object"}}},
                {"name":"other","description":"flat"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(schema.tools().len(), 2);
        assert_eq!(schema.get("other").unwrap().description.as_deref(), Some("flat"));
        assert_eq!(schema.as_chat_tools()[0].function.name, "get_holidays");
    }

    #[test]
    fn missing_tools_key_is_configuration_error() {
        let err = ToolSchema::from_json_str(r#"{"functions":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::SchemaParse(_)));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = ToolSchema::from_json_str(r#"{"tools":[{"name":"a"},{"name":"a"}]}"#).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicateTool(ref n) if n == "a"));
    }
}
