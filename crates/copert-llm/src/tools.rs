//! Tool types for LLM function calling

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tool schema offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// ID unique within the assistant message that produced it
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as JSON text
    pub arguments: String,
}

impl ToolCall {
    /// Create a tool call
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse arguments as a JSON value
    ///
    /// Empty argument text is read as an empty object; some models send `""`
    /// for tools without parameters.
    pub fn parse_arguments(&self) -> Result<serde_json::Value> {
        if self.arguments.trim().is_empty() {
            return Ok(serde_json::json!({}));
        }
        serde_json::from_str(&self.arguments).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Tool choice strategy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force a tool call
    Required,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_call_parse_arguments() {
        let call = ToolCall::new("call_1", "read_file", r#"{"file_path": "src/main.rs"}"#);
        let args = call.parse_arguments().unwrap();
        assert_eq!(args["file_path"], "src/main.rs");
    }

    #[test]
    fn test_tool_call_empty_arguments() {
        let call = ToolCall::new("call_1", "read_copert_md", "");
        assert_eq!(call.parse_arguments().unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_tool_call_malformed_arguments() {
        let call = ToolCall::new("call_1", "ls", "{not json");
        assert!(matches!(
            call.parse_arguments(),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_tool_choice_default() {
        assert!(matches!(ToolChoice::default(), ToolChoice::Auto));
    }
}
