use super::types::{OpenAIFunction, OpenAITool};
use crate::tools::{Tool, ToolChoice};
use serde_json::Value;

/// Wrap a tool as a Chat Completions `function` entry
pub fn function_tool(tool: &Tool) -> OpenAITool {
    OpenAITool {
        r#type: "function".to_string(),
        function: OpenAIFunction {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters().clone(),
        },
    }
}

pub fn tool_choice_value(choice: &ToolChoice) -> Value {
    Value::String(choice.as_str().to_string())
}
