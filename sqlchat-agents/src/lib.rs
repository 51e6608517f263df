pub mod config;
pub mod factory;
pub mod orchestrator;
pub mod sql_agent;
pub mod storage;
pub mod tools;
pub mod transcript;
pub mod types;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlchat_tools::types::{Sqlite3ReaderRequest, ToolRequest, ToolResponse};

/// Represents the types of tools available to agents
#[derive(Debug, Clone, PartialEq)]
pub enum AgentTool {
    Sqlite3Reader,
}

impl AgentTool {
    /// Returns the tool name as used in ToolRequest
    pub fn name(&self) -> &'static str {
        match self {
            AgentTool::Sqlite3Reader => "sqlite3_reader",
        }
    }

    /// Convert AgentTool to a sqlchat-llm-sdk Tool definition for the LLM
    pub fn to_tool_definition(&self) -> sqlchat_llm_sdk::tools::Tool {
        match self {
            AgentTool::Sqlite3Reader => tools::llm_schemas::sqlite3_reader_tool(),
        }
    }

    /// Parse LLM tool call into typed ToolRequest
    pub fn parse_tool_call(name: &str, arguments: serde_json::Value) -> anyhow::Result<ToolRequest> {
        let request = match name {
            "sqlite3_reader" => {
                let req: Sqlite3ReaderRequest = serde_json::from_value(arguments)?;
                ToolRequest::Sqlite3Reader(req)
            }
            _ => anyhow::bail!("Unknown tool: {}", name),
        };

        Ok(request)
    }
}

/// Format ToolResponse for display to LLM
pub fn format_tool_response(response: &ToolResponse) -> String {
    match response {
        ToolResponse::Sqlite3Reader(r) => r.formatted_output.clone(),
        ToolResponse::Error(e) => format!("Error ({}): {}", e.error, e.message),
    }
}

/// Input to an agent's single entry point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub input: String,
}

impl AgentRequest {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// The agent's final answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub output: String,
}

/// Trait defining the structure and behavior of an AI agent
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent's clear objective
    fn objective(&self) -> &str;

    /// Returns the system prompt for the agent
    fn system_prompt(&self) -> String;

    /// Returns the list of tools available to this agent
    fn tools(&self) -> Vec<AgentTool>;

    /// Run the tool loop for `user_prompt` inside an already recorded run
    async fn execute(&self, _user_prompt: &str, _run_id: i64) -> anyhow::Result<String> {
        anyhow::bail!("Execute method not implemented for this agent")
    }

    /// Answer one request, recording it as a new run
    async fn invoke(&self, request: AgentRequest) -> anyhow::Result<AgentResponse>;

    /// Runs recorded so far by this agent
    async fn history(&self) -> anyhow::Result<Vec<types::RunRecord>> {
        Ok(Vec::new())
    }
}
