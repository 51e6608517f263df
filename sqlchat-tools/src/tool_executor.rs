use crate::sqlite_reader;
use crate::tool_error::ToolError;
use crate::types::{ToolErrorResponse, ToolRequest, ToolResponse};
use anyhow::Result;
use serde_json::Value;

/// Executes tool requests issued by an agent
#[derive(Debug, Clone, Default)]
pub struct ToolExecutor {
    db_path: Option<String>,
}

impl ToolExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin every `sqlite3_reader` request to this database, whatever the request names
    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = Some(db_path.into());
        self
    }

    pub fn db_path(&self) -> Option<&str> {
        self.db_path.as_deref()
    }

    /// Execute a tool request and return a tool response
    pub async fn execute(&self, request: ToolRequest) -> Result<ToolResponse> {
        match request {
            ToolRequest::Sqlite3Reader(mut req) => {
                if let Some(db_path) = &self.db_path {
                    req.db_path = db_path.clone();
                }

                match sqlite_reader::execute_sqlite3_reader(req).await {
                    Ok(response) => Ok(ToolResponse::Sqlite3Reader(response)),
                    Err(ToolError::ExecutionError(message)) => Err(anyhow::anyhow!(message)),
                    Err(e) => Ok(ToolResponse::Error(ToolErrorResponse {
                        tool: "sqlite3_reader".to_string(),
                        error: error_kind(&e).to_string(),
                        message: e.to_string(),
                    })),
                }
            }
        }
    }

    /// Execute tool from JSON value (for LLM integration)
    pub async fn execute_from_json(&self, json_request: Value) -> Result<Value> {
        let tool_request: ToolRequest = serde_json::from_value(json_request)?;
        let tool_response = self.execute(tool_request).await?;
        Ok(serde_json::to_value(tool_response)?)
    }
}

fn error_kind(error: &ToolError) -> &'static str {
    match error {
        ToolError::InvalidInput(_) => "invalid_input",
        ToolError::ExecutionError(_) => "execution_error",
        ToolError::QueryRejected(_) => "query_rejected",
    }
}
