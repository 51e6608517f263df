use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tool request enum containing all possible tool operations
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ToolRequest {
    #[serde(rename = "sqlite3_reader")]
    Sqlite3Reader(super::sqlite_reader::Sqlite3ReaderRequest),
}

/// Tool response enum containing all possible tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResponse {
    #[serde(rename = "sqlite3_reader")]
    Sqlite3Reader(super::sqlite_reader::Sqlite3ReaderResponse),
    #[serde(rename = "error")]
    Error(ToolErrorResponse),
}

/// Error response for tool execution failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorResponse {
    pub tool: String,
    pub error: String,
    pub message: String,
}
