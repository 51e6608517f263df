use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RunMessage {
    pub role: String,
    pub content: String,
    #[ts(type = "number")]
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RunToolCall {
    pub tool_name: String,
    #[ts(type = "unknown")]
    pub request: serde_json::Value,
    #[ts(type = "unknown")]
    pub response: Option<serde_json::Value>,
    pub status: String,
    #[ts(type = "number | null")]
    pub execution_time_ms: Option<i64>,
}

/// One agent run: the question, the answer or error, and what happened in between
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RunResponse {
    #[ts(type = "number")]
    pub id: i64,
    pub agent_name: String,
    pub provider: String,
    pub model: String,
    pub user_prompt: String,
    pub status: String,
    pub result: Option<String>,
    pub error: Option<String>,
    pub messages: Vec<RunMessage>,
    pub tool_calls: Vec<RunToolCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RunListResponse {
    pub runs: Vec<RunResponse>,
}
