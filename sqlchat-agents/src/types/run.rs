use super::{Message, ToolCall};
use serde::{Deserialize, Serialize};

/// A single question handled by an agent, from user prompt to final answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRun {
    pub id: Option<i64>,
    pub agent_name: String,
    pub provider: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub user_prompt: String,
    pub status: RunStatus,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub result: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }
}

impl AgentRun {
    pub fn complete(&mut self, result: String) {
        self.status = RunStatus::Completed;
        self.result = Some(result);
        self.ended_at = Some(chrono::Utc::now().timestamp());
    }

    pub fn fail(&mut self, error: String) {
        self.status = RunStatus::Failed;
        self.error = Some(error);
        self.ended_at = Some(chrono::Utc::now().timestamp());
    }
}

/// A run together with everything recorded while it executed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run: AgentRun,
    pub messages: Vec<Message>,
    pub tool_calls: Vec<ToolCall>,
}
