use serde::{Deserialize, Serialize};

/// One entry of an agent run's conversation with the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<i64>,
    pub run_id: i64,
    pub role: MessageRole,
    pub content: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
            MessageRole::Tool => "tool",
        }
    }
}

impl Message {
    pub fn new(run_id: i64, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: None,
            run_id,
            role,
            content: content.into(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }
}
