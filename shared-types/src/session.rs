use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which page a session drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PageVariant {
    /// One question per submission, one banner per answer
    Query,
    /// Running transcript replayed on every render
    Chat,
}

impl PageVariant {
    pub fn as_str(&self) -> &str {
        match self {
            PageVariant::Query => "query",
            PageVariant::Chat => "chat",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SessionState {
    /// No credential yet
    Idle,
    /// Credential and database present, agent not built
    Ready,
    /// Agent built
    Active,
    /// Database missing in the chat variant; every action is refused
    Halted,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSessionRequest {
    pub variant: PageVariant,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SessionResponse {
    pub session_id: String,
    pub variant: PageVariant,
    pub state: SessionState,
    pub has_credential: bool,
    pub database_error: Option<String>,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SetCredentialRequest {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AskStatus {
    Success,
    Error,
    Warning,
}

/// One rendered outcome: the banner type and its text
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AskResponse {
    pub status: AskStatus,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatMessageRequest {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatMessageDto {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatTurnResponse {
    pub outcome: AskResponse,
    /// Messages appended to the transcript by this turn, empty when nothing was sent
    pub appended: Vec<ChatMessageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TranscriptResponse {
    pub messages: Vec<ChatMessageDto>,
}
