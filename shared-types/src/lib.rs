use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod runs;
pub mod session;
pub mod typescript_gen;

pub use typescript_gen::generate_typescript_definitions;

pub use runs::{RunListResponse, RunMessage, RunResponse, RunToolCall};
pub use session::{
    AskRequest, AskResponse, AskStatus, ChatMessageDto, ChatMessageRequest, ChatTurnResponse,
    CreateSessionRequest, PageVariant, SessionResponse, SessionState, SetCredentialRequest,
    TranscriptResponse,
};

// Shared models for the sqlchat API and its web front-end

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub database_present: bool,
}
