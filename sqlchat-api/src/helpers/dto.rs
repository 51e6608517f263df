use crate::session::PageSession;
use shared_types::{
    AskResponse, AskStatus, ChatMessageDto, RunMessage, RunResponse, RunToolCall, SessionResponse,
};
use sqlchat_agents::orchestrator::QueryOutcome;
use sqlchat_agents::transcript::ChatMessage;
use sqlchat_agents::types::RunRecord;

/// Banner type and text for one outcome
pub fn ask_response(outcome: &QueryOutcome) -> AskResponse {
    match outcome.error() {
        None => AskResponse {
            status: AskStatus::Success,
            text: outcome.text(),
            kind: None,
        },
        Some(error) => AskResponse {
            status: if error.is_warning() {
                AskStatus::Warning
            } else {
                AskStatus::Error
            },
            text: error.to_string(),
            kind: Some(error.kind().to_string()),
        },
    }
}

pub fn chat_message_dto(message: &ChatMessage) -> ChatMessageDto {
    ChatMessageDto {
        role: message.role.as_str().to_string(),
        content: message.content.clone(),
    }
}

pub fn session_response(session: &PageSession) -> SessionResponse {
    SessionResponse {
        session_id: session.id().to_string(),
        variant: session.variant(),
        state: session.state(),
        has_credential: session.has_credential(),
        database_error: session.database_error().map(|e| e.to_string()),
        message_count: session.transcript().len(),
    }
}

pub fn run_response(record: RunRecord) -> RunResponse {
    let RunRecord {
        run,
        messages,
        tool_calls,
    } = record;

    RunResponse {
        id: run.id.unwrap_or_default(),
        agent_name: run.agent_name,
        provider: run.provider,
        model: run.model,
        user_prompt: run.user_prompt,
        status: run.status.as_str().to_string(),
        result: run.result,
        error: run.error,
        messages: messages
            .into_iter()
            .map(|m| RunMessage {
                role: m.role.as_str().to_string(),
                content: m.content,
                created_at: m.created_at,
            })
            .collect(),
        tool_calls: tool_calls
            .into_iter()
            .map(|tc| RunToolCall {
                status: tc.status.as_str().to_string(),
                tool_name: tc.tool_name,
                request: tc.request,
                response: tc.response,
                execution_time_ms: tc.execution_time_ms,
            })
            .collect(),
    }
}
