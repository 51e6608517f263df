use ts_rs::TS;

/// Every type the web front-end consumes, in dependency order
pub const API_TYPE_NAMES: &[&str] = &[
    "PageVariant",
    "SessionState",
    "CreateSessionRequest",
    "SessionResponse",
    "SetCredentialRequest",
    "AskRequest",
    "AskStatus",
    "AskResponse",
    "ChatMessageRequest",
    "ChatMessageDto",
    "ChatTurnResponse",
    "TranscriptResponse",
    "RunMessage",
    "RunToolCall",
    "RunResponse",
    "RunListResponse",
    "ErrorResponse",
    "HealthResponse",
];

pub fn generate_typescript_definitions(
    type_names: &[&str],
) -> Result<String, Box<dyn std::error::Error>> {
    if type_names.is_empty() {
        return Err("No type names provided".into());
    }

    let mut definitions = Vec::new();

    for name in type_names {
        let cleaned = clean_type(export_type(name)?);

        if !cleaned.is_empty() {
            definitions.push(cleaned);
        }
    }

    Ok(definitions.join("\n\n"))
}

fn export_type(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    use crate::*;

    let result = match name {
        "PageVariant" => PageVariant::export_to_string()?,
        "SessionState" => SessionState::export_to_string()?,
        "CreateSessionRequest" => CreateSessionRequest::export_to_string()?,
        "SessionResponse" => SessionResponse::export_to_string()?,
        "SetCredentialRequest" => SetCredentialRequest::export_to_string()?,
        "AskRequest" => AskRequest::export_to_string()?,
        "AskStatus" => AskStatus::export_to_string()?,
        "AskResponse" => AskResponse::export_to_string()?,
        "ChatMessageRequest" => ChatMessageRequest::export_to_string()?,
        "ChatMessageDto" => ChatMessageDto::export_to_string()?,
        "ChatTurnResponse" => ChatTurnResponse::export_to_string()?,
        "TranscriptResponse" => TranscriptResponse::export_to_string()?,

        "RunMessage" => RunMessage::export_to_string()?,
        "RunToolCall" => RunToolCall::export_to_string()?,
        "RunResponse" => RunResponse::export_to_string()?,
        "RunListResponse" => RunListResponse::export_to_string()?,

        "ErrorResponse" => ErrorResponse::export_to_string()?,
        "HealthResponse" => HealthResponse::export_to_string()?,

        _ => {
            return Err(format!(
                "Unknown type: '{}'. Available types: {}",
                name,
                API_TYPE_NAMES.join(", ")
            )
            .into());
        }
    };

    Ok(result)
}

/// Strips imports and the generator banner so definitions can be concatenated
pub fn clean_type(mut type_def: String) -> String {
    type_def.retain(|c| c != '\r');

    type_def
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("import type")
                && !trimmed.starts_with("// This file was generated")
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
