use crate::helpers::dto::{ask_response, chat_message_dto, run_response, session_response};
use crate::state::AppState;
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use shared_types::{
    AskRequest, ChatMessageRequest, ChatTurnResponse, CreateSessionRequest, ErrorResponse,
    PageVariant, RunListResponse, SetCredentialRequest, TranscriptResponse,
};
use tracing::{error, info, warn};

fn session_not_found(id: &str) -> HttpResponse {
    warn!(session_id = id, "Session not found");
    HttpResponse::NotFound().json(ErrorResponse {
        error: format!("Session {} not found", id),
    })
}

fn wrong_variant(id: &str, expected: PageVariant) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: format!("Session {} is not a {} session", id, expected.as_str()),
    })
}

#[post("/api/sessions")]
pub async fn create_session(
    state: web::Data<AppState>,
    req: web::Json<CreateSessionRequest>,
) -> impl Responder {
    let (_, session) = state.start_session(req.variant);
    let session = session.lock().await;
    HttpResponse::Created().json(session_response(&session))
}

#[get("/api/sessions/{session_id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> impl Responder {
    let id = session_id.into_inner();
    let Some((_, session)) = state.find_session(&id) else {
        return session_not_found(&id);
    };

    let session = session.lock().await;
    HttpResponse::Ok().json(session_response(&session))
}

/// Ends a session, dropping its credential, agent and transcript
#[delete("/api/sessions/{session_id}")]
pub async fn delete_session(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> impl Responder {
    let id = session_id.into_inner();
    match state.find_session(&id) {
        Some((uuid, _)) => {
            state.sessions.remove(&uuid);
            info!(session_id = %uuid, "Session ended");
            HttpResponse::NoContent().finish()
        }
        None => session_not_found(&id),
    }
}

#[put("/api/sessions/{session_id}/credential")]
pub async fn set_credential(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    req: web::Json<SetCredentialRequest>,
) -> impl Responder {
    let id = session_id.into_inner();
    let Some((_, session)) = state.find_session(&id) else {
        return session_not_found(&id);
    };

    let mut session = session.lock().await;
    match session.collect_credential(req.into_inner().api_key) {
        Ok(()) => HttpResponse::Ok().json(session_response(&session)),
        Err(e) => {
            warn!(session_id = %id, error = %e, "Credential refused");
            HttpResponse::Conflict().json(ErrorResponse {
                error: e.to_string(),
            })
        }
    }
}

#[post("/api/sessions/{session_id}/ask")]
pub async fn ask(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    req: web::Json<AskRequest>,
) -> impl Responder {
    let id = session_id.into_inner();
    let Some((_, session)) = state.find_session(&id) else {
        return session_not_found(&id);
    };

    let session = session.lock().await;
    if session.variant() != PageVariant::Query {
        return wrong_variant(&id, PageVariant::Query);
    }

    let outcome = session.ask(&req.question).await;
    HttpResponse::Ok().json(ask_response(&outcome))
}

#[post("/api/sessions/{session_id}/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    req: web::Json<ChatMessageRequest>,
) -> impl Responder {
    let id = session_id.into_inner();
    let Some((_, session)) = state.find_session(&id) else {
        return session_not_found(&id);
    };

    let mut session = session.lock().await;
    if session.variant() != PageVariant::Chat {
        return wrong_variant(&id, PageVariant::Chat);
    }

    let (outcome, appended) = session.send_chat(&req.content).await;
    HttpResponse::Ok().json(ChatTurnResponse {
        outcome: ask_response(&outcome),
        appended: appended.iter().map(chat_message_dto).collect(),
    })
}

#[get("/api/sessions/{session_id}/transcript")]
pub async fn get_transcript(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> impl Responder {
    let id = session_id.into_inner();
    let Some((_, session)) = state.find_session(&id) else {
        return session_not_found(&id);
    };

    let session = session.lock().await;
    HttpResponse::Ok().json(TranscriptResponse {
        messages: session.transcript().iter().map(chat_message_dto).collect(),
    })
}

/// Agent runs recorded for the session, oldest first
#[get("/api/sessions/{session_id}/runs")]
pub async fn list_runs(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> impl Responder {
    let id = session_id.into_inner();
    let Some((_, session)) = state.find_session(&id) else {
        return session_not_found(&id);
    };

    let session = session.lock().await;
    match session.orchestrator().history().await {
        Ok(records) => HttpResponse::Ok().json(RunListResponse {
            runs: records.into_iter().map(run_response).collect(),
        }),
        Err(e) => {
            error!(error = %e, session_id = %id, "Failed to read agent runs");
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: format!("Failed to read agent runs: {}", e),
            })
        }
    }
}
