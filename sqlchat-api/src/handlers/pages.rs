//! HTML handlers for the single-query page (`/`) and the chat page (`/chat`).
//!
//! The browser's page session is found through the `sqlchat_session` cookie. A visitor
//! without one, or whose cookie points at a session of the other variant, gets a fresh
//! session.

use crate::helpers::dto::ask_response;
use crate::helpers::html::{render_page, PageView};
use crate::session::{PageSession, SharedSession};
use crate::state::AppState;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::{self, ContentType};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use shared_types::{AskResponse, PageVariant};
use sqlchat_agents::orchestrator::QueryOutcome;
use tracing::warn;

pub const SESSION_COOKIE: &str = "sqlchat_session";

#[derive(Debug, Deserialize)]
pub struct CredentialForm {
    #[serde(default)]
    pub api_key: String,
    pub variant: PageVariant,
}

#[derive(Debug, Deserialize)]
pub struct QuestionForm {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

fn page_path(variant: PageVariant) -> &'static str {
    match variant {
        PageVariant::Query => "/",
        PageVariant::Chat => "/chat",
    }
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, id)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// The caller's session for `variant`, plus the cookie to set when a new one was started
async fn resolve_session(
    req: &HttpRequest,
    state: &AppState,
    variant: PageVariant,
) -> (SharedSession, Option<Cookie<'static>>) {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Some((id, session)) = state.find_session(cookie.value()) {
            if session.lock().await.variant() == variant {
                return (session, None);
            }
            state.sessions.remove(&id);
        }
    }

    let (id, session) = state.start_session(variant);
    (session, Some(session_cookie(id.to_string())))
}

fn page_view<'a>(
    session: &'a PageSession,
    banner: Option<AskResponse>,
    question: &'a str,
) -> PageView<'a> {
    PageView {
        variant: session.variant(),
        has_credential: session.has_credential(),
        database_error: session.database_error().map(|e| e.to_string()),
        halted: session.is_halted(),
        banner,
        transcript: session.transcript(),
        question,
    }
}

fn html_response(body: String, cookie: Option<Cookie<'static>>) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    builder.content_type(ContentType::html());
    if let Some(cookie) = cookie {
        builder.cookie(cookie);
    }
    builder.body(body)
}

async fn render_variant(
    req: &HttpRequest,
    state: &AppState,
    variant: PageVariant,
) -> HttpResponse {
    let (session, cookie) = resolve_session(req, state, variant).await;
    let session = session.lock().await;
    let body = render_page(&page_view(&session, None, ""));
    html_response(body, cookie)
}

#[get("/")]
pub async fn query_page(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    render_variant(&req, &state, PageVariant::Query).await
}

#[get("/chat")]
pub async fn chat_page(req: HttpRequest, state: web::Data<AppState>) -> impl Responder {
    render_variant(&req, &state, PageVariant::Chat).await
}

#[post("/credential")]
pub async fn submit_credential(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<CredentialForm>,
) -> impl Responder {
    let CredentialForm { api_key, variant } = form.into_inner();
    let (session, cookie) = resolve_session(&req, &state, variant).await;
    let mut session = session.lock().await;

    if let Err(e) = session.collect_credential(api_key) {
        warn!(session_id = %session.id(), error = %e, "Credential refused");
        let banner = ask_response(&QueryOutcome::Failure(e));
        let body = render_page(&page_view(&session, Some(banner), ""));
        return html_response(body, cookie);
    }

    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, page_path(variant)));
    if let Some(cookie) = cookie {
        builder.cookie(cookie);
    }
    builder.finish()
}

#[post("/query")]
pub async fn submit_query(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<QuestionForm>,
) -> impl Responder {
    let (session, cookie) = resolve_session(&req, &state, PageVariant::Query).await;
    let session = session.lock().await;

    let outcome = session.ask(&form.question).await;
    let body = render_page(&page_view(
        &session,
        Some(ask_response(&outcome)),
        &form.question,
    ));
    html_response(body, cookie)
}

#[post("/chat")]
pub async fn submit_chat(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<ChatForm>,
) -> impl Responder {
    let (session, cookie) = resolve_session(&req, &state, PageVariant::Chat).await;
    let mut session = session.lock().await;

    let (outcome, appended) = session.send_chat(&form.message).await;
    // Recorded turns are shown by the transcript itself
    let banner = appended.is_empty().then(|| ask_response(&outcome));
    let body = render_page(&page_view(&session, banner, ""));
    html_response(body, cookie)
}
