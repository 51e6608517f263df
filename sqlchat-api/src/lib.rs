use actix_web::web;

pub mod config;
pub mod handlers;
pub mod helpers;
pub mod session;
pub mod state;

pub use state::AppState;

/// Registers every page and API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(handlers::health::health)
        .service(handlers::pages::query_page)
        .service(handlers::pages::chat_page)
        .service(handlers::pages::submit_credential)
        .service(handlers::pages::submit_query)
        .service(handlers::pages::submit_chat)
        .service(handlers::sessions::create_session)
        .service(handlers::sessions::get_session)
        .service(handlers::sessions::delete_session)
        .service(handlers::sessions::set_credential)
        .service(handlers::sessions::ask)
        .service(handlers::sessions::send_message)
        .service(handlers::sessions::get_transcript)
        .service(handlers::sessions::list_runs);
}
