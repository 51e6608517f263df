use crate::state::AppState;
use actix_web::{get, web, HttpResponse, Responder};
use shared_types::HealthResponse;

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        service: "sqlchat-api".to_string(),
        database_present: state.database_path.is_file(),
    })
}
