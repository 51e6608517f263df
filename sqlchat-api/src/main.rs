use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use sqlchat_agents::factory::{AgentFactory, OpenAiSqlAgentFactory};
use sqlchat_api::config::{ApiConfig, LoggingConfig};
use sqlchat_api::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sqlchat-api")]
#[command(about = "Ask questions about a SQLite database in plain English")]
struct Args {
    /// Config file, defaults to <config dir>/sqlchat/api.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "sqlchat-api.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(writer),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    let (config, config_path) = ApiConfig::load(args.config.as_deref())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let _log_guard = init_tracing(&config.logging);
    info!(config = %config_path.display(), "Configuration loaded");

    if !config.database.path.is_file() {
        warn!(
            db_path = %config.database.path.display(),
            "Database file not found; sessions will report it"
        );
    }

    let factory: Arc<dyn AgentFactory> = Arc::new(OpenAiSqlAgentFactory::new(config.llm.clone()));
    let state = web::Data::new(
        AppState::new(config.database.path.clone(), factory)
            .with_session_ttl(config.server.session_ttl()),
    );
    let allowed_origins = config.cors.allowed_origins.clone();

    let bind_addr = config.server.bind_addr();
    info!(
        model = %config.llm.model,
        db_path = %config.database.path.display(),
        "Starting sqlchat-api server at http://{}",
        bind_addr
    );

    HttpServer::new(move || {
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .configure(sqlchat_api::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
