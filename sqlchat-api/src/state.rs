use crate::session::{SessionRegistry, SharedSession};
use shared_types::PageVariant;
use sqlchat_agents::factory::AgentFactory;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Process-wide state handed to every handler through `web::Data`
pub struct AppState {
    pub database_path: PathBuf,
    pub factory: Arc<dyn AgentFactory>,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(database_path: impl Into<PathBuf>, factory: Arc<dyn AgentFactory>) -> Self {
        Self {
            database_path: database_path.into(),
            factory,
            sessions: SessionRegistry::default(),
        }
    }

    /// Replaces the registry with one that drops sessions idle for longer than `ttl`
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = SessionRegistry::new(ttl);
        self
    }

    pub fn start_session(&self, variant: PageVariant) -> (Uuid, SharedSession) {
        self.sessions
            .create(variant, &self.database_path, self.factory.clone())
    }

    /// Looks up a session by the string form of its id
    pub fn find_session(&self, id: &str) -> Option<(Uuid, SharedSession)> {
        let id = Uuid::parse_str(id).ok()?;
        self.sessions.get(&id).map(|session| (id, session))
    }
}
