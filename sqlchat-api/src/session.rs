//! Page sessions: the per-visitor state behind both page variants.
//!
//! Each session owns its credential, its orchestrator (and through it the memoized
//! agent) and, in the chat variant, its transcript. Sessions share nothing with each
//! other except the agent factory.

use shared_types::{PageVariant, SessionState};
use sqlchat_agents::factory::AgentFactory;
use sqlchat_agents::orchestrator::{Credential, Orchestrator, OrchestratorError, QueryOutcome};
use sqlchat_agents::transcript::{ChatMessage, Transcript};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long a session may go untouched before the registry drops it
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug)]
pub struct PageSession {
    id: Uuid,
    variant: PageVariant,
    credential: Credential,
    orchestrator: Orchestrator,
    transcript: Transcript,
}

impl PageSession {
    /// Starts a session; the database is checked here, once
    pub fn new(
        variant: PageVariant,
        database_path: &Path,
        factory: Arc<dyn AgentFactory>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            variant,
            credential: Credential::default(),
            orchestrator: Orchestrator::new(database_path, factory),
            transcript: Transcript::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn variant(&self) -> PageVariant {
        self.variant
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_provided()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        self.transcript.messages()
    }

    pub fn database_error(&self) -> Option<&OrchestratorError> {
        self.orchestrator.database_error()
    }

    /// A chat session without its database refuses every action
    pub fn is_halted(&self) -> bool {
        self.variant == PageVariant::Chat && self.database_error().is_some()
    }

    pub fn state(&self) -> SessionState {
        if self.is_halted() {
            SessionState::Halted
        } else if self.database_error().is_some() || !self.has_credential() {
            SessionState::Idle
        } else if self.orchestrator.has_agent() {
            SessionState::Active
        } else {
            SessionState::Ready
        }
    }

    /// Stores the key as typed. No format check; blank means not provided.
    pub fn collect_credential(&mut self, api_key: impl Into<String>) -> Result<(), OrchestratorError> {
        if let Some(error) = self.halted_error() {
            return Err(error);
        }

        self.credential = Credential::new(api_key);
        tracing::info!(
            session_id = %self.id,
            provided = self.credential.is_provided(),
            "Credential updated"
        );
        Ok(())
    }

    /// Single-query submission: one question, one outcome, nothing kept
    pub async fn ask(&self, question: &str) -> QueryOutcome {
        tracing::info!(session_id = %self.id, "Handling question");
        let outcome = self.orchestrator.submit(&self.credential, question).await;
        log_outcome(self.id, &outcome);
        outcome
    }

    /// Chat submission. Returns the outcome and the messages it appended.
    ///
    /// Only questions that reach the agent are recorded, failures included; a blank
    /// message or a missing key appends nothing.
    pub async fn send_chat(&mut self, message: &str) -> (QueryOutcome, Vec<ChatMessage>) {
        if let Some(error) = self.halted_error() {
            return (QueryOutcome::Failure(error), Vec::new());
        }

        if let Some(error) = self.orchestrator.precheck(&self.credential, message) {
            log_outcome(self.id, &QueryOutcome::Failure(error.clone()));
            return (QueryOutcome::Failure(error), Vec::new());
        }

        tracing::info!(session_id = %self.id, "Handling chat message");
        let outcome = self.orchestrator.submit(&self.credential, message).await;
        log_outcome(self.id, &outcome);

        let appended = self.transcript.record_exchange(message, &outcome).to_vec();
        (outcome, appended)
    }

    fn halted_error(&self) -> Option<OrchestratorError> {
        if self.is_halted() {
            self.database_error().cloned()
        } else {
            None
        }
    }
}

fn log_outcome(session_id: Uuid, outcome: &QueryOutcome) {
    match outcome.error() {
        None => tracing::info!(%session_id, "Question answered"),
        Some(error) if error.is_warning() => {
            tracing::warn!(%session_id, kind = error.kind(), "Question rejected")
        }
        Some(error) => tracing::error!(%session_id, kind = error.kind(), error = %error, "Question failed"),
    }
}

pub type SharedSession = Arc<tokio::sync::Mutex<PageSession>>;

struct RegistryEntry {
    session: SharedSession,
    last_seen: Instant,
}

/// All live page sessions, keyed by the id carried in the session cookie.
///
/// A session not looked up for `ttl` is dropped, along with its credential and agent.
/// Expired entries are swept whenever a session is created or looked up.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, RegistryEntry>>,
    ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, RegistryEntry>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn create(
        &self,
        variant: PageVariant,
        database_path: &Path,
        factory: Arc<dyn AgentFactory>,
    ) -> (Uuid, SharedSession) {
        let session = PageSession::new(variant, database_path, factory);
        let id = session.id();
        let shared = Arc::new(tokio::sync::Mutex::new(session));
        let now = Instant::now();

        let mut entries = self.entries();
        self.sweep_locked(&mut entries, now);
        entries.insert(
            id,
            RegistryEntry {
                session: shared.clone(),
                last_seen: now,
            },
        );
        let live = entries.len();
        drop(entries);

        tracing::info!(session_id = %id, variant = variant.as_str(), live, "Session started");
        (id, shared)
    }

    /// Looks up a live session and marks it as seen
    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let now = Instant::now();
        let mut entries = self.entries();
        self.sweep_locked(&mut entries, now);

        let entry = entries.get_mut(id)?;
        entry.last_seen = now;
        Some(entry.session.clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<SharedSession> {
        self.entries().remove(id).map(|entry| entry.session)
    }

    /// Drops every session last seen more than `ttl` before `now`; returns how many
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut entries = self.entries();
        self.sweep_locked(&mut entries, now)
    }

    fn sweep_locked(&self, entries: &mut HashMap<Uuid, RegistryEntry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= self.ttl);
        let expired = before - entries.len();
        if expired > 0 {
            tracing::info!(expired, live = entries.len(), "Expired idle sessions");
        }
        expired
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
