//! Per-session orchestration between the page shell and the SQL agent.
//!
//! An [`Orchestrator`] belongs to exactly one page session. It checks the database once
//! when the session starts, builds the session's agent lazily on the first question that
//! arrives with a credential, and turns every agent outcome into a [`QueryOutcome`].

mod credential;
mod database;


pub use credential::Credential;
pub use database::DatabaseHandle;

use crate::factory::AgentFactory;
use crate::types::RunRecord;
use crate::{Agent, AgentRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OrchestratorError {
    #[error("Please enter your OpenAI API key.")]
    MissingCredential,

    #[error("{} not found in this directory.", .path.display())]
    DatabaseNotFound { path: PathBuf },

    #[error("Please enter a question.")]
    EmptyQuestion,

    #[error("Error: {0}")]
    AgentInvocation(String),
}

impl OrchestratorError {
    /// Stable machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestratorError::MissingCredential => "missing_credential",
            OrchestratorError::DatabaseNotFound { .. } => "database_not_found",
            OrchestratorError::EmptyQuestion => "empty_question",
            OrchestratorError::AgentInvocation(_) => "agent_invocation",
        }
    }

    /// Empty questions are shown as a warning rather than an error
    pub fn is_warning(&self) -> bool {
        matches!(self, OrchestratorError::EmptyQuestion)
    }
}

/// Result of one question: the whole answer or the reason there is none
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Success(String),
    Failure(OrchestratorError),
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success(_))
    }

    /// Text shown to the user for this outcome
    pub fn text(&self) -> String {
        match self {
            QueryOutcome::Success(answer) => answer.clone(),
            QueryOutcome::Failure(error) => error.to_string(),
        }
    }

    pub fn error(&self) -> Option<&OrchestratorError> {
        match self {
            QueryOutcome::Success(_) => None,
            QueryOutcome::Failure(error) => Some(error),
        }
    }
}

pub struct Orchestrator {
    database: Result<DatabaseHandle, OrchestratorError>,
    factory: Arc<dyn AgentFactory>,
    agent: OnceCell<Arc<dyn Agent>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("database", &self.database)
            .field("agent_built", &self.agent.initialized())
            .finish()
    }
}

impl Orchestrator {
    /// Starts a session's orchestrator, checking the database straight away
    pub fn new(database_path: impl AsRef<Path>, factory: Arc<dyn AgentFactory>) -> Self {
        let database = Self::ensure_database(database_path);
        if let Err(e) = &database {
            tracing::warn!(error = %e, "Database missing at session start");
        }

        Self {
            database,
            factory,
            agent: OnceCell::new(),
        }
    }

    pub fn ensure_database(path: impl AsRef<Path>) -> Result<DatabaseHandle, OrchestratorError> {
        DatabaseHandle::open_existing(path)
    }

    pub fn database(&self) -> Option<&DatabaseHandle> {
        self.database.as_ref().ok()
    }

    /// The error found at session start, if the database was missing
    pub fn database_error(&self) -> Option<&OrchestratorError> {
        self.database.as_ref().err()
    }

    pub fn has_agent(&self) -> bool {
        self.agent.initialized()
    }

    /// Returns the session's agent, building it on first use.
    ///
    /// Nothing is built when the credential is blank or the database is missing.
    /// A failed build leaves the cell empty so the next call tries again.
    pub async fn get_or_create_agent(
        &self,
        credential: &Credential,
    ) -> Result<Arc<dyn Agent>, OrchestratorError> {
        if !credential.is_provided() {
            return Err(OrchestratorError::MissingCredential);
        }

        let database = self.database.as_ref().map_err(Clone::clone)?;

        let agent = self
            .agent
            .get_or_try_init(|| async {
                tracing::info!(database = %database.locator(), "Building SQL agent for session");
                self.factory
                    .create_agent(credential, database)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, "Failed to build SQL agent");
                        OrchestratorError::AgentInvocation(format!("{:#}", e))
                    })
            })
            .await?;

        Ok(agent.clone())
    }

    /// Forwards one question to `agent`; any failure becomes an `AgentInvocation` outcome
    pub async fn ask(agent: &dyn Agent, question: &str) -> QueryOutcome {
        match agent.invoke(AgentRequest::new(question)).await {
            Ok(response) => QueryOutcome::Success(response.output),
            Err(e) => {
                tracing::warn!(error = %e, "Agent invocation failed");
                QueryOutcome::Failure(OrchestratorError::AgentInvocation(format!("{:#}", e)))
            }
        }
    }

    /// Handles a submitted question end to end.
    ///
    /// Checks run in order: credential, question, database, then the agent call.
    pub async fn submit(&self, credential: &Credential, question: &str) -> QueryOutcome {
        if let Some(error) = self.precheck(credential, question) {
            return QueryOutcome::Failure(error);
        }

        match self.get_or_create_agent(credential).await {
            Ok(agent) => Self::ask(agent.as_ref(), question).await,
            Err(error) => QueryOutcome::Failure(error),
        }
    }

    /// The error `submit` would return before reaching the agent, if any
    pub fn precheck(&self, credential: &Credential, question: &str) -> Option<OrchestratorError> {
        if !credential.is_provided() {
            return Some(OrchestratorError::MissingCredential);
        }

        if question.trim().is_empty() {
            return Some(OrchestratorError::EmptyQuestion);
        }

        self.database_error().cloned()
    }

    /// Agent runs recorded in this session, empty until the agent exists
    pub async fn history(&self) -> anyhow::Result<Vec<RunRecord>> {
        match self.agent.get() {
            Some(agent) => agent.history().await,
            None => Ok(Vec::new()),
        }
    }
}
