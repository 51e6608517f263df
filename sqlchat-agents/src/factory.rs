use crate::config::SqlAgentSettings;
use crate::orchestrator::{Credential, DatabaseHandle};
use crate::sql_agent::SqlAgent;
use crate::storage::{AgentStorage, InMemoryStorage};
use crate::Agent;
use async_trait::async_trait;
use sqlchat_llm_sdk::client::LlmClient;
use sqlchat_llm_sdk::openai::OpenAIClient;
use std::sync::Arc;

/// Builds the agent a session will use for all its questions
#[async_trait]
pub trait AgentFactory: Send + Sync {
    async fn create_agent(
        &self,
        credential: &Credential,
        database: &DatabaseHandle,
    ) -> anyhow::Result<Arc<dyn Agent>>;
}

/// Builds [`SqlAgent`]s talking to the OpenAI Chat Completions API
#[derive(Debug, Clone, Default)]
pub struct OpenAiSqlAgentFactory {
    settings: SqlAgentSettings,
}

impl OpenAiSqlAgentFactory {
    pub fn new(settings: SqlAgentSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SqlAgentSettings {
        &self.settings
    }

    /// An OpenAI client configured with the credential, never the process environment
    pub fn create_client(&self, credential: &Credential) -> anyhow::Result<OpenAIClient> {
        let client = OpenAIClient::new(credential.expose())?
            .with_base_url(self.settings.base_url.clone())
            .with_model(self.settings.model.clone());
        Ok(client)
    }
}

#[async_trait]
impl AgentFactory for OpenAiSqlAgentFactory {
    async fn create_agent(
        &self,
        credential: &Credential,
        database: &DatabaseHandle,
    ) -> anyhow::Result<Arc<dyn Agent>> {
        let client: Arc<dyn LlmClient> = Arc::new(self.create_client(credential)?);
        let storage = Arc::new(InMemoryStorage::new());
        let agent = create_sql_agent(client, storage, database.clone(), &self.settings).await?;
        Ok(Arc::new(agent) as Arc<dyn Agent>)
    }
}

/// Create a SqlAgent over `database` with any client and storage
pub async fn create_sql_agent<S: AgentStorage + 'static>(
    client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    database: DatabaseHandle,
    settings: &SqlAgentSettings,
) -> anyhow::Result<SqlAgent<S>> {
    SqlAgent::new(client, storage, database, settings).await
}
