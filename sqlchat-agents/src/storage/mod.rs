use crate::types::{AgentRun, Message, RunRecord, ToolCall};
use async_trait::async_trait;

mod memory;

pub use memory::InMemoryStorage;

/// Persistence for agent runs, their messages and their tool calls
#[async_trait]
pub trait AgentStorage: Send + Sync {
    async fn create_run(&self, run: AgentRun) -> Result<i64, StorageError>;
    async fn get_run(&self, run_id: i64) -> Result<Option<AgentRun>, StorageError>;
    async fn update_run(&self, run: AgentRun) -> Result<(), StorageError>;
    async fn list_runs(&self) -> Result<Vec<AgentRun>, StorageError>;

    async fn create_message(&self, message: Message) -> Result<i64, StorageError>;
    async fn get_messages(&self, run_id: i64) -> Result<Vec<Message>, StorageError>;

    async fn create_tool_call(&self, tool_call: ToolCall) -> Result<i64, StorageError>;
    async fn update_tool_call(&self, tool_call: ToolCall) -> Result<(), StorageError>;
    async fn get_tool_calls(&self, run_id: i64) -> Result<Vec<ToolCall>, StorageError>;

    /// Every run in creation order, with its messages and tool calls
    async fn run_records(&self) -> Result<Vec<RunRecord>, StorageError> {
        let mut records = Vec::new();
        for run in self.list_runs().await? {
            let run_id = run
                .id
                .ok_or_else(|| StorageError::OperationFailed("Run without id".to_string()))?;
            records.push(RunRecord {
                messages: self.get_messages(run_id).await?,
                tool_calls: self.get_tool_calls(run_id).await?,
                run,
            });
        }
        Ok(records)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage operation failed: {0}")]
    OperationFailed(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
