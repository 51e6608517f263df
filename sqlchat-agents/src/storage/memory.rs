use crate::storage::{AgentStorage, StorageError};
use crate::types::{AgentRun, Message, ToolCall};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    runs: BTreeMap<i64, AgentRun>,
    messages: BTreeMap<i64, Vec<Message>>,
    tool_calls: BTreeMap<i64, Vec<ToolCall>>,
}

/// Process-local storage; ids are allocated from a single counter
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    tables: Arc<Mutex<Tables>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StorageError> {
        self.tables
            .lock()
            .map_err(|e| StorageError::OperationFailed(format!("Storage lock poisoned: {}", e)))
    }
}

#[async_trait::async_trait]
impl AgentStorage for InMemoryStorage {
    async fn create_run(&self, mut run: AgentRun) -> Result<i64, StorageError> {
        let run_id = self.allocate_id();
        run.id = Some(run_id);
        self.lock()?.runs.insert(run_id, run);
        Ok(run_id)
    }

    async fn get_run(&self, run_id: i64) -> Result<Option<AgentRun>, StorageError> {
        Ok(self.lock()?.runs.get(&run_id).cloned())
    }

    async fn update_run(&self, run: AgentRun) -> Result<(), StorageError> {
        let run_id = run
            .id
            .ok_or_else(|| StorageError::OperationFailed("Cannot update run without id".to_string()))?;
        let mut tables = self.lock()?;
        match tables.runs.get_mut(&run_id) {
            Some(existing) => {
                *existing = run;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!("run {}", run_id))),
        }
    }

    async fn list_runs(&self) -> Result<Vec<AgentRun>, StorageError> {
        Ok(self.lock()?.runs.values().cloned().collect())
    }

    async fn create_message(&self, mut message: Message) -> Result<i64, StorageError> {
        let message_id = self.allocate_id();
        message.id = Some(message_id);
        self.lock()?
            .messages
            .entry(message.run_id)
            .or_default()
            .push(message);
        Ok(message_id)
    }

    async fn get_messages(&self, run_id: i64) -> Result<Vec<Message>, StorageError> {
        Ok(self
            .lock()?
            .messages
            .get(&run_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_tool_call(&self, mut tool_call: ToolCall) -> Result<i64, StorageError> {
        let tool_call_id = self.allocate_id();
        tool_call.id = Some(tool_call_id);
        self.lock()?
            .tool_calls
            .entry(tool_call.run_id)
            .or_default()
            .push(tool_call);
        Ok(tool_call_id)
    }

    async fn update_tool_call(&self, tool_call: ToolCall) -> Result<(), StorageError> {
        let mut tables = self.lock()?;
        let slot = tables
            .tool_calls
            .get_mut(&tool_call.run_id)
            .and_then(|calls| calls.iter_mut().find(|c| c.id.is_some() && c.id == tool_call.id));

        match slot {
            Some(existing) => {
                *existing = tool_call;
                Ok(())
            }
            None => Err(StorageError::NotFound(format!(
                "tool call {:?} in run {}",
                tool_call.id, tool_call.run_id
            ))),
        }
    }

    async fn get_tool_calls(&self, run_id: i64) -> Result<Vec<ToolCall>, StorageError> {
        Ok(self
            .lock()?
            .tool_calls
            .get(&run_id)
            .cloned()
            .unwrap_or_default())
    }
}
