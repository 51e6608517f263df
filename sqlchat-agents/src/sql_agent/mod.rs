use crate::{
    config::SqlAgentSettings,
    orchestrator::DatabaseHandle,
    storage::AgentStorage,
    types::{AgentRun, Message, MessageRole, RunRecord, RunStatus, ToolCall as StorageToolCall},
    Agent, AgentRequest, AgentResponse, AgentTool,
};
use async_trait::async_trait;
use sqlchat_llm_sdk::client::LlmClient;
use sqlchat_llm_sdk::tools::{ToolCall as LlmToolCall, ToolChoice};
use sqlchat_llm_sdk::types::{CompletionRequest, Message as LlmMessage, Role};
use sqlchat_tools::types::ToolResponse;
use sqlchat_tools::ToolExecutor;
use std::sync::Arc;
use std::time::Instant;


pub const AGENT_NAME: &str = "sql-agent";

/// Answers natural-language questions about one SQLite database by calling the
/// `sqlite3_reader` tool until the model replies without tool calls.
pub struct SqlAgent<S: AgentStorage> {
    client: Arc<dyn LlmClient>,
    storage: Arc<S>,
    tool_executor: Arc<ToolExecutor>,
    database: DatabaseHandle,
    system_prompt: String,
    temperature: f32,
    max_iterations: usize,
}

impl<S: AgentStorage> SqlAgent<S> {
    pub async fn new(
        client: Arc<dyn LlmClient>,
        storage: Arc<S>,
        database: DatabaseHandle,
        settings: &SqlAgentSettings,
    ) -> anyhow::Result<Self> {
        let table_names =
            sqlchat_tools::sqlite_reader::get_table_names(&database.path_string()).await?;

        Ok(Self::with_table_names(
            client,
            storage,
            database,
            settings,
            table_names,
        ))
    }

    /// Build an agent from a known table list without touching the database
    pub fn with_table_names(
        client: Arc<dyn LlmClient>,
        storage: Arc<S>,
        database: DatabaseHandle,
        settings: &SqlAgentSettings,
        table_names: Vec<String>,
    ) -> Self {
        let system_prompt = generate_system_prompt(database.name(), &table_names);
        let tool_executor = Arc::new(ToolExecutor::new().with_db_path(database.path_string()));

        Self {
            client,
            storage,
            tool_executor,
            database,
            system_prompt,
            temperature: settings.temperature,
            max_iterations: settings.max_iterations,
        }
    }

    pub fn database(&self) -> &DatabaseHandle {
        &self.database
    }

    fn get_tool_definitions(&self) -> Vec<sqlchat_llm_sdk::tools::Tool> {
        self.tools()
            .into_iter()
            .map(|tool| tool.to_tool_definition())
            .collect()
    }

    async fn build_messages(&self, run_id: i64) -> anyhow::Result<Vec<LlmMessage>> {
        let stored = self.storage.get_messages(run_id).await?;

        Ok(stored
            .into_iter()
            .map(|msg| {
                let role = match msg.role {
                    MessageRole::User | MessageRole::Tool => Role::User,
                    MessageRole::Assistant => Role::Assistant,
                    MessageRole::System => Role::System,
                };
                LlmMessage::text(role, msg.content)
            })
            .collect())
    }

    async fn get_run(&self, run_id: i64) -> anyhow::Result<AgentRun> {
        self.storage
            .get_run(run_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Agent run not found: {}", run_id))
    }

    async fn finish_run(&self, run_id: i64, outcome: &anyhow::Result<String>) -> anyhow::Result<()> {
        let mut run = self.get_run(run_id).await?;
        match outcome {
            Ok(answer) => run.complete(answer.clone()),
            Err(e) => run.fail(format!("{:#}", e)),
        }
        self.storage.update_run(run).await?;
        Ok(())
    }

    async fn execute_tool_call(
        &self,
        run_id: i64,
        message_id: Option<i64>,
        tool_call: &LlmToolCall,
    ) -> anyhow::Result<()> {
        let mut tool_call_record = StorageToolCall::pending(
            run_id,
            message_id,
            tool_call.id(),
            tool_call.name(),
            tool_call.arguments().clone(),
        );
        let call_id = self
            .storage
            .create_tool_call(tool_call_record.clone())
            .await?;
        tool_call_record.id = Some(call_id);

        let start = Instant::now();
        let result = self.run_tool(tool_call).await;
        let execution_time = start.elapsed().as_millis() as i64;

        let message_to_llm = match result {
            Ok(response) => {
                let response_json = serde_json::to_value(&response)?;
                tool_call_record.complete(response_json, execution_time);

                tracing::debug!(
                    run_id,
                    tool_name = tool_call.name(),
                    tool_id = tool_call.id(),
                    execution_time_ms = execution_time,
                    "Tool execution completed"
                );

                format!(
                    "Tool {} result:\n{}",
                    tool_call.name(),
                    crate::format_tool_response(&response)
                )
            }
            Err(e) => {
                let error_msg = format!("{:#}", e);
                tool_call_record.fail(error_msg.clone());

                tracing::debug!(
                    run_id,
                    tool_name = tool_call.name(),
                    tool_id = tool_call.id(),
                    error = %error_msg,
                    "Tool execution failed"
                );

                format!("Tool {} failed: {}", tool_call.name(), error_msg)
            }
        };

        self.storage.update_tool_call(tool_call_record).await?;
        self.storage
            .create_message(Message::new(run_id, MessageRole::Tool, message_to_llm))
            .await?;

        Ok(())
    }

    async fn run_tool(&self, tool_call: &LlmToolCall) -> anyhow::Result<ToolResponse> {
        // The executor pins db_path to this agent's database
        let tool_request =
            AgentTool::parse_tool_call(tool_call.name(), tool_call.arguments().clone())?;

        self.tool_executor.execute(tool_request).await
    }

    async fn start_run(&self, user_prompt: &str) -> anyhow::Result<i64> {
        let run = AgentRun {
            id: None,
            agent_name: AGENT_NAME.to_string(),
            provider: self.client.provider_name().to_string(),
            model: self.client.model_name().to_string(),
            system_prompt: Some(self.system_prompt.clone()),
            user_prompt: user_prompt.to_string(),
            status: RunStatus::Running,
            started_at: chrono::Utc::now().timestamp(),
            ended_at: None,
            result: None,
            error: None,
        };
        Ok(self.storage.create_run(run).await?)
    }

    async fn tool_loop(&self, run_id: i64) -> anyhow::Result<String> {
        let tools = self.get_tool_definitions();

        for iteration in 1..=self.max_iterations {
            let mut request =
                CompletionRequest::new(self.client.model_name(), self.build_messages(run_id).await?);
            request.system = Some(self.system_prompt());
            request.temperature = Some(self.temperature);
            request.tools = Some(tools.clone());
            request.tool_choice = Some(ToolChoice::Auto);

            tracing::debug!(run_id, iteration, "Requesting completion");
            let response = self.client.complete(request).await?;
            let text = response.text();

            let tool_calls = response.tool_calls.unwrap_or_default();
            let text_to_save = if text.is_empty() && !tool_calls.is_empty() {
                "[Using tools]".to_string()
            } else {
                text.clone()
            };

            let message_id = self
                .storage
                .create_message(Message::new(run_id, MessageRole::Assistant, text_to_save))
                .await?;

            if tool_calls.is_empty() {
                return Ok(text);
            }

            for tool_call in &tool_calls {
                self.execute_tool_call(run_id, Some(message_id), tool_call)
                    .await?;
            }
        }

        anyhow::bail!("Maximum iteration limit reached")
    }
}

#[async_trait]
impl<S: AgentStorage> Agent for SqlAgent<S> {
    fn objective(&self) -> &str {
        "Answer questions about a SQLite database"
    }

    fn system_prompt(&self) -> String {
        self.system_prompt.clone()
    }

    fn tools(&self) -> Vec<AgentTool> {
        vec![AgentTool::Sqlite3Reader]
    }

    async fn execute(&self, user_prompt: &str, run_id: i64) -> anyhow::Result<String> {
        self.storage
            .create_message(Message::new(run_id, MessageRole::User, user_prompt))
            .await?;

        let outcome = self.tool_loop(run_id).await;
        self.finish_run(run_id, &outcome).await?;
        outcome
    }

    async fn invoke(&self, request: AgentRequest) -> anyhow::Result<AgentResponse> {
        let run_id = self.start_run(&request.input).await?;
        tracing::debug!(run_id, database = %self.database.locator(), "Agent run started");

        let output = self.execute(&request.input, run_id).await?;
        Ok(AgentResponse { output })
    }

    async fn history(&self) -> anyhow::Result<Vec<RunRecord>> {
        Ok(self.storage.run_records().await?)
    }
}

fn generate_system_prompt(db_name: &str, table_names: &[String]) -> String {
    let tables_list = if table_names.is_empty() {
        "No tables found".to_string()
    } else {
        table_names.join(", ")
    };

    format!(
        "You are an agent designed to interact with a SQLite database.
Given an input question, create a syntactically correct SQLite query to run, then look at \
the results of the query and return the answer.
Unless the user specifies a specific number of examples they wish to obtain, always limit \
your query to at most 10 results.
You can order the results by a relevant column to return the most interesting examples.
Never query for all the columns from a specific table, only ask for the relevant columns \
given the question.

You have access to the sqlite3_reader tool:
- mode=reflect with target tables, schema, table_info, indexes, views, foreign_keys or stats \
to inspect the schema
- mode=query with a single SELECT or PRAGMA statement to read data

Always look at the tables and the schema of the relevant tables before querying.
If a query fails, rewrite it and try again.

You can ONLY use SELECT and PRAGMA statements. Do NOT use CREATE, INSERT, UPDATE, DELETE, \
ALTER, DROP, or any other data modification statements.

If the question does not seem related to the database, just say that you don't know.

You are analyzing the database named: {}
Tables in the database: {}
",
        db_name, tables_list
    )
}
