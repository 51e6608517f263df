use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sqlchat_llm_sdk::tools::Tool;
use sqlchat_tools::types::SqliteMode;

/// LLM-facing schema for the sqlite3_reader tool (db_path is injected by the agent)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Sqlite3ReaderRequestLlm {
    #[schemars(description = "Execution mode: either query or reflect")]
    pub mode: SqliteMode,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Maximum number of rows to return. Defaults to 100, maximum 1000.")]
    pub limit: Option<usize>,
}

pub fn sqlite3_reader_tool() -> Tool {
    Tool::for_arguments::<Sqlite3ReaderRequestLlm>(
        "sqlite3_reader",
        "Run read-only SQL against the configured SQLite database. Use mode=query with a \
         single SELECT or PRAGMA statement, or mode=reflect with a target (tables, schema, \
         table_info, indexes, views, foreign_keys, stats) to inspect the schema. The \
         database path is pre-configured.",
    )
}

/// Create tool definitions for every tool an agent can be given
pub fn create_tool_definitions() -> Vec<Tool> {
    vec![sqlite3_reader_tool()]
}

/// Get tool definition by name
pub fn get_tool_definition(tool_name: &str) -> Option<Tool> {
    create_tool_definitions()
        .into_iter()
        .find(|tool| tool.name() == tool_name)
}
