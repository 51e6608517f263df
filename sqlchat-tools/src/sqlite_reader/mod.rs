//! Read-only SQLite access for the question answering agent.
//!
//! The agent reaches the database through a single tool, `sqlite3_reader`, which runs in
//! one of two modes:
//!
//! - **Query**: a single `SELECT` (CTEs, joins and subqueries allowed) or a bare `PRAGMA`
//!   read such as `PRAGMA table_info(Album)`
//! - **Reflect**: schema discovery without writing SQL. Targets are `tables`, `schema`,
//!   `table_info`, `indexes`, `views`, `foreign_keys` and `stats`
//!
//! Results are capped at [`DEFAULT_LIMIT`] rows unless the request asks for more, never
//! beyond [`MAX_LIMIT`]. The formatted output shown to the model holds at most 20 rows.
//!
//! Each request opens its own read-only connection on a blocking thread and closes it when
//! the query completes.
//!
//! ```rust,no_run
//! use sqlchat_tools::sqlite_reader::execute_sqlite3_reader;
//! use sqlchat_tools::types::{Sqlite3ReaderRequest, SqliteMode};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = Sqlite3ReaderRequest {
//!     db_path: "Chinook.db".to_string(),
//!     mode: SqliteMode::Query {
//!         query: "SELECT COUNT(*) FROM Track".to_string(),
//!     },
//!     limit: None,
//! };
//!
//! let response = execute_sqlite3_reader(request).await?;
//! println!("{}", response.formatted_output);
//! # Ok(())
//! # }
//! ```

use crate::tool_error::ToolError;
use crate::types::{Sqlite3ReaderRequest, Sqlite3ReaderResponse, SqliteMode};

pub mod executor;
pub mod formatter;

pub use executor::{QueryResult, SqlExecutor};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;
pub const TIMEOUT_MS: u64 = 5000;

const REFLECTION_TARGETS: &str = "tables, schema, table_info, indexes, views, foreign_keys, stats";

/// Lists the user tables of the database, sorted by name
pub async fn get_table_names(db_path: &str) -> Result<Vec<String>, ToolError> {
    validate_db_path(db_path)?;

    let db_path = db_path.to_string();
    let result = run_blocking(move || {
        let executor = open_executor(&db_path)?;
        executor
            .execute(
                "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
                Some(MAX_LIMIT),
            )
            .map_err(|e| ToolError::ExecutionError(format!("Failed to get table names: {}", e)))
    })
    .await?;

    Ok(result
        .rows
        .into_iter()
        .filter_map(|row| match row.into_iter().next() {
            Some(serde_json::Value::String(name)) => Some(name),
            _ => None,
        })
        .collect())
}

/// Runs a `sqlite3_reader` request against the database named in `request.db_path`
pub async fn execute_sqlite3_reader(
    request: Sqlite3ReaderRequest,
) -> Result<Sqlite3ReaderResponse, ToolError> {
    validate_db_path(&request.db_path)?;

    let limit = request.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);

    let (query, target_label) = match request.mode {
        SqliteMode::Query { query } => {
            if query.trim().is_empty() {
                return Err(ToolError::InvalidInput("Query cannot be empty".to_string()));
            }
            (query, None)
        }
        SqliteMode::Reflect { target, table_name } => (
            build_reflection_query(&target, table_name.as_deref())?,
            Some(target),
        ),
    };

    executor::validate_query(&query).map_err(|e| ToolError::QueryRejected(e.to_string()))?;

    tracing::debug!(db_path = %request.db_path, query = %query, limit, "Running sqlite3_reader");

    let db_path = request.db_path;
    let result = run_blocking(move || {
        let executor = open_executor(&db_path)?;
        executor
            .execute(&query, Some(limit))
            .map_err(|e| ToolError::ExecutionError(format!("Query execution failed: {}", e)))
    })
    .await?;

    let formatted_output = match target_label {
        Some(target) => format!(
            "Schema Reflection ({}):\n{}",
            target,
            formatter::format_query_result(&result)
        ),
        None => formatter::format_query_result(&result),
    };

    Ok(Sqlite3ReaderResponse {
        columns: result.columns,
        rows: result.rows,
        row_count: result.row_count,
        truncated: result.truncated,
        execution_time_ms: result.execution_time_ms,
        formatted_output,
    })
}

fn open_executor(db_path: &str) -> Result<SqlExecutor, ToolError> {
    SqlExecutor::new(db_path, MAX_LIMIT, TIMEOUT_MS)
        .map_err(|e| ToolError::ExecutionError(format!("Failed to open database: {}", e)))
}

async fn run_blocking<T, F>(f: F) -> Result<T, ToolError>
where
    F: FnOnce() -> Result<T, ToolError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ToolError::ExecutionError(format!("Database task failed: {}", e)))?
}

fn build_reflection_query(target: &str, table_name: Option<&str>) -> Result<String, ToolError> {
    let require_table = |target: &str| {
        table_name.ok_or_else(|| {
            ToolError::InvalidInput(format!(
                "table_name is required for {} reflection",
                target
            ))
        })
    };

    let query = match target.to_lowercase().as_str() {
        "tables" => "SELECT name, sql FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name".to_string(),
        "schema" => "SELECT type, name, sql FROM sqlite_master WHERE sql IS NOT NULL ORDER BY type, name".to_string(),
        "table_info" => format!("PRAGMA table_info({})", require_table("table_info")?),
        "indexes" => "SELECT name, tbl_name, sql FROM sqlite_master WHERE type='index' AND name NOT LIKE 'sqlite_%' ORDER BY tbl_name, name".to_string(),
        "views" => "SELECT name, sql FROM sqlite_master WHERE type='view' ORDER BY name".to_string(),
        "foreign_keys" => format!("PRAGMA foreign_key_list({})", require_table("foreign_keys")?),
        "stats" => "SELECT name, file FROM pragma_database_list UNION ALL SELECT 'Total Tables' AS name, CAST(COUNT(*) AS TEXT) AS file FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'".to_string(),
        _ => {
            return Err(ToolError::InvalidInput(format!(
                "Unknown reflection target: {}. Valid targets: {}",
                target, REFLECTION_TARGETS
            )))
        }
    };

    Ok(query)
}

fn validate_db_path(db_path: &str) -> Result<(), ToolError> {
    if db_path.is_empty() {
        return Err(ToolError::InvalidInput(
            "Database path cannot be empty".to_string(),
        ));
    }

    let path = std::path::Path::new(db_path);
    if !path.exists() {
        return Err(ToolError::InvalidInput(format!(
            "Database file not found: {}",
            db_path
        )));
    }

    if !path.is_file() {
        return Err(ToolError::InvalidInput(format!(
            "Path is not a file: {}",
            db_path
        )));
    }

    Ok(())
}
