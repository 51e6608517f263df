use thiserror::Error;

/// Errors raised while executing a tool request
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("Query rejected: {0}")]
    QueryRejected(String),
}
