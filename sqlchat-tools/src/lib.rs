pub mod sqlite_reader;
pub mod tool_error;
pub mod tool_executor;
pub mod types;

pub use tool_error::ToolError;
pub use tool_executor::ToolExecutor;
pub use types::*;
