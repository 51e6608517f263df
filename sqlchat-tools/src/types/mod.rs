pub mod core;
pub mod sqlite_reader;

pub use core::{ToolErrorResponse, ToolRequest, ToolResponse};
pub use sqlite_reader::{Sqlite3ReaderRequest, Sqlite3ReaderResponse, SqliteMode};
