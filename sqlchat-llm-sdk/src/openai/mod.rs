pub mod client;
pub mod tools;
pub mod types;

pub use client::OpenAIClient;
pub use tools::{function_tool, tool_choice_value};
pub use types::*;
