mod message;
mod run;
mod tool_call;

pub use message::{Message, MessageRole};
pub use run::{AgentRun, RunRecord, RunStatus};
pub use tool_call::{ToolCall, ToolCallStatus};
