//! # SQL Chat LLM SDK
//!
//! A small provider-agnostic LLM client layer with OpenAI Chat Completions support
//! and typed tool calling.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlchat_llm_sdk::client::LlmClient;
//! use sqlchat_llm_sdk::openai::OpenAIClient;
//! use sqlchat_llm_sdk::types::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = OpenAIClient::new("your-api-key")?.with_model("gpt-4.1");
//!     let response = client
//!         .complete(CompletionRequest::new(
//!             client.model_name(),
//!             vec![Message::user("Hello!")],
//!         ))
//!         .await?;
//!
//!     println!("Response: {}", response.text());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod models;
pub mod openai;
pub mod providers;
pub mod tools;
pub mod types;
