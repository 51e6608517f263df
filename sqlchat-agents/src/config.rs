use serde::{Deserialize, Serialize};
use sqlchat_llm_sdk::models::openai::GPT_4_1_ID;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Model settings shared by every SQL agent built in this process
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SqlAgentSettings {
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub max_iterations: usize,
}

impl Default for SqlAgentSettings {
    fn default() -> Self {
        Self {
            model: GPT_4_1_ID.to_string(),
            temperature: 0.0,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}
