//! Model constants for supported LLM providers

/// OpenAI model constants
pub mod openai {
    /// GPT-4.1 - Flagship non-reasoning model with reliable tool calling
    pub const GPT_4_1_ID: &str = "gpt-4.1";
    pub const GPT_4_1_NAME: &str = "GPT-4.1";

    /// GPT-4.1 Mini - Cheaper GPT-4.1 variant
    pub const GPT_4_1_MINI_ID: &str = "gpt-4.1-mini";
    pub const GPT_4_1_MINI_NAME: &str = "GPT-4.1 Mini";

    /// GPT-4o - Previous flagship model
    pub const GPT_4O_ID: &str = "gpt-4o";
    pub const GPT_4O_NAME: &str = "GPT-4o";
}
