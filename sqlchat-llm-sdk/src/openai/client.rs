use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    error::LlmError,
    openai::{
        tools::{function_tool, tool_choice_value},
        types::{
            OpenAIChatCompletionRequest, OpenAIChatCompletionResponse, OpenAIErrorResponse,
            OpenAIMessage, OpenAIRole,
        },
    },
    types::{CompletionRequest, CompletionResponse, ContentBlock, Role, Usage},
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// OpenAI LLM client
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(LlmError::network)?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: crate::models::openai::GPT_4_1_ID.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model reported by [`crate::client::LlmClient::model_name`]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create a chat completion using the OpenAI Chat Completions API
    pub async fn create_chat_completion(
        &self,
        request: OpenAIChatCompletionRequest,
    ) -> Result<OpenAIChatCompletionResponse, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        tracing::debug!(
            model = %request.model,
            message_count = request.messages.len(),
            tool_count = request.tools.as_ref().map(|t| t.len()).unwrap_or(0),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(LlmError::network)?;

        let status = response.status();

        if status.is_success() {
            let openai_response: OpenAIChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)))?;
            return Ok(openai_response);
        }

        // Read retry-after before the body consumes the response
        let retry_after = if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
        } else {
            None
        };

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let message = serde_json::from_str::<OpenAIErrorResponse>(&error_text)
            .map(|e| e.error.message)
            .unwrap_or(error_text);

        Err(map_status_error(status, message, retry_after))
    }
}

fn map_status_error(
    status: reqwest::StatusCode,
    message: String,
    retry_after: Option<u64>,
) -> LlmError {
    match status {
        reqwest::StatusCode::BAD_REQUEST => LlmError::invalid_request(message),
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::authentication(message)
        }
        reqwest::StatusCode::PAYLOAD_TOO_LARGE => LlmError::invalid_request("Request too large"),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limit(message, retry_after),
        _ => LlmError::api_error(status.as_u16(), message),
    }
}

impl OpenAIChatCompletionResponse {
    /// Extract tool calls from the first choice
    pub fn tool_calls(&self) -> Option<Vec<crate::tools::ToolCall>> {
        self.choices
            .first()?
            .message
            .tool_calls
            .as_ref()
            .map(|calls| {
                calls
                    .iter()
                    .map(|call| {
                        let arguments = serde_json::from_str(&call.function.arguments)
                            .unwrap_or_else(|e| {
                                tracing::warn!(
                                    tool_name = %call.function.name,
                                    error = %e,
                                    "Tool call arguments are not valid JSON"
                                );
                                serde_json::Value::Null
                            });

                        crate::tools::ToolCall::new(
                            call.id.clone(),
                            call.function.name.clone(),
                            arguments,
                        )
                    })
                    .collect()
            })
    }
}

#[async_trait]
impl crate::client::LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let mut openai_messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(system) = request.system {
            openai_messages.push(OpenAIMessage::system(system));
        }

        for msg in request.messages {
            let role = match msg.role {
                Role::User => OpenAIRole::User,
                Role::Assistant => OpenAIRole::Assistant,
                Role::System => OpenAIRole::System,
            };
            openai_messages.push(OpenAIMessage::new(role, msg.joined_text()));
        }

        let tools = request
            .tools
            .map(|tools| tools.iter().map(function_tool).collect::<Vec<_>>());

        let openai_request = OpenAIChatCompletionRequest {
            model: request.model,
            messages: openai_messages,
            max_completion_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_sequences,
            tools,
            tool_choice: request
                .tool_choice
                .as_ref()
                .map(tool_choice_value),
        };

        let openai_response = self.create_chat_completion(openai_request).await?;

        let tool_calls = openai_response.tool_calls();
        let choice = openai_response
            .choices
            .first()
            .ok_or_else(|| LlmError::internal("No completion choices returned"))?;

        let content = match &choice.message.content {
            Some(text) if !text.is_empty() => vec![ContentBlock::Text { text: text.clone() }],
            _ => Vec::new(),
        };

        Ok(CompletionResponse {
            content,
            role: Role::Assistant,
            usage: Usage {
                input_tokens: openai_response.usage.prompt_tokens.unwrap_or(0),
                output_tokens: openai_response.usage.completion_tokens.unwrap_or(0),
            },
            stop_reason: choice.finish_reason.clone(),
            tool_calls,
        })
    }

    fn provider_name(&self) -> &str {
        crate::providers::OPENAI
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
