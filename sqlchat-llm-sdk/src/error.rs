use thiserror::Error;

/// Failures surfaced by an `LlmClient`
#[derive(Error, Debug)]
pub enum LlmError {
    /// Key rejected by the provider (401/403) or unusable before sending
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// 429; `retry_after` comes from the `Retry-After` header when present
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// 400 or 413
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// Any other non-success status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },

    /// Malformed or empty provider response
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl LlmError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    pub fn rate_limit(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn network(source: reqwest::Error) -> Self {
        Self::Network { source }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
