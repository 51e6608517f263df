use crate::orchestrator::QueryOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Append-only chat history of one page session, replayed in insertion order
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
    }

    /// Appends the question and the text of its outcome, failures included
    pub fn record_exchange(&mut self, question: &str, outcome: &QueryOutcome) -> &[ChatMessage] {
        let start = self.messages.len();
        self.push(ChatRole::User, question);
        self.push(ChatRole::Assistant, outcome.text());
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::OrchestratorError;

    #[test]
    fn test_replay_preserves_order_and_roles() {
        let mut transcript = Transcript::new();
        transcript.record_exchange("U1", &QueryOutcome::Success("A1".to_string()));
        transcript.record_exchange("U2", &QueryOutcome::Success("A2".to_string()));

        let replay: Vec<(ChatRole, &str)> = transcript
            .messages()
            .iter()
            .map(|m| (m.role, m.content.as_str()))
            .collect();

        assert_eq!(
            replay,
            vec![
                (ChatRole::User, "U1"),
                (ChatRole::Assistant, "A1"),
                (ChatRole::User, "U2"),
                (ChatRole::Assistant, "A2"),
            ]
        );
    }

    #[test]
    fn test_failures_are_recorded_as_error_text() {
        let mut transcript = Transcript::new();
        let appended = transcript.record_exchange(
            "How many tracks?",
            &QueryOutcome::Failure(OrchestratorError::AgentInvocation(
                "connection reset".to_string(),
            )),
        );

        assert_eq!(appended.len(), 2);
        assert_eq!(appended[1].role, ChatRole::Assistant);
        assert_eq!(appended[1].content, "Error: connection reset");
    }

    #[test]
    fn test_serializes_lowercase_roles() {
        let message = ChatMessage {
            role: ChatRole::Assistant,
            content: "3503".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            serde_json::json!({"role": "assistant", "content": "3503"})
        );
    }
}
