use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Answer returned whenever the knowledge base has nothing relevant. Kept
/// byte-identical across releases; clients match on it.
pub const FALLBACK_ANSWER: &str = "I couldn't find that information in Jorge's profile. Please ask about his background, education, experience, or skills.";

pub const DEFAULT_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One persisted question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionLog {
    pub id: i64,
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub client_ip: String,
    pub created_at: DateTime<Utc>,
}

/// An interaction before the store has assigned its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewInteraction {
    pub session_id: String,
    pub question: String,
    pub answer: String,
    pub client_ip: String,
}

impl NewInteraction {
    pub fn new(
        session_id: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            question: question.into(),
            answer: answer.into(),
            client_ip: client_ip.into(),
        }
    }

    pub fn into_log(self, id: i64, created_at: DateTime<Utc>) -> InteractionLog {
        InteractionLog {
            id,
            session_id: self.session_id,
            question: self.question,
            answer: self.answer,
            client_ip: self.client_ip,
            created_at,
        }
    }
}
