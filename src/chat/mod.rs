pub mod client;
pub mod context;
pub mod conversation;
pub mod sse;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use client::{ChatClient, ChatStream};
pub use conversation::Conversation;
pub use sse::{LineDecoder, StreamEvent, decode_line};

#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or unusable API settings. Nothing was sent.
    #[error("{0}")]
    Configuration(String),
    /// The endpoint answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// The connection failed before or during the response.
    #[error("{0}")]
    Transport(String),
}

impl ChatError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
