use std::fmt;

use serde::{Deserialize, Serialize};

pub mod api;
pub mod session;

/// Header carrying the caller's identity. Missing or blank means anonymous.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The only failure text a caller of `ask` ever sees.
pub const TECHNICAL_DIFFICULTIES: &str =
    "I'm experiencing technical difficulties. Please try again in a moment.";

/// Opaque identity of the calling actor, only ever compared for equality.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parses a raw header or CLI value, treating blank input as anonymous.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AskRequest {
    pub query: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct AskResponse {
    pub response: String,
}

/// Read view of a stored conversation.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub query: String,
    pub response: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ConversationsResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ApiErrorBody {
    /// Machine-readable code, e.g. `technical_difficulties`.
    pub error: String,
    pub message: String,
}
