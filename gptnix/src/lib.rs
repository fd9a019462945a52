pub use crate::handler::{AskError, QueryHandler, FALLBACK_RESPONSE, SYSTEM_PROMPT};
pub use crate::openai::completion::CompletionRequest;
pub use crate::openai::{
    Client as OpenAiClient, CompletionProvider, Config, ConfigError, ProviderError,
};
pub use crate::store::{ConversationRecord, ConversationStore, NewConversation, StoreError};

pub mod handler;
pub mod openai;
mod schema;
pub mod store;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

pub const DB_NAME: &str = "gptnix.v1.db";

/// Installs the `fmt` subscriber, honouring `RUST_LOG` (default `info`).
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
