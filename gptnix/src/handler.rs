use std::sync::Arc;

use indoc::indoc;
use miette::Diagnostic;
use shared::{UserId, TECHNICAL_DIFFICULTIES};
use thiserror::Error;

use crate::openai::completion::CompletionRequest;
use crate::openai::{CompletionProvider, ProviderError};
use crate::store::{ConversationStore, NewConversation, StoreError};

pub const SYSTEM_PROMPT: &str = indoc! {"
    You are Nix 1, an advanced large language model with deep knowledge across all domains. You have the ability to:

    1. Search and synthesize information from your vast knowledge base
    2. Reason through complex problems step by step
    3. Provide accurate, insightful, and nuanced responses
    4. Adapt your communication style to the user's needs

    Your responses should be:
    - Accurate and well-reasoned
    - Comprehensive yet concise
    - Insightful and thoughtful
    - Professional but approachable

    When answering, briefly indicate your reasoning process when helpful, and provide detailed, actionable information."};

/// Returned (and stored) when the provider answers without any text.
pub const FALLBACK_RESPONSE: &str =
    "I apologize, but I couldn't generate a response. Please try again.";

/// Callers only ever see [`TECHNICAL_DIFFICULTIES`]; the source is for logs.
#[derive(Error, Diagnostic, Debug)]
pub enum AskError {
    #[error("{}", TECHNICAL_DIFFICULTIES)]
    #[diagnostic(code(gptnix::ask::provider))]
    Provider(#[source] ProviderError),
    #[error("{}", TECHNICAL_DIFFICULTIES)]
    #[diagnostic(code(gptnix::ask::store))]
    Store(#[source] StoreError),
}

pub struct QueryHandler {
    provider: Arc<dyn CompletionProvider>,
    store: ConversationStore,
    model: String,
}

impl QueryHandler {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: ConversationStore,
        model: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            store,
            model: model.into(),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Answers `query` statelessly and records the exchange under `user_id`.
    ///
    /// Nothing is stored unless the provider call succeeds. The query is not
    /// validated here.
    pub async fn ask(&self, user_id: Option<&UserId>, query: &str) -> Result<String, AskError> {
        let request = CompletionRequest::single_turn(&self.model, SYSTEM_PROMPT, query);

        let content = self
            .provider
            .complete(request)
            .await
            .and_then(|response| response.into_first_content())
            .map_err(|err| {
                tracing::error!(error = %err, user = ?user_id, "Error calling Nix 1");
                AskError::Provider(err)
            })?;

        let response = match content {
            Some(content) => content,
            None => {
                tracing::warn!(user = ?user_id, "provider returned no content, using fallback");
                FALLBACK_RESPONSE.to_owned()
            }
        };

        let record = self
            .store
            .insert(NewConversation {
                user_id,
                query,
                response: &response,
            })
            .map_err(|err| {
                tracing::error!(error = %err, user = ?user_id, "Error saving conversation");
                AskError::Store(err)
            })?;

        tracing::info!(id = record.id, user = ?user_id, "conversation saved");

        Ok(response)
    }
}
