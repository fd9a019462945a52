use axum::{extract::State, Json};
use shared::{
    api::Api, AskRequest, AskResponse, Conversation, ConversationsResponse, UserId,
};

use crate::{error::ApiError, identity::Identity, state::AppState};

/// One request's view of the backend, with the caller's identity resolved.
pub struct RequestScope {
    pub state: AppState,
    pub identity: Option<UserId>,
}

impl Api for RequestScope {
    type Error = ApiError;

    async fn ask(&self, body: AskRequest) -> Result<AskResponse, Self::Error> {
        let response = self
            .state
            .handler
            .ask(self.identity.as_ref(), &body.query)
            .await?;

        Ok(AskResponse { response })
    }

    async fn recent_conversations(&self) -> Result<ConversationsResponse, Self::Error> {
        let records = self
            .state
            .handler
            .store()
            .list_by_user(self.identity.as_ref())
            .map_err(|err| {
                tracing::error!(error = %err, user = ?self.identity, "Error reading conversations");
                err
            })?;

        Ok(ConversationsResponse {
            conversations: records.into_iter().map(Conversation::from).collect(),
        })
    }
}

pub async fn ask(
    State(state): State<AppState>,
    Identity(identity): Identity,
    Json(body): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    RequestScope { state, identity }.ask(body).await.map(Json)
}

pub async fn recent_conversations(
    State(state): State<AppState>,
    Identity(identity): Identity,
) -> Result<Json<ConversationsResponse>, ApiError> {
    RequestScope { state, identity }
        .recent_conversations()
        .await
        .map(Json)
}
