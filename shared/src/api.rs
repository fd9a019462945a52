use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::*;

pub const ASK_ROUTE: &str = "/api/v0/ask";
pub const CONVERSATIONS_ROUTE: &str = "/api/v0/conversations";

/// The contract between the browser and the backend.
///
/// The server implements it per request (identity already resolved); every
/// [`ClientTransport`] gets it for free through the blanket impl below.
#[allow(async_fn_in_trait)]
pub trait Api {
    type Error;

    async fn ask(&self, body: AskRequest) -> Result<AskResponse, Self::Error>;

    /// Conversations of the calling identity, oldest first.
    async fn recent_conversations(&self) -> Result<ConversationsResponse, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[async_trait(?Send)]
pub trait ClientTransport {
    type Error: std::error::Error + 'static;

    /// Sends one request. The inner result is `Ok` for a success status and
    /// `Err` with the decoded error body otherwise.
    async fn send_request(
        &self,
        method: HttpMethod,
        route: &str,
        body: Option<Value>,
    ) -> Result<Result<Value, Value>, Self::Error>;
}

#[derive(Error, Debug)]
pub enum ClientError<TransportError>
where
    TransportError: std::error::Error + 'static,
{
    #[error(transparent)]
    Transport(TransportError),
    #[error(transparent)]
    Deserialization(serde_json::Error),
    #[error(transparent)]
    Serialization(serde_json::Error),
    #[error("{}", .0.message)]
    Api(ApiErrorBody),
}

fn decode<R, E>(resp: Result<Value, Value>) -> Result<R, ClientError<E>>
where
    R: DeserializeOwned,
    E: std::error::Error + 'static,
{
    match resp {
        Ok(resp) => serde_json::from_value(resp).map_err(ClientError::Deserialization),
        Err(resp) => {
            let body = serde_json::from_value(resp).map_err(ClientError::Deserialization)?;
            Err(ClientError::Api(body))
        }
    }
}

impl<Transport> Api for Transport
where
    Transport: ClientTransport,
{
    type Error = ClientError<Transport::Error>;

    async fn ask(&self, body: AskRequest) -> Result<AskResponse, Self::Error> {
        let body = serde_json::to_value(body).map_err(ClientError::Serialization)?;
        let resp = self
            .send_request(HttpMethod::Post, ASK_ROUTE, Some(body))
            .await
            .map_err(ClientError::Transport)?;

        decode(resp)
    }

    async fn recent_conversations(&self) -> Result<ConversationsResponse, Self::Error> {
        let resp = self
            .send_request(HttpMethod::Get, CONVERSATIONS_ROUTE, None)
            .await
            .map_err(ClientError::Transport)?;

        decode(resp)
    }
}
