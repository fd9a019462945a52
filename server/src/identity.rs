use std::convert::Infallible;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use shared::{UserId, USER_ID_HEADER};

/// The caller's identity as asserted by the upstream auth layer.
///
/// A missing, blank, or non-UTF-8 header is treated as anonymous.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<UserId>);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(UserId::parse);

        Ok(Self(identity))
    }
}
