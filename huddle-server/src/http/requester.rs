use crate::http::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

pub const REQUESTER_HEADER: &str = "x-huddle-user";

/// Display name of the user an HTTP call acts for, from `x-huddle-user`.
/// The header is trusted; nothing checks it against live connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester(pub String);

impl<S> FromRequestParts<S> for Requester
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let name = parts
            .headers
            .get(REQUESTER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ApiError::unauthorized(format!("missing {REQUESTER_HEADER} header")))?;

        Ok(Self(name.to_owned()))
    }
}
