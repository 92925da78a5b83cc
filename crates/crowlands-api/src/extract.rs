//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::error::ApiError;

/// Header the upstream session layer uses to convey the authenticated user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated user, as injected by the trusted upstream gateway.
/// Session issuance and verification happen outside this service.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| ApiError::unauthenticated("missing x-user-id header"))?;
        let value = header
            .to_str()
            .map_err(|_| ApiError::unauthenticated("malformed x-user-id header"))?;
        let user_id = Uuid::parse_str(value)
            .map_err(|_| ApiError::unauthenticated("x-user-id must be a UUID"))?;
        Ok(Self(user_id))
    }
}
