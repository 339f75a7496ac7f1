use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::utils::error::AppError;

const USER_ID_HEADER: &str = "x-user-id";

/// Caller identity, resolved by the upstream identity gateway and
/// carried as a trusted header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::AuthError("Missing caller identity".to_string()))?;

        header
            .to_str()
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(CurrentUser)
            .ok_or_else(|| AppError::AuthError("Invalid caller identity".to_string()))
    }
}
