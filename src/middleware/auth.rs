use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::{error, warn};

use crate::{
    config::startup::AppState,
    error::{AppError, JwtError},
};

/// Caller identity taken from an optional `Authorization: Bearer` JWT.
/// Anonymous requests extract as `Identity(None)`; a header that is present
/// but does not verify rejects the request.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<String>);

impl Identity {
    pub fn user_id(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn require(&self) -> Result<&str, AppError> {
        self.user_id().ok_or(AppError::AuthenticationRequired)
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let bearer =
            match TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await {
                Ok(TypedHeader(Authorization(bearer))) => bearer,
                Err(rejection) if rejection.is_missing() => return Ok(Identity(None)),
                Err(rejection) => {
                    warn!("Rejected malformed authorization header: {}", rejection);
                    return Err(JwtError::InvalidTokenFormat.into());
                }
            };

        let app_state = parts.extensions.get::<AppState>().ok_or_else(|| {
            error!("AppState extension missing from request");
            AppError::Unknown
        })?;

        let claims = app_state
            .verifier
            .verify(bearer.token())
            .inspect_err(|e| warn!("Bearer token rejected: {}", e))?;
        Ok(Identity(Some(claims.sub)))
    }
}
