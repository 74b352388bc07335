//! Bearer-token extractors.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use auth::Claims;
use error::AuthError;

use crate::api_error::ApiError;
use crate::router::AppState;

/// Caller identified by a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let token = auth::bearer_token(header)?;
        let claims = state.jwt.verify(token)?;

        tracing::debug!("Authenticated {} ({:?})", claims.sub, claims.role);
        Ok(Self(claims))
    }
}

/// Caller whose token carries the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            tracing::warn!("{} attempted an admin operation", claims.sub);
            return Err(AuthError::Forbidden.into());
        }
        Ok(Self(claims))
    }
}
