/// Bearer-token validation gateway for the HTTP surface.
///
/// Thin adapter over [`TokenService`]: extract the bearer token, verify it,
/// attach the resolved identity to the request. Every token rejection
/// collapses into one 401 at the edge (`From<TokenError>` does the collapse
/// and logs the precise kind); a revocation-store outage surfaces as 503,
/// never as a verdict.
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use token_core::{require_role, Role, TokenService, TokenType};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Identity and role resolved from a verified access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub subject_id: Uuid,
    pub role: Role,
}

/// Shared authentication decision for the HTTP gateway. The gRPC endpoint
/// reaches the same verdict through the same [`TokenService::verify`] call;
/// only the failure shape differs per transport.
pub async fn authenticate_bearer(
    tokens: &TokenService,
    authorization: Option<&str>,
) -> Result<AuthUser, ApiError> {
    // Cheap rejection: no bearer token, no token-service call.
    let token = authorization
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthenticated)?;

    let claims = tokens.verify(token, TokenType::Access).await?;

    Ok(AuthUser {
        subject_id: claims.sub,
        role: claims.role,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        authenticate_bearer(&state.tokens, authorization).await
    }
}

/// Admin-gated identity: authentication first, then the role gate. A failed
/// gate is 403, kept distinct from the 401 of a failed authentication.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        require_role(user.role, Role::Admin)?;
        Ok(AdminUser(user))
    }
}
