/// Authentication handlers
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use token_core::{service::remaining_ttl_secs, Role, TokenType};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    db,
    error::ApiError,
    models::user::{LoginRequest, LogoutRequest, RefreshTokenRequest, RegisterRequest},
    security::{hash_password, verify_password},
    AppState,
};

/// Register/login response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Refresh response carrying the rotated pair
#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') || email.len() > 254 {
        return Err(ApiError::Validation("invalid email format".to_string()));
    }
    if payload.username.len() < 3 || payload.username.len() > 32 {
        return Err(ApiError::Validation(
            "username must be 3-32 characters".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)?;

    if db::users::email_exists(&state.db, &email).await? {
        warn!(event = "duplicate_email_registration", email = %email);
        return Err(ApiError::EmailAlreadyExists);
    }

    let user =
        db::users::create_user(&state.db, &email, &payload.username, &password_hash, Role::User)
            .await?;

    // Welcome notification is a fire-and-forget job; delivery belongs to the
    // external worker and never blocks this response.
    state
        .notifications
        .enqueue_welcome_detached(user.id, user.email.clone());

    let pair = state.tokens.issue(user.id, user.role())?;

    info!(event = "user_registration_success", user_id = %user.id);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id: user.id,
            email: user.email,
            username: user.username,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
        }),
    ))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::InvalidCredentials);
    }

    let email = payload.email.trim().to_lowercase();
    let user = db::users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            // Same failure as a wrong password; no user-exists oracle.
            warn!(event = "login_failed_user_not_found");
            ApiError::InvalidCredentials
        })?;

    if !user.is_active {
        warn!(event = "login_failed_account_inactive", user_id = %user.id);
        return Err(ApiError::AccountInactive);
    }

    verify_password(&payload.password, &user.password_hash).map_err(|_| {
        warn!(event = "login_failed_wrong_password", user_id = %user.id);
        ApiError::InvalidCredentials
    })?;

    let pair = state.tokens.issue(user.id, user.role())?;

    info!(event = "user_login_success", user_id = %user.id);

    Ok(Json(AuthResponse {
        user_id: user.id,
        email: user.email,
        username: user.username,
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: pair.token_type,
        expires_in: pair.expires_in,
    }))
}

/// Refresh endpoint handler: rotate the presented refresh token.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, ApiError> {
    let pair = state.tokens.rotate(&payload.refresh_token).await?;

    Ok(Json(RefreshTokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: pair.token_type,
        expires_in: pair.expires_in,
    }))
}

/// Logout endpoint handler: revoke the presented refresh token for its
/// remaining lifetime. Access tokens are left to expire on their own.
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    let claims = state
        .tokens
        .verify(&payload.refresh_token, TokenType::Refresh)
        .await?;

    state
        .tokens
        .revoke(claims.jti, remaining_ttl_secs(claims.exp))
        .await?;

    info!(event = "user_logout", user_id = %claims.sub);
    Ok(StatusCode::NO_CONTENT)
}
