/// User and admin handlers
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    db,
    error::ApiError,
    middleware::{AdminUser, AuthUser},
    models::user::UserResponse,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub total_count: i64,
}

/// Current-user endpoint; identity comes from the validation gateway.
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let record = db::users::find_by_id(&state.db, user.subject_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    Ok(Json(record.into()))
}

/// Admin-only paginated user listing
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<ListUsersResponse>, ApiError> {
    let limit = query.limit.clamp(1, 100);
    let offset = query.offset.max(0);

    let total_count = db::users::count_users(&state.db).await?;
    let users = db::users::list_users(&state.db, limit, offset).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(Into::into).collect(),
        total_count,
    }))
}

/// Admin-only deactivation. Outstanding access tokens for the user keep
/// working until natural expiry; the active flag gates the next issuance.
pub async fn deactivate_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = db::users::deactivate_user(&state.db, user_id)
        .await?
        .ok_or(ApiError::UserNotFound)?;

    info!(event = "user_deactivated", user_id = %user.id, admin_id = %admin.0.subject_id);
    Ok(Json(user.into()))
}
