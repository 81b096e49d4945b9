use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::{MessageResponse, UserDto, UserUpdateRequest};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::constants::roles;
use crate::db::UserUpdate;

/// All user-management routes are admin-only; the check runs against the
/// account resolved by the gate.
fn ensure_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.0.id_role != roles::ADMIN {
        return Err(ApiError::Forbidden(
            "Access denied. Admin role required.".to_string(),
        ));
    }
    Ok(())
}

/// GET /users (admin)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    ensure_admin(&current)?;

    let users = state.store().list_users().await?;

    Ok(Json(ApiResponse::success(
        users.into_iter().map(UserDto::from).collect(),
    )))
}

/// GET /users/{id} (admin)
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_user): Path<i32>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    ensure_admin(&current)?;
    let id_user = validate_id(id_user, "user")?;

    let user = state
        .store()
        .get_user_by_id(id_user)
        .await?
        .ok_or_else(|| ApiError::not_found("User", id_user))?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /users/{id} (admin)
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_user): Path<i32>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    ensure_admin(&current)?;
    let id_user = validate_id(id_user, "user")?;

    if let Some(role) = payload.id_role
        && role != roles::ADMIN
        && role != roles::STANDARD
    {
        return Err(ApiError::validation(format!("Unknown role: {role}")));
    }

    let updated = state
        .store()
        .update_user(
            id_user,
            UserUpdate {
                email: payload.email,
                first_name: payload.first_name,
                last_name: payload.last_name,
                phone: payload.phone,
                id_role: payload.id_role,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("User", id_user))?;

    Ok(Json(ApiResponse::success(UserDto::from(updated))))
}

/// PATCH /users/{id}/deactivate (admin)
pub async fn deactivate_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_user): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    set_user_state(&state, &current, id_user, false, "User deactivated successfully").await
}

/// PATCH /users/{id}/activate (admin)
pub async fn activate_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_user): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    set_user_state(&state, &current, id_user, true, "User activated successfully").await
}

async fn set_user_state(
    state: &AppState,
    current: &CurrentUser,
    id_user: i32,
    active: bool,
    message: &str,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    ensure_admin(current)?;
    let id_user = validate_id(id_user, "user")?;

    let found = state.store().set_user_state(id_user, active).await?;
    if !found {
        return Err(ApiError::not_found("User", id_user));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(message))))
}
