use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use super::types::{LoginRequest, RegisterRequest, UserDto};
use super::{ApiError, ApiResponse, AppState};
use crate::constants::roles;
use crate::db::{NewUser, User};
use crate::services::{AuthService, TokenResponse};

/// Account resolved by the gate, available to handlers as a request
/// extension.
#[derive(Clone)]
pub struct CurrentUser(pub User);

// ============================================================================
// Authorization gate
// ============================================================================

/// Resolves the bearer token on the request to an account. Every call
/// re-verifies the token and re-fetches the account; there is no session
/// or cache.
async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let header = headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Invalid token header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid token header".to_string()))?;

    let claims = state
        .tokens()
        .verify(token.trim())
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

    state
        .store()
        .get_user_by_email(&claims.sub)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))
}

/// Middleware for routes that only need an authenticated account.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Gate entry for handlers that guard themselves. Same state machine as
/// the middleware: authenticate, then check the role.
pub async fn authorize_admin(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let user = authenticate(state, headers).await?;

    if user.id_role != roles::ADMIN {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }

    Ok(user)
}

/// Middleware for admin-only routes.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authorize_admin(&state, request.headers()).await?;
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let created = state
        .auth_service()
        .register(NewUser {
            email: payload.email,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
            phone: payload.phone,
            id_role: payload.id_role,
        })
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(created))))
}

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    if payload.email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let token = state
        .auth_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(token)))
}
