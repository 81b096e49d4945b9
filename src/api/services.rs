use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use std::sync::Arc;

use super::auth::authorize_admin;
use super::types::{CreatedService, MessageResponse, ServiceDto, ServiceRequest};
use super::validation::{validate_id, validate_service_payload};
use super::{ApiError, ApiResponse, AppState};
use crate::db::ServiceInput;

fn to_input(payload: ServiceRequest) -> ServiceInput {
    ServiceInput {
        name: payload.name.trim().to_string(),
        description: payload
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        duration_minutes: payload.duration_minutes,
        price: payload.price,
        state: payload.state,
    }
}

/// GET /services
pub async fn list_services(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ServiceDto>>>, ApiError> {
    let services = state.store().list_services().await?;

    Ok(Json(ApiResponse::success(
        services.into_iter().map(ServiceDto::from).collect(),
    )))
}

/// GET /services/{id}
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(id_service): Path<i32>,
) -> Result<Json<ApiResponse<ServiceDto>>, ApiError> {
    let id_service = validate_id(id_service, "service")?;

    let service = state
        .store()
        .get_service(id_service)
        .await?
        .ok_or_else(|| ApiError::not_found("Service", id_service))?;

    Ok(Json(ApiResponse::success(ServiceDto::from(service))))
}

/// POST /services (admin)
pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<ServiceRequest>,
) -> Result<Json<ApiResponse<CreatedService>>, ApiError> {
    authorize_admin(&state, &headers).await?;
    validate_service_payload(&payload.name, payload.duration_minutes, payload.price)?;

    let id_service = state.store().create_service(to_input(payload)).await?;

    Ok(Json(ApiResponse::success(CreatedService { id_service })))
}

/// PUT /services/{id} (admin)
pub async fn update_service(
    State(state): State<Arc<AppState>>,
    Path(id_service): Path<i32>,
    headers: HeaderMap,
    Json(payload): Json<ServiceRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize_admin(&state, &headers).await?;
    let id_service = validate_id(id_service, "service")?;
    validate_service_payload(&payload.name, payload.duration_minutes, payload.price)?;

    let updated = state
        .store()
        .update_service(id_service, to_input(payload))
        .await?;

    if !updated {
        return Err(ApiError::not_found("Service", id_service));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Service updated",
    ))))
}

/// DELETE /services/{id} (admin)
pub async fn delete_service(
    State(state): State<Arc<AppState>>,
    Path(id_service): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    authorize_admin(&state, &headers).await?;
    let id_service = validate_id(id_service, "service")?;

    let deleted = state.store().delete_service(id_service).await?;

    if !deleted {
        return Err(ApiError::not_found("Service", id_service));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Service deleted",
    ))))
}
