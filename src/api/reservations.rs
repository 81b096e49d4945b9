use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::{CreatedReservation, MessageResponse, ReservationDto, ReservationRequest};
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState};
use crate::constants::{reservation_status, roles};
use crate::db::NewReservation;

fn is_admin(user: &CurrentUser) -> bool {
    user.0.id_role == roles::ADMIN
}

/// POST /reservations
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ReservationRequest>,
) -> Result<Json<ApiResponse<CreatedReservation>>, ApiError> {
    let id_service = validate_id(payload.id_service, "service")?;
    if payload.scheduled_datetime.trim().is_empty() {
        return Err(ApiError::validation("scheduled_datetime is required"));
    }
    if payload.payment_method.trim().is_empty() {
        return Err(ApiError::validation("payment_method is required"));
    }

    let service = state
        .store()
        .get_service(id_service)
        .await?
        .ok_or_else(|| ApiError::validation(format!("Service {id_service} does not exist")))?;

    if !service.state {
        return Err(ApiError::validation(format!(
            "Service {id_service} is not active"
        )));
    }

    let id_reservation = state
        .store()
        .create_reservation(
            current.0.id_user,
            NewReservation {
                id_service,
                scheduled_datetime: payload.scheduled_datetime,
                payment_method: payload.payment_method,
            },
            service.price,
            reservation_status::PENDING,
        )
        .await?;

    Ok(Json(ApiResponse::success(CreatedReservation {
        id_reservation,
    })))
}

/// GET /reservations/my-reservations
pub async fn my_reservations(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ReservationDto>>>, ApiError> {
    let reservations = state
        .store()
        .list_reservations_for_user(current.0.id_user)
        .await?;

    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

/// GET /reservations (admin)
pub async fn list_reservations(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<ReservationDto>>>, ApiError> {
    if !is_admin(&current) {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }

    let reservations = state.store().list_reservations().await?;

    Ok(Json(ApiResponse::success(
        reservations.into_iter().map(ReservationDto::from).collect(),
    )))
}

/// GET /reservations/{id} — owner or admin
pub async fn get_reservation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_reservation): Path<i32>,
) -> Result<Json<ApiResponse<ReservationDto>>, ApiError> {
    let id_reservation = validate_id(id_reservation, "reservation")?;

    let reservation = state
        .store()
        .get_reservation(id_reservation)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", id_reservation))?;

    if !is_admin(&current) && reservation.id_user != current.0.id_user {
        return Err(ApiError::Forbidden(
            "Not authorized to view this reservation".to_string(),
        ));
    }

    Ok(Json(ApiResponse::success(ReservationDto::from(reservation))))
}

/// PATCH /reservations/{id}/cancel — owner only
pub async fn cancel_reservation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_reservation): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id_reservation = validate_id(id_reservation, "reservation")?;

    let reservation = state
        .store()
        .get_reservation(id_reservation)
        .await?
        .ok_or_else(|| ApiError::not_found("Reservation", id_reservation))?;

    if reservation.id_user != current.0.id_user {
        return Err(ApiError::Forbidden(
            "Not authorized to cancel this reservation".to_string(),
        ));
    }

    if reservation.id_status != reservation_status::PENDING
        && reservation.id_status != reservation_status::CONFIRMED
    {
        return Err(ApiError::validation(
            "Only pending or confirmed reservations can be cancelled",
        ));
    }

    state
        .store()
        .set_reservation_status(id_reservation, reservation_status::CANCELLED)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reservation cancelled successfully",
    ))))
}

/// PATCH /reservations/{id}/status/{id_status} (admin)
pub async fn update_reservation_status(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path((id_reservation, id_status)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !is_admin(&current) {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }
    let id_reservation = validate_id(id_reservation, "reservation")?;

    if !reservation_status::is_valid(id_status) {
        return Err(ApiError::validation(format!(
            "Unknown reservation status: {id_status}"
        )));
    }

    let found = state
        .store()
        .set_reservation_status(id_reservation, id_status)
        .await?;
    if !found {
        return Err(ApiError::not_found("Reservation", id_reservation));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reservation status updated",
    ))))
}

/// DELETE /reservations/{id} (admin)
pub async fn delete_reservation(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id_reservation): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if !is_admin(&current) {
        return Err(ApiError::Forbidden("Not authorized".to_string()));
    }
    let id_reservation = validate_id(id_reservation, "reservation")?;

    let deleted = state.store().delete_reservation(id_reservation).await?;
    if !deleted {
        return Err(ApiError::not_found("Reservation", id_reservation));
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Reservation deleted",
    ))))
}
