use serde::{Deserialize, Serialize};

use crate::constants::reservation_status;
use crate::db::{ReservationRecord, User};
use crate::entities::service;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============================================================================
// Users
// ============================================================================

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id_user: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub id_role: i32,
    pub state: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id_user: user.id_user,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            id_role: user.id_role,
            state: user.state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Defaults to the standard-user role.
    #[serde(default = "default_role")]
    pub id_role: i32,
}

const fn default_role() -> i32 {
    crate::constants::roles::STANDARD
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct UserUpdateRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub id_role: Option<i32>,
}

// ============================================================================
// Services
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ServiceDto {
    pub id_service: i32,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub state: bool,
}

impl From<service::Model> for ServiceDto {
    fn from(model: service::Model) -> Self {
        Self {
            id_service: model.id_service,
            name: model.name,
            description: model.description,
            duration_minutes: model.duration_minutes,
            price: model.price,
            state: model.state,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    #[serde(default = "default_true")]
    pub state: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct CreatedService {
    pub id_service: i32,
}

// ============================================================================
// Reservations
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ReservationRequest {
    pub id_service: i32,
    pub scheduled_datetime: String,
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedReservation {
    pub id_reservation: i32,
}

#[derive(Debug, Serialize)]
pub struct ReservationDto {
    pub id_reservation: i32,
    pub id_user: i32,
    pub id_service: i32,
    pub scheduled_datetime: String,
    pub payment_method: String,
    pub total_price: f64,
    pub id_status: i32,
    pub status_name: String,
    pub created_at: String,
    pub service_name: Option<String>,
    pub service_description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

fn status_name(id_status: i32) -> String {
    match id_status {
        reservation_status::PENDING => "pending",
        reservation_status::CONFIRMED => "confirmed",
        reservation_status::CANCELLED => "cancelled",
        reservation_status::COMPLETED => "completed",
        _ => "unknown",
    }
    .to_string()
}

impl From<ReservationRecord> for ReservationDto {
    fn from(record: ReservationRecord) -> Self {
        Self {
            id_reservation: record.id_reservation,
            id_user: record.id_user,
            id_service: record.id_service,
            scheduled_datetime: record.scheduled_datetime,
            payment_method: record.payment_method,
            total_price: record.total_price,
            status_name: status_name(record.id_status),
            id_status: record.id_status,
            created_at: record.created_at,
            service_name: record.service_name,
            service_description: record.service_description,
            duration_minutes: record.duration_minutes,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
        }
    }
}
