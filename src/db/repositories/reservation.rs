use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::collections::HashMap;

use crate::entities::{reservation, service, user_account, user_profile};

/// Reservation row joined with its service and customer for list views.
#[derive(Debug, Clone)]
pub struct ReservationRecord {
    pub id_reservation: i32,
    pub id_user: i32,
    pub id_service: i32,
    pub scheduled_datetime: String,
    pub payment_method: String,
    pub total_price: f64,
    pub id_status: i32,
    pub created_at: String,
    pub service_name: Option<String>,
    pub service_description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

/// Input for creating a reservation on behalf of an authenticated user.
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub id_service: i32,
    pub scheduled_datetime: String,
    pub payment_method: String,
}

struct Customer {
    first_name: Option<String>,
    last_name: Option<String>,
    email: String,
}

pub struct ReservationRepository {
    conn: DatabaseConnection,
}

impl ReservationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        id_user: i32,
        input: NewReservation,
        total_price: f64,
        id_status: i32,
    ) -> Result<i32> {
        let inserted = reservation::ActiveModel {
            id_user: Set(id_user),
            id_service: Set(input.id_service),
            scheduled_datetime: Set(input.scheduled_datetime),
            payment_method: Set(input.payment_method),
            total_price: Set(total_price),
            id_status: Set(id_status),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert reservation")?;

        Ok(inserted.id_reservation)
    }

    pub async fn get(&self, id_reservation: i32) -> Result<Option<ReservationRecord>> {
        let row = reservation::Entity::find_by_id(id_reservation)
            .find_also_related(service::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query reservation by ID")?;

        let Some((res, svc)) = row else {
            return Ok(None);
        };

        let customers = self.load_customers(&[res.id_user]).await?;
        Ok(Some(Self::map_record(res, svc, &customers)))
    }

    pub async fn list_for_user(&self, id_user: i32) -> Result<Vec<ReservationRecord>> {
        let rows = reservation::Entity::find()
            .filter(reservation::Column::IdUser.eq(id_user))
            .order_by_desc(reservation::Column::ScheduledDatetime)
            .find_also_related(service::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list reservations for user")?;

        self.map_records(rows).await
    }

    pub async fn list_all(&self) -> Result<Vec<ReservationRecord>> {
        let rows = reservation::Entity::find()
            .order_by_desc(reservation::Column::ScheduledDatetime)
            .find_also_related(service::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list reservations")?;

        self.map_records(rows).await
    }

    /// Returns false when the id is unknown.
    pub async fn set_status(&self, id_reservation: i32, id_status: i32) -> Result<bool> {
        let Some(existing) = reservation::Entity::find_by_id(id_reservation)
            .one(&self.conn)
            .await
            .context("Failed to query reservation for status update")?
        else {
            return Ok(false);
        };

        let mut active: reservation::ActiveModel = existing.into();
        active.id_status = Set(id_status);
        active
            .update(&self.conn)
            .await
            .context("Failed to update reservation status")?;

        Ok(true)
    }

    pub async fn delete(&self, id_reservation: i32) -> Result<bool> {
        let result = reservation::Entity::delete_by_id(id_reservation)
            .exec(&self.conn)
            .await
            .context("Failed to delete reservation")?;

        Ok(result.rows_affected > 0)
    }

    async fn map_records(
        &self,
        rows: Vec<(reservation::Model, Option<service::Model>)>,
    ) -> Result<Vec<ReservationRecord>> {
        let user_ids: Vec<i32> = rows.iter().map(|(r, _)| r.id_user).collect();
        let customers = self.load_customers(&user_ids).await?;

        Ok(rows
            .into_iter()
            .map(|(res, svc)| Self::map_record(res, svc, &customers))
            .collect())
    }

    async fn load_customers(&self, user_ids: &[i32]) -> Result<HashMap<i32, Customer>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = user_account::Entity::find()
            .filter(user_account::Column::IdUser.is_in(user_ids.iter().copied()))
            .find_also_related(user_profile::Entity)
            .all(&self.conn)
            .await
            .context("Failed to load reservation customers")?;

        Ok(rows
            .into_iter()
            .map(|(account, profile)| {
                let (first_name, last_name) = profile
                    .map(|p| (p.first_name, p.last_name))
                    .unwrap_or_default();
                (
                    account.id_user,
                    Customer {
                        first_name,
                        last_name,
                        email: account.email,
                    },
                )
            })
            .collect())
    }

    fn map_record(
        res: reservation::Model,
        svc: Option<service::Model>,
        customers: &HashMap<i32, Customer>,
    ) -> ReservationRecord {
        let customer = customers.get(&res.id_user);

        ReservationRecord {
            id_reservation: res.id_reservation,
            id_user: res.id_user,
            id_service: res.id_service,
            scheduled_datetime: res.scheduled_datetime,
            payment_method: res.payment_method,
            total_price: res.total_price,
            id_status: res.id_status,
            created_at: res.created_at,
            service_name: svc.as_ref().map(|s| s.name.clone()),
            service_description: svc.as_ref().and_then(|s| s.description.clone()),
            duration_minutes: svc.as_ref().map(|s| s.duration_minutes),
            first_name: customer.and_then(|c| c.first_name.clone()),
            last_name: customer.and_then(|c| c.last_name.clone()),
            email: customer.map(|c| c.email.clone()),
        }
    }
}
