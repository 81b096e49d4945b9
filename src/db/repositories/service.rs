use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::service;

/// Input for creating or replacing a service record.
#[derive(Debug, Clone)]
pub struct ServiceInput {
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub price: f64,
    pub state: bool,
}

pub struct ServiceRepository {
    conn: DatabaseConnection,
}

impl ServiceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list_all(&self) -> Result<Vec<service::Model>> {
        service::Entity::find()
            .order_by_asc(service::Column::IdService)
            .all(&self.conn)
            .await
            .context("Failed to list services")
    }

    pub async fn get(&self, id_service: i32) -> Result<Option<service::Model>> {
        service::Entity::find_by_id(id_service)
            .one(&self.conn)
            .await
            .context("Failed to query service by ID")
    }

    /// Point lookup by exact name; the import pipeline's duplicate check.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<service::Model>> {
        service::Entity::find()
            .filter(service::Column::Name.eq(name))
            .one(&self.conn)
            .await
            .context("Failed to query service by name")
    }

    pub async fn create(&self, input: ServiceInput) -> Result<i32> {
        let inserted = service::ActiveModel {
            name: Set(input.name),
            description: Set(input.description),
            duration_minutes: Set(input.duration_minutes),
            price: Set(input.price),
            state: Set(input.state),
            ..Default::default()
        }
        .insert(&self.conn)
        .await
        .context("Failed to insert service")?;

        Ok(inserted.id_service)
    }

    /// Full replace of an existing record. Returns false when the id is
    /// unknown.
    pub async fn update(&self, id_service: i32, input: ServiceInput) -> Result<bool> {
        let Some(existing) = service::Entity::find_by_id(id_service)
            .one(&self.conn)
            .await
            .context("Failed to query service for update")?
        else {
            return Ok(false);
        };

        let mut active: service::ActiveModel = existing.into();
        active.name = Set(input.name);
        active.description = Set(input.description);
        active.duration_minutes = Set(input.duration_minutes);
        active.price = Set(input.price);
        active.state = Set(input.state);
        active
            .update(&self.conn)
            .await
            .context("Failed to update service")?;

        Ok(true)
    }

    pub async fn delete(&self, id_service: i32) -> Result<bool> {
        let result = service::Entity::delete_by_id(id_service)
            .exec(&self.conn)
            .await
            .context("Failed to delete service")?;

        Ok(result.rows_affected > 0)
    }
}
