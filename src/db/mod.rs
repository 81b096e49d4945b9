use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::time::Duration;
use tracing::info;

use crate::entities::service;

pub mod migrator;
pub mod repositories;

pub use repositories::reservation::{NewReservation, ReservationRecord};
pub use repositories::service::ServiceInput;
pub use repositories::user::{NewUser, User, UserUpdate};

/// Facade over the pooled store connection. Handlers and services go
/// through here; repositories are scoped per call so every connection is
/// returned to the pool on exit.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn service_repo(&self) -> repositories::service::ServiceRepository {
        repositories::service::ServiceRepository::new(self.conn.clone())
    }

    fn reservation_repo(&self) -> repositories::reservation::ReservationRepository {
        repositories::reservation::ReservationRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id_user: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id_user).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list_all().await
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user(&self, id_user: i32, update: UserUpdate) -> Result<Option<User>> {
        self.user_repo().update(id_user, update).await
    }

    pub async fn set_user_state(&self, id_user: i32, state: bool) -> Result<bool> {
        self.user_repo().set_state(id_user, state).await
    }

    // ========== Services ==========

    pub async fn list_services(&self) -> Result<Vec<service::Model>> {
        self.service_repo().list_all().await
    }

    pub async fn get_service(&self, id_service: i32) -> Result<Option<service::Model>> {
        self.service_repo().get(id_service).await
    }

    pub async fn find_service_by_name(&self, name: &str) -> Result<Option<service::Model>> {
        self.service_repo().find_by_name(name).await
    }

    pub async fn create_service(&self, input: ServiceInput) -> Result<i32> {
        self.service_repo().create(input).await
    }

    pub async fn update_service(&self, id_service: i32, input: ServiceInput) -> Result<bool> {
        self.service_repo().update(id_service, input).await
    }

    pub async fn delete_service(&self, id_service: i32) -> Result<bool> {
        self.service_repo().delete(id_service).await
    }

    // ========== Reservations ==========

    pub async fn create_reservation(
        &self,
        id_user: i32,
        input: NewReservation,
        total_price: f64,
        id_status: i32,
    ) -> Result<i32> {
        self.reservation_repo()
            .create(id_user, input, total_price, id_status)
            .await
    }

    pub async fn get_reservation(&self, id_reservation: i32) -> Result<Option<ReservationRecord>> {
        self.reservation_repo().get(id_reservation).await
    }

    pub async fn list_reservations_for_user(&self, id_user: i32) -> Result<Vec<ReservationRecord>> {
        self.reservation_repo().list_for_user(id_user).await
    }

    pub async fn list_reservations(&self) -> Result<Vec<ReservationRecord>> {
        self.reservation_repo().list_all().await
    }

    pub async fn set_reservation_status(
        &self,
        id_reservation: i32,
        id_status: i32,
    ) -> Result<bool> {
        self.reservation_repo()
            .set_status(id_reservation, id_status)
            .await
    }

    pub async fn delete_reservation(&self, id_reservation: i32) -> Result<bool> {
        self.reservation_repo().delete(id_reservation).await
    }
}
