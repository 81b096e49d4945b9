use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Seed admin credentials. The password is meant to be rotated immediately
/// after the first deployment.
const DEFAULT_ADMIN_EMAIL: &str = "admin@salonix.local";
const DEFAULT_ADMIN_PASSWORD: &[u8] = b"admin-change-me";

fn hash_default_password() -> String {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(DEFAULT_ADMIN_PASSWORD, &salt)
        .expect("Failed to hash default admin password")
        .to_string()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserAccount)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(UserProfile)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Service)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Reservation)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Seed default admin account with a hashed password
        let password_hash = hash_default_password();

        let insert = sea_orm_migration::sea_query::Query::insert()
            .into_table(UserAccount)
            .columns([
                crate::entities::user_account::Column::Email,
                crate::entities::user_account::Column::Password,
                crate::entities::user_account::Column::IdRole,
                crate::entities::user_account::Column::State,
            ])
            .values_panic([
                DEFAULT_ADMIN_EMAIL.into(),
                password_hash.into(),
                crate::constants::roles::ADMIN.into(),
                true.into(),
            ])
            .to_owned();

        manager.exec_stmt(insert).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservation).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Service).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserProfile).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAccount).to_owned())
            .await?;

        Ok(())
    }
}
