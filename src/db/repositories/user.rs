use anyhow::{Context, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use tokio::task;

use crate::entities::{user_account, user_profile};

/// Account + profile data returned from the repository (without the
/// password hash).
#[derive(Debug, Clone)]
pub struct User {
    pub id_user: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub id_role: i32,
    pub state: bool,
}

impl User {
    fn from_rows(account: user_account::Model, profile: Option<user_profile::Model>) -> Self {
        let (first_name, last_name, phone) = profile
            .map(|p| (p.first_name, p.last_name, p.phone))
            .unwrap_or_default();

        Self {
            id_user: account.id_user,
            email: account.email,
            first_name,
            last_name,
            phone,
            id_role: account.id_role,
            state: account.state,
        }
    }
}

/// Input for creating an account with its profile.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub id_role: i32,
}

/// Partial update applied to an account/profile pair.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub id_role: Option<i32>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = user_account::Entity::find()
            .filter(user_account::Column::Email.eq(email))
            .find_also_related(user_profile::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(row.map(|(account, profile)| User::from_rows(account, profile)))
    }

    pub async fn get_by_id(&self, id_user: i32) -> Result<Option<User>> {
        let row = user_account::Entity::find_by_id(id_user)
            .find_also_related(user_profile::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(row.map(|(account, profile)| User::from_rows(account, profile)))
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = user_account::Entity::find()
            .order_by_asc(user_account::Column::IdUser)
            .find_also_related(user_profile::Entity)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows
            .into_iter()
            .map(|(account, profile)| User::from_rows(account, profile))
            .collect())
    }

    /// Creates the account and its profile row inside one transaction.
    /// The plain password is hashed here; hashing runs on a blocking
    /// thread because Argon2 is CPU-intensive.
    pub async fn create(&self, new_user: NewUser) -> Result<User> {
        let password = new_user.password.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password))
            .await
            .context("Password hashing task panicked")??;

        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for user creation")?;

        let account = user_account::ActiveModel {
            email: Set(new_user.email.clone()),
            password: Set(password_hash),
            id_role: Set(new_user.id_role),
            state: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert user account")?;

        let profile = user_profile::ActiveModel {
            id_user: Set(account.id_user),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            phone: Set(new_user.phone),
        }
        .insert(&txn)
        .await
        .context("Failed to insert user profile")?;

        txn.commit()
            .await
            .context("Failed to commit user creation")?;

        Ok(User::from_rows(account, Some(profile)))
    }

    /// Verifies a password for the account with the given email.
    /// Returns false for unknown accounts.
    pub async fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        let account = user_account::Entity::find()
            .filter(user_account::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user for password verification")?;

        let Some(account) = account else {
            return Ok(false);
        };

        let password_hash = account.password;
        let password = password.to_string();

        let is_valid = task::spawn_blocking(move || {
            let parsed_hash = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

            let argon2 = Argon2::default();
            Ok::<bool, anyhow::Error>(
                argon2
                    .verify_password(password.as_bytes(), &parsed_hash)
                    .is_ok(),
            )
        })
        .await
        .context("Password verification task panicked")??;

        Ok(is_valid)
    }

    pub async fn update(&self, id_user: i32, update: UserUpdate) -> Result<Option<User>> {
        let Some(account) = user_account::Entity::find_by_id(id_user)
            .one(&self.conn)
            .await
            .context("Failed to query user for update")?
        else {
            return Ok(None);
        };

        // Only touch rows that actually have changes; an update with no
        // dirty columns is rejected by the store layer.
        let account = if update.email.is_some() || update.id_role.is_some() {
            let mut active: user_account::ActiveModel = account.into();
            if let Some(email) = update.email {
                active.email = Set(email);
            }
            if let Some(id_role) = update.id_role {
                active.id_role = Set(id_role);
            }
            active
                .update(&self.conn)
                .await
                .context("Failed to update user account")?
        } else {
            account
        };

        let profile = user_profile::Entity::find_by_id(id_user)
            .one(&self.conn)
            .await
            .context("Failed to query profile for update")?;

        let has_profile_changes =
            update.first_name.is_some() || update.last_name.is_some() || update.phone.is_some();

        let profile = match profile {
            Some(profile) if has_profile_changes => {
                let mut active: user_profile::ActiveModel = profile.into();
                if let Some(first_name) = update.first_name {
                    active.first_name = Set(Some(first_name));
                }
                if let Some(last_name) = update.last_name {
                    active.last_name = Set(Some(last_name));
                }
                if let Some(phone) = update.phone {
                    active.phone = Set(Some(phone));
                }
                Some(
                    active
                        .update(&self.conn)
                        .await
                        .context("Failed to update user profile")?,
                )
            }
            other => other,
        };

        Ok(Some(User::from_rows(account, profile)))
    }

    /// Flips the active flag. Accounts are never hard-deleted.
    pub async fn set_state(&self, id_user: i32, state: bool) -> Result<bool> {
        let Some(account) = user_account::Entity::find_by_id(id_user)
            .one(&self.conn)
            .await
            .context("Failed to query user for state change")?
        else {
            return Ok(false);
        };

        let mut active: user_account::ActiveModel = account.into();
        active.state = Set(state);
        active
            .update(&self.conn)
            .await
            .context("Failed to update user state")?;

        Ok(true)
    }
}

/// Hash a password using Argon2id with the default parameters.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
