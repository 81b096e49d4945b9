//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use std::sync::Arc;

use crate::constants::roles;
use crate::db::{NewUser, Store, User};
use crate::services::auth_service::{AuthError, AuthService, TokenResponse};
use crate::services::token_service::TokenService;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: Arc<TokenService>,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        let email = new_user.email.trim().to_string();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }
        if new_user.password.is_empty() {
            return Err(AuthError::Validation("Password is required".to_string()));
        }
        if new_user.id_role != roles::ADMIN && new_user.id_role != roles::STANDARD {
            return Err(AuthError::Validation(format!(
                "Unknown role: {}",
                new_user.id_role
            )));
        }

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let created = self
            .store
            .create_user(NewUser { email, ..new_user })
            .await?;

        tracing::info!("Registered user: {}", created.email);
        Ok(created)
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, AuthError> {
        let is_valid = self.store.verify_user_password(email, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let access_token = self.tokens.issue(&user.email, user.id_role)?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }
}
