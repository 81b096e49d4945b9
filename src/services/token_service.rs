//! Signed, time-limited bearer tokens.
//!
//! Tokens carry the account email and role; validity is determined purely
//! by signature and expiry at verification time. There is no revocation
//! list and no server-side session state.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,

    #[error("Unsupported signing algorithm: {0}")]
    Algorithm(String),

    #[error("Failed to create access token: {0}")]
    Creation(String),
}

/// Claim set embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account email.
    pub sub: String,
    /// 1 = admin, 2 = standard user.
    pub role: i32,
    pub exp: i64,
    pub iat: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Result<Self, TokenError> {
        let algorithm: Algorithm = security
            .algorithm
            .parse()
            .map_err(|_| TokenError::Algorithm(security.algorithm.clone()))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(security.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(security.secret_key.as_bytes()),
            algorithm,
            ttl: Duration::minutes(security.access_token_expire_minutes),
        })
    }

    /// Issues a token for the account with the configured lifetime.
    pub fn issue(&self, email: &str, role: i32) -> Result<String, TokenError> {
        self.issue_with_ttl(email, role, self.ttl)
    }

    /// Issues a token with an explicit lifetime from now.
    pub fn issue_with_ttl(
        &self,
        email: &str,
        role: i32,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::new(self.algorithm),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Verifies signature and expiry and returns the claims. Expiry is
    /// exact: no clock-skew leeway is granted.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn security_config(secret: &str) -> SecurityConfig {
        SecurityConfig {
            secret_key: secret.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
        }
    }

    fn service(secret: &str) -> TokenService {
        TokenService::new(&security_config(secret)).unwrap()
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let tokens = service("test-secret");
        let token = tokens.issue("ana@example.com", 2).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.role, 2);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service("test-secret");
        let token = tokens
            .issue_with_ttl("ana@example.com", 2, Duration::seconds(-5))
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service("secret-a").issue("ana@example.com", 1).unwrap();

        assert!(matches!(
            service("secret-b").verify(&token),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = service("test-secret");
        let token = tokens.issue("ana@example.com", 2).unwrap();

        // Flip a character inside the payload segment
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(parts.len(), 3);
        let payload = parts[1].clone();
        let flipped = if payload.starts_with('A') { "B" } else { "A" };
        parts[1] = format!("{flipped}{}", &payload[1..]);
        let tampered = parts.join(".");

        assert!(matches!(tokens.verify(&tampered), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let tokens = service("test-secret");
        assert!(matches!(
            tokens.verify("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let mut config = security_config("test-secret");
        config.algorithm = "HS1024".to_string();
        assert!(matches!(
            TokenService::new(&config),
            Err(TokenError::Algorithm(_))
        ));
    }
}
