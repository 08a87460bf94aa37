//! First-party authentication: argon2 password hashing and HS256 bearer
//! tokens for the frontend session.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use vigil_model::UserId;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    TokenInvalid,

    #[error("authentication internals failed: {0}")]
    Internal(String),
}

/// Bearer-token claims. `sub` is the account id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: UserId,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

pub struct AuthService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    token_ttl_seconds: i64,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(token_key: &[u8], token_ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(token_key),
            decoding: DecodingKey::from_secret(token_key),
            token_ttl_seconds,
        }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    pub fn verify_password(
        &self,
        password: &str,
        stored_hash: &str,
    ) -> Result<(), AuthError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AuthError::Internal(e.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredentials)
    }

    pub fn issue_token(
        &self,
        user_id: UserId,
    ) -> Result<IssuedToken, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.token_ttl_seconds,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(|token| IssuedToken {
                token,
                expires_in: self.token_ttl_seconds,
            })
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &self.decoding,
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::TokenInvalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(b"test-token-key", 3600)
    }

    #[test]
    fn password_hash_round_trip() {
        let auth = service();
        let hash = auth.hash_password("hunter2hunter2").unwrap();
        assert!(auth.verify_password("hunter2hunter2", &hash).is_ok());
        assert!(matches!(
            auth.verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        let auth = service();
        let first = auth.hash_password("same-password").unwrap();
        let second = auth.hash_password("same-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn token_round_trip() {
        let auth = service();
        let user_id = UserId::new();
        let issued = auth.issue_token(user_id).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = auth.verify_token(&issued.token).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = AuthService::new(b"test-token-key", -120);
        let issued = auth.issue_token(UserId::new()).unwrap();
        assert!(matches!(
            auth.verify_token(&issued.token),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let issued = service().issue_token(UserId::new()).unwrap();
        let other = AuthService::new(b"different-key", 3600);
        assert!(other.verify_token(&issued.token).is_err());
    }
}
