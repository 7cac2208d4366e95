//! Registration, login and logout against the user store.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::auth::token::TokenService;
use crate::errors::AppError;
use crate::models::user::PublicUser;
use crate::store::postgres::PgStore;

#[derive(Clone)]
pub struct CredentialService {
    db: PgStore,
    tokens: TokenService,
}

impl CredentialService {
    pub fn new(db: PgStore, tokens: TokenService) -> Self {
        Self { db, tokens }
    }

    /// Register a new user. The returned shape never contains the hash.
    pub async fn register(&self, email: &str, password: &str) -> Result<PublicUser, AppError> {
        if self.db.find_user_by_email(email).await?.is_some() {
            return Err(AppError::Conflict);
        }

        let hash = hash_password(password)?;
        match self.db.insert_user(email, &hash).await {
            Ok(row) => Ok(row.into()),
            // Lost the race against a concurrent register for the same email.
            Err(e) if is_unique_violation(&e) => Err(AppError::Conflict),
            Err(e) => Err(e.into()),
        }
    }

    /// Authenticate a user and mint a bearer token.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, PublicUser), AppError> {
        let user = self
            .db
            .find_user_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id, &user.email)?;
        Ok((token, user.into()))
    }

    /// Invalidate a presented token.
    pub fn logout(&self, token: &str) {
        self.tokens.revoke(token);
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Hash a password with Argon2id and a random salt.
pub(crate) fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {}", e)))
}

/// Verify a password against a stored hash. The Argon2 verifier compares
/// digests in constant time; there is no early exit on the input.
pub(crate) fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123!").unwrap();
        assert!(hash.starts_with("$argon2"));

        assert!(verify_password("Secret123!", &hash));
        assert!(!verify_password("wrong-password", &hash));
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = hash_password("Secret123!").unwrap();
        let hash2 = hash_password("Secret123!").unwrap();

        // Salts are random, hashes differ, both verify.
        assert_ne!(hash1, hash2);
        assert!(verify_password("Secret123!", &hash1));
        assert!(verify_password("Secret123!", &hash2));
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(!verify_password("Secret123!", "not-a-phc-string"));
    }
}
