//! Bearer token issuing, verification and revocation.
//!
//! Tokens are HS256 JWTs over `{sub, email, iat, exp}`. Revocation is a
//! process-wide concurrent set of raw token strings: logout inserts, the
//! auth guard checks membership after signature verification. The set is
//! content-blind — entries are never parsed.

use chrono::Utc;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id.
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiry_secs: i64,
    revoked: Arc<DashMap<String, ()>>,
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
            revoked: Arc::new(DashMap::new()),
        }
    }

    /// Issue a signed token for a user.
    pub fn issue(&self, subject: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.expiry_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("token signing failed: {}", e)))
    }

    /// Add a token to the revocation set. Idempotent.
    pub fn revoke(&self, token: &str) {
        self.revoked.insert(token.to_string(), ());
    }

    /// Revocation check only — signature and expiry are `verify`'s job and
    /// must have passed before this is consulted for authorization.
    pub fn is_valid(&self, token: &str) -> bool {
        !self.revoked.contains_key(token)
    }

    /// Full cryptographic validation: signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| AppError::TokenInvalid)
    }

    /// Parse claims without verifying the signature. Used only to attribute
    /// activity records — never for authorization decisions.
    pub fn decode_unverified(&self, token: &str) -> Option<Claims> {
        let parts: Vec<&str> = token.split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        use base64::Engine;
        let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
        let payload = engine.decode(parts[1]).ok()?;
        serde_json::from_slice(&payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn test_issue_decode_roundtrip() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue(id, "alice@example.com").unwrap();

        let claims = svc.decode_unverified(&token).unwrap();
        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.user_id(), Some(id));
    }

    #[test]
    fn test_verify_accepts_own_tokens() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue(id, "alice@example.com").unwrap();

        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(id));
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let svc = service();
        let other = TokenService::new("different-secret", 3600);
        let token = other.issue(Uuid::new_v4(), "mallory@example.com").unwrap();

        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired() {
        // Default validation leeway is 60s, so push well past it.
        let svc = TokenService::new("test-secret", -300);
        let token = svc.issue(Uuid::new_v4(), "old@example.com").unwrap();

        assert!(svc.verify(&token).is_err());
        // Unverified decode still works for attribution.
        assert!(svc.decode_unverified(&token).is_some());
    }

    #[test]
    fn test_revoke_invalidates_exact_token_only() {
        let svc = service();
        let id = Uuid::new_v4();
        let first = svc.issue(id, "alice@example.com").unwrap();

        assert!(svc.is_valid(&first));
        svc.revoke(&first);
        svc.revoke(&first); // idempotent
        assert!(!svc.is_valid(&first));

        // The same subject can still receive a new, distinct token.
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let second = svc.issue(id, "alice@example.com").unwrap();
        assert_ne!(first, second);
        assert!(svc.is_valid(&second));
    }

    #[test]
    fn test_decode_unverified_garbage() {
        let svc = service();
        assert!(svc.decode_unverified("not-a-jwt").is_none());
        assert!(svc.decode_unverified("a.b.c").is_none());
    }
}
