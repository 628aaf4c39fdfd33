//! # pb-auth-jwt
//!
//! Argon2 + JWT implementation of `AuthProvider`.
//! Handles credential hashing and stateless, signed session tokens.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pb_core::error::{AppError, Result};
use pb_core::models::Identity;
use pb_core::traits::AuthProvider;
use serde::{Deserialize, Serialize};

/// Sessions are valid for 24 hours from issuance.
const SESSION_TTL_HOURS: i64 = 24;

/// The signed claim set carried by a session cookie.
///
/// Expiry is embedded in the payload itself; validity is purely a function
/// of the signature and `exp`. There is no server-side revocation.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    userid: i64,
    username: String,
    iat: i64,
    exp: i64,
}

pub struct JwtAuthProvider {
    secret: String,
    ttl: Duration,
}

impl JwtAuthProvider {
    /// Accepts the signing secret (e.g. from an environment variable).
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(SESSION_TTL_HOURS),
        }
    }

    /// Overrides the session lifetime. Used by tests to mint
    /// already-expired tokens.
    pub fn with_ttl(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }
}

impl AuthProvider for JwtAuthProvider {
    fn hash_password(&self, plaintext: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| AppError::Internal(format!("password hashing failed: {err}")))
    }

    /// Verifies a plaintext against a stored PHC digest.
    /// A digest that does not parse is treated as a failed match.
    fn verify_password(&self, plaintext: &str, digest: &str) -> bool {
        let parsed = match PasswordHash::new(digest) {
            Ok(p) => p,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }

    fn issue_session(&self, identity: &Identity) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            userid: identity.user_id,
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|err| AppError::Internal(format!("token signing failed: {err}")))
    }

    fn verify_session(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| Identity {
            user_id: data.claims.userid,
            username: data.claims.username,
        })
        .map_err(|err| {
            log::debug!("session token rejected: {err}");
            AppError::InvalidToken(err.to_string())
        })
    }
}
