//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use crate::error::Result;
use crate::models::{HistoryEntry, Identity, Post, Reservation, User};

/// Credential persistence contract: the username -> password-hash space.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Inserts a new account. A duplicate username yields `AppError::Conflict`.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn username_taken(&self, username: &str) -> Result<bool>;
}

/// Persistence contract for owner-scoped records (posts and history).
///
/// Owner columns are stamped from the `Identity` argument inside the
/// implementation. Callers cannot supply an owner id.
#[async_trait]
pub trait DomainRepo: Send + Sync {
    /// Inserts a post authored by `author`, timestamped server-side.
    async fn create_post(&self, author: &Identity, title: &str, body: &str) -> Result<Post>;

    /// Records a reservation for `customer`, timestamped server-side.
    async fn record_reservation(&self, customer: &Identity, reservation: Reservation)
        -> Result<()>;

    /// History rows for the given user id, most recent first.
    /// `None` (anonymous caller) yields an empty vec, never an error.
    async fn history_for(&self, user_id: Option<i64>) -> Result<Vec<HistoryEntry>>;
}

/// Credential hashing and session token contract.
///
/// Token verification is a pure cryptographic check: signature over the
/// whole payload plus embedded expiry. No server-side session state.
pub trait AuthProvider: Send + Sync {
    /// One-way salted hash of a plaintext password.
    fn hash_password(&self, plaintext: &str) -> Result<String>;

    /// Recomputes with the salt embedded in `digest` and compares in
    /// constant time. A malformed digest is `false`, never an error.
    fn verify_password(&self, plaintext: &str, digest: &str) -> bool;

    /// Mints a signed session token for `identity`.
    fn issue_session(&self, identity: &Identity) -> Result<String>;

    /// Verifies signature and expiry, recovering the embedded identity.
    fn verify_session(&self, token: &str) -> Result<Identity>;
}
