//! # Domain Models
//!
//! These structs represent the core entities of Parkboard.
//! Row ids are SQLite AUTOINCREMENT integers, always positive.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// 3-10 alphanumeric characters, unique across accounts.
    pub username: String,
    /// Opaque PHC-format digest. Never the plaintext.
    pub password_hash: String,
}

/// A text post authored by a registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    /// Always the id of the session identity active at creation time.
    pub author_id: i64,
}

/// One recorded parking reservation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub visited_date: DateTime<Utc>,
    pub place: String,
    pub parking_spot: i64,
    pub spots_left: i64,
    pub rating: i64,
    /// Always the id of the session identity active at creation time.
    pub customer_id: i64,
}

/// Validated reservation input. Carries no owner field: the store stamps
/// the customer id from the acting identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub place: String,
    pub parking_spot: i64,
    pub spots_left: i64,
    pub rating: i64,
}

/// The `{user id, username}` pair recovered from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}
