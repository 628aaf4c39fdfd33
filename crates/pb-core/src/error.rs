//! # AppError
//!
//! Centralized error handling for the Parkboard ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all pb-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Field-level validation failure, surfaced verbatim in the form
    #[error("validation error: {0}")]
    Validation(String),

    /// Bad credentials. Deliberately carries no detail: a missing account
    /// and a wrong password must be indistinguishable to the caller.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Missing/expired/forged session token
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    /// Resource already exists (e.g. duplicate username)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Infrastructure failure (e.g. DB down, hashing failure)
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Parkboard logic.
pub type Result<T> = std::result::Result<T, AppError>;
