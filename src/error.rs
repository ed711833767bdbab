//! Error taxonomy for the patient pipeline.
//!
//! Validation failures never reach the network; transport failures surface
//! unmodified (no retries). Nothing here is fatal — the worst case is a
//! stuck draft or a stale list, both recoverable by re-triggering the
//! action.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// A failed exchange with the patient API.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Cannot reach patient API at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Server returned {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Patient {0} not found")]
    NotFound(u64),

    #[error("Response decoding failed: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Outcome of a save attempt (draft commit or edit of a persisted record).
#[derive(Error, Debug)]
pub enum SaveError {
    /// Field-level failures; no network call was made.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
