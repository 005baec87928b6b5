//! Error kinds surfaced by the ledger.
//!
//! Every ledger operation either succeeds or fails with exactly one [`Error`]:
//! - Account errors (not found, wrong PIN)
//! - Transaction validation errors (non-positive amount, same account, insufficient funds)
//! - [`StorageError`] when the backend could not read or write the document
//!
//! Only storage failures are server-class; everything else is the caller's fault
//! and should be reported back as a validation failure.

use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("account not found: {0}")]
    NotFound(String),

    #[error("invalid PIN")]
    InvalidCredentials,

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("sender and receiver cannot be the same account")]
    SameAccount,

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl Error {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// True for every kind caused by the request itself, i.e. all but [`Error::Storage`].
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Failure of the persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed ledger document: {0}")]
    Serialization(#[from] serde_json::Error),
}
