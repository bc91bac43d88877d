//! Posting workflow errors.

use tally_shared::AppError;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::ledger::LedgerError;

/// Errors from a ledger-triggering workflow.
#[derive(Debug, Error)]
pub enum PostingError {
    /// The ledger rejected the entry, or the chart is missing accounts.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// The stock movement was rejected.
    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Inventory(err) => err.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(err) => err.http_status_code(),
            Self::Inventory(err) => err.http_status_code(),
        }
    }
}

impl From<PostingError> for AppError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::Ledger(err) => err.into(),
            PostingError::Inventory(err) => err.into(),
        }
    }
}
