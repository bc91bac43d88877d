//! Repository error type.

use sea_orm::DbErr;
use tally_core::inventory::InventoryError;
use tally_core::ledger::LedgerError;
use tally_core::postings::PostingError;
use tally_shared::AppError;
use thiserror::Error;

/// Errors from the Postgres repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A ledger rule rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// An inventory rule rejected the operation.
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// A stored row could not be mapped back to a domain value.
    #[error("Corrupt {table} record {id}: {detail}")]
    CorruptRecord {
        /// Table the row came from.
        table: &'static str,
        /// Row id.
        id: uuid::Uuid,
        /// What was wrong.
        detail: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<PostingError> for RepositoryError {
    fn from(err: PostingError) -> Self {
        match err {
            PostingError::Ledger(err) => Self::Ledger(err),
            PostingError::Inventory(err) => Self::Inventory(err),
        }
    }
}

impl RepositoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(err) => err.error_code(),
            Self::Inventory(err) => err.error_code(),
            Self::CorruptRecord { .. } => "CORRUPT_RECORD",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(err) => err.http_status_code(),
            Self::Inventory(err) => err.http_status_code(),
            Self::CorruptRecord { .. } | Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(err) => err.is_retryable(),
            Self::Inventory(_) | Self::CorruptRecord { .. } | Self::Database(_) => false,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Ledger(err) => err.into(),
            RepositoryError::Inventory(err) => err.into(),
            RepositoryError::CorruptRecord { .. } => Self::Internal(err.to_string()),
            RepositoryError::Database(err) => Self::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_shared::types::{AccountId, JournalEntryId};

    #[test]
    fn test_concurrency_conflicts_are_retryable() {
        let err = RepositoryError::from(LedgerError::ConcurrentModification(JournalEntryId::new()));
        assert!(err.is_retryable());
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_database_error_maps_to_app_error() {
        let err = RepositoryError::Database(DbErr::Custom("connection reset".to_string()));
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert!(!err.is_retryable());

        let app: AppError = err.into();
        assert!(matches!(app, AppError::Database(_)));
    }

    #[test]
    fn test_corrupt_record_is_internal() {
        let err = RepositoryError::CorruptRecord {
            table: "journal_entries",
            id: uuid::Uuid::nil(),
            detail: "unknown source kind 'invoice'".to_string(),
        };
        assert_eq!(err.http_status_code(), 500);
        let app: AppError = err.into();
        assert!(matches!(app, AppError::Internal(_)));
    }

    #[test]
    fn test_posting_error_unwraps() {
        let id = AccountId::new();
        let err: RepositoryError = PostingError::Ledger(LedgerError::AccountNotFound(id)).into();
        assert!(matches!(err, RepositoryError::Ledger(LedgerError::AccountNotFound(found)) if found == id));
        assert_eq!(err.http_status_code(), 404);
    }
}
