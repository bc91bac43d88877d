//! Ledger error types.
//!
//! This module defines all errors that can occur during ledger operations:
//! validation errors, account errors, entry state errors, configuration
//! errors, and concurrency conflicts.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{AccountId, JournalEntryId};
use thiserror::Error;

use super::types::JournalStatus;

/// Broad class of a ledger error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input; nothing persisted.
    Validation,
    /// Operation not allowed in the entry's current status.
    State,
    /// The chart of accounts is missing required accounts.
    Configuration,
    /// Another writer changed the data underneath this operation.
    Concurrency,
    /// A referenced entry or account does not exist.
    NotFound,
    /// Unexpected failure.
    Internal,
}

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("journal entry requires at least 2 lines, got {count}")]
    InsufficientLines {
        /// Number of lines supplied.
        count: usize,
    },

    /// A line amount is zero or negative.
    #[error("line {index}: amount must be greater than zero, got {amount}")]
    NonPositiveAmount {
        /// Zero-based index of the offending line.
        index: usize,
        /// The offending amount.
        amount: Decimal,
    },

    /// A line amount has more decimal places than a stored amount keeps.
    #[error("line {index}: amount {amount} has more than {scale} decimal places")]
    ExcessPrecision {
        /// Zero-based index of the offending line.
        index: usize,
        /// The offending amount.
        amount: Decimal,
        /// Decimal places allowed.
        scale: u32,
    },

    /// Debits and credits are not equal.
    #[error("journal entry not balanced: debits {debits}, credits {credits}")]
    Unbalanced {
        /// Total debit amount.
        debits: Decimal,
        /// Total credit amount.
        credits: Decimal,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("account not found: {0}")]
    AccountNotFound(AccountId),

    /// No account carries this code.
    #[error("account code not found: {0}")]
    AccountCodeNotFound(String),

    /// Account is inactive and cannot take new lines.
    #[error("account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account code already in use.
    #[error("account code {0} already exists")]
    DuplicateAccountCode(String),

    /// Parent account breaks the hierarchy rules.
    #[error("account {account_id} cannot have parent {parent_id}: {reason}")]
    InvalidParent {
        /// The child account.
        account_id: AccountId,
        /// The rejected parent.
        parent_id: AccountId,
        /// Which rule was broken.
        reason: &'static str,
    },

    // ========== Entry State Errors ==========
    /// Entry not found.
    #[error("journal entry not found: {0}")]
    EntryNotFound(JournalEntryId),

    /// Entry is not a balanced draft with at least two lines.
    #[error("journal entry {reference} cannot be posted (status {status})")]
    CannotPost {
        /// Reference of the entry.
        reference: String,
        /// Status at the time of the attempt.
        status: JournalStatus,
    },

    /// Entry is not posted.
    #[error("only posted entries can be voided ({reference} is {status})")]
    CannotVoid {
        /// Reference of the entry.
        reference: String,
        /// Status at the time of the attempt.
        status: JournalStatus,
    },

    // ========== Configuration Errors ==========
    /// Required account codes are missing from the chart of accounts.
    #[error("required accounts not found: {}", .codes.join(", "))]
    MissingAccounts {
        /// The unresolved codes.
        codes: Vec<String>,
    },

    // ========== Concurrency Errors ==========
    /// The entry changed status while this operation was running.
    #[error("concurrent modification of journal entry {0}, please retry")]
    ConcurrentModification(JournalEntryId),

    /// Account version mismatch.
    #[error("account version mismatch for account {account_id}: expected {expected}, got {actual}")]
    AccountVersionMismatch {
        /// The account ID.
        account_id: AccountId,
        /// The expected version.
        expected: i64,
        /// The actual version found.
        actual: i64,
    },

    // ========== Internal Errors ==========
    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientLines { .. }
            | Self::NonPositiveAmount { .. }
            | Self::ExcessPrecision { .. }
            | Self::Unbalanced { .. }
            | Self::AccountInactive(_)
            | Self::DuplicateAccountCode(_)
            | Self::InvalidParent { .. } => ErrorKind::Validation,
            Self::CannotPost { .. } | Self::CannotVoid { .. } => ErrorKind::State,
            Self::MissingAccounts { .. } => ErrorKind::Configuration,
            Self::ConcurrentModification(_) | Self::AccountVersionMismatch { .. } => {
                ErrorKind::Concurrency
            }
            Self::AccountNotFound(_) | Self::AccountCodeNotFound(_) | Self::EntryNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::NonPositiveAmount { .. } => "NON_POSITIVE_AMOUNT",
            Self::ExcessPrecision { .. } => "EXCESS_PRECISION",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountCodeNotFound(_) => "ACCOUNT_CODE_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::DuplicateAccountCode(_) => "DUPLICATE_ACCOUNT_CODE",
            Self::InvalidParent { .. } => "INVALID_PARENT",
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::CannotPost { .. } => "CANNOT_POST",
            Self::CannotVoid { .. } => "CANNOT_VOID",
            Self::MissingAccounts { .. } => "MISSING_ACCOUNTS",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
            Self::AccountVersionMismatch { .. } => "ACCOUNT_VERSION_MISMATCH",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Concurrency => 409,
            ErrorKind::State => 422,
            ErrorKind::Configuration | ErrorKind::Internal => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Concurrency)
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err.kind() {
            ErrorKind::Validation => Self::Validation(message),
            ErrorKind::State => Self::BusinessRule(message),
            ErrorKind::Configuration => Self::Configuration(message),
            ErrorKind::Concurrency => Self::Conflict(message),
            ErrorKind::NotFound => Self::NotFound(message),
            ErrorKind::Internal => Self::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientLines { count: 1 }.error_code(),
            "INSUFFICIENT_LINES"
        );
        assert_eq!(
            LedgerError::Unbalanced {
                debits: dec!(100),
                credits: dec!(90),
            }
            .error_code(),
            "UNBALANCED_ENTRY"
        );
        assert_eq!(
            LedgerError::MissingAccounts { codes: vec![] }.error_code(),
            "MISSING_ACCOUNTS"
        );
    }

    #[test]
    fn test_kinds_and_status_codes() {
        let validation = LedgerError::NonPositiveAmount {
            index: 0,
            amount: Decimal::ZERO,
        };
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert_eq!(validation.http_status_code(), 400);

        let state = LedgerError::CannotVoid {
            reference: "JE-000001".to_string(),
            status: JournalStatus::Draft,
        };
        assert_eq!(state.kind(), ErrorKind::State);
        assert_eq!(state.http_status_code(), 422);

        let config = LedgerError::MissingAccounts {
            codes: vec!["1000".to_string()],
        };
        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert_eq!(config.http_status_code(), 500);

        let missing = LedgerError::EntryNotFound(JournalEntryId::new());
        assert_eq!(missing.http_status_code(), 404);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentModification(JournalEntryId::new()).is_retryable());
        assert!(
            LedgerError::AccountVersionMismatch {
                account_id: AccountId::new(),
                expected: 1,
                actual: 2,
            }
            .is_retryable()
        );
        assert!(!LedgerError::InsufficientLines { count: 0 }.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debits: dec!(100.00),
            credits: dec!(90.00),
        };
        assert_eq!(
            err.to_string(),
            "journal entry not balanced: debits 100.00, credits 90.00"
        );

        let err = LedgerError::CannotPost {
            reference: "JE-000007".to_string(),
            status: JournalStatus::Posted,
        };
        assert_eq!(
            err.to_string(),
            "journal entry JE-000007 cannot be posted (status posted)"
        );
    }

    #[test]
    fn test_app_error_mapping() {
        let app: AppError = LedgerError::MissingAccounts {
            codes: vec!["1200".to_string()],
        }
        .into();
        assert!(matches!(app, AppError::Configuration(_)));
        assert_eq!(app.status_code(), 500);

        let app: AppError = LedgerError::ConcurrentModification(JournalEntryId::new()).into();
        assert!(app.is_retryable());

        let app: AppError = LedgerError::CannotVoid {
            reference: "JE-000001".to_string(),
            status: JournalStatus::Void,
        }
        .into();
        assert!(matches!(app, AppError::BusinessRule(_)));
    }
}
