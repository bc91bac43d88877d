//! Double-entry journal engine.
//!
//! This module implements the core ledger functionality:
//! - Journal entries and their lines
//! - Entry references and the atomic reference sequence
//! - Business rule validation, run before anything is persisted
//! - The `Draft -> Posted -> Void` state machine and balance updates
//! - An in-memory `Ledger` that runs every operation atomically
//! - Error types for ledger operations

pub mod engine;
pub mod entry;
pub mod error;
pub mod reference;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod engine_props;
#[cfg(test)]
mod validation_props;

pub use engine::{Ledger, LedgerSettings};
pub use entry::{JournalEntry, JournalEntryLine};
pub use error::{ErrorKind, LedgerError};
pub use reference::{EntryReference, ReferenceFormat, ReferenceSequence};
pub use service::{BalanceDirection, LedgerService};
pub use types::{
    CreateJournalEntryInput, EntryTotals, JournalEntryType, JournalLineInput, JournalStatus,
    LineType, SourceRef,
};
pub use validation::{validate_accounts, validate_lines};
