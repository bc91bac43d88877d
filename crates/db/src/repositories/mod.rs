//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Ledger rules live in `tally-core`; repositories add transactions and row
//! locks around them.

pub mod account;
pub mod error;
pub mod inventory;
pub mod journal;
pub mod posting;
pub mod report;

mod convert;

pub use account::AccountRepository;
pub use error::RepositoryError;
pub use inventory::InventoryRepository;
pub use journal::{EntryFilter, JournalRepository};
pub use posting::PostingRepository;
pub use report::ReportRepository;
