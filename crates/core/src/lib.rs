//! Core ledger logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Account rules, journal validation, inventory costing and the posting
//! workflows all live here; `tally-db` persists what these modules decide.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts and the fixed account-code table
//! - `ledger` - Double-entry journal engine
//! - `inventory` - Weighted-average costing and stock lots
//! - `postings` - Ledger-triggering business workflows
//! - `reports` - Trial balance and balance reconciliation

pub mod accounts;
pub mod inventory;
pub mod ledger;
pub mod postings;
pub mod reports;
