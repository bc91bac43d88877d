//! Ledger reports.
//!
//! This module provides pure business logic for:
//! - The trial balance over cached account balances
//! - Balances derived from posted journal lines
//! - Reconciliation of cached against derived balances

pub mod service;
pub mod types;


pub use service::ReportService;
pub use types::{BalanceDiscrepancy, TrialBalance, TrialBalanceLine};
