//! Chart of accounts.
//!
//! - Account types and their natural debit/credit side
//! - The sign convention for balance changes
//! - The fixed account-code table used by posting workflows
//! - Parent/child hierarchy rules

pub mod codes;
pub mod hierarchy;
pub mod types;

pub use codes::{AccountCode, AccountMap, CashAccount, ExpenseCategory};
pub use hierarchy::{rollup_balance, validate_parent};
pub use types::{Account, AccountCategory, AccountType, NewAccount};
