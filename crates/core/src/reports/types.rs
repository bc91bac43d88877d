//! Report data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

/// One account's amount in a trial balance column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Amount in this column, always positive.
    pub amount: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalance {
    /// Debit column, ordered by account code.
    pub debits: Vec<TrialBalanceLine>,
    /// Credit column, ordered by account code.
    pub credits: Vec<TrialBalanceLine>,
    /// Sum of the debit column.
    pub total_debits: Decimal,
    /// Sum of the credit column.
    pub total_credits: Decimal,
    /// Whether the columns agree within the tolerance.
    pub is_balanced: bool,
}

/// An account whose cached balance disagrees with its posted lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDiscrepancy {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Balance stored on the account.
    pub cached: Decimal,
    /// Balance recomputed from posted lines.
    pub derived: Decimal,
}

impl BalanceDiscrepancy {
    /// Cached minus derived.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.cached - self.derived
    }
}
