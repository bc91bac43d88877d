//! Chart of accounts domain types.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use crate::ledger::LineType;

/// Account type.
///
/// Determines the natural side of the account:
/// - Asset/Expense are debit-natured (a debit increases the balance)
/// - Liability/Equity/Revenue are credit-natured (a credit increases the balance)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Things the business owns.
    Asset,
    /// Things the business owes.
    Liability,
    /// Owner's stake in the business.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

impl AccountType {
    /// All account types in chart order.
    pub const ALL: [Self; 5] = [
        Self::Asset,
        Self::Liability,
        Self::Equity,
        Self::Revenue,
        Self::Expense,
    ];

    /// Returns true if a debit increases accounts of this type.
    #[must_use]
    pub const fn is_debit_natured(self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finer classification of an account, used for reporting groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    /// Cash, bank, receivables.
    CurrentAsset,
    /// Raw materials and finished goods.
    Inventory,
    /// Long-lived assets.
    FixedAsset,
    /// Payables due within a year.
    CurrentLiability,
    /// Payables due after a year.
    LongTermLiability,
    /// Owner's equity and retained earnings.
    OwnersEquity,
    /// Sales revenue.
    OperatingRevenue,
    /// Materials and labor consumed by production.
    CostOfGoodsSold,
    /// Overheads such as rent and utilities.
    OperatingExpense,
    /// Anything else.
    OtherExpense,
}

impl AccountCategory {
    /// All categories.
    pub const ALL: [Self; 10] = [
        Self::CurrentAsset,
        Self::Inventory,
        Self::FixedAsset,
        Self::CurrentLiability,
        Self::LongTermLiability,
        Self::OwnersEquity,
        Self::OperatingRevenue,
        Self::CostOfGoodsSold,
        Self::OperatingExpense,
        Self::OtherExpense,
    ];

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentAsset => "current_asset",
            Self::Inventory => "inventory",
            Self::FixedAsset => "fixed_asset",
            Self::CurrentLiability => "current_liability",
            Self::LongTermLiability => "long_term_liability",
            Self::OwnersEquity => "owners_equity",
            Self::OperatingRevenue => "operating_revenue",
            Self::CostOfGoodsSold => "cost_of_goods_sold",
            Self::OperatingExpense => "operating_expense",
            Self::OtherExpense => "other_expense",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

/// Input for opening a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    /// Unique account code (e.g. "1000").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: AccountCategory,
    /// Optional parent account of the same type.
    pub parent_id: Option<AccountId>,
}

/// An account in the chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: AccountId,
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Reporting category.
    pub category: AccountCategory,
    /// Parent account, if any.
    pub parent_id: Option<AccountId>,
    /// Cached balance, signed by the account's natural side.
    pub balance: Decimal,
    /// Inactive accounts accept no new lines.
    pub is_active: bool,
    /// Incremented on every balance mutation.
    pub version: i64,
}

impl Account {
    /// Opens a fresh account with a zero balance.
    #[must_use]
    pub fn open(input: NewAccount) -> Self {
        Self {
            id: AccountId::new(),
            code: input.code,
            name: input.name,
            account_type: input.account_type,
            category: input.category,
            parent_id: input.parent_id,
            balance: Decimal::ZERO,
            is_active: true,
            version: 0,
        }
    }

    /// Returns true if a debit increases this account's balance.
    #[must_use]
    pub const fn is_debit_account(&self) -> bool {
        self.account_type.is_debit_natured()
    }

    /// Returns true if a credit increases this account's balance.
    #[must_use]
    pub const fn is_credit_account(&self) -> bool {
        !self.is_debit_account()
    }

    /// Returns the signed change a line of `line_type` and `amount` makes
    /// to this account's balance.
    #[must_use]
    pub fn balance_change(&self, line_type: LineType, amount: Decimal) -> Decimal {
        match (line_type, self.is_debit_account()) {
            (LineType::Debit, true) | (LineType::Credit, false) => amount,
            (LineType::Debit, false) | (LineType::Credit, true) => -amount,
        }
    }

    /// Applies a line to the cached balance.
    ///
    /// Only the journal engine may call this, inside the same atomic unit
    /// as the entry's status transition.
    pub(crate) fn update_balance(&mut self, line_type: LineType, amount: Decimal) {
        self.balance += self.balance_change(line_type, amount);
        self.version += 1;
    }
}
