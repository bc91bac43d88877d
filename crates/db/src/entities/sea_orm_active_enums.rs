//! `SeaORM` active enums mirroring the Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `account_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Revenue.
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

/// `account_category` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_category")]
pub enum AccountCategory {
    /// Current asset.
    #[sea_orm(string_value = "current_asset")]
    CurrentAsset,
    /// Inventory.
    #[sea_orm(string_value = "inventory")]
    Inventory,
    /// Fixed asset.
    #[sea_orm(string_value = "fixed_asset")]
    FixedAsset,
    /// Current liability.
    #[sea_orm(string_value = "current_liability")]
    CurrentLiability,
    /// Long-term liability.
    #[sea_orm(string_value = "long_term_liability")]
    LongTermLiability,
    /// Owner's equity.
    #[sea_orm(string_value = "owners_equity")]
    OwnersEquity,
    /// Operating revenue.
    #[sea_orm(string_value = "operating_revenue")]
    OperatingRevenue,
    /// Cost of goods sold.
    #[sea_orm(string_value = "cost_of_goods_sold")]
    CostOfGoodsSold,
    /// Operating expense.
    #[sea_orm(string_value = "operating_expense")]
    OperatingExpense,
    /// Other expense.
    #[sea_orm(string_value = "other_expense")]
    OtherExpense,
}

/// `journal_entry_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_entry_type")]
pub enum JournalEntryType {
    /// General.
    #[sea_orm(string_value = "general")]
    General,
    /// Sales.
    #[sea_orm(string_value = "sales")]
    Sales,
    /// Purchase.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Payment.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Receipt.
    #[sea_orm(string_value = "receipt")]
    Receipt,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Adjustment.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// Depreciation.
    #[sea_orm(string_value = "depreciation")]
    Depreciation,
    /// Inventory.
    #[sea_orm(string_value = "inventory")]
    Inventory,
}

/// `journal_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "journal_status")]
pub enum JournalStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Posted.
    #[sea_orm(string_value = "posted")]
    Posted,
    /// Void.
    #[sea_orm(string_value = "void")]
    Void,
}

/// `line_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "line_type")]
pub enum LineType {
    /// Debit.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit.
    #[sea_orm(string_value = "credit")]
    Credit,
}
