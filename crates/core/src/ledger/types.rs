//! Ledger domain types for journal entry creation.
//!
//! This module defines the enums shared by entries and lines, the closed set
//! of source documents an entry can point back to, and the input shape
//! collaborators use to create entries.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    AccountId, ExpenseId, OrderId, PaymentId, ProductionJobId, PurchaseOrderId,
};
use uuid::Uuid;

/// Line type: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/equity/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/equity/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    /// Debit line.
    Debit,
    /// Credit line.
    Credit,
}

impl LineType {
    /// Returns the opposite side, used when reversing a posted entry.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }
}

/// Journal entry classification.
///
/// Classification only: the type never changes how an entry is validated
/// or posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEntryType {
    /// Manual journal entry.
    General,
    /// Customer invoice.
    Sales,
    /// Supplier receipt of goods.
    Purchase,
    /// Outgoing payment.
    Payment,
    /// Incoming payment.
    Receipt,
    /// Operating expense.
    Expense,
    /// Correction.
    Adjustment,
    /// Depreciation charge.
    Depreciation,
    /// Inventory movement (production consumption, completion).
    Inventory,
}

impl JournalEntryType {
    /// All entry types.
    pub const ALL: [Self; 9] = [
        Self::General,
        Self::Sales,
        Self::Purchase,
        Self::Payment,
        Self::Receipt,
        Self::Expense,
        Self::Adjustment,
        Self::Depreciation,
        Self::Inventory,
    ];

    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Sales => "sales",
            Self::Purchase => "purchase",
            Self::Payment => "payment",
            Self::Receipt => "receipt",
            Self::Expense => "expense",
            Self::Adjustment => "adjustment",
            Self::Depreciation => "depreciation",
            Self::Inventory => "inventory",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

/// Journal entry status.
///
/// `Draft --post--> Posted --void--> Void`. Nothing leaves `Void`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Created, not yet applied to balances.
    Draft,
    /// Applied to balances (immutable apart from voiding).
    Posted,
    /// Reversed. Terminal.
    Void,
}

impl JournalStatus {
    /// Returns the storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
            Self::Void => "void",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The document that caused a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SourceRef {
    /// A sales order.
    Order(OrderId),
    /// A customer or supplier payment.
    Payment(PaymentId),
    /// A purchase order.
    PurchaseOrder(PurchaseOrderId),
    /// A production job.
    ProductionJob(ProductionJobId),
    /// A recorded expense.
    Expense(ExpenseId),
}

impl SourceRef {
    /// Storage tag of the source kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Order(_) => "order",
            Self::Payment(_) => "payment",
            Self::PurchaseOrder(_) => "purchase_order",
            Self::ProductionJob(_) => "production_job",
            Self::Expense(_) => "expense",
        }
    }

    /// Raw id of the source document.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Order(id) => id.0,
            Self::Payment(id) => id.0,
            Self::PurchaseOrder(id) => id.0,
            Self::ProductionJob(id) => id.0,
            Self::Expense(id) => id.0,
        }
    }

    /// Rebuilds a source from its stored `(kind, id)` pair.
    #[must_use]
    pub fn from_parts(kind: &str, id: Uuid) -> Option<Self> {
        match kind {
            "order" => Some(Self::Order(id.into())),
            "payment" => Some(Self::Payment(id.into())),
            "purchase_order" => Some(Self::PurchaseOrder(id.into())),
            "production_job" => Some(Self::ProductionJob(id.into())),
            "expense" => Some(Self::Expense(id.into())),
            _ => None,
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Input for a single journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineInput {
    /// The account to post against.
    pub account_id: AccountId,
    /// Debit or credit.
    pub line_type: LineType,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Optional line memo.
    pub description: Option<String>,
}

impl JournalLineInput {
    /// Debit line without a memo.
    #[must_use]
    pub const fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            line_type: LineType::Debit,
            amount,
            description: None,
        }
    }

    /// Credit line without a memo.
    #[must_use]
    pub const fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id,
            line_type: LineType::Credit,
            amount,
            description: None,
        }
    }

    /// Attaches a memo to the line.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Input for creating a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateJournalEntryInput {
    /// Accounting date of the entry.
    pub transaction_date: NaiveDate,
    /// Classification.
    pub entry_type: JournalEntryType,
    /// Free-text description.
    pub description: String,
    /// Originating document, if any.
    pub source: Option<SourceRef>,
    /// Lines; at least two, balanced.
    pub lines: Vec<JournalLineInput>,
}

/// Sum of debits and credits of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Total of debit lines.
    pub debits: Decimal,
    /// Total of credit lines.
    pub credits: Decimal,
}

impl EntryTotals {
    /// Sums `(line_type, amount)` pairs.
    #[must_use]
    pub fn from_lines<I>(lines: I) -> Self
    where
        I: IntoIterator<Item = (LineType, Decimal)>,
    {
        lines.into_iter().fold(
            Self {
                debits: Decimal::ZERO,
                credits: Decimal::ZERO,
            },
            |mut totals, (line_type, amount)| {
                match line_type {
                    LineType::Debit => totals.debits += amount,
                    LineType::Credit => totals.credits += amount,
                }
                totals
            },
        )
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debits - self.credits
    }

    /// Returns true if debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debits == self.credits
    }
}
