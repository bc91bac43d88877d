//! Journal entry aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{AccountId, JournalEntryId, JournalLineId, UserId};

use super::reference::EntryReference;
use super::types::{EntryTotals, JournalEntryType, JournalStatus, LineType, SourceRef};

/// A single debit or credit line of a journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryLine {
    /// Unique identifier for this line.
    pub id: JournalLineId,
    /// The entry this line belongs to.
    pub journal_entry_id: JournalEntryId,
    /// The account affected by this line.
    pub account_id: AccountId,
    /// Debit or credit.
    pub line_type: LineType,
    /// Amount, strictly positive.
    pub amount: Decimal,
    /// Optional memo.
    pub description: Option<String>,
}

impl JournalEntryLine {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.line_type {
            LineType::Debit => self.amount,
            LineType::Credit => -self.amount,
        }
    }
}

/// A balanced set of lines recording one business transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier.
    pub id: JournalEntryId,
    /// Display reference, e.g. `JE-000123`.
    pub reference: EntryReference,
    /// Accounting date.
    pub transaction_date: NaiveDate,
    /// Classification.
    pub entry_type: JournalEntryType,
    /// Free-text description.
    pub description: String,
    /// Originating document, if any.
    pub source: Option<SourceRef>,
    /// Current status.
    pub status: JournalStatus,
    /// User who created the entry.
    pub created_by: UserId,
    /// When the entry was created.
    pub created_at: DateTime<Utc>,
    /// User who posted the entry.
    pub posted_by: Option<UserId>,
    /// When the entry was posted.
    pub posted_at: Option<DateTime<Utc>>,
    /// User who voided the entry.
    pub voided_by: Option<UserId>,
    /// When the entry was voided.
    pub voided_at: Option<DateTime<Utc>>,
    /// Lines in their original order.
    pub lines: Vec<JournalEntryLine>,
}

impl JournalEntry {
    /// Returns the debit and credit totals.
    #[must_use]
    pub fn totals(&self) -> EntryTotals {
        EntryTotals::from_lines(self.lines.iter().map(|l| (l.line_type, l.amount)))
    }

    /// Debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.totals().is_balanced()
    }

    /// `Draft`, balanced, and at least two lines.
    #[must_use]
    pub fn can_be_posted(&self) -> bool {
        self.status == JournalStatus::Draft && self.lines.len() >= 2 && self.is_balanced()
    }

    /// Only posted entries can be voided.
    #[must_use]
    pub fn can_be_voided(&self) -> bool {
        self.status == JournalStatus::Posted
    }

    /// Distinct accounts touched by this entry, in ascending id order.
    #[must_use]
    pub fn account_ids(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.lines.iter().map(|l| l.account_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
