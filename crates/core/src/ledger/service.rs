//! Ledger service for journal entry validation and state transitions.
//!
//! This module holds the pure rules shared by the in-memory [`Ledger`] and
//! the Postgres repositories: how a draft is built, when an entry may be
//! posted or voided, and how its lines move account balances. Callers own
//! atomicity; the service only ever mutates values it is handed.
//!
//! [`Ledger`]: super::engine::Ledger

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tally_shared::types::{AccountId, JournalEntryId, JournalLineId, UserId};

use super::entry::{JournalEntry, JournalEntryLine};
use super::error::LedgerError;
use super::reference::EntryReference;
use super::types::{CreateJournalEntryInput, EntryTotals, JournalStatus};
use super::validation::{validate_accounts, validate_lines};
use crate::accounts::Account;

/// Which way an entry's lines move balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceDirection {
    /// Apply each line as written.
    Post,
    /// Apply the opposite of each line.
    Void,
}

/// Ledger service for journal entry rules.
///
/// This service contains pure business logic with no storage dependencies.
pub struct LedgerService;

impl LedgerService {
    /// Validates an entry before anything is allocated or persisted.
    ///
    /// # Errors
    ///
    /// Returns a validation error from [`validate_lines`] or
    /// [`validate_accounts`].
    pub fn validate_entry<'a, F>(
        input: &CreateJournalEntryInput,
        account_lookup: F,
    ) -> Result<EntryTotals, LedgerError>
    where
        F: Fn(AccountId) -> Option<&'a Account>,
    {
        let totals = validate_lines(&input.lines)?;
        validate_accounts(&input.lines, account_lookup)?;
        Ok(totals)
    }

    /// Builds a draft entry from validated input.
    #[must_use]
    pub fn build_draft(
        input: CreateJournalEntryInput,
        reference: EntryReference,
        actor: UserId,
        now: DateTime<Utc>,
    ) -> JournalEntry {
        let id = JournalEntryId::new();
        let lines = input
            .lines
            .into_iter()
            .map(|line| JournalEntryLine {
                id: JournalLineId::new(),
                journal_entry_id: id,
                account_id: line.account_id,
                line_type: line.line_type,
                amount: line.amount,
                description: line.description,
            })
            .collect();

        JournalEntry {
            id,
            reference,
            transaction_date: input.transaction_date,
            entry_type: input.entry_type,
            description: input.description,
            source: input.source,
            status: JournalStatus::Draft,
            created_by: actor,
            created_at: now,
            posted_by: None,
            posted_at: None,
            voided_by: None,
            voided_at: None,
            lines,
        }
    }

    /// Checks the posting precondition.
    ///
    /// # Errors
    ///
    /// Returns `CannotPost` unless the entry is a balanced draft with at
    /// least two lines.
    pub fn ensure_can_post(entry: &JournalEntry) -> Result<(), LedgerError> {
        if entry.can_be_posted() {
            Ok(())
        } else {
            Err(LedgerError::CannotPost {
                reference: entry.reference.to_string(),
                status: entry.status,
            })
        }
    }

    /// Checks the voiding precondition.
    ///
    /// # Errors
    ///
    /// Returns `CannotVoid` unless the entry is posted.
    pub fn ensure_can_void(entry: &JournalEntry) -> Result<(), LedgerError> {
        if entry.can_be_voided() {
            Ok(())
        } else {
            Err(LedgerError::CannotVoid {
                reference: entry.reference.to_string(),
                status: entry.status,
            })
        }
    }

    /// Applies every line of `entry`, in line order, to `accounts`.
    ///
    /// `accounts` should be working copies: on error some of them may
    /// already have been changed, and the caller must discard them.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if a line's account is absent from
    /// `accounts`, and `AccountInactive` when posting to an inactive account.
    /// Voiding is allowed against inactive accounts so history can be undone.
    pub fn apply_to_accounts(
        entry: &JournalEntry,
        direction: BalanceDirection,
        accounts: &mut BTreeMap<AccountId, Account>,
    ) -> Result<(), LedgerError> {
        for line in &entry.lines {
            let account = accounts
                .get_mut(&line.account_id)
                .ok_or(LedgerError::AccountNotFound(line.account_id))?;

            let line_type = match direction {
                BalanceDirection::Post => {
                    if !account.is_active {
                        return Err(LedgerError::AccountInactive(account.id));
                    }
                    line.line_type
                }
                BalanceDirection::Void => line.line_type.opposite(),
            };
            account.update_balance(line_type, line.amount);
        }
        Ok(())
    }

    /// Flips a draft to posted.
    pub fn mark_posted(entry: &mut JournalEntry, actor: UserId, now: DateTime<Utc>) {
        entry.status = JournalStatus::Posted;
        entry.posted_by = Some(actor);
        entry.posted_at = Some(now);
    }

    /// Flips a posted entry to void.
    pub fn mark_voided(entry: &mut JournalEntry, actor: UserId, now: DateTime<Utc>) {
        entry.status = JournalStatus::Void;
        entry.voided_by = Some(actor);
        entry.voided_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountCategory, AccountType, NewAccount};
    use crate::ledger::types::{JournalEntryType, JournalLineInput};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn open(code: &str, account_type: AccountType) -> Account {
        Account::open(NewAccount {
            code: code.to_string(),
            name: code.to_string(),
            account_type,
            category: AccountCategory::CurrentAsset,
            parent_id: None,
        })
    }

    fn draft(cash: &Account, sales: &Account, amount: Decimal) -> JournalEntry {
        let input = CreateJournalEntryInput {
            transaction_date: NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
            entry_type: JournalEntryType::Sales,
            description: "Cash sale".to_string(),
            source: None,
            lines: vec![
                JournalLineInput::debit(cash.id, amount),
                JournalLineInput::credit(sales.id, amount),
            ],
        };
        LedgerService::build_draft(
            input,
            EntryReference::from_string("JE-000001"),
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_build_draft_links_lines() {
        let cash = open("1000", AccountType::Asset);
        let sales = open("4000", AccountType::Revenue);
        let entry = draft(&cash, &sales, dec!(100));

        assert_eq!(entry.status, JournalStatus::Draft);
        assert_eq!(entry.lines.len(), 2);
        assert!(entry.lines.iter().all(|l| l.journal_entry_id == entry.id));
        assert!(entry.posted_at.is_none());
    }

    #[test]
    fn test_post_then_void_restores_balances() {
        let cash = open("1000", AccountType::Asset);
        let sales = open("4000", AccountType::Revenue);
        let entry = draft(&cash, &sales, dec!(100));
        let mut accounts: BTreeMap<AccountId, Account> =
            [(cash.id, cash.clone()), (sales.id, sales.clone())].into();

        LedgerService::apply_to_accounts(&entry, BalanceDirection::Post, &mut accounts).unwrap();
        assert_eq!(accounts[&cash.id].balance, dec!(100));
        assert_eq!(accounts[&sales.id].balance, dec!(100));

        LedgerService::apply_to_accounts(&entry, BalanceDirection::Void, &mut accounts).unwrap();
        assert_eq!(accounts[&cash.id].balance, Decimal::ZERO);
        assert_eq!(accounts[&sales.id].balance, Decimal::ZERO);
        assert_eq!(accounts[&cash.id].version, 2);
    }

    #[test]
    fn test_posting_to_inactive_account_fails_but_void_succeeds() {
        let cash = open("1000", AccountType::Asset);
        let mut sales = open("4000", AccountType::Revenue);
        sales.is_active = false;
        let entry = draft(&cash, &sales, dec!(10));
        let mut accounts: BTreeMap<AccountId, Account> =
            [(cash.id, cash.clone()), (sales.id, sales.clone())].into();

        assert!(matches!(
            LedgerService::apply_to_accounts(&entry, BalanceDirection::Post, &mut accounts),
            Err(LedgerError::AccountInactive(_))
        ));
        assert!(
            LedgerService::apply_to_accounts(&entry, BalanceDirection::Void, &mut accounts)
                .is_ok()
        );
    }

    #[test]
    fn test_state_preconditions() {
        let cash = open("1000", AccountType::Asset);
        let sales = open("4000", AccountType::Revenue);
        let mut entry = draft(&cash, &sales, dec!(10));

        assert!(LedgerService::ensure_can_void(&entry).is_err());
        assert!(LedgerService::ensure_can_post(&entry).is_ok());

        LedgerService::mark_posted(&mut entry, UserId::new(), Utc::now());
        assert!(matches!(
            LedgerService::ensure_can_post(&entry),
            Err(LedgerError::CannotPost { status: JournalStatus::Posted, .. })
        ));
        assert!(LedgerService::ensure_can_void(&entry).is_ok());

        LedgerService::mark_voided(&mut entry, UserId::new(), Utc::now());
        assert!(entry.voided_by.is_some());
        assert!(LedgerService::ensure_can_void(&entry).is_err());
        assert!(LedgerService::ensure_can_post(&entry).is_err());
    }
}
