//! In-memory journal engine.
//!
//! [`Ledger`] owns a chart of accounts and its journal. Every public
//! operation runs as one critical section under a single mutex: balance
//! changes are staged on copies of the touched accounts and written back
//! only when the whole operation succeeded. Reference numbers come from an
//! atomic sequence and are only taken after validation passed.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use tally_shared::LedgerConfig;
use tally_shared::types::{AccountId, DEFAULT_BALANCE_TOLERANCE, JournalEntryId, UserId};

use super::entry::JournalEntry;
use super::error::LedgerError;
use super::reference::{ReferenceFormat, ReferenceSequence};
use super::service::{BalanceDirection, LedgerService};
use super::types::CreateJournalEntryInput;
use crate::accounts::{Account, AccountMap, NewAccount, validate_parent};
use crate::reports::{BalanceDiscrepancy, ReportService, TrialBalance};

/// Tunables of a ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// How references are rendered.
    pub reference_format: ReferenceFormat,
    /// Maximum difference between the trial balance columns still reported
    /// as balanced. Journal entries themselves must balance exactly.
    pub balance_tolerance: Decimal,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            reference_format: ReferenceFormat::default(),
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
        }
    }
}

impl From<&LedgerConfig> for LedgerSettings {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            reference_format: ReferenceFormat {
                prefix: config.reference_prefix.clone(),
                width: config.reference_width,
            },
            balance_tolerance: config.balance_tolerance,
        }
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    accounts: HashMap<AccountId, Account>,
    entries: HashMap<JournalEntryId, JournalEntry>,
    order: Vec<JournalEntryId>,
}

impl LedgerState {
    fn account_by_code(&self, code: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.code == code)
    }

    fn entry(&self, id: JournalEntryId) -> Result<&JournalEntry, LedgerError> {
        self.entries.get(&id).ok_or(LedgerError::EntryNotFound(id))
    }

    /// Copies the accounts `entry` touches, keyed in id order.
    fn stage_accounts(
        &self,
        entry: &JournalEntry,
    ) -> Result<BTreeMap<AccountId, Account>, LedgerError> {
        entry
            .account_ids()
            .into_iter()
            .map(|id| {
                self.accounts
                    .get(&id)
                    .cloned()
                    .map(|a| (id, a))
                    .ok_or(LedgerError::AccountNotFound(id))
            })
            .collect()
    }

    fn commit_accounts(&mut self, staged: BTreeMap<AccountId, Account>) {
        self.accounts.extend(staged);
    }

    fn insert_entry(&mut self, entry: JournalEntry) {
        self.order.push(entry.id);
        self.entries.insert(entry.id, entry);
    }
}

/// Double-entry ledger held in memory.
#[derive(Debug)]
pub struct Ledger {
    settings: LedgerSettings,
    sequence: ReferenceSequence,
    state: Mutex<LedgerState>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerSettings::default())
    }
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new(settings: LedgerSettings) -> Self {
        Self {
            settings,
            sequence: ReferenceSequence::new(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Returns the ledger settings.
    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Internal("ledger state lock poisoned".to_string()))
    }

    // ========== Chart of accounts ==========

    /// Opens a new account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode` if the code is taken, `AccountNotFound`
    /// for an unknown parent, or `InvalidParent` if the parent breaks the
    /// hierarchy rules.
    pub fn open_account(&self, input: NewAccount) -> Result<Account, LedgerError> {
        let mut state = self.lock()?;

        if state.account_by_code(&input.code).is_some() {
            return Err(LedgerError::DuplicateAccountCode(input.code));
        }

        let account = Account::open(input);
        if let Some(parent_id) = account.parent_id {
            let parent = state
                .accounts
                .get(&parent_id)
                .ok_or(LedgerError::AccountNotFound(parent_id))?;
            validate_parent(&account, parent)?;
        }

        tracing::info!(
            account_id = %account.id,
            code = %account.code,
            account_type = %account.account_type,
            "account opened"
        );
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    /// Deactivates an account. Its history and balance are kept, but it
    /// accepts no new lines and leaves the trial balance.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn deactivate_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        account.is_active = false;
        tracing::info!(account_id = %id, code = %account.code, "account deactivated");
        Ok(account.clone())
    }

    /// Returns an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub fn account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.lock()?
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LedgerError::AccountNotFound(id))
    }

    /// Returns an account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` if no account has the code.
    pub fn account_by_code(&self, code: &str) -> Result<Account, LedgerError> {
        self.lock()?
            .account_by_code(code)
            .cloned()
            .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()))
    }

    /// Returns every account, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the state lock is poisoned.
    pub fn accounts(&self) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self.lock()?.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    /// Resolves the fixed account-code table against this chart.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccounts` if any required code has no active account.
    pub fn account_map(&self) -> Result<AccountMap, LedgerError> {
        let state = self.lock()?;
        AccountMap::from_accounts(state.accounts.values())
    }

    // ========== Journal entries ==========

    /// Creates a draft journal entry.
    ///
    /// The input is validated before a reference is allocated; a rejected
    /// entry consumes no reference and stores nothing.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the lines are malformed, unbalanced, or
    /// reference unknown or inactive accounts.
    pub fn create_journal_entry(
        &self,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.lock()?;
        let entry = self.build_entry(&state, input, actor)?;

        tracing::info!(
            entry_id = %entry.id,
            reference = %entry.reference,
            lines = entry.lines.len(),
            "journal entry created"
        );
        state.insert_entry(entry.clone());
        Ok(entry)
    }

    /// Posts a draft entry, applying every line to its account.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `CannotPost` if the entry is not a balanced
    /// draft, or `AccountInactive` if a line's account was deactivated.
    pub fn post_journal_entry(
        &self,
        id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.lock()?;
        let mut entry = state.entry(id)?.clone();

        let staged = self.post_staged(&state, &mut entry, actor)?;

        state.commit_accounts(staged);
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Voids a posted entry by applying the opposite of every line.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` or `CannotVoid` if the entry is not posted.
    pub fn void_journal_entry(
        &self,
        id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.lock()?;
        let mut entry = state.entry(id)?.clone();
        LedgerService::ensure_can_void(&entry)?;

        let mut staged = state.stage_accounts(&entry)?;
        LedgerService::apply_to_accounts(&entry, BalanceDirection::Void, &mut staged)?;
        LedgerService::mark_voided(&mut entry, actor, Utc::now());

        tracing::info!(entry_id = %entry.id, reference = %entry.reference, "journal entry voided");
        state.commit_accounts(staged);
        state.entries.insert(entry.id, entry.clone());
        Ok(entry)
    }

    /// Creates and posts an entry as one atomic step.
    ///
    /// This is the operation ledger-triggering workflows use.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Self::create_journal_entry`] or
    /// [`Self::post_journal_entry`]; on error nothing is stored.
    pub fn record(
        &self,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.lock()?;
        let mut entry = self.build_entry(&state, input, actor)?;
        tracing::info!(
            entry_id = %entry.id,
            reference = %entry.reference,
            lines = entry.lines.len(),
            "journal entry created"
        );

        let staged = self.post_staged(&state, &mut entry, actor)?;

        state.commit_accounts(staged);
        state.insert_entry(entry.clone());
        Ok(entry)
    }

    /// Returns an entry by id.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist.
    pub fn entry(&self, id: JournalEntryId) -> Result<JournalEntry, LedgerError> {
        self.lock()?.entry(id).cloned()
    }

    /// Returns every entry in creation (reference) order.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the state lock is poisoned.
    pub fn entries(&self) -> Result<Vec<JournalEntry>, LedgerError> {
        let state = self.lock()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.entries.get(id).cloned())
            .collect())
    }

    // ========== Reports ==========

    /// Trial balance over the active accounts.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the state lock is poisoned.
    pub fn trial_balance(&self) -> Result<TrialBalance, LedgerError> {
        let state = self.lock()?;
        Ok(ReportService::trial_balance(
            state.accounts.values(),
            self.settings.balance_tolerance,
        ))
    }

    /// Accounts whose cached balance differs from the sum of posted lines.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the state lock is poisoned.
    pub fn reconcile(&self) -> Result<Vec<BalanceDiscrepancy>, LedgerError> {
        let state = self.lock()?;
        Ok(ReportService::reconcile(
            state.accounts.values(),
            state.entries.values(),
        ))
    }

    // ========== Internals ==========

    fn build_entry(
        &self,
        state: &LedgerState,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, LedgerError> {
        LedgerService::validate_entry(&input, |id| state.accounts.get(&id))?;

        let reference = self
            .settings
            .reference_format
            .format(self.sequence.next_value());
        Ok(LedgerService::build_draft(input, reference, actor, Utc::now()))
    }

    fn post_staged(
        &self,
        state: &LedgerState,
        entry: &mut JournalEntry,
        actor: UserId,
    ) -> Result<BTreeMap<AccountId, Account>, LedgerError> {
        LedgerService::ensure_can_post(entry)?;

        let mut staged = state.stage_accounts(entry)?;
        LedgerService::apply_to_accounts(entry, BalanceDirection::Post, &mut staged)?;
        LedgerService::mark_posted(entry, actor, Utc::now());

        tracing::info!(entry_id = %entry.id, reference = %entry.reference, "journal entry posted");
        Ok(staged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountCategory, AccountCode, AccountType};
    use crate::ledger::types::{JournalEntryType, JournalLineInput, JournalStatus};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn seeded() -> Ledger {
        let ledger = Ledger::default();
        for code in AccountCode::ALL {
            ledger.open_account(code.seed()).unwrap();
        }
        ledger
    }

    fn input(lines: Vec<JournalLineInput>) -> CreateJournalEntryInput {
        CreateJournalEntryInput {
            transaction_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            entry_type: JournalEntryType::General,
            description: "test".to_string(),
            source: None,
            lines,
        }
    }

    fn cash_sale(ledger: &Ledger, amount: Decimal) -> CreateJournalEntryInput {
        let cash = ledger.account_by_code("1000").unwrap();
        let sales = ledger.account_by_code("4000").unwrap();
        input(vec![
            JournalLineInput::debit(cash.id, amount),
            JournalLineInput::credit(sales.id, amount),
        ])
    }

    #[test]
    fn test_cash_sale_post_and_void_scenario() {
        let ledger = seeded();
        let actor = UserId::new();

        let entry = ledger
            .create_journal_entry(cash_sale(&ledger, dec!(100)), actor)
            .unwrap();
        assert_eq!(entry.status, JournalStatus::Draft);
        assert_eq!(entry.reference.as_str(), "JE-000001");
        assert_eq!(ledger.account_by_code("1000").unwrap().balance, Decimal::ZERO);

        let posted = ledger.post_journal_entry(entry.id, actor).unwrap();
        assert_eq!(posted.status, JournalStatus::Posted);
        assert_eq!(posted.posted_by, Some(actor));
        assert!(posted.posted_at.is_some());
        assert_eq!(ledger.account_by_code("1000").unwrap().balance, dec!(100));
        assert_eq!(ledger.account_by_code("4000").unwrap().balance, dec!(100));

        let voided = ledger.void_journal_entry(entry.id, actor).unwrap();
        assert_eq!(voided.status, JournalStatus::Void);
        assert_eq!(ledger.account_by_code("1000").unwrap().balance, Decimal::ZERO);
        assert_eq!(ledger.account_by_code("4000").unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_unbalanced_entry_is_rejected_and_nothing_persists() {
        let ledger = seeded();
        let x = ledger.account_by_code("1000").unwrap();
        let y = ledger.account_by_code("4000").unwrap();

        let err = ledger
            .create_journal_entry(
                input(vec![
                    JournalLineInput::debit(x.id, dec!(100)),
                    JournalLineInput::credit(y.id, dec!(90)),
                ]),
                UserId::new(),
            )
            .unwrap_err();

        assert!(err.to_string().contains("not balanced"));
        assert!(ledger.entries().unwrap().is_empty());

        let next = ledger
            .create_journal_entry(cash_sale(&ledger, dec!(1)), UserId::new())
            .unwrap();
        assert_eq!(next.reference.as_str(), "JE-000001");
    }

    #[test]
    fn test_double_post_and_double_void_fail() {
        let ledger = seeded();
        let actor = UserId::new();
        let entry = ledger.record(cash_sale(&ledger, dec!(25)), actor).unwrap();

        assert!(matches!(
            ledger.post_journal_entry(entry.id, actor),
            Err(LedgerError::CannotPost { .. })
        ));
        assert_eq!(ledger.account_by_code("1000").unwrap().balance, dec!(25));

        ledger.void_journal_entry(entry.id, actor).unwrap();
        let err = ledger.void_journal_entry(entry.id, actor).unwrap_err();
        assert!(err.to_string().contains("only posted entries can be voided"));
        assert!(matches!(
            ledger.post_journal_entry(entry.id, actor),
            Err(LedgerError::CannotPost { .. })
        ));
        assert_eq!(ledger.account_by_code("1000").unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_void_draft_is_rejected() {
        let ledger = seeded();
        let entry = ledger
            .create_journal_entry(cash_sale(&ledger, dec!(5)), UserId::new())
            .unwrap();
        assert!(matches!(
            ledger.void_journal_entry(entry.id, UserId::new()),
            Err(LedgerError::CannotVoid { status: JournalStatus::Draft, .. })
        ));
    }

    #[test]
    fn test_unknown_entry() {
        let ledger = seeded();
        assert!(matches!(
            ledger.post_journal_entry(JournalEntryId::new(), UserId::new()),
            Err(LedgerError::EntryNotFound(_))
        ));
    }

    #[test]
    fn test_references_are_sequential() {
        let ledger = seeded();
        let refs: Vec<String> = (0..3)
            .map(|_| {
                ledger
                    .record(cash_sale(&ledger, dec!(1)), UserId::new())
                    .unwrap()
                    .reference
                    .to_string()
            })
            .collect();
        assert_eq!(refs, vec!["JE-000001", "JE-000002", "JE-000003"]);

        let listed: Vec<String> = ledger
            .entries()
            .unwrap()
            .into_iter()
            .map(|e| e.reference.to_string())
            .collect();
        assert_eq!(listed, refs);
    }

    #[test]
    fn test_fractional_cent_lines_cannot_drift_trial_balance() {
        let ledger = seeded();
        let cash = ledger.account_by_code("1000").unwrap();
        let sales = ledger.account_by_code("4000").unwrap();

        for _ in 0..2 {
            let result = ledger.record(
                input(vec![
                    JournalLineInput::debit(cash.id, dec!(1.005)),
                    JournalLineInput::credit(sales.id, dec!(1.000)),
                ]),
                UserId::new(),
            );
            assert!(matches!(
                result,
                Err(LedgerError::ExcessPrecision { index: 0, .. })
            ));
        }

        let trial_balance = ledger.trial_balance().unwrap();
        assert_eq!(trial_balance.total_debits, trial_balance.total_credits);
        assert!(trial_balance.is_balanced);
        assert!(ledger.entries().unwrap().is_empty());
    }

    #[test]
    fn test_half_cent_apart_lines_rejected_as_unbalanced() {
        let ledger = seeded();
        let cash = ledger.account_by_code("1000").unwrap();
        let sales = ledger.account_by_code("4000").unwrap();

        let result = ledger.record(
            input(vec![
                JournalLineInput::debit(cash.id, dec!(1.01)),
                JournalLineInput::credit(sales.id, dec!(1.00)),
            ]),
            UserId::new(),
        );
        assert!(matches!(result, Err(LedgerError::Unbalanced { .. })));
        assert_eq!(ledger.account_by_code("1000").unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_custom_reference_format() {
        let ledger = Ledger::new(LedgerSettings::from(&LedgerConfig {
            reference_prefix: "GL".to_string(),
            reference_width: 4,
            balance_tolerance: dec!(0.01),
        }));
        for code in AccountCode::ALL {
            ledger.open_account(code.seed()).unwrap();
        }
        let entry = ledger.record(cash_sale(&ledger, dec!(1)), UserId::new()).unwrap();
        assert_eq!(entry.reference.as_str(), "GL0001");
    }

    #[test]
    fn test_deactivated_account_rejects_new_lines() {
        let ledger = seeded();
        let cash = ledger.account_by_code("1000").unwrap();
        let draft = ledger
            .create_journal_entry(cash_sale(&ledger, dec!(10)), UserId::new())
            .unwrap();

        ledger.deactivate_account(cash.id).unwrap();

        assert!(matches!(
            ledger.create_journal_entry(cash_sale(&ledger, dec!(10)), UserId::new()),
            Err(LedgerError::AccountInactive(_))
        ));
        assert!(matches!(
            ledger.post_journal_entry(draft.id, UserId::new()),
            Err(LedgerError::AccountInactive(_))
        ));
        assert_eq!(ledger.entry(draft.id).unwrap().status, JournalStatus::Draft);
        assert!(matches!(ledger.account_map(), Err(LedgerError::MissingAccounts { .. })));
    }

    #[test]
    fn test_open_account_rules() {
        let ledger = seeded();
        assert!(matches!(
            ledger.open_account(AccountCode::Cash.seed()),
            Err(LedgerError::DuplicateAccountCode(code)) if code == "1000"
        ));

        let bank = ledger.account_by_code("1100").unwrap();
        let sub = ledger
            .open_account(NewAccount {
                code: "1101".to_string(),
                name: "Bank - Payroll".to_string(),
                account_type: AccountType::Asset,
                category: AccountCategory::CurrentAsset,
                parent_id: Some(bank.id),
            })
            .unwrap();
        assert_eq!(sub.parent_id, Some(bank.id));

        assert!(matches!(
            ledger.open_account(NewAccount {
                code: "2001".to_string(),
                name: "Misfiled".to_string(),
                account_type: AccountType::Liability,
                category: AccountCategory::CurrentLiability,
                parent_id: Some(bank.id),
            }),
            Err(LedgerError::InvalidParent { .. })
        ));
    }

    #[test]
    fn test_record_is_atomic_on_failure() {
        let ledger = seeded();
        let cash = ledger.account_by_code("1000").unwrap();
        let unknown = AccountId::new();

        assert!(matches!(
            ledger.record(
                input(vec![
                    JournalLineInput::debit(cash.id, dec!(10)),
                    JournalLineInput::credit(unknown, dec!(10)),
                ]),
                UserId::new(),
            ),
            Err(LedgerError::AccountNotFound(id)) if id == unknown
        ));
        assert!(ledger.entries().unwrap().is_empty());
        assert_eq!(ledger.account(cash.id).unwrap().balance, Decimal::ZERO);
    }

    #[test]
    fn test_concurrent_records_lose_no_updates() {
        let ledger = std::sync::Arc::new(seeded());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = std::sync::Arc::clone(&ledger);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let input = cash_sale(&ledger, dec!(1.25));
                        ledger.record(input, UserId::new()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.account_by_code("1000").unwrap().balance, dec!(500.00));
        assert_eq!(ledger.entries().unwrap().len(), 400);
        assert!(ledger.trial_balance().unwrap().is_balanced);
        assert!(ledger.reconcile().unwrap().is_empty());
    }
}
