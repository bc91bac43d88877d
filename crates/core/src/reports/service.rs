//! Report generation service.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, within_tolerance};

use super::types::{BalanceDiscrepancy, TrialBalance, TrialBalanceLine};
use crate::accounts::Account;
use crate::ledger::{JournalEntry, JournalStatus};

/// Service for generating ledger reports.
pub struct ReportService;

impl ReportService {
    /// Generates a trial balance from cached account balances.
    ///
    /// Only active accounts with a non-zero balance appear. A positive
    /// balance goes to the account's natural column; a negative one goes to
    /// the opposite column as its absolute value.
    #[must_use]
    pub fn trial_balance<'a, I>(accounts: I, tolerance: Decimal) -> TrialBalance
    where
        I: IntoIterator<Item = &'a Account>,
    {
        let mut accounts: Vec<&Account> = accounts
            .into_iter()
            .filter(|a| a.is_active && !a.balance.is_zero())
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));

        let mut debits = Vec::new();
        let mut credits = Vec::new();

        for account in accounts {
            let line = TrialBalanceLine {
                account_id: account.id,
                code: account.code.clone(),
                name: account.name.clone(),
                amount: account.balance.abs(),
            };
            let natural_side = account.balance > Decimal::ZERO;
            if natural_side == account.is_debit_account() {
                debits.push(line);
            } else {
                credits.push(line);
            }
        }

        let total_debits: Decimal = debits.iter().map(|l| l.amount).sum();
        let total_credits: Decimal = credits.iter().map(|l| l.amount).sum();

        TrialBalance {
            debits,
            credits,
            total_debits,
            total_credits,
            is_balanced: within_tolerance(total_debits, total_credits, tolerance),
        }
    }

    /// Recomputes every account's balance from posted lines.
    ///
    /// Drafts never touched a balance and a voided entry nets to zero, so
    /// only entries currently `Posted` contribute.
    #[must_use]
    pub fn derive_balances<'a, 'b, A, E>(accounts: A, entries: E) -> HashMap<AccountId, Decimal>
    where
        A: IntoIterator<Item = &'a Account>,
        E: IntoIterator<Item = &'b JournalEntry>,
    {
        let accounts: HashMap<AccountId, &Account> =
            accounts.into_iter().map(|a| (a.id, a)).collect();
        let mut balances: HashMap<AccountId, Decimal> =
            accounts.keys().map(|&id| (id, Decimal::ZERO)).collect();

        for entry in entries
            .into_iter()
            .filter(|e| e.status == JournalStatus::Posted)
        {
            for line in &entry.lines {
                if let Some(account) = accounts.get(&line.account_id) {
                    *balances.entry(line.account_id).or_default() +=
                        account.balance_change(line.line_type, line.amount);
                }
            }
        }

        balances
    }

    /// Lists accounts whose cached balance differs from the derived one,
    /// ordered by account code.
    #[must_use]
    pub fn reconcile<'a, 'b, A, E>(accounts: A, entries: E) -> Vec<BalanceDiscrepancy>
    where
        A: IntoIterator<Item = &'a Account>,
        E: IntoIterator<Item = &'b JournalEntry>,
    {
        let accounts: Vec<&Account> = accounts.into_iter().collect();
        let derived = Self::derive_balances(accounts.iter().copied(), entries);

        let mut discrepancies: Vec<BalanceDiscrepancy> = accounts
            .into_iter()
            .filter_map(|account| {
                let derived = derived.get(&account.id).copied().unwrap_or_default();
                (derived != account.balance).then(|| BalanceDiscrepancy {
                    account_id: account.id,
                    code: account.code.clone(),
                    cached: account.balance,
                    derived,
                })
            })
            .collect();
        discrepancies.sort_by(|a, b| a.code.cmp(&b.code));

        if !discrepancies.is_empty() {
            tracing::warn!(count = discrepancies.len(), "cached balances disagree with posted lines");
        }
        discrepancies
    }
}
