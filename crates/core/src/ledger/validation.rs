//! Business rule validation for journal entries.
//!
//! Everything here runs before a reference number is allocated or any row is
//! written, so a rejected entry leaves no trace.

use rust_decimal::Decimal;
use tally_shared::types::{AccountId, MONEY_SCALE, round_money};

use super::error::LedgerError;
use super::types::{EntryTotals, JournalLineInput};
use crate::accounts::Account;

/// Validates the shape of a line set.
///
/// Checks, in order: at least two lines, every amount strictly positive,
/// no amount finer than [`MONEY_SCALE`] decimal places, debits exactly equal
/// to credits. Amounts are stored at that scale, so an entry that passes here
/// still balances once persisted.
///
/// # Errors
///
/// Returns the first rule that fails.
pub fn validate_lines(lines: &[JournalLineInput]) -> Result<EntryTotals, LedgerError> {
    if lines.len() < 2 {
        return Err(LedgerError::InsufficientLines { count: lines.len() });
    }

    if let Some((index, line)) = lines
        .iter()
        .enumerate()
        .find(|(_, l)| l.amount <= Decimal::ZERO)
    {
        return Err(LedgerError::NonPositiveAmount {
            index,
            amount: line.amount,
        });
    }

    if let Some((index, line)) = lines
        .iter()
        .enumerate()
        .find(|(_, l)| round_money(l.amount) != l.amount)
    {
        return Err(LedgerError::ExcessPrecision {
            index,
            amount: line.amount,
            scale: MONEY_SCALE,
        });
    }

    let totals = EntryTotals::from_lines(lines.iter().map(|l| (l.line_type, l.amount)));
    if !totals.is_balanced() {
        return Err(LedgerError::Unbalanced {
            debits: totals.debits,
            credits: totals.credits,
        });
    }

    Ok(totals)
}

/// Validates that every line references an existing, active account.
///
/// # Errors
///
/// Returns `AccountNotFound` or `AccountInactive` for the first bad line.
pub fn validate_accounts<'a, F>(lines: &[JournalLineInput], lookup: F) -> Result<(), LedgerError>
where
    F: Fn(AccountId) -> Option<&'a Account>,
{
    for line in lines {
        let account = lookup(line.account_id).ok_or(LedgerError::AccountNotFound(line.account_id))?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(account.id));
        }
    }
    Ok(())
}
