//! Property-based tests for journal line validation.
//!
//! - Property 1: Line set validation rules
//! - Property 1.5: Amount precision
//! - Property 2: Posting precondition equivalence

use chrono::{NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, UserId};

use super::error::LedgerError;
use super::reference::EntryReference;
use super::service::LedgerService;
use super::types::{
    CreateJournalEntryInput, JournalEntryType, JournalLineInput, JournalStatus, LineType,
};
use super::validation::validate_lines;

/// Strategy to generate a valid positive amount (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a positive amount with fractional cents
/// (0.001 to 1,000.0009, never a whole number of cents).
fn sub_cent_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64)
        .prop_filter("must not be a whole number of cents", |units| units % 100 != 0)
        .prop_map(|units| Decimal::new(units, 4))
}

/// Strategy to generate a zero or negative amount.
fn non_positive_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

fn line_type_strategy() -> impl Strategy<Value = LineType> {
    prop_oneof![Just(LineType::Debit), Just(LineType::Credit)]
}

fn status_strategy() -> impl Strategy<Value = JournalStatus> {
    prop_oneof![
        Just(JournalStatus::Draft),
        Just(JournalStatus::Posted),
        Just(JournalStatus::Void),
    ]
}

/// Splits `amounts` into debit lines and one balancing credit line.
fn balanced_lines(amounts: &[Decimal]) -> Vec<JournalLineInput> {
    let total: Decimal = amounts.iter().copied().sum();
    let mut lines: Vec<JournalLineInput> = amounts
        .iter()
        .map(|&a| JournalLineInput::debit(AccountId::new(), a))
        .collect();
    lines.push(JournalLineInput::credit(AccountId::new(), total));
    lines
}

fn make_input(lines: Vec<JournalLineInput>) -> CreateJournalEntryInput {
    CreateJournalEntryInput {
        transaction_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        entry_type: JournalEntryType::General,
        description: "Test entry".to_string(),
        source: None,
        lines,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // =========================================================================
    // Property 1: Line set validation rules
    // =========================================================================

    /// **Property 1.1: Balanced line sets are accepted.**
    ///
    /// *For any* set of positive debits balanced by a single credit,
    /// validation SHALL succeed and report equal totals.
    #[test]
    fn prop_balanced_lines_accepted(
        amounts in prop::collection::vec(positive_amount(), 1..8),
    ) {
        let lines = balanced_lines(&amounts);
        let totals = validate_lines(&lines);
        prop_assert!(totals.is_ok());
        let totals = totals.unwrap();
        prop_assert_eq!(totals.debits, totals.credits);
    }

    /// **Property 1.2: Any imbalance of at least one cent is rejected.**
    #[test]
    fn prop_unbalanced_lines_rejected(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        skew in positive_amount(),
    ) {
        let mut lines = balanced_lines(&amounts);
        let last = lines.len() - 1;
        lines[last].amount += skew;

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::Unbalanced { .. })),
            "expected Unbalanced, got {:?}",
            result
        );
    }

    /// **Property 1.3: Non-positive amounts are rejected at their index.**
    #[test]
    fn prop_non_positive_amount_rejected(
        amounts in prop::collection::vec(positive_amount(), 2..8),
        bad in non_positive_amount(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut lines = balanced_lines(&amounts);
        let index = position.index(lines.len());
        lines[index].amount = bad;

        let result = validate_lines(&lines);
        prop_assert!(
            matches!(result, Err(LedgerError::NonPositiveAmount { index: i, .. }) if i == index),
            "expected NonPositiveAmount at {}, got {:?}",
            index,
            result
        );
    }

    /// **Property 1.4: Fewer than two lines are rejected whatever they hold.**
    #[test]
    fn prop_single_line_rejected(
        line_type in line_type_strategy(),
        amount in positive_amount(),
    ) {
        let lines = vec![JournalLineInput {
            account_id: AccountId::new(),
            line_type,
            amount,
            description: None,
        }];
        let rejected = matches!(
            validate_lines(&lines),
            Err(LedgerError::InsufficientLines { count: 1 })
        );
        prop_assert!(rejected, "a single line must be rejected");
    }

    /// **Property 1.5: Amounts finer than a cent are rejected at their index,
    /// even when the entry balances.**
    #[test]
    fn prop_sub_cent_amount_rejected(
        amounts in prop::collection::vec(positive_amount(), 1..8),
        fine in sub_cent_amount(),
        position in any::<prop::sample::Index>(),
    ) {
        let mut amounts = amounts;
        let index = position.index(amounts.len());
        amounts[index] = fine;
        let lines = balanced_lines(&amounts);

        let result = validate_lines(&lines);
        let rejected = matches!(
            result,
            Err(LedgerError::ExcessPrecision { index: i, .. }) if i == index
        );
        prop_assert!(rejected, "expected ExcessPrecision at {}, got {:?}", index, result);
    }

    // =========================================================================
    // Property 2: Posting precondition equivalence
    // =========================================================================

    /// **Property 2.1: `can_be_posted` holds exactly for balanced drafts
    /// with at least two lines.**
    #[test]
    fn prop_can_be_posted_equivalence(
        status in status_strategy(),
        lines in prop::collection::vec((line_type_strategy(), positive_amount()), 0..6),
    ) {
        let input = make_input(
            lines
                .iter()
                .map(|&(line_type, amount)| JournalLineInput {
                    account_id: AccountId::new(),
                    line_type,
                    amount,
                    description: None,
                })
                .collect(),
        );
        let mut entry = LedgerService::build_draft(
            input,
            EntryReference::from_string("JE-000001"),
            UserId::new(),
            Utc::now(),
        );
        entry.status = status;

        let debits: Decimal = lines.iter().filter(|l| l.0 == LineType::Debit).map(|l| l.1).sum();
        let credits: Decimal = lines.iter().filter(|l| l.0 == LineType::Credit).map(|l| l.1).sum();
        let expected = status == JournalStatus::Draft
            && lines.len() >= 2
            && debits == credits;

        prop_assert_eq!(entry.can_be_posted(), expected);
        prop_assert_eq!(entry.is_balanced(), debits == credits);
        prop_assert_eq!(LedgerService::ensure_can_post(&entry).is_ok(), expected);
    }
}
