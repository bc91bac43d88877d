//! Property-based tests for the in-memory ledger.
//!
//! - Property 3: Posted entries are balanced
//! - Property 4: Void round trip restores balances
//! - Property 5: Trial balance holds after any interleaving
//! - Property 6: Fractional-cent input never reaches the balances

use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::sample::Index;
use rust_decimal::Decimal;
use tally_shared::types::{AccountId, UserId};

use super::engine::Ledger;
use super::types::{CreateJournalEntryInput, JournalEntryType, JournalLineInput, JournalStatus};
use crate::accounts::{Account, AccountCode};

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts with four decimal places, whole cents included.
fn fine_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|units| Decimal::new(units, 4))
}

/// One step against the ledger.
#[derive(Debug, Clone)]
enum Op {
    Create {
        debit: Index,
        credit: Index,
        amounts: Vec<Decimal>,
    },
    Record {
        debit: Index,
        credit: Index,
        amount: Decimal,
    },
    Post(Index),
    Void(Index),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (
            any::<Index>(),
            any::<Index>(),
            prop::collection::vec(positive_amount(), 1..4)
        )
            .prop_map(|(debit, credit, amounts)| Op::Create {
                debit,
                credit,
                amounts,
            }),
        (any::<Index>(), any::<Index>(), positive_amount()).prop_map(
            |(debit, credit, amount)| Op::Record {
                debit,
                credit,
                amount,
            }
        ),
        any::<Index>().prop_map(Op::Post),
        any::<Index>().prop_map(Op::Void),
    ]
}

fn seeded() -> (Ledger, Vec<Account>) {
    let ledger = Ledger::default();
    let accounts = AccountCode::ALL
        .into_iter()
        .map(|code| ledger.open_account(code.seed()).unwrap())
        .collect();
    (ledger, accounts)
}

/// Several debit lines on one account balanced by a credit on another.
fn split_input(debit: AccountId, credit: AccountId, amounts: &[Decimal]) -> CreateJournalEntryInput {
    let total: Decimal = amounts.iter().copied().sum();
    let mut lines: Vec<JournalLineInput> = amounts
        .iter()
        .map(|&a| JournalLineInput::debit(debit, a))
        .collect();
    lines.push(JournalLineInput::credit(credit, total));
    CreateJournalEntryInput {
        transaction_date: NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        entry_type: JournalEntryType::General,
        description: "generated".to_string(),
        source: None,
        lines,
    }
}

fn apply(ledger: &Ledger, accounts: &[Account], op: &Op) {
    let actor = UserId::new();
    match op {
        Op::Create { debit, credit, amounts } => {
            let input = split_input(
                accounts[debit.index(accounts.len())].id,
                accounts[credit.index(accounts.len())].id,
                amounts,
            );
            ledger.create_journal_entry(input, actor).unwrap();
        }
        Op::Record { debit, credit, amount } => {
            let input = split_input(
                accounts[debit.index(accounts.len())].id,
                accounts[credit.index(accounts.len())].id,
                &[*amount],
            );
            ledger.record(input, actor).unwrap();
        }
        Op::Post(index) | Op::Void(index) => {
            let entries = ledger.entries().unwrap();
            if entries.is_empty() {
                return;
            }
            let entry = &entries[index.index(entries.len())];
            // State errors are expected here; they must leave balances untouched.
            let _ = if matches!(op, Op::Post(_)) {
                ledger.post_journal_entry(entry.id, actor)
            } else {
                ledger.void_journal_entry(entry.id, actor)
            };
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 3.1: Every posted entry is balanced.**
    #[test]
    fn prop_posted_entries_are_balanced(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let (ledger, accounts) = seeded();
        for op in &ops {
            apply(&ledger, &accounts, op);
        }

        for entry in ledger.entries().unwrap() {
            if entry.status == JournalStatus::Posted {
                let totals = entry.totals();
                prop_assert_eq!(totals.debits, totals.credits);
                prop_assert!(entry.lines.len() >= 2);
            }
        }
    }

    /// **Property 4.1: Voiding a posted entry restores every touched
    /// account to its pre-post balance.**
    #[test]
    fn prop_void_round_trip(
        prelude in prop::collection::vec(op_strategy(), 0..10),
        debit in any::<Index>(),
        credit in any::<Index>(),
        amounts in prop::collection::vec(positive_amount(), 1..4),
    ) {
        let (ledger, accounts) = seeded();
        for op in &prelude {
            apply(&ledger, &accounts, op);
        }

        let before: Vec<Decimal> = ledger.accounts().unwrap().iter().map(|a| a.balance).collect();
        let input = split_input(
            accounts[debit.index(accounts.len())].id,
            accounts[credit.index(accounts.len())].id,
            &amounts,
        );
        let entry = ledger.record(input, UserId::new()).unwrap();
        ledger.void_journal_entry(entry.id, UserId::new()).unwrap();
        let after: Vec<Decimal> = ledger.accounts().unwrap().iter().map(|a| a.balance).collect();

        prop_assert_eq!(before, after);
    }

    /// **Property 4.2: A second post or void never changes balances.**
    #[test]
    fn prop_repeated_transitions_are_rejected(
        debit in any::<Index>(),
        credit in any::<Index>(),
        amount in positive_amount(),
    ) {
        let (ledger, accounts) = seeded();
        let input = split_input(
            accounts[debit.index(accounts.len())].id,
            accounts[credit.index(accounts.len())].id,
            &[amount],
        );
        let entry = ledger.record(input, UserId::new()).unwrap();
        let posted: Vec<Decimal> = ledger.accounts().unwrap().iter().map(|a| a.balance).collect();

        prop_assert!(ledger.post_journal_entry(entry.id, UserId::new()).is_err());
        let after_repost: Vec<Decimal> = ledger.accounts().unwrap().iter().map(|a| a.balance).collect();
        prop_assert_eq!(&posted, &after_repost);

        ledger.void_journal_entry(entry.id, UserId::new()).unwrap();
        let voided: Vec<Decimal> = ledger.accounts().unwrap().iter().map(|a| a.balance).collect();
        prop_assert!(ledger.void_journal_entry(entry.id, UserId::new()).is_err());
        let after_revoid: Vec<Decimal> = ledger.accounts().unwrap().iter().map(|a| a.balance).collect();
        prop_assert_eq!(voided, after_revoid);
    }

    /// **Property 5.1: The trial balance is balanced after any interleaving
    /// of creates, posts and voids, and cached balances always match the
    /// balances derived from posted lines.**
    #[test]
    fn prop_trial_balance_invariant(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (ledger, accounts) = seeded();
        for op in &ops {
            apply(&ledger, &accounts, op);
            let trial_balance = ledger.trial_balance().unwrap();
            prop_assert!(
                trial_balance.is_balanced,
                "debits {} != credits {} after {:?}",
                trial_balance.total_debits,
                trial_balance.total_credits,
                op
            );
            prop_assert!(ledger.reconcile().unwrap().is_empty());
        }
    }

    /// **Property 6.1: Lines finer than a cent are rejected, so repeated
    /// postings that each look balanced within a cent cannot drift the
    /// trial balance apart.**
    #[test]
    fn prop_fractional_cents_never_drift(
        attempts in prop::collection::vec(
            (any::<Index>(), any::<Index>(), fine_amount(), 0i64..100i64),
            1..30,
        ),
    ) {
        let (ledger, accounts) = seeded();
        for (debit, credit, amount, skew) in &attempts {
            let debit_id = accounts[debit.index(accounts.len())].id;
            let credit_id = accounts[credit.index(accounts.len())].id;
            let credit_amount = *amount + Decimal::new(*skew, 4);
            let input = CreateJournalEntryInput {
                lines: vec![
                    JournalLineInput::debit(debit_id, *amount),
                    JournalLineInput::credit(credit_id, credit_amount),
                ],
                ..split_input(debit_id, credit_id, &[*amount])
            };

            let accepted = ledger.record(input, UserId::new()).is_ok();
            let whole_cents = amount.round_dp(2) == *amount;
            prop_assert_eq!(accepted, whole_cents && *skew == 0);

            let trial_balance = ledger.trial_balance().unwrap();
            prop_assert_eq!(trial_balance.total_debits, trial_balance.total_credits);
            prop_assert!(ledger.reconcile().unwrap().is_empty());
        }
    }
}
