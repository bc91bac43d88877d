//! Parent/child rules for the chart of accounts.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tally_shared::types::AccountId;

use super::types::Account;
use crate::ledger::LedgerError;

/// Checks that `parent` may hold `child`.
///
/// A parent must be a different account of the same type.
///
/// # Errors
///
/// Returns `LedgerError::InvalidParent` when the rule is broken.
pub fn validate_parent(child: &Account, parent: &Account) -> Result<(), LedgerError> {
    if child.id == parent.id {
        return Err(LedgerError::InvalidParent {
            account_id: child.id,
            parent_id: parent.id,
            reason: "an account cannot be its own parent",
        });
    }
    if child.account_type != parent.account_type {
        return Err(LedgerError::InvalidParent {
            account_id: child.id,
            parent_id: parent.id,
            reason: "parent must have the same account type",
        });
    }
    Ok(())
}

/// Sums the balance of `root` and every account below it.
#[must_use]
pub fn rollup_balance(accounts: &HashMap<AccountId, Account>, root: AccountId) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut stack = vec![root];
    let mut visited = Vec::new();

    while let Some(id) = stack.pop() {
        if visited.contains(&id) {
            continue;
        }
        visited.push(id);
        if let Some(account) = accounts.get(&id) {
            total += account.balance;
        }
        stack.extend(
            accounts
                .values()
                .filter(|a| a.parent_id == Some(id))
                .map(|a| a.id),
        );
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{AccountCategory, AccountType, NewAccount};
    use rust_decimal_macros::dec;

    fn account(code: &str, account_type: AccountType, parent_id: Option<AccountId>) -> Account {
        Account::open(NewAccount {
            code: code.to_string(),
            name: code.to_string(),
            account_type,
            category: AccountCategory::CurrentAsset,
            parent_id,
        })
    }

    #[test]
    fn test_same_type_parent_is_valid() {
        let parent = account("1000", AccountType::Asset, None);
        let child = account("1010", AccountType::Asset, Some(parent.id));
        assert!(validate_parent(&child, &parent).is_ok());
    }

    #[test]
    fn test_different_type_parent_is_rejected() {
        let parent = account("2000", AccountType::Liability, None);
        let child = account("1010", AccountType::Asset, Some(parent.id));
        assert!(matches!(
            validate_parent(&child, &parent),
            Err(LedgerError::InvalidParent { .. })
        ));
    }

    #[test]
    fn test_self_parent_is_rejected() {
        let account = account("1000", AccountType::Asset, None);
        assert!(matches!(
            validate_parent(&account, &account),
            Err(LedgerError::InvalidParent { .. })
        ));
    }

    #[test]
    fn test_rollup_balance_includes_descendants() {
        let mut root = account("1000", AccountType::Asset, None);
        root.balance = dec!(10);
        let mut child = account("1010", AccountType::Asset, Some(root.id));
        child.balance = dec!(5);
        let mut grandchild = account("1011", AccountType::Asset, Some(child.id));
        grandchild.balance = dec!(2.50);
        let mut unrelated = account("1100", AccountType::Asset, None);
        unrelated.balance = dec!(1000);

        let root_id = root.id;
        let child_id = child.id;
        let accounts: HashMap<AccountId, Account> = [root, child, grandchild, unrelated]
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        assert_eq!(rollup_balance(&accounts, root_id), dec!(17.50));
        assert_eq!(rollup_balance(&accounts, child_id), dec!(7.50));
    }
}
