//! The fixed account-code table used by ledger-triggering workflows.
//!
//! Every collaborator posts against these codes. They are resolved to
//! account ids once, through [`AccountMap::resolve`], and a missing code is
//! a configuration error rather than a per-request failure.

use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use super::types::{Account, AccountCategory, AccountType, NewAccount};
use crate::ledger::LedgerError;

/// Accounts the workflows post against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCode {
    /// 1000 Cash.
    Cash,
    /// 1100 Bank.
    Bank,
    /// 1200 Accounts Receivable.
    AccountsReceivable,
    /// 1300 Raw-Materials Inventory.
    RawMaterialsInventory,
    /// 1310 Finished-Goods Inventory.
    FinishedGoodsInventory,
    /// 2000 Accounts Payable.
    AccountsPayable,
    /// 3000 Owner's Equity.
    OwnersEquity,
    /// 4000 Sales Revenue.
    SalesRevenue,
    /// 5100 Raw Materials Used.
    RawMaterialsUsed,
    /// 5200 Direct Labor.
    DirectLabor,
    /// 6800 Utilities.
    Utilities,
    /// 6810 Rent.
    Rent,
    /// 6820 Maintenance.
    Maintenance,
    /// 6830 Office Supplies.
    OfficeSupplies,
    /// 6840 Shipping.
    Shipping,
    /// 6890 Other Expenses.
    OtherExpenses,
}

impl AccountCode {
    /// Number of codes in the table.
    pub const COUNT: usize = 16;

    /// Every code, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Cash,
        Self::Bank,
        Self::AccountsReceivable,
        Self::RawMaterialsInventory,
        Self::FinishedGoodsInventory,
        Self::AccountsPayable,
        Self::OwnersEquity,
        Self::SalesRevenue,
        Self::RawMaterialsUsed,
        Self::DirectLabor,
        Self::Utilities,
        Self::Rent,
        Self::Maintenance,
        Self::OfficeSupplies,
        Self::Shipping,
        Self::OtherExpenses,
    ];

    /// The account code as stored in the chart.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Cash => "1000",
            Self::Bank => "1100",
            Self::AccountsReceivable => "1200",
            Self::RawMaterialsInventory => "1300",
            Self::FinishedGoodsInventory => "1310",
            Self::AccountsPayable => "2000",
            Self::OwnersEquity => "3000",
            Self::SalesRevenue => "4000",
            Self::RawMaterialsUsed => "5100",
            Self::DirectLabor => "5200",
            Self::Utilities => "6800",
            Self::Rent => "6810",
            Self::Maintenance => "6820",
            Self::OfficeSupplies => "6830",
            Self::Shipping => "6840",
            Self::OtherExpenses => "6890",
        }
    }

    /// Default display name used when seeding.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Bank => "Bank",
            Self::AccountsReceivable => "Accounts Receivable",
            Self::RawMaterialsInventory => "Raw Materials Inventory",
            Self::FinishedGoodsInventory => "Finished Goods Inventory",
            Self::AccountsPayable => "Accounts Payable",
            Self::OwnersEquity => "Owner's Equity",
            Self::SalesRevenue => "Sales Revenue",
            Self::RawMaterialsUsed => "Raw Materials Used",
            Self::DirectLabor => "Direct Labor",
            Self::Utilities => "Utilities",
            Self::Rent => "Rent",
            Self::Maintenance => "Maintenance",
            Self::OfficeSupplies => "Office Supplies",
            Self::Shipping => "Shipping",
            Self::OtherExpenses => "Other Expenses",
        }
    }

    /// Account type the code must be seeded with.
    #[must_use]
    pub const fn account_type(self) -> AccountType {
        match self {
            Self::Cash
            | Self::Bank
            | Self::AccountsReceivable
            | Self::RawMaterialsInventory
            | Self::FinishedGoodsInventory => AccountType::Asset,
            Self::AccountsPayable => AccountType::Liability,
            Self::OwnersEquity => AccountType::Equity,
            Self::SalesRevenue => AccountType::Revenue,
            Self::RawMaterialsUsed
            | Self::DirectLabor
            | Self::Utilities
            | Self::Rent
            | Self::Maintenance
            | Self::OfficeSupplies
            | Self::Shipping
            | Self::OtherExpenses => AccountType::Expense,
        }
    }

    /// Reporting category the code is seeded with.
    #[must_use]
    pub const fn category(self) -> AccountCategory {
        match self {
            Self::Cash | Self::Bank | Self::AccountsReceivable => AccountCategory::CurrentAsset,
            Self::RawMaterialsInventory | Self::FinishedGoodsInventory => {
                AccountCategory::Inventory
            }
            Self::AccountsPayable => AccountCategory::CurrentLiability,
            Self::OwnersEquity => AccountCategory::OwnersEquity,
            Self::SalesRevenue => AccountCategory::OperatingRevenue,
            Self::RawMaterialsUsed | Self::DirectLabor => AccountCategory::CostOfGoodsSold,
            Self::Utilities
            | Self::Rent
            | Self::Maintenance
            | Self::OfficeSupplies
            | Self::Shipping => AccountCategory::OperatingExpense,
            Self::OtherExpenses => AccountCategory::OtherExpense,
        }
    }

    /// Looks a code up by its chart string.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Seed definition for this code.
    #[must_use]
    pub fn seed(self) -> NewAccount {
        NewAccount {
            code: self.code().to_string(),
            name: self.name().to_string(),
            account_type: self.account_type(),
            category: self.category(),
            parent_id: None,
        }
    }
}

/// Where money is paid from or deposited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashAccount {
    /// Cash on hand (1000).
    Cash,
    /// Bank account (1100).
    Bank,
}

impl CashAccount {
    /// The account code backing this option.
    #[must_use]
    pub const fn account_code(self) -> AccountCode {
        match self {
            Self::Cash => AccountCode::Cash,
            Self::Bank => AccountCode::Bank,
        }
    }
}

/// Operating expense categories (the 68xx accounts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// 6800.
    Utilities,
    /// 6810.
    Rent,
    /// 6820.
    Maintenance,
    /// 6830.
    OfficeSupplies,
    /// 6840.
    Shipping,
    /// 6890.
    Other,
}

impl ExpenseCategory {
    /// The account code backing this category.
    #[must_use]
    pub const fn account_code(self) -> AccountCode {
        match self {
            Self::Utilities => AccountCode::Utilities,
            Self::Rent => AccountCode::Rent,
            Self::Maintenance => AccountCode::Maintenance,
            Self::OfficeSupplies => AccountCode::OfficeSupplies,
            Self::Shipping => AccountCode::Shipping,
            Self::Other => AccountCode::OtherExpenses,
        }
    }
}

/// Resolved account ids for every [`AccountCode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountMap {
    ids: [AccountId; AccountCode::COUNT],
}

impl AccountMap {
    /// Resolves every code through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingAccounts` listing every code `lookup`
    /// could not resolve.
    pub fn resolve<F>(mut lookup: F) -> Result<Self, LedgerError>
    where
        F: FnMut(&str) -> Option<AccountId>,
    {
        let mut ids = [AccountId::from_uuid(uuid::Uuid::nil()); AccountCode::COUNT];
        let mut missing = Vec::new();

        for (slot, code) in ids.iter_mut().zip(AccountCode::ALL) {
            match lookup(code.code()) {
                Some(id) => *slot = id,
                None => missing.push(code.code().to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self { ids })
        } else {
            tracing::error!(codes = ?missing, "required accounts not found");
            Err(LedgerError::MissingAccounts { codes: missing })
        }
    }

    /// Resolves against a set of active accounts.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingAccounts` if any code has no active account.
    pub fn from_accounts<'a, I>(accounts: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = &'a Account>,
    {
        let active: Vec<&Account> = accounts.into_iter().filter(|a| a.is_active).collect();
        Self::resolve(|code| active.iter().find(|a| a.code == code).map(|a| a.id))
    }

    /// Returns the account id for `code`.
    #[must_use]
    pub const fn id(&self, code: AccountCode) -> AccountId {
        self.ids[code as usize]
    }
}
