//! Report repository: trial balance and balance reconciliation.

use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tally_core::ledger::LedgerSettings;
use tally_core::reports::{BalanceDiscrepancy, ReportService, TrialBalance};

use super::account::AccountRepository;
use super::error::RepositoryError;
use super::journal::JournalRepository;

/// Report repository over the stored ledger.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    accounts: AccountRepository,
    journal: JournalRepository,
    tolerance: Decimal,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        let tolerance = settings.balance_tolerance;
        Self {
            accounts: AccountRepository::new(db.clone()),
            journal: JournalRepository::new(db, settings),
            tolerance,
        }
    }

    /// Builds the trial balance from cached account balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(&self) -> Result<TrialBalance, RepositoryError> {
        let accounts = self.accounts.list().await?;
        Ok(ReportService::trial_balance(&accounts, self.tolerance))
    }

    /// Compares cached balances with balances derived from posted entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a record is corrupt.
    pub async fn reconcile(&self) -> Result<Vec<BalanceDiscrepancy>, RepositoryError> {
        let accounts = self.accounts.list().await?;
        let entries = self.journal.posted_entries().await?;
        Ok(ReportService::reconcile(&accounts, &entries))
    }
}
