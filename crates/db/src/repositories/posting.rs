//! Posting repository: ledger-triggering workflows against Postgres.
//!
//! Each workflow runs in one database transaction: stock changes, new lots
//! and the journal entry commit together or not at all.

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use tally_core::inventory::{InventoryError, InventoryService, StockLot};
use tally_core::ledger::{JournalEntry, LedgerSettings, SourceRef};
use tally_core::postings::{
    ExpenseRecorded, GoodsReceived, OrderInvoiced, PaymentReceived, PostingBuilder,
    ProductionCompleted, ProductionCostCaptured, SupplierPaid,
};
use tally_shared::types::UserId;

use super::account::AccountRepository;
use super::error::RepositoryError;
use super::inventory::{insert_lot, lock_items, save_item};
use super::journal::JournalRepository;

/// Runs ledger-triggering workflows in Postgres.
#[derive(Debug, Clone)]
pub struct PostingRepository {
    db: DatabaseConnection,
    journal: JournalRepository,
    builder: PostingBuilder,
}

impl PostingRepository {
    /// Resolves the account-code table and binds the workflows to `db`.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccounts` if the chart lacks any required account.
    pub async fn new(
        db: DatabaseConnection,
        settings: LedgerSettings,
    ) -> Result<Self, RepositoryError> {
        let accounts = AccountRepository::new(db.clone()).account_map().await?;
        Ok(Self {
            journal: JournalRepository::new(db.clone(), settings),
            builder: PostingBuilder::new(accounts),
            db,
        })
    }

    /// Records an invoiced order.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error or a database error.
    pub async fn invoice_order(
        &self,
        event: &OrderInvoiced,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        self.journal.record(self.builder.order_invoiced(event), actor).await
    }

    /// Records a customer payment.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error or a database error.
    pub async fn receive_payment(
        &self,
        event: &PaymentReceived,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        self.journal.record(self.builder.payment_received(event), actor).await
    }

    /// Receives goods: updates average costs, stores lots, and posts the
    /// receipt.
    ///
    /// # Errors
    ///
    /// Returns an inventory or ledger error, or a database error. Nothing
    /// changes on error.
    pub async fn receive_goods(
        &self,
        event: &GoodsReceived,
        actor: UserId,
    ) -> Result<(JournalEntry, Vec<StockLot>), RepositoryError> {
        let txn = self.db.begin().await?;
        let mut items = lock_items(&txn, event.lines.iter().map(|l| l.item_id)).await?;

        let mut lots = Vec::with_capacity(event.lines.len());
        for line in &event.lines {
            let item = items
                .get_mut(&line.item_id)
                .ok_or(InventoryError::ItemNotFound(line.item_id))?;
            lots.push(InventoryService::receive(
                item,
                line.quantity,
                line.unit_cost,
                line.lot_number.clone(),
                event.date,
                Some(SourceRef::PurchaseOrder(event.purchase_order_id)),
            )?);
        }

        let entry = self
            .journal
            .record_in(&txn, self.builder.goods_received(event), actor)
            .await?;

        for item in items.values() {
            save_item(&txn, item).await?;
        }
        for lot in &lots {
            insert_lot(&txn, lot).await?;
        }

        txn.commit().await?;
        Ok((entry, lots))
    }

    /// Records a payment to a supplier.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error or a database error.
    pub async fn pay_supplier(
        &self,
        event: &SupplierPaid,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        self.journal.record(self.builder.supplier_paid(event), actor).await
    }

    /// Issues materials at average cost and posts materials and labor.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` or another inventory error, the ledger's
    /// validation error, or a database error. Nothing changes on error.
    pub async fn capture_production_cost(
        &self,
        event: &ProductionCostCaptured,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut items = lock_items(&txn, event.materials.iter().map(|m| m.item_id)).await?;

        let mut materials_cost = Decimal::ZERO;
        for usage in &event.materials {
            let item = items
                .get_mut(&usage.item_id)
                .ok_or(InventoryError::ItemNotFound(usage.item_id))?;
            materials_cost += InventoryService::issue(item, usage.quantity)?;
        }

        let input = self.builder.production_cost_captured(
            event.job_id,
            &event.job_number,
            event.date,
            materials_cost,
            event.labor_cost,
        );
        let entry = self.journal.record_in(&txn, input, actor).await?;

        for item in items.values() {
            save_item(&txn, item).await?;
        }

        txn.commit().await?;
        tracing::info!(
            job = %event.job_number,
            %materials_cost,
            labor_cost = %event.labor_cost,
            reference = %entry.reference,
            "production cost captured"
        );
        Ok(entry)
    }

    /// Moves a finished job's costs into finished goods.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error or a database error.
    pub async fn complete_production(
        &self,
        event: &ProductionCompleted,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        self.journal.record(self.builder.production_completed(event), actor).await
    }

    /// Records an operating expense.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error or a database error.
    pub async fn record_expense(
        &self,
        event: &ExpenseRecorded,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        self.journal.record(self.builder.expense_recorded(event), actor).await
    }
}
