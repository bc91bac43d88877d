//! In-memory posting workflow.
//!
//! [`PostingWorkflow`] is the collaborator-facing surface: it turns events
//! into entries, records them on a [`Ledger`], and keeps inventory costing in
//! step. Item changes are made on copies and written back only after the
//! ledger accepted the entry, so a rejected posting leaves stock untouched.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use rust_decimal::Decimal;
use tally_shared::types::{InventoryItemId, UserId};

use super::builder::PostingBuilder;
use super::error::PostingError;
use super::events::{
    ExpenseRecorded, GoodsReceived, OrderInvoiced, PaymentReceived, ProductionCompleted,
    ProductionCostCaptured, SupplierPaid,
};
use crate::inventory::{InventoryError, InventoryItem, InventoryService, StockLot};
use crate::ledger::{JournalEntry, Ledger, LedgerError, SourceRef};

#[derive(Debug, Default)]
struct InventoryState {
    items: HashMap<InventoryItemId, InventoryItem>,
    lots: Vec<StockLot>,
}

impl InventoryState {
    fn staged_item(
        &self,
        staged: &mut HashMap<InventoryItemId, InventoryItem>,
        id: InventoryItemId,
    ) -> Result<(), InventoryError> {
        if !staged.contains_key(&id) {
            let item = self.items.get(&id).ok_or(InventoryError::ItemNotFound(id))?;
            staged.insert(id, item.clone());
        }
        Ok(())
    }
}

/// Runs ledger-triggering workflows against an in-memory ledger.
#[derive(Debug)]
pub struct PostingWorkflow {
    ledger: Arc<Ledger>,
    builder: PostingBuilder,
    inventory: Mutex<InventoryState>,
}

impl PostingWorkflow {
    /// Binds the workflow to `ledger`, resolving the account-code table.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::MissingAccounts` if the chart lacks any
    /// required account. Nothing can be posted until it is seeded.
    pub fn new(ledger: Arc<Ledger>) -> Result<Self, PostingError> {
        let accounts = ledger.account_map()?;
        Ok(Self {
            ledger,
            builder: PostingBuilder::new(accounts),
            inventory: Mutex::new(InventoryState::default()),
        })
    }

    /// The ledger postings go to.
    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn lock(&self) -> Result<MutexGuard<'_, InventoryState>, PostingError> {
        self.inventory
            .lock()
            .map_err(|_| LedgerError::Internal("inventory state lock poisoned".to_string()).into())
    }

    // ========== Inventory ==========

    /// Registers an item.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSku` if the SKU is taken.
    pub fn add_item(&self, item: InventoryItem) -> Result<InventoryItem, PostingError> {
        let mut state = self.lock()?;
        if state.items.values().any(|i| i.sku == item.sku) {
            return Err(InventoryError::DuplicateSku(item.sku).into());
        }
        state.items.insert(item.id, item.clone());
        Ok(item)
    }

    /// Returns an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item is unknown.
    pub fn item(&self, id: InventoryItemId) -> Result<InventoryItem, PostingError> {
        self.lock()?
            .items
            .get(&id)
            .cloned()
            .ok_or_else(|| InventoryError::ItemNotFound(id).into())
    }

    /// Lots received for an item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the state lock is poisoned.
    pub fn lots(&self, item_id: InventoryItemId) -> Result<Vec<StockLot>, PostingError> {
        let mut lots: Vec<StockLot> = self
            .lock()?
            .lots
            .iter()
            .filter(|l| l.item_id == item_id)
            .cloned()
            .collect();
        lots.sort_by(|a, b| a.received_on.cmp(&b.received_on));
        Ok(lots)
    }

    // ========== Sales ==========

    /// Records an invoiced order.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error.
    pub fn invoice_order(
        &self,
        event: &OrderInvoiced,
        actor: UserId,
    ) -> Result<JournalEntry, PostingError> {
        Ok(self.ledger.record(self.builder.order_invoiced(event), actor)?)
    }

    /// Records a customer payment.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error.
    pub fn receive_payment(
        &self,
        event: &PaymentReceived,
        actor: UserId,
    ) -> Result<JournalEntry, PostingError> {
        Ok(self.ledger.record(self.builder.payment_received(event), actor)?)
    }

    // ========== Purchasing ==========

    /// Receives goods: updates average costs, creates lots, and posts the
    /// receipt to inventory and payables.
    ///
    /// # Errors
    ///
    /// Returns an inventory error for unknown items or invalid lines, or the
    /// ledger's validation error. On error no item, lot or entry changes.
    pub fn receive_goods(
        &self,
        event: &GoodsReceived,
        actor: UserId,
    ) -> Result<(JournalEntry, Vec<StockLot>), PostingError> {
        let mut state = self.lock()?;
        let mut staged = HashMap::new();
        let mut lots = Vec::with_capacity(event.lines.len());

        for line in &event.lines {
            state.staged_item(&mut staged, line.item_id)?;
            let item = staged
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

        let entry = self.ledger.record(self.builder.goods_received(event), actor)?;

        state.items.extend(staged);
        state.lots.extend(lots.iter().cloned());
        Ok((entry, lots))
    }

    /// Records a payment to a supplier.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error.
    pub fn pay_supplier(
        &self,
        event: &SupplierPaid,
        actor: UserId,
    ) -> Result<JournalEntry, PostingError> {
        Ok(self.ledger.record(self.builder.supplier_paid(event), actor)?)
    }

    // ========== Production ==========

    /// Issues materials at average cost and posts materials and labor.
    ///
    /// Lots are not drawn down; valuation stays on the weighted average.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientStock` or another inventory error, or the
    /// ledger's validation error. On error no item or entry changes.
    pub fn capture_production_cost(
        &self,
        event: &ProductionCostCaptured,
        actor: UserId,
    ) -> Result<JournalEntry, PostingError> {
        let mut state = self.lock()?;
        let mut staged = HashMap::new();
        let mut materials_cost = Decimal::ZERO;

        for usage in &event.materials {
            state.staged_item(&mut staged, usage.item_id)?;
            let item = staged
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
        let entry = self.ledger.record(input, actor)?;

        tracing::info!(
            job = %event.job_number,
            %materials_cost,
            labor_cost = %event.labor_cost,
            reference = %entry.reference,
            "production cost captured"
        );
        state.items.extend(staged);
        Ok(entry)
    }

    /// Moves a finished job's costs into finished goods.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error.
    pub fn complete_production(
        &self,
        event: &ProductionCompleted,
        actor: UserId,
    ) -> Result<JournalEntry, PostingError> {
        Ok(self.ledger.record(self.builder.production_completed(event), actor)?)
    }

    // ========== Expenses ==========

    /// Records an operating expense.
    ///
    /// # Errors
    ///
    /// Returns the ledger's validation error.
    pub fn record_expense(
        &self,
        event: &ExpenseRecorded,
        actor: UserId,
    ) -> Result<JournalEntry, PostingError> {
        Ok(self.ledger.record(self.builder.expense_recorded(event), actor)?)
    }
}
