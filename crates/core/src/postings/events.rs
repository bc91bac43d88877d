//! Business events that collaborators report to the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{
    ExpenseId, InventoryItemId, OrderId, PaymentId, ProductionJobId, PurchaseOrderId,
};

use crate::accounts::{CashAccount, ExpenseCategory};

/// A sales order was invoiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInvoiced {
    /// The order.
    pub order_id: OrderId,
    /// Order number shown in the description.
    pub order_number: String,
    /// Invoice date.
    pub date: NaiveDate,
    /// Invoice total.
    pub amount: Decimal,
}

/// A customer paid against an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceived {
    /// The payment.
    pub payment_id: PaymentId,
    /// Order number shown in the description.
    pub order_number: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// Where the money went.
    pub deposit_to: CashAccount,
}

/// One received line of a purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    /// The item received.
    pub item_id: InventoryItemId,
    /// Quantity received.
    pub quantity: Decimal,
    /// Purchase price per unit.
    pub unit_cost: Decimal,
    /// Lot number of the delivery.
    pub lot_number: String,
}

/// Goods on a purchase order arrived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodsReceived {
    /// The purchase order.
    pub purchase_order_id: PurchaseOrderId,
    /// PO number shown in the description.
    pub po_number: String,
    /// Receipt date.
    pub date: NaiveDate,
    /// Lines received.
    pub lines: Vec<ReceiptLine>,
}

/// A supplier was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierPaid {
    /// The purchase order settled.
    pub purchase_order_id: PurchaseOrderId,
    /// PO number shown in the description.
    pub po_number: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Where the money came from.
    pub paid_from: CashAccount,
}

/// Material drawn by a production job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialUsage {
    /// The item consumed.
    pub item_id: InventoryItemId,
    /// Quantity consumed.
    pub quantity: Decimal,
}

/// A production job consumed materials and labor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCostCaptured {
    /// The job.
    pub job_id: ProductionJobId,
    /// Job number shown in the description.
    pub job_number: String,
    /// Date of consumption.
    pub date: NaiveDate,
    /// Materials drawn from stock.
    pub materials: Vec<MaterialUsage>,
    /// Labor cost paid in cash.
    pub labor_cost: Decimal,
}

/// A production job finished and its costs move to finished goods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionCompleted {
    /// The job.
    pub job_id: ProductionJobId,
    /// Job number shown in the description.
    pub job_number: String,
    /// Completion date.
    pub date: NaiveDate,
    /// Materials cost captured for the job.
    pub materials_cost: Decimal,
    /// Labor cost captured for the job.
    pub labor_cost: Decimal,
}

/// An operating expense was paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    /// The expense.
    pub expense_id: ExpenseId,
    /// Expense category (selects the 68xx account).
    pub category: ExpenseCategory,
    /// Free-text description.
    pub description: String,
    /// Payment date.
    pub date: NaiveDate,
    /// Amount paid.
    pub amount: Decimal,
    /// Where the money came from.
    pub paid_from: CashAccount,
}
