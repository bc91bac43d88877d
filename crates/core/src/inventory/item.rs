//! Inventory item.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{InventoryItemId, round_money};

/// A stocked material or product valued at weighted-average cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier.
    pub id: InventoryItemId,
    /// Stock-keeping unit.
    pub sku: String,
    /// Display name.
    pub name: String,
    /// Quantity on hand, never negative.
    pub current_stock: Decimal,
    /// Weighted-average cost per unit.
    pub unit_cost: Decimal,
    /// Inactive items take no receipts.
    pub is_active: bool,
}

impl InventoryItem {
    /// New item with no stock.
    #[must_use]
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: InventoryItemId::new(),
            sku: sku.into(),
            name: name.into(),
            current_stock: Decimal::ZERO,
            unit_cost: Decimal::ZERO,
            is_active: true,
        }
    }

    /// Value of the stock on hand, rounded to cents.
    #[must_use]
    pub fn stock_value(&self) -> Decimal {
        round_money(self.current_stock * self.unit_cost)
    }
}
