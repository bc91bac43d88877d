//! Inventory service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_shared::types::round_money;

use super::costing::{consume, recalculate_average_cost};
use super::error::InventoryError;
use super::item::InventoryItem;
use super::lot::StockLot;
use crate::ledger::SourceRef;

/// Receipts and issues against inventory items.
///
/// This service contains pure business logic with no storage dependencies.
pub struct InventoryService;

impl InventoryService {
    /// Receives stock: updates the average cost and returns the lot record.
    ///
    /// # Errors
    ///
    /// Returns `ItemInactive`, `NonPositiveQuantity` or `NegativeUnitCost`.
    pub fn receive(
        item: &mut InventoryItem,
        quantity: Decimal,
        unit_cost: Decimal,
        lot_number: impl Into<String>,
        received_on: NaiveDate,
        source: Option<SourceRef>,
    ) -> Result<StockLot, InventoryError> {
        if !item.is_active {
            return Err(InventoryError::ItemInactive(item.id));
        }
        recalculate_average_cost(item, quantity, unit_cost)?;

        let lot = StockLot::new(item.id, lot_number, quantity, unit_cost, received_on, source);
        tracing::info!(
            item_id = %item.id,
            sku = %item.sku,
            lot = %lot.lot_number,
            %quantity,
            %unit_cost,
            average_cost = %item.unit_cost,
            "goods received"
        );
        Ok(lot)
    }

    /// Issues stock to production at average cost. Returns the value issued.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveQuantity` or `InsufficientStock`.
    pub fn issue(item: &mut InventoryItem, quantity: Decimal) -> Result<Decimal, InventoryError> {
        let value = consume(item, quantity)?;
        tracing::info!(
            item_id = %item.id,
            sku = %item.sku,
            %quantity,
            %value,
            remaining = %item.current_stock,
            "stock issued"
        );
        Ok(value)
    }

    /// Total value of the given items, rounded to cents.
    #[must_use]
    pub fn valuation<'a, I>(items: I) -> Decimal
    where
        I: IntoIterator<Item = &'a InventoryItem>,
    {
        round_money(items.into_iter().map(|i| i.current_stock * i.unit_cost).sum())
    }
}
