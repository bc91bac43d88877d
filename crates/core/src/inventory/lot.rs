//! Stock lots: one record per receipt.
//!
//! Valuation is always the item's weighted average. Lots exist for
//! traceability: which receipt delivered what, at what cost, and how much of
//! it a FIFO trace says is left. Consuming stock through
//! [`consume`](super::costing::consume) does not draw lots down; only an
//! explicit [`allocate_fifo`] does.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{InventoryItemId, StockLotId, round_money};

use super::error::InventoryError;
use crate::ledger::SourceRef;

/// A received batch of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLot {
    /// Unique identifier.
    pub id: StockLotId,
    /// The item received.
    pub item_id: InventoryItemId,
    /// Supplier or internal lot number.
    pub lot_number: String,
    /// Quantity delivered.
    pub quantity_received: Decimal,
    /// Quantity not yet traced to consumption.
    pub quantity_remaining: Decimal,
    /// Cost per unit on this receipt.
    pub unit_cost: Decimal,
    /// Date of receipt.
    pub received_on: NaiveDate,
    /// Document that delivered the lot.
    pub source: Option<SourceRef>,
}

impl StockLot {
    /// New, untouched lot.
    #[must_use]
    pub fn new(
        item_id: InventoryItemId,
        lot_number: impl Into<String>,
        quantity: Decimal,
        unit_cost: Decimal,
        received_on: NaiveDate,
        source: Option<SourceRef>,
    ) -> Self {
        Self {
            id: StockLotId::new(),
            item_id,
            lot_number: lot_number.into(),
            quantity_received: quantity,
            quantity_remaining: quantity,
            unit_cost,
            received_on,
            source,
        }
    }

    /// True once nothing remains.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.quantity_remaining <= Decimal::ZERO
    }

    /// Draws `quantity` from this lot and returns its value at the lot's cost.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveQuantity` or `LotExhausted`.
    pub fn consume(&mut self, quantity: Decimal) -> Result<Decimal, InventoryError> {
        if quantity <= Decimal::ZERO {
            return Err(InventoryError::NonPositiveQuantity(quantity));
        }
        if quantity > self.quantity_remaining {
            return Err(InventoryError::LotExhausted {
                lot_id: self.id,
                requested: quantity,
                remaining: self.quantity_remaining,
            });
        }
        self.quantity_remaining -= quantity;
        Ok(round_money(quantity * self.unit_cost))
    }
}

/// Part of a FIFO trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotAllocation {
    /// Lot drawn from.
    pub lot_id: StockLotId,
    /// Quantity drawn.
    pub quantity: Decimal,
    /// The lot's unit cost.
    pub unit_cost: Decimal,
}

/// Traces `quantity` of `item_id` through its lots, oldest first.
///
/// All or nothing: if the lots cannot cover the quantity, none of them is
/// touched.
///
/// # Errors
///
/// Returns `NonPositiveQuantity`, or `InsufficientStock` when the remaining
/// lot quantities are short.
pub fn allocate_fifo(
    lots: &mut [StockLot],
    item_id: InventoryItemId,
    quantity: Decimal,
) -> Result<Vec<LotAllocation>, InventoryError> {
    if quantity <= Decimal::ZERO {
        return Err(InventoryError::NonPositiveQuantity(quantity));
    }

    let mut candidates: Vec<&mut StockLot> = lots
        .iter_mut()
        .filter(|l| l.item_id == item_id && !l.is_exhausted())
        .collect();
    candidates.sort_by(|a, b| {
        a.received_on
            .cmp(&b.received_on)
            .then_with(|| a.lot_number.cmp(&b.lot_number))
    });

    let available: Decimal = candidates.iter().map(|l| l.quantity_remaining).sum();
    if available < quantity {
        return Err(InventoryError::InsufficientStock {
            item_id,
            requested: quantity,
            available,
        });
    }

    let mut outstanding = quantity;
    let mut allocations = Vec::new();
    for lot in candidates {
        if outstanding.is_zero() {
            break;
        }
        let take = outstanding.min(lot.quantity_remaining);
        lot.consume(take)?;
        outstanding -= take;
        allocations.push(LotAllocation {
            lot_id: lot.id,
            quantity: take,
            unit_cost: lot.unit_cost,
        });
    }

    Ok(allocations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn test_lot_consume() {
        let mut lot = StockLot::new(InventoryItemId::new(), "L-1", dec!(10), dec!(2.50), date(1), None);
        assert_eq!(lot.consume(dec!(4)).unwrap(), dec!(10.00));
        assert_eq!(lot.quantity_remaining, dec!(6));
        assert!(matches!(
            lot.consume(dec!(7)),
            Err(InventoryError::LotExhausted { .. })
        ));
        lot.consume(dec!(6)).unwrap();
        assert!(lot.is_exhausted());
    }

    #[test]
    fn test_allocate_fifo_oldest_first() {
        let item = InventoryItemId::new();
        let other = InventoryItemId::new();
        let mut lots = vec![
            StockLot::new(item, "L-2", dec!(10), dec!(3.00), date(5), None),
            StockLot::new(other, "X-1", dec!(100), dec!(9.00), date(1), None),
            StockLot::new(item, "L-1", dec!(5), dec!(2.00), date(2), None),
        ];

        let allocations = allocate_fifo(&mut lots, item, dec!(8)).unwrap();

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].quantity, dec!(5));
        assert_eq!(allocations[0].unit_cost, dec!(2.00));
        assert_eq!(allocations[1].quantity, dec!(3));
        assert_eq!(lots[2].quantity_remaining, Decimal::ZERO);
        assert_eq!(lots[0].quantity_remaining, dec!(7));
        assert_eq!(lots[1].quantity_remaining, dec!(100));
    }

    #[test]
    fn test_allocate_fifo_is_all_or_nothing() {
        let item = InventoryItemId::new();
        let mut lots = vec![StockLot::new(item, "L-1", dec!(5), dec!(2.00), date(2), None)];

        assert!(matches!(
            allocate_fifo(&mut lots, item, dec!(6)),
            Err(InventoryError::InsufficientStock { .. })
        ));
        assert_eq!(lots[0].quantity_remaining, dec!(5));
    }
}
