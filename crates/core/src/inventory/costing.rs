//! Weighted-average costing.

use rust_decimal::Decimal;
use tally_shared::types::round_money;

use super::error::InventoryError;
use super::item::InventoryItem;

/// Folds a receipt into the item's average cost and stock.
///
/// ```text
/// total_value    = current_stock * unit_cost + new_quantity * new_unit_cost
/// total_quantity = current_stock + new_quantity
/// unit_cost      = total_value / total_quantity   (0 when total_quantity is 0)
/// current_stock  = total_quantity
/// ```
///
/// The average is kept at full precision; rounding happens only when a
/// value becomes a journal amount.
///
/// # Errors
///
/// Returns `NonPositiveQuantity`, `NegativeUnitCost`, or `ValueOverflow`
/// when the combined stock value leaves the decimal range; the item is left
/// unchanged.
pub fn recalculate_average_cost(
    item: &mut InventoryItem,
    new_quantity: Decimal,
    new_unit_cost: Decimal,
) -> Result<(), InventoryError> {
    if new_quantity <= Decimal::ZERO {
        return Err(InventoryError::NonPositiveQuantity(new_quantity));
    }
    if new_unit_cost < Decimal::ZERO {
        return Err(InventoryError::NegativeUnitCost(new_unit_cost));
    }

    let item_id = item.id;
    let overflow = || InventoryError::ValueOverflow { item_id };
    let total_value = item
        .current_stock
        .checked_mul(item.unit_cost)
        .zip(new_quantity.checked_mul(new_unit_cost))
        .and_then(|(held, received)| held.checked_add(received))
        .ok_or_else(overflow)?;
    let total_quantity = item
        .current_stock
        .checked_add(new_quantity)
        .ok_or_else(overflow)?;

    item.unit_cost = if total_quantity > Decimal::ZERO {
        total_value.checked_div(total_quantity).ok_or_else(overflow)?
    } else {
        Decimal::ZERO
    };
    item.current_stock = total_quantity;
    Ok(())
}

/// Takes `quantity` out of stock at the current average cost.
///
/// The average cost itself does not change. Returns the consumed value
/// rounded to cents, ready to be posted.
///
/// # Errors
///
/// Returns `NonPositiveQuantity`, `InsufficientStock`, or `ValueOverflow`;
/// the item is left unchanged.
pub fn consume(item: &mut InventoryItem, quantity: Decimal) -> Result<Decimal, InventoryError> {
    if quantity <= Decimal::ZERO {
        return Err(InventoryError::NonPositiveQuantity(quantity));
    }
    if quantity > item.current_stock {
        return Err(InventoryError::InsufficientStock {
            item_id: item.id,
            requested: quantity,
            available: item.current_stock,
        });
    }

    let value = quantity
        .checked_mul(item.unit_cost)
        .ok_or(InventoryError::ValueOverflow { item_id: item.id })?;
    item.current_stock -= quantity;
    Ok(round_money(value))
}
