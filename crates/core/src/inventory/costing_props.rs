//! Property-based tests for weighted-average costing.
//!
//! - Property 7: Receipts preserve total value
//! - Property 8: Consumption never changes the average cost

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::costing::{consume, recalculate_average_cost};
use super::item::InventoryItem;

/// Quantities 0.001 to 10,000.000.
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|milli| Decimal::new(milli, 3))
}

/// Unit costs 0.00 to 5,000.00.
fn unit_cost() -> impl Strategy<Value = Decimal> {
    (0i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 7.1: Stock grows by exactly the received quantity and the
    /// average lies between the old average and the receipt cost.**
    #[test]
    fn prop_average_is_bounded(
        receipts in prop::collection::vec((quantity(), unit_cost()), 1..10),
    ) {
        let mut item = InventoryItem::new("P", "Prop item");
        let mut expected_stock = Decimal::ZERO;

        for (qty, cost) in receipts {
            let before = item.unit_cost;
            let had_stock = item.current_stock > Decimal::ZERO;
            recalculate_average_cost(&mut item, qty, cost).unwrap();
            expected_stock += qty;

            prop_assert_eq!(item.current_stock, expected_stock);
            if had_stock {
                let (low, high) = if before < cost { (before, cost) } else { (cost, before) };
                let slack = Decimal::new(1, 20);
                prop_assert!(item.unit_cost >= low - slack && item.unit_cost <= high + slack);
            } else {
                prop_assert_eq!(item.unit_cost, cost);
            }
        }
    }

    /// **Property 7.2: Stock value after a receipt equals value before plus
    /// the receipt's value, to the cent.**
    #[test]
    fn prop_receipt_preserves_value(
        first in (quantity(), unit_cost()),
        second in (quantity(), unit_cost()),
    ) {
        let mut item = InventoryItem::new("P", "Prop item");
        recalculate_average_cost(&mut item, first.0, first.1).unwrap();
        recalculate_average_cost(&mut item, second.0, second.1).unwrap();

        let expected = first.0 * first.1 + second.0 * second.1;
        let actual = item.current_stock * item.unit_cost;
        prop_assert!((actual - expected).abs() < Decimal::new(1, 2));
    }

    /// **Property 8.1: Consuming stock leaves the average cost untouched and
    /// fails without effect when stock is short.**
    #[test]
    fn prop_consume_keeps_average(
        receipt in (quantity(), unit_cost()),
        take in quantity(),
    ) {
        let mut item = InventoryItem::new("P", "Prop item");
        recalculate_average_cost(&mut item, receipt.0, receipt.1).unwrap();
        let before = item.clone();

        match consume(&mut item, take) {
            Ok(_) => {
                prop_assert!(take <= before.current_stock);
                prop_assert_eq!(item.unit_cost, before.unit_cost);
                prop_assert_eq!(item.current_stock, before.current_stock - take);
            }
            Err(_) => {
                prop_assert!(take > before.current_stock);
                prop_assert_eq!(item, before);
            }
        }
    }
}
