//! Inventory costing.
//!
//! Items are valued at weighted-average cost, recalculated on every
//! receipt. Each receipt also yields a [`StockLot`] for traceability.

pub mod costing;
pub mod error;
pub mod item;
pub mod lot;
pub mod service;

#[cfg(test)]
mod costing_props;

pub use costing::{consume, recalculate_average_cost};
pub use error::InventoryError;
pub use item::InventoryItem;
pub use lot::{LotAllocation, StockLot, allocate_fifo};
pub use service::InventoryService;
