//! Inventory error types.

use rust_decimal::Decimal;
use tally_shared::AppError;
use tally_shared::types::{InventoryItemId, StockLotId};
use thiserror::Error;

/// Errors that can occur during inventory operations.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Quantity must be strictly positive.
    #[error("quantity must be greater than zero, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Unit cost must not be negative.
    #[error("unit cost cannot be negative, got {0}")]
    NegativeUnitCost(Decimal),

    /// Not enough stock on hand.
    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        /// The item.
        item_id: InventoryItemId,
        /// Quantity asked for.
        requested: Decimal,
        /// Quantity on hand.
        available: Decimal,
    },

    /// Not enough quantity left in a lot.
    #[error("lot {lot_id} has {remaining} remaining, requested {requested}")]
    LotExhausted {
        /// The lot.
        lot_id: StockLotId,
        /// Quantity asked for.
        requested: Decimal,
        /// Quantity left.
        remaining: Decimal,
    },

    /// A stock value does not fit in a decimal.
    #[error("stock value of item {item_id} is out of range")]
    ValueOverflow {
        /// The item.
        item_id: InventoryItemId,
    },

    /// Item not found.
    #[error("inventory item not found: {0}")]
    ItemNotFound(InventoryItemId),

    /// Item is inactive.
    #[error("inventory item {0} is inactive")]
    ItemInactive(InventoryItemId),

    /// SKU already in use.
    #[error("sku {0} already exists")]
    DuplicateSku(String),
}

impl InventoryError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveQuantity(_) => "NON_POSITIVE_QUANTITY",
            Self::NegativeUnitCost(_) => "NEGATIVE_UNIT_COST",
            Self::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            Self::LotExhausted { .. } => "LOT_EXHAUSTED",
            Self::ValueOverflow { .. } => "VALUE_OVERFLOW",
            Self::ItemNotFound(_) => "ITEM_NOT_FOUND",
            Self::ItemInactive(_) => "ITEM_INACTIVE",
            Self::DuplicateSku(_) => "DUPLICATE_SKU",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NonPositiveQuantity(_)
            | Self::NegativeUnitCost(_)
            | Self::ValueOverflow { .. }
            | Self::ItemInactive(_)
            | Self::DuplicateSku(_) => 400,
            Self::ItemNotFound(_) => 404,
            Self::InsufficientStock { .. } | Self::LotExhausted { .. } => 422,
        }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        let message = err.to_string();
        match err {
            InventoryError::ItemNotFound(_) => Self::NotFound(message),
            InventoryError::InsufficientStock { .. } | InventoryError::LotExhausted { .. } => {
                Self::BusinessRule(message)
            }
            InventoryError::DuplicateSku(_) => Self::Conflict(message),
            InventoryError::NonPositiveQuantity(_)
            | InventoryError::NegativeUnitCost(_)
            | InventoryError::ValueOverflow { .. }
            | InventoryError::ItemInactive(_) => Self::Validation(message),
        }
    }
}
