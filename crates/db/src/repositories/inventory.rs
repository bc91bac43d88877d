//! Inventory repository for items and stock lots.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tally_core::inventory::{
    InventoryError, InventoryItem, InventoryService, LotAllocation, StockLot, allocate_fifo,
};
use tally_shared::types::InventoryItemId;
use uuid::Uuid;

use super::convert::{item_from_model, lot_from_model, source_columns, to_db_time};
use super::error::RepositoryError;
use crate::entities::{inventory_items, stock_lots};

/// Inventory repository for item and lot operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers an item.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSku` if the SKU is taken.
    pub async fn create_item(&self, item: InventoryItem) -> Result<InventoryItem, RepositoryError> {
        let existing = inventory_items::Entity::find()
            .filter(inventory_items::Column::Sku.eq(item.sku.as_str()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(InventoryError::DuplicateSku(item.sku).into());
        }

        let now = to_db_time(Utc::now());
        inventory_items::ActiveModel {
            id: Set(item.id.into_inner()),
            sku: Set(item.sku.clone()),
            name: Set(item.name.clone()),
            current_stock: Set(item.current_stock),
            unit_cost: Set(item.unit_cost),
            is_active: Set(item.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(item_id = %item.id, sku = %item.sku, "inventory item created");
        Ok(item)
    }

    /// Finds an item by id.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the item does not exist.
    pub async fn find_item(&self, id: InventoryItemId) -> Result<InventoryItem, RepositoryError> {
        inventory_items::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(item_from_model)
            .ok_or_else(|| InventoryError::ItemNotFound(id).into())
    }

    /// Lists every item, ordered by SKU.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_items(&self) -> Result<Vec<InventoryItem>, RepositoryError> {
        let models = inventory_items::Entity::find()
            .order_by_asc(inventory_items::Column::Sku)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(item_from_model).collect())
    }

    /// Total stock value at average cost.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn valuation(&self) -> Result<Decimal, RepositoryError> {
        let items = self.list_items().await?;
        Ok(InventoryService::valuation(&items))
    }

    /// Lots of an item, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or a lot is corrupt.
    pub async fn lots(&self, item_id: InventoryItemId) -> Result<Vec<StockLot>, RepositoryError> {
        lots_for(&self.db, item_id, false).await
    }

    /// Traces `quantity` of an item through its lots, oldest first, and
    /// stores the drawn-down remainders.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveQuantity`, or `InsufficientStock` if the open lots
    /// cannot cover the quantity. Nothing changes on error.
    pub async fn allocate_fifo(
        &self,
        item_id: InventoryItemId,
        quantity: Decimal,
    ) -> Result<Vec<LotAllocation>, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut lots = lots_for(&txn, item_id, true).await?;
        let allocations = allocate_fifo(&mut lots, item_id, quantity)?;

        let remaining: HashMap<_, _> = lots.iter().map(|l| (l.id, l.quantity_remaining)).collect();
        for allocation in &allocations {
            let left = remaining
                .get(&allocation.lot_id)
                .copied()
                .unwrap_or_default();
            stock_lots::Entity::update_many()
                .col_expr(stock_lots::Column::QuantityRemaining, Expr::value(left))
                .filter(stock_lots::Column::Id.eq(allocation.lot_id.into_inner()))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        tracing::info!(
            item_id = %item_id,
            %quantity,
            lots = allocations.len(),
            "stock traced through lots"
        );
        Ok(allocations)
    }
}

async fn lots_for<C>(
    db: &C,
    item_id: InventoryItemId,
    for_update: bool,
) -> Result<Vec<StockLot>, RepositoryError>
where
    C: ConnectionTrait,
{
    let mut query = stock_lots::Entity::find()
        .filter(stock_lots::Column::ItemId.eq(item_id.into_inner()))
        .order_by_asc(stock_lots::Column::ReceivedOn)
        .order_by_asc(stock_lots::Column::CreatedAt);
    if for_update {
        query = query.lock_exclusive();
    }
    query
        .all(db)
        .await?
        .into_iter()
        .map(lot_from_model)
        .collect()
}

/// Locks items `FOR UPDATE` in ascending id order.
pub(crate) async fn lock_items(
    txn: &DatabaseTransaction,
    ids: impl IntoIterator<Item = InventoryItemId>,
) -> Result<HashMap<InventoryItemId, InventoryItem>, RepositoryError> {
    let mut ids: Vec<Uuid> = ids.into_iter().map(InventoryItemId::into_inner).collect();
    ids.sort_unstable();
    ids.dedup();

    let locked: HashMap<InventoryItemId, InventoryItem> = inventory_items::Entity::find()
        .filter(inventory_items::Column::Id.is_in(ids.clone()))
        .order_by_asc(inventory_items::Column::Id)
        .lock_exclusive()
        .all(txn)
        .await?
        .into_iter()
        .map(|m| {
            let item = item_from_model(m);
            (item.id, item)
        })
        .collect();

    if let Some(missing) = ids
        .into_iter()
        .map(InventoryItemId::from_uuid)
        .find(|id| !locked.contains_key(id))
    {
        return Err(InventoryError::ItemNotFound(missing).into());
    }
    Ok(locked)
}

/// Writes an item's stock and average cost.
pub(crate) async fn save_item(
    txn: &DatabaseTransaction,
    item: &InventoryItem,
) -> Result<(), RepositoryError> {
    inventory_items::Entity::update_many()
        .col_expr(inventory_items::Column::CurrentStock, Expr::value(item.current_stock))
        .col_expr(inventory_items::Column::UnitCost, Expr::value(item.unit_cost))
        .col_expr(inventory_items::Column::UpdatedAt, Expr::value(to_db_time(Utc::now())))
        .filter(inventory_items::Column::Id.eq(item.id.into_inner()))
        .exec(txn)
        .await?;
    Ok(())
}

/// Stores a new lot.
pub(crate) async fn insert_lot(
    txn: &DatabaseTransaction,
    lot: &StockLot,
) -> Result<(), RepositoryError> {
    let (source_kind, source_id) = source_columns(lot.source);
    stock_lots::ActiveModel {
        id: Set(lot.id.into_inner()),
        item_id: Set(lot.item_id.into_inner()),
        lot_number: Set(lot.lot_number.clone()),
        quantity_received: Set(lot.quantity_received),
        quantity_remaining: Set(lot.quantity_remaining),
        unit_cost: Set(lot.unit_cost),
        received_on: Set(lot.received_on),
        source_kind: Set(source_kind),
        source_id: Set(source_id),
        created_at: Set(to_db_time(Utc::now())),
    }
    .insert(txn)
    .await?;
    Ok(())
}
