//! `SeaORM` Entity for stock_lots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_lots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub lot_number: String,
    #[sea_orm(column_type = "Decimal(None)")]
    pub quantity_received: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub quantity_remaining: Decimal,
    #[sea_orm(column_type = "Decimal(None)")]
    pub unit_cost: Decimal,
    pub received_on: Date,
    pub source_kind: Option<String>,
    pub source_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_items::Entity",
        from = "Column::ItemId",
        to = "super::inventory_items::Column::Id"
    )]
    InventoryItems,
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
