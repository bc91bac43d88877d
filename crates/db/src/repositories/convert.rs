//! Mapping between `SeaORM` models and domain values.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use tally_core::accounts::{Account, AccountCategory, AccountType};
use tally_core::inventory::{InventoryItem, StockLot};
use tally_core::ledger::{
    EntryReference, JournalEntry, JournalEntryLine, JournalEntryType, JournalStatus, LineType,
    SourceRef,
};
use tally_shared::types::{AccountId, InventoryItemId, JournalEntryId, StockLotId, UserId};
use uuid::Uuid;

use super::error::RepositoryError;
use crate::entities::{
    accounts, inventory_items, journal_entries, journal_entry_lines, sea_orm_active_enums as db,
    stock_lots,
};

// ========== Enums ==========

impl From<AccountType> for db::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Revenue => Self::Revenue,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<db::AccountType> for AccountType {
    fn from(value: db::AccountType) -> Self {
        match value {
            db::AccountType::Asset => Self::Asset,
            db::AccountType::Liability => Self::Liability,
            db::AccountType::Equity => Self::Equity,
            db::AccountType::Revenue => Self::Revenue,
            db::AccountType::Expense => Self::Expense,
        }
    }
}

impl From<AccountCategory> for db::AccountCategory {
    fn from(value: AccountCategory) -> Self {
        match value {
            AccountCategory::CurrentAsset => Self::CurrentAsset,
            AccountCategory::Inventory => Self::Inventory,
            AccountCategory::FixedAsset => Self::FixedAsset,
            AccountCategory::CurrentLiability => Self::CurrentLiability,
            AccountCategory::LongTermLiability => Self::LongTermLiability,
            AccountCategory::OwnersEquity => Self::OwnersEquity,
            AccountCategory::OperatingRevenue => Self::OperatingRevenue,
            AccountCategory::CostOfGoodsSold => Self::CostOfGoodsSold,
            AccountCategory::OperatingExpense => Self::OperatingExpense,
            AccountCategory::OtherExpense => Self::OtherExpense,
        }
    }
}

impl From<db::AccountCategory> for AccountCategory {
    fn from(value: db::AccountCategory) -> Self {
        match value {
            db::AccountCategory::CurrentAsset => Self::CurrentAsset,
            db::AccountCategory::Inventory => Self::Inventory,
            db::AccountCategory::FixedAsset => Self::FixedAsset,
            db::AccountCategory::CurrentLiability => Self::CurrentLiability,
            db::AccountCategory::LongTermLiability => Self::LongTermLiability,
            db::AccountCategory::OwnersEquity => Self::OwnersEquity,
            db::AccountCategory::OperatingRevenue => Self::OperatingRevenue,
            db::AccountCategory::CostOfGoodsSold => Self::CostOfGoodsSold,
            db::AccountCategory::OperatingExpense => Self::OperatingExpense,
            db::AccountCategory::OtherExpense => Self::OtherExpense,
        }
    }
}

impl From<JournalEntryType> for db::JournalEntryType {
    fn from(value: JournalEntryType) -> Self {
        match value {
            JournalEntryType::General => Self::General,
            JournalEntryType::Sales => Self::Sales,
            JournalEntryType::Purchase => Self::Purchase,
            JournalEntryType::Payment => Self::Payment,
            JournalEntryType::Receipt => Self::Receipt,
            JournalEntryType::Expense => Self::Expense,
            JournalEntryType::Adjustment => Self::Adjustment,
            JournalEntryType::Depreciation => Self::Depreciation,
            JournalEntryType::Inventory => Self::Inventory,
        }
    }
}

impl From<db::JournalEntryType> for JournalEntryType {
    fn from(value: db::JournalEntryType) -> Self {
        match value {
            db::JournalEntryType::General => Self::General,
            db::JournalEntryType::Sales => Self::Sales,
            db::JournalEntryType::Purchase => Self::Purchase,
            db::JournalEntryType::Payment => Self::Payment,
            db::JournalEntryType::Receipt => Self::Receipt,
            db::JournalEntryType::Expense => Self::Expense,
            db::JournalEntryType::Adjustment => Self::Adjustment,
            db::JournalEntryType::Depreciation => Self::Depreciation,
            db::JournalEntryType::Inventory => Self::Inventory,
        }
    }
}

impl From<JournalStatus> for db::JournalStatus {
    fn from(value: JournalStatus) -> Self {
        match value {
            JournalStatus::Draft => Self::Draft,
            JournalStatus::Posted => Self::Posted,
            JournalStatus::Void => Self::Void,
        }
    }
}

impl From<db::JournalStatus> for JournalStatus {
    fn from(value: db::JournalStatus) -> Self {
        match value {
            db::JournalStatus::Draft => Self::Draft,
            db::JournalStatus::Posted => Self::Posted,
            db::JournalStatus::Void => Self::Void,
        }
    }
}

impl From<LineType> for db::LineType {
    fn from(value: LineType) -> Self {
        match value {
            LineType::Debit => Self::Debit,
            LineType::Credit => Self::Credit,
        }
    }
}

impl From<db::LineType> for LineType {
    fn from(value: db::LineType) -> Self {
        match value {
            db::LineType::Debit => Self::Debit,
            db::LineType::Credit => Self::Credit,
        }
    }
}

// ========== Timestamps & sources ==========

pub(crate) fn to_db_time(value: DateTime<Utc>) -> DateTimeWithTimeZone {
    value.fixed_offset()
}

pub(crate) fn from_db_time(value: DateTime<FixedOffset>) -> DateTime<Utc> {
    value.with_timezone(&Utc)
}

/// Splits a source into its `(kind, id)` columns.
pub(crate) fn source_columns(source: Option<SourceRef>) -> (Option<String>, Option<Uuid>) {
    source.map_or((None, None), |s| (Some(s.kind().to_string()), Some(s.id())))
}

fn source_from_columns(
    table: &'static str,
    row_id: Uuid,
    kind: Option<&str>,
    id: Option<Uuid>,
) -> Result<Option<SourceRef>, RepositoryError> {
    match (kind, id) {
        (None, None) => Ok(None),
        (Some(kind), Some(id)) => SourceRef::from_parts(kind, id).map(Some).ok_or_else(|| {
            RepositoryError::CorruptRecord {
                table,
                id: row_id,
                detail: format!("unknown source kind '{kind}'"),
            }
        }),
        _ => Err(RepositoryError::CorruptRecord {
            table,
            id: row_id,
            detail: "source kind and id must both be set".to_string(),
        }),
    }
}

// ========== Models ==========

pub(crate) fn account_from_model(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        account_type: model.account_type.into(),
        category: model.category.into(),
        parent_id: model.parent_id.map(AccountId::from_uuid),
        balance: model.balance,
        is_active: model.is_active,
        version: model.version,
    }
}

pub(crate) fn line_from_model(model: journal_entry_lines::Model) -> JournalEntryLine {
    JournalEntryLine {
        id: model.id.into(),
        journal_entry_id: JournalEntryId::from_uuid(model.journal_entry_id),
        account_id: AccountId::from_uuid(model.account_id),
        line_type: model.line_type.into(),
        amount: model.amount,
        description: model.description,
    }
}

/// Rebuilds an entry; `lines` must already be in line-number order.
pub(crate) fn entry_from_models(
    model: journal_entries::Model,
    lines: Vec<journal_entry_lines::Model>,
) -> Result<JournalEntry, RepositoryError> {
    let source = source_from_columns(
        "journal_entries",
        model.id,
        model.source_kind.as_deref(),
        model.source_id,
    )?;

    Ok(JournalEntry {
        id: JournalEntryId::from_uuid(model.id),
        reference: EntryReference::from_string(model.reference),
        transaction_date: model.transaction_date,
        entry_type: model.entry_type.into(),
        description: model.description,
        source,
        status: model.status.into(),
        created_by: UserId::from_uuid(model.created_by),
        created_at: from_db_time(model.created_at),
        posted_by: model.posted_by.map(UserId::from_uuid),
        posted_at: model.posted_at.map(from_db_time),
        voided_by: model.voided_by.map(UserId::from_uuid),
        voided_at: model.voided_at.map(from_db_time),
        lines: lines.into_iter().map(line_from_model).collect(),
    })
}

pub(crate) fn item_from_model(model: inventory_items::Model) -> InventoryItem {
    InventoryItem {
        id: InventoryItemId::from_uuid(model.id),
        sku: model.sku,
        name: model.name,
        current_stock: model.current_stock,
        unit_cost: model.unit_cost,
        is_active: model.is_active,
    }
}

pub(crate) fn lot_from_model(model: stock_lots::Model) -> Result<StockLot, RepositoryError> {
    let source = source_from_columns(
        "stock_lots",
        model.id,
        model.source_kind.as_deref(),
        model.source_id,
    )?;

    Ok(StockLot {
        id: StockLotId::from_uuid(model.id),
        item_id: InventoryItemId::from_uuid(model.item_id),
        lot_number: model.lot_number,
        quantity_received: model.quantity_received,
        quantity_remaining: model.quantity_remaining,
        unit_cost: model.unit_cost,
        received_on: model.received_on,
        source,
    })
}
