//! `SeaORM` entity prelude.

pub use super::accounts::Entity as Accounts;
pub use super::inventory_items::Entity as InventoryItems;
pub use super::journal_entries::Entity as JournalEntries;
pub use super::journal_entry_lines::Entity as JournalEntryLines;
pub use super::stock_lots::Entity as StockLots;
