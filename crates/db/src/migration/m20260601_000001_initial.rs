//! Initial database migration.
//!
//! Creates the chart of accounts, the journal, inventory items and stock
//! lots, the reference sequence, and the triggers that keep the journal
//! append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(REFERENCE_SEQUENCE_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;

        // ============================================================
        // PART 4: INVENTORY
        // ============================================================
        db.execute_unprepared(INVENTORY_ITEMS_SQL).await?;
        db.execute_unprepared(STOCK_LOTS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'revenue',
    'expense'
);

CREATE TYPE account_category AS ENUM (
    'current_asset',
    'inventory',
    'fixed_asset',
    'current_liability',
    'long_term_liability',
    'owners_equity',
    'operating_revenue',
    'cost_of_goods_sold',
    'operating_expense',
    'other_expense'
);

CREATE TYPE journal_entry_type AS ENUM (
    'general',
    'sales',
    'purchase',
    'payment',
    'receipt',
    'expense',
    'adjustment',
    'depreciation',
    'inventory'
);

CREATE TYPE journal_status AS ENUM ('draft', 'posted', 'void');

CREATE TYPE line_type AS ENUM ('debit', 'credit');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(20) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    category account_category NOT NULL,
    parent_id UUID REFERENCES accounts(id),
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    version BIGINT NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_not_own_parent CHECK (parent_id IS NULL OR parent_id <> id)
);

CREATE INDEX idx_accounts_type ON accounts(account_type);
CREATE INDEX idx_accounts_parent ON accounts(parent_id) WHERE parent_id IS NOT NULL;
";

const REFERENCE_SEQUENCE_SQL: &str = r"
CREATE SEQUENCE journal_entry_reference_seq START WITH 1 INCREMENT BY 1 NO CYCLE;
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    reference VARCHAR(50) NOT NULL UNIQUE,
    transaction_date DATE NOT NULL,
    entry_type journal_entry_type NOT NULL,
    description TEXT NOT NULL,
    source_kind VARCHAR(32),
    source_id UUID,
    status journal_status NOT NULL DEFAULT 'draft',
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    posted_by UUID,
    posted_at TIMESTAMPTZ,
    voided_by UUID,
    voided_at TIMESTAMPTZ,
    CONSTRAINT chk_source_complete CHECK ((source_kind IS NULL) = (source_id IS NULL))
);

CREATE INDEX idx_je_date ON journal_entries(transaction_date);
CREATE INDEX idx_je_status ON journal_entries(status);
CREATE INDEX idx_je_source ON journal_entries(source_kind, source_id) WHERE source_id IS NOT NULL;
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    id UUID PRIMARY KEY,
    journal_entry_id UUID NOT NULL REFERENCES journal_entries(id),
    line_number INTEGER NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id),
    line_type line_type NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    description VARCHAR(500),
    CONSTRAINT chk_line_amount_positive CHECK (amount > 0),
    UNIQUE (journal_entry_id, line_number)
);

CREATE INDEX idx_jel_account ON journal_entry_lines(account_id);
";

const INVENTORY_ITEMS_SQL: &str = r"
CREATE TABLE inventory_items (
    id UUID PRIMARY KEY,
    sku VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    current_stock NUMERIC NOT NULL DEFAULT 0,
    unit_cost NUMERIC NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_stock_non_negative CHECK (current_stock >= 0),
    CONSTRAINT chk_unit_cost_non_negative CHECK (unit_cost >= 0)
);
";

const STOCK_LOTS_SQL: &str = r"
CREATE TABLE stock_lots (
    id UUID PRIMARY KEY,
    item_id UUID NOT NULL REFERENCES inventory_items(id),
    lot_number VARCHAR(100) NOT NULL,
    quantity_received NUMERIC NOT NULL,
    quantity_remaining NUMERIC NOT NULL,
    unit_cost NUMERIC NOT NULL,
    received_on DATE NOT NULL,
    source_kind VARCHAR(32),
    source_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_lot_quantities CHECK (
        quantity_received > 0 AND quantity_remaining >= 0 AND quantity_remaining <= quantity_received
    )
);

CREATE INDEX idx_lots_item_received ON stock_lots(item_id, received_on, created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: guard_journal_entry_update
-- Only draft -> posted and posted -> void may change an entry
-- ============================================================
CREATE OR REPLACE FUNCTION guard_journal_entry_update()
RETURNS TRIGGER AS $$
BEGIN
    IF OLD.status = 'draft' AND NEW.status IN ('draft', 'posted') THEN
        RETURN NEW;
    END IF;

    IF OLD.status = 'posted' AND NEW.status = 'void' THEN
        RETURN NEW;
    END IF;

    RAISE EXCEPTION 'Journal entry % cannot change from % to %', OLD.reference, OLD.status, NEW.status;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_guard_journal_entry_update
BEFORE UPDATE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION guard_journal_entry_update();

-- ============================================================
-- FUNCTION: prevent_journal_mutation
-- Journal entries and lines are never deleted; lines never change
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_journal_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Journal records are append-only (% on %)', TG_OP, TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_entry_delete
BEFORE DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_journal_mutation();

CREATE TRIGGER trg_prevent_line_mutation
BEFORE UPDATE OR DELETE ON journal_entry_lines
FOR EACH ROW
EXECUTE FUNCTION prevent_journal_mutation();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_prevent_line_mutation ON journal_entry_lines;
DROP TRIGGER IF EXISTS trg_prevent_entry_delete ON journal_entries;
DROP TRIGGER IF EXISTS trg_guard_journal_entry_update ON journal_entries;

DROP FUNCTION IF EXISTS prevent_journal_mutation();
DROP FUNCTION IF EXISTS guard_journal_entry_update();

DROP TABLE IF EXISTS stock_lots CASCADE;
DROP TABLE IF EXISTS inventory_items CASCADE;
DROP TABLE IF EXISTS journal_entry_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP SEQUENCE IF EXISTS journal_entry_reference_seq;

DROP TYPE IF EXISTS line_type;
DROP TYPE IF EXISTS journal_status;
DROP TYPE IF EXISTS journal_entry_type;
DROP TYPE IF EXISTS account_category;
DROP TYPE IF EXISTS account_type;
";
