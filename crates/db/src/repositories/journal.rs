//! Journal repository: create, post and void journal entries in Postgres.
//!
//! The rules come from [`LedgerService`]; this module supplies atomicity.
//! Every operation runs in one database transaction. Posting and voiding lock
//! the entry row and then the touched account rows `FOR UPDATE` in ascending
//! id order, so concurrent postings to the same accounts serialize instead of
//! losing updates. Balance writes are additionally guarded by the row's
//! `version`.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, Statement, TransactionTrait,
};
use tally_core::accounts::Account;
use tally_core::ledger::{
    self, BalanceDirection, CreateJournalEntryInput, EntryReference, JournalEntry, LedgerError,
    LedgerService, LedgerSettings,
};
use tally_shared::types::{AccountId, JournalEntryId, PageRequest, PageResponse, UserId};
use uuid::Uuid;

use super::convert::{account_from_model, entry_from_models, source_columns, to_db_time};
use super::error::RepositoryError;
use crate::entities::{
    accounts, journal_entries, journal_entry_lines,
    sea_orm_active_enums::{self, JournalStatus},
};

const NEXT_REFERENCE_SQL: &str = "SELECT nextval('journal_entry_reference_seq') AS value";

/// Filter for listing journal entries. Every field narrows the result.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Filter by status.
    pub status: Option<ledger::JournalStatus>,
    /// Filter by entry type.
    pub entry_type: Option<ledger::JournalEntryType>,
    /// Filter by date range start.
    pub date_from: Option<NaiveDate>,
    /// Filter by date range end.
    pub date_to: Option<NaiveDate>,
}

/// Journal repository for entry lifecycle operations.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
    settings: LedgerSettings,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: LedgerSettings) -> Self {
        Self { db, settings }
    }

    /// Returns the ledger settings.
    #[must_use]
    pub const fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Creates a draft journal entry.
    ///
    /// The input is validated before a reference is drawn from the sequence.
    ///
    /// # Errors
    ///
    /// Returns a validation error (`InsufficientLines`, `NonPositiveAmount`,
    /// `Unbalanced`, `AccountNotFound`, `AccountInactive`) or a database
    /// error. Nothing is stored on error.
    pub async fn create_journal_entry(
        &self,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let txn = self.db.begin().await?;
        let entry = self.create_in(&txn, input, actor).await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Posts a draft entry and applies its lines to account balances.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `CannotPost`, `AccountInactive`, a
    /// concurrency conflict, or a database error. Nothing changes on error.
    pub async fn post_journal_entry(
        &self,
        id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut entry = load_entry(&txn, id, true).await?;
        self.post_in(&txn, &mut entry, actor).await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Voids a posted entry by applying the exact reversal of its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound`, `CannotVoid`, a concurrency conflict, or a
    /// database error. Nothing changes on error.
    pub async fn void_journal_entry(
        &self,
        id: JournalEntryId,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut entry = load_entry(&txn, id, true).await?;
        LedgerService::ensure_can_void(&entry)?;

        let mut staged = lock_accounts(&txn, &entry).await?;
        let expected = versions(&staged);
        LedgerService::apply_to_accounts(&entry, BalanceDirection::Void, &mut staged)?;
        save_accounts(&txn, &staged, &expected).await?;

        let now = Utc::now();
        LedgerService::mark_voided(&mut entry, actor, now);
        let update = journal_entries::ActiveModel {
            id: Unchanged(entry.id.into_inner()),
            status: Set(JournalStatus::Void),
            voided_by: Set(Some(actor.into_inner())),
            voided_at: Set(Some(to_db_time(now))),
            ..Default::default()
        };
        transition(&txn, update, entry.id, JournalStatus::Posted).await?;

        txn.commit().await?;
        tracing::info!(entry_id = %entry.id, reference = %entry.reference, "journal entry voided");
        Ok(entry)
    }

    /// Creates and posts an entry in one database transaction.
    ///
    /// # Errors
    ///
    /// Returns any error of [`Self::create_journal_entry`] or
    /// [`Self::post_journal_entry`]; on error nothing is stored.
    pub async fn record(
        &self,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let txn = self.db.begin().await?;
        let entry = self.record_in(&txn, input, actor).await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Finds an entry with its lines.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` if the entry does not exist.
    pub async fn find_entry(&self, id: JournalEntryId) -> Result<JournalEntry, RepositoryError> {
        load_entry(&self.db, id, false).await
    }

    /// Lists entries matching `filter` in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_entries(
        &self,
        filter: EntryFilter,
        page: PageRequest,
    ) -> Result<PageResponse<JournalEntry>, RepositoryError> {
        let mut query = journal_entries::Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(journal_entries::Column::Status.eq(JournalStatus::from(status)));
        }

        if let Some(entry_type) = filter.entry_type {
            query = query.filter(
                journal_entries::Column::EntryType
                    .eq(sea_orm_active_enums::JournalEntryType::from(entry_type)),
            );
        }

        if let Some(date_from) = filter.date_from {
            query = query.filter(journal_entries::Column::TransactionDate.gte(date_from));
        }

        if let Some(date_to) = filter.date_to {
            query = query.filter(journal_entries::Column::TransactionDate.lte(date_to));
        }

        let query = query
            .order_by_asc(journal_entries::Column::CreatedAt)
            .order_by_asc(journal_entries::Column::Reference);

        let total = query.clone().count(&self.db).await?;
        let models = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let entries = load_lines_for(&self.db, models).await?;
        Ok(PageResponse::new(entries, page, total))
    }

    /// Loads every posted entry with its lines.
    pub(crate) async fn posted_entries(&self) -> Result<Vec<JournalEntry>, RepositoryError> {
        let models = journal_entries::Entity::find()
            .filter(journal_entries::Column::Status.eq(JournalStatus::Posted))
            .order_by_asc(journal_entries::Column::CreatedAt)
            .all(&self.db)
            .await?;
        load_lines_for(&self.db, models).await
    }

    // ========== Transaction-scoped building blocks ==========

    /// Creates and posts an entry inside `txn`.
    pub(crate) async fn record_in(
        &self,
        txn: &DatabaseTransaction,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let mut entry = self.create_in(txn, input, actor).await?;
        self.post_in(txn, &mut entry, actor).await?;
        Ok(entry)
    }

    async fn create_in(
        &self,
        txn: &DatabaseTransaction,
        input: CreateJournalEntryInput,
        actor: UserId,
    ) -> Result<JournalEntry, RepositoryError> {
        let ids: Vec<Uuid> = input.lines.iter().map(|l| l.account_id.into_inner()).collect();
        let accounts: HashMap<AccountId, Account> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(ids))
            .all(txn)
            .await?
            .into_iter()
            .map(|m| {
                let account = account_from_model(m);
                (account.id, account)
            })
            .collect();

        LedgerService::validate_entry(&input, |id| accounts.get(&id))?;

        let reference = self.next_reference(txn).await?;
        let entry = LedgerService::build_draft(input, reference, actor, Utc::now());
        insert_entry(txn, &entry).await?;

        tracing::info!(
            entry_id = %entry.id,
            reference = %entry.reference,
            lines = entry.lines.len(),
            "journal entry created"
        );
        Ok(entry)
    }

    async fn post_in(
        &self,
        txn: &DatabaseTransaction,
        entry: &mut JournalEntry,
        actor: UserId,
    ) -> Result<(), RepositoryError> {
        LedgerService::ensure_can_post(entry)?;

        let mut staged = lock_accounts(txn, entry).await?;
        let expected = versions(&staged);
        LedgerService::apply_to_accounts(entry, BalanceDirection::Post, &mut staged)?;
        save_accounts(txn, &staged, &expected).await?;

        let now = Utc::now();
        LedgerService::mark_posted(entry, actor, now);
        let update = journal_entries::ActiveModel {
            id: Unchanged(entry.id.into_inner()),
            status: Set(JournalStatus::Posted),
            posted_by: Set(Some(actor.into_inner())),
            posted_at: Set(Some(to_db_time(now))),
            ..Default::default()
        };
        transition(txn, update, entry.id, JournalStatus::Draft).await?;

        tracing::info!(entry_id = %entry.id, reference = %entry.reference, "journal entry posted");
        Ok(())
    }

    async fn next_reference(
        &self,
        txn: &DatabaseTransaction,
    ) -> Result<EntryReference, RepositoryError> {
        let row = txn
            .query_one(Statement::from_string(
                txn.get_database_backend(),
                NEXT_REFERENCE_SQL,
            ))
            .await?
            .ok_or_else(|| DbErr::Custom("reference sequence returned no row".to_string()))?;
        let value: i64 = row.try_get("", "value")?;
        let number = u64::try_from(value)
            .map_err(|_| DbErr::Custom(format!("reference sequence returned {value}")))?;
        Ok(self.settings.reference_format.format(number))
    }
}

async fn insert_entry(
    txn: &DatabaseTransaction,
    entry: &JournalEntry,
) -> Result<(), RepositoryError> {
    let (source_kind, source_id) = source_columns(entry.source);

    journal_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        reference: Set(entry.reference.to_string()),
        transaction_date: Set(entry.transaction_date),
        entry_type: Set(entry.entry_type.into()),
        description: Set(entry.description.clone()),
        source_kind: Set(source_kind),
        source_id: Set(source_id),
        status: Set(entry.status.into()),
        created_by: Set(entry.created_by.into_inner()),
        created_at: Set(to_db_time(entry.created_at)),
        posted_by: Set(None),
        posted_at: Set(None),
        voided_by: Set(None),
        voided_at: Set(None),
    }
    .insert(txn)
    .await?;

    let mut lines = Vec::with_capacity(entry.lines.len());
    for (index, line) in entry.lines.iter().enumerate() {
        let line_number = i32::try_from(index)
            .map_err(|_| DbErr::Custom(format!("too many lines on {}", entry.reference)))?;
        lines.push(journal_entry_lines::ActiveModel {
            id: Set(line.id.into_inner()),
            journal_entry_id: Set(entry.id.into_inner()),
            line_number: Set(line_number),
            account_id: Set(line.account_id.into_inner()),
            line_type: Set(line.line_type.into()),
            amount: Set(line.amount),
            description: Set(line.description.clone()),
        });
    }
    journal_entry_lines::Entity::insert_many(lines).exec(txn).await?;
    Ok(())
}

/// Loads an entry and its lines, optionally locking the entry row.
pub(crate) async fn load_entry<C>(
    db: &C,
    id: JournalEntryId,
    for_update: bool,
) -> Result<JournalEntry, RepositoryError>
where
    C: ConnectionTrait,
{
    let mut query = journal_entries::Entity::find_by_id(id.into_inner());
    if for_update {
        query = query.lock_exclusive();
    }
    let model = query.one(db).await?.ok_or(LedgerError::EntryNotFound(id))?;

    let lines = journal_entry_lines::Entity::find()
        .filter(journal_entry_lines::Column::JournalEntryId.eq(model.id))
        .order_by_asc(journal_entry_lines::Column::LineNumber)
        .all(db)
        .await?;
    entry_from_models(model, lines)
}

async fn load_lines_for<C>(
    db: &C,
    models: Vec<journal_entries::Model>,
) -> Result<Vec<JournalEntry>, RepositoryError>
where
    C: ConnectionTrait,
{
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut lines: HashMap<Uuid, Vec<journal_entry_lines::Model>> = HashMap::new();
    for line in journal_entry_lines::Entity::find()
        .filter(journal_entry_lines::Column::JournalEntryId.is_in(ids))
        .order_by_asc(journal_entry_lines::Column::JournalEntryId)
        .order_by_asc(journal_entry_lines::Column::LineNumber)
        .all(db)
        .await?
    {
        lines.entry(line.journal_entry_id).or_default().push(line);
    }

    models
        .into_iter()
        .map(|model| {
            let entry_lines = lines.remove(&model.id).unwrap_or_default();
            entry_from_models(model, entry_lines)
        })
        .collect()
}

/// Locks the accounts `entry` touches, in ascending id order.
async fn lock_accounts(
    txn: &DatabaseTransaction,
    entry: &JournalEntry,
) -> Result<BTreeMap<AccountId, Account>, RepositoryError> {
    let ids = entry.account_ids();
    let locked: BTreeMap<AccountId, Account> = accounts::Entity::find()
        .filter(accounts::Column::Id.is_in(ids.iter().copied().map(AccountId::into_inner)))
        .order_by_asc(accounts::Column::Id)
        .lock_exclusive()
        .all(txn)
        .await?
        .into_iter()
        .map(|m| {
            let account = account_from_model(m);
            (account.id, account)
        })
        .collect();

    if let Some(missing) = ids.into_iter().find(|id| !locked.contains_key(id)) {
        return Err(LedgerError::AccountNotFound(missing).into());
    }
    Ok(locked)
}

fn versions(accounts: &BTreeMap<AccountId, Account>) -> HashMap<AccountId, i64> {
    accounts.iter().map(|(id, a)| (*id, a.version)).collect()
}

/// Writes staged balances, each guarded by the version that was read.
async fn save_accounts(
    txn: &DatabaseTransaction,
    staged: &BTreeMap<AccountId, Account>,
    expected: &HashMap<AccountId, i64>,
) -> Result<(), RepositoryError> {
    let now = to_db_time(Utc::now());
    for account in staged.values() {
        let expected_version = expected.get(&account.id).copied().unwrap_or_default();
        let result = accounts::Entity::update_many()
            .col_expr(accounts::Column::Balance, Expr::value(account.balance))
            .col_expr(accounts::Column::Version, Expr::value(account.version))
            .col_expr(accounts::Column::UpdatedAt, Expr::value(now))
            .filter(accounts::Column::Id.eq(account.id.into_inner()))
            .filter(accounts::Column::Version.eq(expected_version))
            .exec(txn)
            .await?;

        if result.rows_affected == 0 {
            let actual = accounts::Entity::find_by_id(account.id.into_inner())
                .one(txn)
                .await?
                .map_or(-1, |m| m.version);
            tracing::warn!(
                account_id = %account.id,
                expected = expected_version,
                actual,
                "account version mismatch"
            );
            return Err(LedgerError::AccountVersionMismatch {
                account_id: account.id,
                expected: expected_version,
                actual,
            }
            .into());
        }
    }
    Ok(())
}

/// Applies a status change only if the row still has status `from`.
async fn transition(
    txn: &DatabaseTransaction,
    update: journal_entries::ActiveModel,
    id: JournalEntryId,
    from: JournalStatus,
) -> Result<(), RepositoryError> {
    match journal_entries::Entity::update(update)
        .filter(journal_entries::Column::Status.eq(from))
        .exec(txn)
        .await
    {
        Ok(_) => Ok(()),
        Err(DbErr::RecordNotUpdated) => Err(LedgerError::ConcurrentModification(id).into()),
        Err(err) => Err(err.into()),
    }
}
