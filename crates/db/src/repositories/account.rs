//! Account repository for chart of accounts database operations.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tally_core::accounts::{Account, AccountCode, AccountMap, NewAccount, validate_parent};
use tally_core::ledger::LedgerError;
use tally_shared::types::AccountId;

use super::convert::{account_from_model, to_db_time};
use super::error::RepositoryError;
use crate::entities::accounts;

/// Account repository for chart of accounts operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Opens a new account.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccountCode` if the code is taken, `AccountNotFound`
    /// for an unknown parent, or `InvalidParent` if the parent has a
    /// different type.
    pub async fn create(&self, input: NewAccount) -> Result<Account, RepositoryError> {
        let txn = self.db.begin().await?;
        let account = insert_account(&txn, input).await?;
        txn.commit().await?;
        Ok(account)
    }

    /// Finds an account by id.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn find_by_id(&self, id: AccountId) -> Result<Account, RepositoryError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(account_from_model)
            .ok_or_else(|| LedgerError::AccountNotFound(id).into())
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns `AccountCodeNotFound` if no account has the code.
    pub async fn find_by_code(&self, code: &str) -> Result<Account, RepositoryError> {
        find_by_code(&self.db, code)
            .await?
            .ok_or_else(|| LedgerError::AccountCodeNotFound(code.to_string()).into())
    }

    /// Lists every account, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<Account>, RepositoryError> {
        let models = accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(account_from_model).collect())
    }

    /// Deactivates an account. Its history and balance are kept.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` if the account does not exist.
    pub async fn deactivate(&self, id: AccountId) -> Result<Account, RepositoryError> {
        let model = accounts::ActiveModel {
            id: Unchanged(id.into_inner()),
            is_active: Set(false),
            updated_at: Set(to_db_time(Utc::now())),
            ..Default::default()
        };
        let updated = model.update(&self.db).await.map_err(|err| match err {
            sea_orm::DbErr::RecordNotUpdated => LedgerError::AccountNotFound(id).into(),
            other => RepositoryError::Database(other),
        })?;

        tracing::info!(account_id = %id, code = %updated.code, "account deactivated");
        Ok(account_from_model(updated))
    }

    /// Creates every account of the fixed code table that is not there yet.
    ///
    /// Returns the accounts that were created. Running it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn seed_chart(&self) -> Result<Vec<Account>, RepositoryError> {
        let txn = self.db.begin().await?;
        let mut created = Vec::new();

        for code in AccountCode::ALL {
            if find_by_code(&txn, code.code()).await?.is_none() {
                created.push(insert_account(&txn, code.seed()).await?);
            }
        }

        txn.commit().await?;
        tracing::info!(created = created.len(), "chart of accounts seeded");
        Ok(created)
    }

    /// Resolves the fixed account-code table against the active chart.
    ///
    /// # Errors
    ///
    /// Returns `MissingAccounts` if any required code has no active account.
    pub async fn account_map(&self) -> Result<AccountMap, RepositoryError> {
        let active: Vec<Account> = accounts::Entity::find()
            .filter(accounts::Column::IsActive.eq(true))
            .all(&self.db)
            .await?
            .into_iter()
            .map(account_from_model)
            .collect();
        Ok(AccountMap::from_accounts(&active)?)
    }
}

async fn find_by_code<C>(db: &C, code: &str) -> Result<Option<Account>, RepositoryError>
where
    C: ConnectionTrait,
{
    Ok(accounts::Entity::find()
        .filter(accounts::Column::Code.eq(code))
        .one(db)
        .await?
        .map(account_from_model))
}

async fn insert_account<C>(db: &C, input: NewAccount) -> Result<Account, RepositoryError>
where
    C: ConnectionTrait,
{
    if find_by_code(db, &input.code).await?.is_some() {
        return Err(LedgerError::DuplicateAccountCode(input.code).into());
    }

    let account = Account::open(input);
    if let Some(parent_id) = account.parent_id {
        let parent = accounts::Entity::find_by_id(parent_id.into_inner())
            .one(db)
            .await?
            .map(account_from_model)
            .ok_or(LedgerError::AccountNotFound(parent_id))?;
        validate_parent(&account, &parent)?;
    }

    let now = to_db_time(Utc::now());
    accounts::ActiveModel {
        id: Set(account.id.into_inner()),
        code: Set(account.code.clone()),
        name: Set(account.name.clone()),
        account_type: Set(account.account_type.into()),
        category: Set(account.category.into()),
        parent_id: Set(account.parent_id.map(AccountId::into_inner)),
        balance: Set(account.balance),
        is_active: Set(account.is_active),
        version: Set(account.version),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    tracing::info!(
        account_id = %account.id,
        code = %account.code,
        account_type = %account.account_type,
        "account opened"
    );
    Ok(account)
}
