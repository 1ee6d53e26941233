//! Bank repository: CRUD with cascading soft delete.

use std::time::Duration;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use kassa_core::engine::EngineError;
use kassa_shared::types::PageRequest;

use crate::entities::{accounts, banks};
use crate::txn::{LockedTxn, map_db_err};

/// Input for creating a bank.
#[derive(Debug, Clone)]
pub struct CreateBankInput {
    /// Display name.
    pub name: String,
}

/// Input for updating a bank. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateBankInput {
    /// New display name.
    pub name: Option<String>,
}

/// Bank repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct BankRepository {
    db: DatabaseConnection,
    home_bank_id: i64,
    lock_timeout: Duration,
}

impl BankRepository {
    /// Creates a new bank repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, home_bank_id: i64, lock_timeout: Duration) -> Self {
        Self {
            db,
            home_bank_id,
            lock_timeout,
        }
    }

    /// Creates a new bank.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PolicyViolation`] if the name is blank.
    pub async fn create(&self, input: CreateBankInput) -> Result<banks::Model, EngineError> {
        ensure_not_blank("bank name", &input.name)?;

        let bank = banks::ActiveModel {
            name: Set(input.name),
            active: Set(true),
            ..Default::default()
        };
        let created = bank.insert(&self.db).await.map_err(map_db_err)?;

        info!(id = created.id, name = %created.name, "bank created");
        Ok(created)
    }

    /// Finds an active bank by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<banks::Model>, EngineError> {
        let bank = banks::Entity::find_by_id(id)
            .filter(banks::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(bank)
    }

    /// Lists active banks in id order with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<(Vec<banks::Model>, u64), EngineError> {
        let query = banks::Entity::find()
            .filter(banks::Column::Active.eq(true))
            .order_by_asc(banks::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let items = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok((items, total))
    }

    /// Updates a bank's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the bank is absent or deleted
    /// and [`EngineError::PolicyViolation`] if the new name is blank.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateBankInput,
    ) -> Result<banks::Model, EngineError> {
        let bank = banks::Entity::find_by_id(id)
            .filter(banks::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("bank {id}")))?;

        let mut bank: banks::ActiveModel = bank.into();
        if let Some(name) = input.name {
            ensure_not_blank("bank name", &name)?;
            bank.name = Set(name);
        }
        let updated = bank.update(&self.db).await.map_err(map_db_err)?;
        Ok(updated)
    }

    /// Soft-deletes a bank and every account it still holds, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the bank is absent or already
    /// deleted and [`EngineError::PolicyViolation`] for the home bank,
    /// which cannot be deleted.
    pub async fn soft_delete(&self, id: i64) -> Result<banks::Model, EngineError> {
        if id == self.home_bank_id {
            return Err(EngineError::PolicyViolation(
                "the home bank cannot be deleted".to_string(),
            ));
        }

        let txn = LockedTxn::begin(&self.db, self.lock_timeout).await?;
        match self.soft_delete_in_txn(&txn, id).await {
            Ok((bank, cascaded)) => {
                txn.commit().await?;
                info!(id, accounts = cascaded, "bank soft-deleted");
                Ok(bank)
            }
            Err(err) => {
                txn.rollback("delete_bank").await?;
                Err(err)
            }
        }
    }

    async fn soft_delete_in_txn(
        &self,
        txn: &LockedTxn,
        id: i64,
    ) -> Result<(banks::Model, u64), EngineError> {
        let bank = banks::Entity::find_by_id(id)
            .filter(banks::Column::Active.eq(true))
            .lock_exclusive()
            .one(txn.transaction())
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("bank {id}")))?;

        let cascaded = accounts::Entity::update_many()
            .col_expr(accounts::Column::Active, Expr::value(false))
            .filter(accounts::Column::BankId.eq(id))
            .filter(accounts::Column::Active.eq(true))
            .exec(txn.transaction())
            .await
            .map_err(map_db_err)?
            .rows_affected;

        let mut bank: banks::ActiveModel = bank.into();
        bank.active = Set(false);
        let bank = bank.update(txn.transaction()).await.map_err(map_db_err)?;

        Ok((bank, cascaded))
    }
}

fn ensure_not_blank(field: &str, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::PolicyViolation(format!(
            "{field} must not be blank"
        )));
    }
    Ok(())
}
