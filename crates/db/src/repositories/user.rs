//! User repository: CRUD with cascading soft delete.
//!
//! Deleting a user also deactivates the user's home-bank accounts.
//! Accounts held at foreign banks are left alone; those banks own their
//! own records.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use kassa_core::engine::EngineError;
use kassa_shared::types::PageRequest;

use crate::entities::{accounts, users};
use crate::txn::{LockedTxn, map_db_err};

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Given name.
    pub name: String,
    /// Family name.
    pub surname: String,
    /// Date of birth.
    pub birthdate: NaiveDate,
}

/// Input for updating a user. Unset fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New given name.
    pub name: Option<String>,
    /// New family name.
    pub surname: Option<String>,
    /// New date of birth.
    pub birthdate: Option<NaiveDate>,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
    home_bank_id: i64,
    lock_timeout: Duration,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, home_bank_id: i64, lock_timeout: Duration) -> Self {
        Self {
            db,
            home_bank_id,
            lock_timeout,
        }
    }

    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PolicyViolation`] if a name is blank or the
    /// birthdate lies in the future.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, EngineError> {
        ensure_not_blank("name", &input.name)?;
        ensure_not_blank("surname", &input.surname)?;
        ensure_birthdate_passed(input.birthdate, Utc::now().date_naive())?;

        let user = users::ActiveModel {
            name: Set(input.name),
            surname: Set(input.surname),
            birthdate: Set(input.birthdate),
            active: Set(true),
            ..Default::default()
        };
        let created = user.insert(&self.db).await.map_err(map_db_err)?;

        info!(id = created.id, "user created");
        Ok(created)
    }

    /// Finds an active user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<users::Model>, EngineError> {
        let user = users::Entity::find_by_id(id)
            .filter(users::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(user)
    }

    /// Lists active users in id order with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, page: &PageRequest) -> Result<(Vec<users::Model>, u64), EngineError> {
        let query = users::Entity::find()
            .filter(users::Column::Active.eq(true))
            .order_by_asc(users::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let items = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok((items, total))
    }

    /// Updates a user's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the user is absent or deleted
    /// and [`EngineError::PolicyViolation`] for a blank name or a future
    /// birthdate.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<users::Model, EngineError> {
        let user = users::Entity::find_by_id(id)
            .filter(users::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("user {id}")))?;

        let mut user: users::ActiveModel = user.into();
        if let Some(name) = input.name {
            ensure_not_blank("name", &name)?;
            user.name = Set(name);
        }
        if let Some(surname) = input.surname {
            ensure_not_blank("surname", &surname)?;
            user.surname = Set(surname);
        }
        if let Some(birthdate) = input.birthdate {
            ensure_birthdate_passed(birthdate, Utc::now().date_naive())?;
            user.birthdate = Set(birthdate);
        }
        let updated = user.update(&self.db).await.map_err(map_db_err)?;
        Ok(updated)
    }

    /// Soft-deletes a user and the user's home-bank accounts, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the user is absent or already
    /// deleted.
    pub async fn soft_delete(&self, id: i64) -> Result<users::Model, EngineError> {
        let txn = LockedTxn::begin(&self.db, self.lock_timeout).await?;
        match self.soft_delete_in_txn(&txn, id).await {
            Ok((user, cascaded)) => {
                txn.commit().await?;
                info!(id, accounts = cascaded, "user soft-deleted");
                Ok(user)
            }
            Err(err) => {
                txn.rollback("delete_user").await?;
                Err(err)
            }
        }
    }

    async fn soft_delete_in_txn(
        &self,
        txn: &LockedTxn,
        id: i64,
    ) -> Result<(users::Model, u64), EngineError> {
        let user = users::Entity::find_by_id(id)
            .filter(users::Column::Active.eq(true))
            .lock_exclusive()
            .one(txn.transaction())
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("user {id}")))?;

        let cascaded = accounts::Entity::update_many()
            .col_expr(accounts::Column::Active, Expr::value(false))
            .filter(accounts::Column::UserId.eq(id))
            .filter(accounts::Column::BankId.eq(self.home_bank_id))
            .filter(accounts::Column::Active.eq(true))
            .exec(txn.transaction())
            .await
            .map_err(map_db_err)?
            .rows_affected;

        let mut user: users::ActiveModel = user.into();
        user.active = Set(false);
        let user = user.update(txn.transaction()).await.map_err(map_db_err)?;

        Ok((user, cascaded))
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

fn ensure_birthdate_passed(birthdate: NaiveDate, today: NaiveDate) -> Result<(), EngineError> {
    if birthdate > today {
        return Err(EngineError::PolicyViolation(format!(
            "birthdate {birthdate} lies in the future"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_future_birthdates_are_rejected() {
        let today = date(2026, 8, 23);

        assert!(ensure_birthdate_passed(date(2026, 8, 24), today).is_err());
        assert!(ensure_birthdate_passed(date(2026, 8, 23), today).is_ok());
        assert!(ensure_birthdate_passed(date(1987, 1, 15), today).is_ok());
    }
}
