//! Account repository: CRUD plus every locked balance mutation.
//!
//! Mutations follow one sequence: open a transaction with a bounded lock
//! wait, lock the account rows, let `kassa-core` plan the outcome from the
//! locked snapshots, persist the plan verbatim, append the transaction
//! record, and commit. Any error on the way rolls the transaction back.

use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::info;

use kassa_core::currency::RateTable;
use kassa_core::engine::{self, AccountSnapshot, EngineError, MutationPlan};
use kassa_shared::types::{ACCOUNT_NUMBER_LEN, PageRequest, is_valid_account_number};

use super::transaction;
use crate::entities::{accounts, banks, transactions, users};
use crate::txn::{LockedTxn, is_unique_violation, map_db_err};

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Account number (exactly 16 ASCII digits).
    pub number: String,
    /// Currency code, e.g. `USD`.
    pub currency: String,
    /// Owning user id.
    pub user_id: i64,
    /// Holding bank id.
    pub bank_id: i64,
    /// Opening balance; zero when omitted.
    pub balance: Option<Decimal>,
}

/// Result of a withdrawal or deposit.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// Account row after the write.
    pub account: accounts::Model,
    /// Appended transaction record.
    pub transaction: transactions::Model,
}

/// Result of a transfer.
#[derive(Debug, Clone)]
pub struct TransferOutcome {
    /// Sender row after the debit.
    pub sender: accounts::Model,
    /// Receiver row after the credit.
    pub receiver: accounts::Model,
    /// Amount credited, in the receiver's currency.
    pub credited: Decimal,
    /// Appended transaction record.
    pub transaction: transactions::Model,
}

/// Result of an interest accrual tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualOutcome {
    /// Not the last day of a month; nothing ran.
    Skipped,
    /// Interest was applied.
    Applied {
        /// Number of home-bank accounts updated.
        accounts: u64,
    },
}

/// Account repository for CRUD operations and balance mutations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    home_bank_id: i64,
    rates: RateTable,
    lock_timeout: Duration,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        home_bank_id: i64,
        rates: RateTable,
        lock_timeout: Duration,
    ) -> Self {
        Self {
            db,
            home_bank_id,
            rates,
            lock_timeout,
        }
    }

    /// Creates a new account with validation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::PolicyViolation`] if the number is malformed
    /// or already taken, or the opening balance is negative, and
    /// [`EngineError::NotFound`] if the owning user or holding bank does
    /// not exist or is deleted.
    pub async fn create(&self, input: CreateAccountInput) -> Result<accounts::Model, EngineError> {
        if !is_valid_account_number(&input.number) {
            return Err(EngineError::PolicyViolation(format!(
                "account number must be exactly {ACCOUNT_NUMBER_LEN} digits"
            )));
        }

        let balance = input.balance.unwrap_or(Decimal::ZERO);
        if balance < Decimal::ZERO {
            return Err(EngineError::PolicyViolation(format!(
                "opening balance must not be negative, got {balance}"
            )));
        }

        let user = users::Entity::find_by_id(input.user_id)
            .filter(users::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if user.is_none() {
            return Err(EngineError::NotFound(format!("user {}", input.user_id)));
        }

        let bank = banks::Entity::find_by_id(input.bank_id)
            .filter(banks::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if bank.is_none() {
            return Err(EngineError::NotFound(format!("bank {}", input.bank_id)));
        }

        // Deleted accounts keep their number, so the duplicate check does
        // not filter on `active`.
        let existing = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(&input.number))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        if existing.is_some() {
            return Err(duplicate_number(&input.number));
        }

        let account = accounts::ActiveModel {
            number: Set(input.number.clone()),
            balance: Set(balance),
            currency: Set(input.currency),
            user_id: Set(input.user_id),
            bank_id: Set(input.bank_id),
            active: Set(true),
            ..Default::default()
        };

        // The unique index catches a concurrent create that slipped past
        // the pre-check.
        let created = account.insert(&self.db).await.map_err(|err| {
            if is_unique_violation(&err) {
                duplicate_number(&input.number)
            } else {
                EngineError::from(map_db_err(err))
            }
        })?;

        info!(id = created.id, number = %created.number, "account created");
        Ok(created)
    }

    /// Finds an active account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<accounts::Model>, EngineError> {
        let account = accounts::Entity::find_by_id(id)
            .filter(accounts::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(account)
    }

    /// Finds an active account by its 16-digit number.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_number(
        &self,
        number: &str,
    ) -> Result<Option<accounts::Model>, EngineError> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number))
            .filter(accounts::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(account)
    }

    /// Lists active accounts in id order with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<(Vec<accounts::Model>, u64), EngineError> {
        let query = accounts::Entity::find()
            .filter(accounts::Column::Active.eq(true))
            .order_by_asc(accounts::Column::Id);

        let total = query.clone().count(&self.db).await.map_err(map_db_err)?;
        let items = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok((items, total))
    }

    /// Withdraws `amount` from the account and appends a `withdraw` record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the account is absent or
    /// deleted, [`EngineError::PolicyViolation`] if it is not held at the
    /// home bank or the amount is not positive, and
    /// [`EngineError::InsufficientFunds`] if the balance cannot cover it.
    pub async fn withdraw(
        &self,
        number: &str,
        amount: Decimal,
    ) -> Result<MutationOutcome, EngineError> {
        let txn = LockedTxn::begin(&self.db, self.lock_timeout).await?;
        match self.withdraw_in_txn(&txn, number, amount).await {
            Ok(outcome) => {
                txn.commit().await?;
                info!(number, %amount, balance = %outcome.account.balance, "withdrawal committed");
                Ok(outcome)
            }
            Err(err) => {
                txn.rollback("withdraw").await?;
                Err(err)
            }
        }
    }

    async fn withdraw_in_txn(
        &self,
        txn: &LockedTxn,
        number: &str,
        amount: Decimal,
    ) -> Result<MutationOutcome, EngineError> {
        let account = lock_account(txn.transaction(), number).await?;
        let plan = engine::plan_withdrawal(&snapshot(&account), amount, self.home_bank_id)?;
        apply_plan(txn.transaction(), account, plan).await
    }

    /// Deposits `amount` into the account and appends a `refill` record.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the account is absent or
    /// deleted and [`EngineError::PolicyViolation`] if it is not held at
    /// the home bank or the amount is not positive.
    pub async fn deposit(
        &self,
        number: &str,
        amount: Decimal,
    ) -> Result<MutationOutcome, EngineError> {
        let txn = LockedTxn::begin(&self.db, self.lock_timeout).await?;
        match self.deposit_in_txn(&txn, number, amount).await {
            Ok(outcome) => {
                txn.commit().await?;
                info!(number, %amount, balance = %outcome.account.balance, "deposit committed");
                Ok(outcome)
            }
            Err(err) => {
                txn.rollback("deposit").await?;
                Err(err)
            }
        }
    }

    async fn deposit_in_txn(
        &self,
        txn: &LockedTxn,
        number: &str,
        amount: Decimal,
    ) -> Result<MutationOutcome, EngineError> {
        let account = lock_account(txn.transaction(), number).await?;
        let plan = engine::plan_deposit(&snapshot(&account), amount, self.home_bank_id)?;
        apply_plan(txn.transaction(), account, plan).await
    }

    /// Transfers `amount` from the sender to the receiver, converting into
    /// the receiver's currency, and appends a single `transfer` record.
    ///
    /// Both rows lock in ascending account-number order regardless of which
    /// side initiated, so two opposite-direction transfers cannot deadlock.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if either account is absent or
    /// deleted, [`EngineError::PolicyViolation`] if both sides are the same
    /// account, neither is held at the home bank, or the amount is not
    /// positive, [`EngineError::InsufficientFunds`] if the sender cannot
    /// cover the debit, and [`EngineError::Configuration`] if the currency
    /// pair has no configured rate.
    pub async fn transfer(
        &self,
        sender_number: &str,
        receiver_number: &str,
        amount: Decimal,
    ) -> Result<TransferOutcome, EngineError> {
        if sender_number == receiver_number {
            // Rejected before any lock is taken.
            return Err(EngineError::PolicyViolation(
                "cannot transfer from an account to itself".to_string(),
            ));
        }

        let txn = LockedTxn::begin(&self.db, self.lock_timeout).await?;
        match self
            .transfer_in_txn(&txn, sender_number, receiver_number, amount)
            .await
        {
            Ok(outcome) => {
                txn.commit().await?;
                info!(
                    sender = sender_number,
                    receiver = receiver_number,
                    %amount,
                    credited = %outcome.credited,
                    "transfer committed"
                );
                Ok(outcome)
            }
            Err(err) => {
                txn.rollback("transfer").await?;
                Err(err)
            }
        }
    }

    async fn transfer_in_txn(
        &self,
        txn: &LockedTxn,
        sender_number: &str,
        receiver_number: &str,
        amount: Decimal,
    ) -> Result<TransferOutcome, EngineError> {
        let (first, second) = engine::lock_order(sender_number, receiver_number);
        let first_row = lock_account(txn.transaction(), first).await?;
        let second_row = lock_account(txn.transaction(), second).await?;

        let (sender_row, receiver_row) = if first_row.number == sender_number {
            (first_row, second_row)
        } else {
            (second_row, first_row)
        };

        let plan = engine::plan_transfer(
            &snapshot(&sender_row),
            &snapshot(&receiver_row),
            amount,
            self.home_bank_id,
            &self.rates,
        )?;

        let sender = update_balance(txn.transaction(), sender_row, plan.sender_new_balance).await?;
        let receiver =
            update_balance(txn.transaction(), receiver_row, plan.receiver_new_balance).await?;
        let record = transaction::append(txn.transaction(), &plan.draft).await?;

        Ok(TransferOutcome {
            sender,
            receiver,
            credited: plan.credited,
            transaction: record,
        })
    }

    /// Applies monthly interest to every active home-bank account.
    ///
    /// Runs only when `today` is the last day of its month; any other day
    /// is reported as skipped. The multiplication happens in a single
    /// statement, so a tick updates every eligible account or none.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or its row locks time out.
    pub async fn apply_monthly_interest(
        &self,
        rate: Decimal,
        today: NaiveDate,
    ) -> Result<AccrualOutcome, EngineError> {
        if !engine::is_accrual_day(today) {
            return Ok(AccrualOutcome::Skipped);
        }

        let factor = engine::accrual_factor(rate);
        let txn = LockedTxn::begin(&self.db, self.lock_timeout).await?;
        let result = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).mul(factor),
            )
            .filter(accounts::Column::BankId.eq(self.home_bank_id))
            .filter(accounts::Column::Active.eq(true))
            .exec(txn.transaction())
            .await;

        match result {
            Ok(updated) => {
                txn.commit().await?;
                info!(
                    accounts = updated.rows_affected,
                    %factor,
                    "monthly interest applied"
                );
                Ok(AccrualOutcome::Applied {
                    accounts: updated.rows_affected,
                })
            }
            Err(err) => {
                txn.rollback("apply_monthly_interest").await?;
                Err(EngineError::from(map_db_err(err)))
            }
        }
    }

    /// Soft-deletes an account (home-bank only).
    ///
    /// The row stays behind for transaction history; it just stops matching
    /// the active filter every read and mutation applies.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if the account is absent or
    /// already deleted and [`EngineError::PolicyViolation`] if it is held
    /// at a foreign bank.
    pub async fn soft_delete(&self, id: i64) -> Result<accounts::Model, EngineError> {
        let account = accounts::Entity::find_by_id(id)
            .filter(accounts::Column::Active.eq(true))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("account {id}")))?;

        engine::ensure_home_bank(&snapshot(&account), self.home_bank_id)?;

        let mut account: accounts::ActiveModel = account.into();
        account.active = Set(false);
        let deleted = account.update(&self.db).await.map_err(map_db_err)?;

        info!(id, number = %deleted.number, "account soft-deleted");
        Ok(deleted)
    }
}

async fn lock_account(
    txn: &DatabaseTransaction,
    number: &str,
) -> Result<accounts::Model, EngineError> {
    accounts::Entity::find()
        .filter(accounts::Column::Number.eq(number))
        .filter(accounts::Column::Active.eq(true))
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(map_db_err)?
        .ok_or_else(|| EngineError::NotFound(format!("account {number}")))
}

async fn update_balance(
    txn: &DatabaseTransaction,
    account: accounts::Model,
    new_balance: Decimal,
) -> Result<accounts::Model, EngineError> {
    let mut account: accounts::ActiveModel = account.into();
    account.balance = Set(new_balance);
    let updated = account.update(txn).await.map_err(map_db_err)?;
    Ok(updated)
}

async fn apply_plan(
    txn: &DatabaseTransaction,
    account: accounts::Model,
    plan: MutationPlan,
) -> Result<MutationOutcome, EngineError> {
    let account = update_balance(txn, account, plan.new_balance).await?;
    let record = transaction::append(txn, &plan.draft).await?;
    Ok(MutationOutcome {
        account,
        transaction: record,
    })
}

fn snapshot(model: &accounts::Model) -> AccountSnapshot {
    AccountSnapshot {
        id: model.id,
        number: model.number.clone(),
        balance: model.balance,
        currency: model.currency.clone(),
        user_id: model.user_id,
        bank_id: model.bank_id,
        active: model.active,
    }
}

fn duplicate_number(number: &str) -> EngineError {
    EngineError::PolicyViolation(format!("account number {number} is already taken"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_snapshot_carries_every_policy_field() {
        let model = accounts::Model {
            id: 7,
            number: "1000000000000001".to_string(),
            balance: dec!(12.34),
            currency: "USD".to_string(),
            user_id: 3,
            bank_id: 1,
            created_date: chrono::Utc
                .with_ymd_and_hms(2024, 3, 15, 10, 30, 0)
                .unwrap()
                .into(),
            active: true,
        };

        let snap = snapshot(&model);

        assert_eq!(snap.id, 7);
        assert_eq!(snap.number, "1000000000000001");
        assert_eq!(snap.balance, dec!(12.34));
        assert_eq!(snap.currency, "USD");
        assert_eq!(snap.user_id, 3);
        assert_eq!(snap.bank_id, 1);
        assert!(snap.active);
    }
}
