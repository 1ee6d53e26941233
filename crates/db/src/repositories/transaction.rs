//! Transaction repository for the append-only ledger log.
//!
//! Records are only ever inserted, by the account repository inside its
//! locked transactions; everything else here is reads. History stays
//! queryable after the account it belongs to is soft-deleted.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DatabaseTransaction, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Set,
};

use kassa_core::engine::{EngineError, TransactionDraft};

use crate::entities::{accounts, banks, transactions, users};
use crate::txn::map_db_err;

/// An account row together with its owner, bank, and period history.
#[derive(Debug, Clone)]
pub struct AccountHistory {
    /// The account, possibly soft-deleted.
    pub account: accounts::Model,
    /// Owning user.
    pub user: users::Model,
    /// Holding bank.
    pub bank: banks::Model,
    /// Transactions touching the account in the period, oldest first.
    pub transactions: Vec<transactions::Model>,
}

/// Transaction repository for ledger queries.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds all transactions touching an account within a closed date
    /// period, oldest first.
    ///
    /// The account is looked up without the active filter: the history of
    /// a deleted account remains readable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if no account has this number and
    /// [`EngineError::PolicyViolation`] if the period is inverted.
    pub async fn find_for_account_in_period(
        &self,
        number: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(accounts::Model, Vec<transactions::Model>), EngineError> {
        ensure_period(from, to)?;
        let account = self.find_account_any(number).await?;
        let transactions = self.in_period(account.id, from, to).await?;
        Ok((account, transactions))
    }

    /// Loads everything a statement needs: the account, its owner, its
    /// bank, and the period's transactions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if no account has this number and
    /// [`EngineError::PolicyViolation`] if the period is inverted.
    pub async fn account_history(
        &self,
        number: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<AccountHistory, EngineError> {
        ensure_period(from, to)?;
        let account = self.find_account_any(number).await?;

        let user = account
            .find_related(users::Entity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("user {}", account.user_id)))?;
        let bank = account
            .find_related(banks::Entity)
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("bank {}", account.bank_id)))?;

        let transactions = self.in_period(account.id, from, to).await?;

        Ok(AccountHistory {
            account,
            user,
            bank,
            transactions,
        })
    }

    async fn find_account_any(&self, number: &str) -> Result<accounts::Model, EngineError> {
        accounts::Entity::find()
            .filter(accounts::Column::Number.eq(number))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or_else(|| EngineError::NotFound(format!("account {number}")))
    }

    async fn in_period(
        &self,
        account_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<transactions::Model>, EngineError> {
        let (start, end) = period_bounds(from, to);
        let records = transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(transactions::Column::SenderAccountId.eq(account_id))
                    .add(transactions::Column::ReceiverAccountId.eq(account_id)),
            )
            .filter(transactions::Column::CreatedDate.gte(start))
            .filter(transactions::Column::CreatedDate.lt(end))
            .order_by_asc(transactions::Column::CreatedDate)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(records)
    }
}

/// Appends one ledger record inside an already-open transaction.
///
/// Id and timestamp come from the database.
pub(crate) async fn append(
    txn: &DatabaseTransaction,
    draft: &TransactionDraft,
) -> Result<transactions::Model, EngineError> {
    let record = transactions::ActiveModel {
        amount: Set(draft.amount),
        kind: Set(draft.kind.into()),
        currency: Set(draft.currency.clone()),
        sender_account_id: Set(draft.sender_account_id),
        receiver_account_id: Set(draft.receiver_account_id),
        ..Default::default()
    };
    let inserted = record.insert(txn).await.map_err(map_db_err)?;
    Ok(inserted)
}

fn ensure_period(from: NaiveDate, to: NaiveDate) -> Result<(), EngineError> {
    if from > to {
        return Err(EngineError::PolicyViolation(format!(
            "period start {from} is after its end {to}"
        )));
    }
    Ok(())
}

/// Converts a closed date period into half-open UTC timestamp bounds.
fn period_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end = match to.succ_opt() {
        Some(next) => next.and_time(NaiveTime::MIN).and_utc(),
        None => DateTime::<Utc>::MAX_UTC,
    };
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_bounds_cover_the_whole_last_day() {
        let (start, end) = period_bounds(date(2024, 3, 1), date(2024, 3, 31));

        assert_eq!(start, date(2024, 3, 1).and_time(NaiveTime::MIN).and_utc());
        assert_eq!(end, date(2024, 4, 1).and_time(NaiveTime::MIN).and_utc());

        let last_moment = date(2024, 3, 31)
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap()
            .and_utc();
        assert!(last_moment >= start && last_moment < end);
    }

    #[test]
    fn test_single_day_period_is_valid() {
        assert!(ensure_period(date(2024, 3, 15), date(2024, 3, 15)).is_ok());

        let (start, end) = period_bounds(date(2024, 3, 15), date(2024, 3, 15));
        assert_eq!(end - start, chrono::TimeDelta::days(1));
    }

    #[test]
    fn test_inverted_period_is_rejected() {
        let err = ensure_period(date(2024, 4, 1), date(2024, 3, 31)).unwrap_err();
        assert!(matches!(err, EngineError::PolicyViolation(_)));
    }
}
