//! Bounded-wait transaction plumbing for balance mutations.
//!
//! Every mutating operation runs inside one database transaction that holds
//! `SELECT ... FOR UPDATE` row locks. A per-transaction `lock_timeout` bounds
//! how long a request waits on a contended account before it fails with a
//! retryable error instead of queueing forever.

use std::time::Duration;

use kassa_core::engine::StoreError;
use sea_orm::{
    ConnAcquireErr, ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, RuntimeErr,
    TransactionTrait,
};
use tracing::error;

/// SQLSTATE raised by Postgres when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// SQLSTATE raised by Postgres on unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// A database transaction with a row-lock timeout applied.
///
/// Created with `SET LOCAL lock_timeout`, which scopes the setting to this
/// transaction only. Must be finished through [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) on every exit path.
pub struct LockedTxn {
    txn: DatabaseTransaction,
}

impl LockedTxn {
    /// Begins a transaction and bounds its lock waits to `lock_timeout`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the transaction cannot be started or the
    /// timeout cannot be applied.
    pub async fn begin(
        db: &DatabaseConnection,
        lock_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let txn = db.begin().await.map_err(map_db_err)?;

        let millis = lock_timeout.as_millis();
        let sql = format!("SET LOCAL lock_timeout = '{millis}ms'");
        txn.execute_unprepared(&sql).await.map_err(map_db_err)?;

        Ok(Self { txn })
    }

    /// Returns the underlying transaction for executing queries.
    #[must_use]
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Commits the transaction, releasing all row locks.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the commit fails.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.txn.commit().await.map_err(map_db_err)
    }

    /// Rolls back the transaction, escalating loudly when the rollback
    /// itself fails.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RollbackFailed`] when the rollback does not go
    /// through; the transaction state is then unknown and the failure is
    /// also logged at `error` level.
    pub async fn rollback(self, operation: &str) -> Result<(), StoreError> {
        self.txn.rollback().await.map_err(|err| {
            error!(operation, error = %err, "rollback failed, transaction state unknown");
            StoreError::RollbackFailed {
                operation: operation.to_string(),
                reason: err.to_string(),
            }
        })
    }
}

/// Classifies a `SeaORM` error into the store-error taxonomy.
///
/// Lock-timeout expiry (SQLSTATE `55P03`) and pool-acquire timeouts become
/// [`StoreError::Timeout`]; everything else is a backend failure.
#[must_use]
pub fn map_db_err(err: DbErr) -> StoreError {
    if sqlstate(&err).as_deref() == Some(LOCK_NOT_AVAILABLE) {
        return StoreError::Timeout(err.to_string());
    }
    match err {
        DbErr::ConnectionAcquire(ConnAcquireErr::Timeout) => {
            StoreError::Timeout("connection pool acquire timed out".to_string())
        }
        other => StoreError::Backend(other.to_string()),
    }
}

/// Whether the error is a unique-constraint violation (SQLSTATE `23505`).
///
/// Lets callers turn a racing duplicate insert into a domain error instead
/// of a backend failure.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    sqlstate(err).as_deref() == Some(UNIQUE_VIOLATION)
}

/// Extracts the SQLSTATE code from a `SeaORM` error, when one is present.
fn sqlstate(err: &DbErr) -> Option<String> {
    match err {
        DbErr::Query(RuntimeErr::SqlxError(source))
        | DbErr::Exec(RuntimeErr::SqlxError(source))
        | DbErr::Conn(RuntimeErr::SqlxError(source)) => source
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_acquire_timeout_maps_to_timeout() {
        let err = DbErr::ConnectionAcquire(ConnAcquireErr::Timeout);

        assert!(matches!(map_db_err(err), StoreError::Timeout(_)));
    }

    #[test]
    fn test_plain_errors_map_to_backend() {
        let err = DbErr::Custom("boom".to_string());

        assert!(matches!(map_db_err(err), StoreError::Backend(_)));
    }

    #[test]
    fn test_custom_errors_carry_no_sqlstate() {
        let err = DbErr::Custom("boom".to_string());

        assert_eq!(sqlstate(&err), None);
        assert!(!is_unique_violation(&err));
    }
}
