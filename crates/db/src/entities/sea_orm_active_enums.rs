//! `SeaORM` Active Enums mapping Postgres enum types.

use kassa_core::engine::TransactionKind;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Postgres `transaction_type` enum.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money leaves an account.
    #[sea_orm(string_value = "withdraw")]
    Withdraw,
    /// Money arrives at an account.
    #[sea_orm(string_value = "refill")]
    Refill,
    /// Money moves between two accounts.
    #[sea_orm(string_value = "transfer")]
    Transfer,
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Withdraw => Self::Withdraw,
            TransactionKind::Refill => Self::Refill,
            TransactionKind::Transfer => Self::Transfer,
        }
    }
}

impl From<TransactionType> for TransactionKind {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Withdraw => Self::Withdraw,
            TransactionType::Refill => Self::Refill,
            TransactionType::Transfer => Self::Transfer,
        }
    }
}
