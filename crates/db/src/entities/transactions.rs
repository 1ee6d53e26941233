//! `SeaORM` Entity for transactions table.
//!
//! Rows are append-only: `sender_account_id` is set whenever money leaves an
//! account, `receiver_account_id` whenever money arrives.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub amount: Decimal,
    #[sea_orm(column_name = "type")]
    pub kind: TransactionType,
    pub currency: String,
    pub sender_account_id: Option<i64>,
    pub receiver_account_id: Option<i64>,
    pub created_date: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::SenderAccountId",
        to = "super::accounts::Column::Id"
    )]
    SenderAccount,
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::ReceiverAccountId",
        to = "super::accounts::Column::Id"
    )]
    ReceiverAccount,
}

impl ActiveModelBehavior for ActiveModel {}
