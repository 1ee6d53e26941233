//! `SeaORM` entities for the Kassa schema.

pub mod prelude;

pub mod accounts;
pub mod banks;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
