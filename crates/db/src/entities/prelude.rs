//! `SeaORM` Entity prelude re-exporting all entities.

pub use super::accounts::Entity as Accounts;
pub use super::banks::Entity as Banks;
pub use super::transactions::Entity as Transactions;
pub use super::users::Entity as Users;
