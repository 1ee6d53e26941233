//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. The account repository additionally sequences every
//! balance mutation: rows are locked, `kassa-core` plans the outcome,
//! and the plan is persisted verbatim or the transaction is rolled back.

pub mod account;
pub mod bank;
pub mod transaction;
pub mod user;

pub use account::{
    AccountRepository, AccrualOutcome, CreateAccountInput, MutationOutcome, TransferOutcome,
};
pub use bank::{BankRepository, CreateBankInput, UpdateBankInput};
pub use transaction::TransactionRepository;
pub use user::{CreateUserInput, UpdateUserInput, UserRepository};
