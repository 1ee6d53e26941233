//! Balance-mutation engine logic.
//!
//! This module implements the decision half of every engine operation:
//! - Policy rules (home-bank gates, sufficient funds, positive amounts)
//! - Mutation planning (new balances plus the transaction draft to append)
//! - Canonical lock ordering for two-row operations
//! - Interest accrual eligibility and arithmetic
//! - The closed error taxonomy every operation reports through
//!
//! The persistence layer sequences these decisions inside a database
//! transaction; nothing in here touches a connection.

pub mod error;
pub mod interest;
pub mod policy;
pub mod types;

#[cfg(test)]
mod policy_props;

pub use error::{EngineError, StoreError};
pub use interest::{accrual_factor, accrue, is_accrual_day};
pub use policy::{
    ensure_home_bank, ensure_positive_amount, ensure_sufficient_funds, lock_order, plan_deposit,
    plan_transfer, plan_withdrawal,
};
pub use types::{AccountSnapshot, MutationPlan, TransactionDraft, TransactionKind, TransferPlan};
