//! Core ledger logic for Kassa.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. Every decision the balance-mutation engine takes — policy
//! gates, balance arithmetic, currency conversion, interest eligibility —
//! lives here as a pure function so it can be tested without a database.
//!
//! # Modules
//!
//! - `engine` - Balance-mutation planning, policy rules, and error taxonomy
//! - `currency` - Exchange-rate table and conversion
//! - `reports` - Receipt and statement generation (numbered side effects)

pub mod currency;
pub mod engine;
pub mod reports;
