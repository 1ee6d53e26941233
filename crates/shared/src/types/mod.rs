//! Common types used across the application.

pub mod number;
pub mod pagination;

pub use number::{ACCOUNT_NUMBER_LEN, is_valid_account_number};
pub use pagination::{PageRequest, PageResponse};
