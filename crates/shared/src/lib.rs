//! Shared configuration and common types for Kassa.
//!
//! This crate provides the pieces every other crate agrees on:
//! - Configuration loading (files + environment overrides)
//! - Pagination types for list endpoints
//! - Account number validation

pub mod config;
pub mod types;

pub use config::AppConfig;
pub use types::{PageRequest, PageResponse};
