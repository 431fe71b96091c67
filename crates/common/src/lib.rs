//! Common types and utilities for Paygate
//!
//! This crate provides shared types used across all Paygate crates.
//!
//! # Modules
//!
//! - [`error`] - Common error types
//! - [`types`] - Shared domain types (Address, Identity)

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
