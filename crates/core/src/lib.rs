//! Cellar Door Core - Shared types library.
//!
//! This crate provides the domain types used by the storefront binary and
//! its integration tests.
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP, no
//! cookies. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Prices, email addresses and product categories

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
