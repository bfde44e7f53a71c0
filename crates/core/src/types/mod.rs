//! Core types for Cellar Door.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod price;

pub use category::{ProductCategory, UnknownCategory};
pub use email::{Email, EmailError};
pub use price::{CurrencyCode, Price};
