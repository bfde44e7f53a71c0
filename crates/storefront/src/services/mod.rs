//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Admin password verification and signed session tokens
//! - `gift_cards` - Gift card purchase validation (no payment)

pub mod auth;
pub mod gift_cards;
