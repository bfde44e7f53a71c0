//! JSON API handlers.

pub mod admin;
pub mod diagnostics;
pub mod gift_cards;
