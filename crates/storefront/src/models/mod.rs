//! Domain models for the storefront.

pub mod cart;

pub use cart::{CART_COOKIE, Cart, CartError, CartLine};
