//! Cookie-backed shopping cart.
//!
//! The whole cart lives in the `cellar_cart` cookie as
//! `handle:qty|handle:qty`. Parsing is lenient (bad segments are dropped);
//! mutation is strict (bad input is an error).

use thiserror::Error;

use crate::catalog::is_valid_handle;

/// Cart cookie name.
pub const CART_COOKIE: &str = "cellar_cart";

/// Maximum quantity of a single product.
pub const MAX_QUANTITY: u32 = 24;

/// Maximum number of distinct products.
pub const MAX_LINES: usize = 20;

/// Cart mutation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("invalid product handle")]
    InvalidHandle,
    #[error("quantity must be between 1 and 24")]
    InvalidQuantity,
    #[error("cart is full")]
    TooManyLines,
}

/// One product in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub handle: String,
    pub quantity: u32,
}

/// Shopping cart, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Parse a cookie value, dropping anything malformed.
    ///
    /// Duplicate handles are merged; lines past [`MAX_LINES`] are ignored.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut cart = Self::default();
        for segment in value.split('|') {
            let Some((handle, qty)) = segment.split_once(':') else {
                continue;
            };
            let Ok(quantity) = qty.parse::<u32>() else {
                continue;
            };
            if let Err(e) = cart.add(handle, quantity) {
                tracing::debug!(segment, error = %e, "Dropping cart cookie segment");
            }
        }
        cart
    }

    /// Serialize for the cookie. Empty carts encode to an empty string.
    #[must_use]
    pub fn encode(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}:{}", line.handle, line.quantity))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Add `quantity` of `handle`, merging with an existing line.
    ///
    /// Merged quantities are capped at [`MAX_QUANTITY`].
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid handle, a quantity outside
    /// `1..=MAX_QUANTITY`, or a new line on a full cart.
    pub fn add(&mut self, handle: &str, quantity: u32) -> Result<(), CartError> {
        if !is_valid_handle(handle) {
            return Err(CartError::InvalidHandle);
        }
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity);
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.handle == handle) {
            line.quantity = (line.quantity + quantity).min(MAX_QUANTITY);
            return Ok(());
        }

        if self.lines.len() >= MAX_LINES {
            return Err(CartError::TooManyLines);
        }
        self.lines.push(CartLine {
            handle: handle.to_string(),
            quantity,
        });
        Ok(())
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total number of bottles.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
