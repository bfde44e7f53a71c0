//! Gift card purchase stub.
//!
//! Validates a purchase request and acknowledges it with a reference. No
//! payment is taken and nothing is issued; fulfilment happens outside the
//! storefront.

use cellar_door_core::{Email, EmailError, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Denominations offered, in whole dollars.
pub const DENOMINATIONS: [u32; 4] = [25, 50, 100, 250];

/// Maximum length of the personal message.
pub const MAX_MESSAGE_CHARS: usize = 500;

/// Maximum length of the sender name.
pub const MAX_SENDER_CHARS: usize = 80;

/// Gift card validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GiftCardError {
    #[error("amount must be one of 25, 50, 100 or 250")]
    UnsupportedAmount,
    #[error("invalid recipient email: {0}")]
    InvalidEmail(#[from] EmailError),
    #[error("message must be at most 500 characters")]
    MessageTooLong,
    #[error("sender name must be at most 80 characters")]
    SenderTooLong,
}

/// Incoming purchase request.
#[derive(Debug, Clone, Deserialize)]
pub struct GiftCardRequest {
    pub amount: u32,
    pub recipient_email: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A validated, acknowledged purchase.
#[derive(Debug, Clone, Serialize)]
pub struct GiftCardReceipt {
    pub status: &'static str,
    pub reference: Uuid,
    pub amount: String,
    pub recipient_email: Email,
}

/// Validate a request and produce a pending receipt.
///
/// # Errors
///
/// Returns the first validation failure found.
pub fn acknowledge(request: GiftCardRequest) -> Result<GiftCardReceipt, GiftCardError> {
    if !DENOMINATIONS.contains(&request.amount) {
        return Err(GiftCardError::UnsupportedAmount);
    }

    let recipient_email = Email::parse(&request.recipient_email)?;

    if request
        .message
        .as_deref()
        .is_some_and(|m| m.chars().count() > MAX_MESSAGE_CHARS)
    {
        return Err(GiftCardError::MessageTooLong);
    }
    if request
        .sender_name
        .as_deref()
        .is_some_and(|s| s.chars().count() > MAX_SENDER_CHARS)
    {
        return Err(GiftCardError::SenderTooLong);
    }

    Ok(GiftCardReceipt {
        status: "pending",
        reference: Uuid::new_v4(),
        amount: Price::usd_cents(i64::from(request.amount) * 100).to_string(),
        recipient_email,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(amount: u32) -> GiftCardRequest {
        GiftCardRequest {
            amount,
            recipient_email: "friend@example.com".to_string(),
            sender_name: Some("Sam".to_string()),
            message: Some("Cheers!".to_string()),
        }
    }

    #[test]
    fn test_acknowledge_valid() {
        let receipt = acknowledge(request(50)).unwrap();
        assert_eq!(receipt.status, "pending");
        assert_eq!(receipt.amount, "$50.00");
        assert_eq!(receipt.recipient_email.as_str(), "friend@example.com");
    }

    #[test]
    fn test_rejects_odd_amount() {
        assert_eq!(
            acknowledge(request(40)).unwrap_err(),
            GiftCardError::UnsupportedAmount
        );
        assert_eq!(
            acknowledge(request(0)).unwrap_err(),
            GiftCardError::UnsupportedAmount
        );
    }

    #[test]
    fn test_rejects_bad_email() {
        let mut req = request(25);
        req.recipient_email = "friend".to_string();
        assert!(matches!(
            acknowledge(req),
            Err(GiftCardError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_rejects_long_message() {
        let mut req = request(100);
        req.message = Some("x".repeat(MAX_MESSAGE_CHARS + 1));
        assert_eq!(acknowledge(req).unwrap_err(), GiftCardError::MessageTooLong);
    }

    #[test]
    fn test_rejects_long_sender() {
        let mut req = request(100);
        req.sender_name = Some("y".repeat(MAX_SENDER_CHARS + 1));
        assert_eq!(acknowledge(req).unwrap_err(), GiftCardError::SenderTooLong);
    }
}
