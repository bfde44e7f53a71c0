//! Gift card purchase endpoint.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::services::gift_cards::{self, GiftCardRequest};

/// `POST /api/gift-cards`
///
/// Validates the request and acknowledges it with 202 and a pending
/// receipt. Nothing is charged.
///
/// # Errors
///
/// Returns 400 for a malformed body or any validation failure.
#[instrument(skip(body))]
pub async fn purchase(
    body: Result<Json<GiftCardRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let receipt = gift_cards::acknowledge(request).map_err(|e| {
        tracing::debug!(error = %e, "Gift card request rejected");
        AppError::BadRequest(e.to_string())
    })?;

    let reference = receipt.reference.to_string();
    add_breadcrumb(
        "gift_card",
        "Gift card requested",
        Some(&[("reference", reference.as_str()), ("amount", receipt.amount.as_str())]),
    );
    tracing::info!(
        %reference,
        amount = %receipt.amount,
        recipient = %receipt.recipient_email.masked(),
        "Gift card request acknowledged"
    );

    Ok((StatusCode::ACCEPTED, Json(receipt)).into_response())
}
