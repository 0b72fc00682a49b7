//! Typed request and response bodies for the Amazon Pay v2 REST API.
//!
//! Only the subset of each response the gateway acts on is modelled; shape
//! mismatches surface as deserialization errors instead of silent `None`
//! lookups in a dynamic map.

use serde::{Deserialize, Serialize};

use crate::types::{MinorUnit, StringMajorUnit};

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: StringMajorUnit,
    pub currency_code: String,
}

impl Price {
    pub fn new(amount: MinorUnit, currency_code: impl Into<String>) -> Self {
        Self {
            amount: amount.to_major_unit_as_string(),
            currency_code: currency_code.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChargeRequest {
    pub charge_permission_id: String,
    pub charge_amount: Price,
    pub capture_now: bool,
    pub can_handle_pending_authorization: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureChargeRequest {
    pub capture_amount: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelChargeRequest {
    pub cancellation_reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRefundRequest {
    pub charge_id: String,
    pub refund_amount: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_descriptor: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseChargePermissionRequest {
    pub closure_reason: String,
    pub cancel_pending_charges: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChargePermissionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_store_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_to_buyer: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebCheckoutDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_review_return_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_result_return_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutSessionRequest {
    pub store_id: String,
    pub web_checkout_details: WebCheckoutDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCheckoutSessionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_checkout_details: Option<WebCheckoutDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_details: Option<PaymentDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_metadata: Option<MerchantMetadata>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub payment_intent: PaymentIntent,
    pub charge_amount: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_handle_pending_authorization: Option<bool>,
}

/// What the checkout session authorizes the merchant to do afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum PaymentIntent {
    Confirm,
    Authorize,
    AuthorizeWithCapture,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteCheckoutSessionRequest {
    pub charge_amount: Price,
}

// Response subsets.

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    pub charge_id: String,
    #[serde(default)]
    pub charge_permission_id: Option<String>,
    #[serde(default)]
    pub status_details: Option<StatusDetails>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub refund_id: String,
    #[serde(default)]
    pub charge_id: Option<String>,
    #[serde(default)]
    pub status_details: Option<StatusDetails>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargePermissionResponse {
    pub charge_permission_id: String,
    #[serde(default)]
    pub status_details: Option<StatusDetails>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub checkout_session_id: String,
    #[serde(default)]
    pub charge_permission_id: Option<String>,
    #[serde(default)]
    pub charge_id: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusDetails {
    pub state: String,
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub reason_description: Option<String>,
}

/// The shared error envelope every endpoint uses on failure.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponseBody {
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
