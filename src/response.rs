use bytes::Bytes;
use error_stack::report;
use serde::de::DeserializeOwned;

use crate::{
    consts,
    errors::{ConnectorError, CustomResult},
    transformers::{ChargePermissionResponse, ChargeResponse, ErrorResponseBody, RefundResponse},
};

/// Raw transport result plus the processor's verdict.
///
/// Classification only; nothing here retries, persists, or unwraps
/// resource-specific JSON beyond the shared error envelope. The gateway
/// decides what to do with the verdict.
#[derive(Clone, Debug)]
pub struct AmazonPayResponse {
    pub status_code: u16,
    pub body: Bytes,
}

impl AmazonPayResponse {
    pub fn new(status_code: u16, body: Bytes) -> Self {
        Self { status_code, body }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200 || self.status_code == 201
    }

    /// The processor-defined reason code, when the body carries one.
    pub fn reason_code(&self) -> Option<String> {
        self.error_body().and_then(|body| body.reason_code)
    }

    /// A decline the customer may recover from by retrying with another
    /// funding source. Always false on success.
    pub fn is_soft_decline(&self) -> bool {
        !self.is_success()
            && self.reason_code().as_deref() == Some(consts::SOFT_DECLINE_REASON_CODE)
    }

    /// Human-readable outcome; synthesized `"Success"` on success.
    pub fn message(&self) -> String {
        if self.is_success() {
            return "Success".to_string();
        }
        self.error_body()
            .and_then(|body| body.message)
            .unwrap_or_else(|| consts::NO_ERROR_MESSAGE.to_string())
    }

    /// Storage form of [`Self::message`], clipped to 255 characters.
    pub fn truncated_message(&self) -> String {
        truncate_message(&self.message())
    }

    /// Deserializes the body into a typed response struct.
    pub fn parse<T: DeserializeOwned>(&self, type_name: &str) -> CustomResult<T, ConnectorError> {
        serde_json::from_slice(&self.body).map_err(|err| {
            tracing::error!(type_name, error = %err, "failed to deserialize connector response");
            report!(ConnectorError::ResponseDeserializationFailed)
        })
    }

    /// The created/affected charge id, when the body carries one.
    pub fn charge_id(&self) -> Option<String> {
        self.extract(|body: ChargeResponse| body.charge_id)
    }

    pub fn charge_permission_id(&self) -> Option<String> {
        self.extract(|body: ChargePermissionResponse| body.charge_permission_id)
    }

    pub fn refund_id(&self) -> Option<String> {
        self.extract(|body: RefundResponse| body.refund_id)
    }

    fn extract<T: DeserializeOwned, F: FnOnce(T) -> String>(&self, field: F) -> Option<String> {
        serde_json::from_slice(&self.body).ok().map(field)
    }

    fn error_body(&self) -> Option<ErrorResponseBody> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Clips a processor message to what the transaction record may store.
pub fn truncate_message(message: &str) -> String {
    message.chars().take(consts::MAX_STORED_MESSAGE_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status_code: u16, body: &str) -> AmazonPayResponse {
        AmazonPayResponse::new(status_code, Bytes::copy_from_slice(body.as_bytes()))
    }

    #[test]
    fn only_200_and_201_are_success() {
        assert!(response(200, "{}").is_success());
        assert!(response(201, "{}").is_success());
        assert!(!response(202, "{}").is_success());
        assert!(!response(400, "{}").is_success());
        assert!(!response(500, "{}").is_success());
    }

    #[test]
    fn success_synthesizes_message() {
        let ok = response(200, "{\"chargeId\":\"S03-0000000-0000000\"}");
        assert_eq!(ok.message(), "Success");
        assert!(!ok.is_soft_decline());
    }

    #[test]
    fn soft_decline_requires_failure_and_reason_code() {
        let declined = response(
            400,
            "{\"reasonCode\":\"SoftDeclined\",\"message\":\"card issue\"}",
        );
        assert!(declined.is_soft_decline());
        assert_eq!(declined.message(), "card issue");

        let hard = response(
            400,
            "{\"reasonCode\":\"TransactionAmountExceeded\",\"message\":\"too much\"}",
        );
        assert!(!hard.is_soft_decline());

        // A success body with the magic reason code is still not a decline.
        let odd = response(200, "{\"reasonCode\":\"SoftDeclined\"}");
        assert!(!odd.is_soft_decline());
    }

    #[test]
    fn typed_extracts_pull_resource_ids() {
        let charge = response(201, "{\"chargeId\":\"S03-0000000-0000000-C000000\"}");
        assert_eq!(
            charge.charge_id().as_deref(),
            Some("S03-0000000-0000000-C000000")
        );
        assert!(charge.refund_id().is_none());

        let refund = response(201, "{\"refundId\":\"R03-0000000-0000000-R00000\"}");
        assert_eq!(
            refund.refund_id().as_deref(),
            Some("R03-0000000-0000000-R00000")
        );

        let permission = response(200, "{\"chargePermissionId\":\"P03-0000000-0000000\"}");
        assert_eq!(
            permission.charge_permission_id().as_deref(),
            Some("P03-0000000-0000000")
        );
    }

    #[test]
    fn unparseable_failure_body_falls_back_to_default_message() {
        let garbled = response(502, "<html>bad gateway</html>");
        assert_eq!(garbled.message(), consts::NO_ERROR_MESSAGE);
        assert!(!garbled.is_soft_decline());
    }

    #[test]
    fn message_is_truncated_to_255_chars_for_storage() {
        let long = "x".repeat(300);
        let declined = response(
            400,
            &format!("{{\"reasonCode\":\"Declined\",\"message\":\"{long}\"}}"),
        );
        assert_eq!(declined.message().len(), 300);
        assert_eq!(declined.truncated_message().len(), 255);
    }
}
