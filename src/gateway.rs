//! Payment state machine over the resource clients.
//!
//! Sequences authorize → capture → (credit | void) for one logical payment,
//! persisting every outcome on the authoritative transaction record. The
//! caller enforces operation ordering; this layer guards against acting on a
//! record that lacks a required field and treats an unresolvable handle as a
//! fatal data inconsistency, never a decline.

use error_stack::report;
use time::OffsetDateTime;

use crate::{
    client::AmazonPayClient,
    consts,
    errors::{ConnectorError, CustomResult},
    resources::{Charge, ChargePermission, Refund},
    response::{truncate_message, AmazonPayResponse},
    transaction::{Payment, TransactionRecord, TransactionStore},
    transformers::{
        CaptureChargeRequest, CloseChargePermissionRequest, ChargeResponse, CreateChargeRequest,
        CreateRefundRequest, Price, RefundResponse,
    },
    types::MinorUnit,
};

/// Whether `authorize` moves money immediately or leaves capture to a later
/// call. Delayed capture is the documented, exercised behavior; immediate
/// capture is kept as a named alternate policy.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CapturePolicy {
    #[default]
    Delayed,
    Immediate,
}

/// Outcome handed back to the storefront caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GatewayResponse {
    pub success: bool,
    pub message: String,
    /// Token derived from the created remote resource, e.g. a refund id.
    pub authorization: Option<String>,
}

impl GatewayResponse {
    fn approved(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            authorization: None,
        }
    }

    fn from_response(response: &AmazonPayResponse, authorization: Option<String>) -> Self {
        Self {
            success: response.is_success(),
            message: response.message(),
            authorization,
        }
    }
}

pub struct AmazonPayGateway<S: TransactionStore> {
    client: AmazonPayClient,
    store: S,
    currency: String,
    soft_descriptor: Option<String>,
    capture_policy: CapturePolicy,
}

impl<S: TransactionStore> AmazonPayGateway<S> {
    pub fn new(client: AmazonPayClient, store: S, currency: impl Into<String>) -> Self {
        Self {
            client,
            store,
            currency: currency.into(),
            soft_descriptor: None,
            capture_policy: CapturePolicy::default(),
        }
    }

    pub fn with_capture_policy(mut self, capture_policy: CapturePolicy) -> Self {
        self.capture_policy = capture_policy;
        self
    }

    pub fn with_soft_descriptor(mut self, soft_descriptor: impl Into<String>) -> Self {
        self.soft_descriptor = Some(soft_descriptor.into());
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Creates a charge under the record's charge permission.
    ///
    /// A negative amount is not a meaningful authorization and succeeds
    /// without a network call. A record that already carries a `capture_id`
    /// delegates to capture, so an authorization that already has a charge
    /// never creates a duplicate.
    pub fn authorize(
        &mut self,
        amount: MinorUnit,
        record_id: &str,
    ) -> CustomResult<GatewayResponse, ConnectorError> {
        if amount.is_negative() {
            return Ok(GatewayResponse::approved("Success"));
        }
        let record = self.fetch_record(record_id)?;
        if record.capture_id.is_some() {
            return self.capture_record(amount, record);
        }

        let request = CreateChargeRequest {
            charge_permission_id: record.order_reference.clone(),
            charge_amount: Price::new(amount, &self.currency),
            capture_now: self.capture_policy == CapturePolicy::Immediate,
            can_handle_pending_authorization: true,
        };
        let response = Charge::create(&self.client, &request)?;

        let mut record = self.fetch_record(record_id)?;
        if response.is_success() {
            let charge: ChargeResponse = response.parse("ChargeResponse")?;
            record.capture_id = Some(charge.charge_id);
        }
        record.record_outcome(&response);
        self.store.update_record(&record);
        Ok(GatewayResponse::from_response(&response, None))
    }

    /// Captures a previously authorized charge, resolved via the stored
    /// charge handle. A negative capture is a reversal and delegates to
    /// [`Self::credit`] with the absolute amount.
    pub fn capture(
        &mut self,
        amount: MinorUnit,
        response_code: &str,
    ) -> CustomResult<GatewayResponse, ConnectorError> {
        if amount.is_negative() {
            return self.credit(amount.abs(), response_code);
        }
        let payment = self.fetch_payment(response_code)?;
        let record = self.latest_record(&payment)?;
        self.capture_record(amount, record)
    }

    /// Combined auth+capture round trip, handled processor-side; always goes
    /// through capture on the record's existing charge.
    pub fn purchase(
        &mut self,
        amount: MinorUnit,
        record_id: &str,
    ) -> CustomResult<GatewayResponse, ConnectorError> {
        let record = self.fetch_record(record_id)?;
        self.capture_record(amount, record)
    }

    /// Refunds against the record's charge; on success the returned
    /// authorization token is the refund id.
    pub fn credit(
        &mut self,
        amount: MinorUnit,
        response_code: &str,
    ) -> CustomResult<GatewayResponse, ConnectorError> {
        let payment = self.fetch_payment(response_code)?;
        let record = self.latest_record(&payment)?;
        let capture_id = record.capture_id.clone().ok_or_else(|| {
            report!(ConnectorError::MissingRequiredField {
                field_name: "capture_id"
            })
        })?;

        let request = CreateRefundRequest {
            charge_id: normalize_legacy_capture_id(&capture_id),
            refund_amount: Price::new(amount.abs(), &payment.currency),
            soft_descriptor: self.soft_descriptor.clone(),
        };
        let response = Refund::create(&self.client, &request)?;
        let authorization = response
            .is_success()
            .then(|| {
                response
                    .parse::<RefundResponse>("RefundResponse")
                    .map(|refund| refund.refund_id)
            })
            .transpose()?;

        let mut record = self.fetch_record(&record.id)?;
        record.record_outcome(&response);
        self.store.update_record(&record);
        Ok(GatewayResponse::from_response(&response, authorization))
    }

    /// Reverses a payment: an uncaptured authorization is cancelled at the
    /// charge-permission level; a captured one has no void and gets a full
    /// credit for the payment's allowed amount instead.
    pub fn void(&mut self, response_code: &str) -> CustomResult<GatewayResponse, ConnectorError> {
        self.reverse(response_code)
    }

    /// Same reversal as [`Self::void`], reporting a `<handle>-cancel`
    /// message so the storefront can tell the flows apart.
    pub fn cancel(&mut self, response_code: &str) -> CustomResult<GatewayResponse, ConnectorError> {
        let reversed = self.reverse(response_code)?;
        Ok(GatewayResponse {
            message: format!("{response_code}-cancel"),
            ..reversed
        })
    }

    /// Closes the charge permission once no more charges are expected.
    /// Idempotent: a record that never completed or was already closed
    /// returns success without a network call.
    pub fn close(&mut self, record_id: &str) -> CustomResult<GatewayResponse, ConnectorError> {
        let record = self.fetch_record(record_id)?;
        if !record.can_close() {
            return Ok(GatewayResponse::approved("Success"));
        }

        let request = CloseChargePermissionRequest {
            closure_reason: consts::CLOSURE_REASON.to_string(),
            cancel_pending_charges: true,
        };
        let response = ChargePermission::close(&self.client, &record.order_reference, &request)?;
        if response.is_success() {
            let mut record = self.fetch_record(record_id)?;
            record.closed_at = Some(OffsetDateTime::now_utc());
            self.store.update_record(&record);
            Ok(GatewayResponse::approved("Success"))
        } else {
            let message = response.message();
            tracing::error!(
                status_code = response.status_code,
                %message,
                "charge permission close failed"
            );
            Err(report!(ConnectorError::ProcessorError {
                message: truncate_message(&message),
            }))
        }
    }

    fn reverse(&mut self, response_code: &str) -> CustomResult<GatewayResponse, ConnectorError> {
        let payment = self.fetch_payment(response_code)?;
        let record = self.latest_record(&payment)?;
        match record.capture_id {
            None => {
                let request = CloseChargePermissionRequest {
                    closure_reason: consts::CANCELLATION_REASON.to_string(),
                    cancel_pending_charges: true,
                };
                let response =
                    ChargePermission::close(&self.client, &record.order_reference, &request)?;
                let mut record = self.fetch_record(&record.id)?;
                record.record_outcome(&response);
                self.store.update_record(&record);
                Ok(GatewayResponse::from_response(&response, None))
            }
            Some(_) => self.credit(payment.credit_allowed, response_code),
        }
    }

    fn capture_record(
        &mut self,
        amount: MinorUnit,
        record: TransactionRecord,
    ) -> CustomResult<GatewayResponse, ConnectorError> {
        let capture_id = record.capture_id.clone().ok_or_else(|| {
            report!(ConnectorError::MissingRequiredField {
                field_name: "capture_id"
            })
        })?;
        let charge_id = normalize_legacy_capture_id(&capture_id);

        let request = CaptureChargeRequest {
            capture_amount: Price::new(amount, &self.currency),
            soft_descriptor: self.soft_descriptor.clone(),
        };
        let response = Charge::capture(&self.client, &charge_id, &request)?;

        let mut record = self.fetch_record(&record.id)?;
        record.record_outcome(&response);
        self.store.update_record(&record);
        Ok(GatewayResponse::from_response(&response, None))
    }

    fn fetch_record(&self, record_id: &str) -> CustomResult<TransactionRecord, ConnectorError> {
        self.store.find_record(record_id).ok_or_else(|| {
            report!(ConnectorError::RecordNotFound {
                handle: record_id.to_string(),
            })
        })
    }

    fn fetch_payment(&self, response_code: &str) -> CustomResult<Payment, ConnectorError> {
        self.store.find_payment(response_code).ok_or_else(|| {
            report!(ConnectorError::RecordNotFound {
                handle: response_code.to_string(),
            })
        })
    }

    fn latest_record(&self, payment: &Payment) -> CustomResult<TransactionRecord, ConnectorError> {
        self.store
            .latest_record_for_order(&payment.order_id)
            .ok_or_else(|| {
                report!(ConnectorError::RecordNotFound {
                    handle: payment.response_code.clone(),
                })
            })
    }
}

/// Rewrites the checkout-session discriminator of legacy charge ids.
///
/// Older charge ids carry `'A'` at byte offset 20 where current ones carry
/// `'C'`; the processor only accepts the current form on capture and refund
/// calls. Applied at point of use only; the stored `capture_id` keeps its
/// original form.
pub fn normalize_legacy_capture_id(capture_id: &str) -> String {
    let mut normalized = capture_id.to_string();
    if normalized.as_bytes().get(consts::LEGACY_DISCRIMINATOR_OFFSET) == Some(&b'A') {
        normalized.replace_range(
            consts::LEGACY_DISCRIMINATOR_OFFSET..consts::LEGACY_DISCRIMINATOR_OFFSET + 1,
            "C",
        );
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_transform_rewrites_a_to_c_at_offset_20() {
        assert_eq!(
            normalize_legacy_capture_id("S03-1234567-1234567-A123456"),
            "S03-1234567-1234567-C123456"
        );
    }

    #[test]
    fn legacy_transform_is_idempotent() {
        let current = "S03-1234567-1234567-C123456";
        assert_eq!(normalize_legacy_capture_id(current), current);
        let twice = normalize_legacy_capture_id(&normalize_legacy_capture_id(
            "S03-1234567-1234567-A123456",
        ));
        assert_eq!(twice, current);
    }

    #[test]
    fn legacy_transform_leaves_short_and_unrelated_ids_alone() {
        assert_eq!(normalize_legacy_capture_id("short-id"), "short-id");
        assert_eq!(
            normalize_legacy_capture_id("S03-1234567-1234567-B123456"),
            "S03-1234567-1234567-B123456"
        );
    }
}
