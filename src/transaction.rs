use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{response::AmazonPayResponse, types::MinorUnit};

/// Persisted state of one payment attempt.
///
/// The most recently created record for a logical payment is authoritative;
/// earlier records are kept for audit. A declined attempt is never mutated
/// into a retry: the caller creates a new record (and the transport mints a
/// new idempotency key) instead.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TransactionRecord {
    pub id: String,
    /// The logical payment this attempt belongs to.
    pub order_id: String,
    /// Charge permission id, stable across retries of the same payment.
    pub order_reference: String,
    /// Charge id; set once a charge is created, stable for the charge's life.
    /// Legacy-format rewrites are derived at point of use, never stored here.
    pub capture_id: Option<String>,
    pub success: bool,
    pub soft_decline: bool,
    pub retry: bool,
    pub message: String,
    pub closed_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
}

impl TransactionRecord {
    pub fn new(
        id: impl Into<String>,
        order_id: impl Into<String>,
        order_reference: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            order_id: order_id.into(),
            order_reference: order_reference.into(),
            capture_id: None,
            success: false,
            soft_decline: false,
            retry: false,
            message: String::new(),
            closed_at: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    /// Persists the processor's verdict. Maintains the invariants
    /// `soft_decline ⇒ !success` and `retry == !success`.
    pub fn record_outcome(&mut self, response: &AmazonPayResponse) {
        self.success = response.is_success();
        self.soft_decline = response.is_soft_decline();
        self.retry = !self.success;
        self.message = response.truncated_message();
    }

    /// Whether the charge permission can still be closed: the payment
    /// completed and no close has been recorded yet.
    pub fn can_close(&self) -> bool {
        self.success && self.closed_at.is_none()
    }
}

/// The external caller's handle onto a payment, resolved by identifier.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Payment {
    /// The stored charge/authorization handle the storefront passes back in.
    pub response_code: String,
    pub order_id: String,
    pub currency: String,
    /// Amount still creditable, used when voiding a captured payment.
    pub credit_allowed: MinorUnit,
}

/// Lookup/persistence seam for payments and their transaction records.
///
/// References are weak, by identifier: the gateway re-fetches by id before
/// every mutation and never assumes it holds the only copy of a record,
/// so it survives concurrent access from a separate process.
pub trait TransactionStore {
    fn find_record(&self, record_id: &str) -> Option<TransactionRecord>;
    /// The authoritative (most recently created) record for a payment.
    fn latest_record_for_order(&self, order_id: &str) -> Option<TransactionRecord>;
    fn find_payment(&self, response_code: &str) -> Option<Payment>;
    fn insert_payment(&mut self, payment: Payment);
    fn insert_record(&mut self, record: TransactionRecord);
    fn update_record(&mut self, record: &TransactionRecord);
}

/// In-memory store used by tests and demos.
#[derive(Debug, Default)]
pub struct InMemoryTransactionStore {
    payments: HashMap<String, Payment>,
    /// Insertion-ordered; the last record for an order is authoritative.
    records: Vec<TransactionRecord>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

impl TransactionStore for InMemoryTransactionStore {
    fn find_record(&self, record_id: &str) -> Option<TransactionRecord> {
        self.records
            .iter()
            .find(|record| record.id == record_id)
            .cloned()
    }

    fn latest_record_for_order(&self, order_id: &str) -> Option<TransactionRecord> {
        self.records
            .iter()
            .rev()
            .find(|record| record.order_id == order_id)
            .cloned()
    }

    fn find_payment(&self, response_code: &str) -> Option<Payment> {
        self.payments.get(response_code).cloned()
    }

    fn insert_payment(&mut self, payment: Payment) {
        self.payments.insert(payment.response_code.clone(), payment);
    }

    fn insert_record(&mut self, record: TransactionRecord) {
        self.records.push(record);
    }

    fn update_record(&mut self, record: &TransactionRecord) {
        if let Some(stored) = self.records.iter_mut().find(|stored| stored.id == record.id) {
            *stored = record.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn response(status_code: u16, body: &str) -> AmazonPayResponse {
        AmazonPayResponse::new(status_code, Bytes::copy_from_slice(body.as_bytes()))
    }

    #[test]
    fn record_outcome_maintains_invariants() {
        let mut record = TransactionRecord::new("t1", "o1", "P03-1234567-1234567");

        record.record_outcome(&response(201, "{\"chargeId\":\"x\"}"));
        assert!(record.success);
        assert!(!record.soft_decline);
        assert!(!record.retry);
        assert_eq!(record.message, "Success");

        record.record_outcome(&response(
            400,
            "{\"reasonCode\":\"SoftDeclined\",\"message\":\"card issue\"}",
        ));
        assert!(!record.success);
        assert!(record.soft_decline);
        assert!(record.retry);
        assert_eq!(record.message, "card issue");

        record.record_outcome(&response(
            400,
            "{\"reasonCode\":\"AmazonRejected\",\"message\":\"no\"}",
        ));
        assert!(!record.success);
        assert!(!record.soft_decline);
        assert!(record.retry);
    }

    #[test]
    fn latest_record_supersedes_earlier_attempts() {
        let mut store = InMemoryTransactionStore::new();
        store.insert_record(TransactionRecord::new("t1", "o1", "P03-1234567-1234567"));
        store.insert_record(TransactionRecord::new("t2", "o1", "P03-1234567-1234567"));
        store.insert_record(TransactionRecord::new("t3", "o2", "P03-9999999-9999999"));

        let latest = store.latest_record_for_order("o1").unwrap();
        assert_eq!(latest.id, "t2");
        // Superseded records remain for audit.
        assert!(store.find_record("t1").is_some());
    }

    #[test]
    fn can_close_requires_success_and_no_prior_close() {
        let mut record = TransactionRecord::new("t1", "o1", "P03-1234567-1234567");
        assert!(!record.can_close());

        record.record_outcome(&response(200, "{}"));
        assert!(record.can_close());

        record.closed_at = Some(OffsetDateTime::now_utc());
        assert!(!record.can_close());
    }
}
