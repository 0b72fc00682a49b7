/// Signature algorithm identifier sent in the `authorization` header.
pub const AMAZON_SIGNATURE_ALGORITHM: &str = "AMZN-PAY-RSASSA-PSS";

/// Salt length mandated by the Amazon Pay signing protocol.
pub const SIGNATURE_SALT_LENGTH: usize = 20;

/// Number of hex characters in a freshly minted idempotency key.
pub const IDEMPOTENCY_KEY_LENGTH: usize = 20;

/// Byte offset of the checkout-session discriminator inside legacy charge ids.
pub const LEGACY_DISCRIMINATOR_OFFSET: usize = 20;

/// Maximum length of a processor message persisted on a transaction record.
pub const MAX_STORED_MESSAGE_LENGTH: usize = 255;

/// Default error code when the processor body carries none.
pub const NO_ERROR_CODE: &str = "No error code";
/// Default error message when the processor body carries none.
pub const NO_ERROR_MESSAGE: &str = "No error message";

/// Reason code marking a transient, retryable decline.
pub const SOFT_DECLINE_REASON_CODE: &str = "SoftDeclined";

/// Closure reason sent when a charge permission is closed after completion.
pub const CLOSURE_REASON: &str = "No more charges required";

/// Cancellation reason sent when an uncaptured authorization is voided.
pub const CANCELLATION_REASON: &str = "Order cancelled";

/// Endpoints whose body must not be bound into the signature for
/// POST/PUT/PATCH calls.
pub const PAYMENT_CRITICAL_DATA_APIS: [&str; 2] = [
    "/live/account-management/v1/accounts",
    "/sandbox/account-management/v1/accounts",
];
