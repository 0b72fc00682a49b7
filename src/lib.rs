//! Signed REST client and payment state machine for the Amazon Pay v2 API.
//!
//! Two halves:
//!
//! - [`signer`]/[`client`] build the canonical representation of each
//!   outgoing request, sign it with RSA-PSS/SHA-256 and perform the blocking
//!   network call;
//! - [`gateway`] sequences authorize/capture/refund/void/cancel/close
//!   against a persisted [`transaction::TransactionRecord`], handling
//!   idempotency keys, soft-decline classification and the legacy
//!   charge-id migration.
//!
//! Signing configuration is an immutable [`types::SigningContext`] value
//! threaded through every call; nothing in this crate holds process-wide
//! mutable state.

pub mod client;
pub mod consts;
pub mod errors;
pub mod gateway;
pub mod request;
pub mod resources;
pub mod response;
pub mod signer;
pub mod transaction;
pub mod transformers;
pub mod types;

pub use client::AmazonPayClient;
pub use errors::{ApiClientError, ConnectorError, CustomResult};
pub use gateway::{AmazonPayGateway, CapturePolicy, GatewayResponse};
pub use response::AmazonPayResponse;
pub use transaction::{InMemoryTransactionStore, Payment, TransactionRecord, TransactionStore};
pub use types::{Environment, MinorUnit, Region, SigningContext};
