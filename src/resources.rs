//! Thin clients, one per remote resource type.
//!
//! Each maps a domain operation onto an HTTP verb and path and returns the
//! raw [`crate::response::AmazonPayResponse`]; interpretation, retries and
//! persistence all belong to the gateway layer.

use error_stack::ResultExt;
use serde::Serialize;

use crate::{
    errors::{ConnectorError, CustomResult},
    request::RequestContent,
};

pub mod charge;
pub mod charge_permission;
pub mod checkout_session;
pub mod refund;

pub use charge::Charge;
pub use charge_permission::ChargePermission;
pub use checkout_session::CheckoutSession;
pub use refund::Refund;

pub(crate) fn json_content<T: Serialize>(request: &T) -> CustomResult<RequestContent, ConnectorError> {
    serde_json::to_value(request)
        .change_context(ConnectorError::RequestEncodingFailed)
        .map(RequestContent::Json)
}
