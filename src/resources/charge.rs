use super::json_content;
use crate::{
    client::AmazonPayClient,
    errors::{ConnectorError, CustomResult},
    request::Method,
    response::AmazonPayResponse,
    transformers::{CancelChargeRequest, CaptureChargeRequest, CreateChargeRequest},
};

/// A specific request to move money under a charge permission.
pub struct Charge;

impl Charge {
    pub fn create(
        client: &AmazonPayClient,
        request: &CreateChargeRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(Method::Post, "charges", Some(json_content(request)?))
    }

    pub fn get(
        client: &AmazonPayClient,
        charge_id: &str,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(Method::Get, &format!("charges/{charge_id}"), None)
    }

    pub fn capture(
        client: &AmazonPayClient,
        charge_id: &str,
        request: &CaptureChargeRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Post,
            &format!("charges/{charge_id}/capture"),
            Some(json_content(request)?),
        )
    }

    pub fn cancel(
        client: &AmazonPayClient,
        charge_id: &str,
        request: &CancelChargeRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Delete,
            &format!("charges/{charge_id}/cancel"),
            Some(json_content(request)?),
        )
    }
}
