use super::json_content;
use crate::{
    client::AmazonPayClient,
    errors::{ConnectorError, CustomResult},
    request::Method,
    response::AmazonPayResponse,
    transformers::{
        CompleteCheckoutSessionRequest, CreateCheckoutSessionRequest,
        UpdateCheckoutSessionRequest,
    },
};

/// The buyer-facing checkout session that precedes a charge permission.
pub struct CheckoutSession;

impl CheckoutSession {
    pub fn create(
        client: &AmazonPayClient,
        request: &CreateCheckoutSessionRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(Method::Post, "checkoutSessions", Some(json_content(request)?))
    }

    pub fn get(
        client: &AmazonPayClient,
        checkout_session_id: &str,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Get,
            &format!("checkoutSessions/{checkout_session_id}"),
            None,
        )
    }

    pub fn update(
        client: &AmazonPayClient,
        checkout_session_id: &str,
        request: &UpdateCheckoutSessionRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Patch,
            &format!("checkoutSessions/{checkout_session_id}"),
            Some(json_content(request)?),
        )
    }

    /// Converts an approved session into a charge permission (and, depending
    /// on the payment intent, a charge).
    pub fn complete(
        client: &AmazonPayClient,
        checkout_session_id: &str,
        request: &CompleteCheckoutSessionRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Post,
            &format!("checkoutSessions/{checkout_session_id}/complete"),
            Some(json_content(request)?),
        )
    }
}
