use super::json_content;
use crate::{
    client::AmazonPayClient,
    errors::{ConnectorError, CustomResult},
    request::Method,
    response::AmazonPayResponse,
    transformers::CreateRefundRequest,
};

pub struct Refund;

impl Refund {
    pub fn create(
        client: &AmazonPayClient,
        request: &CreateRefundRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(Method::Post, "refunds", Some(json_content(request)?))
    }

    pub fn get(
        client: &AmazonPayClient,
        refund_id: &str,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(Method::Get, &format!("refunds/{refund_id}"), None)
    }
}
