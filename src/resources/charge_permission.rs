use super::json_content;
use crate::{
    client::AmazonPayClient,
    errors::{ConnectorError, CustomResult},
    request::Method,
    response::AmazonPayResponse,
    transformers::{CloseChargePermissionRequest, UpdateChargePermissionRequest},
};

/// The customer's consent to be charged; the authorization-level grant.
pub struct ChargePermission;

impl ChargePermission {
    pub fn get(
        client: &AmazonPayClient,
        charge_permission_id: &str,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Get,
            &format!("chargePermissions/{charge_permission_id}"),
            None,
        )
    }

    pub fn update(
        client: &AmazonPayClient,
        charge_permission_id: &str,
        request: &UpdateChargePermissionRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Patch,
            &format!("chargePermissions/{charge_permission_id}"),
            Some(json_content(request)?),
        )
    }

    pub fn close(
        client: &AmazonPayClient,
        charge_permission_id: &str,
        request: &CloseChargePermissionRequest,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        client.execute(
            Method::Delete,
            &format!("chargePermissions/{charge_permission_id}/close"),
            Some(json_content(request)?),
        )
    }
}
