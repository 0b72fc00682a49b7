//! Verb/path contracts of the resource clients against a mock endpoint.

use amazon_pay_gateway::{
    resources::{Charge, ChargePermission, CheckoutSession, Refund},
    transformers::{
        CancelChargeRequest, ChargePermissionResponse, CheckoutSessionResponse,
        CompleteCheckoutSessionRequest, CreateCheckoutSessionRequest, MerchantMetadata,
        PaymentDetails, PaymentIntent, Price, UpdateChargePermissionRequest,
        UpdateCheckoutSessionRequest, WebCheckoutDetails,
    },
    AmazonPayClient, Environment, MinorUnit, Region, SigningContext,
};
use mockito::Matcher;
use secrecy::SecretString;

const TEST_PRIVATE_KEY: &str = include_str!("data/test_private_key.pem");

const SESSION_ID: &str = "bd3846a8-a7de-4ee8-a9c8-40b6a968ca12";
const CHARGE_ID: &str = "S03-1234567-1234567-C123456";
const PERMISSION_ID: &str = "P03-1234567-1234567";

fn client_for(server: &mockito::Server) -> AmazonPayClient {
    let context = SigningContext::new(
        Region::Us,
        "AE5E5B7B2SAERURYEH6DKDAZ",
        Environment::Sandbox,
        &SecretString::from(TEST_PRIVATE_KEY.to_string()),
    )
    .expect("test key parses")
    .with_base_url(format!("{}/", server.url()));
    AmazonPayClient::new(context).expect("client builds")
}

#[test]
fn checkout_session_lifecycle_hits_the_documented_endpoints() {
    let mut server = mockito::Server::new();
    let client = client_for(&server);

    let create = server
        .mock("POST", "/checkoutSessions")
        .match_header(
            "x-amz-pay-idempotency-key",
            Matcher::Regex("^[0-9a-f]{20}$".to_string()),
        )
        .match_body(Matcher::PartialJson(serde_json::json!({
            "storeId": "amzn1.application-oa2-client.test",
        })))
        .with_status(201)
        .with_body(format!("{{\"checkoutSessionId\":\"{SESSION_ID}\"}}"))
        .create();
    let get = server
        .mock("GET", format!("/checkoutSessions/{SESSION_ID}").as_str())
        .with_status(200)
        .with_body(format!("{{\"checkoutSessionId\":\"{SESSION_ID}\"}}"))
        .create();
    let update = server
        .mock("PATCH", format!("/checkoutSessions/{SESSION_ID}").as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "paymentDetails": {
                "paymentIntent": "Authorize",
                "chargeAmount": {"amount": "10.00", "currencyCode": "USD"},
            },
        })))
        .with_status(200)
        .with_body(format!("{{\"checkoutSessionId\":\"{SESSION_ID}\"}}"))
        .create();
    let complete = server
        .mock(
            "POST",
            format!("/checkoutSessions/{SESSION_ID}/complete").as_str(),
        )
        .with_status(200)
        .with_body(format!(
            "{{\"checkoutSessionId\":\"{SESSION_ID}\",\
              \"chargePermissionId\":\"{PERMISSION_ID}\",\
              \"chargeId\":\"{CHARGE_ID}\"}}"
        ))
        .create();

    let created = CheckoutSession::create(
        &client,
        &CreateCheckoutSessionRequest {
            store_id: "amzn1.application-oa2-client.test".to_string(),
            web_checkout_details: WebCheckoutDetails {
                checkout_review_return_url: Some("https://shop.example/review".to_string()),
                checkout_result_return_url: None,
            },
        },
    )
    .unwrap();
    assert!(created.is_success());
    let session: CheckoutSessionResponse = created.parse("CheckoutSessionResponse").unwrap();
    assert_eq!(session.checkout_session_id, SESSION_ID);

    assert!(CheckoutSession::get(&client, SESSION_ID).unwrap().is_success());

    let updated = CheckoutSession::update(
        &client,
        SESSION_ID,
        &UpdateCheckoutSessionRequest {
            web_checkout_details: None,
            payment_details: Some(PaymentDetails {
                payment_intent: PaymentIntent::Authorize,
                charge_amount: Price::new(MinorUnit::new(1000), "USD"),
                can_handle_pending_authorization: Some(true),
            }),
            merchant_metadata: None,
        },
    )
    .unwrap();
    assert!(updated.is_success());

    let completed = CheckoutSession::complete(
        &client,
        SESSION_ID,
        &CompleteCheckoutSessionRequest {
            charge_amount: Price::new(MinorUnit::new(1000), "USD"),
        },
    )
    .unwrap();
    let session: CheckoutSessionResponse = completed.parse("CheckoutSessionResponse").unwrap();
    assert_eq!(session.charge_permission_id.as_deref(), Some(PERMISSION_ID));
    assert_eq!(session.charge_id.as_deref(), Some(CHARGE_ID));

    create.assert();
    get.assert();
    update.assert();
    complete.assert();
}

#[test]
fn charge_get_and_cancel_use_the_charge_endpoints() {
    let mut server = mockito::Server::new();
    let client = client_for(&server);

    let get = server
        .mock("GET", format!("/charges/{CHARGE_ID}").as_str())
        .with_status(200)
        .with_body(format!("{{\"chargeId\":\"{CHARGE_ID}\"}}"))
        .create();
    let cancel = server
        .mock("DELETE", format!("/charges/{CHARGE_ID}/cancel").as_str())
        .match_body(Matcher::PartialJson(serde_json::json!({
            "cancellationReason": "Order cancelled",
        })))
        .with_status(200)
        .with_body(format!("{{\"chargeId\":\"{CHARGE_ID}\"}}"))
        .create();

    assert!(Charge::get(&client, CHARGE_ID).unwrap().is_success());
    let cancelled = Charge::cancel(
        &client,
        CHARGE_ID,
        &CancelChargeRequest {
            cancellation_reason: "Order cancelled".to_string(),
        },
    )
    .unwrap();
    assert!(cancelled.is_success());

    get.assert();
    cancel.assert();
}

#[test]
fn charge_permission_get_and_update_use_the_permission_endpoints() {
    let mut server = mockito::Server::new();
    let client = client_for(&server);

    let get = server
        .mock("GET", format!("/chargePermissions/{PERMISSION_ID}").as_str())
        .with_status(200)
        .with_body(format!("{{\"chargePermissionId\":\"{PERMISSION_ID}\"}}"))
        .create();
    let update = server
        .mock(
            "PATCH",
            format!("/chargePermissions/{PERMISSION_ID}").as_str(),
        )
        .match_body(Matcher::PartialJson(serde_json::json!({
            "merchantMetadata": {"merchantReferenceId": "order-1001"},
        })))
        .with_status(200)
        .with_body(format!("{{\"chargePermissionId\":\"{PERMISSION_ID}\"}}"))
        .create();

    let fetched = ChargePermission::get(&client, PERMISSION_ID).unwrap();
    let permission: ChargePermissionResponse = fetched.parse("ChargePermissionResponse").unwrap();
    assert_eq!(permission.charge_permission_id, PERMISSION_ID);

    let updated = ChargePermission::update(
        &client,
        PERMISSION_ID,
        &UpdateChargePermissionRequest {
            merchant_metadata: Some(MerchantMetadata {
                merchant_reference_id: Some("order-1001".to_string()),
                merchant_store_name: None,
                note_to_buyer: None,
            }),
        },
    )
    .unwrap();
    assert!(updated.is_success());

    get.assert();
    update.assert();
}

#[test]
fn refund_get_uses_the_refund_endpoint() {
    let mut server = mockito::Server::new();
    let client = client_for(&server);

    let refund_id = "R03-1234567-1234567-R12345";
    let get = server
        .mock("GET", format!("/refunds/{refund_id}").as_str())
        .with_status(200)
        .with_body(format!("{{\"refundId\":\"{refund_id}\"}}"))
        .create();

    assert!(Refund::get(&client, refund_id).unwrap().is_success());
    get.assert();
}

#[test]
fn a_reused_idempotency_key_is_sent_verbatim() {
    let mut server = mockito::Server::new();
    let client = client_for(&server);

    let create = server
        .mock("POST", "/checkoutSessions")
        .match_header("x-amz-pay-idempotency-key", "0123456789abcdef0123")
        .with_status(201)
        .with_body(format!("{{\"checkoutSessionId\":\"{SESSION_ID}\"}}"))
        .create();

    let response = client
        .execute_with_idempotency_key(
            amazon_pay_gateway::request::Method::Post,
            "checkoutSessions",
            None,
            Some("0123456789abcdef0123"),
        )
        .unwrap();
    assert!(response.is_success());
    create.assert();
}
