//! Canonical-request construction and RSA-PSS signing for the Amazon Pay v2
//! signing protocol (`AMZN-PAY-RSASSA-PSS`).
//!
//! The processor verifies the caller by recomputing a canonical byte string
//! from the received request and checking the RSA-PSS/SHA-256 signature over
//! it, so every step here must be reproducible byte-for-byte.

use std::collections::BTreeMap;

use base64::Engine;
use error_stack::report;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rsa::pss::Pss;
use sha2::{Digest, Sha256};
use time::{macros::format_description, OffsetDateTime};

use crate::{
    consts,
    errors::{ConnectorError, CustomResult},
    request::{Headers, Method, QueryValue},
    types::SigningContext,
};

pub const BASE64_ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// Unreserved characters stay bare, everything else is percent-encoded.
const URL_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Signs outgoing requests against a borrowed [`SigningContext`].
pub struct RequestSigner<'a> {
    context: &'a SigningContext,
}

impl<'a> RequestSigner<'a> {
    pub fn new(context: &'a SigningContext) -> Self {
        Self { context }
    }

    /// Produces the full signed header set for one outgoing request.
    ///
    /// `idempotency_key` is only attached (and signed) for POST requests;
    /// pass `None` on other methods.
    pub fn sign(
        &self,
        method: Method,
        url: &str,
        query_params: &[(String, QueryValue)],
        payload: Option<&str>,
        idempotency_key: Option<&str>,
    ) -> CustomResult<Headers, ConnectorError> {
        self.sign_at(
            method,
            url,
            query_params,
            payload,
            idempotency_key,
            &formatted_timestamp(OffsetDateTime::now_utc()),
            &mut rand::rngs::OsRng,
        )
    }

    /// Same as [`Self::sign`] with the timestamp and RNG injected, so tests
    /// can pin both and compare exact bytes.
    pub(crate) fn sign_at<R: rand::RngCore + rand::CryptoRng>(
        &self,
        method: Method,
        url: &str,
        query_params: &[(String, QueryValue)],
        payload: Option<&str>,
        idempotency_key: Option<&str>,
        timestamp: &str,
        rng: &mut R,
    ) -> CustomResult<Headers, ConnectorError> {
        let payload = effective_payload(url, method, payload.unwrap_or_default());

        let mut pre_signed = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
            (
                "x-amz-pay-region".to_string(),
                self.context.region.to_string(),
            ),
            ("x-amz-pay-date".to_string(), timestamp.to_string()),
            ("x-amz-pay-host".to_string(), amz_pay_host(url)),
        ];
        if method == Method::Post {
            if let Some(key) = idempotency_key {
                pre_signed.push(("x-amz-pay-idempotency-key".to_string(), key.to_string()));
            }
        }

        let canonical_request =
            build_canonical_request(method, url, query_params, payload, &pre_signed)?;
        let string_to_sign = string_to_sign(&canonical_request);
        let signature = self.sign_string(&string_to_sign, rng)?;
        let signed_header_names = canonical_header_names(&pre_signed);

        let mut headers: Headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("content-type".to_string(), "application/json".to_string()),
            ("x-amz-pay-host".to_string(), amz_pay_host(url)),
            ("x-amz-pay-date".to_string(), timestamp.to_string()),
            (
                "x-amz-pay-region".to_string(),
                self.context.region.to_string(),
            ),
            (
                "authorization".to_string(),
                format!(
                    "{} PublicKeyId={}, SignedHeaders={}, Signature={}",
                    consts::AMAZON_SIGNATURE_ALGORITHM,
                    self.context.public_key_id,
                    signed_header_names,
                    signature
                ),
            ),
        ];
        if method == Method::Post {
            if let Some(key) = idempotency_key {
                headers.push(("x-amz-pay-idempotency-key".to_string(), key.to_string()));
            }
        }
        headers.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(headers)
    }

    /// RSA-PSS(SHA-256, salt 20, MGF1/SHA-256) over the string-to-sign,
    /// base64-encoded.
    fn sign_string<R: rand::RngCore + rand::CryptoRng>(
        &self,
        string_to_sign: &str,
        rng: &mut R,
    ) -> CustomResult<String, ConnectorError> {
        let digest = Sha256::digest(string_to_sign.as_bytes());
        let signature = self
            .context
            .private_key()
            .sign_with_rng(
                rng,
                Pss::new_with_salt::<Sha256>(consts::SIGNATURE_SALT_LENGTH),
                &digest,
            )
            .map_err(|_| report!(ConnectorError::RequestSigningFailed))?;
        Ok(BASE64_ENGINE.encode(signature))
    }
}

/// Builds the six-line canonical request string.
pub(crate) fn build_canonical_request(
    method: Method,
    url: &str,
    query_params: &[(String, QueryValue)],
    payload: &str,
    pre_signed_headers: &[(String, String)],
) -> CustomResult<String, ConnectorError> {
    let canonical_uri = canonical_uri(url)?;
    let canonical_query = canonical_query(query_params);
    let canonical_headers = canonical_headers(pre_signed_headers);
    let header_lines = header_string(&canonical_headers);
    let signed_header_names = canonical_header_names(pre_signed_headers);
    let hashed_payload = hex_and_hash(payload);
    Ok(format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{header_lines}\n{signed_header_names}\n{hashed_payload}"
    ))
}

pub(crate) fn string_to_sign(canonical_request: &str) -> String {
    format!(
        "{}\n{}",
        consts::AMAZON_SIGNATURE_ALGORITHM,
        hex_and_hash(canonical_request)
    )
}

fn hex_and_hash(data: &str) -> String {
    hex::encode(Sha256::digest(data.as_bytes()))
}

/// The processor excludes the body from the signature on payment-critical
/// endpoints; the real body is still sent on the wire.
fn effective_payload<'p>(url: &str, method: Method, payload: &'p str) -> &'p str {
    let body_bearing = matches!(method, Method::Post | Method::Put | Method::Patch);
    if body_bearing
        && consts::PAYMENT_CRITICAL_DATA_APIS
            .iter()
            .any(|api| url.contains(api))
    {
        ""
    } else {
        payload
    }
}

/// UTC ISO-8601 basic form: `20240101T120000Z`.
pub(crate) fn formatted_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year][month][day]T[hour][minute][second]Z");
    at.format(&format).unwrap_or_default()
}

pub(crate) fn canonical_uri(url: &str) -> CustomResult<String, ConnectorError> {
    if url.is_empty() {
        return Ok("/".to_string());
    }
    let parsed = url::Url::parse(url).map_err(|_| report!(ConnectorError::RequestEncodingFailed))?;
    let path = parsed.path();
    Ok(if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    })
}

fn amz_pay_host(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| "/".to_string())
}

/// Sorted, flattened, percent-encoded query string.
pub(crate) fn canonical_query(query_params: &[(String, QueryValue)]) -> String {
    let mut flattened: Vec<(String, String)> = Vec::new();
    for (key, value) in query_params {
        match value {
            QueryValue::Single(single) => {
                if !single.is_empty() {
                    flattened.push((key.clone(), single.clone()));
                }
            }
            QueryValue::List(values) => {
                // Array values become 1-based `key.index` sub-keys.
                for (index, item) in values.iter().enumerate() {
                    flattened.push((format!("{key}.{}", index + 1), item.clone()));
                }
            }
        }
    }
    flattened.sort_by(|(a, _), (b, _)| a.cmp(b));
    flattened
        .iter()
        .map(|(key, value)| format!("{key}={}", url_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn url_encode(value: &str) -> String {
    utf8_percent_encode(value, URL_ENCODE_SET).to_string()
}

/// Lower-cased, sorted header map; headers with empty values are dropped.
fn canonical_headers(headers: &[(String, String)]) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| (key.to_lowercase(), value.clone()))
        .collect()
}

/// `key:value` lines, one per header, each terminated with `\n`.
fn header_string(sorted_headers: &BTreeMap<String, String>) -> String {
    let mut lines = sorted_headers
        .iter()
        .map(|(key, value)| format!("{key}:{value}"))
        .collect::<Vec<_>>()
        .join("\n");
    lines.push('\n');
    lines
}

fn canonical_header_names(headers: &[(String, String)]) -> String {
    canonical_headers(headers)
        .keys()
        .cloned()
        .collect::<Vec<_>>()
        .join(";")
}

/// Fresh random token for `x-amz-pay-idempotency-key`, 20 hex characters.
///
/// Reusing a key makes the processor replay the prior result, so callers that
/// want a genuinely new attempt must never reuse one.
pub fn generate_idempotency_key() -> String {
    let mut bytes = [0u8; consts::IDEMPOTENCY_KEY_LENGTH / 2];
    rand::RngCore::fill_bytes(&mut rand::rngs::OsRng, &mut bytes);
    hex::encode(bytes)
}
