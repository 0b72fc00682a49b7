use std::time::Instant;

use error_stack::{report, ResultExt};

use crate::{
    errors::{ApiClientError, ConnectorError, CustomResult},
    request::{Method, Request, RequestBuilder, RequestContent},
    response::AmazonPayResponse,
    signer::{generate_idempotency_key, RequestSigner},
    types::SigningContext,
};

/// Signed HTTP client for the processor's REST API.
///
/// All calls are synchronous and blocking; each either completes with an
/// [`AmazonPayResponse`] or fails with a transport/configuration error. The
/// client never interprets response bodies.
pub struct AmazonPayClient {
    context: SigningContext,
    http_client: reqwest::blocking::Client,
}

impl AmazonPayClient {
    pub fn new(context: SigningContext) -> CustomResult<Self, ConnectorError> {
        let http_client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .change_context(ApiClientError::ClientConstructionFailed)
            .change_context(ConnectorError::ProcessingStepFailed)?;
        Ok(Self {
            context,
            http_client,
        })
    }

    pub fn context(&self) -> &SigningContext {
        &self.context
    }

    /// Executes one signed call. POST requests get a fresh idempotency key,
    /// so every call is a logically distinct attempt.
    pub fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestContent>,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        self.execute_with_idempotency_key(method, path, body, None)
    }

    /// Executes one signed call reusing a caller-supplied idempotency key.
    ///
    /// Reusing a key makes the processor treat the call as a resend of the
    /// earlier operation and return its prior result.
    pub fn execute_with_idempotency_key(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestContent>,
        idempotency_key: Option<&str>,
    ) -> CustomResult<AmazonPayResponse, ConnectorError> {
        let url = format!("{}{}", self.context.base_url(), path);
        let mut request = RequestBuilder::new()
            .method(method)
            .url(&url)
            .set_optional_body(body)
            .build();
        let payload = request.body.as_ref().map(RequestContent::get_inner_value);

        let minted;
        let idempotency_key = match (method, idempotency_key) {
            (Method::Post, Some(key)) => Some(key),
            (Method::Post, None) => {
                minted = generate_idempotency_key();
                Some(minted.as_str())
            }
            _ => None,
        };

        let signer = RequestSigner::new(&self.context);
        request.headers = signer.sign(
            request.method,
            &request.url,
            &request.query_params,
            payload.as_deref(),
            idempotency_key,
        )?;

        self.send(&request, payload)
            .change_context(ConnectorError::ProcessingStepFailed)
    }

    fn send(
        &self,
        request: &Request,
        payload: Option<String>,
    ) -> CustomResult<AmazonPayResponse, ApiClientError> {
        let parsed_url =
            reqwest::Url::parse(&request.url).change_context(ApiClientError::UrlEncodingFailed)?;

        let mut outgoing = match request.method {
            Method::Get => self.http_client.get(parsed_url),
            Method::Post => self.http_client.post(parsed_url),
            Method::Put => self.http_client.put(parsed_url),
            Method::Delete => self.http_client.delete(parsed_url),
            Method::Patch => self.http_client.patch(parsed_url),
        };
        for (key, value) in &request.headers {
            outgoing = outgoing.header(key, value);
        }
        if let Some(payload) = payload {
            outgoing = outgoing.body(payload);
        }

        let start = Instant::now();
        let response = outgoing.send().map_err(|error| {
            if error.is_timeout() {
                report!(ApiClientError::RequestTimeoutReceived)
            } else {
                report!(ApiClientError::RequestNotSent(error.to_string()))
            }
        })?;

        let status_code = response.status().as_u16();
        let body = response
            .bytes()
            .change_context(ApiClientError::ResponseDecodingFailed)?;
        tracing::info!(
            method = %request.method,
            url = %request.url,
            status_code,
            latency = start.elapsed().as_millis() as u64,
            "outgoing request completed"
        );
        Ok(AmazonPayResponse::new(status_code, body))
    }
}
