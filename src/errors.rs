/// Result alias carrying an [`error_stack`] report, as used across the crate.
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Failures raised by the gateway and its supporting layers.
///
/// Declines are not errors: a non-2xx processor verdict is persisted on the
/// transaction record and returned as an unsuccessful [`crate::gateway::GatewayResponse`].
/// This enum covers configuration mistakes, encoding problems, transport
/// failures and data inconsistencies, all of which abort the operation.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("Invalid connector configuration: {config}")]
    InvalidConnectorConfig { config: &'static str },
    #[error("Failed to encode request")]
    RequestEncodingFailed,
    #[error("Failed to sign request")]
    RequestSigningFailed,
    #[error("Failed to deserialize connector response")]
    ResponseDeserializationFailed,
    #[error("Missing required field: {field_name}")]
    MissingRequiredField { field_name: &'static str },
    #[error("No payment or transaction record found for handle {handle}")]
    RecordNotFound { handle: String },
    #[error("Processor returned an error: {message}")]
    ProcessorError { message: String },
    #[error("Failed to execute a processing step")]
    ProcessingStepFailed,
}

/// Transport-level failures, kept separate from [`ConnectorError`] so a DNS
/// or TLS problem is never mistaken for a decline.
#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("URL encoding of request failed")]
    UrlEncodingFailed,
    #[error("Failed to construct HTTP client")]
    ClientConstructionFailed,
    #[error("Request timed out")]
    RequestTimeoutReceived,
    #[error("Failed to send request to connector: {0}")]
    RequestNotSent(String),
    #[error("Failed to read connector response body")]
    ResponseDecodingFailed,
}
