use error_stack::report;
use rsa::{pkcs1::DecodeRsaPrivateKey, pkcs8::DecodePrivateKey, RsaPrivateKey};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::{ConnectorError, CustomResult};

/// Regions the processor operates endpoints in.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    Us,
    Uk,
    De,
    Jp,
}

impl Region {
    pub fn host(self) -> &'static str {
        match self {
            Self::Us => "pay-api.amazon.com",
            Self::Uk | Self::De => "pay-api.amazon.eu",
            Self::Jp => "pay-api.amazon.jp",
        }
    }
}

/// Sandbox/live selector; contributes a path segment to the base URL.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Live,
}

/// Immutable signing configuration for one merchant/store.
///
/// Constructed once and passed by reference into every signing and transport
/// call; concurrent payments for different merchant configurations never
/// share mutable state. The private key PEM is parsed eagerly so a bad key
/// fails here, before any network call.
#[derive(Clone)]
pub struct SigningContext {
    pub region: Region,
    pub public_key_id: String,
    pub environment: Environment,
    private_key: RsaPrivateKey,
    base_url: String,
}

impl SigningContext {
    pub fn new(
        region: Region,
        public_key_id: impl Into<String>,
        environment: Environment,
        private_key_pem: &SecretString,
    ) -> CustomResult<Self, ConnectorError> {
        let pem = private_key_pem.expose_secret();
        // Merchant keys come in both PKCS#8 and PKCS#1 wrapping.
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|_| {
                report!(ConnectorError::InvalidConnectorConfig {
                    config: "private_key"
                })
            })?;
        let base_url = format!("https://{}/{}/v1/", region.host(), environment);
        Ok(Self {
            region,
            public_key_id: public_key_id.into(),
            environment,
            private_key,
            base_url,
        })
    }

    /// Points the context at a different endpoint, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }
}

impl std::fmt::Debug for SigningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("region", &self.region)
            .field("public_key_id", &self.public_key_id)
            .field("environment", &self.environment)
            .field("private_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Amount in the smallest denomination of its currency.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize,
)]
pub struct MinorUnit(pub i64);

impl MinorUnit {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn get_amount_as_i64(self) -> i64 {
        self.0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Renders the amount the way the processor expects it on the wire,
    /// e.g. `1050` → `"10.50"`.
    pub fn to_major_unit_as_string(self) -> StringMajorUnit {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        StringMajorUnit(format!("{sign}{}.{:02}", cents / 100, cents % 100))
    }
}

impl std::fmt::Display for MinorUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Major-unit amount as a two-decimal string, the processor's wire format.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub struct StringMajorUnit(String);

impl StringMajorUnit {
    pub fn get_amount_as_string(&self) -> &str {
        &self.0
    }
}
