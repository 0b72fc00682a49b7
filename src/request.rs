use serde::{Deserialize, Serialize};

pub type Headers = Vec<(String, String)>;

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
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

pub enum RequestContent {
    Json(serde_json::Value),
    RawBytes(Vec<u8>),
}

impl std::fmt::Debug for RequestContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Json(_) => "JsonRequestBody",
            Self::RawBytes(_) => "RawBytesRequestBody",
        })
    }
}

impl RequestContent {
    /// The exact bytes that go on the wire, also the signature input.
    pub fn get_inner_value(&self) -> String {
        match self {
            Self::Json(value) => serde_json::to_string(value).unwrap_or_default(),
            Self::RawBytes(bytes) => String::from_utf8(bytes.clone()).unwrap_or_default(),
        }
    }
}

/// A query parameter value; lists are flattened to `key.1`, `key.2`, …
/// sub-keys during canonicalization.
#[derive(Clone, Debug)]
pub enum QueryValue {
    Single(String),
    List(Vec<String>),
}

#[derive(Debug)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub query_params: Vec<(String, QueryValue)>,
    pub body: Option<RequestContent>,
}

impl Request {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: String::from(url),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    pub fn set_body<T: Into<RequestContent>>(&mut self, body: T) {
        self.body.replace(body.into());
    }

    pub fn add_header(&mut self, header: &str, value: &str) {
        self.headers.push((String::from(header), String::from(value)));
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    pub url: String,
    pub method: Method,
    pub headers: Headers,
    pub query_params: Vec<(String, QueryValue)>,
    pub body: Option<RequestContent>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: Method::Get,
            url: String::with_capacity(1024),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: None,
        }
    }

    pub fn url(mut self, url: &str) -> Self {
        self.url = url.into();
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, header: &str, value: &str) -> Self {
        self.headers.push((header.into(), value.into()));
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn query_param(mut self, key: &str, value: QueryValue) -> Self {
        self.query_params.push((key.into(), value));
        self
    }

    pub fn set_optional_body<T: Into<RequestContent>>(mut self, body: Option<T>) -> Self {
        body.map(|body| self.body.replace(body.into()));
        self
    }

    pub fn set_body<T: Into<RequestContent>>(mut self, body: T) -> Self {
        self.body.replace(body.into());
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            query_params: self.query_params,
            body: self.body,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl From<serde_json::Value> for RequestContent {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}
