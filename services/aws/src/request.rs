use bytes::Bytes;
use http::Method;
use serde_json::Value;

/// Description of one API call, consumed by [`crate::Client::request`].
///
/// ```
/// use reqwire_aws::{Body, RequestSpec};
///
/// let spec = RequestSpec::action("sns", "CreateTopic")
///     .with_region("us-east-1")
///     .with_body(Body::params([("Name", "orders")]));
/// assert_eq!(spec.action.as_deref(), Some("CreateTopic"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Service name, looked up in the protocol table.
    pub service: String,
    /// Region override; falls back to [`crate::Config::region`].
    pub region: Option<String>,
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: RequestPath,
    /// Query parameters, unencoded.
    pub query: Vec<(String, String)>,
    /// Extra headers, sent and signed as given.
    pub headers: Vec<(String, String)>,
    /// Operation name for query and json-rpc services.
    pub action: Option<String>,
    /// Overrides the `Version` the protocol table has for query services.
    pub api_version: Option<String>,
    /// Request payload.
    pub body: Body,
    /// Base URL override such as `http://localhost:4566`.
    pub endpoint: Option<String>,
}

/// Path of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPath {
    /// Unencoded path, percent-encoded once when the request is built.
    Raw(String),
    /// Already percent-encoded path, sent verbatim.
    Encoded(String),
}

/// Request payload.
#[derive(Debug, Clone, Default)]
pub enum Body {
    /// No payload.
    #[default]
    Empty,
    /// Query-form parameters, appended after `Action` and `Version`.
    Params(Vec<(String, String)>),
    /// JSON document for json-rpc and rest-json services.
    Json(Value),
    /// XML document for rest-xml services.
    Xml(String),
    /// Bytes sent as-is.
    Raw(Bytes),
}

impl Body {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Body::Empty => "empty",
            Body::Params(_) => "params",
            Body::Json(_) => "json",
            Body::Xml(_) => "xml",
            Body::Raw(_) => "raw",
        }
    }

    /// Build [`Body::Params`] from key/value pairs.
    pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::Params(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl RequestSpec {
    /// Create a request for `method` on `path`.
    pub fn new(service: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            region: None,
            method,
            path: RequestPath::Raw(path.into()),
            query: Vec::new(),
            headers: Vec::new(),
            action: None,
            api_version: None,
            body: Body::Empty,
            endpoint: None,
        }
    }

    /// Create a `POST /` request for an action-addressed operation.
    pub fn action(service: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new(service, Method::POST, "/").with_action(action)
    }

    /// Set the region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Append a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set the operation name.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the payload.
    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Use an already percent-encoded path.
    pub fn with_encoded_path(mut self, path: impl Into<String>) -> Self {
        self.path = RequestPath::Encoded(path.into());
        self
    }

    /// Send to `endpoint` instead of the derived service endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
