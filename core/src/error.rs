use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// The error type for reqwire operations
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    api: Option<ApiError>,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required credential material is missing or malformed
    CredentialInvalid,

    /// Request cannot be built or signed (missing required fields, etc.)
    RequestInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Connection-level failure: refused, reset, DNS
    Network,

    /// The call deadline elapsed before any attempt completed
    Timeout,

    /// The service signaled rate limiting
    Throttling,

    /// The service failed with a 5xx-class error
    Server,

    /// The service rejected the request with a non-throttling 4xx error
    Client,

    /// The response body did not parse under the expected protocol
    Protocol,

    /// Unexpected errors
    Unexpected,
}

impl ErrorKind {
    /// Whether errors of this kind are transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::Throttling | ErrorKind::Server
        )
    }
}

/// A failure reported by the remote service, normalized across wire protocols.
///
/// `code` and `message` are kept exactly as the service sent them so callers
/// can match on text such as `"AlreadyExists"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Service error code, e.g. `InvalidParameter`.
    pub code: String,
    /// Human readable message, empty if the service sent none.
    pub message: String,
    /// HTTP status of the response.
    pub status: StatusCode,
    /// Request id assigned by the service, if any.
    pub request_id: Option<String>,
    /// Whether the transport may retry this failure.
    pub retryable: bool,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} (status {}", self.code, self.message, self.status)?;
        if let Some(id) = &self.request_id {
            write!(f, ", request id {id}")?;
        }
        write!(f, ")")
    }
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            api: None,
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the service error, if this failure came from a decoded response
    pub fn api_error(&self) -> Option<&ApiError> {
        self.api.as_ref()
    }

    /// Get the service error code, if any
    pub fn code(&self) -> Option<&str> {
        self.api.as_ref().map(|v| v.code.as_str())
    }

    /// Check if this is a credential error
    pub fn is_credential_error(&self) -> bool {
        self.kind == ErrorKind::CredentialInvalid
    }

    /// Check if the transport may retry this error
    pub fn is_retryable(&self) -> bool {
        match &self.api {
            Some(api) => api.retryable,
            None => self.kind.is_retryable(),
        }
    }
}

// Convenience constructors
impl Error {
    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create an error from a decoded service failure.
    ///
    /// Provider crates classify the failure into `kind`; the message is
    /// rendered from `api`.
    pub fn api(kind: ErrorKind, api: ApiError) -> Self {
        Self {
            kind,
            message: api.to_string(),
            api: Some(api),
            source: None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::Network => write!(f, "network error"),
            ErrorKind::Timeout => write!(f, "deadline exceeded"),
            ErrorKind::Throttling => write!(f, "throttled"),
            ErrorKind::Server => write!(f, "server error"),
            ErrorKind::Client => write!(f, "client error"),
            ErrorKind::Protocol => write!(f, "protocol error"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::method::InvalidMethod> for Error {
    fn from(err: http::method::InvalidMethod) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
