//! Wire format encoding and decoding for the four AWS protocols.

mod json;
mod xml;

use crate::constants::*;
use crate::protocol::{Protocol, ServiceProtocol};
use crate::request::{Body, RequestPath, RequestSpec};
use crate::response::AwsResponse;
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Response, StatusCode, Uri};
use log::debug;
use percent_encoding::utf8_percent_encode;
use reqwire_core::{ApiError, Error, ErrorKind, Result};
use serde_json::Value;

pub use json::sanitize_code;

/// Error codes that mean the caller is being rate limited.
pub const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestThrottledException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "TransactionInProgressException",
    "RequestLimitExceeded",
    "BandwidthLimitExceeded",
    "LimitExceededException",
    "RequestThrottled",
    "SlowDown",
    "PriorRequestNotComplete",
    "EC2ThrottledException",
];

/// Raw bodies quoted in error messages are cut to this many chars.
const MAX_BODY_IN_MESSAGE: usize = 256;

/// Error details found in a response body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct ErrorFields {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
}

/// Encode `spec` into an unsigned HTTP request addressed to `endpoint`.
pub fn encode(
    spec: &RequestSpec,
    protocol: &ServiceProtocol,
    endpoint: &str,
) -> Result<Request<Bytes>> {
    let mut query = spec.query.clone();
    let mut headers = HeaderMap::new();
    for (k, v) in &spec.headers {
        headers.append(HeaderName::from_bytes(k.as_bytes())?, HeaderValue::from_str(v)?);
    }

    let body = match protocol.protocol {
        Protocol::Query => {
            let pairs = query_params(spec, protocol)?;
            if spec.method == Method::GET {
                query.extend(pairs);
                Bytes::new()
            } else {
                set_default(&mut headers, CONTENT_TYPE, CONTENT_TYPE_FORM)?;
                form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish()
                    .into()
            }
        }
        Protocol::JsonRpc => {
            let action = required_action(spec)?;
            headers.insert(
                X_AMZ_TARGET,
                HeaderValue::try_from(format!("{}.{action}", protocol.target_prefix))?,
            );
            set_default(&mut headers, CONTENT_TYPE, &protocol.json_content_type())?;
            match &spec.body {
                Body::Empty => Bytes::from_static(b"{}"),
                Body::Json(v) => json_bytes(v)?,
                Body::Raw(b) => b.clone(),
                _ => return Err(unsupported_body(spec, protocol)),
            }
        }
        Protocol::RestJson => match &spec.body {
            Body::Empty => Bytes::new(),
            Body::Json(v) => {
                set_default(&mut headers, CONTENT_TYPE, CONTENT_TYPE_JSON)?;
                json_bytes(v)?
            }
            Body::Raw(b) => b.clone(),
            _ => return Err(unsupported_body(spec, protocol)),
        },
        Protocol::RestXml => match &spec.body {
            Body::Empty => Bytes::new(),
            Body::Xml(s) => {
                set_default(&mut headers, CONTENT_TYPE, CONTENT_TYPE_XML)?;
                Bytes::from(s.clone())
            }
            Body::Raw(b) => b.clone(),
            _ => return Err(unsupported_body(spec, protocol)),
        },
    };

    let uri = build_uri(endpoint, &spec.path, &query)?;
    let mut req = Request::builder()
        .method(spec.method.clone())
        .uri(uri)
        .body(body)?;
    *req.headers_mut() = headers;
    Ok(req)
}

fn required_action(spec: &RequestSpec) -> Result<&str> {
    spec.action.as_deref().ok_or_else(|| {
        Error::request_invalid(format!(
            "service {} requires an action for every request",
            spec.service
        ))
    })
}

fn query_params(spec: &RequestSpec, protocol: &ServiceProtocol) -> Result<Vec<(String, String)>> {
    let action = required_action(spec)?;
    let version = spec.api_version.as_deref().unwrap_or(protocol.api_version);
    if version.is_empty() {
        return Err(Error::request_invalid(format!(
            "no api version known for service {}, set one with RequestSpec::with_api_version",
            spec.service
        )));
    }

    let mut pairs = vec![
        ("Action".to_string(), action.to_string()),
        ("Version".to_string(), version.to_string()),
    ];
    match &spec.body {
        Body::Empty => {}
        Body::Params(params) => pairs.extend(params.iter().cloned()),
        _ => return Err(unsupported_body(spec, protocol)),
    }
    Ok(pairs)
}

fn unsupported_body(spec: &RequestSpec, protocol: &ServiceProtocol) -> Error {
    Error::request_invalid(format!(
        "{} body is not supported by {:?} service {}",
        spec.body.kind(),
        protocol.protocol,
        spec.service
    ))
}

fn json_bytes(v: &Value) -> Result<Bytes> {
    serde_json::to_vec(v)
        .map(Bytes::from)
        .map_err(|e| Error::request_invalid("failed to serialize json body").with_source(e))
}

fn set_default(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<()> {
    if !headers.contains_key(&name) {
        headers.insert(name, HeaderValue::from_str(value)?);
    }
    Ok(())
}

fn build_uri(endpoint: &str, path: &RequestPath, query: &[(String, String)]) -> Result<Uri> {
    let invalid_endpoint = || {
        Error::config_invalid(format!(
            "endpoint {endpoint} must be an absolute url such as https://host"
        ))
    };
    if !endpoint.contains("://") {
        return Err(invalid_endpoint());
    }
    let mut s = endpoint.trim_end_matches('/').to_string();

    let path = match path {
        RequestPath::Raw(p) => utf8_percent_encode(p, &AWS_URI_ENCODE_SET).to_string(),
        RequestPath::Encoded(p) => p.clone(),
    };
    if !path.starts_with('/') {
        s.push('/');
    }
    s.push_str(&path);

    for (i, (k, v)) in query.iter().enumerate() {
        s.push(if i == 0 { '?' } else { '&' });
        s.push_str(&utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string());
        s.push('=');
        s.push_str(&utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string());
    }

    let uri: Uri = s.parse()?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(invalid_endpoint());
    }
    Ok(uri)
}

/// Decode a response, turning error statuses into an [`Error`] carrying an [`ApiError`].
pub fn decode(protocol: &ServiceProtocol, resp: Response<Bytes>) -> Result<AwsResponse> {
    let (parts, body) = resp.into_parts();
    let header_request_id = request_id_from_headers(&parts.headers);

    if !parts.status.is_success() {
        return Err(decode_error(
            protocol,
            parts.status,
            &parts.headers,
            &body,
            header_request_id,
        ));
    }

    let (value, body_request_id) = if body.iter().all(u8::is_ascii_whitespace) {
        (Value::Null, None)
    } else {
        match body_format(protocol, &parts.headers) {
            BodyFormat::Query => decode_query(&body)?,
            BodyFormat::Xml => (xml::parse(&body)?.1, None),
            BodyFormat::Json => {
                let value = serde_json::from_slice(&body).map_err(|e| {
                    Error::protocol("response body is not valid json").with_source(e)
                })?;
                (value, None)
            }
            BodyFormat::Opaque => {
                let text = std::str::from_utf8(&body).ok().map(str::to_string);
                (text.map(Value::String).unwrap_or_default(), None)
            }
        }
    };

    Ok(AwsResponse {
        status: parts.status,
        request_id: header_request_id.or(body_request_id),
        headers: parts.headers,
        body: value,
        raw: body,
    })
}

/// How a success body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Query,
    Xml,
    Json,
    /// Payload such as an S3 object; kept as is.
    Opaque,
}

/// Query and json-rpc bodies always use their protocol's format. Rest
/// bodies follow `content-type` and fall back to the protocol's format when
/// it is missing.
fn body_format(protocol: &ServiceProtocol, headers: &HeaderMap) -> BodyFormat {
    let default = match protocol.protocol {
        Protocol::Query => return BodyFormat::Query,
        Protocol::JsonRpc => return BodyFormat::Json,
        Protocol::RestJson => BodyFormat::Json,
        Protocol::RestXml => BodyFormat::Xml,
    };

    let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return default;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if mime.is_empty() {
        default
    } else if mime.ends_with("/xml") || mime.ends_with("+xml") {
        BodyFormat::Xml
    } else if mime.ends_with("/json") || mime.ends_with("+json") || mime.contains("x-amz-json") {
        BodyFormat::Json
    } else {
        BodyFormat::Opaque
    }
}

/// Unwrap `<OpResponse><OpResult>` so callers see the result fields.
fn decode_query(body: &[u8]) -> Result<(Value, Option<String>)> {
    let (_, mut root) = xml::parse(body)?;

    let request_id = root
        .pointer("/ResponseMetadata/RequestId")
        .or_else(|| root.get("requestId"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let Value::Object(map) = &mut root else {
        return Ok((root, request_id));
    };
    if let Some(key) = map.keys().find(|k| k.ends_with("Result")).cloned() {
        return Ok((map.remove(&key).unwrap_or_default(), request_id));
    }

    // Responses without a result wrapper, such as EC2's.
    map.remove("ResponseMetadata");
    map.remove("requestId");
    if map.is_empty() {
        return Ok((Value::Null, request_id));
    }
    Ok((root, request_id))
}

fn decode_error(
    protocol: &ServiceProtocol,
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    request_id: Option<String>,
) -> Error {
    let fields = match protocol.protocol {
        Protocol::Query | Protocol::RestXml => xml::parse_error(body),
        Protocol::JsonRpc | Protocol::RestJson => json::parse_error(body),
    };

    let header_code = match protocol.protocol {
        Protocol::RestJson => headers
            .get(X_AMZN_ERROR_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        _ => None,
    };

    let (code, message, body_request_id) = match fields {
        Some(f) => (header_code.or(f.code), f.message, f.request_id),
        None => {
            let text = String::from_utf8_lossy(body);
            let text = text.trim();
            let message = (!text.is_empty()).then(|| truncate_str(text, MAX_BODY_IN_MESSAGE).to_string());
            (header_code, message, None)
        }
    };

    let code = code
        .as_deref()
        .map(sanitize_code)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| status_code_name(status));

    let kind = classify(status, &code);
    let api = ApiError {
        code,
        message: message.unwrap_or_default(),
        status,
        request_id: request_id.or(body_request_id),
        retryable: kind.is_retryable(),
    };
    debug!("service {} responded with error: {api}", protocol.service);

    Error::api(kind, api)
}

/// Classify a failed response by HTTP status and service error code.
pub fn classify(status: StatusCode, code: &str) -> ErrorKind {
    if status == StatusCode::TOO_MANY_REQUESTS || THROTTLING_CODES.contains(&code) {
        ErrorKind::Throttling
    } else if status.is_server_error() {
        ErrorKind::Server
    } else {
        ErrorKind::Client
    }
}

fn status_code_name(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.split_whitespace().collect(),
        None => format!("Http{}", status.as_u16()),
    }
}

fn request_id_from_headers(headers: &HeaderMap) -> Option<String> {
    [X_AMZN_REQUEST_ID, X_AMZ_REQUEST_ID]
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
