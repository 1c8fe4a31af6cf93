use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A decoded successful response.
#[derive(Debug, Clone)]
pub struct AwsResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Request id from the headers or the body, if the service sent one.
    pub request_id: Option<String>,
    /// Parsed body. `Value::Null` for empty bodies.
    ///
    /// Rest payloads that are neither XML nor JSON, such as S3 objects, are
    /// kept as a string when they are UTF-8 and `Value::Null` otherwise.
    pub body: Value,
    /// Body bytes as received.
    pub raw: Bytes,
}

impl AwsResponse {
    /// Look up a value by JSON pointer, e.g. `/Topics/member/0/TopicArn`.
    pub fn get(&self, pointer: &str) -> Option<&Value> {
        self.body.pointer(pointer)
    }

    /// Look up a string by JSON pointer.
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.get(pointer).and_then(Value::as_str)
    }

    /// Deserialize the body into `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> reqwire_core::Result<T> {
        serde_json::from_value(self.body.clone()).map_err(|e| {
            reqwire_core::Error::protocol("response body does not match the expected shape")
                .with_source(e)
        })
    }
}
