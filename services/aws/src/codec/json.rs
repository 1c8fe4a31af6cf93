use super::ErrorFields;
use serde::Deserialize;

/// Error body shared by json-rpc and rest-json services.
///
/// Services disagree on casing, so both spellings are accepted.
#[derive(Debug, Default, Deserialize)]
struct JsonErrorBody {
    #[serde(rename = "__type")]
    type_: Option<String>,
    code: Option<String>,
    #[serde(rename = "Code")]
    code_upper: Option<String>,
    message: Option<String>,
    #[serde(rename = "Message")]
    message_upper: Option<String>,
    #[serde(rename = "RequestId")]
    request_id: Option<String>,
}

/// Pick the error code and message out of a JSON error body.
///
/// Returns `None` if the body is not a JSON object.
pub(crate) fn parse_error(body: &[u8]) -> Option<ErrorFields> {
    let parsed: JsonErrorBody = serde_json::from_slice(body).ok()?;

    Some(ErrorFields {
        code: parsed.type_.or(parsed.code).or(parsed.code_upper),
        message: parsed.message.or(parsed.message_upper),
        request_id: parsed.request_id,
    })
}

/// Strip the namespace and the trailing URI from an error type.
///
/// `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException` and
/// `ResourceNotFoundException:http://internal.amazon.com/coral/...` both
/// become `ResourceNotFoundException`.
pub fn sanitize_code(code: &str) -> &str {
    let code = code.split(':').next().unwrap_or(code);
    code.rsplit('#').next().unwrap_or(code).trim()
}
