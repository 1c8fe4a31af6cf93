use reqwire_core::{Context, OsEnv, SystemClock};
use reqwire_http_send_reqwest::ReqwestHttpSend;

/// Create a context that reads the OS environment and sends requests with a
/// fresh [`reqwest::Client`].
///
/// ```
/// let ctx = reqwire::default_context();
/// let _ = ctx.env_var("AWS_REGION");
/// ```
pub fn default_context() -> Context {
    default_context_with_client(reqwest::Client::new())
}

/// Same as [`default_context`] but sends requests with `client`.
pub fn default_context_with_client(client: reqwest::Client) -> Context {
    Context::new()
        .with_env(OsEnv)
        .with_http_send(ReqwestHttpSend::new(client))
        .with_clock(SystemClock)
}
