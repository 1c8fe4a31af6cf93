//! AWS client with a ready to use default.

pub use reqwire_aws::*;

#[cfg(feature = "default-context")]
use crate::default_context;

/// Create a client on [`default_context`].
///
/// Region, endpoint and attempts come from `AWS_REGION` (or
/// `AWS_DEFAULT_REGION`), `AWS_ENDPOINT_URL` and `AWS_MAX_ATTEMPTS`.
/// Credentials are read from `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and
/// `AWS_SESSION_TOKEN` on every call.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> reqwire_core::Result<()> {
/// use reqwire::aws::{default_client, RequestSpec, StaticCredentialProvider};
///
/// let client = default_client()
///     .with_credential_provider(StaticCredentialProvider::new(
///         "my-access-key",
///         "my-secret-key",
///     ));
/// let resp = client
///     .request(RequestSpec::action("sts", "GetCallerIdentity").with_region("us-east-1"))
///     .await?;
/// println!("account: {:?}", resp.get_str("/Account"));
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_client() -> Client {
    Client::new(default_context())
}
