use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the trait used by signers as the signing key.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is usable for signing.
    fn is_valid(&self) -> bool;
}

/// ProvideCredential is the trait used to load credentials from the environment.
///
/// Implementations are called once per outbound request and must not cache:
/// rotating the underlying material takes effect on the very next call.
///
/// Returning `Ok(None)` means "no credential available here"; callers decide
/// whether that is fatal.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Load a credential from the given context.
    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>>;
}
