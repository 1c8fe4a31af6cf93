use crate::codec;
use crate::config::Config;
use crate::protocol::ServiceProtocol;
use crate::provide_credential::EnvCredentialProvider;
use crate::request::RequestSpec;
use crate::response::AwsResponse;
use crate::retry::RetryPolicy;
use crate::sign_request::RequestSigner;
use crate::transport::Transport;
use crate::Credential;
use bytes::Bytes;
use http::Request;
use log::debug;
use reqwire_core::{Context, Error, ProvideCredential, Result, SigningCredential};
use std::sync::Arc;

type DynProvider = dyn ProvideCredential<Credential = Credential>;

/// Client turns a [`RequestSpec`] into a signed call and a decoded response.
///
/// Cloning is cheap and clones share everything. A client never mutates
/// itself, so calls can run concurrently from any number of tasks.
#[derive(Debug, Clone)]
pub struct Client {
    ctx: Context,
    config: Arc<Config>,
    provider: Arc<DynProvider>,
    retry: RetryPolicy,
}

impl Client {
    /// Create a client that reads its config and credentials from `ctx`'s
    /// environment.
    pub fn new(ctx: Context) -> Self {
        let config = Config::new().from_env(&ctx);
        let retry = RetryPolicy::default().with_max_attempts(config.max_attempts());
        Self {
            ctx,
            config: Arc::new(config),
            provider: Arc::new(EnvCredentialProvider::new()),
            retry,
        }
    }

    /// Replace the config. The retry policy follows its `max_attempts`.
    pub fn with_config(mut self, config: Config) -> Self {
        self.retry = self.retry.with_max_attempts(config.max_attempts());
        self.config = Arc::new(config);
        self
    }

    /// Replace the credential provider.
    pub fn with_credential_provider(
        mut self,
        provider: impl ProvideCredential<Credential = Credential>,
    ) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Config in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Send one API call.
    ///
    /// Credentials are resolved once per call; every attempt is signed again
    /// with the time it is sent at.
    pub async fn request(&self, spec: RequestSpec) -> Result<AwsResponse> {
        let protocol = ServiceProtocol::lookup(&spec.service);

        let region = spec
            .region
            .as_deref()
            .or(self.config.region.as_deref())
            .ok_or_else(|| {
                Error::config_invalid(format!(
                    "no region for service {}, set AWS_REGION or RequestSpec::with_region",
                    spec.service
                ))
            })?;

        let cred = self
            .provider
            .provide_credential(&self.ctx)
            .await?
            .filter(|v| v.is_valid())
            .ok_or_else(|| Error::credential_invalid("no valid aws credential found"))?;

        let endpoint = match spec.endpoint.as_deref().or(self.config.endpoint_url.as_deref()) {
            Some(v) => v.to_string(),
            None => protocol.endpoint(region),
        };
        let template = codec::encode(&spec, &protocol, &endpoint)?;
        let signer = RequestSigner::for_protocol(&protocol, region);
        debug!(
            "sending {} {} {} to {endpoint}",
            protocol.service,
            template.method(),
            spec.action.as_deref().unwrap_or_else(|| template.uri().path())
        );

        Transport::new(self.retry, self.config.timeout())
            .send(&self.ctx, &protocol, |now| {
                let (mut parts, body) = copy_request(&template).into_parts();
                signer.sign_request(&self.ctx, &mut parts, &body, &cred, now)?;
                Ok(Request::from_parts(parts, body))
            })
            .await
    }
}

/// `http::Request` is not `Clone`, rebuild one from the unsigned template.
fn copy_request(template: &Request<Bytes>) -> Request<Bytes> {
    let mut req = Request::new(template.body().clone());
    *req.method_mut() = template.method().clone();
    *req.uri_mut() = template.uri().clone();
    *req.version_mut() = template.version();
    *req.headers_mut() = template.headers().clone();
    req
}
