use crate::constants::*;
use log::warn;
use reqwire_core::Context;
use std::str::FromStr;
use std::time::Duration;

/// Default number of attempts per call, retries included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
/// Default deadline for one call, retries included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Largest timeout accepted from the environment.
const MAX_ENV_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Config carries the client settings that are not part of a single request.
///
/// Fields that are already set win over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// `region` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_REGION`]
    /// - env value: [`AWS_DEFAULT_REGION`]
    pub region: Option<String>,
    /// `endpoint_url` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_ENDPOINT_URL`]
    ///
    /// When unset, every service uses its derived endpoint.
    pub endpoint_url: Option<String>,
    /// `max_attempts` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AWS_MAX_ATTEMPTS`]
    pub max_attempts: Option<usize>,
    /// `timeout` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`REQWIRE_AWS_TIMEOUT_SECS`], in seconds
    pub timeout: Option<Duration>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set endpoint_url
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set max_attempts
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let non_empty = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        if self.region.is_none() {
            self.region = non_empty(AWS_REGION).or_else(|| non_empty(AWS_DEFAULT_REGION));
        }
        if let Some(v) = non_empty(AWS_ENDPOINT_URL) {
            self.endpoint_url.get_or_insert(v);
        }
        if let Some(v) = non_empty(AWS_MAX_ATTEMPTS).and_then(|v| parse_env(AWS_MAX_ATTEMPTS, &v)) {
            self.max_attempts.get_or_insert(v);
        }
        if let Some(v) = non_empty(REQWIRE_AWS_TIMEOUT_SECS)
            .and_then(|v| parse_env::<u64>(REQWIRE_AWS_TIMEOUT_SECS, &v))
        {
            if v > MAX_ENV_TIMEOUT_SECS {
                warn!(
                    "ignoring env {REQWIRE_AWS_TIMEOUT_SECS}: {v} exceeds the limit of {MAX_ENV_TIMEOUT_SECS} seconds"
                );
            } else {
                self.timeout.get_or_insert(Duration::from_secs(v));
            }
        }

        self
    }

    /// Attempts per call, at least one.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1)
    }

    /// Deadline for one call.
    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("ignoring env {key}: {value:?} is not a valid number");
            None
        }
    }
}
