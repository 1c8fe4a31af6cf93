//! [`HttpSend`] implementation backed by [`reqwest`].

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use reqwest::{Client, Request};
use reqwire_core::{Error, HttpSend, Result};

/// Sends requests through a shared `reqwest::Client`.
///
/// Connect, reset and DNS failures surface as
/// [`ErrorKind::Network`](reqwire_core::ErrorKind::Network); client-side
/// timeouts as [`ErrorKind::Timeout`](reqwire_core::ErrorKind::Timeout).
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req).map_err(|e| {
            Error::request_invalid("failed to convert request").with_source(anyhow::Error::new(e))
        })?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(map_reqwest_error)?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(map_reqwest_error)?;
        Ok(http::Response::from_parts(parts, bs))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> Error {
    let message = err.to_string();
    if err.is_timeout() {
        Error::timeout(message).with_source(anyhow::Error::new(err))
    } else if err.is_builder() {
        Error::request_invalid(message).with_source(anyhow::Error::new(err))
    } else {
        // connect, reset, dns and body read failures are all transient
        Error::network(message).with_source(anyhow::Error::new(err))
    }
}
