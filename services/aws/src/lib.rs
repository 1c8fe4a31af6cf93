//! AWS request signer and multi-protocol API client.
//!
//! This crate signs requests with [AWS SigV4] and speaks the four AWS wire
//! protocols (query, json-rpc, rest-json and rest-xml), so any control-plane
//! API can be called without the official SDK.
//!
//! ## Quick Start
//!
//! ```no_run
//! use reqwire_aws::{Body, Client, RequestSpec};
//! use reqwire_core::Context;
//!
//! # async fn example(ctx: Context) -> reqwire_core::Result<()> {
//! // `ctx` carries an `HttpSend` implementation, e.g. reqwire-http-send-reqwest.
//! let client = Client::new(ctx);
//!
//! let resp = client
//!     .request(
//!         RequestSpec::action("sns", "CreateTopic")
//!             .with_region("us-east-1")
//!             .with_body(Body::params([("Name", "orders")])),
//!     )
//!     .await?;
//! println!("topic: {:?}", resp.get_str("/TopicArn"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Credentials
//!
//! [`EnvCredentialProvider`] reads `AWS_ACCESS_KEY_ID`,
//! `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN` on every call.
//! [`StaticCredentialProvider`] always returns the same credential.
//!
//! ## Lower level pieces
//!
//! [`RequestSigner`] signs any `http::request::Parts`, [`codec`] encodes and
//! decodes the wire formats and [`Transport`] runs the retry loop.
//!
//! [AWS SigV4]: https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html

mod constants;
pub use constants::EMPTY_STRING_SHA256;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod canonical;
pub use canonical::CanonicalRequest;

mod sign_request;
pub use sign_request::generate_signing_key;
pub use sign_request::RequestSigner;
pub use sign_request::SigningContext;

mod protocol;
pub use protocol::Protocol;
pub use protocol::ServiceProtocol;
pub use protocol::UriEncoding;
pub use protocol::SERVICES;

mod request;
pub use request::Body;
pub use request::RequestPath;
pub use request::RequestSpec;

mod response;
pub use response::AwsResponse;

pub mod codec;

mod retry;
pub use retry::RetryPolicy;

mod transport;
pub use transport::Transport;

mod config;
pub use config::Config;
pub use config::DEFAULT_MAX_ATTEMPTS;
pub use config::DEFAULT_TIMEOUT;

mod client;
pub use client::Client;
