//! Core components for signing and sending cloud API requests.
//!
//! This crate provides the provider-agnostic building blocks of the reqwire
//! ecosystem. Provider crates (for example `reqwire-aws`) build their
//! signers, codecs and transports on top of it.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending,
//!   environment access and the wall clock. Everything with a side effect goes
//!   through it, so tests can swap any piece.
//! - **Traits**: [`ProvideCredential`] loads credentials, [`SigningCredential`]
//!   validates them.
//! - **Error**: One [`Error`] type with an [`ErrorKind`] that callers match on,
//!   optionally carrying the provider's [`ApiError`].
//!
//! ## Example
//!
//! ```
//! use reqwire_core::{Context, StaticEnv};
//! use std::collections::HashMap;
//!
//! let ctx = Context::new().with_env(StaticEnv {
//!     envs: HashMap::from([("AWS_REGION".to_string(), "us-east-1".to_string())]),
//! });
//!
//! assert_eq!(ctx.env_var("AWS_REGION").as_deref(), Some("us-east-1"));
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::Clock;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;
pub use context::SystemClock;

mod error;
pub use error::ApiError;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod api;
pub use api::{ProvideCredential, SigningCredential};
