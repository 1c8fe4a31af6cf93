// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::canonical::CanonicalRequest;
use crate::constants::*;
use crate::protocol::{ServiceProtocol, UriEncoding};
use crate::Credential;
use http::header::{self, HeaderValue};
use http::request::Parts;
use log::debug;
use reqwire_core::hash::{hex_hmac_sha256, hex_sha256, hmac_sha256};
use reqwire_core::time::{format_date, format_iso8601, DateTime};
use reqwire_core::utils::Redact;
use reqwire_core::{Context, Error, Result, SigningCredential};
use std::fmt::{Debug, Formatter};

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
    uri_encoding: UriEncoding,
    content_sha256: bool,
}

impl RequestSigner {
    /// Create a new signer for `service` in `region`.
    ///
    /// S3 gets single path encoding and the `x-amz-content-sha256` header.
    pub fn new(service: &str, region: &str) -> Self {
        let s3 = service == "s3";
        Self {
            service: service.into(),
            region: region.into(),
            uri_encoding: if s3 {
                UriEncoding::Single
            } else {
                UriEncoding::Double
            },
            content_sha256: s3,
        }
    }

    /// Create a signer following the rules of `protocol` in `region`.
    pub fn for_protocol(protocol: &ServiceProtocol, region: &str) -> Self {
        Self {
            service: protocol.signing_name.to_string(),
            region: protocol.signing_region(region).to_string(),
            uri_encoding: protocol.uri_encoding(),
            content_sha256: protocol.requires_content_sha256(),
        }
    }

    /// Sign the request at `time`.
    ///
    /// Adds `host`, `x-amz-date`, `x-amz-security-token` (when the credential
    /// carries a session token), `x-amz-content-sha256` for S3 and finally
    /// `authorization`. Any previous signature is replaced.
    pub fn sign_request(
        &self,
        _: &Context,
        req: &mut Parts,
        body: &[u8],
        cred: &Credential,
        time: DateTime,
    ) -> Result<()> {
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "credential must have both access key id and secret access key",
            ));
        }

        req.headers.remove(header::AUTHORIZATION);

        if req.headers.get(header::HOST).is_none() {
            let authority = req
                .uri
                .authority()
                .ok_or_else(|| Error::request_invalid("request uri has no host"))?;
            req.headers
                .insert(header::HOST, HeaderValue::from_str(authority.as_str())?);
        }
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(time))?);

        match &cred.session_token {
            Some(token) => {
                let mut value = HeaderValue::from_str(token)?;
                // Keep the token out of debug output.
                value.set_sensitive(true);
                req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
            }
            None => {
                req.headers.remove(X_AMZ_SECURITY_TOKEN);
            }
        }

        if self.content_sha256 {
            req.headers
                .insert(X_AMZ_CONTENT_SHA_256, HeaderValue::try_from(hex_sha256(body))?);
        }

        let creq = CanonicalRequest::build(req, body, self.uri_encoding)?;
        debug!("calculated canonical request: {creq}");

        let ctx = SigningContext::new(cred, time, &self.region, &self.service);
        let signature = ctx.sign(&creq);

        let mut authorization = HeaderValue::try_from(ctx.authorization(&creq, &signature))?;
        authorization.set_sensitive(true);
        req.headers.insert(header::AUTHORIZATION, authorization);

        Ok(())
    }
}

/// Per-attempt signing material: timestamp, scope and derived key.
pub struct SigningContext {
    access_key_id: String,
    timestamp: String,
    scope: String,
    signing_key: Vec<u8>,
}

impl Debug for SigningContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningContext")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("timestamp", &self.timestamp)
            .field("scope", &self.scope)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl SigningContext {
    /// Derive the signing material for `cred` at `time`.
    pub fn new(cred: &Credential, time: DateTime, region: &str, service: &str) -> Self {
        // Scope: "20220313/<region>/<service>/aws4_request"
        let scope = format!(
            "{}/{}/{}/{}",
            format_date(time),
            region,
            service,
            AWS4_REQUEST
        );
        debug!("calculated scope: {scope}");

        Self {
            access_key_id: cred.access_key_id.clone(),
            timestamp: format_iso8601(time),
            scope,
            signing_key: generate_signing_key(&cred.secret_access_key, time, region, service),
        }
    }

    /// Credential scope, `<date>/<region>/<service>/aws4_request`.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Build the string to sign.
    ///
    /// ```text
    /// AWS4-HMAC-SHA256
    /// 20220313T072004Z
    /// 20220313/<region>/<service>/aws4_request
    /// <hashed_canonical_request>
    /// ```
    pub fn string_to_sign(&self, creq: &CanonicalRequest) -> String {
        format!(
            "{AWS4_HMAC_SHA256}\n{}\n{}\n{}",
            self.timestamp,
            self.scope,
            creq.hash()
        )
    }

    /// Hex encoded signature of `creq`.
    pub fn sign(&self, creq: &CanonicalRequest) -> String {
        let string_to_sign = self.string_to_sign(creq);
        debug!("calculated string to sign: {string_to_sign}");

        hex_hmac_sha256(&self.signing_key, string_to_sign.as_bytes())
    }

    /// Value of the `authorization` header.
    pub fn authorization(&self, creq: &CanonicalRequest, signature: &str) -> String {
        format!(
            "{AWS4_HMAC_SHA256} Credential={}/{}, SignedHeaders={}, Signature={}",
            self.access_key_id,
            self.scope,
            creq.signed_headers(),
            signature
        )
    }
}

/// Derive the SigV4 signing key.
pub fn generate_signing_key(secret: &str, time: DateTime, region: &str, service: &str) -> Vec<u8> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes());
    // Sign region
    let sign_region = hmac_sha256(sign_date.as_slice(), region.as_bytes());
    // Sign service
    let sign_service = hmac_sha256(sign_region.as_slice(), service.as_bytes());
    // Sign request
    hmac_sha256(sign_service.as_slice(), AWS4_REQUEST.as_bytes())
}
