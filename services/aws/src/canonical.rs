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

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET};
use crate::protocol::UriEncoding;
use http::request::Parts;
use http::Method;
use percent_encoding::utf8_percent_encode;
use reqwire_core::hash::hex_sha256;
use reqwire_core::Result;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter, Write};

/// Canonical form of one request.
///
/// Built from the exact parts and body that go on the wire, so it must be
/// rebuilt whenever any of them changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: Method,
    uri: String,
    query: String,
    headers: Vec<(String, String)>,
    signed_headers: String,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request.
    pub fn build(parts: &Parts, body: &[u8], encoding: UriEncoding) -> Result<Self> {
        let uri = canonical_uri(parts.uri.path(), encoding);
        let query = canonical_query(parts.uri.query().unwrap_or_default());

        // BTreeMap keeps names sorted; http already lower-cases them.
        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, value) in parts.headers.iter() {
            grouped
                .entry(name.as_str())
                .or_default()
                .push(value.to_str()?.trim());
        }
        let headers: Vec<(String, String)> = grouped
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.join(",")))
            .collect();
        let signed_headers = headers
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";");

        Ok(Self {
            method: parts.method.clone(),
            uri,
            query,
            headers,
            signed_headers,
            payload_hash: hex_sha256(body),
        })
    }

    /// `;` joined names of the signed headers.
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Hex SHA-256 of the payload.
    pub fn payload_hash(&self) -> &str {
        &self.payload_hash
    }

    /// Hex SHA-256 of the canonical string, as used in the string to sign.
    pub fn hash(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.uri)?;
        writeln!(f, "{}", self.query)?;
        for (name, value) in &self.headers {
            writeln!(f, "{name}:{value}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers)?;
        f.write_str(&self.payload_hash)
    }
}

fn canonical_uri(path: &str, encoding: UriEncoding) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    match encoding {
        UriEncoding::Single => path.to_string(),
        UriEncoding::Double => utf8_percent_encode(path, &AWS_URI_ENCODE_SET).to_string(),
    }
}

fn canonical_query(query: &str) -> String {
    if query.is_empty() {
        return String::new();
    }

    let mut pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(&v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect();
    pairs.sort();

    let mut s = String::with_capacity(query.len());
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            s.push('&');
        }
        // Writing into a String never fails.
        let _ = write!(s, "{k}={v}");
    }
    s
}
