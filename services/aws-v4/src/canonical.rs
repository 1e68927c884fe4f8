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

use std::fmt::{Display, Formatter};

use percent_encoding::utf8_percent_encode;
use rollsign_core::hash::hex_sha256;
use rollsign_core::{Result, SigningRequest};

use crate::constants::{AWS_QUERY_ENCODE_SET, AWS_URI_ENCODE_SET, UNSIGNED_HEADERS};
use crate::PayloadHash;

/// CanonicalRequest is the normalized form of a request that gets signed.
///
/// ```text
/// <method>
/// <canonical uri>
/// <canonical query>
/// <name:value>
/// ...
///
/// <signed headers>
/// <payload hash>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    signed_headers: Vec<String>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request.
    ///
    /// All headers of `req` are signed except `UNSIGNED_HEADERS`. Header
    /// values are expected to be normalized already, see
    /// [`SigningRequest::header_value_normalize`].
    pub fn build(req: &SigningRequest, payload_hash: &PayloadHash) -> Result<Self> {
        let path =
            utf8_percent_encode(&req.path_percent_decoded()?, &AWS_URI_ENCODE_SET).to_string();
        let path = if path.is_empty() { "/".to_string() } else { path };

        let query = canonical_query(&req.query)
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        let names = req.header_name_to_vec_sorted(UNSIGNED_HEADERS);
        let mut headers = Vec::with_capacity(names.len());
        for name in &names {
            headers.push((name.to_string(), req.header_value_joined(name)?));
        }

        Ok(CanonicalRequest {
            method: req.method.to_string(),
            path,
            query,
            headers,
            signed_headers: names.into_iter().map(String::from).collect(),
            payload_hash: payload_hash.as_str().to_string(),
        })
    }

    /// Signed header names joined by `;`.
    pub fn signed_headers(&self) -> String {
        self.signed_headers.join(";")
    }

    /// Hex encoded SHA256 of the canonical request.
    pub fn digest(&self) -> String {
        hex_sha256(self.to_string().as_bytes())
    }
}

impl Display for CanonicalRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", self.path)?;
        writeln!(f, "{}", self.query)?;
        for (k, v) in &self.headers {
            writeln!(f, "{k}:{v}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.signed_headers())?;
        write!(f, "{}", self.payload_hash)
    }
}

/// Encode query pairs with `AWS_QUERY_ENCODE_SET` and sort them.
///
/// Sorting happens after encoding, since that's the form the receiver sees.
pub fn canonical_query(query: &[(String, String)]) -> Vec<(String, String)> {
    let mut encoded = query
        .iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(k, &AWS_QUERY_ENCODE_SET).to_string(),
                utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    encoded.sort();
    encoded
}
