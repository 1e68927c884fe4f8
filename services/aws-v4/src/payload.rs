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
use std::str::FromStr;

use rollsign_core::hash::hex_sha256;
use rollsign_core::{Error, Result, SigningRequest};

use crate::constants::{STREAMING_AWS4_HMAC_SHA256_EVENTS, UNSIGNED_PAYLOAD, X_AMZ_CONTENT_SHA_256};

/// PayloadSigning is the caller's policy for covering the payload.
///
/// Only the payload hash differs between these strategies, the rest of the
/// signing pipeline is shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadSigning {
    /// Hash the entire payload before sending.
    #[default]
    Full,
    /// Leave the payload out of the signature over https, fall back to
    /// [`PayloadSigning::Full`] over plain http.
    UnsignedOverTls,
    /// Defer payload authentication to per-frame signatures produced by
    /// [`ChunkSigner`](crate::ChunkSigner).
    Streaming,
}

impl FromStr for PayloadSigning {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "full" => Ok(PayloadSigning::Full),
            "unsigned" | "unsigned_over_tls" => Ok(PayloadSigning::UnsignedOverTls),
            "streaming" => Ok(PayloadSigning::Streaming),
            v => Err(Error::config_invalid(format!(
                "unknown payload signing strategy: {v}"
            ))),
        }
    }
}

/// PayloadHash is the value written as the last line of the canonical request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadHash {
    /// Hex encoded SHA256 of the payload, or a value set by the caller in
    /// `x-amz-content-sha256`.
    Digest(String),
    /// `UNSIGNED-PAYLOAD`
    Unsigned,
    /// `STREAMING-AWS4-HMAC-SHA256-EVENTS`
    StreamingEvents,
}

impl PayloadHash {
    /// Value used in the canonical request and `x-amz-content-sha256`.
    pub fn as_str(&self) -> &str {
        match self {
            PayloadHash::Digest(v) => v,
            PayloadHash::Unsigned => UNSIGNED_PAYLOAD,
            PayloadHash::StreamingEvents => STREAMING_AWS4_HMAC_SHA256_EVENTS,
        }
    }

    /// Sentinel hashes must be advertised in `x-amz-content-sha256`, otherwise
    /// the receiver would try to validate them as a real digest.
    pub fn requires_header(&self) -> bool {
        !matches!(self, PayloadHash::Digest(_))
    }
}

impl Display for PayloadHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PayloadSigning {
    /// Resolve the payload hash of `req`.
    ///
    /// `body` must be available for full hashing unless the caller has already
    /// set `x-amz-content-sha256`.
    pub fn resolve(self, req: &SigningRequest, body: Option<&[u8]>) -> Result<PayloadHash> {
        match self {
            PayloadSigning::Full => full_hash(req, body),
            PayloadSigning::UnsignedOverTls if req.is_encrypted() => Ok(PayloadHash::Unsigned),
            PayloadSigning::UnsignedOverTls => full_hash(req, body).map_err(|_| {
                Error::config_invalid(format!(
                    "unsigned payload is not allowed over {}, and the payload is not available for hashing",
                    req.scheme
                ))
            }),
            PayloadSigning::Streaming => Ok(PayloadHash::StreamingEvents),
        }
    }
}

fn full_hash(req: &SigningRequest, body: Option<&[u8]>) -> Result<PayloadHash> {
    if let Some(v) = req.header_get(X_AMZ_CONTENT_SHA_256)? {
        return Ok(PayloadHash::Digest(v.to_string()));
    }

    match body {
        Some(body) => Ok(PayloadHash::Digest(hex_sha256(body))),
        None => Err(Error::config_invalid(
            "payload must be available to be fully hashed",
        )),
    }
}
