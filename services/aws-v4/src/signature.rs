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

//! Signing key derivation and signature calculation.

use std::fmt::Write;

use rollsign_core::hash::{hex_hmac_sha256, hmac_sha256};
use rollsign_core::Result;

use crate::constants::AWS4_REQUEST;
use crate::CredentialScope;

/// Derive the scoped signing key.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, date)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
///
/// Only the date, region and service of `scope` are used, so a key must not
/// be reused once the date moves on.
pub fn generate_signing_key(secret: &str, scope: &CredentialScope) -> Result<Vec<u8>> {
    // Sign secret
    let secret = format!("AWS4{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), scope.date().as_bytes())?;
    // Sign region
    let sign_region = hmac_sha256(&sign_date, scope.region().as_bytes())?;
    // Sign service
    let sign_service = hmac_sha256(&sign_region, scope.service().as_bytes())?;
    // Sign request
    hmac_sha256(&sign_service, AWS4_REQUEST.as_bytes())
}

/// Build the string to sign.
///
/// ```text
/// <algorithm>
/// 20220313T072004Z
/// 20220313/<region>/<service>/aws4_request
/// <digests...>
/// ```
///
/// Requests carry one digest (the canonical request). Event stream frames
/// carry the prior signature, the header block digest and the payload digest.
pub fn string_to_sign(
    algorithm: &str,
    scope: &CredentialScope,
    digests: &[&str],
) -> Result<String> {
    let mut f = String::with_capacity(128);
    write!(f, "{algorithm}\n{}\n{scope}", scope.datetime())?;
    for digest in digests {
        write!(f, "\n{digest}")?;
    }
    Ok(f)
}

/// Hex encoded HMAC-SHA256 of the string to sign.
pub fn calculate_signature(signing_key: &[u8], string_to_sign: &str) -> Result<String> {
    hex_hmac_sha256(signing_key, string_to_sign.as_bytes())
}
