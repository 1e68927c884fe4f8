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

use std::sync::Arc;
use std::time::Duration;

use http::header;
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use rollsign_core::time::{
    format_iso8601, DateTime, StaticTimeSource, SystemTimeSource, TimeSource,
};
use rollsign_core::{Error, Result, SignRequest, SigningCredential, SigningMethod, SigningRequest};

use crate::canonical::{canonical_query, CanonicalRequest};
use crate::constants::*;
use crate::signature::{calculate_signature, generate_signing_key, string_to_sign};
use crate::{ChunkSigner, Config, Credential, CredentialScope, PayloadHash, PayloadSigning};

/// RequestSigner that implement AWS SigV4.
///
/// - [Signature Version 4 signing process](https://docs.aws.amazon.com/general/latest/gr/signature-version-4.html)
///
/// The signer holds no per-request state, share it freely between threads.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,
    payload_signing: PayloadSigning,
    payload_checksum_header: bool,

    time_source: Arc<dyn TimeSource>,
}

impl RequestSigner {
    /// Create a new signer for the given service and region.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),
            payload_signing: PayloadSigning::default(),
            payload_checksum_header: false,

            time_source: Arc::new(SystemTimeSource),
        }
    }

    /// Create a signer from [`Config`].
    ///
    /// Returns [`ConfigInvalid`](rollsign_core::ErrorKind::ConfigInvalid) if
    /// `region` or `service` is missing.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let service = cfg
            .service
            .as_deref()
            .ok_or_else(|| Error::config_invalid("service is required for signing"))?;
        let region = cfg
            .region
            .as_deref()
            .ok_or_else(|| Error::config_invalid("region is required for signing"))?;

        Ok(Self::new(service, region)
            .with_payload_signing(cfg.payload_signing)
            .with_payload_checksum_header(cfg.payload_checksum_header))
    }

    /// Set the payload signing strategy, default to [`PayloadSigning::Full`].
    pub fn with_payload_signing(mut self, payload_signing: PayloadSigning) -> Self {
        self.payload_signing = payload_signing;
        self
    }

    /// Write `x-amz-content-sha256` for full payload hashes too.
    pub fn with_payload_checksum_header(mut self, enabled: bool) -> Self {
        self.payload_checksum_header = enabled;
        self
    }

    /// Set the source of signing time.
    ///
    /// The same source is handed to chunk signers created by
    /// [`RequestSigner::chunk_signer`].
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(self, time: DateTime) -> Self {
        self.with_time_source(Arc::new(StaticTimeSource::new(time)))
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Create a [`ChunkSigner`] seeded by the signature of a streaming request.
    ///
    /// `output` must come from a request signed with
    /// [`PayloadSigning::Streaming`].
    pub fn chunk_signer(
        &self,
        credential: &Credential,
        output: &SigningOutput,
    ) -> Result<ChunkSigner> {
        if output.payload_hash != PayloadHash::StreamingEvents {
            return Err(Error::config_invalid(format!(
                "chunk signer requires a streaming request, but payload hash is {}",
                output.payload_hash
            )));
        }
        if !credential.is_valid() {
            return Err(Error::credential_invalid(
                "access key id and secret access key must not be empty",
            ));
        }

        Ok(ChunkSigner::new(
            credential.clone(),
            output.scope.region(),
            output.scope.service(),
            output.signature.clone(),
            self.time_source.clone(),
        ))
    }
}

/// SigningOutput carries what a request signature was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningOutput {
    /// Hex encoded signature, the seed of a signed event stream.
    pub signature: String,
    /// Scope the signature was calculated in.
    pub scope: CredentialScope,
    /// Signed header names joined by `;`.
    pub signed_headers: String,
    /// Payload hash written in the canonical request.
    pub payload_hash: PayloadHash,
}

impl SignRequest for RequestSigner {
    type Credential = Credential;
    type Output = SigningOutput;

    fn sign_request(
        &self,
        req: &mut Parts,
        body: Option<&[u8]>,
        cred: &Self::Credential,
        method: SigningMethod,
    ) -> Result<Self::Output> {
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "access key id and secret access key must not be empty",
            ));
        }
        if let SigningMethod::Query(expire) = method {
            if self.payload_signing == PayloadSigning::Streaming {
                return Err(Error::config_invalid(
                    "streaming payload can't be signed in query",
                ));
            }
            if expire.as_secs() > MAX_PRESIGN_EXPIRES_SECS {
                return Err(Error::config_invalid(format!(
                    "presigned expiry {}s exceeds the limit of {MAX_PRESIGN_EXPIRES_SECS}s",
                    expire.as_secs()
                )));
            }
        }

        let scope = CredentialScope::new(&self.region, &self.service, self.time_source.now());
        debug!("calculated scope: {scope}");

        let mut signed_req = SigningRequest::build(req)?;

        // canonicalize context
        canonicalize_header(&mut signed_req, cred, method, &scope)?;
        let payload_hash = match method {
            SigningMethod::Header => {
                let hash = self.payload_signing.resolve(&signed_req, body)?;
                if hash.requires_header() || self.payload_checksum_header {
                    signed_req
                        .headers
                        .insert(X_AMZ_CONTENT_SHA_256, HeaderValue::from_str(hash.as_str())?);
                }
                hash
            }
            SigningMethod::Query(expire) => {
                canonicalize_query(&mut signed_req, cred, expire, &scope);
                match signed_req.header_get(X_AMZ_CONTENT_SHA_256)? {
                    Some(v) => PayloadHash::Digest(v.to_string()),
                    None => PayloadHash::Unsigned,
                }
            }
        };

        // build canonical request and string to sign.
        let creq = CanonicalRequest::build(&signed_req, &payload_hash)?;
        debug!("calculated canonical request: {creq}");

        let string_to_sign = string_to_sign(AWS4_HMAC_SHA256, &scope, &[creq.digest().as_str()])?;
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(&cred.secret_access_key, &scope)?;
        let signature = calculate_signature(&signing_key, &string_to_sign)?;
        let signed_headers = creq.signed_headers();

        signed_req.query = canonical_query(&signed_req.query);
        match method {
            SigningMethod::Query(_) => {
                signed_req.query_push(X_AMZ_SIGNATURE_QUERY, signature.clone());
            }
            SigningMethod::Header => {
                let mut authorization = HeaderValue::from_str(&format!(
                    "{AWS4_HMAC_SHA256} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
                    cred.access_key_id,
                ))?;
                authorization.set_sensitive(true);

                signed_req
                    .headers
                    .insert(header::AUTHORIZATION, authorization);
            }
        }

        // Apply to the request.
        signed_req.apply(req)?;

        Ok(SigningOutput {
            signature,
            scope,
            signed_headers,
            payload_hash,
        })
    }
}

fn canonicalize_header(
    req: &mut SigningRequest,
    cred: &Credential,
    method: SigningMethod,
    scope: &CredentialScope,
) -> Result<()> {
    // Header names and values need to be normalized according to Step 4 of https://docs.aws.amazon.com/general/latest/gr/sigv4-create-canonical-request.html
    for value in req.headers.values_mut() {
        SigningRequest::header_value_normalize(value)?;
    }

    // Insert HOST header if not present.
    if req.headers.get(header::HOST).is_none() {
        req.headers
            .insert(header::HOST, HeaderValue::from_str(req.authority.as_str())?);
    }

    if method == SigningMethod::Header {
        // The date must match the scope, overwrite any value set by the caller.
        req.headers
            .insert(X_AMZ_DATE, HeaderValue::try_from(format_iso8601(scope.time()))?);

        // Insert X_AMZ_SECURITY_TOKEN header if security token exists.
        if let Some(token) = &cred.session_token {
            let mut value = HeaderValue::from_str(token)?;
            // Set token value sensitive to avoid leaking.
            value.set_sensitive(true);

            req.headers.insert(X_AMZ_SECURITY_TOKEN, value);
        }
    }

    Ok(())
}

fn canonicalize_query(
    req: &mut SigningRequest,
    cred: &Credential,
    expire: Duration,
    scope: &CredentialScope,
) {
    let signed_headers = req.header_name_to_vec_sorted(UNSIGNED_HEADERS).join(";");

    req.query_push(X_AMZ_ALGORITHM_QUERY, AWS4_HMAC_SHA256);
    req.query_push(
        X_AMZ_CREDENTIAL_QUERY,
        format!("{}/{scope}", cred.access_key_id),
    );
    req.query_push(X_AMZ_DATE_QUERY, scope.datetime());
    req.query_push(X_AMZ_EXPIRES_QUERY, expire.as_secs().to_string());
    req.query_push(X_AMZ_SIGNED_HEADERS_QUERY, signed_headers);

    if let Some(token) = &cred.session_token {
        req.query_push(X_AMZ_SECURITY_TOKEN_QUERY, token.as_str());
    }
}
