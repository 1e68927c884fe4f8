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

use std::cmp::Ordering;
use std::fmt::Write;
use std::sync::Arc;

use aws_smithy_eventstream::frame::{write_headers_to, write_message_to};
use aws_smithy_types::event_stream::{Header, HeaderValue, Message};
use bytes::Bytes;
use futures_util::Stream;
use log::{debug, log_enabled, trace, Level};
use rollsign_core::hash::hex_sha256;
use rollsign_core::time::TimeSource;
use rollsign_core::{Error, Result};

use super::{SignedFrameStream, SignedFrames};
use crate::constants::{AWS4_HMAC_SHA256_PAYLOAD, EVENT_CHUNK_SIGNATURE, EVENT_DATE};
use crate::signature::{calculate_signature, generate_signing_key, string_to_sign};
use crate::{Credential, CredentialScope};

/// Number of payload bytes kept by the debug rendering of a frame.
const DEBUG_PAYLOAD_PREVIEW: usize = 32;

/// ChunkSigner owns the rolling signature of one event stream session.
///
/// Each signed frame carries a `:date` header and a `:chunk-signature` header.
/// The signature of a frame covers:
///
/// ```text
/// AWS4-HMAC-SHA256-PAYLOAD
/// <frame datetime>
/// <frame date>/<region>/<service>/aws4_request
/// <prior signature>
/// <hex sha256 of encoded headers without :chunk-signature>
/// <hex sha256 of payload>
/// ```
///
/// The scope and signing key are derived again for every frame, so a session
/// crossing midnight switches keys on the first frame of the new day.
///
/// Methods take `&mut self` or `self`, a signer can't be driven by two
/// producers at once. Use one signer per request body.
#[derive(Debug)]
pub struct ChunkSigner {
    credential: Credential,
    region: String,
    service: String,
    prior_signature: String,

    time_source: Arc<dyn TimeSource>,
}

impl ChunkSigner {
    /// Create a signer seeded by the hex signature of the streaming request.
    pub fn new(
        credential: Credential,
        region: impl Into<String>,
        service: impl Into<String>,
        seed_signature: impl Into<String>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            credential,
            region: region.into(),
            service: service.into(),
            prior_signature: seed_signature.into(),

            time_source,
        }
    }

    /// Hex signature the next frame will chain from.
    pub fn prior_signature(&self) -> &str {
        &self.prior_signature
    }

    /// Sign `payload` into a message and advance the rolling signature.
    pub fn sign_message(&mut self, payload: impl Into<Bytes>) -> Result<Message> {
        let (message, signature) = self.sign(payload.into())?;
        self.prior_signature = signature;
        Ok(message)
    }

    /// Sign `payload` into an encoded frame.
    ///
    /// The rolling signature only advances once the frame is encoded, a
    /// failed frame leaves the session where it was.
    pub fn sign_frame(&mut self, payload: impl Into<Bytes>) -> Result<Bytes> {
        let (message, signature) = self.sign(payload.into())?;
        let mut frame = Vec::<u8>::new();
        write_message_to(&message, &mut frame).map_err(|err| {
            Error::request_invalid("failed to encode event stream frame").with_source(err)
        })?;
        self.prior_signature = signature;
        Ok(frame.into())
    }

    /// Encode `event` and sign it as the payload of a wrapper frame.
    ///
    /// This is how services like Transcribe expect audio events to be sent.
    pub fn sign_event(&mut self, event: &Message) -> Result<Bytes> {
        let mut payload = Vec::<u8>::new();
        write_message_to(event, &mut payload).map_err(|err| {
            Error::request_invalid("failed to encode event stream message").with_source(err)
        })?;
        self.sign_frame(payload)
    }

    /// Sign the empty trailer frame and close the session.
    pub fn finish(mut self) -> Result<Bytes> {
        self.sign_frame(Bytes::new())
    }

    /// Sign every buffer of a blocking body, followed by the trailer.
    pub fn sign_frames<I, E>(self, body: I) -> SignedFrames<I::IntoIter>
    where
        I: IntoIterator<Item = std::result::Result<Bytes, E>>,
        E: From<Error>,
    {
        SignedFrames::new(body.into_iter(), self)
    }

    /// Sign every buffer of an async body, followed by the trailer.
    pub fn sign_stream<S, E>(self, body: S) -> SignedFrameStream<S>
    where
        S: Stream<Item = std::result::Result<Bytes, E>> + Unpin,
        E: From<Error>,
    {
        SignedFrameStream::new(body, self)
    }

    fn sign(&self, payload: Bytes) -> Result<(Message, String)> {
        let scope = CredentialScope::new(&self.region, &self.service, self.time_source.now());

        let date = aws_smithy_types::DateTime::from_millis(scope.time().timestamp_millis());
        let mut headers = vec![Header::new(EVENT_DATE, HeaderValue::Timestamp(date))];
        sort_frame_headers(&mut headers);
        let mut encoded_headers = Vec::<u8>::new();
        write_headers_to(&headers, &mut encoded_headers).map_err(|err| {
            Error::request_invalid("failed to encode event stream headers").with_source(err)
        })?;

        let string_to_sign = string_to_sign(
            AWS4_HMAC_SHA256_PAYLOAD,
            &scope,
            &[
                self.prior_signature.as_str(),
                hex_sha256(&encoded_headers).as_str(),
                hex_sha256(&payload).as_str(),
            ],
        )?;
        let signing_key = generate_signing_key(&self.credential.secret_access_key, &scope)?;
        let signature = calculate_signature(&signing_key, &string_to_sign)?;

        let raw_signature = hex::decode(&signature).map_err(|err| {
            Error::crypto_failure("signature is not valid hex").with_source(err)
        })?;
        headers.push(Header::new(
            EVENT_CHUNK_SIGNATURE,
            HeaderValue::ByteArray(raw_signature.into()),
        ));
        sort_frame_headers(&mut headers);

        let message = headers
            .into_iter()
            .fold(Message::new(payload), Message::add_header);
        debug!("signed event stream frame: {}", to_debug_string(&message, true));
        if log_enabled!(Level::Trace) {
            trace!("signed event stream frame: {}", to_debug_string(&message, false));
        }

        Ok((message, signature))
    }
}

/// Sort frame headers into wire order.
///
/// `:chunk-signature` goes last, all other headers are ordered by name.
pub fn sort_frame_headers(headers: &mut [Header]) {
    headers.sort_by(|a, b| {
        let (a, b) = (a.name().as_str(), b.name().as_str());
        match (a == EVENT_CHUNK_SIGNATURE, b == EVENT_CHUNK_SIGNATURE) {
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            _ => a.cmp(b),
        }
    });
}

/// Render a frame for logs, byte values and the payload as hex.
fn to_debug_string(message: &Message, truncate_payload: bool) -> String {
    let mut out = String::from("Message { headers: {");
    for (idx, header) in message.headers().iter().enumerate() {
        let sep = if idx == 0 { " " } else { ", " };
        let name = header.name().as_str();
        let _ = match header.value() {
            HeaderValue::ByteArray(v) => write!(out, "{sep}{name}: {}", hex::encode(v)),
            v => write!(out, "{sep}{name}: {v:?}"),
        };
    }

    let payload = message.payload();
    let shown = if truncate_payload {
        &payload[..payload.len().min(DEBUG_PAYLOAD_PREVIEW)]
    } else {
        &payload[..]
    };
    let _ = write!(out, " }}, payload: {}", hex::encode(shown));
    if shown.len() < payload.len() {
        let _ = write!(out, "... ({} bytes)", payload.len());
    }
    out.push_str(" }");
    out
}
