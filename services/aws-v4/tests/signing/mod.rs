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

mod standard;

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use chrono::{TimeZone, Utc};
use http::{header, Request};
use log::debug;
use rollsign_aws_v4::{Credential, RequestSigner, SigningOutput};
use rollsign_core::time::{DateTime, TimeSource};
use rollsign_core::{SignRequest, SigningMethod};

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

/// Credential used by the published SigV4 test suite.
pub fn test_credential() -> Credential {
    Credential::new(ACCESS_KEY_ID, SECRET_ACCESS_KEY)
}

/// 2015-08-30T12:36:00Z plus `secs` seconds.
pub fn test_time(secs: u32) -> DateTime {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, secs).unwrap()
}

/// Hand out the given instants in order, repeating the last one.
#[derive(Debug)]
pub struct SequenceTimeSource {
    times: Vec<DateTime>,
    next: AtomicUsize,
}

impl SequenceTimeSource {
    pub fn new(times: Vec<DateTime>) -> Self {
        Self {
            times,
            next: AtomicUsize::new(0),
        }
    }
}

impl TimeSource for SequenceTimeSource {
    fn now(&self) -> DateTime {
        let idx = self.next.fetch_add(1, Ordering::SeqCst);
        self.times[idx.min(self.times.len() - 1)]
    }
}

/// Sign `req` in place and return the signed request.
pub fn sign(
    signer: &RequestSigner,
    req: Request<&'static str>,
    cred: &Credential,
    method: SigningMethod,
) -> Result<(Request<&'static str>, SigningOutput)> {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut parts, body) = req.into_parts();
    let output = signer.sign_request(&mut parts, Some(body.as_bytes()), cred, method)?;
    let req = Request::from_parts(parts, body);
    debug!("signed request: {req:?}");

    Ok((req, output))
}

/// Read the `Signature=` part of the authorization header.
pub fn authorization_signature(req: &Request<&str>) -> String {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .expect("authorization must be set")
        .to_str()
        .expect("authorization must be valid");
    value
        .rsplit_once("Signature=")
        .expect("signature must be set")
        .1
        .to_string()
}
