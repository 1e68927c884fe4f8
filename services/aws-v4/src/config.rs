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

use std::collections::HashMap;
use std::env;

use log::debug;

use crate::constants::*;
use crate::PayloadSigning;

/// Config for the aws v4 signer.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// `region` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `AWS_REGION`
    /// - env value: `AWS_DEFAULT_REGION`
    pub region: Option<String>,
    /// `service` will be loaded from:
    ///
    /// - this field if it's `is_some`
    /// - env value: `ROLLSIGN_AWS_V4_SERVICE`
    pub service: Option<String>,
    /// `payload_signing` will be loaded from:
    ///
    /// - env value: `ROLLSIGN_AWS_V4_PAYLOAD_SIGNING`, one of `full`, `unsigned` or `streaming`
    /// - default to [`PayloadSigning::Full`]
    ///
    /// Callers behind a proxy that terminates tls should keep it `Full`.
    pub payload_signing: PayloadSigning,
    /// `payload_checksum_header` will be loaded from:
    ///
    /// - env value: `ROLLSIGN_AWS_V4_CONTENT_SHA256`
    /// - default to `false`
    ///
    /// Write `x-amz-content-sha256` for full payload hashes too. S3 requires it.
    pub payload_checksum_header: bool,
}

impl Config {
    /// Load config from env.
    ///
    /// Fields already set are kept.
    pub fn from_env(mut self) -> Self {
        let envs = env::vars().collect::<HashMap<_, _>>();

        if self.region.is_none() {
            self.region = envs
                .get(AWS_REGION)
                .or_else(|| envs.get(AWS_DEFAULT_REGION))
                .cloned();
        }
        if self.service.is_none() {
            self.service = envs.get(ROLLSIGN_AWS_V4_SERVICE).cloned();
        }
        if let Some(v) = envs.get(ROLLSIGN_AWS_V4_PAYLOAD_SIGNING) {
            match v.parse() {
                Ok(v) => self.payload_signing = v,
                Err(err) => debug!("ignore invalid {ROLLSIGN_AWS_V4_PAYLOAD_SIGNING}: {err}"),
            }
        }
        if let Some(v) = envs.get(ROLLSIGN_AWS_V4_CONTENT_SHA256) {
            match v.trim().to_ascii_lowercase().parse() {
                Ok(v) => self.payload_checksum_header = v,
                Err(err) => debug!("ignore invalid {ROLLSIGN_AWS_V4_CONTENT_SHA256}: {err}"),
            }
        }
        self
    }
}
