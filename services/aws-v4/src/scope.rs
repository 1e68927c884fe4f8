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

use rollsign_core::time::{format_date, format_iso8601, DateTime};

use crate::constants::AWS4_REQUEST;

/// CredentialScope narrows a derived signing key to one day, region and service.
///
/// It's recomputed for every signing operation since the clock moves, and the
/// derived key must match the date written into the scope string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialScope {
    region: String,
    service: String,
    time: DateTime,
}

impl CredentialScope {
    /// Create a new scope at `time`.
    pub fn new(region: impl Into<String>, service: impl Into<String>, time: DateTime) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
            time,
        }
    }

    /// Region of this scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Service of this scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Signing instant of this scope.
    pub fn time(&self) -> DateTime {
        self.time
    }

    /// Date stamp: `20220313`
    pub fn date(&self) -> String {
        format_date(self.time)
    }

    /// Signing timestamp: `20220313T072004Z`
    pub fn datetime(&self) -> String {
        format_iso8601(self.time)
    }
}

/// Scope: `20220313/<region>/<service>/aws4_request`
impl Display for CredentialScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.date(),
            self.region,
            self.service,
            AWS4_REQUEST
        )
    }
}
