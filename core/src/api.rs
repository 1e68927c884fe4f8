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

use crate::{Result, SigningMethod};
use std::fmt::Debug;

/// SigningCredential is the trait used by signer as the signing credential.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

/// SignRequest is the trait used by http client layers to sign a request.
///
/// Signing is a pure computation over the request, the payload and the
/// credential, so implementations are synchronous and safe to call from any
/// number of threads at once.
pub trait SignRequest: Debug + Send + Sync + Unpin + 'static {
    /// Credential used by this signer.
    type Credential: SigningCredential;

    /// Output returned after the request has been signed.
    type Output;

    /// Sign the request in place.
    ///
    /// ## Body
    ///
    /// `body` is the full payload if it's available. Signers that need to hash
    /// the payload return an error when it's `None`.
    ///
    /// ## Method
    ///
    /// [`SigningMethod::Header`] writes the signature into headers, while
    /// [`SigningMethod::Query`] writes it into the query with the given expiry.
    fn sign_request(
        &self,
        req: &mut http::request::Parts,
        body: Option<&[u8]>,
        credential: &Self::Credential,
        method: SigningMethod,
    ) -> Result<Self::Output>;
}
