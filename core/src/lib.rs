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

//! Core components for signing API requests.
//!
//! This crate provides the building blocks shared by rollsign signers:
//!
//! - [`hash`]: SHA256 and HMAC-SHA256 helpers.
//! - [`time`]: chrono based time formatting and the [`time::TimeSource`] abstraction.
//! - [`utils`]: redaction helpers used when logging.
//! - [`SigningRequest`]: a mutable view of `http::request::Parts` used while signing.
//! - [`SignRequest`] and [`SigningCredential`]: the seams implemented by service signers.
//! - [`Error`]: the error type returned by all rollsign crates.

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{SignRequest, SigningCredential};
mod request;
pub use request::{SigningMethod, SigningRequest};
