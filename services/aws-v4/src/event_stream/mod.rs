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

//! Rolling signatures for event stream bodies.
//!
//! A request signed with [`PayloadSigning::Streaming`](crate::PayloadSigning::Streaming)
//! seeds a [`ChunkSigner`]. Every body buffer becomes one signed frame whose
//! signature chains from the previous one, and the session ends with a single
//! empty trailer frame.

mod signer;
pub use signer::sort_frame_headers;
pub use signer::ChunkSigner;

mod frames;
pub use frames::SignedFrameStream;
pub use frames::SignedFrames;
