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

use std::iter::FusedIterator;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::ready;
use futures_util::stream::FusedStream;
use futures_util::Stream;
use rollsign_core::Error;

use super::ChunkSigner;

/// SignedFrames signs a blocking body frame by frame.
///
/// Each call to `next` pulls at most one buffer from the body and yields its
/// frame. Once the body ends the trailer frame is yielded and the iterator is
/// exhausted. An error from the body is yielded unchanged and ends the
/// session without a trailer.
#[derive(Debug)]
pub struct SignedFrames<I> {
    body: I,
    signer: Option<ChunkSigner>,
}

impl<I> SignedFrames<I> {
    pub(crate) fn new(body: I, signer: ChunkSigner) -> Self {
        Self {
            body,
            signer: Some(signer),
        }
    }
}

impl<I, E> Iterator for SignedFrames<I>
where
    I: Iterator<Item = Result<Bytes, E>>,
    E: From<Error>,
{
    type Item = Result<Bytes, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.signer.is_none() {
            return None;
        }
        let next = self.body.next();
        advance(&mut self.signer, next)
    }
}

impl<I, E> FusedIterator for SignedFrames<I>
where
    I: Iterator<Item = Result<Bytes, E>>,
    E: From<Error>,
{
}

/// SignedFrameStream signs an async body frame by frame.
///
/// The body is only polled when the consumer polls, no frame is produced
/// ahead of demand. Dropping the stream before it ends cancels the session
/// without a trailer.
#[derive(Debug)]
pub struct SignedFrameStream<S> {
    body: S,
    signer: Option<ChunkSigner>,
}

impl<S> SignedFrameStream<S> {
    pub(crate) fn new(body: S, signer: ChunkSigner) -> Self {
        Self {
            body,
            signer: Some(signer),
        }
    }
}

impl<S, E> Stream for SignedFrameStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: From<Error>,
{
    type Item = Result<Bytes, E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        if this.signer.is_none() {
            return Poll::Ready(None);
        }
        let next = ready!(Pin::new(&mut this.body).poll_next(cx));
        Poll::Ready(advance(&mut this.signer, next))
    }
}

impl<S, E> FusedStream for SignedFrameStream<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: From<Error>,
{
    fn is_terminated(&self) -> bool {
        self.signer.is_none()
    }
}

/// Move the session one step forward with the next item of the body.
///
/// `signer` becomes `None` once the session is closed.
fn advance<E: From<Error>>(
    signer: &mut Option<ChunkSigner>,
    next: Option<Result<Bytes, E>>,
) -> Option<Result<Bytes, E>> {
    match next {
        Some(Ok(payload)) => {
            let result = signer.as_mut()?.sign_frame(payload);
            if result.is_err() {
                *signer = None;
            }
            Some(result.map_err(E::from))
        }
        Some(Err(err)) => {
            *signer = None;
            Some(Err(err))
        }
        None => Some(signer.take()?.finish().map_err(E::from)),
    }
}
