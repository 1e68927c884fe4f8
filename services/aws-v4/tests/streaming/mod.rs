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

use std::io;
use std::sync::Arc;

use anyhow::Result;
use aws_smithy_eventstream::frame::read_message_from;
use bytes::Bytes;
use futures_util::{stream, StreamExt, TryStreamExt};
use http::Request;
use pretty_assertions::assert_eq;
use rollsign_aws_v4::{ChunkSigner, PayloadSigning, RequestSigner};
use rollsign_core::time::DateTime;
use rollsign_core::SigningMethod;

use crate::signing::{sign, test_credential, test_time, SequenceTimeSource};

const SEED: &str = "e1c6ff2b7bb2bc6ba8e47ea5a6dd5fae9e1a3b8c4a6c0e8fd5eb0a25b2e3c1d0";

fn body(payloads: &[&'static str]) -> Vec<io::Result<Bytes>> {
    payloads.iter().map(|p| Ok(Bytes::from(*p))).collect()
}

/// Decode frames and return the hex chunk signature of each.
fn chunk_signatures(frames: &[Bytes]) -> Vec<String> {
    frames
        .iter()
        .map(|frame| {
            let message = read_message_from(&frame[..]).expect("frame must be valid");
            let last = message.headers().last().expect("frame must carry headers");
            assert_eq!(last.name().as_str(), ":chunk-signature");
            hex::encode(
                last.value()
                    .as_byte_array()
                    .expect("chunk signature must be a byte array"),
            )
        })
        .collect()
}

fn seeded_signer(times: Vec<DateTime>) -> ChunkSigner {
    ChunkSigner::new(
        test_credential(),
        "us-east-1",
        "transcribe",
        SEED,
        Arc::new(SequenceTimeSource::new(times)),
    )
}

#[test]
fn test_three_buffers_with_seed() -> Result<()> {
    let signer = seeded_signer((0..4).map(test_time).collect());
    let frames = signer
        .sign_frames(body(&["abc", "de", "f"]))
        .collect::<io::Result<Vec<_>>>()?;

    assert_eq!(
        chunk_signatures(&frames),
        vec![
            "9781d0e5ec22615d4d01af3d518e018583d8ed9dc748a6254777ebc3468c0e15",
            "d7f8988926fb67968e9009bce13fa67e732356e57effafc2b2fe14ed2b37ff3a",
            "7755f1890259efdeeebabe0537334c47ac61014ac1a622b1cd1b53ba623314aa",
            "6acf9333f64192e4c28ddf9a6f9cfffe373b5955bc7ec00bef67b26a7008e15e",
        ]
    );
    Ok(())
}

#[test]
fn test_zero_buffers_emit_one_trailer() -> Result<()> {
    let signer = seeded_signer(vec![test_time(0)]);
    let frames = signer.sign_frames(body(&[])).collect::<io::Result<Vec<_>>>()?;

    assert_eq!(frames.len(), 1);
    let message = read_message_from(&frames[0][..])?;
    assert!(message.payload().is_empty());
    assert_eq!(
        chunk_signatures(&frames),
        vec!["90a6dcd06987a17698277dd39b817a524301706d5d3d5994f765ecbc6b42aeae"]
    );
    Ok(())
}

#[tokio::test]
async fn test_streaming_request_end_to_end() -> Result<()> {
    let signer = RequestSigner::new("transcribe", "us-east-1")
        .with_payload_signing(PayloadSigning::Streaming)
        .with_time(test_time(0));
    let cred = test_credential();
    let req = Request::post("https://example.amazonaws.com/stream").body("")?;
    let (_, output) = sign(&signer, req, &cred, SigningMethod::Header)?;

    let chunk_signer = signer.chunk_signer(&cred, &output)?;
    assert_eq!(chunk_signer.prior_signature(), output.signature);

    let frames = chunk_signer
        .sign_stream(stream::iter(body(&["abc", "de", "f"])))
        .try_collect::<Vec<_>>()
        .await?;

    assert_eq!(
        frames.iter().map(Bytes::len).collect::<Vec<_>>(),
        vec![86, 85, 84, 83]
    );
    assert_eq!(
        chunk_signatures(&frames),
        vec![
            "77f76240d78526626369264d56c4146e045295cf86753e6d68920c43a04b5e31",
            "d1bdd0fdc8301c3f84b657541b127fa8a0fcbc41183f68884dbbfc20b69cbce9",
            "95a0462179a22ab0fbe31e5f271250a5eef43e69744262451633c7574b5a101c",
            "b41dac7b3a3e93c3b78737d943fe2382a4ca48efcc6574a1120bcd283b8ea819",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_upstream_error_skips_trailer() -> Result<()> {
    let signer = seeded_signer(vec![test_time(0)]);
    let body = stream::iter(vec![
        Ok(Bytes::from("abc")),
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "body closed")),
        Ok(Bytes::from("de")),
    ]);

    let items = signer.sign_stream(body).collect::<Vec<_>>().await;
    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    let err = items[1].as_ref().unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    Ok(())
}

#[tokio::test]
async fn test_cancel_before_trailer() -> Result<()> {
    let signer = seeded_signer(vec![test_time(0)]);

    let frames = signer
        .sign_stream(stream::iter(body(&["abc", "de", "f"])))
        .take(1)
        .try_collect::<Vec<_>>()
        .await?;

    assert_eq!(frames.len(), 1);
    assert!(!read_message_from(&frames[0][..])?.payload().is_empty());
    Ok(())
}

#[test]
fn test_interleaved_sessions_stay_independent() -> Result<()> {
    let times = (0..4).map(test_time).collect::<Vec<_>>();
    let alone = |payloads: &[&'static str]| -> Result<Vec<Bytes>> {
        Ok(seeded_signer(times.clone())
            .sign_frames(body(payloads))
            .collect::<io::Result<Vec<_>>>()?)
    };
    let expected_a = alone(&["abc", "de", "f"])?;
    let expected_b = alone(&["xyz", "uv", "w"])?;

    let mut a = seeded_signer(times.clone());
    let mut b = seeded_signer(times.clone());
    let (mut frames_a, mut frames_b) = (Vec::new(), Vec::new());
    for (pa, pb) in ["abc", "de", "f"].into_iter().zip(["xyz", "uv", "w"]) {
        frames_a.push(a.sign_frame(pa)?);
        frames_b.push(b.sign_frame(pb)?);
    }
    frames_b.push(b.finish()?);
    frames_a.push(a.finish()?);

    assert_eq!(frames_a, expected_a);
    assert_eq!(frames_b, expected_b);
    assert_ne!(chunk_signatures(&frames_a), chunk_signatures(&frames_b));
    Ok(())
}
