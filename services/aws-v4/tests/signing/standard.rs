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

use super::{authorization_signature, sign, test_credential, test_time};
use anyhow::Result;
use http::{header, Request};
use pretty_assertions::assert_eq;
use rollsign_aws_v4::{PayloadHash, PayloadSigning, RequestSigner};
use rollsign_core::SigningMethod;

fn signer(service: &str) -> RequestSigner {
    RequestSigner::new(service, "us-east-1").with_time(test_time(0))
}

#[test]
fn test_get_vanilla() -> Result<()> {
    let req = Request::get("https://example.amazonaws.com/").body("")?;
    let (req, output) = sign(&signer("service"), req, &test_credential(), SigningMethod::Header)?;

    assert_eq!(
        req.headers()[header::AUTHORIZATION],
        "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, SignedHeaders=host;x-amz-date, Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
    );
    assert_eq!(req.headers()[header::HOST], "example.amazonaws.com");
    assert_eq!(req.headers()["x-amz-date"], "20150830T123600Z");
    assert!(req.headers().get("x-amz-content-sha256").is_none());

    assert_eq!(output.scope.to_string(), "20150830/us-east-1/service/aws4_request");
    assert_eq!(output.signed_headers, "host;x-amz-date");
    assert_eq!(
        output.payload_hash,
        PayloadHash::Digest(
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".to_string()
        )
    );
    Ok(())
}

#[test]
fn test_get_vanilla_query_order() -> Result<()> {
    let req = Request::get("https://example.amazonaws.com/?Param2=value2&Param1=value1").body("")?;
    let (req, output) = sign(&signer("service"), req, &test_credential(), SigningMethod::Header)?;

    assert_eq!(
        output.signature,
        "b97d918cfa904a5beff61c982a1b6f458b799221646efd99d3219ec94cdf2500"
    );
    assert_eq!(req.uri().query(), Some("Param1=value1&Param2=value2"));
    Ok(())
}

#[test]
fn test_post_vanilla() -> Result<()> {
    let req = Request::post("https://example.amazonaws.com/").body("")?;
    let (req, _) = sign(&signer("service"), req, &test_credential(), SigningMethod::Header)?;

    assert_eq!(
        authorization_signature(&req),
        "5da7c1a2acd57cee7505fc6676e4e544621c30862966e37dddb68e92efbe5d6b"
    );
    Ok(())
}

#[test]
fn test_signing_is_deterministic() -> Result<()> {
    let build = || {
        Request::put("https://example.amazonaws.com/object?acl")
            .header("x-amz-meta-owner", "rollsign")
            .body("Hello, World!")
    };

    let (l, _) = sign(&signer("s3"), build()?, &test_credential(), SigningMethod::Header)?;
    let (r, _) = sign(&signer("s3"), build()?, &test_credential(), SigningMethod::Header)?;
    assert_eq!(l.headers(), r.headers());
    assert_eq!(l.uri(), r.uri());
    Ok(())
}

#[test]
fn test_signed_header_changes_signature() -> Result<()> {
    let build = |owner: &'static str, agent: &'static str| {
        Request::get("https://example.amazonaws.com/")
            .header("x-amz-meta-owner", owner)
            .header(header::USER_AGENT, agent)
            .body("")
    };
    let signature = |req| -> Result<String> {
        let (req, _) = sign(&signer("service"), req, &test_credential(), SigningMethod::Header)?;
        Ok(authorization_signature(&req))
    };

    let base = signature(build("alice", "curl/8.0")?)?;
    assert_ne!(base, signature(build("bob", "curl/8.0")?)?);
    assert_eq!(base, signature(build("alice", "rollsign/0.1")?)?);
    Ok(())
}

#[test]
fn test_header_values_are_normalized() -> Result<()> {
    let build = |value: &'static str| {
        Request::get("https://example.amazonaws.com/")
            .header("my-header1", value)
            .body("")
    };

    let cred = test_credential();
    let (l, _) = sign(&signer("service"), build("  a   b   c  ")?, &cred, SigningMethod::Header)?;
    let (r, _) = sign(&signer("service"), build("a b c")?, &cred, SigningMethod::Header)?;
    assert_eq!(authorization_signature(&l), authorization_signature(&r));
    assert_eq!(l.headers()["my-header1"], "a b c");
    Ok(())
}

#[test]
fn test_unsigned_payload_over_https() -> Result<()> {
    let signer = signer("service").with_payload_signing(PayloadSigning::UnsignedOverTls);
    let req = Request::get("https://example.amazonaws.com/").body("ignored")?;
    let (req, output) = sign(&signer, req, &test_credential(), SigningMethod::Header)?;

    assert_eq!(req.headers()["x-amz-content-sha256"], "UNSIGNED-PAYLOAD");
    assert_eq!(output.payload_hash, PayloadHash::Unsigned);
    assert_eq!(output.signed_headers, "host;x-amz-content-sha256;x-amz-date");
    assert_eq!(
        output.signature,
        "9b02fb7b5d0076fa47a0adda28c71e74ba4588334bc0139b8cd6bb87f16afe16"
    );
    Ok(())
}

#[test]
fn test_unsigned_payload_over_http_hashes_payload() -> Result<()> {
    let signer = signer("service").with_payload_signing(PayloadSigning::UnsignedOverTls);
    let req = Request::get("http://example.amazonaws.com/").body("")?;
    let (req, output) = sign(&signer, req, &test_credential(), SigningMethod::Header)?;

    assert!(req.headers().get("x-amz-content-sha256").is_none());
    assert_eq!(
        output.signature,
        "5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
    );
    Ok(())
}

#[test]
fn test_payload_checksum_header() -> Result<()> {
    let signer = signer("s3").with_payload_checksum_header(true);
    let req = Request::put("https://example.amazonaws.com/object").body("abc")?;
    let (req, output) = sign(&signer, req, &test_credential(), SigningMethod::Header)?;

    assert_eq!(
        req.headers()["x-amz-content-sha256"],
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(output.signed_headers, "host;x-amz-content-sha256;x-amz-date");
    Ok(())
}

#[test]
fn test_streaming_request() -> Result<()> {
    let signer = signer("transcribe").with_payload_signing(PayloadSigning::Streaming);
    let req = Request::post("https://example.amazonaws.com/stream").body("")?;
    let (req, output) = sign(&signer, req, &test_credential(), SigningMethod::Header)?;

    assert_eq!(
        req.headers()["x-amz-content-sha256"],
        "STREAMING-AWS4-HMAC-SHA256-EVENTS"
    );
    assert_eq!(output.payload_hash, PayloadHash::StreamingEvents);
    assert_eq!(
        output.signature,
        "a635ae6d7ee249ed28847bc32b34ac12dc0230e0a40e15fb5603c985ff229313"
    );
    Ok(())
}

#[test]
fn test_session_token() -> Result<()> {
    let cred = test_credential().with_session_token("session-token");
    let req = Request::get("https://example.amazonaws.com/").body("")?;
    let (req, output) = sign(&signer("service"), req, &cred, SigningMethod::Header)?;

    let token = &req.headers()["x-amz-security-token"];
    assert_eq!(token, "session-token");
    assert!(token.is_sensitive());
    assert!(req.headers()[header::AUTHORIZATION].is_sensitive());
    assert_eq!(output.signed_headers, "host;x-amz-date;x-amz-security-token");
    Ok(())
}
