//! AWS SigV4 signer
//!
//! Sign http requests with [`RequestSigner`], and event stream bodies with
//! the [`ChunkSigner`] seeded by a streaming request.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use rollsign_aws_v4::{Credential, PayloadSigning, RequestSigner};
//! use rollsign_core::{SignRequest, SigningMethod};
//!
//! # fn main() -> anyhow::Result<()> {
//! let signer = RequestSigner::new("transcribe", "us-east-1")
//!     .with_payload_signing(PayloadSigning::Streaming);
//! let cred = Credential::new("access_key_id", "secret_access_key");
//!
//! let (mut parts, _) = http::Request::post("https://transcribestreaming.us-east-1.amazonaws.com/stream-transcription")
//!     .body(())?
//!     .into_parts();
//! let output = signer.sign_request(&mut parts, None, &cred, SigningMethod::Header)?;
//!
//! let audio = vec![Ok::<_, std::io::Error>(bytes::Bytes::from_static(b"..."))];
//! for frame in signer.chunk_signer(&cred, &output)?.sign_frames(audio) {
//!     let _frame = frame?;
//! }
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod scope;
pub use scope::CredentialScope;

mod payload;
pub use payload::PayloadHash;
pub use payload::PayloadSigning;

mod canonical;
pub use canonical::canonical_query;
pub use canonical::CanonicalRequest;

mod signature;
pub use signature::calculate_signature;
pub use signature::generate_signing_key;
pub use signature::string_to_sign;

mod sign_request;
pub use sign_request::RequestSigner;
pub use sign_request::SigningOutput;

mod event_stream;
pub use event_stream::sort_frame_headers;
pub use event_stream::ChunkSigner;
pub use event_stream::SignedFrameStream;
pub use event_stream::SignedFrames;

mod constants;
