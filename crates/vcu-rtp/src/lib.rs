//! # vcu-rtp
//!
//! The RTP media endpoint (spec.md §4.7, §7): the 12-byte header codec,
//! G.711 A-law transcoding, the bounded jitter buffer, and the 20-ms-paced
//! send/receive loops, grounded in `original_source/rtp/rtp_endpoint.py`.
//!
//! - [`header`] — the wire header
//! - [`codec`] — A-law encode/decode + RMS voice-activity detection
//! - [`jitter`] — the bounded FIFO playback buffer
//! - [`audio`] — the `AudioSource`/`AudioSink` device seam
//! - [`endpoint`] — [`endpoint::RtpEndpoint`], wiring it all into two
//!   spawned tasks

pub mod audio;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod header;
pub mod jitter;

pub use endpoint::RtpEndpoint;
pub use error::{Error, Result};
pub use header::{RtpHeader, HEADER_LEN, PAYLOAD_TYPE_PCMA, RTP_VERSION};

pub mod prelude {
    pub use crate::audio::{AudioSink, AudioSource, NullAudioSink, SilentAudioSource};
    pub use crate::codec::{a_law_to_linear, decode_frame, encode_frame, linear_to_a_law, rms, FRAME_SAMPLES};
    pub use crate::endpoint::RtpEndpoint;
    pub use crate::error::{Error, Result};
    pub use crate::header::{RtpHeader, HEADER_LEN, PAYLOAD_TYPE_PCMA, RTP_VERSION};
    pub use crate::jitter::{JitterBuffer, JitterFrame, DEFAULT_CAPACITY};
}
