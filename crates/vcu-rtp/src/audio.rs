//! The `AudioSource`/`AudioSink` seam (SPEC_FULL.md §4.7).
//!
//! `original_source/rtp/rtp_endpoint.py` binds `pyaudio` directly to the
//! endpoint; spec.md §1 marks audio device discovery as an external
//! collaborator. These two traits are the seam: one frame of linear PCM
//! in, one frame out, with the device/driver specifics left to an
//! implementer outside this crate. `SilentAudioSource`/`NullAudioSink`
//! are the headless no-op implementations used by tests and by the CLI
//! when no real device is wired up, mirroring how
//! `rvoip-rtp-core`'s `payload::PayloadFormat` trait separates codec from
//! transport.

use async_trait::async_trait;

use crate::codec::FRAME_SAMPLES;
use crate::error::Result;

/// Captures one 20 ms frame of linear PCM audio (160 samples at 8 kHz mono).
#[async_trait]
pub trait AudioSource: Send + Sync {
    /// Read exactly [`FRAME_SAMPLES`] samples, blocking (or yielding, for
    /// an async source) until a full frame is available.
    async fn capture_frame(&mut self) -> Result<Vec<i16>>;
}

/// Plays one 20 ms frame of linear PCM audio.
#[async_trait]
pub trait AudioSink: Send + Sync {
    async fn play_frame(&mut self, samples: &[i16]) -> Result<()>;
}

/// An `AudioSource` that always yields silence — used for headless
/// operation and tests where no real capture device is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentAudioSource;

#[async_trait]
impl AudioSource for SilentAudioSource {
    async fn capture_frame(&mut self) -> Result<Vec<i16>> {
        Ok(vec![0i16; FRAME_SAMPLES])
    }
}

/// An `AudioSink` that discards every frame it's handed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudioSink;

#[async_trait]
impl AudioSink for NullAudioSink {
    async fn play_frame(&mut self, _samples: &[i16]) -> Result<()> {
        Ok(())
    }
}
