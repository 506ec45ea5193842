use thiserror::Error;

/// A type alias for handling `Result`s with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the RTP endpoint.
#[derive(Error, Debug)]
pub enum Error {
    /// A received datagram was too short to hold a 12-byte header plus one
    /// full frame (spec.md §4.7 "drop packets shorter than 12+160").
    #[error("short RTP packet: {len} bytes")]
    ShortPacket { len: usize },

    /// The header's version or payload type didn't match the dialect
    /// (V=2, PT=8/PCMA).
    #[error("unsupported RTP header: version={version}, payload_type={payload_type}")]
    UnsupportedHeader { version: u8, payload_type: u8 },

    /// Binding or sending on the endpoint's UDP socket failed.
    #[error("RTP transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The audio source/sink reported a fatal error (spec.md §7: fatal for
    /// the RTP endpoint, `stop` is invoked).
    #[error("audio device error: {0}")]
    AudioDevice(String),
}
