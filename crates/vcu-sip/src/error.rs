use thiserror::Error;

/// A type alias for handling `Result`s with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing or encoding the VCU SIP dialect.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The message has no recognizable start line
    #[error("missing or malformed start line")]
    MissingStartLine,

    /// A request start line did not carry a `sip:` URI in the expected shape
    #[error("invalid SIP URI: {0}")]
    InvalidUri(String),

    /// An unrecognized SIP method
    #[error("invalid SIP method: {0}")]
    InvalidMethod(String),

    /// The `CSeq` header was missing or not `<n> <METHOD>`
    #[error("invalid CSeq header: {0}")]
    InvalidCSeq(String),

    /// A binary body's decoded length was not a multiple of the record size
    #[error("body length {actual} is not a multiple of record size {record_size}")]
    BodyLengthMismatch {
        /// Decoded byte length
        actual: usize,
        /// Fixed per-record size
        record_size: usize,
    },

    /// Base64 decoding of a binary body failed
    #[error("base64 decode failed: {0}")]
    Base64(String),

    /// A binary record's fixed-width character field was not valid ASCII
    #[error("non-ASCII text in fixed-width field")]
    InvalidText,
}
