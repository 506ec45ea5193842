use thiserror::Error;

/// A type alias for handling `Result`s with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the server dialog handler and fixture loader.
#[derive(Error, Debug)]
pub enum Error {
    /// The wire codec failed to parse or encode a message.
    #[error(transparent)]
    Sip(#[from] vcu_sip::Error),

    /// The RTP mirror reported an error.
    #[error(transparent)]
    Rtp(#[from] vcu_rtp::Error),

    /// No canned reply is on file for a subject the dialog handler needs
    /// to answer.
    #[error("no canned reply fixture for subject {0}")]
    MissingFixture(String),

    /// The canned-reply JSON fixture didn't match the expected shape
    /// (spec.md §6 "key-value map keyed by subject").
    #[error("malformed canned-reply fixture: {0}")]
    Fixture(String),

    /// Reading the fixture file, or sending/receiving on the dialog
    /// socket, failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
