use thiserror::Error;

/// A type alias for handling `Result`s with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the client dialog/action layer.
#[derive(Error, Debug)]
pub enum Error {
    /// The wire codec failed to parse or encode a message.
    #[error(transparent)]
    Sip(#[from] vcu_sip::Error),

    /// A catalog or transaction invariant was violated.
    #[error(transparent)]
    Transaction(#[from] vcu_transaction::Error),

    /// The RTP endpoint reported an error.
    #[error(transparent)]
    Rtp(#[from] vcu_rtp::Error),

    /// An action that requires `channel_list[2]` (radio operations) or
    /// `channel_list[0]` (`get_all_frequency_btn`) was attempted before
    /// `register` populated it (spec.md §8 boundary behavior).
    #[error("channel_list is empty; register has not completed")]
    ChannelListEmpty,

    /// `select_radio`/`bye` referenced a code not present in the local
    /// radio catalog.
    #[error("unknown radio code: {0}")]
    UnknownRadioCode(String),

    /// Sending the serialized request over UDP failed.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}
