use thiserror::Error;

/// A type alias for handling `Result`s with [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the transaction/aggregation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A response's (subject, content-type) pair didn't match what the
    /// pending transaction expected — spec.md §9 "reject mismatches
    /// rather than fall through".
    #[error("response subject/content-type mismatch: expected {expected}, got {actual}")]
    SubjectMismatch { expected: String, actual: String },

    /// An action method was attempted before `register` populated
    /// `channel_list` (spec.md §8 boundary behavior).
    #[error("channel_list is empty; register has not completed")]
    ChannelListEmpty,
}
