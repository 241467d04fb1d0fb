use trackable::error::{ErrorKind as TrackableErrorKind, ErrorKindExt};
use trackable::error::{Failure, TrackableError};

/// This crate specific `Error` type.
#[derive(Debug, Clone, TrackableError)]
pub struct Error(TrackableError<ErrorKind>);
impl From<Failure> for Error {
    fn from(f: Failure) -> Self {
        ErrorKind::Other.takes_over(f).into()
    }
}

/// Possible error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input was given.
    ///
    /// Shape mismatches between samples, bin edges, weight and outputs,
    /// empty or unsorted edge sequences, non-positive bin counts and
    /// malformed ranges are reported with this kind.
    InvalidInput,

    /// The outer range of a histogram is not finite or is inverted.
    InvalidRange,

    /// Other error.
    Other,
}
impl TrackableErrorKind for ErrorKind {}
