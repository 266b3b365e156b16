use std::io;

use thiserror::Error;
use trenn::PatternError;

/// Any of the ways a stream operation can fail.
///
/// This is used via [`Error`], which wraps this in a [`Box`].
#[derive(Error, Debug)]
pub enum InnerError {
    /// The delimiter pattern text is malformed.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
    /// The stream did not contain input of the required shape.
    #[error("invalid input at byte {at}: {msg}")]
    InvalidInput {
        /// Byte position of the stream at the point of failure.
        at: usize,
        /// What was expected and what was found instead.
        msg: String,
    },
    /// An IO error while reading from the stream.
    #[error("IO error while reading: {}", .0)]
    Io(#[source] io::Error),
}

/// Boxed version of [`InnerError`].
pub type Error = Box<InnerError>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Box::new(InnerError::Io(err))
    }
}

impl From<PatternError> for Error {
    fn from(err: PatternError) -> Self {
        Box::new(InnerError::InvalidPattern(err))
    }
}

/// Builds an [`InnerError::InvalidInput`] at the given stream position.
pub(crate) fn invalid_input(at: usize, msg: impl Into<String>) -> Error {
    Box::new(InnerError::InvalidInput {
        at,
        msg: msg.into(),
    })
}
