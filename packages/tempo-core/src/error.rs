use std::borrow::Cow;

/// Display text of [`Error::Timeout`].
pub const TIMEOUT_MESSAGE: &str = "operation timed out";

/// The common rejection payload.
///
/// Domain errors that need to travel through timeouts or generic stages
/// implement `From<Error>` so those stages can build them, and `From<E>` for
/// whatever error type the previous stage of a chain rejects with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Error {
    /// A deadline passed while the wrapped computation was still pending.
    #[error("operation timed out")]
    Timeout,
    #[error("{0}")]
    Message(Cow<'static, str>),
}

impl Error {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Error::Message(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Timeout => TIMEOUT_MESSAGE,
            Error::Message(message) => message,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}

impl Default for Error {
    fn default() -> Self {
        Error::Message(Cow::Borrowed("error"))
    }
}

impl From<&'static str> for Error {
    fn from(message: &'static str) -> Self {
        Error::Message(Cow::Borrowed(message))
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Error::Message(Cow::Owned(message))
    }
}
