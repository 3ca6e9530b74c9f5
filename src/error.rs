use jiff::civil::Date;

use crate::monthrule::MonthRule;

/// The error type for every fallible operation in this crate.
///
/// Each variant corresponds to one [`ErrorKind`]. Callers that only care
/// about the category of a failure (and not its message) should match on
/// [`Error::kind`] instead of the variants themselves.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The rule's configuration is incomplete or incoherent, or an
    /// operation that needs a validated rule ran before validation.
    #[error("rule is not ready: {0}")]
    NotInitialized(String),
    /// The date given is not an occurrence of the rule.
    #[error("`{0}` is not an occurrence of this rule")]
    OutOfRange(Date),
    /// An argument is outside its legal range, e.g. a step factor of zero.
    #[error("{0}")]
    InvalidArgument(String),
    /// A string form could not be parsed at all.
    #[error("{0}")]
    Format(String),
    /// A string form parsed, but names a calendrically impossible value.
    #[error("{0}")]
    BadValue(String),
    /// A search for an occurrence exhausted its bounds.
    #[error("{0}")]
    NotFound(String),
    /// The month rule is recognized but its evaluation is not implemented.
    #[error("month rule `{0}` is not implemented")]
    Unsupported(MonthRule),
}

impl Error {
    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            Error::NotInitialized(_) => ErrorKind::NotInitialized,
            Error::OutOfRange(_) => ErrorKind::OutOfRange,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Format(_) => ErrorKind::Format,
            Error::BadValue(_) => ErrorKind::BadValue,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Unsupported(_) => ErrorKind::Unsupported,
        }
    }
}

/// The category of an [`Error`], without any payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    NotInitialized,
    OutOfRange,
    InvalidArgument,
    Format,
    BadValue,
    NotFound,
    Unsupported,
}
