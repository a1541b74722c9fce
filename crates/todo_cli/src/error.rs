//! CLI error type.

use std::error::Error;
use std::fmt::{Display, Formatter};
use todo_core::{FilterError, ServiceError, SessionError, StoreError};

#[derive(Debug)]
pub enum CliError {
    InvalidDate { flag: &'static str, value: String },
    NoHomeDir,
    Editor(String),
    Io(std::io::Error),
    Filter(FilterError),
    Service(ServiceError),
    Store(StoreError),
    /// A failure inside an open session; staged changes were discarded.
    RolledBack(Box<CliError>),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate { flag, value } => {
                write!(f, "cannot parse {flag} date `{value}`")
            }
            Self::NoHomeDir => write!(f, "cannot locate home directory; pass --database"),
            Self::Editor(message) => write!(f, "editor failed: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Filter(err) => write!(f, "{err}"),
            Self::Service(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::RolledBack(err) => write!(f, "{err}; no changes were saved"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Filter(err) => Some(err),
            Self::Service(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::RolledBack(err) => Some(err.as_ref()),
            Self::InvalidDate { .. } | Self::NoHomeDir | Self::Editor(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FilterError> for CliError {
    fn from(value: FilterError) -> Self {
        Self::Filter(value)
    }
}

impl From<ServiceError> for CliError {
    fn from(value: ServiceError) -> Self {
        Self::Service(value)
    }
}

impl From<SessionError<CliError>> for CliError {
    fn from(value: SessionError<CliError>) -> Self {
        let lost = value.lost_changes();
        let err = match value {
            SessionError::Open(err) | SessionError::Flush(err) => Self::Store(err),
            SessionError::Body(err) => err,
        };
        // Write failures already say so in their own message.
        match err {
            Self::Store(StoreError::StorageWriteFailed(_)) => err,
            err if lost => Self::RolledBack(Box::new(err)),
            err => err,
        }
    }
}
