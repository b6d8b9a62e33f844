use core::{convert::Infallible, fmt};

use snafu::Snafu;
use snafu_utils::Location;

use crate::block::BlockId;

/// Failure of an engine operation.
///
/// Every variant is recoverable: the engine state is left exactly as it was
/// before the failed call.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    #[snafu(display("memory not initialized"))]
    Uninitialized {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("invalid {what}: {value} (expected {expected})"))]
    InvalidArgument {
        what: &'static str,
        value: usize,
        expected: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("unknown placement algorithm `{name}` (expected first, best or worst)"))]
    UnknownAlgorithm {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("no free block with size >= {size}"))]
    NoFit {
        size: usize,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("block {id} not found"))]
    NotFound {
        id: BlockId,
        #[snafu(implicit)]
        location: Location,
    },
}

/// Discriminator of [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Uninitialized,
    InvalidArgument,
    UnknownAlgorithm,
    NoFit,
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::InvalidArgument => "invalid argument",
            Self::UnknownAlgorithm => "unknown algorithm",
            Self::NoFit => "no fit",
            Self::NotFound => "not found",
        };
        f.write_str(name)
    }
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Uninitialized { .. } => ErrorKind::Uninitialized,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::UnknownAlgorithm { .. } => ErrorKind::UnknownAlgorithm,
            Self::NoFit { .. } => ErrorKind::NoFit,
            Self::NotFound { .. } => ErrorKind::NotFound,
        }
    }

    /// Where the error was raised.
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            Self::Uninitialized { location }
            | Self::InvalidArgument { location, .. }
            | Self::UnknownAlgorithm { location, .. }
            | Self::NoFit { location, .. }
            | Self::NotFound { location, .. } => *location,
        }
    }
}

impl From<Infallible> for EngineError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
