//! Crate-wide error type.

use std::fmt;
use std::io;

use crate::sim::types::DayType;

/// Convenience alias used throughout the simulation modules.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal simulation and table errors. Recoverable configuration issues are
/// handled by clamping with a warning instead (see [`crate::config`]).
#[derive(Debug)]
pub enum Error {
    /// A weight vector summed to zero; normalization is undefined.
    EmptyDistribution,
    /// No activity-probability entry exists for the requested combination.
    /// Indicates a table/profile mismatch and must never be defaulted away.
    ActivityLookup {
        day_type: DayType,
        occupants: u8,
        profile: String,
    },
    /// An input table is missing or structurally invalid.
    Table(String),
    /// Underlying I/O failure while reading tables or writing results.
    Io(io::Error),
    /// CSV parse or write failure.
    Csv(csv::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyDistribution => {
                write!(f, "discrete distribution has no positive weights")
            }
            Error::ActivityLookup {
                day_type,
                occupants,
                profile,
            } => write!(
                f,
                "no activity entry for ({day_type}, {occupants} occupants, profile \"{profile}\")"
            ),
            Error::Table(msg) => write!(f, "table error: {msg}"),
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Csv(e) => write!(f, "csv error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Csv(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Csv(e)
    }
}
