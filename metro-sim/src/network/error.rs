//! Network construction and lookup errors.
//!
//! These represent malformed topology and lookups that miss. They are raised
//! while the network is built or queried, never during a simulation tick.

/// Errors from building or querying a [`Network`](super::Network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// A station repeats on a line somewhere other than first/last
    #[error("line {line}: station {station} appears at positions {first} and {second}")]
    DuplicateStation {
        line: String,
        station: String,
        first: usize,
        second: usize,
    },

    /// Two lines share one name
    #[error("line {0} is defined more than once")]
    DuplicateLine(String),

    /// A line has no stations
    #[error("line {0} has no stations")]
    EmptyLine(String),

    /// No line with this name
    #[error("unknown line: {0}")]
    UnknownLine(String),

    /// Index is out of range for the line
    #[error("line {line} has no station at index {index}")]
    StationNotFound { line: String, index: usize },
}
