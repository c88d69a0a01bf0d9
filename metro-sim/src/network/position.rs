//! Positions: a station seen through one line.

use std::fmt;

use super::LineId;

/// A (line, index) pair.
///
/// The same physical station appears as one position per line serving it.
/// Positions are only meaningful for the network that produced them; build
/// them with [`Network::position`](super::Network::position) or take them
/// from the network's neighbor accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: LineId,
    pub index: usize,
}

impl Position {
    /// Creates a position without checking it against any network.
    pub fn new(line: LineId, index: usize) -> Self {
        Self { line, index }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}:{}", self.line.0, self.index)
    }
}
