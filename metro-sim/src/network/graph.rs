//! The network registry.
//!
//! `Network` owns every station and line. Lines refer to stations and
//! stations refer back to lines through integer ids, so there are no owning
//! cycles; name lookups go through two hash tables.

use std::collections::HashMap;

use super::{Line, LineId, NetworkBuilder, NetworkError, Position, Station, StationId};

/// Immutable transit topology.
///
/// # Examples
///
/// ```
/// use metro_sim::network::Network;
///
/// let mut builder = Network::builder();
/// builder.add_line("A", ["S1", "S2", "S3"]).unwrap();
/// builder.add_line("B", ["S3", "S4", "S5"]).unwrap();
/// let network = builder.build();
///
/// assert_eq!(network.station("B", 0).unwrap().name(), "S3");
/// assert!(network.station("B", 3).is_err());
/// assert!(network.line("C").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub(super) stations: Vec<Station>,
    pub(super) lines: Vec<Line>,
    pub(super) station_index: HashMap<String, StationId>,
    pub(super) line_index: HashMap<String, LineId>,
}

impl Network {
    /// Start building a network.
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    /// Look up a line by name.
    pub fn line(&self, name: &str) -> Result<&Line, NetworkError> {
        self.line_id(name).map(|id| self.line_by_id(id))
    }

    /// Look up a line id by name.
    pub fn line_id(&self, name: &str) -> Result<LineId, NetworkError> {
        self.line_index
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownLine(name.to_string()))
    }

    /// Line for an id minted by this network.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this network.
    pub fn line_by_id(&self, id: LineId) -> &Line {
        &self.lines[id.0]
    }

    /// Station at `index` on the line named `line`.
    pub fn station(&self, line: &str, index: usize) -> Result<&Station, NetworkError> {
        let position = self.position(line, index)?;
        Ok(self.station_by_id(self.station_at(position)))
    }

    /// Station for an id minted by this network.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from this network.
    pub fn station_by_id(&self, id: StationId) -> &Station {
        &self.stations[id.0]
    }

    /// Look up a station by exact name.
    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        self.station_id(name).map(|id| self.station_by_id(id))
    }

    /// Look up a station id by exact name.
    pub fn station_id(&self, name: &str) -> Option<StationId> {
        self.station_index.get(name).copied()
    }

    /// Checked constructor for a position.
    ///
    /// The closing entry of a circular line is returned as index 0, so every
    /// physical stop has exactly one position per line.
    pub fn position(&self, line: &str, index: usize) -> Result<Position, NetworkError> {
        let id = self.line_id(line)?;
        let found = self.line_by_id(id);
        if index >= found.len() {
            return Err(NetworkError::StationNotFound {
                line: line.to_string(),
                index,
            });
        }
        Ok(Position::new(id, found.canonical_index(index)))
    }

    /// Canonical form of `position` (see [`Network::position`]).
    pub fn canonical(&self, position: Position) -> Position {
        match self.lines.get(position.line.0) {
            Some(line) => Position::new(position.line, line.canonical_index(position.index)),
            None => position,
        }
    }

    /// True if `position` names a real entry of this network.
    pub fn contains(&self, position: Position) -> bool {
        self.lines
            .get(position.line.0)
            .is_some_and(|line| position.index < line.len())
    }

    /// Physical station at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is not in this network (see [`Network::contains`]).
    pub fn station_at(&self, position: Position) -> StationId {
        self.line_by_id(position.line).stations()[position.index]
    }

    /// True if both positions are the same physical station.
    pub fn same_station(&self, a: Position, b: Position) -> bool {
        self.station_at(a) == self.station_at(b)
    }

    /// Number of lines crossing the station at `id`.
    pub fn crossing_count(&self, id: StationId) -> usize {
        self.station_by_id(id).line_count()
    }

    /// All lines, in insertion order.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// All stations, in first-seen order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// Positions one stop either side of `position` on its own line.
    pub fn line_neighbors(&self, position: Position) -> impl Iterator<Item = Position> {
        self.line_by_id(position.line)
            .neighbor_indices(position.index)
            .into_iter()
            .flatten()
            .map(move |index| Position::new(position.line, index))
    }

    /// The same physical station as seen from every other line serving it.
    pub fn interchange_frames(&self, position: Position) -> impl Iterator<Item = Position> + '_ {
        let station = self.station_by_id(self.station_at(position));
        station
            .memberships()
            .iter()
            .filter(move |(line, _)| *line != position.line)
            .map(|(line, index)| Position::new(*line, *index))
    }

    /// True if two positions are one search step apart: neighbours on one
    /// line, or the same station on two lines.
    pub fn linked(&self, a: Position, b: Position) -> bool {
        if a.line == b.line {
            self.line_by_id(a.line).adjacent(a.index, b.index)
        } else {
            self.same_station(a, b)
        }
    }

    /// True if a train can get from `a` to `b` in one tick: a linked step,
    /// or a line step that arrives already switched onto another line.
    pub fn one_hop(&self, a: Position, b: Position) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        self.linked(a, b) || self.line_neighbors(a).any(|next| self.same_station(next, b))
    }

    /// Human-readable label, `Station (Line:n)` with a 1-based index.
    pub fn describe(&self, position: Position) -> String {
        if !self.contains(position) {
            return position.to_string();
        }
        format!(
            "{} ({}:{})",
            self.station_by_id(self.station_at(position)).name(),
            self.line_by_id(position.line).name(),
            position.index + 1
        )
    }
}
