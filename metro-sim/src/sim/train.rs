//! Trains and their paths.

use std::collections::VecDeque;
use std::fmt;

use crate::network::Position;

/// Train identity. Lower ids are served first within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainId(pub usize);

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

/// Where a train is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainStatus {
    /// Blocked last tick; will try again.
    Waiting,
    /// Moved or changed line last tick.
    Moving,
    /// Reached the destination. Terminal.
    Done,
}

/// A train.
#[derive(Debug, Clone)]
pub struct Train {
    id: TrainId,
    position: Position,
    status: TrainStatus,
    /// One entry per tick the train was live, plus the destination.
    visited: Vec<Position>,
    /// Waypoints still to follow, current position excluded.
    route: VecDeque<Position>,
}

impl Train {
    /// A waiting train at `position` with no route.
    pub fn new(id: TrainId, position: Position) -> Self {
        Self {
            id,
            position,
            status: TrainStatus::Waiting,
            visited: Vec::new(),
            route: VecDeque::new(),
        }
    }

    pub fn id(&self) -> TrainId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn status(&self) -> TrainStatus {
        self.status
    }

    pub fn is_done(&self) -> bool {
        self.status == TrainStatus::Done
    }

    /// Positions recorded so far, including repeats while waiting.
    pub fn visited(&self) -> &[Position] {
        &self.visited
    }

    /// Remaining waypoints.
    pub fn route(&self) -> &VecDeque<Position> {
        &self.route
    }

    /// Replace the remaining route.
    pub fn set_route(&mut self, waypoints: impl IntoIterator<Item = Position>) {
        self.route = waypoints.into_iter().collect();
    }

    /// Visited positions with consecutive repeats removed.
    pub fn compacted_path(&self) -> Vec<Position> {
        compact_path(&self.visited)
    }

    pub(crate) fn record(&mut self) {
        self.visited.push(self.position);
    }

    pub(crate) fn move_to(&mut self, position: Position) {
        self.position = position;
        self.status = TrainStatus::Moving;
    }

    pub(crate) fn wait(&mut self) {
        self.status = TrainStatus::Waiting;
    }

    pub(crate) fn finish(&mut self) {
        self.visited.push(self.position);
        self.status = TrainStatus::Done;
    }

    pub(crate) fn pop_waypoint(&mut self) -> Option<Position> {
        self.route.pop_front()
    }
}

/// Remove consecutive duplicates.
///
/// Applying this twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use metro_sim::sim::compact_path;
///
/// assert_eq!(compact_path(&[1, 1, 2, 2, 2, 3, 1, 1]), vec![1, 2, 3, 1]);
/// ```
pub fn compact_path<T: PartialEq + Copy>(path: &[T]) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(path.len());
    for &item in path {
        if out.last() != Some(&item) {
            out.push(item);
        }
    }
    out
}
