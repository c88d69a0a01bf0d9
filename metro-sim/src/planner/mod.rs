//! Route search between positions.
//!
//! The path finder answers "what is the shortest way from here to there",
//! ignoring occupancy. The simulation asks it whenever a train has more than
//! one way to go, and again to pick the line a train should be on when it
//! pulls into an interchange.

mod search;

pub use search::{PathFinder, PathQuery, SearchScratch, Unreachable};
