//! Transit topology: stations, lines and interchanges.
//!
//! The network is built once and then treated as immutable. Everything that
//! changes while trains run (occupancy, search visit counters) lives in
//! separate state values owned by the planner and the simulation.

mod builder;
mod error;
mod graph;
mod line;
mod position;
mod station;

pub use builder::NetworkBuilder;
pub use error::NetworkError;
pub use graph::Network;
pub use line::{Line, LineId};
pub use position::Position;
pub use station::{Station, StationId};
