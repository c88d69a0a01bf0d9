//! Tick-based train simulation.
//!
//! A fleet starts at one origin and must reach one destination. Every
//! station other than those two holds at most one train at a time, so
//! trains queue behind each other and spread across alternative lines.
//!
//! [`Simulation`] explores: trains decide their own moves each tick.
//! [`Replay`] re-runs fixed routes (from a simulation or from
//! [`crate::balance::PathBalancer`]) and records a [`Timetable`].

mod config;
mod error;
mod mover;
mod occupancy;
mod replay;
mod train;


pub use config::{MAX_IDLE_TICKS_VAR, MAX_TICKS_VAR, SimConfig};
pub use error::SimError;
pub use mover::{Move, MoveKind, Simulation, TickReport};
pub use occupancy::Occupancy;
pub use replay::{Replay, Snapshot, StationSnapshot, Timetable};
pub use train::{Train, TrainId, TrainStatus, compact_path};
