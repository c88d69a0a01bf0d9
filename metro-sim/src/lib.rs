//! Metro network train simulation.
//!
//! Moves a fleet of trains from one station to another across a network of
//! lines, one tick at a time, with at most one train per station. Finds
//! routes with a layered breadth-first search, optionally spreads trains
//! over alternative routes up front, and replays the result as a timetable.

pub mod balance;
pub mod loader;
pub mod network;
pub mod planner;
pub mod report;
pub mod sim;
