//! Replay fixed routes and record who stood where.
//!
//! Unlike [`super::Simulation`], trains here make no decisions: each one
//! follows its route and waits while the next station is taken. A train is
//! done once its route runs out at the destination station, whichever line
//! it arrived on. The number of ticks the whole fleet needs is the cost of
//! the timetable.

use tracing::{debug, trace};

use crate::network::{Network, Position, StationId};

use super::{Occupancy, SimConfig, SimError, Train, TrainId};

/// Trains standing at one station at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationSnapshot {
    pub station: StationId,
    /// Frame of the first occupant.
    pub frame: Position,
    pub trains: Vec<TrainId>,
}

/// Every occupied station at the end of a tick, in station order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: usize,
    pub stations: Vec<StationSnapshot>,
}

/// Result of a complete replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetable {
    /// Ticks until the last train arrived.
    pub cost: usize,
    pub snapshots: Vec<Snapshot>,
    /// Positions each train held, starting where it began.
    pub routes: Vec<(TrainId, Vec<Position>)>,
}

/// Route-following replay.
#[derive(Debug, Clone)]
pub struct Replay<'a> {
    network: &'a Network,
    destination: Position,
    config: SimConfig,
    trains: Vec<Train>,
    occupancy: Occupancy,
    routes: Vec<(TrainId, Vec<Position>)>,
    snapshots: Vec<Snapshot>,
    tick: usize,
    idle: usize,
}

impl<'a> Replay<'a> {
    /// Set up a replay of `trains`, each at its current position with its
    /// remaining route.
    ///
    /// # Errors
    ///
    /// - [`SimError::NoTrains`] for an empty fleet
    /// - [`SimError::InvalidPosition`] if an end or a train position is not
    ///   in `network`
    /// - [`SimError::InvalidRoute`] if two consecutive waypoints are more than
    ///   one tick apart
    pub fn new(
        network: &'a Network,
        origin: Position,
        destination: Position,
        trains: Vec<Train>,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        if trains.is_empty() {
            return Err(SimError::NoTrains);
        }
        for end in [origin, destination] {
            if !network.contains(end) {
                return Err(SimError::InvalidPosition(end));
            }
        }
        let destination = network.canonical(destination);
        let mut occupancy = Occupancy::new(
            network,
            network.station_at(origin),
            network.station_at(destination),
        );

        let mut routes = Vec::with_capacity(trains.len());
        let mut ready = Vec::with_capacity(trains.len());
        for train in trains {
            let start = train.position();
            if !network.contains(start) {
                return Err(SimError::InvalidPosition(start));
            }
            let mut from = start;
            for &to in train.route() {
                if !network.one_hop(from, to) {
                    return Err(SimError::InvalidRoute {
                        train: train.id(),
                        from,
                        to,
                    });
                }
                from = to;
            }

            let start = network.canonical(start);
            let mut fresh = Train::new(train.id(), start);
            fresh.set_route(train.route().iter().map(|p| network.canonical(*p)));
            occupancy.place(network.station_at(start), fresh.id());
            if network.station_at(start) == occupancy.destination() && fresh.route().is_empty() {
                fresh.finish();
            }
            routes.push((fresh.id(), vec![start]));
            ready.push(fresh);
        }
        ready.sort_by_key(Train::id);
        routes.sort_by_key(|(id, _)| *id);

        Ok(Self {
            network,
            destination,
            config,
            trains: ready,
            occupancy,
            routes,
            snapshots: Vec::new(),
            tick: 0,
            idle: 0,
        })
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    pub fn is_finished(&self) -> bool {
        self.trains.iter().all(Train::is_done)
    }

    /// Replay to the end.
    ///
    /// # Errors
    ///
    /// Any error from [`Replay::tick`].
    pub fn run(mut self) -> Result<Timetable, SimError> {
        while !self.is_finished() {
            self.tick()?;
        }
        debug!(cost = self.tick, "replay finished");
        Ok(Timetable {
            cost: self.tick,
            snapshots: self.snapshots,
            routes: self.routes,
        })
    }

    /// Advance every unfinished train along its route.
    ///
    /// # Errors
    ///
    /// - [`SimError::RouteIncomplete`] when a train has no waypoints left
    ///   short of the destination
    /// - [`SimError::Stalled`] when a limit in [`SimConfig`] is hit
    pub fn tick(&mut self) -> Result<Snapshot, SimError> {
        if self.tick >= self.config.max_ticks && !self.is_finished() {
            return Err(self.stalled());
        }
        self.tick += 1;
        let mut progressed = false;

        for i in 0..self.trains.len() {
            if self.trains[i].is_done() {
                continue;
            }
            let id = self.trains[i].id();
            let at = self.trains[i].position();
            let Some(&next) = self.trains[i].route().front() else {
                return Err(SimError::RouteIncomplete { train: id, at });
            };

            let here = self.network.station_at(at);
            let there = self.network.station_at(next);
            if here == there {
                self.trains[i].move_to(next);
            } else if there == self.occupancy.destination() || !self.occupancy.is_occupied(there) {
                self.occupancy.leave(here, id);
                self.occupancy.enter(there, id);
                self.trains[i].move_to(next);
                progressed = true;
            } else {
                self.trains[i].wait();
                trace!(tick = self.tick, train = %id, "replay wait");
                continue;
            }

            self.trains[i].pop_waypoint();
            self.routes[i].1.push(next);
            if there == self.occupancy.destination() && self.trains[i].route().is_empty() {
                self.trains[i].finish();
                progressed = true;
            }
        }

        let snapshot = self.snapshot();
        self.snapshots.push(snapshot.clone());

        if progressed {
            self.idle = 0;
        } else {
            self.idle += 1;
            if !self.is_finished() && self.idle >= self.config.max_idle_ticks {
                return Err(self.stalled());
            }
        }
        Ok(snapshot)
    }

    fn snapshot(&self) -> Snapshot {
        let stations = self
            .occupancy
            .occupied()
            .filter_map(|(station, trains)| {
                let head = *trains.first()?;
                let first = self.trains.iter().find(|t| t.id() == head)?;
                Some(StationSnapshot {
                    station,
                    frame: first.position(),
                    trains: trains.to_vec(),
                })
            })
            .collect();
        Snapshot {
            tick: self.tick,
            stations,
        }
    }

    fn stalled(&self) -> SimError {
        SimError::Stalled {
            tick: self.tick,
            pending: self
                .trains
                .iter()
                .filter(|t| !t.is_done())
                .map(Train::id)
                .collect(),
        }
    }
}
