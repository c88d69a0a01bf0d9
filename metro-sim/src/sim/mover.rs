//! The tick loop.
//!
//! Each tick every unfinished train, lowest id first, looks at the moves open
//! to it and picks one. A lone option is taken as is; when there is a choice
//! the path finder breaks the tie. Earlier trains therefore win contested
//! stations within a tick.
//!
//! Arriving at an interchange also settles which line the train continues
//! on: the shortest route's change of line is folded into the arrival, so a
//! train never spends a tick standing still just to switch frames on the
//! way through.

use tracing::{debug, trace};

use crate::network::{Network, Position, StationId};
use crate::planner::{PathFinder, PathQuery, SearchScratch};

use super::{Occupancy, SimConfig, SimError, Train, TrainId};

/// What a train did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    /// Changed station.
    Travel,
    /// Stayed at the same station and changed line.
    Reframe,
}

/// One train's move within a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub train: TrainId,
    pub from: Position,
    pub to: Position,
    pub kind: MoveKind,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// 1-based tick number.
    pub tick: usize,
    pub moves: Vec<Move>,
    /// Trains that reached the destination this tick.
    pub finished: Vec<TrainId>,
    /// Trains that found no usable move.
    pub waiting: Vec<TrainId>,
}

impl TickReport {
    fn new(tick: usize) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// True if some train changed station or finished.
    pub fn progressed(&self) -> bool {
        !self.finished.is_empty() || self.moves.iter().any(|m| m.kind == MoveKind::Travel)
    }
}

/// A fleet of trains driven from one origin to one destination.
///
/// # Examples
///
/// ```
/// use metro_sim::network::Network;
/// use metro_sim::sim::{SimConfig, Simulation};
///
/// let mut builder = Network::builder();
/// builder.add_line("A", ["S1", "S2", "S3"]).unwrap();
/// builder.add_line("B", ["S3", "S4", "S5"]).unwrap();
/// let network = builder.build();
///
/// let origin = network.position("A", 0).unwrap();
/// let destination = network.position("B", 2).unwrap();
/// let mut sim = Simulation::new(&network, origin, destination, 2, SimConfig::default()).unwrap();
///
/// assert_eq!(sim.run().unwrap(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation<'a> {
    network: &'a Network,
    origin: Position,
    destination: Position,
    config: SimConfig,
    trains: Vec<Train>,
    occupancy: Occupancy,
    scratch: SearchScratch,
    tick: usize,
    idle: usize,
}

/// A decision for one train, before it is applied.
struct Choice {
    hop: Position,
    /// Shortest route that produced `hop`, if a search was needed.
    route: Option<Vec<Position>>,
}

impl<'a> Simulation<'a> {
    /// Place `trains` trains at `origin`.
    ///
    /// # Errors
    ///
    /// [`SimError::NoTrains`] for an empty fleet, and
    /// [`SimError::InvalidPosition`] if either end is not in `network`.
    pub fn new(
        network: &'a Network,
        origin: Position,
        destination: Position,
        trains: usize,
        config: SimConfig,
    ) -> Result<Self, SimError> {
        if trains == 0 {
            return Err(SimError::NoTrains);
        }
        for end in [origin, destination] {
            if !network.contains(end) {
                return Err(SimError::InvalidPosition(end));
            }
        }
        let origin = network.canonical(origin);
        let destination = network.canonical(destination);

        let mut occupancy = Occupancy::new(
            network,
            network.station_at(origin),
            network.station_at(destination),
        );
        let trains: Vec<Train> = (0..trains)
            .map(|id| {
                let mut train = Train::new(TrainId(id), origin);
                occupancy.place(network.station_at(origin), train.id());
                if origin == destination {
                    train.finish();
                }
                train
            })
            .collect();

        debug!(
            origin = %network.describe(origin),
            destination = %network.describe(destination),
            trains = trains.len(),
            "simulation ready"
        );

        Ok(Self {
            network,
            origin,
            destination,
            config,
            trains,
            occupancy,
            scratch: SearchScratch::new(network),
            tick: 0,
            idle: 0,
        })
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn destination(&self) -> Position {
        self.destination
    }

    pub fn config(&self) -> SimConfig {
        self.config
    }

    pub fn trains(&self) -> &[Train] {
        &self.trains
    }

    pub fn occupancy(&self) -> &Occupancy {
        &self.occupancy
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> usize {
        self.tick
    }

    pub fn is_finished(&self) -> bool {
        self.trains.iter().all(Train::is_done)
    }

    /// Replace the limits, typically after [`SimError::Stalled`].
    pub fn extend_budget(&mut self, config: SimConfig) {
        self.config = config;
    }

    /// Run until every train is done.
    ///
    /// Returns the number of ticks taken in total.
    ///
    /// # Errors
    ///
    /// [`SimError::Stalled`] when a limit in [`SimConfig`] is hit. The state
    /// is kept, so the run can be resumed after [`Simulation::extend_budget`].
    pub fn run(&mut self) -> Result<usize, SimError> {
        while !self.is_finished() {
            self.tick()?;
        }
        debug!(ticks = self.tick, "simulation finished");
        Ok(self.tick)
    }

    /// Advance every unfinished train by one tick.
    ///
    /// A finished simulation returns an empty report without advancing.
    ///
    /// # Errors
    ///
    /// [`SimError::Stalled`] if the tick budget is used up, or if this tick
    /// brings the run of ticks without progress up to the idle limit.
    pub fn tick(&mut self) -> Result<TickReport, SimError> {
        if self.is_finished() {
            return Ok(TickReport::new(self.tick));
        }
        if self.tick >= self.config.max_ticks {
            return Err(self.stalled());
        }

        self.tick += 1;
        let mut report = TickReport::new(self.tick);

        for i in 0..self.trains.len() {
            if self.trains[i].is_done() {
                continue;
            }
            self.trains[i].record();
            let id = self.trains[i].id();
            let at = self.trains[i].position();

            match self.choose(id, at) {
                Some(choice) => {
                    let step = self.apply(i, choice);
                    trace!(
                        tick = self.tick,
                        train = %id,
                        from = %self.network.describe(step.from),
                        to = %self.network.describe(step.to),
                        kind = ?step.kind,
                        "move"
                    );
                    report.moves.push(step);
                }
                None => {
                    self.trains[i].wait();
                    report.waiting.push(id);
                }
            }

            if self.trains[i].position() == self.destination {
                self.trains[i].finish();
                report.finished.push(id);
            }
        }

        if report.progressed() {
            self.idle = 0;
        } else {
            self.idle += 1;
            if !self.is_finished() && self.idle >= self.config.max_idle_ticks {
                return Err(self.stalled());
            }
        }

        debug!(
            tick = self.tick,
            moved = report.moves.len(),
            finished = report.finished.len(),
            waiting = report.waiting.len(),
            "tick"
        );
        Ok(report)
    }

    /// Trains reset to the origin with their explored path as a route, ready
    /// for [`super::Replay`].
    pub fn replay_trains(&self) -> Vec<Train> {
        self.trains
            .iter()
            .map(|train| {
                let mut fresh = Train::new(train.id(), self.origin);
                fresh.set_route(train.compacted_path().into_iter().skip(1));
                fresh
            })
            .collect()
    }

    fn stalled(&self) -> SimError {
        let pending: Vec<TrainId> = self
            .trains
            .iter()
            .filter(|t| !t.is_done())
            .map(Train::id)
            .collect();
        debug!(tick = self.tick, pending = pending.len(), "stalled");
        SimError::Stalled {
            tick: self.tick,
            pending,
        }
    }

    /// Whether a train may enter `station` from elsewhere.
    fn enterable(&self, station: StationId) -> bool {
        if station == self.occupancy.destination() {
            return true;
        }
        station != self.occupancy.origin() && !self.occupancy.is_occupied(station)
    }

    fn candidates(&self, at: Position) -> Vec<Position> {
        let here = self.network.station_at(at);
        let mut out: Vec<Position> = self
            .network
            .line_neighbors(at)
            .filter(|&next| {
                let station = self.network.station_at(next);
                station != here && self.enterable(station)
            })
            .collect();
        out.extend(self.network.interchange_frames(at));
        out
    }

    /// Route query towards the destination. A train that has left the
    /// origin station is never routed back through it, but one still
    /// standing there on another line's frame must be free to reframe onto
    /// the origin position.
    fn route_query(&self, from: Position) -> PathQuery {
        let query = PathQuery::new(from, self.destination);
        if self.network.station_at(from) == self.occupancy.origin() {
            query
        } else {
            query.excluding(self.origin)
        }
    }

    fn choose(&mut self, train: TrainId, at: Position) -> Option<Choice> {
        let candidates = self.candidates(at);

        match candidates.as_slice() {
            [] => None,
            [only] => Some(Choice {
                hop: *only,
                route: None,
            }),
            _ => {
                let query = self.route_query(at);
                let route = PathFinder::new(self.network)
                    .find_path(&mut self.scratch, &query)
                    .ok()?;
                let hop = route.get(1).copied()?;
                if !candidates.contains(&hop) {
                    trace!(train = %train, hop = %self.network.describe(hop), "hop blocked");
                    return None;
                }
                Some(Choice {
                    hop,
                    route: Some(route),
                })
            }
        }
    }

    fn apply(&mut self, index: usize, choice: Choice) -> Move {
        let train = &self.trains[index];
        let id = train.id();
        let from = train.position();

        if self.network.same_station(from, choice.hop) {
            self.trains[index].move_to(choice.hop);
            return Move {
                train: id,
                from,
                to: choice.hop,
                kind: MoveKind::Reframe,
            };
        }

        let to = self.arrival_frame(choice.hop, choice.route);
        self.occupancy.leave(self.network.station_at(from), id);
        self.occupancy.enter(self.network.station_at(to), id);
        self.trains[index].move_to(to);
        Move {
            train: id,
            from,
            to,
            kind: MoveKind::Travel,
        }
    }

    /// The frame a train should hold after arriving at `hop`.
    fn arrival_frame(&mut self, hop: Position, route: Option<Vec<Position>>) -> Position {
        let station = self.network.station_at(hop);
        if hop == self.destination || !self.network.station_by_id(station).is_interchange() {
            return hop;
        }

        let onward: Vec<Position> = match route {
            Some(route) => route.into_iter().skip(2).collect(),
            None => {
                let query = self.route_query(hop);
                match PathFinder::new(self.network).find_path(&mut self.scratch, &query) {
                    Ok(route) => route.into_iter().skip(1).collect(),
                    Err(_) => Vec::new(),
                }
            }
        };

        onward
            .into_iter()
            .take_while(|&next| self.network.station_at(next) == station)
            .last()
            .unwrap_or(hop)
    }
}
