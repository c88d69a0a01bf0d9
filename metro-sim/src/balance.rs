//! Spread a fleet over precomputed routes.
//!
//! Each candidate route carries a running cost. Trains are handed out one at
//! a time to the cheapest route, whose cost then goes up, so later trains
//! drift onto the alternatives. This is a greedy heuristic, not an optimal
//! assignment.

use tracing::debug;

use crate::network::{Network, Position};
use crate::sim::{Train, TrainId};

/// A route a train may be given, with its running cost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePath {
    /// Every position on the route, starting at the shared origin.
    pub waypoints: Vec<Position>,
    pub cost: u32,
    /// Each assignment adds 2 to the cost instead of 1.
    pub extra_cost: bool,
}

impl CandidatePath {
    pub fn new(waypoints: Vec<Position>, cost: u32, extra_cost: bool) -> Self {
        Self {
            waypoints,
            cost,
            extra_cost,
        }
    }

    fn increment(&self) -> u32 {
        if self.extra_cost { 2 } else { 1 }
    }
}

/// Rejected balancer input. Nothing is assigned when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BalanceError {
    /// There is nothing to choose from
    #[error("no candidate paths")]
    NoCandidates,

    /// A candidate has no waypoints
    #[error("candidate {0} has no waypoints")]
    EmptyPath(usize),

    /// A waypoint is not a position in the network
    #[error("candidate {candidate}: waypoint {position} is not in the network")]
    UnknownWaypoint { candidate: usize, position: Position },

    /// Two consecutive waypoints are more than one tick apart
    #[error("candidate {candidate}: cannot go from {from} to {to} in one tick")]
    Disconnected {
        candidate: usize,
        from: Position,
        to: Position,
    },

    /// Candidates must all start at the same position
    #[error("candidate {0} does not start at the shared origin")]
    MismatchedOrigin(usize),

    /// A train is not standing at the shared origin
    #[error("train {0} is not at the shared origin")]
    TrainNotAtOrigin(TrainId),
}

/// Greedy route assignment.
///
/// # Examples
///
/// ```
/// use metro_sim::balance::{CandidatePath, PathBalancer};
/// use metro_sim::network::Network;
/// use metro_sim::sim::{Train, TrainId};
///
/// let mut builder = Network::builder();
/// builder.add_line("A", ["O", "X", "D"]).unwrap();
/// let network = builder.build();
/// let route: Vec<_> = (0..3).map(|i| network.position("A", i).unwrap()).collect();
///
/// let mut trains = vec![Train::new(TrainId(0), route[0])];
/// let mut candidates = vec![CandidatePath::new(route.clone(), 0, false)];
/// let picks = PathBalancer::new(&network)
///     .distribute(&mut candidates, &mut trains)
///     .unwrap();
///
/// assert_eq!(picks, vec![0]);
/// assert_eq!(candidates[0].cost, 1);
/// assert_eq!(trains[0].route().len(), 2);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathBalancer<'a> {
    network: &'a Network,
}

impl<'a> PathBalancer<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    /// Give each train, in order, the currently cheapest candidate.
    ///
    /// The train's route becomes the candidate's waypoints after the first,
    /// and the candidate's running cost goes up in place, so a later call
    /// with the same candidates carries on from where this one left off.
    /// Ties go to the earliest candidate. Returns the chosen candidate index
    /// per train.
    ///
    /// # Errors
    ///
    /// Any [`BalanceError`]. All input is checked before the first train or
    /// cost is touched.
    pub fn distribute(
        &self,
        candidates: &mut [CandidatePath],
        trains: &mut [Train],
    ) -> Result<Vec<usize>, BalanceError> {
        let origin = self.validate(candidates, trains)?;

        let mut picks = Vec::with_capacity(trains.len());
        for train in trains.iter_mut() {
            let Some((pick, _)) = candidates.iter().enumerate().min_by_key(|(_, c)| c.cost) else {
                return Err(BalanceError::NoCandidates);
            };
            let chosen = &mut candidates[pick];
            train.set_route(chosen.waypoints.iter().skip(1).copied());
            chosen.cost = chosen.cost.saturating_add(chosen.increment());
            picks.push(pick);
        }

        debug!(
            origin = %self.network.describe(origin),
            trains = picks.len(),
            candidates = candidates.len(),
            "distributed trains"
        );
        Ok(picks)
    }

    /// Check every candidate and train, returning the shared origin.
    fn validate(
        &self,
        candidates: &[CandidatePath],
        trains: &[Train],
    ) -> Result<Position, BalanceError> {
        let mut origin = None;

        for (candidate, path) in candidates.iter().enumerate() {
            let Some(&first) = path.waypoints.first() else {
                return Err(BalanceError::EmptyPath(candidate));
            };
            if let Some(&position) = path.waypoints.iter().find(|p| !self.network.contains(**p)) {
                return Err(BalanceError::UnknownWaypoint {
                    candidate,
                    position,
                });
            }
            if let Some(pair) = path
                .waypoints
                .windows(2)
                .find(|pair| !self.network.one_hop(pair[0], pair[1]))
            {
                return Err(BalanceError::Disconnected {
                    candidate,
                    from: pair[0],
                    to: pair[1],
                });
            }

            let first = self.network.canonical(first);
            match origin {
                None => origin = Some(first),
                Some(shared) if shared != first => {
                    return Err(BalanceError::MismatchedOrigin(candidate));
                }
                Some(_) => {}
            }
        }

        let origin = origin.ok_or(BalanceError::NoCandidates)?;
        if let Some(train) = trains
            .iter()
            .find(|t| self.network.canonical(t.position()) != origin)
        {
            return Err(BalanceError::TrainNotAtOrigin(train.id()));
        }
        Ok(origin)
    }
}
