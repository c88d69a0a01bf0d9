//! Layered breadth-first route search.
//!
//! Finds a shortest route between two positions. The search walks whole
//! layers at a time (every position at distance `k` before any at `k + 1`),
//! then backtracks from the destination through the stored layers.
//!
//! A step is either one stop along a line or a change of line at an
//! interchange. Changing line costs a step even though the train does not
//! move, so a route through an interchange is one step longer than the
//! number of stations it passes.
//!
//! Each position joins the frontier at most once, and each station at most
//! once per line crossing it (see [`SearchScratch`]).

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::network::{Network, Position, StationId};

/// No route exists under the current expansion rules.
///
/// The simulation treats this as transient: the train waits and asks again
/// next tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no route from {from} to {to}")]
pub struct Unreachable {
    pub from: Position,
    pub to: Position,
}

/// A route query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathQuery {
    /// Where the route starts.
    pub from: Position,

    /// Where the route must end (this exact line frame).
    pub to: Position,

    /// A position that may never join the frontier, typically the
    /// simulation origin so trains are not routed back through it.
    pub exclude: Option<Position>,
}

impl PathQuery {
    /// Create a query with nothing excluded.
    pub fn new(from: Position, to: Position) -> Self {
        Self {
            from,
            to,
            exclude: None,
        }
    }

    /// Exclude `position` from expansion.
    pub fn excluding(mut self, position: Position) -> Self {
        self.exclude = Some(position);
        self
    }
}

/// Per-station visit counters used during one search.
///
/// A station may be entered once per line crossing it, which lets the search
/// fan out through every branch of an interchange without bouncing between
/// two lines forever. Counters are back to zero after every query, so one
/// value can be reused for any number of searches.
#[derive(Debug, Clone, Default)]
pub struct SearchScratch {
    over: Vec<u32>,
}

impl SearchScratch {
    /// Counters sized for `network`.
    pub fn new(network: &Network) -> Self {
        Self {
            over: vec![0; network.stations().len()],
        }
    }

    /// Current visit count for `station`.
    pub fn visits(&self, station: StationId) -> u32 {
        self.over.get(station.0).copied().unwrap_or(0)
    }

    /// True if every counter is zero.
    pub fn is_clear(&self) -> bool {
        self.over.iter().all(|&n| n == 0)
    }

    fn fit(&mut self, stations: usize) {
        if self.over.len() < stations {
            self.over.resize(stations, 0);
        }
    }

    fn bump(&mut self, station: StationId) {
        self.over[station.0] += 1;
    }

    fn reset(&mut self, station: StationId) {
        self.over[station.0] = 0;
    }
}

/// Shortest-route search over a network.
///
/// # Examples
///
/// ```
/// use metro_sim::network::Network;
/// use metro_sim::planner::{PathFinder, PathQuery, SearchScratch};
///
/// let mut builder = Network::builder();
/// builder.add_line("A", ["S1", "S2", "S3"]).unwrap();
/// builder.add_line("B", ["S3", "S4", "S5"]).unwrap();
/// let network = builder.build();
///
/// let from = network.position("A", 0).unwrap();
/// let to = network.position("B", 2).unwrap();
/// let mut scratch = SearchScratch::new(&network);
///
/// let path = PathFinder::new(&network)
///     .find_path(&mut scratch, &PathQuery::new(from, to))
///     .unwrap();
///
/// // S1, S2, S3 on A, S3 on B, S4, S5
/// assert_eq!(path.len(), 6);
/// assert!(scratch.is_clear());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'a> {
    network: &'a Network,
}

impl<'a> PathFinder<'a> {
    /// Create a path finder over `network`.
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    /// Find a shortest route, source and destination included.
    ///
    /// Ties are broken by expansion order, so the same network and query
    /// always give the same route.
    ///
    /// # Errors
    ///
    /// Returns [`Unreachable`] if either end is not in the network or no
    /// layer reaches the destination.
    pub fn find_path(
        &self,
        scratch: &mut SearchScratch,
        query: &PathQuery,
    ) -> Result<Vec<Position>, Unreachable> {
        let from = self.network.canonical(query.from);
        let to = self.network.canonical(query.to);
        let unreachable = Unreachable {
            from: query.from,
            to: query.to,
        };

        if !self.network.contains(from) || !self.network.contains(to) {
            return Err(unreachable);
        }
        if from == to {
            return Ok(vec![from]);
        }

        scratch.fit(self.network.stations().len());
        let (layers, found) = self.expand(scratch, from, to, query.exclude);

        for position in layers.iter().flatten() {
            scratch.reset(self.network.station_at(*position));
        }

        if !found {
            debug!(
                from = %self.network.describe(from),
                to = %self.network.describe(to),
                layers = layers.len(),
                "no route"
            );
            return Err(unreachable);
        }

        let path = self.backtrack(&layers, to);
        debug_assert_eq!(path.first(), Some(&from));
        Ok(path)
    }

    /// First step of a shortest route from `query.from`.
    ///
    /// When source and destination coincide the destination itself is
    /// returned.
    pub fn next_hop(
        &self,
        scratch: &mut SearchScratch,
        query: &PathQuery,
    ) -> Result<Position, Unreachable> {
        let path = self.find_path(scratch, query)?;
        Ok(path.get(1).copied().unwrap_or(query.to))
    }

    /// Grow layers until one contains `to` or nothing new can be reached.
    fn expand(
        &self,
        scratch: &mut SearchScratch,
        from: Position,
        to: Position,
        exclude: Option<Position>,
    ) -> (Vec<Vec<Position>>, bool) {
        let exclude = exclude.map(|p| self.network.canonical(p));
        scratch.bump(self.network.station_at(from));
        let mut layers = vec![vec![from]];
        let mut seen = HashSet::from([from]);

        loop {
            let frontier = &layers[layers.len() - 1];
            let mut next = Vec::new();

            for &position in frontier {
                let steps = self
                    .network
                    .line_neighbors(position)
                    .chain(self.network.interchange_frames(position));

                for step in steps {
                    if exclude == Some(step) || seen.contains(&step) {
                        continue;
                    }
                    let station = self.network.station_at(step);
                    let cap = self.network.crossing_count(station) as u32;
                    if scratch.visits(station) >= cap {
                        continue;
                    }
                    scratch.bump(station);
                    seen.insert(step);
                    next.push(step);
                }
            }

            if next.is_empty() {
                return (layers, false);
            }

            trace!(depth = layers.len(), width = next.len(), "search layer");
            let found = next.contains(&to);
            layers.push(next);
            if found {
                return (layers, true);
            }
        }
    }

    /// Walk back from `to` picking, in each earlier layer, the first
    /// position one step away from the current one.
    fn backtrack(&self, layers: &[Vec<Position>], to: Position) -> Vec<Position> {
        let mut path = vec![to];
        let mut current = to;

        for layer in layers[..layers.len() - 1].iter().rev() {
            if let Some(&previous) = layer.iter().find(|&&p| self.network.linked(p, current)) {
                path.push(previous);
                current = previous;
            }
        }

        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(lines: &[(&str, &[&str])]) -> Network {
        let mut builder = Network::builder();
        for (name, stations) in lines {
            builder.add_line(name, stations.iter().copied()).unwrap();
        }
        builder.build()
    }

    fn two_lines() -> Network {
        network(&[("A", &["S1", "S2", "S3"]), ("B", &["S3", "S4", "S5"])])
    }

    fn pos(net: &Network, line: &str, index: usize) -> Position {
        net.position(line, index).unwrap()
    }

    fn search(net: &Network, query: PathQuery) -> Result<Vec<Position>, Unreachable> {
        let mut scratch = SearchScratch::new(net);
        let result = PathFinder::new(net).find_path(&mut scratch, &query);
        assert!(scratch.is_clear(), "counters must be reset after a query");
        result
    }

    #[test]
    fn straight_line() {
        let net = network(&[("A", &["S1", "S2", "S3", "S4"])]);
        let path = search(&net, PathQuery::new(pos(&net, "A", 0), pos(&net, "A", 3))).unwrap();
        assert_eq!(
            path,
            (0..4).map(|i| pos(&net, "A", i)).collect::<Vec<_>>()
        );
    }

    #[test]
    fn backwards_along_a_line() {
        let net = network(&[("A", &["S1", "S2", "S3"])]);
        let path = search(&net, PathQuery::new(pos(&net, "A", 2), pos(&net, "A", 0))).unwrap();
        assert_eq!(path, vec![pos(&net, "A", 2), pos(&net, "A", 1), pos(&net, "A", 0)]);
    }

    #[test]
    fn interchange_costs_a_step() {
        let net = two_lines();
        let path = search(&net, PathQuery::new(pos(&net, "A", 0), pos(&net, "B", 2))).unwrap();
        assert_eq!(
            path,
            vec![
                pos(&net, "A", 0),
                pos(&net, "A", 1),
                pos(&net, "A", 2),
                pos(&net, "B", 0),
                pos(&net, "B", 1),
                pos(&net, "B", 2),
            ]
        );
        // Five steps, four physical moves.
        let moves = path
            .windows(2)
            .filter(|w| !net.same_station(w[0], w[1]))
            .count();
        assert_eq!(moves, 4);
    }

    #[test]
    fn circular_line_takes_the_short_way_round() {
        let net = network(&[("Loop", &["P0", "P1", "P2", "P3", "P4", "P5", "P0"])]);
        let path = search(&net, PathQuery::new(pos(&net, "Loop", 1), pos(&net, "Loop", 5))).unwrap();
        assert_eq!(
            path,
            vec![pos(&net, "Loop", 1), pos(&net, "Loop", 0), pos(&net, "Loop", 5)]
        );
    }

    #[test]
    fn circular_destination_given_as_closing_entry() {
        let net = network(&[("Loop", &["P0", "P1", "P2", "P3", "P0"])]);
        let to = Position::new(net.line_id("Loop").unwrap(), 4);
        let path = search(&net, PathQuery::new(pos(&net, "Loop", 3), to)).unwrap();
        assert_eq!(path, vec![pos(&net, "Loop", 3), pos(&net, "Loop", 0)]);
    }

    #[test]
    fn reaches_every_branch_of_an_interchange() {
        // Hub is crossed by three lines; the search must be able to leave it
        // along the third line after arriving on the first.
        let net = network(&[
            ("A", &["A1", "Hub", "A3"]),
            ("B", &["B1", "Hub", "B3"]),
            ("C", &["C1", "Hub", "C3"]),
        ]);
        let path = search(&net, PathQuery::new(pos(&net, "A", 0), pos(&net, "C", 2))).unwrap();
        assert_eq!(path.first(), Some(&pos(&net, "A", 0)));
        assert_eq!(path.last(), Some(&pos(&net, "C", 2)));
        assert_eq!(path[1..3], [pos(&net, "A", 1), pos(&net, "C", 1)]);
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn disconnected_destination_is_unreachable() {
        let net = network(&[("A", &["S1", "S2"]), ("B", &["S3", "S4"])]);
        let query = PathQuery::new(pos(&net, "A", 0), pos(&net, "B", 1));
        assert_eq!(
            search(&net, query),
            Err(Unreachable {
                from: query.from,
                to: query.to
            })
        );
    }

    #[test]
    fn excluded_position_blocks_the_only_route() {
        let net = network(&[("A", &["S1", "S2", "S3"])]);
        let query =
            PathQuery::new(pos(&net, "A", 0), pos(&net, "A", 2)).excluding(pos(&net, "A", 1));
        assert!(search(&net, query).is_err());
    }

    #[test]
    fn excluded_position_forces_a_detour() {
        let net = network(&[("Loop", &["P0", "P1", "P2", "P3", "P4", "P0"])]);
        let query = PathQuery::new(pos(&net, "Loop", 1), pos(&net, "Loop", 4))
            .excluding(pos(&net, "Loop", 0));
        let path = search(&net, query).unwrap();
        assert_eq!(path.len(), 4);
        assert_eq!(path[1], pos(&net, "Loop", 2));
    }

    #[test]
    fn same_source_and_destination() {
        let net = two_lines();
        let p = pos(&net, "A", 1);
        assert_eq!(search(&net, PathQuery::new(p, p)).unwrap(), vec![p]);
    }

    #[test]
    fn positions_outside_the_network_are_unreachable() {
        let net = two_lines();
        let bogus = Position::new(net.line_id("A").unwrap(), 10);
        assert!(search(&net, PathQuery::new(pos(&net, "A", 0), bogus)).is_err());
    }

    #[test]
    fn next_hop_is_first_step() {
        let net = two_lines();
        let mut scratch = SearchScratch::new(&net);
        let finder = PathFinder::new(&net);
        let hop = finder
            .next_hop(&mut scratch, &PathQuery::new(pos(&net, "A", 1), pos(&net, "B", 2)))
            .unwrap();
        assert_eq!(hop, pos(&net, "A", 2));

        let here = pos(&net, "B", 2);
        assert_eq!(
            finder.next_hop(&mut scratch, &PathQuery::new(here, here)),
            Ok(here)
        );
    }

    #[test]
    fn scratch_is_reusable_after_unreachable() {
        let net = network(&[("A", &["S1", "S2"]), ("B", &["S3", "S4"])]);
        let finder = PathFinder::new(&net);
        let mut scratch = SearchScratch::new(&net);

        let miss = PathQuery::new(pos(&net, "A", 0), pos(&net, "B", 0));
        assert!(finder.find_path(&mut scratch, &miss).is_err());
        assert!(scratch.is_clear());

        let hit = PathQuery::new(pos(&net, "A", 0), pos(&net, "A", 1));
        assert_eq!(finder.find_path(&mut scratch, &hit).unwrap().len(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, VecDeque};

    /// A small random network: a few lines drawn from a shared pool of
    /// station names, each a run of distinct stations.
    fn arb_network() -> impl Strategy<Value = Network> {
        proptest::collection::vec(
            proptest::sample::subsequence((0..8).collect::<Vec<u8>>(), 2..5).prop_shuffle(),
            1..4,
        )
        .prop_map(|lines| {
            let mut builder = Network::builder();
            for (i, stations) in lines.iter().enumerate() {
                let names: Vec<String> = stations.iter().map(|s| format!("S{s}")).collect();
                builder.add_line(&format!("L{i}"), names).unwrap();
            }
            builder.build()
        })
    }

    fn all_positions(net: &Network) -> Vec<Position> {
        net.lines()
            .iter()
            .enumerate()
            .flat_map(|(l, line)| {
                (0..line.len()).map(move |i| Position::new(crate::network::LineId(l), i))
            })
            .collect()
    }

    /// Plain BFS distance over the same step relation.
    fn reference_distance(net: &Network, from: Position, to: Position) -> Option<usize> {
        let mut dist = HashMap::from([(from, 0usize)]);
        let mut queue = VecDeque::from([from]);
        while let Some(p) = queue.pop_front() {
            let d = dist[&p];
            if p == to {
                return Some(d);
            }
            for q in net.line_neighbors(p).chain(net.interchange_frames(p)) {
                if !dist.contains_key(&q) {
                    dist.insert(q, d + 1);
                    queue.push_back(q);
                }
            }
        }
        None
    }

    proptest! {
        /// Same query, same answer.
        #[test]
        fn deterministic(net in arb_network(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
            let positions = all_positions(&net);
            let from = *a.get(&positions);
            let to = *b.get(&positions);
            let finder = PathFinder::new(&net);
            let mut scratch = SearchScratch::new(&net);

            let first = finder.find_path(&mut scratch, &PathQuery::new(from, to));
            let second = finder.find_path(&mut scratch, &PathQuery::new(from, to));
            prop_assert_eq!(first, second);
            prop_assert!(scratch.is_clear());
        }

        /// Returned routes are connected, start and end where asked, and are
        /// no longer than a plain BFS over the same steps.
        #[test]
        fn routes_are_valid_and_short(net in arb_network(), a in any::<prop::sample::Index>(), b in any::<prop::sample::Index>()) {
            let positions = all_positions(&net);
            let from = *a.get(&positions);
            let to = *b.get(&positions);
            let mut scratch = SearchScratch::new(&net);

            if let Ok(path) = PathFinder::new(&net).find_path(&mut scratch, &PathQuery::new(from, to)) {
                prop_assert_eq!(path.first(), Some(&from));
                prop_assert_eq!(path.last(), Some(&to));
                for w in path.windows(2) {
                    prop_assert!(net.linked(w[0], w[1]));
                }
                let shortest = reference_distance(&net, from, to);
                prop_assert_eq!(Some(path.len() - 1), shortest);
            }
        }
    }
}
