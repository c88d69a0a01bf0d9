//! Station types.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::LineId;

/// Index of a station inside the [`Network`](super::Network) that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(pub usize);

/// A named stop, possibly served by several lines.
///
/// Identity is the name: two stations compare (and hash) equal exactly when
/// their names are equal, case-sensitively. Membership data does not take
/// part in equality.
///
/// # Examples
///
/// ```
/// use metro_sim::network::Network;
///
/// let mut builder = Network::builder();
/// builder.add_line("Red", ["Oval", "Bank"]).unwrap();
/// builder.add_line("Blue", ["Bank", "Angel"]).unwrap();
/// let network = builder.build();
///
/// let bank = network.station_by_name("Bank").unwrap();
/// assert!(bank.is_interchange());
/// assert_eq!(bank.line_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Station {
    name: String,
    /// (line, index on that line), first occurrence per line.
    memberships: Vec<(LineId, usize)>,
}

impl Station {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            memberships: Vec::new(),
        }
    }

    /// Returns the station name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns every (line, index) pair this station is served at.
    pub fn memberships(&self) -> &[(LineId, usize)] {
        &self.memberships
    }

    /// Returns the lines serving this station, in the order they were added.
    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.memberships.iter().map(|(line, _)| *line)
    }

    /// Number of lines crossing this station.
    pub fn line_count(&self) -> usize {
        self.memberships.len()
    }

    /// True when two or more lines serve this station.
    pub fn is_interchange(&self) -> bool {
        self.memberships.len() > 1
    }

    /// Index of this station on `line`, if the line serves it.
    ///
    /// A circular line lists its first station twice; the first index wins.
    pub fn index_on(&self, line: LineId) -> Option<usize> {
        self.memberships
            .iter()
            .find(|(l, _)| *l == line)
            .map(|(_, index)| *index)
    }

    /// Record that `line` serves this station at `index`.
    ///
    /// Returns false (and changes nothing) if the line is already recorded.
    pub(crate) fn join(&mut self, line: LineId, index: usize) -> bool {
        if self.index_on(line).is_some() {
            return false;
        }
        self.memberships.push((line, index));
        true
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_memberships() {
        let mut a = Station::new("Bank");
        let b = Station::new("Bank");
        a.join(LineId(0), 3);
        assert_eq!(a, b);
        assert_ne!(a, Station::new("bank"));
    }

    #[test]
    fn hash_consistent_with_eq() {
        let mut set = HashSet::new();
        let mut a = Station::new("Bank");
        a.join(LineId(2), 0);
        set.insert(a);
        assert!(set.contains(&Station::new("Bank")));
        assert!(!set.contains(&Station::new("Oval")));
    }

    #[test]
    fn join_is_idempotent_per_line() {
        let mut s = Station::new("Loop");
        assert!(s.join(LineId(0), 0));
        assert!(!s.join(LineId(0), 5));
        assert!(s.join(LineId(1), 2));

        assert_eq!(s.index_on(LineId(0)), Some(0));
        assert_eq!(s.index_on(LineId(1)), Some(2));
        assert_eq!(s.index_on(LineId(7)), None);
        assert_eq!(s.line_count(), 2);
        assert!(s.is_interchange());
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Station::new("Angel")), "Angel");
    }
}
