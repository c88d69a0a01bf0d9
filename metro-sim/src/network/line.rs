//! Line types.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use super::{NetworkError, Station, StationId};

/// Index of a line inside the [`Network`](super::Network) that minted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub usize);

/// An ordered run of stations.
///
/// # Invariants
///
/// - No station repeats, except that the first and last entries may be the
///   same station. That single case makes the line circular.
/// - `crossings` maps every other line sharing a station with this one to the
///   shared stations, in the order they were registered.
#[derive(Debug, Clone)]
pub struct Line {
    name: String,
    stations: Vec<StationId>,
    circular: bool,
    crossings: BTreeMap<String, Vec<StationId>>,
}

impl Line {
    pub(crate) fn new(name: impl Into<String>, stations: Vec<StationId>) -> Self {
        Self {
            name: name.into(),
            stations,
            circular: false,
            crossings: BTreeMap::new(),
        }
    }

    /// Returns the line name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stations in line order.
    ///
    /// For a circular line the first station is repeated at the end.
    pub fn stations(&self) -> &[StationId] {
        &self.stations
    }

    /// Station at `index`, if in range.
    pub fn station_at(&self, index: usize) -> Option<StationId> {
        self.stations.get(index).copied()
    }

    /// Number of entries, counting a circular line's closing entry.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// True if the line has no stations.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// True if the first and last entries are the same station.
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Number of distinct physical stops along the line.
    pub fn physical_len(&self) -> usize {
        if self.circular {
            self.stations.len() - 1
        } else {
            self.stations.len()
        }
    }

    /// Every other line sharing stations with this one.
    pub fn crossings(&self) -> &BTreeMap<String, Vec<StationId>> {
        &self.crossings
    }

    /// Stations shared with the line named `other`.
    pub fn shared_with(&self, other: &str) -> &[StationId] {
        self.crossings.get(other).map_or(&[], Vec::as_slice)
    }

    /// Check the duplicate-station invariant and set the circular flag.
    ///
    /// `stations` is the owning station table, used to name the offending
    /// station in the error.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::DuplicateStation`] if a station repeats
    /// anywhere other than as the (first, last) pair.
    pub fn validate(&mut self, stations: &[Station]) -> Result<bool, NetworkError> {
        match classify(&self.stations) {
            Ok(circular) => {
                self.circular = circular;
                Ok(circular)
            }
            Err((first, second)) => Err(NetworkError::DuplicateStation {
                line: self.name.clone(),
                station: stations
                    .get(self.stations[first].0)
                    .map(|s| s.name().to_string())
                    .unwrap_or_default(),
                first,
                second,
            }),
        }
    }

    /// Record that `station` is shared with the line named `other`.
    ///
    /// Registering the same pair twice has no effect.
    pub(crate) fn register_crossing(&mut self, other: &str, station: StationId) {
        let shared = self.crossings.entry(other.to_string()).or_default();
        if !shared.contains(&station) {
            shared.push(station);
        }
    }

    /// Canonical form of `index`: a circular line's closing entry folds onto 0.
    pub fn canonical_index(&self, index: usize) -> usize {
        if self.circular && index + 1 == self.stations.len() {
            0
        } else {
            index
        }
    }

    /// Indices one step either side of `index`, wrapping on circular lines.
    ///
    /// On a circular line the closing entry duplicates the first, so stepping
    /// back from index 0 lands on `len - 2` and stepping forward from the last
    /// index lands on 1. Results are canonical (never the closing entry) and
    /// never repeat: a two-stop loop yields its other stop once.
    pub fn neighbor_indices(&self, index: usize) -> [Option<usize>; 2] {
        let len = self.stations.len();
        if index >= len {
            return [None, None];
        }
        if self.circular {
            let period = len - 1;
            let index = index % period.max(1);
            match period {
                0 | 1 => [None, None],
                2 => [Some(1 - index), None],
                _ => [Some((index + period - 1) % period), Some((index + 1) % period)],
            }
        } else {
            let prev = index.checked_sub(1);
            let next = (index + 1 < len).then_some(index + 1);
            [prev, next]
        }
    }

    /// True if `a` and `b` are one physical stop apart on this line.
    pub fn adjacent(&self, a: usize, b: usize) -> bool {
        if !self.circular {
            return a.abs_diff(b) == 1;
        }
        let period = self.physical_len();
        if period < 2 {
            return false;
        }
        let diff = (a % period + period - b % period) % period;
        diff == 1 || diff == period - 1
    }
}

/// Classify a station sequence.
///
/// Returns `Ok(true)` if the only repeat is the first entry reappearing as the
/// last, `Ok(false)` if nothing repeats, and the two offending indices
/// otherwise.
pub(crate) fn classify<T: Eq + Hash>(items: &[T]) -> Result<bool, (usize, usize)> {
    let mut seen: HashMap<&T, usize> = HashMap::with_capacity(items.len());
    let last = items.len().saturating_sub(1);
    let mut circular = false;

    for (index, item) in items.iter().enumerate() {
        match seen.get(item).copied() {
            Some(0) if index == last => circular = true,
            Some(first) => return Err((first, index)),
            None => {
                seen.insert(item, index);
            }
        }
    }

    Ok(circular)
}
