//! Network construction.

use tracing::trace;

use super::{Line, LineId, Network, NetworkError, Station, StationId};

/// Builds a [`Network`] one line at a time.
///
/// Stations are shared between lines by exact name. Every line is validated
/// as it is added; a rejected line leaves the builder exactly as it was.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    network: Network,
}

impl NetworkBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line made of the named stations, in order.
    ///
    /// Repeating the first station name at the end makes the line circular.
    ///
    /// # Errors
    ///
    /// - [`NetworkError::DuplicateLine`] if the name is taken
    /// - [`NetworkError::EmptyLine`] if `stations` is empty
    /// - [`NetworkError::DuplicateStation`] if a station repeats anywhere else
    pub fn add_line<I, S>(&mut self, name: &str, stations: I) -> Result<LineId, NetworkError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.network.line_index.contains_key(name) {
            return Err(NetworkError::DuplicateLine(name.to_string()));
        }

        let interned_before = self.network.stations.len();
        let ids: Vec<StationId> = stations
            .into_iter()
            .map(|station| self.intern(station.as_ref()))
            .collect();

        if ids.is_empty() {
            return Err(NetworkError::EmptyLine(name.to_string()));
        }

        let mut line = Line::new(name, ids);
        if let Err(err) = line.validate(&self.network.stations) {
            self.rollback(interned_before);
            return Err(err);
        }

        let line_id = LineId(self.network.lines.len());
        let stations = line.stations().to_vec();
        self.network.lines.push(line);
        self.network.line_index.insert(name.to_string(), line_id);

        for (index, station) in stations.into_iter().enumerate() {
            let existing: Vec<LineId> = self.network.stations[station.0].lines().collect();
            if !self.network.stations[station.0].join(line_id, index) {
                continue;
            }
            for other in existing {
                self.register_crossing(line_id, other, station);
            }
        }

        trace!(line = name, circular = self.network.lines[line_id.0].is_circular(), "line added");
        Ok(line_id)
    }

    /// Record that lines `a` and `b` share `station`, on both lines.
    ///
    /// Calling this again for the same triple changes nothing. `add_line`
    /// calls it whenever a station joins a second line.
    pub fn register_crossing(&mut self, a: LineId, b: LineId, station: StationId) {
        if a == b {
            return;
        }
        let name_a = self.network.lines[a.0].name().to_string();
        let name_b = self.network.lines[b.0].name().to_string();
        self.network.lines[a.0].register_crossing(&name_b, station);
        self.network.lines[b.0].register_crossing(&name_a, station);
    }

    /// Finish building.
    pub fn build(self) -> Network {
        self.network
    }

    fn intern(&mut self, name: &str) -> StationId {
        if let Some(id) = self.network.station_index.get(name) {
            return *id;
        }
        let id = StationId(self.network.stations.len());
        self.network.stations.push(Station::new(name));
        self.network.station_index.insert(name.to_string(), id);
        id
    }

    /// Forget stations interned by a rejected line.
    fn rollback(&mut self, interned_before: usize) {
        for station in self.network.stations.drain(interned_before..) {
            self.network.station_index.remove(station.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_names_become_one_station() {
        let mut builder = NetworkBuilder::new();
        builder.add_line("A", ["S1", "S2", "S3"]).unwrap();
        builder.add_line("B", ["S3", "S4"]).unwrap();
        let net = builder.build();

        assert_eq!(net.stations().len(), 4);
        let s3 = net.station_by_name("S3").unwrap();
        assert_eq!(s3.memberships(), &[(LineId(0), 2), (LineId(1), 0)]);
    }

    #[test]
    fn crossings_are_registered_on_both_lines() {
        let mut builder = NetworkBuilder::new();
        builder.add_line("A", ["S1", "S2", "S3"]).unwrap();
        builder.add_line("B", ["S3", "S4", "S1"]).unwrap();
        let net = builder.build();

        let s1 = net.station_id("S1").unwrap();
        let s3 = net.station_id("S3").unwrap();
        assert_eq!(net.line("A").unwrap().shared_with("B"), &[s3, s1]);
        assert_eq!(net.line("B").unwrap().shared_with("A"), &[s3, s1]);
    }

    #[test]
    fn register_crossing_is_idempotent() {
        let mut builder = NetworkBuilder::new();
        let a = builder.add_line("A", ["S1", "S2"]).unwrap();
        let b = builder.add_line("B", ["S2", "S3"]).unwrap();
        let s2 = StationId(1);
        builder.register_crossing(a, b, s2);
        builder.register_crossing(b, a, s2);
        let net = builder.build();

        assert_eq!(net.line("A").unwrap().shared_with("B"), &[s2]);
        assert_eq!(net.line("B").unwrap().shared_with("A"), &[s2]);
    }

    #[test]
    fn circular_line_does_not_cross_itself() {
        let mut builder = NetworkBuilder::new();
        builder.add_line("Loop", ["X", "Y", "Z", "X"]).unwrap();
        let net = builder.build();

        let line = net.line("Loop").unwrap();
        assert!(line.is_circular());
        assert!(line.crossings().is_empty());
        assert_eq!(net.station_by_name("X").unwrap().line_count(), 1);
    }

    #[test]
    fn rejected_line_leaves_builder_untouched() {
        let mut builder = NetworkBuilder::new();
        builder.add_line("A", ["S1", "S2"]).unwrap();
        let err = builder
            .add_line("Bad", ["S2", "New", "S2", "Other"])
            .unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateStation { .. }));

        let net = builder.build();
        assert_eq!(net.stations().len(), 2);
        assert!(net.station_by_name("New").is_none());
        assert!(net.line("Bad").is_err());
        assert_eq!(net.station_by_name("S2").unwrap().line_count(), 1);
    }

    #[test]
    fn duplicate_and_empty_lines_are_rejected() {
        let mut builder = NetworkBuilder::new();
        builder.add_line("A", ["S1"]).unwrap();
        assert_eq!(
            builder.add_line("A", ["S2"]),
            Err(NetworkError::DuplicateLine("A".into()))
        );
        assert_eq!(
            builder.add_line("E", Vec::<String>::new()),
            Err(NetworkError::EmptyLine("E".into()))
        );
    }
}
