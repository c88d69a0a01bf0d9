//! Printable timetables.
//!
//! Converts a [`Timetable`] into plain serializable records with names
//! instead of ids, for JSON output or a compact text rendering.

use std::fmt;

use serde::Serialize;

use crate::network::{Network, Position};
use crate::sim::{Snapshot, Timetable};

/// A stop, by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopRef {
    /// Station name
    pub station: String,

    /// Line the train was on
    pub line: String,

    /// 1-based index on that line
    pub index: usize,
}

impl StopRef {
    pub fn new(network: &Network, position: Position) -> Self {
        Self {
            station: network
                .station_by_id(network.station_at(position))
                .name()
                .to_string(),
            line: network.line_by_id(position.line).name().to_string(),
            index: position.index + 1,
        }
    }
}

/// Every stop one train made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainRoute {
    pub train: usize,
    pub stops: Vec<StopRef>,
}

/// Trains at one station at the end of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationOccupancy {
    /// Station and the line frame of its first occupant
    pub stop: StopRef,

    /// Train ids in arrival order
    pub trains: Vec<usize>,
}

/// Occupied stations at the end of one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSnapshot {
    pub tick: usize,
    pub stations: Vec<StationOccupancy>,
}

/// Complete replay result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimetableReport {
    /// Ticks until the last train arrived
    pub cost: usize,
    pub trains: Vec<TrainRoute>,
    pub ticks: Vec<TickSnapshot>,
}

impl TimetableReport {
    pub fn new(network: &Network, timetable: &Timetable) -> Self {
        Self {
            cost: timetable.cost,
            trains: timetable
                .routes
                .iter()
                .map(|(id, stops)| TrainRoute {
                    train: id.0,
                    stops: stops.iter().map(|p| StopRef::new(network, *p)).collect(),
                })
                .collect(),
            ticks: timetable
                .snapshots
                .iter()
                .map(|snapshot| tick_snapshot(network, snapshot))
                .collect(),
        }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Only if serialization itself fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// One line per tick, `Station(Line:n)-T0T1|` for every occupied
    /// station, then the cost.
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimetableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tick in &self.ticks {
            for station in &tick.stations {
                let stop = &station.stop;
                write!(f, "{}({}:{})-", stop.station, stop.line, stop.index)?;
                for train in &station.trains {
                    write!(f, "T{train}")?;
                }
                f.write_str("|")?;
            }
            writeln!(f)?;
        }
        writeln!(f, "cost: {}", self.cost)
    }
}

fn tick_snapshot(network: &Network, snapshot: &Snapshot) -> TickSnapshot {
    TickSnapshot {
        tick: snapshot.tick,
        stations: snapshot
            .stations
            .iter()
            .map(|s| StationOccupancy {
                stop: StopRef::new(network, s.frame),
                trains: s.trains.iter().map(|t| t.0).collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Replay, SimConfig, Simulation};

    fn timetable(network: &Network) -> Timetable {
        let origin = network.position("A", 0).unwrap();
        let destination = network.position("B", 2).unwrap();
        let mut sim =
            Simulation::new(network, origin, destination, 2, SimConfig::default()).unwrap();
        sim.run().unwrap();
        Replay::new(
            network,
            origin,
            destination,
            sim.replay_trains(),
            SimConfig::default(),
        )
        .unwrap()
        .run()
        .unwrap()
    }

    fn network() -> Network {
        let mut builder = Network::builder();
        builder.add_line("A", ["S1", "S2", "S3"]).unwrap();
        builder.add_line("B", ["S3", "S4", "S5"]).unwrap();
        builder.build()
    }

    #[test]
    fn text_rendering() {
        let net = network();
        let report = TimetableReport::new(&net, &timetable(&net));

        let text = report.render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "S1(A:1)-T1|S2(A:2)-T0|");
        assert_eq!(lines[1], "S2(A:2)-T1|S3(B:1)-T0|");
        assert_eq!(lines[4], "S5(B:3)-T0T1|");
        assert_eq!(lines[5], "cost: 5");
    }

    #[test]
    fn display_writes_empty_ticks_and_cost() {
        let report = TimetableReport {
            cost: 2,
            trains: vec![],
            ticks: vec![
                TickSnapshot {
                    tick: 1,
                    stations: vec![StationOccupancy {
                        stop: StopRef {
                            station: "O".to_string(),
                            line: "A".to_string(),
                            index: 1,
                        },
                        trains: vec![0, 1],
                    }],
                },
                TickSnapshot {
                    tick: 2,
                    stations: vec![],
                },
            ],
        };

        assert_eq!(format!("{report}"), "O(A:1)-T0T1|\n\ncost: 2\n");
        assert_eq!(report.render_text(), report.to_string());
    }

    #[test]
    fn routes_use_names_and_one_based_indices() {
        let net = network();
        let report = TimetableReport::new(&net, &timetable(&net));

        assert_eq!(report.trains.len(), 2);
        assert_eq!(
            report.trains[0].stops[2],
            StopRef {
                station: "S3".to_string(),
                line: "B".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn json_shape() {
        let net = network();
        let report = TimetableReport::new(&net, &timetable(&net));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["cost"], 5);
        assert_eq!(json["trains"][1]["train"], 1);
        assert_eq!(json["ticks"][0]["stations"][1]["stop"]["station"], "S2");
        assert_eq!(json["ticks"][4]["stations"][0]["trains"][1], 1);
    }
}
