//! Which trains are standing at which station.

use crate::network::{Network, StationId};

use super::TrainId;

/// Occupant lists for every station.
///
/// The origin and destination are terminals and may hold any number of
/// trains. Every other station holds at most one.
#[derive(Debug, Clone)]
pub struct Occupancy {
    occupants: Vec<Vec<TrainId>>,
    origin: StationId,
    destination: StationId,
}

impl Occupancy {
    /// Empty occupancy for `network`.
    pub fn new(network: &Network, origin: StationId, destination: StationId) -> Self {
        Self {
            occupants: vec![Vec::new(); network.stations().len()],
            origin,
            destination,
        }
    }

    pub fn origin(&self) -> StationId {
        self.origin
    }

    pub fn destination(&self) -> StationId {
        self.destination
    }

    /// Trains at `station`, in arrival order.
    pub fn occupants(&self, station: StationId) -> &[TrainId] {
        self.occupants.get(station.0).map_or(&[], Vec::as_slice)
    }

    pub fn is_occupied(&self, station: StationId) -> bool {
        !self.occupants(station).is_empty()
    }

    pub fn is_terminal(&self, station: StationId) -> bool {
        station == self.origin || station == self.destination
    }

    /// Stations with at least one train, in station order.
    pub fn occupied(&self) -> impl Iterator<Item = (StationId, &[TrainId])> + '_ {
        self.occupants
            .iter()
            .enumerate()
            .filter(|(_, trains)| !trains.is_empty())
            .map(|(i, trains)| (StationId(i), trains.as_slice()))
    }

    /// Non-terminal stations holding more than one train. Always empty
    /// unless a caller broke the entry rules.
    pub fn overcrowded(&self) -> Vec<StationId> {
        self.occupied()
            .filter(|(station, trains)| !self.is_terminal(*station) && trains.len() > 1)
            .map(|(station, _)| station)
            .collect()
    }

    /// Put `train` at `station` without displacing anyone.
    pub(crate) fn place(&mut self, station: StationId, train: TrainId) {
        let here = &mut self.occupants[station.0];
        if !here.contains(&train) {
            here.push(train);
        }
    }

    /// Move `train` into `station`: queue at a terminal, otherwise become
    /// the sole occupant.
    pub(crate) fn enter(&mut self, station: StationId, train: TrainId) {
        if self.is_terminal(station) {
            self.place(station, train);
        } else {
            self.occupants[station.0] = vec![train];
        }
    }

    pub(crate) fn leave(&mut self, station: StationId, train: TrainId) {
        self.occupants[station.0].retain(|t| *t != train);
    }
}
