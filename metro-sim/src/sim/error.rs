//! Simulation errors.

use crate::network::Position;

use super::TrainId;

/// Errors raised while setting up or advancing a simulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A simulation needs at least one train
    #[error("at least one train is required")]
    NoTrains,

    /// Origin, destination or a train position is not in the network
    #[error("position {0} is not in the network")]
    InvalidPosition(Position),

    /// A route step is neither a line step, a change of line, nor a move
    /// onto an interchange
    #[error("train {train}: cannot go from {from} to {to} in one tick")]
    InvalidRoute {
        train: TrainId,
        from: Position,
        to: Position,
    },

    /// No progress within the configured budget.
    ///
    /// The simulation state is left intact; raise the budget and keep
    /// ticking to continue.
    #[error("simulation stalled at tick {tick} with {} train(s) unfinished", .pending.len())]
    Stalled { tick: usize, pending: Vec<TrainId> },

    /// A replayed route ended away from the destination
    #[error("train {train} ran out of route at {at}")]
    RouteIncomplete { train: TrainId, at: Position },
}

impl SimError {
    /// True for [`SimError::Stalled`], the one error a caller may retry.
    pub fn is_stalled(&self) -> bool {
        matches!(self, SimError::Stalled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::LineId;

    #[test]
    fn error_display() {
        let err = SimError::NoTrains;
        assert_eq!(err.to_string(), "at least one train is required");

        let err = SimError::Stalled {
            tick: 12,
            pending: vec![TrainId(1), TrainId(4)],
        };
        assert_eq!(
            err.to_string(),
            "simulation stalled at tick 12 with 2 train(s) unfinished"
        );
        assert!(err.is_stalled());

        let err = SimError::RouteIncomplete {
            train: TrainId(3),
            at: Position::new(LineId(0), 2),
        };
        assert_eq!(err.to_string(), "train T3 ran out of route at L0:2");
        assert!(!err.is_stalled());
    }
}
