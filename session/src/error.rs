//! Error types returned by the session surface.

use lane_defence_core::{PlacementError, RemovalError, SessionError};
use thiserror::Error;

/// Reasons a [`crate::SessionConfig`] cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// The grid needs at least one lane.
    #[error("the grid needs at least one lane")]
    NoLanes,
    /// Lanes need a distinct entrance and exit.
    #[error("lanes need at least two tiles, got {length}")]
    LaneTooShort {
        /// Configured lane length.
        length: u32,
    },
    /// The grid exceeds the supported dimensions.
    #[error("a {lane_count}x{lane_length} grid exceeds the {max_lanes}x{max_length} limit")]
    GridTooLarge {
        /// Configured number of lanes.
        lane_count: u32,
        /// Configured lane length.
        lane_length: u32,
        /// Largest accepted lane count.
        max_lanes: u32,
        /// Largest accepted lane length.
        max_length: u32,
    },
    /// The ledger could overflow before the survival target is reached.
    #[error("up to {potential} resources could accumulate, more than the ledger holds")]
    LedgerOverflow {
        /// Worst-case balance at the survival target.
        potential: u128,
    },
    /// A survival target of zero would end the game before it starts.
    #[error("the survival turn target must be positive")]
    ZeroSurvivalTarget,
    /// The player must be able to place at least one defense kind.
    #[error("no defense kinds are available")]
    EmptyRoster,
    /// A scripted spawn names a lane the grid does not have.
    #[error("scripted spawn names lane {lane} but the grid has {lane_count} lanes")]
    SpawnLaneOutOfRange {
        /// Lane named by the spawn.
        lane: u32,
        /// Number of lanes on the grid.
        lane_count: u32,
    },
}

/// Error returned by placement and removal commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum CommandError {
    /// The placement was rejected.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// The removal was rejected.
    #[error(transparent)]
    Removal(#[from] RemovalError),
    /// The session no longer accepts commands.
    #[error(transparent)]
    Session(#[from] SessionError),
}
