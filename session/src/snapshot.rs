//! Read-only projection of a session for adapters and persistence.

use lane_defence_core::{
    DefenseSnapshot, Difficulty, OccupancyView, Outcome, ThreatSnapshot, TileCoord,
    TileOccupants,
};
use lane_defence_world::{query, World};
use serde::{Deserialize, Serialize};

/// Complete, serializable state of a session at a point between turns.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Number of lanes on the grid.
    pub lane_count: u32,
    /// Number of tiles in each lane.
    pub lane_length: u32,
    /// Tile occupants in lane-major order.
    pub tiles: Vec<TileOccupants>,
    /// Standing defenses in identifier order.
    pub defenses: Vec<DefenseSnapshot>,
    /// Threats on the grid in spawn order.
    pub threats: Vec<ThreatSnapshot>,
    /// Ledger balance.
    pub balance: u32,
    /// Turn counter.
    pub turn: u64,
    /// Turn counter value that wins the game.
    pub survival_turn_target: u64,
    /// Difficulty the session was created with.
    pub difficulty: Difficulty,
    /// Current outcome.
    pub outcome: Outcome,
}

impl SessionSnapshot {
    pub(crate) fn capture(
        world: &World,
        difficulty: Difficulty,
        survival_turn_target: u64,
        outcome: Outcome,
    ) -> Self {
        let occupancy = query::occupancy_view(world);
        Self {
            lane_count: occupancy.lane_count(),
            lane_length: occupancy.lane_length(),
            tiles: occupancy.iter().map(|(_, occupants)| occupants).collect(),
            defenses: query::defense_view(world).into_vec(),
            threats: query::threat_view(world).into_vec(),
            balance: query::balance(world),
            turn: query::turn(world),
            survival_turn_target,
            difficulty,
            outcome,
        }
    }

    /// Occupancy view over the captured tiles.
    #[must_use]
    pub fn occupancy(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.tiles, self.lane_count, self.lane_length)
    }

    /// Tiles currently holding a lure.
    #[must_use]
    pub fn lures(&self) -> Vec<TileCoord> {
        self.occupancy()
            .iter()
            .filter(|(_, occupants)| occupants.lure)
            .map(|(tile, _)| tile)
            .collect()
    }

    /// Turns left until the survival target.
    #[must_use]
    pub fn turns_remaining(&self) -> u64 {
        self.survival_turn_target.saturating_sub(self.turn)
    }
}
