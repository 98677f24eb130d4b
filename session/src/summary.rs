//! Acknowledgements and per-turn summaries derived from world events.

use lane_defence_core::{DefenseId, DefenseKind, Event, Outcome, ThreatId, TileCoord};
use serde::{Deserialize, Serialize};

/// Confirmation of a successful placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementAck {
    /// Identifier assigned to the defense.
    pub defense: DefenseId,
    /// Kind of defense placed.
    pub kind: DefenseKind,
    /// Tile the defense occupies.
    pub tile: TileCoord,
    /// Resources deducted.
    pub cost: u32,
    /// Ledger balance after the deduction.
    pub balance: u32,
}

/// Confirmation of a successful removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemovalAck {
    /// Identifier of the removed defense.
    pub defense: DefenseId,
    /// Kind of the removed defense.
    pub kind: DefenseKind,
    /// Tile the defense occupied.
    pub tile: TileCoord,
}

/// One distraction applied during the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Distraction {
    /// Threat that was distracted.
    pub threat: ThreatId,
    /// Defense responsible, or `None` for a collected lure.
    pub source: Option<DefenseId>,
    /// Attention left after the distraction.
    pub attention: u32,
}

/// Everything that happened while resolving one turn.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TurnSummary {
    /// Index of the resolved turn.
    pub turn: u64,
    /// Distractions in the order they were applied.
    pub distractions: Vec<Distraction>,
    /// Tiles that received a lure.
    pub lures_dropped: Vec<TileCoord>,
    /// Resources credited by generators and passive income.
    pub credited: u32,
    /// Threats that advanced or dodged at least once.
    pub moved: Vec<ThreatId>,
    /// Threats whose attention was exhausted and were removed.
    pub neutralized: Vec<ThreatId>,
    /// Defenses destroyed by threat interactions.
    pub destroyed: Vec<DefenseId>,
    /// Threats that entered the grid after the turn.
    pub spawned: Vec<ThreatId>,
    /// Ledger balance after the turn.
    pub balance: u32,
    /// Outcome after the turn.
    pub outcome: Outcome,
    /// Raw world events in the order they occurred.
    pub events: Vec<Event>,
}

impl TurnSummary {
    pub(crate) fn from_events(turn: u64, events: Vec<Event>, balance: u32, outcome: Outcome) -> Self {
        let mut summary = Self {
            turn,
            distractions: Vec::new(),
            lures_dropped: Vec::new(),
            credited: 0,
            moved: Vec::new(),
            neutralized: Vec::new(),
            destroyed: Vec::new(),
            spawned: Vec::new(),
            balance,
            outcome,
            events: Vec::new(),
        };

        for event in &events {
            match *event {
                Event::ThreatDistracted {
                    threat,
                    source,
                    attention,
                } => summary.distractions.push(Distraction {
                    threat,
                    source,
                    attention,
                }),
                Event::LureDropped { tile, .. } => summary.lures_dropped.push(tile),
                Event::ResourcesCredited { amount, .. } => summary.credited += amount,
                Event::ThreatAdvanced { threat, .. } | Event::ThreatDodged { threat, .. } => {
                    if !summary.moved.contains(&threat) {
                        summary.moved.push(threat);
                    }
                }
                Event::ThreatNeutralized { threat, .. } => summary.neutralized.push(threat),
                Event::DefenseDestroyed { defense, .. } => summary.destroyed.push(defense),
                Event::ThreatSpawned { threat, .. } => summary.spawned.push(threat),
                _ => {}
            }
        }

        summary.events = events;
        summary
    }

    /// Threats that reached the exit during the turn.
    #[must_use]
    pub fn reached_exit(&self) -> Vec<ThreatId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::ThreatReachedExit { threat, .. } => Some(*threat),
                _ => None,
            })
            .collect()
    }
}
