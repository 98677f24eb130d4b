#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. The session submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then reports [`Event`] values describing what
//! actually happened. Systems read immutable views ([`DefenseView`],
//! [`ThreatView`], [`OccupancyView`]) and respond exclusively with new
//! command batches.

mod catalog;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::{
    Cadence, DefenseEffect, DefenseKind, LaneScope, Reach, TargetSelection, ThreatKind,
    UnknownName,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defence.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    /// Opens resolution of the turn indicated by the world's turn counter.
    BeginTurn,
    /// Closes the current turn and increments the world's turn counter.
    EndTurn,
    /// Requests placement of a defense on the provided tile.
    PlaceDefense {
        /// Type of defense to construct.
        kind: DefenseKind,
        /// Tile the defense should occupy.
        tile: TileCoord,
    },
    /// Requests removal of the defense occupying the provided tile.
    RemoveDefense {
        /// Tile whose defense should be removed.
        tile: TileCoord,
    },
    /// Lowers a threat's attention and resets its action budget for the turn.
    DistractThreat {
        /// Threat receiving the distraction.
        threat: ThreatId,
        /// Defense responsible for the distraction.
        source: DefenseId,
        /// Attention removed from the threat.
        amount: u32,
    },
    /// Places a lure token on an empty tile.
    DropLure {
        /// Defense that threw the lure.
        source: DefenseId,
        /// Tile receiving the lure.
        tile: TileCoord,
    },
    /// Adds resources to the shared ledger.
    CreditResources {
        /// Resource units to add.
        amount: u32,
        /// Generator responsible for the credit, or `None` for passive income.
        source: Option<DefenseId>,
    },
    /// Creates a new threat on the entrance tile of the provided lane.
    SpawnThreat {
        /// Type of threat to create.
        kind: ThreatKind,
        /// Lane whose entrance receives the threat.
        lane: u32,
    },
    /// Spends one movement attempt advancing a threat toward the exit.
    StepThreat {
        /// Threat attempting to advance.
        threat: ThreatId,
    },
    /// Spends one movement attempt moving a threat sideways into another lane.
    DodgeThreat {
        /// Threat attempting to dodge.
        threat: ThreatId,
        /// Lane the threat should move into at its current position.
        lane: u32,
    },
    /// Counts down one turn of a resting threat's rest period.
    RestThreat {
        /// Threat that is resting.
        threat: ThreatId,
    },
    /// Converts this turn's distractions into rest periods or neutralizations.
    SettleAttention,
    /// Removes destroyed defenses and neutralized threats from the world.
    Cleanup,
}

/// Events reported by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Event {
    /// Announces that a new turn began resolving.
    TurnStarted {
        /// Zero-based index of the turn being resolved.
        turn: u64,
    },
    /// Announces that a turn finished resolving without a defeat.
    TurnCompleted {
        /// Turn counter after the increment.
        turn: u64,
    },
    /// Confirms that a defense was placed.
    DefensePlaced {
        /// Identifier assigned to the defense.
        defense: DefenseId,
        /// Type of defense that was placed.
        kind: DefenseKind,
        /// Tile occupied by the defense.
        tile: TileCoord,
        /// Resources deducted from the ledger.
        cost: u32,
    },
    /// Reports that a placement request was rejected without mutating state.
    PlacementRejected {
        /// Type of defense requested.
        kind: DefenseKind,
        /// Tile provided in the request.
        tile: TileCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a defense was removed on request.
    DefenseRemoved {
        /// Identifier of the removed defense.
        defense: DefenseId,
        /// Type of the removed defense.
        kind: DefenseKind,
        /// Tile the defense occupied.
        tile: TileCoord,
    },
    /// Reports that a removal request was rejected.
    RemovalRejected {
        /// Tile provided in the request.
        tile: TileCoord,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Confirms that a threat was distracted.
    ThreatDistracted {
        /// Threat that was distracted.
        threat: ThreatId,
        /// Defense responsible, or `None` when a lure was collected.
        source: Option<DefenseId>,
        /// Attention remaining after the distraction.
        attention: u32,
    },
    /// Confirms that a lure was dropped onto a tile.
    LureDropped {
        /// Defense that threw the lure.
        source: DefenseId,
        /// Tile holding the lure.
        tile: TileCoord,
    },
    /// Reports that a threat stepped onto a lure and picked it up.
    LureCollected {
        /// Threat that collected the lure.
        threat: ThreatId,
        /// Tile the lure occupied.
        tile: TileCoord,
    },
    /// Confirms that resources were credited to the ledger.
    ResourcesCredited {
        /// Generator responsible, or `None` for passive income.
        source: Option<DefenseId>,
        /// Resource units added.
        amount: u32,
        /// Ledger balance after the credit.
        balance: u32,
    },
    /// Confirms that a threat entered the grid.
    ThreatSpawned {
        /// Identifier assigned to the threat.
        threat: ThreatId,
        /// Type of threat created.
        kind: ThreatKind,
        /// Entrance tile occupied by the threat.
        tile: TileCoord,
    },
    /// Confirms that a threat advanced one tile toward the exit.
    ThreatAdvanced {
        /// Threat that moved.
        threat: ThreatId,
        /// Tile occupied before the move.
        from: TileCoord,
        /// Tile occupied after the move.
        to: TileCoord,
    },
    /// Confirms that a threat sidestepped into an adjacent lane.
    ThreatDodged {
        /// Threat that moved.
        threat: ThreatId,
        /// Tile occupied before the dodge.
        from: TileCoord,
        /// Tile occupied after the dodge.
        to: TileCoord,
    },
    /// Reports that a threat spent an attempt waiting behind another threat.
    ThreatWaited {
        /// Threat that could not move.
        threat: ThreatId,
        /// Tile the threat remains on.
        tile: TileCoord,
    },
    /// Reports that a threat interacted with a defense blocking its path.
    DefenseStruck {
        /// Defense that absorbed the interaction.
        defense: DefenseId,
        /// Threat responsible for the interaction.
        threat: ThreatId,
        /// Durability remaining after the interaction.
        durability: u32,
    },
    /// Reports that a defense ran out of durability.
    DefenseDestroyed {
        /// Identifier of the destroyed defense.
        defense: DefenseId,
        /// Type of the destroyed defense.
        kind: DefenseKind,
        /// Tile the defense occupied.
        tile: TileCoord,
    },
    /// Reports one elapsed turn of a threat's rest period.
    ThreatResting {
        /// Threat that is resting.
        threat: ThreatId,
        /// Rest turns remaining after this one.
        remaining: u32,
    },
    /// Reports that a distracted threat began resting.
    ThreatPacified {
        /// Threat that began resting.
        threat: ThreatId,
        /// Number of turns the threat will rest.
        rest: u32,
    },
    /// Reports that a threat's attention was exhausted.
    ThreatNeutralized {
        /// Threat that was neutralized.
        threat: ThreatId,
        /// Tile the threat occupied.
        tile: TileCoord,
    },
    /// Reports that a threat reached the exit tile of its lane.
    ThreatReachedExit {
        /// Threat that reached the exit.
        threat: ThreatId,
        /// Exit tile now occupied by the threat.
        tile: TileCoord,
    },
}

/// Location of a single tile expressed as lane and position indices.
///
/// Position zero is the exit of the lane; the highest position is the entrance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    lane: u32,
    position: u32,
}

impl TileCoord {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(lane: u32, position: u32) -> Self {
        Self { lane, position }
    }

    /// Zero-based lane index of the tile.
    #[must_use]
    pub const fn lane(&self) -> u32 {
        self.lane
    }

    /// Zero-based position of the tile within its lane.
    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    /// Computes the Manhattan distance between two tiles.
    #[must_use]
    pub const fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.lane.abs_diff(other.lane) + self.position.abs_diff(other.position)
    }

    /// Neighbouring tile one step closer to the exit, if any.
    #[must_use]
    pub const fn toward_exit(self) -> Option<TileCoord> {
        match self.position.checked_sub(1) {
            Some(position) => Some(Self::new(self.lane, position)),
            None => None,
        }
    }

    /// Tile at the same position in another lane.
    #[must_use]
    pub const fn in_lane(self, lane: u32) -> TileCoord {
        Self::new(lane, self.position)
    }
}

/// Unique identifier assigned to a defense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenseId(u32);

impl DefenseId {
    /// Creates a new defense identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a threat. Identifiers grow in spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ThreatId(u32);

impl ThreatId {
    /// Creates a new threat identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Overall state of a game session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The game is still being played.
    #[default]
    InProgress,
    /// The defenses survived until the target turn.
    Victory,
    /// A threat reached the exit.
    Defeat,
}

impl Outcome {
    /// Reports whether the outcome ends the session.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Difficulty levels selectable when configuring a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Sparse standard threats only.
    #[default]
    Easy,
    /// Denser waves that include evasive threats.
    Medium,
    /// Dense waves with evasive and rapid threats.
    Hard,
}

impl Difficulty {
    /// Stable lowercase name used by configuration files and adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(UnknownName::new(value)),
        }
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// The requested tile lies outside the lane grid.
    #[error("tile lies outside the lane grid")]
    OutOfBounds,
    /// Lane entrances are reserved for arriving threats.
    #[error("lane entrances are reserved for arriving threats")]
    Entrance,
    /// The requested tile already holds a defense, threat or lure.
    #[error("tile is already occupied")]
    TileOccupied,
    /// The ledger cannot cover the defense's cost.
    #[error("placement needs {required} resources but only {available} are available")]
    InsufficientResources {
        /// Cost of the requested defense.
        required: u32,
        /// Ledger balance at the time of the request.
        available: u32,
    },
    /// The defense kind is not part of the session's roster.
    #[error("defense kind is not available in this session")]
    InvalidKind,
}

/// Reasons a removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// The requested tile lies outside the lane grid.
    #[error("tile lies outside the lane grid")]
    OutOfBounds,
    /// No defense occupies the requested tile.
    #[error("no defense occupies the tile")]
    NoDefense,
}

/// Errors produced by session-level commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum SessionError {
    /// The session already reached victory or defeat.
    #[error("the session has already ended")]
    AlreadyTerminal,
}

/// Occupants of a single tile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileOccupants {
    /// Defense placed on the tile, if any.
    pub defense: Option<DefenseId>,
    /// Threat standing on the tile, if any.
    pub threat: Option<ThreatId>,
    /// Indicates whether a lure lies on the tile.
    pub lure: bool,
}

impl TileOccupants {
    /// Reports whether the tile holds nothing at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.defense.is_none() && self.threat.is_none() && !self.lure
    }
}

/// Read-only view into the dense tile occupancy grid.
#[derive(Clone, Copy, Debug)]
pub struct OccupancyView<'a> {
    tiles: &'a [TileOccupants],
    lane_count: u32,
    lane_length: u32,
}

impl<'a> OccupancyView<'a> {
    /// Captures a new occupancy view backed by the provided lane-major slice.
    #[must_use]
    pub fn new(tiles: &'a [TileOccupants], lane_count: u32, lane_length: u32) -> Self {
        Self {
            tiles,
            lane_count,
            lane_length,
        }
    }

    /// Number of lanes on the grid.
    #[must_use]
    pub const fn lane_count(&self) -> u32 {
        self.lane_count
    }

    /// Number of tiles in each lane.
    #[must_use]
    pub const fn lane_length(&self) -> u32 {
        self.lane_length
    }

    /// Reports whether the tile lies inside the grid.
    #[must_use]
    pub const fn contains(&self, tile: TileCoord) -> bool {
        tile.lane() < self.lane_count && tile.position() < self.lane_length
    }

    /// Reports whether the position is the exit of its lane.
    #[must_use]
    pub const fn is_exit(&self, position: u32) -> bool {
        position == 0
    }

    /// Reports whether the position is the entrance of its lane.
    #[must_use]
    pub const fn is_entrance(&self, position: u32) -> bool {
        self.lane_length > 0 && position == self.lane_length - 1
    }

    /// Returns the occupants of the tile, or `None` when it lies outside the grid.
    #[must_use]
    pub fn occupants(&self, tile: TileCoord) -> Option<TileOccupants> {
        self.index(tile)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Iterates over every tile in lane-major order with its occupants.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, TileOccupants)> + 'a {
        let lane_length = self.lane_length;
        (0..self.lane_count)
            .flat_map(move |lane| {
                (0..lane_length).map(move |position| TileCoord::new(lane, position))
            })
            .zip(self.tiles.iter().copied())
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let lane = usize::try_from(tile.lane()).ok()?;
        let position = usize::try_from(tile.position()).ok()?;
        let width = usize::try_from(self.lane_length).ok()?;
        Some(lane * width + position)
    }
}

/// Immutable representation of a single defense used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefenseSnapshot {
    /// Identifier allocated to the defense by the world.
    pub id: DefenseId,
    /// Kind of defense that was placed.
    pub kind: DefenseKind,
    /// Tile occupied by the defense.
    pub tile: TileCoord,
    /// Interactions the defense can still absorb, or `None` when it never
    /// wears out.
    pub durability: Option<u32>,
    /// Turn counter value at the time of placement.
    pub placed_on: u64,
}

impl DefenseSnapshot {
    /// Reports whether the defense activates on the provided turn.
    #[must_use]
    pub const fn is_due(&self, turn: u64) -> bool {
        self.kind.cadence().is_due(self.placed_on, turn)
    }
}

/// Read-only snapshot describing all live defenses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefenseView {
    snapshots: Vec<DefenseSnapshot>,
}

impl DefenseView {
    /// Creates a new defense view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenseSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured defense snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenseSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenseSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single threat used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreatSnapshot {
    /// Identifier allocated to the threat by the world.
    pub id: ThreatId,
    /// Kind of threat.
    pub kind: ThreatKind,
    /// Tile occupied by the threat.
    pub tile: TileCoord,
    /// Attention remaining before the threat is neutralized.
    pub attention: u32,
    /// Turns of rest remaining; zero while the threat is active.
    pub rest_remaining: u32,
    /// Indicates whether the threat was distracted during the current turn.
    pub distracted: bool,
    /// Indicates whether the threat's attention is exhausted.
    pub neutralized: bool,
}

impl ThreatSnapshot {
    /// Reports whether the threat is serving a rest period.
    #[must_use]
    pub const fn is_resting(&self) -> bool {
        self.rest_remaining > 0
    }

    /// Reports whether defenses may select the threat as a target.
    #[must_use]
    pub const fn is_targetable(&self) -> bool {
        !self.is_resting() && !self.neutralized && self.attention > 0
    }
}

/// Read-only snapshot describing all threats on the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ThreatView {
    snapshots: Vec<ThreatSnapshot>,
}

impl ThreatView {
    /// Creates a new threat view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ThreatSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured threat snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &ThreatSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single threat by identifier.
    #[must_use]
    pub fn get(&self, threat: ThreatId) -> Option<&ThreatSnapshot> {
        self.snapshots
            .binary_search_by_key(&threat, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ThreatSnapshot> {
        self.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DefenseId, DefenseKind, Difficulty, Event, OccupancyView, PlacementError, RemovalError,
        ThreatId, ThreatKind, ThreatSnapshot, ThreatView, TileCoord, TileOccupants,
    };
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = TileCoord::new(1, 1);
        let destination = TileCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn exit_has_no_further_step() {
        assert_eq!(TileCoord::new(2, 0).toward_exit(), None);
        assert_eq!(
            TileCoord::new(2, 5).toward_exit(),
            Some(TileCoord::new(2, 4))
        );
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::InsufficientResources {
            required: 7,
            available: 5,
        });
        assert_round_trip(&RemovalError::NoDefense);
    }

    #[test]
    fn events_round_trip_through_bincode() {
        assert_round_trip(&Event::DefensePlaced {
            defense: DefenseId::new(3),
            kind: DefenseKind::PassiveZone,
            tile: TileCoord::new(1, 4),
            cost: 4,
        });
    }

    #[test]
    fn occupancy_view_reports_bounds_and_ends() {
        let mut tiles = vec![TileOccupants::default(); 2 * 4];
        tiles[5].threat = Some(ThreatId::new(9));
        let view = OccupancyView::new(&tiles, 2, 4);

        assert!(view.is_exit(0));
        assert!(view.is_entrance(3));
        assert!(!view.is_entrance(2));
        assert!(view.occupants(TileCoord::new(2, 0)).is_none());
        assert!(view.occupants(TileCoord::new(0, 4)).is_none());
        assert_eq!(
            view.occupants(TileCoord::new(1, 1)).and_then(|tile| tile.threat),
            Some(ThreatId::new(9))
        );

        let tagged: Vec<_> = view.iter().filter(|(_, tile)| !tile.is_empty()).collect();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].0, TileCoord::new(1, 1));
    }

    #[test]
    fn occupancy_view_iterates_lane_major() {
        let tiles = vec![TileOccupants::default(); 3 * 2];
        let view = OccupancyView::new(&tiles, 3, 2);
        let coords: Vec<_> = view
            .iter()
            .map(|(tile, _)| (tile.lane(), tile.position()))
            .collect();
        assert_eq!(coords, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 0), (2, 1)]);
    }

    #[test]
    fn threat_view_lookup_uses_spawn_order() {
        let snapshot = |id: u32| ThreatSnapshot {
            id: ThreatId::new(id),
            kind: ThreatKind::Standard,
            tile: TileCoord::new(0, 7),
            attention: 4,
            rest_remaining: 0,
            distracted: false,
            neutralized: false,
        };
        let view = ThreatView::from_snapshots(vec![snapshot(4), snapshot(1), snapshot(2)]);
        let order: Vec<_> = view.iter().map(|threat| threat.id.get()).collect();
        assert_eq!(order, vec![1, 2, 4]);
        assert!(view.get(ThreatId::new(2)).is_some());
        assert!(view.get(ThreatId::new(3)).is_none());
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert!("nightmare".parse::<Difficulty>().is_err());
    }
}
