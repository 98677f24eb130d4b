//! Static behaviour parameters for every defense and threat variant.
//!
//! Actor kinds are plain tags. Each accessor dispatches on the tag and
//! returns data, so adding a variant forces every match below (and every
//! system that matches on [`DefenseEffect`]) to be revisited.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Types of defense actors that can be placed on the lane grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseKind {
    /// Distracts the most advanced threat on a neighbouring tile of its lane.
    Distractor,
    /// Durable obstacle that absorbs several interactions before falling.
    Barrier,
    /// Produces resources on a two-turn cadence.
    Generator,
    /// Short-range distractor covering three tiles.
    Thrower,
    /// Distractor that covers its own lane and both neighbours.
    MultiLaneDistractor,
    /// Short-range distractor that drops a lure when nothing is in reach.
    PersistentThrower,
    /// Area effect distracting every threat within two tiles.
    PassiveZone,
}

impl DefenseKind {
    /// Every defense kind in catalog order.
    pub const ALL: [DefenseKind; 7] = [
        Self::Distractor,
        Self::Barrier,
        Self::Generator,
        Self::Thrower,
        Self::MultiLaneDistractor,
        Self::PersistentThrower,
        Self::PassiveZone,
    ];

    /// Resource units deducted from the ledger when the defense is placed.
    #[must_use]
    pub const fn cost(self) -> u32 {
        match self {
            Self::Distractor => 7,
            Self::Barrier => 4,
            Self::Generator => 3,
            Self::Thrower => 3,
            Self::MultiLaneDistractor => 12,
            Self::PersistentThrower => 5,
            Self::PassiveZone => 4,
        }
    }

    /// Number of threat interactions the defense survives before it is destroyed.
    ///
    /// `None` means the defense never wears out. Threats do not interact with
    /// such defenses and walk onto their tiles.
    #[must_use]
    pub const fn durability(self) -> Option<u32> {
        match self {
            Self::Barrier => Some(5),
            Self::Distractor
            | Self::Generator
            | Self::Thrower
            | Self::MultiLaneDistractor
            | Self::PersistentThrower
            | Self::PassiveZone => None,
        }
    }

    /// Reports whether threats stop at and strike this defense.
    #[must_use]
    pub const fn blocks_threats(self) -> bool {
        self.durability().is_some()
    }

    /// Targeting reach, or `None` for kinds that never target threats.
    #[must_use]
    pub const fn reach(self) -> Option<Reach> {
        match self {
            Self::Distractor => Some(Reach::Tiles(1)),
            Self::MultiLaneDistractor => Some(Reach::Lane),
            Self::Thrower | Self::PersistentThrower => Some(Reach::Tiles(3)),
            Self::PassiveZone => Some(Reach::Tiles(2)),
            Self::Barrier | Self::Generator => None,
        }
    }

    /// Lanes the defense may target relative to its own lane.
    #[must_use]
    pub const fn scope(self) -> LaneScope {
        match self {
            Self::MultiLaneDistractor => LaneScope::Adjacent,
            Self::PassiveZone => LaneScope::All,
            Self::Distractor
            | Self::Barrier
            | Self::Generator
            | Self::Thrower
            | Self::PersistentThrower => LaneScope::Single,
        }
    }

    /// How many of the prioritised targets a single activation affects.
    #[must_use]
    pub const fn selection(self) -> TargetSelection {
        match self {
            Self::MultiLaneDistractor => TargetSelection::NearestPerLane,
            Self::PassiveZone => TargetSelection::All,
            Self::Distractor
            | Self::Barrier
            | Self::Generator
            | Self::Thrower
            | Self::PersistentThrower => TargetSelection::Nearest,
        }
    }

    /// Turn cadence on which the defense activates.
    #[must_use]
    pub const fn cadence(self) -> Cadence {
        match self {
            Self::Generator => Cadence::every(2),
            Self::Distractor
            | Self::Barrier
            | Self::Thrower
            | Self::MultiLaneDistractor
            | Self::PersistentThrower
            | Self::PassiveZone => Cadence::every(1),
        }
    }

    /// Effect applied when the defense activates.
    #[must_use]
    pub const fn effect(self) -> DefenseEffect {
        match self {
            Self::Distractor | Self::Thrower | Self::MultiLaneDistractor => {
                DefenseEffect::Distract { amount: 1 }
            }
            Self::PersistentThrower => DefenseEffect::DistractOrLure { amount: 1 },
            Self::PassiveZone => DefenseEffect::Zone { amount: 1 },
            Self::Generator => DefenseEffect::Generate { amount: 1 },
            Self::Barrier => DefenseEffect::Obstruct,
        }
    }

    /// Stable lowercase name used by configuration files and adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Distractor => "distractor",
            Self::Barrier => "barrier",
            Self::Generator => "generator",
            Self::Thrower => "thrower",
            Self::MultiLaneDistractor => "multi_lane_distractor",
            Self::PersistentThrower => "persistent_thrower",
            Self::PassiveZone => "passive_zone",
        }
    }
}

impl FromStr for DefenseKind {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalised)
            .ok_or_else(|| UnknownName::new(value))
    }
}

/// Types of threat actors that advance along the lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatKind {
    /// Baseline threat with balanced attention and rest.
    Standard,
    /// Harder to distract and able to sidestep into a neighbouring lane.
    Evasive,
    /// Easily distracted but acts twice per turn.
    Rapid,
}

impl ThreatKind {
    /// Every threat kind in catalog order.
    pub const ALL: [ThreatKind; 3] = [Self::Standard, Self::Evasive, Self::Rapid];

    /// Distraction effects required to neutralize the threat.
    #[must_use]
    pub const fn attention_threshold(self) -> u32 {
        match self {
            Self::Standard => 4,
            Self::Evasive => 5,
            Self::Rapid => 3,
        }
    }

    /// Turns the threat stays disabled after a distraction.
    #[must_use]
    pub const fn rest_duration(self) -> u32 {
        match self {
            Self::Standard | Self::Evasive => 4,
            Self::Rapid => 6,
        }
    }

    /// Movement attempts per turn when rapid action is enabled.
    #[must_use]
    pub const fn actions_per_turn(self) -> u32 {
        match self {
            Self::Standard | Self::Evasive => 1,
            Self::Rapid => 2,
        }
    }

    /// Reports whether the threat may dodge into an adjacent lane.
    #[must_use]
    pub const fn is_evasive(self) -> bool {
        matches!(self, Self::Evasive)
    }

    /// Stable lowercase name used by configuration files and adapters.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Evasive => "evasive",
            Self::Rapid => "rapid",
        }
    }
}

impl FromStr for ThreatKind {
    type Err = UnknownName;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalised)
            .ok_or_else(|| UnknownName::new(value))
    }
}

/// Distance a targeting defense can reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reach {
    /// Every tile of every lane inside the defense's scope.
    Lane,
    /// Tiles within the given Manhattan distance.
    Tiles(u32),
}

impl Reach {
    /// Reports whether a target at `distance` tiles is inside the reach.
    #[must_use]
    pub const fn covers(self, distance: u32) -> bool {
        match self {
            Self::Lane => true,
            Self::Tiles(limit) => distance <= limit,
        }
    }
}

/// Lanes a defense considers relative to the lane it was placed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneScope {
    /// Only the defense's own lane.
    Single,
    /// The defense's own lane and the lanes directly above and below.
    Adjacent,
    /// Every lane on the grid.
    All,
}

impl LaneScope {
    /// Reports whether `threat_lane` is inside the scope of a defense in `defense_lane`.
    #[must_use]
    pub const fn covers(self, defense_lane: u32, threat_lane: u32) -> bool {
        match self {
            Self::Single => defense_lane == threat_lane,
            Self::Adjacent => defense_lane.abs_diff(threat_lane) <= 1,
            Self::All => true,
        }
    }
}

/// Number of prioritised targets affected by one activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSelection {
    /// Only the highest-priority target.
    Nearest,
    /// The highest-priority target of each covered lane.
    NearestPerLane,
    /// Every eligible target.
    All,
}

/// Activation cadence measured in turns since placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cadence(u32);

impl Cadence {
    /// Creates a cadence firing on every `period`-th activation. Zero acts as one.
    #[must_use]
    pub const fn every(period: u32) -> Self {
        if period == 0 {
            Self(1)
        } else {
            Self(period)
        }
    }

    /// Number of turns between activations.
    #[must_use]
    pub const fn period(self) -> u32 {
        self.0
    }

    /// Reports whether a defense placed on turn `placed_on` activates on `turn`.
    ///
    /// The placement turn counts as the first activation, so a period of two
    /// fires on the second turn after placement and every other turn after that.
    #[must_use]
    pub const fn is_due(self, placed_on: u64, turn: u64) -> bool {
        if turn < placed_on {
            return false;
        }
        let activation = turn - placed_on + 1;
        activation % self.0 as u64 == 0
    }
}

/// Effect a defense applies when its cadence fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseEffect {
    /// Lowers the attention of the selected targets.
    Distract {
        /// Attention removed from each target.
        amount: u32,
    },
    /// Distracts the nearest target, or drops a lure when none is in reach.
    DistractOrLure {
        /// Attention removed from the target or from whoever collects the lure.
        amount: u32,
    },
    /// Distracts every eligible target within the zone.
    Zone {
        /// Attention removed from each target.
        amount: u32,
    },
    /// Adds resources to the shared ledger.
    Generate {
        /// Resource units credited per activation.
        amount: u32,
    },
    /// Takes no action; only blocks threats.
    Obstruct,
}

/// Error returned when parsing an unrecognised kind name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unrecognised name `{name}`")]
pub struct UnknownName {
    name: String,
}

impl UnknownName {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    /// Name that failed to parse.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}
