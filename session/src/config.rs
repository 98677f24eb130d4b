//! Session configuration and difficulty presets.

use lane_defence_core::{DefenseEffect, DefenseKind, Difficulty};
use lane_defence_system_spawning::SpawnSchedule;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Seed used when a configuration does not provide one.
pub const DEFAULT_SEED: u64 = 0x1a2e_d3f0_c47b_9e15;

/// Largest accepted number of lanes.
pub const MAX_LANES: u32 = 256;

/// Largest accepted lane length.
pub const MAX_LANE_LENGTH: u32 = 4096;

/// Everything required to construct a [`crate::Session`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Difficulty preset controlling spawns, evasion and rapid actions.
    pub difficulty: Difficulty,
    /// Turn counter value at which the defenders win.
    pub survival_turn_target: u64,
    /// Number of lanes on the grid.
    pub lane_count: u32,
    /// Number of tiles in each lane, entrance and exit included.
    pub lane_length: u32,
    /// Opening ledger balance.
    pub starting_resources: u32,
    /// Resources credited every turn regardless of generators.
    pub passive_income: u32,
    /// Seed for every stochastic decision of the session.
    pub seed: u64,
    /// Replaces the difficulty's spawn schedule when present.
    pub spawn_schedule: Option<SpawnSchedule>,
    /// Defense kinds the player may place.
    pub available_defenses: Vec<DefenseKind>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            survival_turn_target: 40,
            lane_count: 5,
            lane_length: 8,
            starting_resources: 8,
            passive_income: 1,
            seed: DEFAULT_SEED,
            spawn_schedule: None,
            available_defenses: DefenseKind::ALL.to_vec(),
        }
    }
}

impl SessionConfig {
    /// Checks the configuration for values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_count == 0 {
            return Err(ConfigError::NoLanes);
        }
        if self.lane_length < 2 {
            return Err(ConfigError::LaneTooShort {
                length: self.lane_length,
            });
        }
        if self.lane_count > MAX_LANES || self.lane_length > MAX_LANE_LENGTH {
            return Err(ConfigError::GridTooLarge {
                lane_count: self.lane_count,
                lane_length: self.lane_length,
                max_lanes: MAX_LANES,
                max_length: MAX_LANE_LENGTH,
            });
        }
        if self.survival_turn_target == 0 {
            return Err(ConfigError::ZeroSurvivalTarget);
        }
        if self.available_defenses.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        let potential = self.potential_balance();
        if potential > u128::from(u32::MAX) {
            return Err(ConfigError::LedgerOverflow { potential });
        }
        if let Some(lane) = self.schedule().highest_lane() {
            if lane >= self.lane_count {
                return Err(ConfigError::SpawnLaneOutOfRange {
                    lane,
                    lane_count: self.lane_count,
                });
            }
        }
        Ok(())
    }

    /// Upper bound on the balance reachable by the survival target.
    ///
    /// Assumes every placeable tile holds the richest available generator and
    /// that it pays out every turn without any spending.
    fn potential_balance(&self) -> u128 {
        let generated = self
            .available_defenses
            .iter()
            .filter_map(|kind| match kind.effect() {
                DefenseEffect::Generate { amount } => Some(amount),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        let placeable = u128::from(self.lane_count) * u128::from(self.lane_length - 1);
        let per_turn = u128::from(self.passive_income) + placeable * u128::from(generated);
        u128::from(self.starting_resources)
            .saturating_add(u128::from(self.survival_turn_target).saturating_mul(per_turn))
    }

    /// Spawn schedule in effect: the override when set, otherwise the preset.
    #[must_use]
    pub fn schedule(&self) -> SpawnSchedule {
        self.spawn_schedule
            .clone()
            .unwrap_or_else(|| SpawnSchedule::preset(self.difficulty))
    }

    /// Behaviour switches implied by the difficulty.
    #[must_use]
    pub fn rules(&self) -> DifficultyRules {
        DifficultyRules::preset(self.difficulty)
    }
}

/// Threat behaviour switches attached to a difficulty level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifficultyRules {
    /// Whether evasive threats may dodge.
    pub evasion_enabled: bool,
    /// Chance, in percent, that an evasive threat tries to dodge per attempt.
    pub dodge_chance_percent: u32,
    /// Whether rapid threats take their extra action.
    pub rapid_action_enabled: bool,
}

impl DifficultyRules {
    /// Rules associated with a difficulty level.
    #[must_use]
    pub const fn preset(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self {
                evasion_enabled: false,
                dodge_chance_percent: 0,
                rapid_action_enabled: false,
            },
            Difficulty::Medium => Self {
                evasion_enabled: true,
                dodge_chance_percent: 20,
                rapid_action_enabled: false,
            },
            Difficulty::Hard => Self {
                evasion_enabled: true,
                dodge_chance_percent: 35,
                rapid_action_enabled: true,
            },
        }
    }
}
