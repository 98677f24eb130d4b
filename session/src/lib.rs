#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn engine and game session controller for Lane Defence.
//!
//! A [`Session`] owns the world, the seeded random sequence and every system.
//! Placement and removal commands mutate the world between turns, and
//! [`Session::advance_turn`] runs the fixed resolution pipeline: defense
//! actions, generation, threat actions, attention settlement, cleanup and
//! outcome evaluation.

mod config;
mod error;
pub mod replay;
mod snapshot;
mod summary;

use lane_defence_core::{
    Command, DefenseKind, DefenseSnapshot, Event, Outcome, PlacementError, SessionError,
    ThreatId, TileCoord, TileOccupants,
};
use lane_defence_system_defense_actions::DefenseActions;
use lane_defence_system_generation::{self as generation, Generation};
use lane_defence_system_spawning::Spawning;
use lane_defence_system_threat_movement::{DodgeCheck, MovementRules, ThreatMovement};
use lane_defence_world::{self as world, query, World};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use config::{DifficultyRules, SessionConfig, DEFAULT_SEED, MAX_LANES, MAX_LANE_LENGTH};
pub use error::{CommandError, ConfigError};
pub use snapshot::SessionSnapshot;
pub use summary::{Distraction, PlacementAck, RemovalAck, TurnSummary};

/// Upper bound, exclusive, of the percentile roll drawn for dodge checks.
const ROLL_RANGE: u32 = 100;

/// A single game from construction until victory or defeat.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    rules: DifficultyRules,
    world: World,
    rng: ChaCha8Rng,
    outcome: Outcome,
    defense_actions: DefenseActions,
    generation: Generation,
    movement: ThreatMovement,
    spawning: Spawning,
    events: Vec<Event>,
    commands: Vec<Command>,
    activations: Vec<DefenseSnapshot>,
}

impl Session {
    /// Creates a session and spawns the threats scheduled for turn zero.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rules = config.rules();
        let mut session = Self {
            world: World::new(
                config.lane_count,
                config.lane_length,
                config.starting_resources,
            ),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            outcome: Outcome::InProgress,
            defense_actions: DefenseActions::new(),
            generation: Generation::new(generation::Config::new(config.passive_income)),
            movement: ThreatMovement::new(MovementRules {
                evasion_enabled: rules.evasion_enabled,
                rapid_action_enabled: rules.rapid_action_enabled,
            }),
            spawning: Spawning::new(config.schedule()),
            events: Vec::new(),
            commands: Vec::new(),
            activations: Vec::new(),
            rules,
            config,
        };
        info!(
            difficulty = session.config.difficulty.name(),
            seed = session.config.seed,
            lanes = session.config.lane_count,
            "session started"
        );
        session.spawn_phase();
        Ok(session)
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Current turn counter.
    #[must_use]
    pub fn turn(&self) -> u64 {
        query::turn(&self.world)
    }

    /// Current ledger balance.
    #[must_use]
    pub fn balance(&self) -> u32 {
        query::balance(&self.world)
    }

    /// Banner adapters may greet players with.
    #[must_use]
    pub fn welcome_banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Occupants of a tile, or `None` when it lies outside the grid.
    #[must_use]
    pub fn occupants_at(&self, lane: u32, position: u32) -> Option<TileOccupants> {
        query::occupants_at(&self.world, TileCoord::new(lane, position))
    }

    /// Read-only projection of the grid, ledger, turn counter and outcome.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(
            &self.world,
            self.config.difficulty,
            self.config.survival_turn_target,
            self.outcome,
        )
    }

    /// Places a defense, deducting its cost from the ledger.
    pub fn place_defense(
        &mut self,
        lane: u32,
        position: u32,
        kind: DefenseKind,
    ) -> Result<PlacementAck, CommandError> {
        self.ensure_running()?;
        if !self.config.available_defenses.contains(&kind) {
            return Err(PlacementError::InvalidKind.into());
        }

        let tile = TileCoord::new(lane, position);
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::PlaceDefense { kind, tile },
            &mut events,
        );
        match events.as_slice() {
            [Event::DefensePlaced {
                defense, cost, ..
            }] => Ok(PlacementAck {
                defense: *defense,
                kind,
                tile,
                cost: *cost,
                balance: self.balance(),
            }),
            [Event::PlacementRejected { reason, .. }] => Err((*reason).into()),
            other => unreachable!("placement produced unexpected events: {other:?}"),
        }
    }

    /// Places a defense identified by its catalog name.
    pub fn place_defense_named(
        &mut self,
        lane: u32,
        position: u32,
        name: &str,
    ) -> Result<PlacementAck, CommandError> {
        self.ensure_running()?;
        let kind = name
            .parse::<DefenseKind>()
            .map_err(|_| PlacementError::InvalidKind)?;
        self.place_defense(lane, position, kind)
    }

    /// Removes the defense on a tile. The cost is not refunded.
    pub fn remove_defense(&mut self, lane: u32, position: u32) -> Result<RemovalAck, CommandError> {
        self.ensure_running()?;
        let tile = TileCoord::new(lane, position);
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::RemoveDefense { tile }, &mut events);
        match events.as_slice() {
            [Event::DefenseRemoved { defense, kind, .. }] => Ok(RemovalAck {
                defense: *defense,
                kind: *kind,
                tile,
            }),
            [Event::RemovalRejected { reason, .. }] => Err((*reason).into()),
            other => unreachable!("removal produced unexpected events: {other:?}"),
        }
    }

    /// Resolves one full turn.
    pub fn advance_turn(&mut self) -> Result<TurnSummary, SessionError> {
        if self.outcome.is_terminal() {
            return Err(SessionError::AlreadyTerminal);
        }

        self.events.clear();
        let turn = self.turn();
        self.apply(Command::BeginTurn);

        self.defense_phase(turn);
        self.generator_phase(turn);
        let at_exit = self.threat_phase();
        self.apply(Command::SettleAttention);
        self.apply(Command::Cleanup);
        self.evaluate_outcome(&at_exit);

        let events = std::mem::take(&mut self.events);
        Ok(TurnSummary::from_events(
            turn,
            events,
            self.balance(),
            self.outcome,
        ))
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.outcome.is_terminal() {
            Err(SessionError::AlreadyTerminal)
        } else {
            Ok(())
        }
    }

    fn apply(&mut self, command: Command) {
        world::apply(&mut self.world, command, &mut self.events);
    }

    fn apply_pending(&mut self) {
        let mut commands = std::mem::take(&mut self.commands);
        for command in commands.drain(..) {
            self.apply(command);
        }
        self.commands = commands;
    }

    fn defense_phase(&mut self, turn: u64) {
        let defenses = query::defense_view(&self.world);
        let mut activations = std::mem::take(&mut self.activations);
        self.defense_actions
            .activation_order(turn, &defenses, &mut activations);
        debug!(turn, activations = activations.len(), "defense phase");

        for defense in &activations {
            let threats = query::threat_view(&self.world);
            self.commands.clear();
            self.defense_actions.handle(
                defense,
                &threats,
                &query::occupancy_view(&self.world),
                &mut self.commands,
            );
            self.apply_pending();
        }
        self.activations = activations;
    }

    fn generator_phase(&mut self, turn: u64) {
        self.commands.clear();
        self.generation
            .handle(turn, &query::defense_view(&self.world), &mut self.commands);
        debug!(turn, credits = self.commands.len(), "generator phase");
        self.apply_pending();
    }

    /// Runs every threat's movement attempts and returns the threats that
    /// stand on an exit once the phase ends.
    fn threat_phase(&mut self) -> Vec<ThreatId> {
        let threats = query::threat_view(&self.world).into_vec();
        debug!(threats = threats.len(), "threat phase");

        for threat in &threats {
            self.commands.clear();
            self.movement.rest(threat, &mut self.commands);
            self.apply_pending();

            for _ in 0..self.movement.attempts(threat) {
                let Some(current) = query::threat_view(&self.world).get(threat.id).copied() else {
                    break;
                };
                let dodge = if self.movement.needs_roll(&current) {
                    Some(DodgeCheck {
                        roll: self.rng.gen_range(0..ROLL_RANGE),
                        chance_percent: self.rules.dodge_chance_percent,
                    })
                } else {
                    None
                };
                self.commands.clear();
                self.movement.handle(
                    &current,
                    &query::occupancy_view(&self.world),
                    dodge,
                    &mut self.commands,
                );
                if self.commands.is_empty() {
                    break;
                }
                self.apply_pending();
            }
        }

        query::threats_at_exit(&self.world)
    }

    fn evaluate_outcome(&mut self, at_exit: &[ThreatId]) {
        if !at_exit.is_empty() {
            self.outcome = Outcome::Defeat;
            info!(turn = self.turn(), threats = at_exit.len(), "defeat");
            return;
        }

        self.apply(Command::EndTurn);
        if self.turn() >= self.config.survival_turn_target {
            self.outcome = Outcome::Victory;
            info!(turn = self.turn(), "victory");
            return;
        }
        self.spawn_phase();
    }

    fn spawn_phase(&mut self) {
        let turn = self.turn();
        let free = query::free_entrances(&self.world);
        self.commands.clear();
        self.spawning
            .handle(turn, &free, &mut self.rng, &mut self.commands);
        debug!(
            turn,
            spawns = self.commands.len(),
            deferred = self.spawning.deferred(),
            "spawn phase"
        );
        self.apply_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{Difficulty, RemovalError, ThreatKind};
    use lane_defence_system_spawning::{ScheduledSpawn, SpawnSchedule};

    fn quiet_config() -> SessionConfig {
        SessionConfig {
            spawn_schedule: Some(SpawnSchedule::default()),
            ..SessionConfig::default()
        }
    }

    #[test]
    fn opening_spawns_happen_at_construction() {
        let session = Session::new(SessionConfig::default()).expect("valid config");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.threats.len(), 1);
        assert_eq!(snapshot.threats[0].tile.position(), 7);
        assert_eq!(snapshot.turn, 0);
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let error = Session::new(SessionConfig {
            lane_count: 0,
            ..SessionConfig::default()
        })
        .expect_err("no lanes");
        assert_eq!(error, ConfigError::NoLanes);
    }

    #[test]
    fn roster_limits_placeable_kinds() {
        let mut session = Session::new(SessionConfig {
            available_defenses: vec![DefenseKind::Thrower],
            ..quiet_config()
        })
        .expect("valid config");

        assert_eq!(
            session.place_defense(0, 2, DefenseKind::Barrier),
            Err(CommandError::Placement(PlacementError::InvalidKind))
        );
        assert_eq!(
            session.place_defense_named(0, 2, "catapult"),
            Err(CommandError::Placement(PlacementError::InvalidKind))
        );
        let ack = session
            .place_defense_named(0, 2, "thrower")
            .expect("thrower allowed");
        assert_eq!(ack.balance, 5);
    }

    #[test]
    fn removal_reports_missing_defense() {
        let mut session = Session::new(quiet_config()).expect("valid config");
        assert_eq!(
            session.remove_defense(1, 1),
            Err(CommandError::Removal(RemovalError::NoDefense))
        );
        let _ = session
            .place_defense(1, 1, DefenseKind::Generator)
            .expect("placed");
        let ack = session.remove_defense(1, 1).expect("removed");
        assert_eq!(ack.kind, DefenseKind::Generator);
        assert_eq!(session.balance(), 5);
    }

    #[test]
    fn passive_income_accrues_each_turn() {
        let mut session = Session::new(quiet_config()).expect("valid config");
        let summary = session.advance_turn().expect("turn resolves");
        assert_eq!(summary.credited, 1);
        assert_eq!(summary.balance, 9);
        assert_eq!(session.turn(), 1);
    }

    #[test]
    fn threat_reaching_exit_is_defeat() {
        let mut session = Session::new(SessionConfig {
            lane_count: 1,
            lane_length: 3,
            difficulty: Difficulty::Easy,
            spawn_schedule: Some(SpawnSchedule {
                scripted: vec![ScheduledSpawn {
                    turn: 0,
                    kind: ThreatKind::Standard,
                    lane: Some(0),
                }],
                wave: None,
            }),
            ..SessionConfig::default()
        })
        .expect("valid config");

        let first = session.advance_turn().expect("first turn");
        assert_eq!(first.outcome, Outcome::InProgress);
        let second = session.advance_turn().expect("second turn");
        assert_eq!(second.outcome, Outcome::Defeat);
        assert_eq!(second.reached_exit().len(), 1);
        assert_eq!(session.turn(), 1, "defeat does not advance the counter");
        assert_eq!(session.advance_turn(), Err(SessionError::AlreadyTerminal));
        assert_eq!(
            session.place_defense(0, 1, DefenseKind::Thrower),
            Err(CommandError::Session(SessionError::AlreadyTerminal))
        );
    }
}
