#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Lane Defence.

mod defenses;
mod grid;
mod ledger;
mod threats;

use lane_defence_core::{
    Command, DefenseId, DefenseKind, Event, PlacementError, RemovalError, ThreatId, ThreatKind,
    TileCoord, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

use defenses::{DefenseRegistry, DefenseState};
use grid::LaneGrid;
use threats::ThreatRoster;

pub use ledger::{InsufficientResources, ResourceLedger};

/// Attention removed from a threat that picks up a lure.
const LURE_DISTRACTION: u32 = 1;

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: LaneGrid,
    ledger: ResourceLedger,
    defenses: DefenseRegistry,
    threats: ThreatRoster,
    turn: u64,
}

impl World {
    /// Creates an empty world with the provided lane layout and opening balance.
    ///
    /// # Panics
    ///
    /// Panics when the layout has no lanes or lanes shorter than two tiles.
    #[must_use]
    pub fn new(lane_count: u32, lane_length: u32, starting_resources: u32) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: LaneGrid::new(lane_count, lane_length),
            ledger: ResourceLedger::new(starting_resources),
            defenses: DefenseRegistry::new(),
            threats: ThreatRoster::new(),
            turn: 0,
        }
    }

    fn place_defense(&mut self, kind: DefenseKind, tile: TileCoord, out_events: &mut Vec<Event>) {
        match self.try_place(kind, tile) {
            Ok(defense) => out_events.push(Event::DefensePlaced {
                defense,
                kind,
                tile,
                cost: kind.cost(),
            }),
            Err(reason) => {
                debug!(?kind, ?tile, %reason, "placement rejected");
                out_events.push(Event::PlacementRejected { kind, tile, reason });
            }
        }
    }

    fn try_place(&mut self, kind: DefenseKind, tile: TileCoord) -> Result<DefenseId, PlacementError> {
        if !self.grid.contains(tile) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.grid.is_entrance(tile) {
            return Err(PlacementError::Entrance);
        }
        if !self.grid.occupants(tile).is_empty() {
            return Err(PlacementError::TileOccupied);
        }
        let _ = self.ledger.debit(kind.cost())?;
        let defense = self.defenses.insert(kind, tile, self.turn);
        self.grid.set_defense(tile, Some(defense));
        Ok(defense)
    }

    fn remove_defense(&mut self, tile: TileCoord, out_events: &mut Vec<Event>) {
        match self.try_remove(tile) {
            Ok(removed) => out_events.push(Event::DefenseRemoved {
                defense: removed.id,
                kind: removed.kind,
                tile,
            }),
            Err(reason) => {
                debug!(?tile, %reason, "removal rejected");
                out_events.push(Event::RemovalRejected { tile, reason });
            }
        }
    }

    fn try_remove(&mut self, tile: TileCoord) -> Result<DefenseState, RemovalError> {
        if !self.grid.contains(tile) {
            return Err(RemovalError::OutOfBounds);
        }
        let defense = self
            .grid
            .occupants(tile)
            .defense
            .ok_or(RemovalError::NoDefense)?;
        let removed = self.defenses.remove(defense).ok_or(RemovalError::NoDefense)?;
        self.grid.set_defense(tile, None);
        Ok(removed)
    }

    fn distract_threat(
        &mut self,
        threat: ThreatId,
        source: Option<DefenseId>,
        amount: u32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.threats.get_mut(threat) else {
            warn!(threat = threat.get(), "distraction names an unknown threat");
            return;
        };
        if source.is_some() && !state.snapshot().is_targetable() {
            debug!(threat = threat.get(), "distraction ignored for untargetable threat");
            return;
        }
        let attention = state.distract(amount);
        out_events.push(Event::ThreatDistracted {
            threat,
            source,
            attention,
        });
    }

    fn drop_lure(&mut self, source: DefenseId, tile: TileCoord, out_events: &mut Vec<Event>) {
        if self.defenses.get(source).map_or(true, DefenseState::is_destroyed) {
            warn!(defense = source.get(), "lure thrown by an unknown defense");
            return;
        }
        if !self.grid.contains(tile)
            || self.grid.is_entrance(tile)
            || !self.grid.occupants(tile).is_empty()
        {
            debug!(?tile, "lure tile unavailable");
            return;
        }
        self.grid.set_lure(tile, true);
        out_events.push(Event::LureDropped { source, tile });
    }

    fn credit_resources(
        &mut self,
        amount: u32,
        source: Option<DefenseId>,
        out_events: &mut Vec<Event>,
    ) {
        let balance = self.ledger.credit(amount);
        out_events.push(Event::ResourcesCredited {
            source,
            amount,
            balance,
        });
    }

    fn spawn_threat(&mut self, kind: ThreatKind, lane: u32, out_events: &mut Vec<Event>) {
        if lane >= self.grid.lane_count() {
            warn!(lane, "spawn names a lane outside the grid");
            return;
        }
        let tile = self.grid.entrance(lane);
        if self.grid.occupants(tile).threat.is_some() {
            warn!(lane, "spawn entrance is blocked");
            return;
        }
        let threat = self.threats.spawn(kind, tile);
        self.grid.set_threat(tile, Some(threat));
        info!(threat = threat.get(), ?kind, lane, turn = self.turn, "threat spawned");
        out_events.push(Event::ThreatSpawned { threat, kind, tile });
    }

    fn step_threat(&mut self, threat: ThreatId, out_events: &mut Vec<Event>) {
        let Some(state) = self.threats.get(threat) else {
            warn!(threat = threat.get(), "step names an unknown threat");
            return;
        };
        if !state.can_act() {
            debug!(threat = threat.get(), "threat cannot act this turn");
            return;
        }
        let from = state.tile;
        let Some(to) = from.toward_exit() else {
            return;
        };

        let occupants = self.grid.occupants(to);
        if let Some(defense) = occupants.defense.filter(|&id| self.blocks(id)) {
            self.strike(defense, threat, out_events);
            return;
        }
        if occupants.threat.is_some() {
            out_events.push(Event::ThreatWaited {
                threat,
                tile: from,
            });
            return;
        }

        self.relocate(threat, from, to);
        out_events.push(Event::ThreatAdvanced { threat, from, to });
        self.collect_lure(threat, to, out_events);

        if to.position() == 0 {
            info!(threat = threat.get(), lane = to.lane(), "threat reached the exit");
            out_events.push(Event::ThreatReachedExit { threat, tile: to });
        }
    }

    fn dodge_threat(&mut self, threat: ThreatId, lane: u32, out_events: &mut Vec<Event>) {
        let Some(state) = self.threats.get(threat) else {
            warn!(threat = threat.get(), "dodge names an unknown threat");
            return;
        };
        if !state.can_act() {
            debug!(threat = threat.get(), "threat cannot act this turn");
            return;
        }
        let from = state.tile;
        let to = from.in_lane(lane);
        let occupants = self.grid.occupants(to);
        if from.lane().abs_diff(lane) != 1
            || !self.grid.contains(to)
            || occupants.defense.is_some()
            || occupants.threat.is_some()
        {
            debug!(threat = threat.get(), lane, "dodge target unavailable");
            return;
        }

        self.relocate(threat, from, to);
        out_events.push(Event::ThreatDodged { threat, from, to });
        self.collect_lure(threat, to, out_events);
    }

    fn rest_threat(&mut self, threat: ThreatId, out_events: &mut Vec<Event>) {
        let Some(state) = self.threats.get_mut(threat) else {
            warn!(threat = threat.get(), "rest names an unknown threat");
            return;
        };
        if state.rest_remaining == 0 {
            return;
        }
        state.rest_remaining -= 1;
        out_events.push(Event::ThreatResting {
            threat,
            remaining: state.rest_remaining,
        });
    }

    fn settle_attention(&mut self, out_events: &mut Vec<Event>) {
        for threat in self.threats.iter_mut().filter(|threat| threat.distracted) {
            threat.distracted = false;
            if threat.attention == 0 {
                threat.neutralized = true;
                info!(threat = threat.id.get(), "threat neutralized");
                out_events.push(Event::ThreatNeutralized {
                    threat: threat.id,
                    tile: threat.tile,
                });
            } else {
                threat.rest_remaining = threat.kind.rest_duration();
                out_events.push(Event::ThreatPacified {
                    threat: threat.id,
                    rest: threat.rest_remaining,
                });
            }
        }
    }

    fn cleanup(&mut self) {
        let neutralized = self.threats.take_neutralized();
        for threat in &neutralized {
            self.grid.set_threat(threat.tile, None);
        }
        let destroyed = self.defenses.purge_destroyed();
        debug!(
            threats = neutralized.len(),
            defenses = destroyed,
            "cleanup removed actors"
        );
    }

    /// Reports whether the defense stops threats from entering its tile.
    fn blocks(&self, defense: DefenseId) -> bool {
        self.defenses
            .get(defense)
            .is_some_and(|state| state.kind.blocks_threats())
    }

    fn strike(&mut self, defense: DefenseId, threat: ThreatId, out_events: &mut Vec<Event>) {
        let Some(state) = self.defenses.get_mut(defense) else {
            panic!("grid references unknown defense {defense:?}");
        };
        let Some(remaining) = state.durability.as_mut() else {
            panic!("defense {defense:?} cannot be struck");
        };
        assert!(*remaining > 0, "destroyed defense {defense:?} left on grid");
        *remaining -= 1;
        out_events.push(Event::DefenseStruck {
            defense,
            threat,
            durability: *remaining,
        });
        if state.is_destroyed() {
            let (kind, tile) = (state.kind, state.tile);
            self.grid.set_defense(tile, None);
            info!(defense = defense.get(), ?kind, ?tile, "defense destroyed");
            out_events.push(Event::DefenseDestroyed {
                defense,
                kind,
                tile,
            });
        }
    }

    fn relocate(&mut self, threat: ThreatId, from: TileCoord, to: TileCoord) {
        self.grid.set_threat(from, None);
        self.grid.set_threat(to, Some(threat));
        if let Some(state) = self.threats.get_mut(threat) {
            state.tile = to;
        }
    }

    fn collect_lure(&mut self, threat: ThreatId, tile: TileCoord, out_events: &mut Vec<Event>) {
        if !self.grid.occupants(tile).lure {
            return;
        }
        self.grid.set_lure(tile, false);
        out_events.push(Event::LureCollected { threat, tile });
        self.distract_threat(threat, None, LURE_DISTRACTION, out_events);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::BeginTurn => {
            debug!(turn = world.turn, "turn started");
            out_events.push(Event::TurnStarted { turn: world.turn });
        }
        Command::EndTurn => {
            world.turn += 1;
            out_events.push(Event::TurnCompleted { turn: world.turn });
        }
        Command::PlaceDefense { kind, tile } => world.place_defense(kind, tile, out_events),
        Command::RemoveDefense { tile } => world.remove_defense(tile, out_events),
        Command::DistractThreat {
            threat,
            source,
            amount,
        } => world.distract_threat(threat, Some(source), amount, out_events),
        Command::DropLure { source, tile } => world.drop_lure(source, tile, out_events),
        Command::CreditResources { amount, source } => {
            world.credit_resources(amount, source, out_events);
        }
        Command::SpawnThreat { kind, lane } => world.spawn_threat(kind, lane, out_events),
        Command::StepThreat { threat } => world.step_threat(threat, out_events),
        Command::DodgeThreat { threat, lane } => world.dodge_threat(threat, lane, out_events),
        Command::RestThreat { threat } => world.rest_threat(threat, out_events),
        Command::SettleAttention => world.settle_attention(out_events),
        Command::Cleanup => world.cleanup(),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use lane_defence_core::{
        DefenseView, OccupancyView, ThreatId, ThreatView, TileCoord, TileOccupants,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Turn counter; the index of the next turn to resolve.
    #[must_use]
    pub fn turn(world: &World) -> u64 {
        world.turn
    }

    /// Current resource ledger balance.
    #[must_use]
    pub fn balance(world: &World) -> u32 {
        world.ledger.balance()
    }

    /// Exposes a read-only view of the dense occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        world.grid.view()
    }

    /// Occupants of a tile, or `None` when it lies outside the grid.
    #[must_use]
    pub fn occupants_at(world: &World, tile: TileCoord) -> Option<TileOccupants> {
        world.grid.view().occupants(tile)
    }

    /// Captures a read-only view of every standing defense.
    #[must_use]
    pub fn defense_view(world: &World) -> DefenseView {
        DefenseView::from_snapshots(world.defenses.standing().map(|d| d.snapshot()).collect())
    }

    /// Captures a read-only view of every threat on the grid.
    #[must_use]
    pub fn threat_view(world: &World) -> ThreatView {
        ThreatView::from_snapshots(world.threats.iter().map(|t| t.snapshot()).collect())
    }

    /// Threats currently standing on an exit tile, in spawn order.
    #[must_use]
    pub fn threats_at_exit(world: &World) -> Vec<ThreatId> {
        world
            .threats
            .iter()
            .filter(|threat| threat.tile.position() == 0)
            .map(|threat| threat.id)
            .collect()
    }

    /// Lanes whose entrance tile is free of threats, in ascending order.
    #[must_use]
    pub fn free_entrances(world: &World) -> Vec<u32> {
        (0..world.grid.lane_count())
            .filter(|lane| {
                world
                    .grid
                    .occupants(world.grid.entrance(*lane))
                    .threat
                    .is_none()
            })
            .collect()
    }
}
