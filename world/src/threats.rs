//! Authoritative threat state.

use std::collections::BTreeMap;

use lane_defence_core::{ThreatId, ThreatKind, ThreatSnapshot, TileCoord};

#[derive(Clone, Debug)]
pub(crate) struct ThreatState {
    pub(crate) id: ThreatId,
    pub(crate) kind: ThreatKind,
    pub(crate) tile: TileCoord,
    pub(crate) attention: u32,
    pub(crate) rest_remaining: u32,
    pub(crate) distracted: bool,
    pub(crate) neutralized: bool,
}

impl ThreatState {
    fn new(id: ThreatId, kind: ThreatKind, tile: TileCoord) -> Self {
        Self {
            id,
            kind,
            tile,
            attention: kind.attention_threshold(),
            rest_remaining: 0,
            distracted: false,
            neutralized: false,
        }
    }

    pub(crate) fn snapshot(&self) -> ThreatSnapshot {
        ThreatSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            attention: self.attention,
            rest_remaining: self.rest_remaining,
            distracted: self.distracted,
            neutralized: self.neutralized,
        }
    }

    /// Whether the threat may still spend movement attempts this turn.
    pub(crate) fn can_act(&self) -> bool {
        !self.distracted && !self.neutralized && self.rest_remaining == 0
    }

    /// Lowers attention, flags the threat for settlement and returns the
    /// attention left.
    pub(crate) fn distract(&mut self, amount: u32) -> u32 {
        self.attention = self.attention.saturating_sub(amount);
        self.distracted = true;
        self.attention
    }
}

/// Threats keyed by identifier so iteration follows spawn order.
#[derive(Debug)]
pub(crate) struct ThreatRoster {
    entries: BTreeMap<ThreatId, ThreatState>,
    next_threat_id: ThreatId,
}

impl ThreatRoster {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_threat_id: ThreatId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, kind: ThreatKind, tile: TileCoord) -> ThreatId {
        let id = self.next_threat_id;
        self.next_threat_id = ThreatId::new(id.get() + 1);
        let _ = self.entries.insert(id, ThreatState::new(id, kind, tile));
        id
    }

    pub(crate) fn get(&self, id: ThreatId) -> Option<&ThreatState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ThreatId) -> Option<&mut ThreatState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ThreatState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut ThreatState> {
        self.entries.values_mut()
    }

    /// Removes neutralized threats and returns them in spawn order.
    pub(crate) fn take_neutralized(&mut self) -> Vec<ThreatState> {
        let ids: Vec<ThreatId> = self
            .entries
            .values()
            .filter(|threat| threat.neutralized)
            .map(|threat| threat.id)
            .collect();
        ids.into_iter()
            .filter_map(|id| self.entries.remove(&id))
            .collect()
    }
}
