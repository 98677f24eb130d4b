//! Authoritative defense state management utilities.

use std::collections::BTreeMap;

use lane_defence_core::{DefenseId, DefenseKind, DefenseSnapshot, TileCoord};

/// State of a defense stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct DefenseState {
    /// Identifier allocated by the world for the defense.
    pub(crate) id: DefenseId,
    /// Kind of defense that was placed.
    pub(crate) kind: DefenseKind,
    /// Tile occupied by the defense.
    pub(crate) tile: TileCoord,
    /// Interactions the defense can still absorb; `None` for defenses that
    /// never wear out.
    pub(crate) durability: Option<u32>,
    /// Turn counter value at the time of placement.
    pub(crate) placed_on: u64,
}

impl DefenseState {
    pub(crate) fn is_destroyed(&self) -> bool {
        self.durability == Some(0)
    }

    pub(crate) fn snapshot(&self) -> DefenseSnapshot {
        DefenseSnapshot {
            id: self.id,
            kind: self.kind,
            tile: self.tile,
            durability: self.durability,
            placed_on: self.placed_on,
        }
    }
}

/// Registry that stores defenses and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct DefenseRegistry {
    entries: BTreeMap<DefenseId, DefenseState>,
    next_defense_id: DefenseId,
}

impl DefenseRegistry {
    /// Creates an empty defense registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_defense_id: DefenseId::new(0),
        }
    }

    /// Stores a freshly placed defense at full durability.
    pub(crate) fn insert(&mut self, kind: DefenseKind, tile: TileCoord, placed_on: u64) -> DefenseId {
        let id = self.next_defense_id;
        self.next_defense_id = DefenseId::new(id.get() + 1);
        let previous = self.entries.insert(
            id,
            DefenseState {
                id,
                kind,
                tile,
                durability: kind.durability(),
                placed_on,
            },
        );
        debug_assert!(previous.is_none(), "defense identifiers are never reused");
        id
    }

    pub(crate) fn get(&self, id: DefenseId) -> Option<&DefenseState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: DefenseId) -> Option<&mut DefenseState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: DefenseId) -> Option<DefenseState> {
        self.entries.remove(&id)
    }

    /// Iterates over defenses that are still standing, in identifier order.
    pub(crate) fn standing(&self) -> impl Iterator<Item = &DefenseState> {
        self.entries.values().filter(|defense| !defense.is_destroyed())
    }

    /// Drops every destroyed defense, returning how many were removed.
    pub(crate) fn purge_destroyed(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, defense| !defense.is_destroyed());
        before - self.entries.len()
    }
}
