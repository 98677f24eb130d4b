#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns defense activations into distraction and lure commands.

use lane_defence_core::{
    Command, DefenseEffect, DefenseSnapshot, DefenseView, OccupancyView, Reach, ThreatId,
    ThreatView, TileCoord,
};
use lane_defence_system_targeting::TargetResolver;

/// Defense action system that reuses scratch buffers between activations.
#[derive(Debug, Default)]
pub struct DefenseActions {
    resolver: TargetResolver,
    targets: Vec<ThreatId>,
}

impl DefenseActions {
    /// Creates a new defense action system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists the defenses that act on `turn`, in lane-major, position-minor order.
    ///
    /// Generators and barriers are skipped; their effects do not involve
    /// threats. The output buffer is cleared before populating it.
    pub fn activation_order(
        &self,
        turn: u64,
        defenses: &DefenseView,
        out: &mut Vec<DefenseSnapshot>,
    ) {
        out.clear();
        out.extend(defenses.iter().copied().filter(|defense| {
            defense.is_due(turn)
                && !matches!(
                    defense.kind.effect(),
                    DefenseEffect::Generate { .. } | DefenseEffect::Obstruct
                )
        }));
        out.sort_by_key(|defense| (defense.tile, defense.id));
    }

    /// Emits the commands for a single activation of `defense`.
    ///
    /// Callers apply the commands before activating the next defense so later
    /// activations see the attention and lures left by earlier ones.
    pub fn handle(
        &mut self,
        defense: &DefenseSnapshot,
        threats: &ThreatView,
        occupancy: &OccupancyView<'_>,
        out: &mut Vec<Command>,
    ) {
        let amount = match defense.kind.effect() {
            DefenseEffect::Distract { amount }
            | DefenseEffect::DistractOrLure { amount }
            | DefenseEffect::Zone { amount } => amount,
            DefenseEffect::Generate { .. } | DefenseEffect::Obstruct => return,
        };

        self.resolver.select(defense, threats, &mut self.targets);
        out.extend(self.targets.iter().map(|threat| Command::DistractThreat {
            threat: *threat,
            source: defense.id,
            amount,
        }));

        if self.targets.is_empty()
            && matches!(defense.kind.effect(), DefenseEffect::DistractOrLure { .. })
        {
            if let Some(tile) = lure_tile(defense, occupancy) {
                out.push(Command::DropLure {
                    source: defense.id,
                    tile,
                });
            }
        }
    }
}

/// Furthest empty tile ahead of the defense, within reach and short of the entrance.
fn lure_tile(defense: &DefenseSnapshot, occupancy: &OccupancyView<'_>) -> Option<TileCoord> {
    let last_open = occupancy.lane_length().checked_sub(2)?;
    let furthest = match defense.kind.reach() {
        Some(Reach::Tiles(limit)) => defense.tile.position().saturating_add(limit),
        Some(Reach::Lane) => last_open,
        None => return None,
    }
    .min(last_open);

    ((defense.tile.position() + 1)..=furthest)
        .rev()
        .map(|position| TileCoord::new(defense.tile.lane(), position))
        .find(|tile| {
            occupancy
                .occupants(*tile)
                .is_some_and(|occupants| occupants.is_empty())
        })
}
