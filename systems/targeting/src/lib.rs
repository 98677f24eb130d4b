#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes prioritised defense targets from world snapshots.

use lane_defence_core::{DefenseSnapshot, TargetSelection, ThreatId, ThreatView};

/// Target resolver that reuses a scratch buffer to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TargetResolver {
    candidates: Vec<Candidate>,
}

impl TargetResolver {
    /// Creates a new resolver with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists every threat eligible for the defense, highest priority first.
    ///
    /// A threat is eligible when it is targetable, inside the defense's lane
    /// scope and within its reach. Priority favours the threat nearest the
    /// exit, then the lowest lane, then the earliest spawn. The output buffer
    /// is cleared before populating it.
    pub fn resolve(
        &mut self,
        defense: &DefenseSnapshot,
        threats: &ThreatView,
        out: &mut Vec<ThreatId>,
    ) {
        out.clear();
        self.prepare_candidates(defense, threats);
        out.extend(self.candidates.iter().map(|candidate| candidate.id));
    }

    /// Lists the targets one activation of the defense affects.
    ///
    /// Applies the defense's [`TargetSelection`] to the prioritised list:
    /// single-target kinds keep the first entry, multi-lane kinds keep the
    /// first entry of each lane and zone kinds keep every entry.
    pub fn select(
        &mut self,
        defense: &DefenseSnapshot,
        threats: &ThreatView,
        out: &mut Vec<ThreatId>,
    ) {
        out.clear();
        self.prepare_candidates(defense, threats);

        match defense.kind.selection() {
            TargetSelection::Nearest => out.extend(self.candidates.first().map(|c| c.id)),
            TargetSelection::NearestPerLane => {
                let mut covered: Vec<u32> = Vec::new();
                for candidate in &self.candidates {
                    if !covered.contains(&candidate.lane) {
                        covered.push(candidate.lane);
                        out.push(candidate.id);
                    }
                }
            }
            TargetSelection::All => out.extend(self.candidates.iter().map(|c| c.id)),
        }
    }

    fn prepare_candidates(&mut self, defense: &DefenseSnapshot, threats: &ThreatView) {
        self.candidates.clear();
        let Some(reach) = defense.kind.reach() else {
            return;
        };
        let scope = defense.kind.scope();

        for threat in threats.iter() {
            if !threat.is_targetable() {
                continue;
            }
            if !scope.covers(defense.tile.lane(), threat.tile.lane()) {
                continue;
            }
            if !reach.covers(defense.tile.manhattan_distance(threat.tile)) {
                continue;
            }
            self.candidates.push(Candidate {
                id: threat.id,
                lane: threat.tile.lane(),
                position: threat.tile.position(),
            });
        }

        self.candidates.sort_by(|a, b| a.priority().cmp(&b.priority()));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidate {
    id: ThreatId,
    lane: u32,
    position: u32,
}

impl Candidate {
    fn priority(&self) -> (u32, u32, ThreatId) {
        (self.position, self.lane, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::TargetResolver;
    use lane_defence_core::{
        DefenseId, DefenseKind, DefenseSnapshot, ThreatId, ThreatKind, ThreatSnapshot,
        ThreatView, TileCoord,
    };

    fn defense(kind: DefenseKind, lane: u32, position: u32) -> DefenseSnapshot {
        DefenseSnapshot {
            id: DefenseId::new(0),
            kind,
            tile: TileCoord::new(lane, position),
            durability: kind.durability(),
            placed_on: 0,
        }
    }

    fn threat(id: u32, lane: u32, position: u32) -> ThreatSnapshot {
        ThreatSnapshot {
            id: ThreatId::new(id),
            kind: ThreatKind::Standard,
            tile: TileCoord::new(lane, position),
            attention: 4,
            rest_remaining: 0,
            distracted: false,
            neutralized: false,
        }
    }

    fn ids(values: &[u32]) -> Vec<ThreatId> {
        values.iter().copied().map(ThreatId::new).collect()
    }

    #[test]
    fn equidistant_threats_prefer_lower_position() {
        let mut resolver = TargetResolver::new();
        let zone = defense(DefenseKind::PassiveZone, 2, 4);
        let threats = ThreatView::from_snapshots(vec![threat(0, 2, 5), threat(1, 2, 3)]);

        let mut out = Vec::new();
        resolver.resolve(&zone, &threats, &mut out);
        assert_eq!(out, ids(&[1, 0]));
    }

    #[test]
    fn equal_positions_prefer_lower_lane() {
        let mut resolver = TargetResolver::new();
        let zone = defense(DefenseKind::PassiveZone, 2, 4);
        let threats = ThreatView::from_snapshots(vec![threat(0, 3, 4), threat(1, 1, 4)]);

        let mut out = Vec::new();
        resolver.resolve(&zone, &threats, &mut out);
        assert_eq!(out, ids(&[1, 0]));
    }

    #[test]
    fn single_lane_distractor_ignores_other_lanes() {
        let mut resolver = TargetResolver::new();
        let distractor = defense(DefenseKind::Distractor, 1, 4);
        let threats =
            ThreatView::from_snapshots(vec![threat(0, 0, 4), threat(1, 1, 7), threat(2, 1, 5)]);

        let mut out = Vec::new();
        resolver.select(&distractor, &threats, &mut out);
        assert_eq!(out, ids(&[2]));
    }

    #[test]
    fn thrower_reach_is_limited_to_three_tiles() {
        let mut resolver = TargetResolver::new();
        let thrower = defense(DefenseKind::Thrower, 0, 1);
        let threats = ThreatView::from_snapshots(vec![threat(0, 0, 5), threat(1, 0, 4)]);

        let mut out = Vec::new();
        resolver.resolve(&thrower, &threats, &mut out);
        assert_eq!(out, ids(&[1]));
    }

    #[test]
    fn multi_lane_distractor_takes_one_target_per_lane() {
        let mut resolver = TargetResolver::new();
        let multi = defense(DefenseKind::MultiLaneDistractor, 2, 0);
        let threats = ThreatView::from_snapshots(vec![
            threat(0, 1, 6),
            threat(1, 1, 3),
            threat(2, 2, 7),
            threat(3, 3, 5),
            threat(4, 4, 1),
        ]);

        let mut out = Vec::new();
        resolver.select(&multi, &threats, &mut out);
        assert_eq!(out, ids(&[1, 3, 2]));
    }

    #[test]
    fn zone_reaches_across_lanes_by_manhattan_distance() {
        let mut resolver = TargetResolver::new();
        let zone = defense(DefenseKind::PassiveZone, 1, 3);
        let threats = ThreatView::from_snapshots(vec![
            threat(0, 0, 4),
            threat(1, 3, 3),
            threat(2, 4, 3),
            threat(3, 1, 1),
        ]);

        let mut out = Vec::new();
        resolver.select(&zone, &threats, &mut out);
        assert_eq!(out, ids(&[3, 1, 0]));
    }

    #[test]
    fn resting_and_neutralized_threats_are_skipped() {
        let mut resolver = TargetResolver::new();
        let thrower = defense(DefenseKind::Thrower, 0, 4);
        let mut resting = threat(0, 0, 2);
        resting.rest_remaining = 3;
        let mut neutralized = threat(1, 0, 3);
        neutralized.neutralized = true;
        let threats = ThreatView::from_snapshots(vec![resting, neutralized, threat(2, 0, 6)]);

        let mut out = Vec::new();
        resolver.select(&thrower, &threats, &mut out);
        assert_eq!(out, ids(&[2]));
    }

    #[test]
    fn distractor_reaches_only_adjacent_tiles() {
        let mut resolver = TargetResolver::new();
        let distractor = defense(DefenseKind::Distractor, 0, 3);
        let threats = ThreatView::from_snapshots(vec![threat(0, 0, 5), threat(1, 0, 1)]);

        let mut out = Vec::new();
        resolver.resolve(&distractor, &threats, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn barriers_and_generators_never_target() {
        let mut resolver = TargetResolver::new();
        let threats = ThreatView::from_snapshots(vec![threat(0, 0, 1)]);
        let mut out = vec![ThreatId::new(9)];

        resolver.select(&defense(DefenseKind::Barrier, 0, 2), &threats, &mut out);
        assert!(out.is_empty());
        resolver.select(&defense(DefenseKind::Generator, 0, 2), &threats, &mut out);
        assert!(out.is_empty());
    }
}
