#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that decides how threats spend their movement attempts.
//!
//! Each attempt yields at most one command: a rest countdown for resting
//! threats, a sideways dodge for evasive threats that pass their roll, or a
//! step toward the exit. The world resolves blocking, strikes and lures.

use lane_defence_core::{Command, OccupancyView, ThreatSnapshot, TileCoord};

/// Percentile roll drawn by the session for an evasive threat's attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DodgeCheck {
    /// Roll in `0..100`.
    pub roll: u32,
    /// Chance, in percent, that the threat attempts to dodge.
    pub chance_percent: u32,
}

impl DodgeCheck {
    /// Reports whether the roll succeeds.
    #[must_use]
    pub const fn passes(&self) -> bool {
        self.roll < self.chance_percent
    }
}

/// Difficulty switches that shape threat behaviour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementRules {
    /// Allows evasive threats to dodge into adjacent lanes.
    pub evasion_enabled: bool,
    /// Allows threats with several actions per turn to use all of them.
    pub rapid_action_enabled: bool,
}

/// Threat movement system.
#[derive(Debug)]
pub struct ThreatMovement {
    rules: MovementRules,
}

impl ThreatMovement {
    /// Creates a new movement system honouring the supplied rules.
    #[must_use]
    pub fn new(rules: MovementRules) -> Self {
        Self { rules }
    }

    /// Number of movement attempts the threat may spend this turn.
    #[must_use]
    pub fn attempts(&self, threat: &ThreatSnapshot) -> u32 {
        if threat.is_resting() || threat.neutralized || threat.distracted {
            0
        } else if self.rules.rapid_action_enabled {
            threat.kind.actions_per_turn()
        } else {
            1
        }
    }

    /// Reports whether an attempt by `threat` needs a dodge roll.
    ///
    /// Rolls are drawn for every attempt by an evasive threat so the random
    /// sequence does not depend on the board layout.
    #[must_use]
    pub fn needs_roll(&self, threat: &ThreatSnapshot) -> bool {
        self.rules.evasion_enabled && threat.kind.is_evasive()
    }

    /// Emits the command for the threat's start-of-phase bookkeeping, counting
    /// down rest for resting threats.
    pub fn rest(&self, threat: &ThreatSnapshot, out: &mut Vec<Command>) {
        if threat.is_resting() && !threat.neutralized {
            out.push(Command::RestThreat { threat: threat.id });
        }
    }

    /// Emits the command for a single movement attempt.
    pub fn handle(
        &self,
        threat: &ThreatSnapshot,
        occupancy: &OccupancyView<'_>,
        dodge: Option<DodgeCheck>,
        out: &mut Vec<Command>,
    ) {
        if threat.is_resting() || threat.neutralized || threat.distracted {
            return;
        }
        if occupancy.is_exit(threat.tile.position()) {
            return;
        }

        let dodge_lane = dodge
            .filter(|check| self.needs_roll(threat) && check.passes())
            .and_then(|_| dodge_lane(threat.tile, occupancy));
        match dodge_lane {
            Some(lane) => out.push(Command::DodgeThreat {
                threat: threat.id,
                lane,
            }),
            None => out.push(Command::StepThreat { threat: threat.id }),
        }
    }
}

/// First adjacent lane, above then below, whose tile at the same position is
/// free of defenses and threats.
fn dodge_lane(tile: TileCoord, occupancy: &OccupancyView<'_>) -> Option<u32> {
    let above = tile.lane().checked_sub(1);
    let below = tile.lane().checked_add(1);
    [above, below].into_iter().flatten().find(|lane| {
        occupancy
            .occupants(tile.in_lane(*lane))
            .is_some_and(|occupants| occupants.defense.is_none() && occupants.threat.is_none())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{DefenseId, ThreatId, ThreatKind, TileOccupants};

    fn threat(kind: ThreatKind, lane: u32, position: u32) -> ThreatSnapshot {
        ThreatSnapshot {
            id: ThreatId::new(0),
            kind,
            tile: TileCoord::new(lane, position),
            attention: kind.attention_threshold(),
            rest_remaining: 0,
            distracted: false,
            neutralized: false,
        }
    }

    fn all_rules() -> MovementRules {
        MovementRules {
            evasion_enabled: true,
            rapid_action_enabled: true,
        }
    }

    #[test]
    fn rapid_threats_need_rapid_action_enabled() {
        let rapid = threat(ThreatKind::Rapid, 0, 5);
        assert_eq!(ThreatMovement::new(all_rules()).attempts(&rapid), 2);
        assert_eq!(
            ThreatMovement::new(MovementRules::default()).attempts(&rapid),
            1
        );
    }

    #[test]
    fn resting_threat_counts_down_instead_of_moving() {
        let system = ThreatMovement::new(all_rules());
        let mut resting = threat(ThreatKind::Standard, 0, 5);
        resting.rest_remaining = 2;
        let tiles = vec![TileOccupants::default(); 8];
        let occupancy = OccupancyView::new(&tiles, 1, 8);

        let mut out = Vec::new();
        system.rest(&resting, &mut out);
        system.handle(&resting, &occupancy, None, &mut out);
        assert_eq!(out, vec![Command::RestThreat { threat: resting.id }]);
        assert_eq!(system.attempts(&resting), 0);
    }

    #[test]
    fn passing_roll_dodges_above_first() {
        let system = ThreatMovement::new(all_rules());
        let tiles = vec![TileOccupants::default(); 3 * 8];
        let occupancy = OccupancyView::new(&tiles, 3, 8);
        let evasive = threat(ThreatKind::Evasive, 1, 5);

        let mut out = Vec::new();
        system.handle(
            &evasive,
            &occupancy,
            Some(DodgeCheck {
                roll: 10,
                chance_percent: 20,
            }),
            &mut out,
        );
        assert_eq!(
            out,
            vec![Command::DodgeThreat {
                threat: evasive.id,
                lane: 0,
            }]
        );
    }

    #[test]
    fn blocked_lane_above_falls_back_to_below() {
        let system = ThreatMovement::new(all_rules());
        let mut tiles = vec![TileOccupants::default(); 3 * 8];
        tiles[5].defense = Some(DefenseId::new(1));
        let occupancy = OccupancyView::new(&tiles, 3, 8);
        let evasive = threat(ThreatKind::Evasive, 1, 5);

        let mut out = Vec::new();
        let check = DodgeCheck {
            roll: 0,
            chance_percent: 35,
        };
        system.handle(&evasive, &occupancy, Some(check), &mut out);
        assert_eq!(
            out,
            vec![Command::DodgeThreat {
                threat: evasive.id,
                lane: 2,
            }]
        );
    }

    #[test]
    fn failed_roll_or_disabled_evasion_steps_forward() {
        let tiles = vec![TileOccupants::default(); 2 * 8];
        let occupancy = OccupancyView::new(&tiles, 2, 8);
        let evasive = threat(ThreatKind::Evasive, 0, 5);
        let check = DodgeCheck {
            roll: 20,
            chance_percent: 20,
        };

        let mut out = Vec::new();
        ThreatMovement::new(all_rules()).handle(&evasive, &occupancy, Some(check), &mut out);
        ThreatMovement::new(MovementRules::default()).handle(
            &evasive,
            &occupancy,
            Some(DodgeCheck {
                roll: 0,
                chance_percent: 100,
            }),
            &mut out,
        );
        let step = Command::StepThreat { threat: evasive.id };
        assert_eq!(out, vec![step.clone(), step]);
    }

    #[test]
    fn threats_at_exit_issue_no_command() {
        let system = ThreatMovement::new(all_rules());
        let tiles = vec![TileOccupants::default(); 8];
        let occupancy = OccupancyView::new(&tiles, 1, 8);
        let mut out = Vec::new();
        system.handle(&threat(ThreatKind::Standard, 0, 0), &occupancy, None, &mut out);
        assert!(out.is_empty());
    }
}
