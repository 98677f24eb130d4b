#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting threat spawn commands.

use std::collections::VecDeque;

use lane_defence_core::{Command, Difficulty, ThreatKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Single spawn pinned to a turn counter value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledSpawn {
    /// Turn counter value at which the threat enters.
    pub turn: u64,
    /// Kind of threat to spawn.
    pub kind: ThreatKind,
    /// Lane to enter, or `None` to let the session pick a free lane.
    #[serde(default)]
    pub lane: Option<u32>,
}

/// Repeating wave that spawns one threat every `every` turns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wave {
    /// Turns between consecutive spawns. Zero disables the wave.
    pub every: u64,
    /// Turn counter value of the first spawn.
    #[serde(default)]
    pub start: u64,
    /// Threat kinds spawned in rotation.
    pub cycle: Vec<ThreatKind>,
}

impl Wave {
    fn kind_for(&self, turn: u64) -> Option<ThreatKind> {
        if self.every == 0 || self.cycle.is_empty() || turn < self.start {
            return None;
        }
        let offset = turn - self.start;
        if offset % self.every != 0 {
            return None;
        }
        let index = (offset / self.every) % self.cycle.len() as u64;
        self.cycle.get(usize::try_from(index).ok()?).copied()
    }
}

/// Threat arrivals keyed by the turn counter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSchedule {
    /// Individually scripted spawns.
    pub scripted: Vec<ScheduledSpawn>,
    /// Repeating wave applied after scripted spawns.
    pub wave: Option<Wave>,
}

impl SpawnSchedule {
    /// Built-in schedule for a difficulty level.
    #[must_use]
    pub fn preset(difficulty: Difficulty) -> Self {
        let (every, cycle) = match difficulty {
            Difficulty::Easy => (5, vec![ThreatKind::Standard]),
            Difficulty::Medium => (
                4,
                vec![ThreatKind::Standard, ThreatKind::Standard, ThreatKind::Evasive],
            ),
            Difficulty::Hard => (
                3,
                vec![ThreatKind::Standard, ThreatKind::Evasive, ThreatKind::Rapid],
            ),
        };
        Self {
            scripted: Vec::new(),
            wave: Some(Wave {
                every,
                start: 0,
                cycle,
            }),
        }
    }

    /// Highest lane named by a scripted spawn, if any.
    #[must_use]
    pub fn highest_lane(&self) -> Option<u32> {
        self.scripted.iter().filter_map(|spawn| spawn.lane).max()
    }

    /// Appends the spawns scheduled for `turn`, scripted entries first.
    pub fn due(&self, turn: u64, out: &mut Vec<PendingSpawn>) {
        out.extend(
            self.scripted
                .iter()
                .filter(|spawn| spawn.turn == turn)
                .map(|spawn| PendingSpawn {
                    kind: spawn.kind,
                    lane: spawn.lane,
                }),
        );
        if let Some(kind) = self.wave.as_ref().and_then(|wave| wave.kind_for(turn)) {
            out.push(PendingSpawn { kind, lane: None });
        }
    }
}

/// Spawn waiting for a free entrance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingSpawn {
    /// Kind of threat to spawn.
    pub kind: ThreatKind,
    /// Requested lane, or `None` for any free lane.
    pub lane: Option<u32>,
}

/// Pure system that emits spawn commands for each spawning pass.
#[derive(Debug)]
pub struct Spawning {
    schedule: SpawnSchedule,
    deferred: VecDeque<PendingSpawn>,
    pending: Vec<PendingSpawn>,
    free: Vec<u32>,
}

impl Spawning {
    /// Creates a new spawning system following the supplied schedule.
    #[must_use]
    pub fn new(schedule: SpawnSchedule) -> Self {
        Self {
            schedule,
            deferred: VecDeque::new(),
            pending: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of spawns still waiting for a free entrance.
    #[must_use]
    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Emits spawn commands for `turn`.
    ///
    /// Deferred spawns retry before the spawns scheduled for this turn. Spawns
    /// without a lane draw uniformly among `free_entrances` from `rng`; a spawn
    /// whose lane is blocked, or that finds no free lane, is deferred again.
    pub fn handle<R: Rng>(
        &mut self,
        turn: u64,
        free_entrances: &[u32],
        rng: &mut R,
        out: &mut Vec<Command>,
    ) {
        self.pending.clear();
        self.pending.extend(self.deferred.drain(..));
        self.schedule.due(turn, &mut self.pending);

        self.free.clear();
        self.free.extend_from_slice(free_entrances);

        for spawn in self.pending.drain(..) {
            let lane = match spawn.lane {
                Some(lane) => self
                    .free
                    .iter()
                    .position(|free| *free == lane)
                    .map(|index| self.free.remove(index)),
                None if self.free.is_empty() => None,
                None => {
                    let index = rng.gen_range(0..self.free.len());
                    Some(self.free.remove(index))
                }
            };

            match lane {
                Some(lane) => out.push(Command::SpawnThreat {
                    kind: spawn.kind,
                    lane,
                }),
                None => self.deferred.push_back(spawn),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn lanes(commands: &[Command]) -> Vec<u32> {
        commands
            .iter()
            .map(|command| match command {
                Command::SpawnThreat { lane, .. } => *lane,
                other => panic!("unexpected command emitted: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn presets_follow_difficulty_cadence() {
        let mut due = Vec::new();
        let hard = SpawnSchedule::preset(Difficulty::Hard);
        for turn in 0..9 {
            hard.due(turn, &mut due);
        }
        let kinds: Vec<_> = due.iter().map(|spawn| spawn.kind).collect();
        assert_eq!(
            kinds,
            vec![ThreatKind::Standard, ThreatKind::Evasive, ThreatKind::Rapid]
        );

        due.clear();
        SpawnSchedule::preset(Difficulty::Easy).due(4, &mut due);
        assert!(due.is_empty());
        SpawnSchedule::preset(Difficulty::Easy).due(5, &mut due);
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn wave_start_delays_first_spawn() {
        let wave = Wave {
            every: 2,
            start: 3,
            cycle: vec![ThreatKind::Rapid],
        };
        assert_eq!(wave.kind_for(1), None);
        assert_eq!(wave.kind_for(3), Some(ThreatKind::Rapid));
        assert_eq!(wave.kind_for(4), None);
        assert_eq!(wave.kind_for(5), Some(ThreatKind::Rapid));
    }

    #[test]
    fn blocked_pinned_spawn_is_deferred_and_retried_first() {
        let schedule = SpawnSchedule {
            scripted: vec![
                ScheduledSpawn {
                    turn: 0,
                    kind: ThreatKind::Standard,
                    lane: Some(1),
                },
                ScheduledSpawn {
                    turn: 1,
                    kind: ThreatKind::Rapid,
                    lane: Some(0),
                },
            ],
            wave: None,
        };
        let mut spawning = Spawning::new(schedule);
        let mut rng = StepRng::new(0, 1);

        let mut out = Vec::new();
        spawning.handle(0, &[0, 2], &mut rng, &mut out);
        assert!(out.is_empty());
        assert_eq!(spawning.deferred(), 1);

        spawning.handle(1, &[0, 1, 2], &mut rng, &mut out);
        assert_eq!(
            out,
            vec![
                Command::SpawnThreat {
                    kind: ThreatKind::Standard,
                    lane: 1,
                },
                Command::SpawnThreat {
                    kind: ThreatKind::Rapid,
                    lane: 0,
                },
            ]
        );
        assert_eq!(spawning.deferred(), 0);
    }

    #[test]
    fn open_spawns_never_share_an_entrance() {
        let schedule = SpawnSchedule {
            scripted: (0..3)
                .map(|_| ScheduledSpawn {
                    turn: 0,
                    kind: ThreatKind::Standard,
                    lane: None,
                })
                .collect(),
            wave: None,
        };
        let mut spawning = Spawning::new(schedule);
        let mut rng = StepRng::new(0, 1);
        let mut out = Vec::new();
        spawning.handle(0, &[1, 3], &mut rng, &mut out);

        let mut spawned = lanes(&out);
        spawned.sort_unstable();
        assert_eq!(spawned, vec![1, 3]);
        assert_eq!(spawning.deferred(), 1);
    }

    #[test]
    fn schedule_reports_highest_pinned_lane() {
        let schedule = SpawnSchedule {
            scripted: vec![
                ScheduledSpawn {
                    turn: 2,
                    kind: ThreatKind::Evasive,
                    lane: Some(4),
                },
                ScheduledSpawn {
                    turn: 3,
                    kind: ThreatKind::Evasive,
                    lane: None,
                },
            ],
            wave: None,
        };
        assert_eq!(schedule.highest_lane(), Some(4));
        assert_eq!(SpawnSchedule::default().highest_lane(), None);
    }
}
