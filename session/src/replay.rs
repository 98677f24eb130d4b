//! Deterministic replay of scripted sessions.
//!
//! A replay rebuilds a game from its configuration and the ordered list of
//! player commands. Two replays of the same script produce identical
//! records, which the determinism tests and the CLI rely on.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use lane_defence_core::{DefenseKind, Outcome, SessionError};
use serde::{Deserialize, Serialize};

use crate::{
    CommandError, ConfigError, PlacementAck, RemovalAck, Session, SessionConfig, SessionSnapshot,
    TurnSummary,
};

/// Player command recorded in a replay script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SessionCommand {
    /// Place a defense.
    Place {
        /// Lane of the target tile.
        lane: u32,
        /// Position of the target tile.
        position: u32,
        /// Kind of defense to place.
        kind: DefenseKind,
    },
    /// Remove the defense on a tile.
    Remove {
        /// Lane of the target tile.
        lane: u32,
        /// Position of the target tile.
        position: u32,
    },
    /// Resolve one turn.
    Advance,
}

/// Result of a single replayed command.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommandRecord {
    /// A placement succeeded.
    Placed(PlacementAck),
    /// A removal succeeded.
    Removed(RemovalAck),
    /// A turn was resolved.
    Advanced(TurnSummary),
    /// A placement or removal was rejected.
    Rejected(CommandError),
    /// A turn could not be resolved.
    Halted(SessionError),
}

/// Everything produced by a replay.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReplayOutcome {
    /// One record per scripted command, in order.
    pub records: Vec<CommandRecord>,
    /// Snapshot after the final command.
    pub snapshot: SessionSnapshot,
    /// Outcome after the final command.
    pub outcome: Outcome,
}

impl ReplayOutcome {
    /// Stable hash of the replay used to compare runs.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Turn summaries in the order they were produced.
    pub fn summaries(&self) -> impl Iterator<Item = &TurnSummary> {
        self.records.iter().filter_map(|record| match record {
            CommandRecord::Advanced(summary) => Some(summary),
            _ => None,
        })
    }
}

/// Runs `commands` against a fresh session built from `config`.
pub fn replay(
    config: &SessionConfig,
    commands: &[SessionCommand],
) -> Result<ReplayOutcome, ConfigError> {
    let mut session = Session::new(config.clone())?;
    let records = commands
        .iter()
        .map(|command| execute(&mut session, *command))
        .collect();

    Ok(ReplayOutcome {
        records,
        snapshot: session.snapshot(),
        outcome: session.outcome(),
    })
}

/// Applies one scripted command to a live session.
pub fn execute(session: &mut Session, command: SessionCommand) -> CommandRecord {
    match command {
        SessionCommand::Place {
            lane,
            position,
            kind,
        } => match session.place_defense(lane, position, kind) {
            Ok(ack) => CommandRecord::Placed(ack),
            Err(error) => CommandRecord::Rejected(error),
        },
        SessionCommand::Remove { lane, position } => match session.remove_defense(lane, position)
        {
            Ok(ack) => CommandRecord::Removed(ack),
            Err(error) => CommandRecord::Rejected(error),
        },
        SessionCommand::Advance => match session.advance_turn() {
            Ok(summary) => CommandRecord::Advanced(summary),
            Err(error) => CommandRecord::Halted(error),
        },
    }
}
