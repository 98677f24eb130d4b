//! Plain-text rendering of session snapshots.

use std::fmt::Write as _;

use lane_defence_core::{DefenseKind, ThreatKind, TileCoord};
use lane_defence_session::SessionSnapshot;

const EMPTY: char = '.';
const LURE: char = '*';
const RESTING: char = 'z';

/// Renders one row per lane with the exit on the left and the entrance on the
/// right, followed by a short status line.
pub(crate) fn render(snapshot: &SessionSnapshot) -> String {
    let occupancy = snapshot.occupancy();
    let mut board = String::new();

    for lane in 0..snapshot.lane_count {
        let _ = write!(board, "{lane:>2} |");
        for position in 0..snapshot.lane_length {
            let glyph = occupancy
                .occupants(TileCoord::new(lane, position))
                .map_or(EMPTY, |occupants| {
                    if let Some(threat) = occupants
                        .threat
                        .and_then(|id| snapshot.threats.iter().find(|threat| threat.id == id))
                    {
                        if threat.is_resting() {
                            RESTING
                        } else {
                            threat_glyph(threat.kind)
                        }
                    } else if let Some(defense) = occupants
                        .defense
                        .and_then(|id| snapshot.defenses.iter().find(|defense| defense.id == id))
                    {
                        defense_glyph(defense.kind)
                    } else if occupants.lure {
                        LURE
                    } else {
                        EMPTY
                    }
                });
            board.push(glyph);
        }
        board.push_str("|\n");
    }

    let _ = writeln!(
        board,
        "turn {}/{}  resources {}  threats {}  {:?}",
        snapshot.turn,
        snapshot.survival_turn_target,
        snapshot.balance,
        snapshot.threats.len(),
        snapshot.outcome
    );
    board
}

const fn defense_glyph(kind: DefenseKind) -> char {
    match kind {
        DefenseKind::Distractor => 'D',
        DefenseKind::Barrier => 'B',
        DefenseKind::Generator => 'G',
        DefenseKind::Thrower => 'T',
        DefenseKind::MultiLaneDistractor => 'M',
        DefenseKind::PersistentThrower => 'P',
        DefenseKind::PassiveZone => 'Z',
    }
}

const fn threat_glyph(kind: ThreatKind) -> char {
    match kind {
        ThreatKind::Standard => 's',
        ThreatKind::Evasive => 'e',
        ThreatKind::Rapid => 'r',
    }
}
