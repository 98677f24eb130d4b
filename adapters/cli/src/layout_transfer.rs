use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use lane_defence_core::{DefenseKind, TileCoord};
use lane_defence_session::SessionSnapshot;
use serde::{Deserialize, Serialize};

const LAYOUT_DOMAIN: &str = "lanes";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
pub(crate) const LAYOUT_HEADER: &str = "lanes:v1";
/// Delimiter separating the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Defenses placed on a board together with the board dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct DefenseLayout {
    /// Number of lanes on the grid.
    pub(crate) lane_count: u32,
    /// Number of tiles in each lane.
    pub(crate) lane_length: u32,
    /// Placements in the order they should be replayed.
    pub(crate) placements: Vec<LayoutPlacement>,
}

impl DefenseLayout {
    /// Captures the standing defenses of a session.
    pub(crate) fn capture(snapshot: &SessionSnapshot) -> Self {
        Self {
            lane_count: snapshot.lane_count,
            lane_length: snapshot.lane_length,
            placements: snapshot
                .defenses
                .iter()
                .map(|defense| LayoutPlacement {
                    kind: defense.kind,
                    tile: defense.tile,
                })
                .collect(),
        }
    }

    /// Encodes the layout into a single line suitable for copy and paste.
    pub(crate) fn encode(&self) -> Result<String, LayoutTransferError> {
        let payload = SerializableLayout {
            placements: self.placements.clone(),
        };
        let json = serde_json::to_vec(&payload).map_err(LayoutTransferError::InvalidPayload)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!(
            "{LAYOUT_HEADER}:{}x{}:{encoded}",
            self.lane_count, self.lane_length
        ))
    }

    /// Decodes a layout from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let dimensions = parts
            .next()
            .ok_or(LayoutTransferError::MissingDimensions)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let (lane_count, lane_length) = parse_dimensions(dimensions)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        let decoded: SerializableLayout =
            serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)?;

        Ok(Self {
            lane_count,
            lane_length,
            placements: decoded.placements,
        })
    }
}

/// Single defense captured within a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LayoutPlacement {
    /// Kind of defense to place.
    pub(crate) kind: DefenseKind,
    /// Tile the defense occupies.
    pub(crate) tile: TileCoord,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct SerializableLayout {
    placements: Vec<LayoutPlacement>,
}

/// Errors that can occur while transferring layout strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The grid dimensions were missing.
    MissingDimensions,
    /// The payload segment was missing.
    MissingPayload,
    /// The layout used an unexpected prefix.
    InvalidPrefix(String),
    /// The layout used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    InvalidDimensions(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingDimensions => write!(f, "layout string is missing the grid dimensions"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidDimensions(dimensions) => {
                write!(f, "could not parse grid dimensions '{dimensions}'")
            }
            Self::InvalidEncoding(error) => write!(f, "could not decode layout payload: {error}"),
            Self::InvalidPayload(error) => write!(f, "invalid layout payload: {error}"),
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), LayoutTransferError> {
    let invalid = || LayoutTransferError::InvalidDimensions(dimensions.to_owned());
    let (lanes, length) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let lanes = lanes.trim().parse::<u32>().map_err(|_| invalid())?;
    let length = length.trim().parse::<u32>().map_err(|_| invalid())?;
    if lanes == 0 || length < 2 {
        return Err(invalid());
    }

    Ok((lanes, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_populated_layout() {
        let layout = DefenseLayout {
            lane_count: 5,
            lane_length: 8,
            placements: vec![
                LayoutPlacement {
                    kind: DefenseKind::Barrier,
                    tile: TileCoord::new(0, 3),
                },
                LayoutPlacement {
                    kind: DefenseKind::PassiveZone,
                    tile: TileCoord::new(4, 6),
                },
            ],
        };

        let encoded = layout.encode().expect("layout encodes");
        assert!(encoded.starts_with(&format!("{LAYOUT_HEADER}:5x8:")));

        let decoded = DefenseLayout::decode(&encoded).expect("layout decodes");
        assert_eq!(layout, decoded);
    }

    #[test]
    fn rejects_foreign_prefix_and_degenerate_grid() {
        assert!(matches!(
            DefenseLayout::decode("board:v1:5x8:e30"),
            Err(LayoutTransferError::InvalidPrefix(prefix)) if prefix == "board"
        ));
        assert!(matches!(
            DefenseLayout::decode("lanes:v1:5x1:e30"),
            Err(LayoutTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            DefenseLayout::decode("lanes:v2:5x8:e30"),
            Err(LayoutTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            DefenseLayout::decode("   "),
            Err(LayoutTransferError::EmptyPayload)
        ));
    }

    #[test]
    fn truncated_layout_reports_missing_segment() {
        assert!(matches!(
            DefenseLayout::decode("lanes:v1:5x8"),
            Err(LayoutTransferError::MissingPayload)
        ));
    }
}
