//! Dense lane-major occupancy grid.

use lane_defence_core::{DefenseId, OccupancyView, ThreatId, TileCoord, TileOccupants};

/// Fixed set of lanes stored as a dense lane-major tile array.
#[derive(Clone, Debug)]
pub(crate) struct LaneGrid {
    lane_count: u32,
    lane_length: u32,
    tiles: Vec<TileOccupants>,
}

impl LaneGrid {
    pub(crate) fn new(lane_count: u32, lane_length: u32) -> Self {
        assert!(lane_count > 0, "grid requires at least one lane");
        assert!(lane_length >= 2, "lanes require an entrance and an exit");
        let capacity = u64::from(lane_count) * u64::from(lane_length);
        let capacity = usize::try_from(capacity).unwrap_or_else(|_| {
            panic!("{lane_count}x{lane_length} grid exceeds addressable memory")
        });
        Self {
            lane_count,
            lane_length,
            tiles: vec![TileOccupants::default(); capacity],
        }
    }

    pub(crate) fn lane_count(&self) -> u32 {
        self.lane_count
    }

    pub(crate) fn view(&self) -> OccupancyView<'_> {
        OccupancyView::new(&self.tiles, self.lane_count, self.lane_length)
    }

    pub(crate) fn contains(&self, tile: TileCoord) -> bool {
        self.view().contains(tile)
    }

    pub(crate) fn is_entrance(&self, tile: TileCoord) -> bool {
        self.view().is_entrance(tile.position())
    }

    pub(crate) fn entrance(&self, lane: u32) -> TileCoord {
        TileCoord::new(lane, self.lane_length - 1)
    }

    /// Occupants of an in-bounds tile; out-of-bounds tiles read as empty.
    pub(crate) fn occupants(&self, tile: TileCoord) -> TileOccupants {
        self.view().occupants(tile).unwrap_or_default()
    }

    pub(crate) fn set_defense(&mut self, tile: TileCoord, defense: Option<DefenseId>) {
        self.slot_mut(tile).defense = defense;
    }

    pub(crate) fn set_threat(&mut self, tile: TileCoord, threat: Option<ThreatId>) {
        self.slot_mut(tile).threat = threat;
    }

    pub(crate) fn set_lure(&mut self, tile: TileCoord, lure: bool) {
        self.slot_mut(tile).lure = lure;
    }

    fn slot_mut(&mut self, tile: TileCoord) -> &mut TileOccupants {
        let index = self.index(tile).unwrap_or_else(|| {
            panic!(
                "tile {tile:?} lies outside the {}x{} grid",
                self.lane_count, self.lane_length
            )
        });
        &mut self.tiles[index]
    }

    fn index(&self, tile: TileCoord) -> Option<usize> {
        if !self.contains(tile) {
            return None;
        }
        let lane = usize::try_from(tile.lane()).ok()?;
        let position = usize::try_from(tile.position()).ok()?;
        let width = usize::try_from(self.lane_length).ok()?;
        Some(lane * width + position)
    }
}
