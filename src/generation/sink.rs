//! # Tile Sinks
//!
//! The generator's only output channel for concrete tiles. An engine adapter
//! implements [`TileSink`] to forward writes into its tilemap layers; the
//! crate ships a [`NullSink`] and a [`RecordingSink`] that keeps layer grids
//! and serializes them into byte arrays for [`crate::LevelData`].

use crate::AtlasCoord;
use serde::{Deserialize, Serialize};

/// Receiver of concrete tile writes, in world grid coordinates.
pub trait TileSink {
    /// Writes a floor-layer tile.
    fn place_floor(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord);

    /// Writes a wall-layer tile.
    fn place_wall(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord);

    /// Clears the wall-layer tile at a cell.
    fn erase_wall(&mut self, x: i32, y: i32);

    /// Writes a decoration-layer tile.
    fn place_decoration(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord);
}

/// Sink that discards every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TileSink for NullSink {
    fn place_floor(&mut self, _x: i32, _y: i32, _atlas_id: u8, _coord: AtlasCoord) {}
    fn place_wall(&mut self, _x: i32, _y: i32, _atlas_id: u8, _coord: AtlasCoord) {}
    fn erase_wall(&mut self, _x: i32, _y: i32) {}
    fn place_decoration(&mut self, _x: i32, _y: i32, _atlas_id: u8, _coord: AtlasCoord) {}
}

/// A single recorded write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileWrite {
    Floor { x: i32, y: i32, atlas_id: u8, coord: AtlasCoord },
    Wall { x: i32, y: i32, atlas_id: u8, coord: AtlasCoord },
    EraseWall { x: i32, y: i32 },
    Decoration { x: i32, y: i32, atlas_id: u8, coord: AtlasCoord },
}

/// Bytes used for an empty cell in serialized layers.
pub const EMPTY_CELL: [u8; 3] = [0xFF, 0xFF, 0xFF];

/// One tilemap layer as a grid of optional `(atlas_id, coord)` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayer {
    pub width: u32,
    pub height: u32,
    cells: Vec<Option<(u8, AtlasCoord)>>,
}

impl TileLayer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Sets or clears a cell; out-of-range writes are dropped.
    pub fn set(&mut self, x: i32, y: i32, value: Option<(u8, AtlasCoord)>) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx] = value;
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<(u8, AtlasCoord)> {
        self.index(x, y).and_then(|idx| self.cells[idx])
    }

    /// Number of non-empty cells.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Serializes the layer as three bytes per cell, row-major:
    /// `[atlas_id, x, y]`, or [`EMPTY_CELL`] for empty cells.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.cells.len() * 3);
        for cell in &self.cells {
            match cell {
                Some((atlas, coord)) => bytes.extend_from_slice(&[*atlas, coord.x, coord.y]),
                None => bytes.extend_from_slice(&EMPTY_CELL),
            }
        }
        bytes
    }
}

/// Sink that keeps the final state of each layer and, optionally, the
/// ordered list of writes.
#[derive(Debug, Clone)]
pub struct RecordingSink {
    pub floor: TileLayer,
    pub wall: TileLayer,
    pub decoration: TileLayer,
    /// Every write in order, when logging is enabled
    pub writes: Vec<TileWrite>,
    log_writes: bool,
}

impl RecordingSink {
    /// Creates a sink with layer grids only.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            floor: TileLayer::new(width, height),
            wall: TileLayer::new(width, height),
            decoration: TileLayer::new(width, height),
            writes: Vec::new(),
            log_writes: false,
        }
    }

    /// Creates a sink that also logs every write in order.
    pub fn with_write_log(width: u32, height: u32) -> Self {
        Self {
            log_writes: true,
            ..Self::new(width, height)
        }
    }

    /// Drains the write log.
    pub fn take_writes(&mut self) -> Vec<TileWrite> {
        std::mem::take(&mut self.writes)
    }

    fn log(&mut self, write: TileWrite) {
        if self.log_writes {
            self.writes.push(write);
        }
    }
}

impl TileSink for RecordingSink {
    fn place_floor(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord) {
        self.floor.set(x, y, Some((atlas_id, coord)));
        self.log(TileWrite::Floor { x, y, atlas_id, coord });
    }

    fn place_wall(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord) {
        self.wall.set(x, y, Some((atlas_id, coord)));
        self.log(TileWrite::Wall { x, y, atlas_id, coord });
    }

    fn erase_wall(&mut self, x: i32, y: i32) {
        self.wall.set(x, y, None);
        self.log(TileWrite::EraseWall { x, y });
    }

    fn place_decoration(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord) {
        self.decoration.set(x, y, Some((atlas_id, coord)));
        self.log(TileWrite::Decoration { x, y, atlas_id, coord });
    }
}

/// Forwards every write to two sinks, `primary` first.
pub struct FanoutSink<'a> {
    pub primary: &'a mut dyn TileSink,
    pub secondary: &'a mut dyn TileSink,
}

impl<'a> FanoutSink<'a> {
    pub fn new(primary: &'a mut dyn TileSink, secondary: &'a mut dyn TileSink) -> Self {
        Self { primary, secondary }
    }
}

impl TileSink for FanoutSink<'_> {
    fn place_floor(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord) {
        self.primary.place_floor(x, y, atlas_id, coord);
        self.secondary.place_floor(x, y, atlas_id, coord);
    }

    fn place_wall(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord) {
        self.primary.place_wall(x, y, atlas_id, coord);
        self.secondary.place_wall(x, y, atlas_id, coord);
    }

    fn erase_wall(&mut self, x: i32, y: i32) {
        self.primary.erase_wall(x, y);
        self.secondary.erase_wall(x, y);
    }

    fn place_decoration(&mut self, x: i32, y: i32, atlas_id: u8, coord: AtlasCoord) {
        self.primary.place_decoration(x, y, atlas_id, coord);
        self.secondary.place_decoration(x, y, atlas_id, coord);
    }
}
