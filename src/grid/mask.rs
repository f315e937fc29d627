//! # Tile Mask
//!
//! Semantic classification of every cell in a section or in the stitched world.

use crate::{Position, Rect, SectorError, SectorResult};
use serde::{Deserialize, Serialize};

/// Semantic type of a grid cell.
///
/// Only `Room` and `Corridor` are walkable. `Decoration` marks a blocking
/// obstacle; visual-only decorations live in an overlay list and leave the
/// cell as `Room`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TileType {
    #[default]
    None,
    Background,
    Room,
    Corridor,
    Wall,
    Decoration,
}

impl TileType {
    /// Whether entities can walk on this cell.
    pub fn is_walkable(self) -> bool {
        matches!(self, TileType::Room | TileType::Corridor)
    }

    /// Character used by the ASCII dump.
    pub fn glyph(self) -> char {
        match self {
            TileType::None => ' ',
            TileType::Background => ' ',
            TileType::Room => '.',
            TileType::Corridor => ',',
            TileType::Wall => '#',
            TileType::Decoration => '%',
        }
    }
}

/// Row-major grid of [`TileType`] cells.
///
/// # Examples
///
/// ```
/// use sectorgen::{Position, TileMask, TileType};
///
/// let mut mask = TileMask::new(4, 3);
/// mask.set_tile(Position::new(1, 1), TileType::Room).unwrap();
/// assert!(mask.is_walkable(Position::new(1, 1)));
/// assert!(mask.set_tile(Position::new(9, 9), TileType::Room).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileMask {
    pub width: u32,
    pub height: u32,
    cells: Vec<TileType>,
}

impl TileMask {
    /// Creates a mask with every cell set to `TileType::None`.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileType::None)
    }

    /// Creates a mask with every cell set to `tile`.
    pub fn filled(width: u32, height: u32, tile: TileType) -> Self {
        Self {
            width,
            height,
            cells: vec![tile; (width as usize) * (height as usize)],
        }
    }

    /// Checks if a position lies inside the mask.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Gets the tile at a position, `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<TileType> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Gets the tile at a position, treating out of bounds as `TileType::None`.
    pub fn tile_or_none(&self, pos: Position) -> TileType {
        self.get(pos).unwrap_or(TileType::None)
    }

    /// Sets the tile at a position.
    pub fn set_tile(&mut self, pos: Position, tile: TileType) -> SectorResult<()> {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = tile;
                Ok(())
            }
            None => Err(SectorError::OutOfBounds {
                x: pos.x,
                y: pos.y,
                width: self.width,
                height: self.height,
            }),
        }
    }

    /// Checks if the cell at `pos` is walkable. Out of bounds is never walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile_or_none(pos).is_walkable()
    }

    /// Sets every cell to `tile`.
    pub fn fill(&mut self, tile: TileType) {
        self.cells.iter_mut().for_each(|cell| *cell = tile);
    }

    /// Replaces every `from` cell with `to`, returning how many changed.
    pub fn replace_all(&mut self, from: TileType, to: TileType) -> usize {
        let mut changed = 0;
        for cell in self.cells.iter_mut().filter(|c| **c == from) {
            *cell = to;
            changed += 1;
        }
        changed
    }

    /// The full extent of the mask as a rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Iterates over every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        self.bounds().positions()
    }

    /// Iterates over `(position, tile)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, TileType)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().map(move |(idx, tile)| {
            (
                Position::new((idx % width) as i32, (idx / width) as i32),
                *tile,
            )
        })
    }

    /// All positions holding exactly `tile`.
    pub fn positions_of(&self, tile: TileType) -> Vec<Position> {
        self.iter()
            .filter(|(_, t)| *t == tile)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Number of cells holding exactly `tile`.
    pub fn count(&self, tile: TileType) -> usize {
        self.cells.iter().filter(|t| **t == tile).count()
    }

    /// Number of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|t| t.is_walkable()).count()
    }

    /// Counts walkable cells among the 8 neighbours of `pos`.
    pub fn walkable_neighbors(&self, pos: Position) -> usize {
        pos.adjacent_positions()
            .into_iter()
            .filter(|p| self.is_walkable(*p))
            .count()
    }

    /// Whether any 4-neighbour of `pos` holds `tile`.
    pub fn has_cardinal_neighbor(&self, pos: Position, tile: TileType) -> bool {
        pos.cardinal_adjacent_positions()
            .iter()
            .any(|p| self.get(*p) == Some(tile))
    }

    /// Copies `other` into this mask with its origin at `offset`, clipping.
    pub fn blit(&mut self, other: &TileMask, offset: Position) {
        for (pos, tile) in other.iter() {
            let target = pos + offset;
            if let Some(idx) = self.index(target) {
                self.cells[idx] = tile;
            }
        }
    }

    /// Overwrites this mask with the region of `source` whose origin is at
    /// `offset`. Cells falling outside `source` keep their value.
    pub fn copy_region(&mut self, source: &TileMask, offset: Position) {
        let width = self.width as usize;
        for (idx, cell) in self.cells.iter_mut().enumerate() {
            let pos = Position::new((idx % width) as i32, (idx / width) as i32);
            if let Some(tile) = source.get(pos + offset) {
                *cell = tile;
            }
        }
    }

    /// Multi-line ASCII dump, one character per cell.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.cells.chunks(self.width.max(1) as usize) {
            out.extend(row.iter().map(|t| t.glyph()));
            out.push('\n');
        }
        out
    }
}
