//! # Map Sections
//!
//! A section is one rectangular sub-grid of the world. Sections are generated
//! independently and then stitched to their neighbours.

use crate::{HazardKind, Position, Rect, TileMask};
use serde::{Deserialize, Serialize};

/// Themed tile palette selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Grass,
    Forest,
    Desert,
    Ice,
    Techno,
    Anomalous,
    Lava,
}

impl Biome {
    /// Resolves a biome id. Unknown ids fall back to `Grass`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorgen::Biome;
    ///
    /// assert_eq!(Biome::from_id(4), Biome::Techno);
    /// assert_eq!(Biome::from_id(200), Biome::Grass);
    /// ```
    pub fn from_id(id: u8) -> Biome {
        match id {
            0 => Biome::Grass,
            1 => Biome::Forest,
            2 => Biome::Desert,
            3 => Biome::Ice,
            4 => Biome::Techno,
            5 => Biome::Anomalous,
            6 => Biome::Lava,
            other => {
                log::warn!("Unknown biome id {}, using grass", other);
                Biome::Grass
            }
        }
    }

    /// Numeric id of the biome.
    pub fn id(self) -> u8 {
        match self {
            Biome::Grass => 0,
            Biome::Forest => 1,
            Biome::Desert => 2,
            Biome::Ice => 3,
            Biome::Techno => 4,
            Biome::Anomalous => 5,
            Biome::Lava => 6,
        }
    }

    /// Returns all biomes in id order.
    pub fn all() -> [Biome; 7] {
        [
            Biome::Grass,
            Biome::Forest,
            Biome::Desert,
            Biome::Ice,
            Biome::Techno,
            Biome::Anomalous,
            Biome::Lava,
        ]
    }
}

/// Rectangular hazard patch carved inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardZone {
    /// Section-local bounds of the patch
    pub area: Rect,
    /// What the patch is made of
    pub kind: HazardKind,
}

/// One independently generated sub-grid of the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapSection {
    /// Semantic classification of every section cell
    pub mask: TileMask,
    /// Accepted rooms in section-local coordinates
    pub rooms: Vec<Rect>,
    /// Palette used for every tile in the section
    pub biome: Biome,
    /// Translation of the section origin into the world grid
    pub world_offset: Position,
    /// Column in the section grid
    pub grid_x: u32,
    /// Row in the section grid
    pub grid_y: u32,
    /// Visual-only decorations (cells stay walkable)
    pub decorations: Vec<Position>,
    /// Hazard patches, section-local
    pub hazards: Vec<HazardZone>,
}

impl MapSection {
    /// Creates an empty section. The mask starts as `TileType::None`.
    pub fn new(
        width: u32,
        height: u32,
        biome: Biome,
        grid_x: u32,
        grid_y: u32,
        world_offset: Position,
    ) -> Self {
        Self {
            mask: TileMask::new(width, height),
            rooms: Vec::new(),
            biome,
            world_offset,
            grid_x,
            grid_y,
            decorations: Vec::new(),
            hazards: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.mask.width
    }

    pub fn height(&self) -> u32 {
        self.mask.height
    }

    /// Converts a section-local position to world coordinates.
    pub fn to_world(&self, local: Position) -> Position {
        local + self.world_offset
    }

    /// Converts a world position to section-local coordinates.
    pub fn to_local(&self, world: Position) -> Position {
        world - self.world_offset
    }

    /// Section extent in world coordinates.
    pub fn world_bounds(&self) -> Rect {
        self.mask.bounds().translated(self.world_offset)
    }

    /// Whether a section-local cell lies in a hazard patch.
    pub fn is_hazard(&self, local: Position) -> bool {
        self.hazards.iter().any(|h| h.area.contains(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_biome_ids_round_trip() {
        for biome in Biome::all() {
            assert_eq!(Biome::from_id(biome.id()), biome);
        }
    }

    #[test]
    fn test_section_coordinates() {
        let section = MapSection::new(20, 10, Biome::Ice, 1, 0, Position::new(24, 0));
        assert_eq!(section.to_world(Position::new(3, 4)), Position::new(27, 4));
        assert_eq!(section.to_local(Position::new(27, 4)), Position::new(3, 4));
        assert_eq!(section.world_bounds(), Rect::new(24, 0, 20, 10));
        assert!(section.rooms.is_empty());
    }
}
