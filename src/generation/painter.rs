//! # Section Painter
//!
//! Grid-to-tile writes for one section. Nothing here draws random numbers;
//! callers resolve any random tile choice before calling in.
//!
//! Order matters: the base floor goes down before rooms are stamped, and the
//! background wall fill runs after corridor carving so it never covers
//! corridor cells.

use crate::{AtlasCoord, BiomePalette, MapSection, Rect, TileSink, TileType, FLOOR_ATLAS, WALL_ATLAS};

/// Writes section masks and their matching floor/wall tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionPainter {
    pub palette: BiomePalette,
}

impl SectionPainter {
    pub fn new(palette: BiomePalette) -> Self {
        Self { palette }
    }

    /// Sets every cell of the section mask to `TileType::None`.
    pub fn reset_section_mask(&self, section: &mut MapSection) {
        section.mask.fill(TileType::None);
    }

    /// Classifies every cell as `Background` and paints the background tile.
    pub fn fill_section_base_floor(&self, section: &mut MapSection, sink: &mut dyn TileSink) {
        section.mask.fill(TileType::Background);
        let tile = self.palette.background_tile(section.biome);
        for local in section.mask.positions() {
            let world = section.to_world(local);
            sink.place_floor(world.x, world.y, FLOOR_ATLAS, tile);
        }
    }

    /// Stamps a room as `Room` cells and paints `floor` on them.
    ///
    /// Cells outside the section are skipped.
    pub fn create_section_room(
        &self,
        section: &mut MapSection,
        room: Rect,
        floor: AtlasCoord,
        sink: &mut dyn TileSink,
    ) {
        let mut clipped = 0usize;
        for local in room.positions() {
            if section.mask.set_tile(local, TileType::Room).is_err() {
                clipped += 1;
                continue;
            }
            let world = section.to_world(local);
            sink.place_floor(world.x, world.y, FLOOR_ATLAS, floor);
        }
        if clipped > 0 {
            log::trace!("Room {:?} clipped {} cells at the section edge", room, clipped);
        }
    }

    /// Paints the base wall tile on every cell that is still unclassified or
    /// plain background, and reclassifies `None` as `Background`.
    ///
    /// Rooms, corridors, wall skin and obstacles are left alone, so calling
    /// this twice produces the same writes both times.
    pub fn fill_section_with_background_tiles(
        &self,
        section: &mut MapSection,
        sink: &mut dyn TileSink,
    ) {
        let wall = self.palette.base_wall_tile(section.biome);
        section.mask.replace_all(TileType::None, TileType::Background);
        for local in section.mask.positions_of(TileType::Background) {
            let world = section.to_world(local);
            sink.place_wall(world.x, world.y, WALL_ATLAS, wall);
        }
    }
}
