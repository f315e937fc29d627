//! # Corridor Carving
//!
//! Connects the rooms of a section with L-shaped tunnels.
//!
//! Rooms are ordered along the diagonal (`x + y`) and each one is joined to
//! its successor, wrapping around, so every section's rooms form at least a
//! ring. Random extra edges add loops on top of the ring.

use crate::{
    AtlasCoord, BiomePalette, GenerationParameters, GeneratorSettings, MapSection, Position,
    Rect, TileSink, TileType, FLOOR_ATLAS,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Carves one corridor cell in a section.
///
/// Marks the cell `Corridor`, paints the floor and clears any wall tile.
/// `Room` cells and obstacles are left as they are. Returns `false` when the
/// cell is outside the section and was skipped.
pub fn carve_corridor_cell(
    section: &mut MapSection,
    local: Position,
    floor: AtlasCoord,
    sink: &mut dyn TileSink,
) -> bool {
    match section.mask.get(local) {
        None => false,
        Some(TileType::Room) | Some(TileType::Decoration) => true,
        Some(_) => {
            if section.mask.set_tile(local, TileType::Corridor).is_err() {
                return false;
            }
            let world = section.to_world(local);
            sink.place_floor(world.x, world.y, FLOOR_ATLAS, floor);
            sink.erase_wall(world.x, world.y);
            true
        }
    }
}

/// Connects rooms inside a section.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorCarver {
    /// Width of every tunnel leg
    pub corridor_width: u32,
    /// Probability of an extra edge per room
    pub extra_edge_chance: f64,
    /// Largest gap `find_and_connect_to_nearby_rooms` will bridge
    pub nearby_room_threshold: u32,
    pub palette: BiomePalette,
}

impl CorridorCarver {
    pub fn new(params: &GenerationParameters, settings: &GeneratorSettings, palette: BiomePalette) -> Self {
        Self {
            corridor_width: params.corridor_width.unwrap_or(settings.corridor_width).max(1),
            extra_edge_chance: settings.extra_edge_chance,
            nearby_room_threshold: settings.nearby_room_threshold,
            palette,
        }
    }

    /// Connects the section's rooms in a diagonal-ordered ring plus random
    /// extra edges. Returns the number of tunnels carved.
    ///
    /// Sections with fewer than two rooms are left untouched.
    pub fn connect_section_rooms(
        &self,
        section: &mut MapSection,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> usize {
        let n = section.rooms.len();
        if n < 2 {
            log::debug!(
                "Section ({}, {}) has {} room(s), nothing to connect",
                section.grid_x,
                section.grid_y,
                n
            );
            return 0;
        }

        let mut ordered: Vec<Rect> = section.rooms.clone();
        ordered.sort_by_key(|room| room.position.x + room.position.y);

        let mut tunnels = 0;
        for i in 0..n {
            // With two rooms the wrap edge would repeat the only edge.
            if n == 2 && i == 1 {
                break;
            }
            let next = (i + 1) % n;
            self.connect_rooms(section, &ordered[i], &ordered[next], sink, rng);
            tunnels += 1;
        }

        for i in 0..n {
            if !rng.gen_bool(self.extra_edge_chance.clamp(0.0, 1.0)) {
                continue;
            }
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            let candidates: Vec<usize> = (0..n).filter(|&k| k != i && k != prev && k != next).collect();
            if let Some(&target) = candidates.choose(rng) {
                self.connect_rooms(section, &ordered[i], &ordered[target], sink, rng);
                tunnels += 1;
            }
        }

        tunnels
    }

    fn connect_rooms(
        &self,
        section: &mut MapSection,
        a: &Rect,
        b: &Rect,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) {
        let floor = self.palette.floor_tile(section.biome, rng);
        let horizontal_first = rng.gen_bool(0.5);
        self.carve_l_tunnel(section, a.center(), b.center(), horizontal_first, floor, sink);
    }

    /// Carves an L-shaped tunnel from `from` to `to`.
    pub fn carve_l_tunnel(
        &self,
        section: &mut MapSection,
        from: Position,
        to: Position,
        horizontal_first: bool,
        floor: AtlasCoord,
        sink: &mut dyn TileSink,
    ) {
        if horizontal_first {
            self.carve_horizontal(section, from.x, to.x, from.y, floor, sink);
            self.carve_vertical(section, from.y, to.y, to.x, floor, sink);
        } else {
            self.carve_vertical(section, from.y, to.y, from.x, floor, sink);
            self.carve_horizontal(section, from.x, to.x, to.y, floor, sink);
        }
    }

    /// Offsets of a leg's cross-section around its centre line.
    fn band(&self) -> std::ops::Range<i32> {
        let width = self.corridor_width as i32;
        let half = width / 2;
        -half..width - half
    }

    /// Carves a horizontal leg, extended by the band on both ends so corners
    /// of wide tunnels come out square.
    fn carve_horizontal(
        &self,
        section: &mut MapSection,
        x1: i32,
        x2: i32,
        y: i32,
        floor: AtlasCoord,
        sink: &mut dyn TileSink,
    ) {
        let band = self.band();
        for x in (x1.min(x2) + band.start)..(x1.max(x2) + band.end) {
            for offset in band.clone() {
                carve_corridor_cell(section, Position::new(x, y + offset), floor, sink);
            }
        }
    }

    fn carve_vertical(
        &self,
        section: &mut MapSection,
        y1: i32,
        y2: i32,
        x: i32,
        floor: AtlasCoord,
        sink: &mut dyn TileSink,
    ) {
        let band = self.band();
        for y in (y1.min(y2) + band.start)..(y1.max(y2) + band.end) {
            for offset in band.clone() {
                carve_corridor_cell(section, Position::new(x + offset, y), floor, sink);
            }
        }
    }

    /// Welds a connector stub to the nearest room.
    ///
    /// `tip` is the innermost stub cell (section-local) and `horizontal` the
    /// stub's direction. If the closest room edge is within
    /// `nearby_room_threshold` cells, a connector is carved perpendicular to
    /// the stub first, then along it, ending on the room edge. Returns whether
    /// the stub now reaches a room.
    pub fn find_and_connect_to_nearby_rooms(
        &self,
        section: &mut MapSection,
        tip: Position,
        horizontal: bool,
        width: u32,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> bool {
        let nearest = section
            .rooms
            .iter()
            .map(|room| {
                let edge = room.clamp(tip);
                (tip.manhattan_distance(edge), edge)
            })
            .filter(|(gap, _)| *gap <= self.nearby_room_threshold)
            .min_by_key(|(gap, _)| *gap);

        let Some((gap, edge)) = nearest else {
            log::debug!(
                "No room within {} cells of connector tip {:?} in section ({}, {})",
                self.nearby_room_threshold,
                tip,
                section.grid_x,
                section.grid_y
            );
            return false;
        };
        if gap == 0 {
            return true;
        }

        let floor = self.palette.floor_tile(section.biome, rng);
        let welder = CorridorCarver {
            corridor_width: width.max(1),
            ..self.clone()
        };
        // Perpendicular leg first.
        welder.carve_l_tunnel(section, tip, edge, !horizontal, floor, sink);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        connectivity::label_components, Biome, NullSink, SectionPainter, TileMask,
    };
    use rand::SeedableRng;

    fn carver(width: u32) -> CorridorCarver {
        CorridorCarver {
            corridor_width: width,
            extra_edge_chance: 0.3,
            nearby_room_threshold: 10,
            palette: BiomePalette::new(false),
        }
    }

    fn section_with_rooms(rooms: &[Rect]) -> MapSection {
        let painter = SectionPainter::default();
        let mut section = MapSection::new(60, 40, Biome::Techno, 0, 0, Position::origin());
        let mut sink = NullSink;
        painter.fill_section_base_floor(&mut section, &mut sink);
        for room in rooms {
            section.rooms.push(*room);
            painter.create_section_room(&mut section, *room, AtlasCoord::new(0, 4), &mut sink);
        }
        section
    }

    fn walkable_components(mask: &TileMask) -> usize {
        label_components(mask, TileType::is_walkable).count()
    }

    #[test]
    fn test_single_room_is_noop() {
        let mut section = section_with_rooms(&[Rect::new(5, 5, 8, 8)]);
        let before = section.mask.clone();
        let mut rng = StdRng::seed_from_u64(1);

        let tunnels = carver(2).connect_section_rooms(&mut section, &mut NullSink, &mut rng);

        assert_eq!(tunnels, 0);
        assert_eq!(section.mask, before);
    }

    #[test]
    fn test_rooms_end_up_connected() {
        let rooms = [
            Rect::new(3, 3, 6, 6),
            Rect::new(30, 4, 8, 6),
            Rect::new(10, 25, 7, 7),
            Rect::new(45, 28, 8, 8),
        ];
        for seed in 0..10 {
            let mut section = section_with_rooms(&rooms);
            let room_cells = section.mask.count(TileType::Room);
            let mut rng = StdRng::seed_from_u64(seed);

            let tunnels = carver(2).connect_section_rooms(&mut section, &mut NullSink, &mut rng);

            assert!(tunnels >= 4);
            assert_eq!(walkable_components(&section.mask), 1);
            assert_eq!(section.mask.count(TileType::Room), room_cells);
        }
    }

    #[test]
    fn test_two_rooms_get_one_tunnel() {
        let mut section = section_with_rooms(&[Rect::new(3, 3, 6, 6), Rect::new(30, 20, 6, 6)]);
        let mut rng = StdRng::seed_from_u64(5);
        let tunnels = carver(1).connect_section_rooms(&mut section, &mut NullSink, &mut rng);
        assert_eq!(tunnels, 1);
        assert_eq!(walkable_components(&section.mask), 1);
    }

    #[test]
    fn test_tunnel_is_clipped_at_edges() {
        let mut section = section_with_rooms(&[]);
        carver(3).carve_l_tunnel(
            &mut section,
            Position::new(0, 0),
            Position::new(59, 39),
            true,
            AtlasCoord::new(0, 4),
            &mut NullSink,
        );
        assert!(section.mask.count(TileType::Corridor) > 0);
        assert_eq!(section.mask.get(Position::new(59, 39)), Some(TileType::Corridor));
    }

    #[test]
    fn test_weld_to_nearby_room() {
        let mut section = section_with_rooms(&[Rect::new(20, 10, 8, 8)]);
        let mut rng = StdRng::seed_from_u64(3);
        // Horizontal stub ending at x = 14 on row 20, below-left of the room.
        let welded = carver(1).find_and_connect_to_nearby_rooms(
            &mut section,
            Position::new(14, 20),
            true,
            1,
            &mut NullSink,
            &mut rng,
        );
        assert!(welded);
        section.mask.set_tile(Position::new(14, 20), TileType::Corridor).unwrap();
        assert_eq!(walkable_components(&section.mask), 1);
    }

    #[test]
    fn test_weld_ignores_distant_rooms() {
        let mut section = section_with_rooms(&[Rect::new(45, 25, 8, 8)]);
        let before = section.mask.clone();
        let mut rng = StdRng::seed_from_u64(3);
        let welded = carver(1).find_and_connect_to_nearby_rooms(
            &mut section,
            Position::new(2, 2),
            true,
            3,
            &mut NullSink,
            &mut rng,
        );
        assert!(!welded);
        assert_eq!(section.mask, before);
    }
}
