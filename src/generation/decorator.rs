//! # Decorator
//!
//! Wall skin, room dressing and hazard patches for a section.

use crate::{
    Biome, BiomePalette, GeneratorSettings, HazardZone, MapSection, Position, Rect, TileMask,
    TileSink, TileType, DECORATION_ATLAS, FLOOR_ATLAS, WALL_ATLAS,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Rooms must be larger than this on both sides to receive decorations.
const MIN_DECORATED_ROOM_SIDE: i32 = 5;

/// `Background` cells 4-adjacent to walkable space, in row-major order.
///
/// These become the one-cell wall skin around every room and corridor.
pub fn wall_skin_candidates(mask: &TileMask) -> Vec<Position> {
    mask.iter()
        .filter(|(_, tile)| *tile == TileType::Background)
        .filter(|(pos, _)| {
            pos.cardinal_adjacent_positions()
                .iter()
                .any(|p| mask.is_walkable(*p))
        })
        .map(|(pos, _)| pos)
        .collect()
}

/// Adds walls, decorations, obstacles and hazards to sections.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub palette: BiomePalette,
    /// Share of decorations that become blocking obstacles
    pub obstacle_chance: f64,
    /// Hazard probability for biome 0
    pub hazard_base_chance: f64,
    /// Hazard probability added per biome id
    pub hazard_biome_step: f64,
}

impl Decorator {
    pub fn new(settings: &GeneratorSettings, palette: BiomePalette) -> Self {
        Self {
            palette,
            obstacle_chance: settings.obstacle_chance,
            hazard_base_chance: settings.hazard_base_chance,
            hazard_biome_step: settings.hazard_biome_step,
        }
    }

    /// Turns every `Background` cell next to a room or corridor into `Wall`
    /// and paints the biome wall tile on it. Returns the number of new walls.
    pub fn add_section_walls(
        &self,
        section: &mut MapSection,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> usize {
        let candidates = wall_skin_candidates(&section.mask);
        for &local in &candidates {
            if section.mask.set_tile(local, TileType::Wall).is_err() {
                continue;
            }
            let world = section.to_world(local);
            let tile = self.palette.wall_tile(section.biome, world, rng);
            sink.place_wall(world.x, world.y, WALL_ATLAS, tile);
        }
        candidates.len()
    }

    /// World-level wall skin: the same rule as [`Decorator::add_section_walls`]
    /// over a stitched mask, with the biome resolved per cell. Returns the new
    /// wall cells.
    pub fn add_walls_to_mask<F>(
        &self,
        mask: &mut TileMask,
        biome_at: F,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> Vec<Position>
    where
        F: Fn(Position) -> Biome,
    {
        let mut walls = wall_skin_candidates(mask);
        walls.retain(|pos| mask.set_tile(*pos, TileType::Wall).is_ok());
        for &pos in &walls {
            let tile = self.palette.wall_tile(biome_at(pos), pos, rng);
            sink.place_wall(pos.x, pos.y, WALL_ATLAS, tile);
        }
        walls
    }

    /// Scatters decorations inside rooms larger than 5x5.
    ///
    /// Each room gets between 1 and `area / 16` attempts at random interior
    /// cells. A cell within one step (including diagonals) of an existing
    /// decoration or obstacle is rejected. Returns the number placed.
    pub fn add_section_decorations_and_obstacles(
        &self,
        section: &mut MapSection,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> usize {
        let rooms: Vec<Rect> = section
            .rooms
            .iter()
            .copied()
            .filter(|r| r.width() > MIN_DECORATED_ROOM_SIDE && r.height() > MIN_DECORATED_ROOM_SIDE)
            .collect();

        let mut placed = 0;
        for room in rooms {
            let max_count = (room.area() / 16).max(1);
            let count = rng.gen_range(1..=max_count);
            let interior = room.grow(-1);

            for _ in 0..count {
                let pos = Position::new(
                    rng.gen_range(interior.position.x..interior.end().x),
                    rng.gen_range(interior.position.y..interior.end().y),
                );
                if section.mask.get(pos) != Some(TileType::Room) || self.is_crowded(section, pos) {
                    continue;
                }

                let blocking = rng.gen_bool(self.obstacle_chance.clamp(0.0, 1.0));
                if blocking {
                    if section.mask.set_tile(pos, TileType::Decoration).is_err() {
                        continue;
                    }
                } else {
                    section.decorations.push(pos);
                }

                let world = section.to_world(pos);
                let tile = self.palette.decoration_tile(section.biome, rng);
                sink.place_decoration(world.x, world.y, DECORATION_ATLAS, tile);
                placed += 1;
            }
        }
        placed
    }

    fn is_crowded(&self, section: &MapSection, pos: Position) -> bool {
        section.decorations.iter().any(|d| d.chebyshev_distance(pos) <= 1)
            || pos
                .adjacent_positions()
                .iter()
                .any(|p| section.mask.get(*p) == Some(TileType::Decoration))
    }

    /// Hazard probability for a section's biome.
    pub fn hazard_chance(&self, section: &MapSection) -> f64 {
        (self.hazard_base_chance + self.hazard_biome_step * section.biome.id() as f64).clamp(0.0, 1.0)
    }

    /// Possibly carves one rectangular hazard patch (2 to 4 cells per side)
    /// inside a random room. Returns whether a patch was placed.
    ///
    /// Hazard kinds with a wall overlay also get the overlay painted on the
    /// wall layer. Hazard cells stay `Room` in the mask.
    pub fn add_section_hazards(
        &self,
        section: &mut MapSection,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> bool {
        if section.rooms.is_empty() || !rng.gen_bool(self.hazard_chance(section)) {
            return false;
        }
        let Some(room) = section.rooms.choose(rng).copied() else {
            return false;
        };

        let interior = room.grow(-1);
        if interior.width() < 2 || interior.height() < 2 {
            return false;
        }
        let width = rng.gen_range(2..=4).min(interior.width());
        let height = rng.gen_range(2..=4).min(interior.height());
        let x = rng.gen_range(interior.position.x..=interior.end().x - width);
        let y = rng.gen_range(interior.position.y..=interior.end().y - height);
        let area = Rect::new(x, y, width, height);

        let kind = self.palette.hazard_for(section.biome);
        for local in area.positions() {
            let world = section.to_world(local);
            sink.place_floor(world.x, world.y, FLOOR_ATLAS, kind.floor_tile());
            if let Some(overlay) = kind.wall_overlay() {
                sink.place_wall(world.x, world.y, WALL_ATLAS, overlay);
            }
        }
        section.hazards.push(HazardZone { area, kind });
        log::debug!(
            "Hazard {:?} at {:?} in section ({}, {})",
            kind,
            area,
            section.grid_x,
            section.grid_y
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connectivity::label_components, AtlasCoord, HazardKind, NullSink, RecordingSink, SectionPainter};
    use rand::SeedableRng;

    fn decorator() -> Decorator {
        Decorator::new(&GeneratorSettings::for_testing(), BiomePalette::new(false))
    }

    fn section_with_room(biome: Biome, room: Rect) -> MapSection {
        let painter = SectionPainter::default();
        let mut section = MapSection::new(30, 30, biome, 0, 0, Position::origin());
        painter.fill_section_base_floor(&mut section, &mut NullSink);
        section.rooms.push(room);
        painter.create_section_room(&mut section, room, AtlasCoord::new(0, 0), &mut NullSink);
        section
    }

    #[test]
    fn test_single_room_gets_full_wall_ring() {
        let room = Rect::new(10, 10, 6, 4);
        let mut section = section_with_room(Biome::Grass, room);
        let mut rng = StdRng::seed_from_u64(1);

        let walls = decorator().add_section_walls(&mut section, &mut NullSink, &mut rng);

        // Orthogonal adjacency only: the ring has no corner cells.
        assert_eq!(walls, 2 * 6 + 2 * 4);
        for x in 10..16 {
            assert_eq!(section.mask.get(Position::new(x, 9)), Some(TileType::Wall));
            assert_eq!(section.mask.get(Position::new(x, 14)), Some(TileType::Wall));
        }
        for y in 10..14 {
            assert_eq!(section.mask.get(Position::new(9, y)), Some(TileType::Wall));
            assert_eq!(section.mask.get(Position::new(16, y)), Some(TileType::Wall));
        }
    }

    #[test]
    fn test_world_walls_use_biome_lookup() {
        let mut mask = TileMask::filled(10, 5, TileType::Background);
        for x in 1..9 {
            mask.set_tile(Position::new(x, 2), TileType::Corridor).unwrap();
        }
        let mut sink = RecordingSink::new(10, 5);
        let mut rng = StdRng::seed_from_u64(9);
        let biome_at = |p: Position| if p.x < 5 { Biome::Grass } else { Biome::Ice };

        let walls = decorator().add_walls_to_mask(&mut mask, biome_at, &mut sink, &mut rng);

        assert_eq!(walls.len(), 8 + 8 + 2);
        assert_eq!(sink.wall.get(2, 1).map(|(_, c)| c.y), Some(Biome::Grass.id()));
        assert_eq!(sink.wall.get(7, 3).map(|(_, c)| c.y), Some(Biome::Ice.id()));
    }

    #[test]
    fn test_decorations_keep_spacing_and_room_connected() {
        for seed in 0..20 {
            let room = Rect::new(4, 4, 16, 14);
            let mut section = section_with_room(Biome::Forest, room);
            let mut rng = StdRng::seed_from_u64(seed);
            let decorator = Decorator {
                obstacle_chance: 0.5,
                ..decorator()
            };

            let placed = decorator.add_section_decorations_and_obstacles(&mut section, &mut NullSink, &mut rng);

            let mut all = section.decorations.clone();
            all.extend(section.mask.positions_of(TileType::Decoration));
            assert_eq!(all.len(), placed);
            for (i, a) in all.iter().enumerate() {
                assert!(room.grow(-1).contains(*a));
                for b in all.iter().skip(i + 1) {
                    assert!(a.chebyshev_distance(*b) > 1);
                }
            }
            assert_eq!(label_components(&section.mask, TileType::is_walkable).count(), 1);
        }
    }

    #[test]
    fn test_small_rooms_are_not_decorated() {
        let mut section = section_with_room(Biome::Grass, Rect::new(4, 4, 5, 9));
        let mut rng = StdRng::seed_from_u64(2);
        let placed = decorator().add_section_decorations_and_obstacles(&mut section, &mut NullSink, &mut rng);
        assert_eq!(placed, 0);
    }

    #[test]
    fn test_lava_hazard_paints_wall_overlay() {
        let room = Rect::new(5, 5, 10, 10);
        let decorator = Decorator {
            hazard_base_chance: 1.0,
            ..decorator()
        };
        let mut section = section_with_room(Biome::Lava, room);
        let mut sink = RecordingSink::new(30, 30);
        let mut rng = StdRng::seed_from_u64(4);

        assert!(decorator.add_section_hazards(&mut section, &mut sink, &mut rng));

        let zone = section.hazards[0];
        assert_eq!(zone.kind, HazardKind::Lava);
        assert!(room.grow(-1).contains(zone.area.position));
        assert!((2..=4).contains(&zone.area.width()));
        for pos in zone.area.positions() {
            assert_eq!(section.mask.get(pos), Some(TileType::Room));
            assert_eq!(sink.wall.get(pos.x, pos.y), Some((WALL_ATLAS, HazardKind::Lava.wall_overlay().unwrap())));
        }
    }

    #[test]
    fn test_non_lava_hazard_has_no_overlay() {
        let decorator = Decorator {
            hazard_base_chance: 1.0,
            ..decorator()
        };
        let mut section = section_with_room(Biome::Ice, Rect::new(5, 5, 10, 10));
        let mut sink = RecordingSink::new(30, 30);
        let mut rng = StdRng::seed_from_u64(4);

        assert!(decorator.add_section_hazards(&mut section, &mut sink, &mut rng));
        assert_eq!(section.hazards[0].kind, HazardKind::ThinIce);
        assert_eq!(sink.wall.occupied(), 0);
    }

    #[test]
    fn test_hazard_chance_scales_with_biome() {
        let decorator = decorator();
        let grass = MapSection::new(10, 10, Biome::Grass, 0, 0, Position::origin());
        let lava = MapSection::new(10, 10, Biome::Lava, 0, 0, Position::origin());
        assert!((decorator.hazard_chance(&grass) - 0.2).abs() < 1e-9);
        assert!((decorator.hazard_chance(&lava) - 0.8).abs() < 1e-9);
    }
}
