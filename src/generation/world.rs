//! # Multi-Section World
//!
//! Lays sections out on a grid, stitches neighbours together with fixed
//! mid-edge connectors and assembles the world mask.
//!
//! Section masks are the source of truth until [`World::assemble`] runs.
//! After that the world mask is authoritative, and changes made to it are
//! copied back with [`World::mirror_into_sections`].

use crate::{
    carve_corridor_cell, Biome, BiomePalette, CorridorCarver, Decorator, Direction,
    GenerationParameters, GeneratorSettings, MapSection, Position, Rect, TileMask, TileSink,
    TileType, FLOOR_ATLAS, WALL_ATLAS,
};
use rand::rngs::StdRng;
use std::ops::Range;

pub(crate) fn biome_of(sections: &[MapSection], pos: Position) -> Biome {
    sections
        .iter()
        .min_by_key(|s| s.world_bounds().clamp(pos).distance_squared(pos))
        .map(|s| s.biome)
        .unwrap_or(Biome::Grass)
}

/// Sections arranged on a grid plus the stitched world mask.
#[derive(Debug, Clone)]
pub struct World {
    /// Stitched mask in world coordinates
    pub mask: TileMask,
    /// Sections in row-major grid order
    pub sections: Vec<MapSection>,
    pub columns: u32,
    pub rows: u32,
    /// Empty cells between neighbouring sections
    pub spacing: u32,
    /// Cells outside every section: bridges and their flanking walls
    gap_cells: Vec<(Position, TileType)>,
}

impl World {
    /// Creates empty sections with their world offsets.
    pub fn layout<F>(params: &GenerationParameters, spacing: u32, mut biome_for: F) -> Self
    where
        F: FnMut(u32, u32) -> Biome,
    {
        let (columns, rows) = (params.sections_x(), params.sections_y());
        let mut sections = Vec::with_capacity((columns * rows) as usize);
        for gy in 0..rows {
            for gx in 0..columns {
                let offset = Position::new(
                    (gx * (params.width + spacing)) as i32,
                    (gy * (params.height + spacing)) as i32,
                );
                sections.push(MapSection::new(
                    params.width,
                    params.height,
                    biome_for(gx, gy),
                    gx,
                    gy,
                    offset,
                ));
            }
        }

        let (width, height) = Self::dimensions(params, spacing);
        Self {
            mask: TileMask::filled(width, height, TileType::Background),
            sections,
            columns,
            rows,
            spacing,
            gap_cells: Vec::new(),
        }
    }

    /// World size for a section grid, spacing included.
    pub fn dimensions(params: &GenerationParameters, spacing: u32) -> (u32, u32) {
        let (columns, rows) = (params.sections_x(), params.sections_y());
        (
            columns * params.width + (columns - 1) * spacing,
            rows * params.height + (rows - 1) * spacing,
        )
    }

    pub fn width(&self) -> u32 {
        self.mask.width
    }

    pub fn height(&self) -> u32 {
        self.mask.height
    }

    pub fn section_index(&self, gx: u32, gy: u32) -> Option<usize> {
        (gx < self.columns && gy < self.rows).then(|| (gy * self.columns + gx) as usize)
    }

    pub fn section(&self, gx: u32, gy: u32) -> Option<&MapSection> {
        self.section_index(gx, gy).map(|idx| &self.sections[idx])
    }

    pub fn section_mut(&mut self, gx: u32, gy: u32) -> Option<&mut MapSection> {
        let idx = self.section_index(gx, gy)?;
        Some(&mut self.sections[idx])
    }

    /// Index of the section containing a world position.
    pub fn section_at(&self, pos: Position) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.world_bounds().contains(pos))
    }

    /// Biome of the section containing `pos`, or of the nearest section for
    /// cells in the gaps.
    pub fn biome_at(&self, pos: Position) -> Biome {
        biome_of(&self.sections, pos)
    }

    /// Every room in world coordinates.
    pub fn rooms(&self) -> Vec<Rect> {
        self.sections
            .iter()
            .flat_map(|s| s.rooms.iter().map(move |r| r.translated(s.world_offset)))
            .collect()
    }

    pub fn room_count(&self) -> usize {
        self.sections.iter().map(|s| s.rooms.len()).sum()
    }

    /// Every hazard patch in world coordinates.
    pub fn hazard_areas(&self) -> Vec<Rect> {
        self.sections
            .iter()
            .flat_map(|s| s.hazards.iter().map(move |h| h.area.translated(s.world_offset)))
            .collect()
    }

    /// Whether a world cell lies in a hazard patch.
    pub fn is_hazard(&self, pos: Position) -> bool {
        self.section_at(pos)
            .map(|idx| {
                let section = &self.sections[idx];
                section.is_hazard(section.to_local(pos))
            })
            .unwrap_or(false)
    }

    /// Overlay decorations in world coordinates.
    pub fn decorations(&self) -> Vec<Position> {
        self.sections
            .iter()
            .flat_map(|s| s.decorations.iter().map(move |d| s.to_world(*d)))
            .collect()
    }

    /// Rebuilds the world mask from the section masks and the gap cells.
    pub fn assemble(&mut self) {
        self.mask.fill(TileType::Background);
        for section in &self.sections {
            self.mask.blit(&section.mask, section.world_offset);
        }
        for &(pos, tile) in &self.gap_cells {
            if self.mask.set_tile(pos, tile).is_err() {
                log::trace!("Gap cell {:?} outside the world", pos);
            }
        }
    }

    /// Copies the world mask back into every section mask.
    pub fn mirror_into_sections(&mut self) {
        for section in &mut self.sections {
            section.mask.copy_region(&self.mask, section.world_offset);
        }
    }
}

/// Connector stub carved into one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stub {
    /// Innermost carved cell, section-local
    pub tip: Position,
    /// The stub ran into walkable space
    pub touched: bool,
}

/// Outcome of stitching two neighbouring sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorReport {
    pub from: (u32, u32),
    pub to: (u32, u32),
    /// Whether each side reached a room, directly or by welding
    pub reached: [bool; 2],
}

impl ConnectorReport {
    pub fn welded_to_room(&self) -> bool {
        self.reached.iter().all(|r| *r)
    }
}

/// Lays out sections and stitches them together.
#[derive(Debug, Clone)]
pub struct MultiSectionCoordinator {
    pub spacing: u32,
    /// Connector width, never below 3
    pub connector_width: u32,
    pub carver: CorridorCarver,
    pub decorator: Decorator,
    pub palette: BiomePalette,
}

impl MultiSectionCoordinator {
    pub fn new(params: &GenerationParameters, settings: &GeneratorSettings, palette: BiomePalette) -> Self {
        Self {
            spacing: settings.section_spacing,
            connector_width: settings.effective_connector_width(),
            carver: CorridorCarver::new(params, settings, palette),
            decorator: Decorator::new(settings, palette),
            palette,
        }
    }

    /// Stitches every pair of neighbouring sections, assembles the world mask
    /// and refreshes the wall skin around the new connectors.
    pub fn stitch(&self, world: &mut World, sink: &mut dyn TileSink, rng: &mut StdRng) -> Vec<ConnectorReport> {
        let mut reports = Vec::new();
        for gy in 0..world.rows {
            for gx in 0..world.columns {
                if let Some(report) = self.connect_sections_horizontally(world, gx, gy, sink, rng) {
                    reports.push(report);
                }
                if let Some(report) = self.connect_sections_vertically(world, gx, gy, sink, rng) {
                    reports.push(report);
                }
            }
        }

        world.assemble();
        if !reports.is_empty() {
            let sections = &world.sections;
            self.decorator
                .add_walls_to_mask(&mut world.mask, |p| biome_of(sections, p), sink, rng);
            world.mirror_into_sections();
        }
        reports
    }

    /// Connects section `(gx, gy)` to its right-hand neighbour. Returns `None`
    /// when there is no neighbour.
    pub fn connect_sections_horizontally(
        &self,
        world: &mut World,
        gx: u32,
        gy: u32,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> Option<ConnectorReport> {
        let first = world.section_index(gx, gy)?;
        let second = world.section_index(gx + 1, gy)?;
        Some(self.connect_pair(world, first, second, Direction::East, sink, rng))
    }

    /// Connects section `(gx, gy)` to the neighbour below it. Returns `None`
    /// when there is no neighbour.
    pub fn connect_sections_vertically(
        &self,
        world: &mut World,
        gx: u32,
        gy: u32,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> Option<ConnectorReport> {
        let first = world.section_index(gx, gy)?;
        let second = world.section_index(gx, gy + 1)?;
        Some(self.connect_pair(world, first, second, Direction::South, sink, rng))
    }

    /// Offsets across the connector, centred on the middle of the edge.
    fn band(&self, across_len: u32) -> Range<i32> {
        let width = self.connector_width.min(across_len) as i32;
        let start = across_len as i32 / 2 - width / 2;
        start..start + width
    }

    fn connect_pair(
        &self,
        world: &mut World,
        first: usize,
        second: usize,
        toward: Direction,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> ConnectorReport {
        let horizontal = toward.is_horizontal();
        let mut reached = [false; 2];

        for (slot, (idx, edge)) in [(first, toward), (second, toward.opposite())].into_iter().enumerate() {
            let section = &mut world.sections[idx];
            let stub = self.extend_stub(section, edge, sink, rng);
            reached[slot] = stub.touched
                || self.carver.find_and_connect_to_nearby_rooms(
                    section,
                    stub.tip,
                    horizontal,
                    self.connector_width,
                    sink,
                    rng,
                );
        }

        let gap = self.bridge_gap(&world.sections[first], &world.sections[second], horizontal, sink);
        world.gap_cells.extend(gap);

        let a = &world.sections[first];
        let b = &world.sections[second];
        let report = ConnectorReport {
            from: (a.grid_x, a.grid_y),
            to: (b.grid_x, b.grid_y),
            reached,
        };
        log::debug!(
            "Connected section {:?} to {:?} (reached rooms: {:?})",
            report.from,
            report.to,
            report.reached
        );
        report
    }

    /// Carves a connector stub from the `edge` side of a section inward until
    /// it meets walkable space or reaches the section centre.
    fn extend_stub(
        &self,
        section: &mut MapSection,
        edge: Direction,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> Stub {
        let (w, h) = (section.width() as i32, section.height() as i32);
        let horizontal = edge.is_horizontal();
        let band = self.band(if horizontal { h as u32 } else { w as u32 });
        let mid = (band.start + band.end) / 2;
        let along_len = if horizontal { w } else { h };

        let steps: Vec<i32> = match edge {
            Direction::East | Direction::South => (along_len / 2..along_len).rev().collect(),
            Direction::West | Direction::North => (0..=along_len / 2).collect(),
        };
        let cell = |along: i32, across: i32| {
            if horizontal {
                Position::new(along, across)
            } else {
                Position::new(across, along)
            }
        };

        let floor = self.palette.floor_tile(section.biome, rng);
        let mut stub = Stub {
            tip: cell(steps[0], mid),
            touched: false,
        };
        for along in steps {
            if band.clone().any(|a| section.mask.is_walkable(cell(along, a))) {
                stub.touched = true;
                break;
            }
            for across in band.clone() {
                carve_corridor_cell(section, cell(along, across), floor, sink);
            }
            stub.tip = cell(along, mid);
            let flanks = [cell(along, band.start - 1), cell(along, band.end)];
            if flanks.iter().any(|p| section.mask.is_walkable(*p)) {
                stub.touched = true;
                break;
            }
        }
        stub
    }

    /// Bridge tiles across the gap between two sections, flanked by walls.
    fn bridge_gap(
        &self,
        first: &MapSection,
        second: &MapSection,
        horizontal: bool,
        sink: &mut dyn TileSink,
    ) -> Vec<(Position, TileType)> {
        let bounds = first.world_bounds();
        let (along, band) = if horizontal {
            (
                bounds.end().x..second.world_offset.x,
                self.band(first.height()),
            )
        } else {
            (
                bounds.end().y..second.world_offset.y,
                self.band(first.width()),
            )
        };
        let across_origin = if horizontal { bounds.position.y } else { bounds.position.x };
        let cell = |a: i32, c: i32| {
            if horizontal {
                Position::new(a, across_origin + c)
            } else {
                Position::new(across_origin + c, a)
            }
        };

        let bridge = self.palette.bridge_tile(horizontal, self.connector_width);
        let wall = self.palette.base_wall_tile(first.biome);
        let mut cells = Vec::new();
        for a in along {
            for c in band.clone() {
                let pos = cell(a, c);
                sink.place_floor(pos.x, pos.y, FLOOR_ATLAS, bridge);
                sink.erase_wall(pos.x, pos.y);
                cells.push((pos, TileType::Corridor));
            }
            for c in [band.start - 1, band.end] {
                let pos = cell(a, c);
                sink.place_wall(pos.x, pos.y, WALL_ATLAS, wall);
                cells.push((pos, TileType::Wall));
            }
        }
        cells
    }
}
