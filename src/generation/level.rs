//! # Level Pipeline
//!
//! Runs every stage in order for one seed:
//!
//! 1. lay out sections and generate each one (rooms, corridors, walls,
//!    decorations, hazards)
//! 2. stitch neighbouring sections and assemble the world mask
//! 3. repair or prune fragmented walkable space
//! 4. choose the spawn and any extra spawn points
//! 5. place containers, pickups and resource nodes
//!
//! The only error a caller can see is [`SectorError::InvalidParameters`];
//! any valid parameter set produces a level.

use crate::{
    config, connect_walkable_network, create_rng, label_components,
    preserve_largest_walkable_component, repair_isolated_components, Biome, BiomePalette,
    ContainerPlacer, CorridorCarver, Decorator, EntityPlacer, FanoutSink, GenerationEvent,
    GenerationObserver, GenerationParameters, Generator, GeneratorSettings, MapSection,
    MultiSectionCoordinator, NullSink, ObserverList, PlacedEntity, PlacementCatalog,
    PlacementContext, Position, Rect, RecordingSink, RepairPolicy, RepairReport, ResourcePlacer,
    RoomPlacer, SectionPainter, SectorError, SectorResult, SpawnPlanner, TileMask, TileSink,
    TileType, World, FLOOR_ATLAS, WALL_ATLAS,
};
use super::world::biome_of;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A finished level, owned by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub width: u32,
    pub height: u32,
    /// Requested biome
    pub biome: Biome,
    pub seed: u64,
    pub spawn: Position,
    /// Extra spawn tiles, one per world quadrant at most
    pub spawn_points: Vec<Position>,
    pub room_count: usize,
    /// Rooms in world coordinates
    pub rooms: Vec<Rect>,
    /// Hazard patches in world coordinates
    pub hazards: Vec<Rect>,
    /// Final semantic classification of every world cell
    pub mask: TileMask,
    /// Floor layer, 3 bytes per cell (see [`crate::TileLayer::to_bytes`])
    pub floor_layer: Vec<u8>,
    pub wall_layer: Vec<u8>,
    pub decoration_layer: Vec<u8>,
    pub entities: Vec<PlacedEntity>,
    pub containers: Vec<PlacedEntity>,
    pub resources: Vec<PlacedEntity>,
}

impl LevelData {
    pub fn to_json(&self) -> SectorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SectorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the level as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> SectorResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Number of placed entities of every kind.
    pub fn entity_count(&self) -> usize {
        self.entities.len() + self.containers.len() + self.resources.len()
    }

    /// ASCII map with `@` marking the spawn.
    pub fn to_ascii(&self) -> String {
        let mut out = String::new();
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let pos = Position::new(x, y);
                if pos == self.spawn {
                    out.push('@');
                } else {
                    out.push(self.mask.tile_or_none(pos).glyph());
                }
            }
            out.push('\n');
        }
        out
    }
}

/// Generates complete levels.
///
/// # Examples
///
/// ```
/// use sectorgen::{GenerationParameters, LevelGenerator, TileType};
///
/// let generator = LevelGenerator::default();
/// let level = generator.generate_level(&GenerationParameters::for_testing(7)).unwrap();
/// assert_eq!(level.mask.get(level.spawn), Some(TileType::Room));
/// ```
#[derive(Debug, Default)]
pub struct LevelGenerator {
    pub settings: GeneratorSettings,
    pub catalog: PlacementCatalog,
    observers: ObserverList,
}

impl LevelGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self {
            settings,
            catalog: PlacementCatalog::standard(),
            observers: ObserverList::new(),
        }
    }

    pub fn with_catalog(mut self, catalog: PlacementCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Registers an observer for [`GenerationEvent`]s.
    pub fn register_observer(&mut self, observer: impl GenerationObserver + 'static) {
        self.observers.register(observer);
    }

    /// Seeds a fresh RNG from the parameters and generates a level.
    pub fn generate_level(&self, params: &GenerationParameters) -> SectorResult<LevelData> {
        let mut rng = create_rng(params);
        self.generate(params, &mut rng)
    }

    /// Generates a level, forwarding every tile write to `sink` as well.
    pub fn generate_with_sink(
        &self,
        params: &GenerationParameters,
        rng: &mut StdRng,
        sink: &mut dyn TileSink,
    ) -> SectorResult<LevelData> {
        params.validate()?;
        let (width, height) = World::dimensions(params, self.settings.section_spacing);
        let mut recorder = RecordingSink::new(width, height);

        let mut level = {
            let mut fanout = FanoutSink::new(&mut recorder, &mut *sink);
            self.run(params, rng, &mut fanout)
        };
        level.floor_layer = recorder.floor.to_bytes();
        level.wall_layer = recorder.wall.to_bytes();
        level.decoration_layer = recorder.decoration.to_bytes();

        if let Err(err) = self.validate(&level, params) {
            log::warn!("Level for seed {} failed validation: {}", params.seed, err);
        }
        Ok(level)
    }

    fn run(&self, params: &GenerationParameters, rng: &mut StdRng, sink: &mut dyn TileSink) -> LevelData {
        log::info!(
            "Generating level: seed {}, {}x{} sections of {}x{}, biome {}",
            params.seed,
            params.sections_x(),
            params.sections_y(),
            params.width,
            params.height,
            params.biome
        );

        let settings = &self.settings;
        let palette = BiomePalette::new(settings.varied_walls);
        let requested = Biome::from_id(params.biome);
        let mut world = World::layout(params, settings.section_spacing, |gx, gy| {
            if settings.mixed_biomes && (gx, gy) != (0, 0) {
                *Biome::all().choose(&mut *rng).unwrap_or(&requested)
            } else {
                requested
            }
        });

        let stages = SectionStages::new(params, settings, palette);
        for section in &mut world.sections {
            self.generate_section(section, &stages, sink, rng);
        }
        if world.room_count() == 0 {
            self.stamp_fallback_room(&mut world.sections[0], params, &stages, sink, rng);
        }

        let coordinator = MultiSectionCoordinator::new(params, settings, palette);
        for report in coordinator.stitch(&mut world, sink, rng) {
            self.observers.emit(GenerationEvent::SectionsConnected {
                from: report.from,
                to: report.to,
                welded_to_room: report.welded_to_room(),
            });
        }

        let repair = self.repair(&mut world, &stages, sink, rng);
        self.observers.emit(GenerationEvent::ConnectivityRepaired {
            components_connected: repair.components_connected,
            cells_carved: repair.carved.len(),
            cells_pruned: repair.pruned.len(),
        });

        let hazards = world.hazard_areas();
        let planner = SpawnPlanner::new(&world.mask).with_hazards(hazards.clone());
        let (spawn, score) = match planner.find_best_spawn() {
            Some(best) => (best.position, best.score),
            None => (fallback_spawn(&world.mask, &hazards), 0),
        };
        self.observers.emit(GenerationEvent::SpawnChosen { position: spawn, score });
        let spawn_points = planner.find_spawn_points(settings.extra_spawn_points as usize, Some(spawn));

        let mut ctx = PlacementContext::new(&world, spawn);
        let containers = ContainerPlacer {
            chance: settings.container_chance,
        }
        .place(&mut ctx, &self.catalog, rng);
        let entities = EntityPlacer {
            density: settings.item_density,
        }
        .place(&mut ctx, &self.catalog, rng);
        let resources = ResourcePlacer {
            density: settings.resource_density,
        }
        .place(&mut ctx, &self.catalog, rng);

        let level = LevelData {
            width: world.width(),
            height: world.height(),
            biome: requested,
            seed: params.seed,
            spawn,
            spawn_points,
            room_count: world.room_count(),
            rooms: world.rooms(),
            hazards,
            mask: world.mask.clone(),
            floor_layer: Vec::new(),
            wall_layer: Vec::new(),
            decoration_layer: Vec::new(),
            entities,
            containers,
            resources,
        };
        self.observers.emit(GenerationEvent::LevelGenerated {
            width: level.width,
            height: level.height,
            rooms: level.room_count,
            entities: level.entity_count(),
        });
        log::info!(
            "Level ready: {}x{}, {} rooms, spawn {:?} (score {}), {} entities",
            level.width,
            level.height,
            level.room_count,
            spawn,
            score,
            level.entity_count()
        );
        level
    }

    /// Runs the local pipeline of one section.
    fn generate_section(
        &self,
        section: &mut MapSection,
        stages: &SectionStages,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) {
        let painter = &stages.painter;
        painter.reset_section_mask(section);
        painter.fill_section_base_floor(section, sink);

        let attempts = stages.rooms.generate_section_rooms(section, rng, |section, room, rng| {
            let floor = stages.palette.floor_tile(section.biome, rng);
            painter.create_section_room(section, room, floor, sink);
            self.observers.emit(GenerationEvent::RoomAccepted {
                grid_x: section.grid_x,
                grid_y: section.grid_y,
                room,
            });
        });

        stages.corridors.connect_section_rooms(section, sink, rng);
        painter.fill_section_with_background_tiles(section, sink);
        stages.decorator.add_section_walls(section, sink, rng);
        stages.decorator.add_section_decorations_and_obstacles(section, sink, rng);
        stages.decorator.add_section_hazards(section, sink, rng);

        self.observers.emit(GenerationEvent::SectionGenerated {
            grid_x: section.grid_x,
            grid_y: section.grid_y,
            rooms: section.rooms.len(),
            attempts,
        });
    }

    /// Stamps one centred room when no section managed to place any.
    fn stamp_fallback_room(
        &self,
        section: &mut MapSection,
        params: &GenerationParameters,
        stages: &SectionStages,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) {
        let margin = config::ROOM_EDGE_MARGIN;
        let width = (params.min_room_size as i32).min(section.width() as i32 - 2 * margin);
        let height = (params.min_room_size as i32).min(section.height() as i32 - 2 * margin);
        let room = Rect::new(
            (section.width() as i32 - width) / 2,
            (section.height() as i32 - height) / 2,
            width,
            height,
        );
        log::warn!("No rooms placed for seed {}, stamping fallback room {:?}", params.seed, room);

        let floor = stages.palette.floor_tile(section.biome, rng);
        stages.painter.create_section_room(section, room, floor, sink);
        for local in room.positions() {
            let world = section.to_world(local);
            sink.erase_wall(world.x, world.y);
        }
        section.rooms.push(room);
        stages.decorator.add_section_walls(section, sink, rng);
    }

    /// Applies the repair policy to the stitched world and repaints the
    /// affected cells.
    fn repair(
        &self,
        world: &mut World,
        stages: &SectionStages,
        sink: &mut dyn TileSink,
        rng: &mut StdRng,
    ) -> RepairReport {
        let mut report = RepairReport::default();
        match self.settings.repair_policy {
            RepairPolicy::Connect => {
                report.merge(repair_isolated_components(&mut world.mask));
                report.merge(connect_walkable_network(&mut world.mask));
            }
            RepairPolicy::Prune => {
                report.pruned = preserve_largest_walkable_component(&mut world.mask);
            }
        }
        if report.is_empty() {
            return report;
        }

        for &pos in &report.carved {
            let floor = stages.palette.floor_tile(world.biome_at(pos), rng);
            sink.place_floor(pos.x, pos.y, FLOOR_ATLAS, floor);
            sink.erase_wall(pos.x, pos.y);
        }
        for &pos in &report.pruned {
            let wall = stages.palette.base_wall_tile(world.biome_at(pos));
            sink.place_wall(pos.x, pos.y, WALL_ATLAS, wall);
        }

        let sections = &world.sections;
        stages
            .decorator
            .add_walls_to_mask(&mut world.mask, |p| biome_of(sections, p), sink, rng);
        world.mirror_into_sections();
        if !report.pruned.is_empty() {
            for section in &mut world.sections {
                let mask = &section.mask;
                section
                    .rooms
                    .retain(|room| room.positions().any(|p| mask.get(p) == Some(TileType::Room)));
            }
        }

        log::debug!(
            "Repair connected {} components, carved {} cells, pruned {} cells",
            report.components_connected,
            report.carved.len(),
            report.pruned.len()
        );
        report
    }
}

/// Per-run stage objects shared by every section.
struct SectionStages {
    palette: BiomePalette,
    painter: SectionPainter,
    rooms: RoomPlacer,
    corridors: CorridorCarver,
    decorator: Decorator,
}

impl SectionStages {
    fn new(params: &GenerationParameters, settings: &GeneratorSettings, palette: BiomePalette) -> Self {
        Self {
            palette,
            painter: SectionPainter::new(palette),
            rooms: RoomPlacer::new(params, settings),
            corridors: CorridorCarver::new(params, settings, palette),
            decorator: Decorator::new(settings, palette),
        }
    }
}

/// Spawn used when no tile passes the safety score: the most open `Room`
/// cell outside any hazard, or the world centre when no such cell exists.
fn fallback_spawn(mask: &TileMask, hazards: &[Rect]) -> Position {
    let mut best: Option<(usize, Position)> = None;
    for pos in mask.positions_of(TileType::Room) {
        if hazards.iter().any(|h| h.contains(pos)) {
            continue;
        }
        let open = mask.walkable_neighbors(pos);
        if best.map_or(true, |(b, _)| open > b) {
            best = Some((open, pos));
        }
    }
    best.map(|(_, pos)| pos)
        .unwrap_or_else(|| Position::new(mask.width as i32 / 2, mask.height as i32 / 2))
}

impl Generator<LevelData> for LevelGenerator {
    fn generate(&self, params: &GenerationParameters, rng: &mut StdRng) -> SectorResult<LevelData> {
        self.generate_with_sink(params, rng, &mut NullSink)
    }

    fn validate(&self, level: &LevelData, _params: &GenerationParameters) -> SectorResult<()> {
        if level.mask.get(level.spawn) != Some(TileType::Room) {
            return Err(SectorError::GenerationFailed(format!(
                "spawn {:?} is not on a room cell",
                level.spawn
            )));
        }
        let components = label_components(&level.mask, TileType::is_walkable);
        if components.count() != 1 {
            return Err(SectorError::GenerationFailed(format!(
                "walkable space is split into {} components",
                components.count()
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "LevelGenerator"
    }
}

/// Generates a level with default settings.
pub fn generate_level(params: &GenerationParameters) -> SectorResult<LevelData> {
    LevelGenerator::default().generate_level(params)
}

/// Generates a level on tokio's blocking pool.
pub async fn generate_level_async(
    params: GenerationParameters,
    settings: GeneratorSettings,
) -> SectorResult<LevelData> {
    tokio::task::spawn_blocking(move || LevelGenerator::new(settings).generate_level(&params))
        .await
        .map_err(|err| SectorError::TaskFailed(err.to_string()))?
}
