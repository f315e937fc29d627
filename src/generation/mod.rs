//! # Generation Module
//!
//! Procedural level generation: sections, rooms, corridors, decoration, tile
//! palettes, section stitching and entity placement.
//!
//! Every stage takes an explicit `StdRng` owned by one generation run. Nothing
//! here keeps global state, so two runs with their own parameters can execute
//! concurrently and identical inputs always produce identical output.

pub mod corridors;
pub mod decorator;
pub mod events;
pub mod level;
pub mod painter;
pub mod palette;
pub mod placers;
pub mod rooms;
pub mod section;
pub mod sink;
pub mod world;

pub use corridors::*;
pub use decorator::*;
pub use events::*;
pub use level::*;
pub use painter::*;
pub use palette::*;
pub use placers::*;
pub use rooms::*;
pub use section::*;
pub use sink::*;
pub use world::*;

use crate::{config, SectorError, SectorResult};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Input for one generation pass.
///
/// `width` and `height` are the size of a single section. A level with the
/// default 1x1 section grid is exactly `width x height` tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationParameters {
    /// Biome id (0 grass, 1 forest, 2 desert, 3 ice, 4 techno, 5 anomalous, 6 lava)
    pub biome: u8,
    /// Section width in tiles
    pub width: u32,
    /// Section height in tiles
    pub height: u32,
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Maximum number of rooms per section
    pub max_rooms: u32,
    /// Minimum room side length
    pub min_room_size: u32,
    /// Maximum room side length
    pub max_room_size: u32,
    /// Corridor width override
    #[serde(default)]
    pub corridor_width: Option<u32>,
    /// Number of section columns
    #[serde(default)]
    pub grid_width: Option<u32>,
    /// Number of section rows
    #[serde(default)]
    pub grid_height: Option<u32>,
}

impl GenerationParameters {
    /// Creates default parameters for a single 60x60 section.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorgen::GenerationParameters;
    ///
    /// let params = GenerationParameters::new(42);
    /// assert!(params.min_room_size >= 3);
    /// assert!(params.max_room_size >= params.min_room_size);
    /// assert!(params.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            biome: 0,
            width: config::DEFAULT_SECTION_WIDTH,
            height: config::DEFAULT_SECTION_HEIGHT,
            seed,
            max_rooms: 12,
            min_room_size: 8,
            max_room_size: 20,
            corridor_width: None,
            grid_width: None,
            grid_height: None,
        }
    }

    /// Creates parameters for testing with small, simple levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            biome: 0,
            width: 40,
            height: 40,
            seed,
            max_rooms: 6,
            min_room_size: 5,
            max_room_size: 9,
            corridor_width: Some(1),
            grid_width: None,
            grid_height: None,
        }
    }

    /// Creates parameters for a large multi-section world.
    pub fn for_detailed_generation(seed: u64) -> Self {
        Self {
            biome: 4,
            width: 64,
            height: 64,
            seed,
            max_rooms: 14,
            min_room_size: 6,
            max_room_size: 16,
            corridor_width: Some(2),
            grid_width: Some(3),
            grid_height: Some(3),
        }
    }

    /// Sets the section grid dimensions.
    pub fn with_grid(mut self, grid_width: u32, grid_height: u32) -> Self {
        self.grid_width = Some(grid_width);
        self.grid_height = Some(grid_height);
        self
    }

    /// Sets the biome id.
    pub fn with_biome(mut self, biome: u8) -> Self {
        self.biome = biome;
        self
    }

    /// Number of section columns, at least 1.
    pub fn sections_x(&self) -> u32 {
        self.grid_width.unwrap_or(1)
    }

    /// Number of section rows, at least 1.
    pub fn sections_y(&self) -> u32 {
        self.grid_height.unwrap_or(1)
    }

    /// Rejects parameters that cannot describe a level.
    pub fn validate(&self) -> SectorResult<()> {
        let fail = |msg: String| Err(SectorError::InvalidParameters(msg));

        if self.width < 8 || self.height < 8 {
            return fail(format!(
                "section must be at least 8x8, got {}x{}",
                self.width, self.height
            ));
        }
        if self.min_room_size < 3 {
            return fail(format!("min_room_size {} is below 3", self.min_room_size));
        }
        if self.min_room_size > self.max_room_size {
            return fail(format!(
                "min_room_size {} exceeds max_room_size {}",
                self.min_room_size, self.max_room_size
            ));
        }
        if self.max_rooms == 0 {
            return fail("max_rooms must be at least 1".to_string());
        }
        if self.corridor_width == Some(0) {
            return fail("corridor_width must be at least 1".to_string());
        }
        if self.grid_width == Some(0) || self.grid_height == Some(0) {
            return fail("section grid dimensions must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self::new(42)
    }
}

/// How fragmented room space is handled after stitching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepairPolicy {
    /// Carve paths from isolated components to the corridor network
    Connect,
    /// Revert every room cell outside the largest component to background
    Prune,
}

/// Tunable generator behaviour that is not part of the per-level input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Cells kept between any two rooms of a section
    pub min_room_distance: i32,
    /// Corridor width when the parameters do not override it
    pub corridor_width: u32,
    /// Requested connector width between sections (never below 3)
    pub connector_width: u32,
    /// Empty cells between neighbouring sections
    pub section_spacing: u32,
    /// Largest gap a connector stub may bridge to weld onto a room
    pub nearby_room_threshold: u32,
    /// Probability of an extra corridor per room
    pub extra_edge_chance: f64,
    /// Allow random wall tile variants
    pub varied_walls: bool,
    /// Hazard chance for biome 0
    pub hazard_base_chance: f64,
    /// Hazard chance added per biome id
    pub hazard_biome_step: f64,
    /// Share of room decorations that block movement
    pub obstacle_chance: f64,
    /// Pickups per 100 candidate cells
    pub item_density: f64,
    /// Chance that a room receives a container
    pub container_chance: f64,
    /// Resource nodes per 100 candidate cells before noise modulation
    pub resource_density: f64,
    /// Reconnect or prune fragmented room space
    pub repair_policy: RepairPolicy,
    /// Roll a biome per section instead of using the requested one everywhere
    pub mixed_biomes: bool,
    /// Additional spawn points chosen in world quadrants
    pub extra_spawn_points: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            min_room_distance: 2,
            corridor_width: 2,
            connector_width: 3,
            section_spacing: 4,
            nearby_room_threshold: config::DEFAULT_NEARBY_ROOM_THRESHOLD,
            extra_edge_chance: 0.3,
            varied_walls: true,
            hazard_base_chance: 0.2,
            hazard_biome_step: 0.1,
            obstacle_chance: 0.25,
            item_density: 1.5,
            container_chance: 0.35,
            resource_density: 1.0,
            repair_policy: RepairPolicy::Connect,
            mixed_biomes: false,
            extra_spawn_points: 0,
        }
    }
}

impl GeneratorSettings {
    /// Settings for deterministic tests: no wall variation, no scatter.
    pub fn for_testing() -> Self {
        Self {
            varied_walls: false,
            item_density: 0.0,
            container_chance: 0.0,
            resource_density: 0.0,
            ..Self::default()
        }
    }

    /// Parses settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> SectorResult<Self> {
        serde_json::from_str(json).map_err(SectorError::from)
    }

    /// Loads settings from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SectorResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Connector width actually carved between sections.
    pub fn effective_connector_width(&self) -> u32 {
        self.connector_width.max(config::MIN_CONNECTOR_WIDTH)
    }
}

/// Trait for procedural generators.
///
/// Generators receive the parameters and the run's random number generator
/// explicitly so that the same inputs always produce the same content.
pub trait Generator<T> {
    /// Generates content using the provided parameters and random number generator.
    fn generate(&self, params: &GenerationParameters, rng: &mut StdRng) -> SectorResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, params: &GenerationParameters) -> SectorResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Creates a seeded random number generator from the parameters.
pub fn create_rng(params: &GenerationParameters) -> StdRng {
    StdRng::seed_from_u64(params.seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_parameters_creation() {
        let params = GenerationParameters::new(12345);
        assert_eq!(params.seed, 12345);
        assert_eq!(params.sections_x(), 1);
        assert_eq!(params.sections_y(), 1);
        assert!(params.validate().is_ok());
        assert!(GenerationParameters::for_testing(1).validate().is_ok());
        assert!(GenerationParameters::for_detailed_generation(1).validate().is_ok());
    }

    #[test]
    fn test_parameter_validation() {
        let mut params = GenerationParameters::new(1);
        params.min_room_size = 10;
        params.max_room_size = 5;
        assert!(matches!(
            params.validate(),
            Err(SectorError::InvalidParameters(_))
        ));

        let params = GenerationParameters {
            width: 4,
            ..GenerationParameters::new(1)
        };
        assert!(params.validate().is_err());

        let params = GenerationParameters::new(1).with_grid(0, 2);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_settings_partial_json() {
        let settings = GeneratorSettings::from_json(r#"{ "section_spacing": 7, "repair_policy": "Prune" }"#)
            .expect("partial settings parse");
        assert_eq!(settings.section_spacing, 7);
        assert_eq!(settings.repair_policy, RepairPolicy::Prune);
        assert_eq!(settings.min_room_distance, GeneratorSettings::default().min_room_distance);
    }

    #[test]
    fn test_connector_width_floor() {
        let settings = GeneratorSettings {
            connector_width: 1,
            ..GeneratorSettings::default()
        };
        assert_eq!(settings.effective_connector_width(), 3);
    }

    #[test]
    fn test_rng_is_seeded() {
        let params = GenerationParameters::new(99);
        let a: u64 = create_rng(&params).gen();
        let b: u64 = create_rng(&params).gen();
        assert_eq!(a, b);
    }
}
