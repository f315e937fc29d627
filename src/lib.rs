//! # Sectorgen
//!
//! Deterministic, seedable level generation for a 2D isometric space-survival game.
//!
//! ## Architecture Overview
//!
//! A level is built in sections. Each section is an independent rectangular grid
//! that gets rooms, corridors, walls, decorations and hazards. Sections are then
//! stitched into one world grid, checked for global walkability, repaired where
//! needed and finally dressed with entities.
//!
//! - **Grid**: positions, rectangles and the `TileType` mask every stage writes to
//! - **Generation**: room placement, corridor carving, decoration, palettes,
//!   section stitching and the full level pipeline
//! - **Connectivity**: component labeling, reconnection and spawn planning
//! - **Utils**: pathfinding and distance helpers shared by the stages
//!
//! ## Tile output
//!
//! The generator never talks to an engine directly. Concrete tile writes go
//! through the [`TileSink`] trait, and the finished level is returned as a
//! [`LevelData`] value the caller owns.

pub mod connectivity;
pub mod generation;
pub mod grid;
pub mod utils;

// Core module re-exports
pub use connectivity::*;
pub use generation::*;
pub use grid::*;
pub use utils::*;

/// Core error type for the generator.
#[derive(thiserror::Error, Debug)]
pub enum SectorError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Generation parameters cannot produce a level
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// A grid write or read fell outside the mask
    #[error("Position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// Generation produced a level that failed validation
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Background generation task did not complete
    #[error("Generation task failed: {0}")]
    TaskFailed(String),
}

/// Result type used throughout the crate.
pub type SectorResult<T> = Result<T, SectorError>;

/// Version information for the generator.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation configuration constants.
pub mod config {
    /// Default section width in tiles
    pub const DEFAULT_SECTION_WIDTH: u32 = 60;

    /// Default section height in tiles
    pub const DEFAULT_SECTION_HEIGHT: u32 = 60;

    /// Margin kept between a room and the section edge
    pub const ROOM_EDGE_MARGIN: i32 = 2;

    /// Placement attempts allowed per requested room
    pub const ROOM_ATTEMPTS_PER_ROOM: u32 = 5;

    /// Narrowest connector carved between two sections
    pub const MIN_CONNECTOR_WIDTH: u32 = 3;

    /// Gap a connector stub may bridge to reach a room
    pub const DEFAULT_NEARBY_ROOM_THRESHOLD: u32 = 10;

    /// Minimum walkable neighbours (of 8) for a spawn candidate
    pub const SPAWN_MIN_WALKABLE_NEIGHBORS: usize = 5;

    /// Cells around the spawn kept free of placed entities
    pub const SPAWN_CLEAR_RADIUS: i32 = 3;
}
