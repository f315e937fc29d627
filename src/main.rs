//! # Sectorgen Command Line Entry Point
//!
//! Generates one level from command line parameters and prints it as ASCII
//! or writes it as JSON.

use clap::{Parser, ValueEnum};
use sectorgen::{
    generate_level_async, GenerationParameters, GeneratorSettings, LevelData, SectorResult,
};
use std::path::PathBuf;
#[cfg(not(feature = "dev-tools"))]
use log::info;
#[cfg(feature = "dev-tools")]
use tracing::info;

/// Output format for the generated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Ascii,
    Json,
}

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "sectorgen")]
#[command(about = "Seedable sectioned room-and-corridor level generator")]
#[command(version)]
struct Args {
    /// Random seed for level generation
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Section width in tiles
    #[arg(long, default_value_t = sectorgen::config::DEFAULT_SECTION_WIDTH)]
    width: u32,

    /// Section height in tiles
    #[arg(long, default_value_t = sectorgen::config::DEFAULT_SECTION_HEIGHT)]
    height: u32,

    /// Biome id (0 grass .. 6 lava)
    #[arg(short, long, default_value_t = 0)]
    biome: u8,

    /// Maximum rooms per section
    #[arg(long, default_value_t = 8)]
    max_rooms: u32,

    #[arg(long, default_value_t = 5)]
    min_room_size: u32,

    #[arg(long, default_value_t = 12)]
    max_room_size: u32,

    /// Number of section columns
    #[arg(long)]
    grid_width: Option<u32>,

    /// Number of section rows
    #[arg(long)]
    grid_height: Option<u32>,

    /// JSON file with generator settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the level to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn parameters(&self) -> GenerationParameters {
        GenerationParameters {
            biome: self.biome,
            width: self.width,
            height: self.height,
            seed: self.seed,
            max_rooms: self.max_rooms,
            min_room_size: self.min_room_size,
            max_room_size: self.max_room_size,
            corridor_width: None,
            grid_width: self.grid_width,
            grid_height: self.grid_height,
        }
    }
}

#[tokio::main]
async fn main() -> SectorResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level);

    info!("Starting sectorgen v{}", sectorgen::VERSION);

    let settings = match &args.config {
        Some(path) => {
            info!("Loading generator settings from {}", path.display());
            GeneratorSettings::from_json_file(path)?
        }
        None => GeneratorSettings::default(),
    };

    let level = generate_level_async(args.parameters(), settings).await?;
    write_level(&args, &level)
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        use tracing_subscriber::EnvFilter;

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .parse_default_env()
            .init();
    }
}

fn write_level(args: &Args, level: &LevelData) -> SectorResult<()> {
    let rendered = match args.format {
        OutputFormat::Ascii => level.to_ascii(),
        OutputFormat::Json => level.to_json()?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!("Level written to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
