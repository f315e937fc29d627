//! # Entity Placement
//!
//! Scatters pickups, containers and resource nodes over a finished world.
//!
//! Every placer draws from a [`PlacementCatalog`] of weighted kinds per biome
//! and only uses cells that are safe to stand on: `Room` cells in the main
//! walkable component, outside hazards, away from the spawn and not already
//! taken.

use crate::{
    config, label_components, Biome, ComponentTable, Position, TileType, World,
};
use noise::{NoiseFn, Perlin};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Sampling scale for resource noise.
const RESOURCE_NOISE_SCALE: f64 = 0.12;

/// What a placed entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementKind {
    Pickup,
    Container,
    Resource,
}

/// One weighted option in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub weight: u32,
}

/// An entity placed in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub id: Uuid,
    pub name: String,
    pub kind: PlacementKind,
    pub position: Position,
}

/// Builds an entity id from the run's RNG so ids repeat with the seed.
pub fn entity_id(rng: &mut StdRng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Weighted entity kinds per biome and placement kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementCatalog {
    entries: HashMap<Biome, HashMap<PlacementKind, Vec<CatalogEntry>>>,
}

impl PlacementCatalog {
    /// Catalog with no entries.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Catalog covering every biome and placement kind.
    pub fn standard() -> Self {
        let mut catalog = Self::empty();
        for biome in Biome::all() {
            let (local_pickup, local_cache, resources): (&str, &str, [&str; 2]) = match biome {
                Biome::Grass => ("seed_pouch", "garden_box", ["fiber_plant", "scrap_metal"]),
                Biome::Forest => ("resin_vial", "hollow_log", ["timber", "fiber_plant"]),
                Biome::Desert => ("water_flask", "buried_cache", ["silica", "scrap_metal"]),
                Biome::Ice => ("thermal_pack", "frozen_locker", ["ice_crystal", "scrap_metal"]),
                Biome::Techno => ("circuit_board", "server_rack", ["copper_wire", "scrap_metal"]),
                Biome::Anomalous => ("void_shard", "stasis_pod", ["exotic_matter", "scrap_metal"]),
                Biome::Lava => ("heat_shield", "slag_crate", ["sulfur", "obsidian"]),
            };

            catalog.insert(biome, PlacementKind::Pickup, "ration_pack", 50);
            catalog.insert(biome, PlacementKind::Pickup, "med_kit", 20);
            catalog.insert(biome, PlacementKind::Pickup, "battery_cell", 20);
            catalog.insert(biome, PlacementKind::Pickup, local_pickup, 10);

            catalog.insert(biome, PlacementKind::Container, "supply_crate", 60);
            catalog.insert(biome, PlacementKind::Container, "locker", 30);
            catalog.insert(biome, PlacementKind::Container, local_cache, 10);

            catalog.insert(biome, PlacementKind::Resource, resources[0], 70);
            catalog.insert(biome, PlacementKind::Resource, resources[1], 30);
        }
        catalog
    }

    /// Adds a weighted option.
    pub fn insert(&mut self, biome: Biome, kind: PlacementKind, name: impl Into<String>, weight: u32) {
        self.entries
            .entry(biome)
            .or_default()
            .entry(kind)
            .or_default()
            .push(CatalogEntry {
                name: name.into(),
                weight,
            });
    }

    /// Drops every option for a biome and kind.
    pub fn remove(&mut self, biome: Biome, kind: PlacementKind) {
        if let Some(kinds) = self.entries.get_mut(&biome) {
            kinds.remove(&kind);
        }
    }

    pub fn entries(&self, biome: Biome, kind: PlacementKind) -> &[CatalogEntry] {
        self.entries
            .get(&biome)
            .and_then(|kinds| kinds.get(&kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Draws a weighted option. Logs an error and returns `None` when the
    /// biome has no usable entry for `kind`.
    pub fn pick(&self, biome: Biome, kind: PlacementKind, rng: &mut StdRng) -> Option<&str> {
        let entries = self.entries(biome, kind);
        match WeightedIndex::new(entries.iter().map(|e| e.weight)) {
            Ok(dist) => Some(entries[dist.sample(rng)].name.as_str()),
            Err(err) => {
                log::error!("No {:?} catalog entry for {:?}: {}", kind, biome, err);
                None
            }
        }
    }
}

impl Default for PlacementCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

/// Relative resource abundance of a biome.
pub fn resource_richness(biome: Biome) -> f64 {
    match biome {
        Biome::Grass => 1.0,
        Biome::Forest => 1.3,
        Biome::Desert => 0.7,
        Biome::Ice => 0.8,
        Biome::Techno => 1.1,
        Biome::Anomalous => 1.5,
        Biome::Lava => 1.2,
    }
}

/// Shared view of which cells can still take an entity.
pub struct PlacementContext<'a> {
    pub world: &'a World,
    pub spawn: Position,
    components: ComponentTable,
    main: Option<u32>,
    occupied: HashSet<Position>,
}

impl<'a> PlacementContext<'a> {
    pub fn new(world: &'a World, spawn: Position) -> Self {
        let components = label_components(&world.mask, TileType::is_walkable);
        let main = components
            .component_of(spawn)
            .or_else(|| components.largest());
        Self {
            world,
            spawn,
            components,
            main,
            occupied: HashSet::new(),
        }
    }

    /// Whether an entity may be put on `pos`.
    pub fn is_candidate(&self, pos: Position) -> bool {
        self.world.mask.get(pos) == Some(TileType::Room)
            && self.main.is_some()
            && self.components.component_of(pos) == self.main
            && !self.world.is_hazard(pos)
            && pos.chebyshev_distance(self.spawn) > config::SPAWN_CLEAR_RADIUS as u32
            && !self.occupied.contains(&pos)
    }

    /// Every free candidate cell in row-major order.
    pub fn candidates(&self) -> Vec<Position> {
        self.world
            .mask
            .positions()
            .filter(|p| self.is_candidate(*p))
            .collect()
    }

    pub fn occupy(&mut self, pos: Position) {
        self.occupied.insert(pos);
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupied.contains(&pos)
    }

    fn place(
        &mut self,
        catalog: &PlacementCatalog,
        kind: PlacementKind,
        pos: Position,
        rng: &mut StdRng,
    ) -> Option<PlacedEntity> {
        let biome = self.world.biome_at(pos);
        let name = catalog.pick(biome, kind, rng)?.to_string();
        self.occupy(pos);
        Some(PlacedEntity {
            id: entity_id(rng),
            name,
            kind,
            position: pos,
        })
    }
}

/// Scatters pickups over candidate cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityPlacer {
    /// Pickups per 100 candidate cells
    pub density: f64,
}

impl EntityPlacer {
    pub fn place(
        &self,
        ctx: &mut PlacementContext<'_>,
        catalog: &PlacementCatalog,
        rng: &mut StdRng,
    ) -> Vec<PlacedEntity> {
        let candidates = ctx.candidates();
        let count = (candidates.len() as f64 * self.density.max(0.0) / 100.0).floor() as usize;
        let chosen: Vec<Position> = candidates.choose_multiple(rng, count).copied().collect();

        chosen
            .into_iter()
            .filter_map(|pos| ctx.place(catalog, PlacementKind::Pickup, pos, rng))
            .collect()
    }
}

/// Puts at most one container per room, against a wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerPlacer {
    /// Chance that a room gets a container
    pub chance: f64,
}

impl ContainerPlacer {
    pub fn place(
        &self,
        ctx: &mut PlacementContext<'_>,
        catalog: &PlacementCatalog,
        rng: &mut StdRng,
    ) -> Vec<PlacedEntity> {
        let mut placed = Vec::new();
        for room in ctx.world.rooms() {
            if !rng.gen_bool(self.chance.clamp(0.0, 1.0)) {
                continue;
            }
            let spots: Vec<Position> = room
                .positions()
                .filter(|p| ctx.is_candidate(*p))
                .filter(|p| ctx.world.mask.has_cardinal_neighbor(*p, TileType::Wall))
                .collect();
            let Some(&pos) = spots.choose(rng) else {
                log::debug!("Room {:?} has no free wall-side cell for a container", room);
                continue;
            };
            placed.extend(ctx.place(catalog, PlacementKind::Container, pos, rng));
        }
        placed
    }
}

/// Places resource nodes where Perlin noise is high.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourcePlacer {
    /// Nodes per 100 candidate cells before noise and biome modulation
    pub density: f64,
}

impl ResourcePlacer {
    pub fn place(
        &self,
        ctx: &mut PlacementContext<'_>,
        catalog: &PlacementCatalog,
        rng: &mut StdRng,
    ) -> Vec<PlacedEntity> {
        if self.density <= 0.0 {
            return Vec::new();
        }
        let noise = Perlin::new(rng.gen());
        let base = self.density / 100.0;

        let mut placed = Vec::new();
        for pos in ctx.candidates() {
            let n = noise.get([
                pos.x as f64 * RESOURCE_NOISE_SCALE,
                pos.y as f64 * RESOURCE_NOISE_SCALE,
            ]);
            let richness = resource_richness(ctx.world.biome_at(pos));
            let chance = (base * richness * (1.0 + n)).clamp(0.0, 1.0);
            if rng.gen_bool(chance) {
                placed.extend(ctx.place(catalog, PlacementKind::Resource, pos, rng));
            }
        }
        placed
    }
}
