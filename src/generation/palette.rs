//! # Biome Palette
//!
//! Maps a biome (plus a little local context) to concrete atlas coordinates.
//!
//! Floor and decoration choices are weighted random draws. Wall variation is
//! two-staged: the palette-wide `varied_walls` toggle must be on, a 30% gate
//! must pass, and only then is a biome-weighted variant picked. Turning the
//! toggle off makes wall output fully deterministic.

use crate::{Biome, Position};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Atlas source holding floor, background, bridge and hazard tiles.
pub const FLOOR_ATLAS: u8 = 0;
/// Atlas source holding wall tiles.
pub const WALL_ATLAS: u8 = 1;
/// Atlas source holding decoration tiles.
pub const DECORATION_ATLAS: u8 = 2;

/// Probability that a wall write uses a variant when variation is enabled.
const WALL_VARIATION_CHANCE: f64 = 0.3;

/// Cell coordinate inside a tile atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AtlasCoord {
    pub x: u8,
    pub y: u8,
}

impl AtlasCoord {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }
}

/// Kinds of hazard patch a room can receive.
///
/// Each kind names its own floor tile and, when it also blocks visually, the
/// wall-layer tile stamped over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    ToxicSludge,
    Quicksand,
    ThinIce,
    LiveWiring,
    Rift,
    Lava,
}

impl HazardKind {
    /// Floor-layer tile of the patch.
    pub fn floor_tile(self) -> AtlasCoord {
        match self {
            HazardKind::ToxicSludge => AtlasCoord::new(0, 8),
            HazardKind::Quicksand => AtlasCoord::new(1, 8),
            HazardKind::ThinIce => AtlasCoord::new(2, 8),
            HazardKind::LiveWiring => AtlasCoord::new(3, 8),
            HazardKind::Rift => AtlasCoord::new(4, 8),
            HazardKind::Lava => AtlasCoord::new(5, 8),
        }
    }

    /// Wall-layer tile painted on top of the patch, if the hazard has one.
    pub fn wall_overlay(self) -> Option<AtlasCoord> {
        match self {
            HazardKind::Lava => Some(AtlasCoord::new(5, 8)),
            _ => None,
        }
    }
}

/// Resolves abstract cells to atlas coordinates for every biome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiomePalette {
    /// Global switch for wall variants
    pub varied_walls: bool,
}

impl BiomePalette {
    pub fn new(varied_walls: bool) -> Self {
        Self { varied_walls }
    }

    fn row(biome: Biome) -> u8 {
        biome.id()
    }

    fn weighted(choices: &[(AtlasCoord, u32)], rng: &mut StdRng) -> AtlasCoord {
        choices
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(coord, _)| *coord)
            .unwrap_or(choices[0].0)
    }

    /// Floor tile for walkable room and corridor cells.
    pub fn floor_tile(&self, biome: Biome, rng: &mut StdRng) -> AtlasCoord {
        let r = Self::row(biome);
        match biome {
            Biome::Grass | Biome::Ice => AtlasCoord::new(0, r),
            Biome::Forest => Self::weighted(
                &[(AtlasCoord::new(0, r), 70), (AtlasCoord::new(1, r), 30)],
                rng,
            ),
            Biome::Desert => Self::weighted(
                &[
                    (AtlasCoord::new(0, r), 60),
                    (AtlasCoord::new(1, r), 25),
                    (AtlasCoord::new(2, r), 15),
                ],
                rng,
            ),
            Biome::Techno => Self::weighted(
                &[(AtlasCoord::new(0, r), 80), (AtlasCoord::new(1, r), 20)],
                rng,
            ),
            Biome::Anomalous => Self::weighted(
                &[
                    (AtlasCoord::new(0, r), 50),
                    (AtlasCoord::new(1, r), 30),
                    (AtlasCoord::new(2, r), 20),
                ],
                rng,
            ),
            Biome::Lava => Self::weighted(
                &[(AtlasCoord::new(0, r), 75), (AtlasCoord::new(1, r), 25)],
                rng,
            ),
        }
    }

    /// Background tile laid under the whole section before rooms are stamped.
    pub fn background_tile(&self, biome: Biome) -> AtlasCoord {
        AtlasCoord::new(4, Self::row(biome))
    }

    /// Decoration tile for room dressing.
    pub fn decoration_tile(&self, biome: Biome, rng: &mut StdRng) -> AtlasCoord {
        let r = Self::row(biome);
        let weights: [u32; 3] = match biome {
            Biome::Grass | Biome::Forest => [50, 35, 15],
            Biome::Desert | Biome::Lava => [60, 30, 10],
            Biome::Ice => [40, 40, 20],
            Biome::Techno => [34, 33, 33],
            Biome::Anomalous => [20, 30, 50],
        };
        Self::weighted(
            &[
                (AtlasCoord::new(0, r), weights[0]),
                (AtlasCoord::new(1, r), weights[1]),
                (AtlasCoord::new(2, r), weights[2]),
            ],
            rng,
        )
    }

    /// Plain wall tile with no variation.
    pub fn base_wall_tile(&self, biome: Biome) -> AtlasCoord {
        AtlasCoord::new(0, Self::row(biome))
    }

    /// Wall tile, possibly a variant.
    ///
    /// `position_hint` alternates which variant is favoured on a checkerboard
    /// so neighbouring walls do not repeat the same texture.
    pub fn wall_tile(&self, biome: Biome, position_hint: Position, rng: &mut StdRng) -> AtlasCoord {
        if !self.varied_walls || !rng.gen_bool(WALL_VARIATION_CHANCE) {
            return self.base_wall_tile(biome);
        }

        let first_weight = match biome {
            Biome::Grass | Biome::Techno => 0.5,
            Biome::Forest => 0.7,
            Biome::Desert => 0.6,
            Biome::Ice => 0.8,
            Biome::Anomalous => 0.4,
            Biome::Lava => 0.65,
        };
        let r = Self::row(biome);
        let (primary, secondary) = if (position_hint.x + position_hint.y).rem_euclid(2) == 0 {
            (AtlasCoord::new(1, r), AtlasCoord::new(2, r))
        } else {
            (AtlasCoord::new(2, r), AtlasCoord::new(1, r))
        };
        if rng.gen_bool(first_weight) {
            primary
        } else {
            secondary
        }
    }

    /// Floor tile for inter-section bridges.
    ///
    /// Wide bridges (3 cells or more) use the railed variant.
    pub fn bridge_tile(&self, horizontal: bool, width: u32) -> AtlasCoord {
        match (horizontal, width >= 3) {
            (true, true) => AtlasCoord::new(0, 7),
            (true, false) => AtlasCoord::new(1, 7),
            (false, true) => AtlasCoord::new(2, 7),
            (false, false) => AtlasCoord::new(3, 7),
        }
    }

    /// Hazard registered for a biome.
    pub fn hazard_for(&self, biome: Biome) -> HazardKind {
        match biome {
            Biome::Grass | Biome::Forest => HazardKind::ToxicSludge,
            Biome::Desert => HazardKind::Quicksand,
            Biome::Ice => HazardKind::ThinIce,
            Biome::Techno => HazardKind::LiveWiring,
            Biome::Anomalous => HazardKind::Rift,
            Biome::Lava => HazardKind::Lava,
        }
    }
}

impl Default for BiomePalette {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_walls_without_variation_are_base() {
        let palette = BiomePalette::new(false);
        let mut rng = StdRng::seed_from_u64(7);
        for biome in Biome::all() {
            for i in 0..50 {
                let tile = palette.wall_tile(biome, Position::new(i, i * 3), &mut rng);
                assert_eq!(tile, palette.base_wall_tile(biome));
            }
        }
    }

    #[test]
    fn test_walls_with_variation_vary() {
        let palette = BiomePalette::new(true);
        let mut rng = StdRng::seed_from_u64(7);
        let tiles: Vec<_> = (0..200)
            .map(|i| palette.wall_tile(Biome::Ice, Position::new(i, 0), &mut rng))
            .collect();
        assert!(tiles.contains(&palette.base_wall_tile(Biome::Ice)));
        assert!(tiles.iter().any(|t| *t != palette.base_wall_tile(Biome::Ice)));
        assert!(tiles.iter().all(|t| t.y == Biome::Ice.id()));
    }

    #[test]
    fn test_floor_tiles_stay_in_biome_row() {
        let palette = BiomePalette::default();
        let mut rng = StdRng::seed_from_u64(3);
        for biome in Biome::all() {
            for _ in 0..20 {
                assert_eq!(palette.floor_tile(biome, &mut rng).y, biome.id());
                assert_eq!(palette.decoration_tile(biome, &mut rng).y, biome.id());
            }
        }
    }

    #[test]
    fn test_only_lava_has_wall_overlay() {
        let palette = BiomePalette::default();
        for biome in Biome::all() {
            let hazard = palette.hazard_for(biome);
            assert_eq!(hazard.wall_overlay().is_some(), biome == Biome::Lava);
        }
    }

    #[test]
    fn test_bridge_tiles() {
        let palette = BiomePalette::default();
        assert_ne!(palette.bridge_tile(true, 3), palette.bridge_tile(false, 3));
        assert_ne!(palette.bridge_tile(true, 3), palette.bridge_tile(true, 2));
    }
}
