//! Property-based tests using proptest
//!
//! Invariants that must hold for any seed and any valid parameter set:
//! - rooms keep their spacing and stay inside their sections
//! - walkable space forms one component after repair
//! - the spawn is a scored, non-hazard room cell
//! - identical inputs give identical levels

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use sectorgen::{
    generate_level, label_components, Biome, GenerationParameters, GeneratorSettings,
    LevelGenerator, MapSection, Position, Rect, RepairPolicy, RoomPlacer, SectionPainter,
    SpawnPlanner, TileType,
};

fn params_strategy() -> impl Strategy<Value = GenerationParameters> {
    (
        any::<u64>(),
        0u8..7,
        24u32..=48,
        24u32..=48,
        1u32..=8,
        3u32..=6,
        0u32..=4,
        1u32..=2,
        1u32..=2,
    )
        .prop_map(|(seed, biome, width, height, max_rooms, min_size, extra, gw, gh)| {
            GenerationParameters {
                biome,
                width,
                height,
                seed,
                max_rooms,
                min_room_size: min_size,
                max_room_size: min_size + extra,
                corridor_width: None,
                grid_width: Some(gw),
                grid_height: Some(gh),
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_rooms_keep_distance(seed in any::<u64>(), max_rooms in 1u32..=12) {
        let params = GenerationParameters {
            max_rooms,
            ..GenerationParameters::for_testing(seed)
        };
        let settings = GeneratorSettings::for_testing();
        let placer = RoomPlacer::new(&params, &settings);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut section = MapSection::new(params.width, params.height, Biome::Grass, 0, 0, Position::origin());
        SectionPainter::default().reset_section_mask(&mut section);

        placer.generate_section_rooms(&mut section, &mut rng, |_, _, _| {});

        prop_assert!(section.rooms.len() <= max_rooms as usize);
        let inner = Rect::new(2, 2, params.width as i32 - 4, params.height as i32 - 4);
        for (i, a) in section.rooms.iter().enumerate() {
            prop_assert!(a.positions().all(|p| inner.contains(p)), "room {:?} touches the margin", a);
            for b in &section.rooms[i + 1..] {
                prop_assert!(!a.grow(settings.min_room_distance).intersects(b));
            }
        }
    }

    #[test]
    fn prop_any_level_is_connected(params in params_strategy()) {
        let level = generate_level(&params).expect("valid parameters");
        let components = label_components(&level.mask, TileType::is_walkable);

        prop_assert_eq!(components.count(), 1);
        prop_assert!(level.room_count >= 1);
        prop_assert_eq!(level.mask.get(level.spawn), Some(TileType::Room));
    }

    #[test]
    fn prop_prune_leaves_one_component(params in params_strategy()) {
        let settings = GeneratorSettings {
            repair_policy: RepairPolicy::Prune,
            ..GeneratorSettings::for_testing()
        };
        let level = LevelGenerator::new(settings).generate_level(&params).expect("valid parameters");
        prop_assert_eq!(label_components(&level.mask, TileType::is_walkable).count(), 1);
        prop_assert_eq!(level.mask.get(level.spawn), Some(TileType::Room));
        prop_assert!(level.room_count >= 1);
        prop_assert_eq!(level.rooms.len(), level.room_count);
    }

    #[test]
    fn prop_spawn_is_safe(params in params_strategy()) {
        let level = generate_level(&params).expect("valid parameters");
        let planner = SpawnPlanner::new(&level.mask).with_hazards(level.hazards.clone());

        prop_assert!(!level.hazards.iter().any(|h| h.contains(level.spawn)));
        if let Some(best) = planner.find_best_spawn() {
            prop_assert_eq!(best.position, level.spawn);
            prop_assert!(planner.score(level.spawn) > 0);
            if best.clear {
                prop_assert!(planner.has_clear_window(level.spawn));
            }
        }
    }

    #[test]
    fn prop_generation_is_deterministic(params in params_strategy()) {
        let first = generate_level(&params).expect("valid parameters");
        let second = generate_level(&params).expect("valid parameters");
        prop_assert_eq!(first, second);
    }
}
