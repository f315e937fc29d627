//! # Room Placement
//!
//! Bounded rejection sampling of non-overlapping rectangular rooms inside a
//! section. Placement may stop short of `max_rooms`; a sparse section is a
//! valid result, not a failure.

use crate::{config, GenerationParameters, GeneratorSettings, MapSection, Rect};
use rand::rngs::StdRng;
use rand::Rng;

/// Places rooms inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPlacer {
    /// Rooms to place per section
    pub max_rooms: u32,
    /// Minimum room side length
    pub min_room_size: u32,
    /// Maximum room side length
    pub max_room_size: u32,
    /// Cells kept free between rooms on every side
    pub min_room_distance: i32,
}

impl RoomPlacer {
    pub fn new(params: &GenerationParameters, settings: &GeneratorSettings) -> Self {
        Self {
            max_rooms: params.max_rooms,
            min_room_size: params.min_room_size,
            max_room_size: params.max_room_size,
            min_room_distance: settings.min_room_distance,
        }
    }

    /// Fills `section.rooms`, calling `on_room_accepted` for every accepted
    /// room right after it is appended. The callback gets the run's RNG back
    /// so it can pick tiles. Returns the number of attempts used.
    ///
    /// Gives up after `max_rooms * 5` attempts. `max_rooms` is first capped
    /// at the number of placeable cells, since rooms never overlap.
    pub fn generate_section_rooms<F>(
        &self,
        section: &mut MapSection,
        rng: &mut StdRng,
        mut on_room_accepted: F,
    ) -> u32
    where
        F: FnMut(&mut MapSection, Rect, &mut StdRng),
    {
        let target = self.max_rooms.min(Self::room_capacity(section));
        let max_attempts = target.saturating_mul(config::ROOM_ATTEMPTS_PER_ROOM);
        let mut attempts = 0;
        let mut placed = 0;

        while placed < target && attempts < max_attempts {
            attempts += 1;

            let Some(candidate) = self.generate_candidate(section, rng) else {
                continue;
            };
            if !self.is_valid_placement(&candidate, &section.rooms) {
                continue;
            }

            section.rooms.push(candidate);
            placed += 1;
            on_room_accepted(section, candidate, rng);
        }

        if placed < target {
            log::debug!(
                "Section ({}, {}) placed {}/{} rooms in {} attempts",
                section.grid_x,
                section.grid_y,
                placed,
                target,
                attempts
            );
        }

        attempts
    }

    /// Upper bound on the rooms a section can hold: its cell count inside
    /// the edge margin.
    fn room_capacity(section: &MapSection) -> u32 {
        let margin = 2 * config::ROOM_EDGE_MARGIN as u32;
        let width = section.width().saturating_sub(margin);
        let height = section.height().saturating_sub(margin);
        width.saturating_mul(height).max(1)
    }

    /// Draws a random room that fits in the section with the edge margin, or
    /// `None` when the drawn size cannot fit at all.
    fn generate_candidate(&self, section: &MapSection, rng: &mut StdRng) -> Option<Rect> {
        let width = rng.gen_range(self.min_room_size..=self.max_room_size) as i32;
        let height = rng.gen_range(self.min_room_size..=self.max_room_size) as i32;

        let margin = config::ROOM_EDGE_MARGIN;
        let max_x = section.width() as i32 - width - margin;
        let max_y = section.height() as i32 - height - margin;
        if max_x < margin || max_y < margin {
            return None;
        }

        let x = rng.gen_range(margin..=max_x);
        let y = rng.gen_range(margin..=max_y);
        Some(Rect::new(x, y, width, height))
    }

    /// Whether `candidate` keeps `min_room_distance` from every existing room.
    pub fn is_valid_placement(&self, candidate: &Rect, existing: &[Rect]) -> bool {
        existing
            .iter()
            .all(|room| !room.grow(self.min_room_distance).intersects(candidate))
    }
}
