//! # Spawn Planning
//!
//! Scores candidate spawn tiles by how open and how well connected they are.
//!
//! A tile scores 0 unless it is a non-hazard `Room` cell with at least 5 of
//! its 8 neighbours walkable. Otherwise it earns a base of 10, 2 per walkable
//! neighbour, 1 per walkable cell in the surrounding 5x5 window, 50 when it
//! belongs to the component nearest the world centre and 15 for every world
//! quadrant anchor reachable from it.

use crate::{
    config, find_central_component, inner_ring, label_components, nearest_to, window,
    ComponentTable, Position, Rect, TileMask, TileType,
};

const BASE_SCORE: u32 = 10;
const NEIGHBOR_SCORE: u32 = 2;
const CENTER_COMPONENT_BONUS: u32 = 50;
const QUADRANT_BONUS: u32 = 15;
/// Radius of the window that must be entirely walkable for a preferred spawn.
const CLEAR_WINDOW_RADIUS: i32 = 2;

/// A scored spawn candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnCandidate {
    pub position: Position,
    pub score: u32,
    /// Every cell within two steps is walkable
    pub clear: bool,
}

impl SpawnCandidate {
    fn beats(&self, other: &SpawnCandidate) -> bool {
        (self.clear, self.score) > (other.clear, other.score)
    }
}

/// Picks spawn tiles on a finished world mask.
#[derive(Debug, Clone)]
pub struct SpawnPlanner<'a> {
    mask: &'a TileMask,
    components: ComponentTable,
    center_component: Option<u32>,
    quadrant_components: Vec<u32>,
    hazards: Vec<Rect>,
}

impl<'a> SpawnPlanner<'a> {
    pub fn new(mask: &'a TileMask) -> Self {
        let components = label_components(mask, TileType::is_walkable);
        let center_component = find_central_component(mask, &components);
        let quadrant_components = Self::quadrant_anchors(mask)
            .into_iter()
            .filter_map(|anchor| {
                let walkable = mask.positions().filter(|p| mask.is_walkable(*p));
                nearest_to(walkable, anchor).and_then(|p| components.component_of(p))
            })
            .collect();

        Self {
            mask,
            components,
            center_component,
            quadrant_components,
            hazards: Vec::new(),
        }
    }

    /// Hazard areas (world coordinates) that can never hold a spawn.
    pub fn with_hazards(mut self, hazards: Vec<Rect>) -> Self {
        self.hazards = hazards;
        self
    }

    /// Centres of the four world quadrants.
    fn quadrant_anchors(mask: &TileMask) -> [Position; 4] {
        let (w, h) = (mask.width as i32, mask.height as i32);
        [
            Position::new(w / 4, h / 4),
            Position::new(3 * w / 4, h / 4),
            Position::new(w / 4, 3 * h / 4),
            Position::new(3 * w / 4, 3 * h / 4),
        ]
    }

    /// The four quadrants of the world as rectangles.
    pub fn quadrants(&self) -> [Rect; 4] {
        let (w, h) = (self.mask.width as i32, self.mask.height as i32);
        let (hw, hh) = (w / 2, h / 2);
        [
            Rect::new(0, 0, hw, hh),
            Rect::new(hw, 0, w - hw, hh),
            Rect::new(0, hh, hw, h - hh),
            Rect::new(hw, hh, w - hw, h - hh),
        ]
    }

    /// Safety score of a tile, 0 for tiles that must not hold a spawn.
    pub fn score(&self, pos: Position) -> u32 {
        if self.mask.get(pos) != Some(TileType::Room) || self.is_hazard(pos) {
            return 0;
        }
        let neighbors = self.mask.walkable_neighbors(pos);
        if neighbors < config::SPAWN_MIN_WALKABLE_NEIGHBORS {
            return 0;
        }

        let mut score = BASE_SCORE + NEIGHBOR_SCORE * neighbors as u32;
        score += window(pos, CLEAR_WINDOW_RADIUS)
            .filter(|p| self.mask.is_walkable(*p))
            .count() as u32;

        let component = self.components.component_of(pos);
        if component.is_some() && component == self.center_component {
            score += CENTER_COMPONENT_BONUS;
        }
        if let Some(id) = component {
            let reachable = self.quadrant_components.iter().filter(|q| **q == id).count();
            score += QUADRANT_BONUS * reachable as u32;
        }
        score
    }

    /// Whether every cell within two steps of `pos` is walkable.
    pub fn has_clear_window(&self, pos: Position) -> bool {
        window(pos, CLEAR_WINDOW_RADIUS).all(|p| self.mask.is_walkable(p))
    }

    fn is_hazard(&self, pos: Position) -> bool {
        self.hazards.iter().any(|h| h.contains(pos))
    }

    fn candidate(&self, pos: Position) -> Option<SpawnCandidate> {
        let score = self.score(pos);
        (score > 0).then(|| SpawnCandidate {
            position: pos,
            score,
            clear: self.has_clear_window(pos),
        })
    }

    fn best_of<I>(&self, cells: I) -> Option<SpawnCandidate>
    where
        I: IntoIterator<Item = Position>,
    {
        let mut best: Option<SpawnCandidate> = None;
        for candidate in cells.into_iter().filter_map(|p| self.candidate(p)) {
            if best.map_or(true, |b| candidate.beats(&b)) {
                best = Some(candidate);
            }
        }
        best
    }

    /// Highest-scoring tile of the whole world.
    ///
    /// Tiles with a fully walkable radius-2 window win over tiles without one;
    /// ties go to the first tile in row-major order.
    pub fn find_best_spawn(&self) -> Option<SpawnCandidate> {
        self.best_of(self.mask.positions())
    }

    /// Best tile of the outermost ring of `area` that holds any valid tile,
    /// scanning from the border inward.
    pub fn find_best_spawn_in_corner(&self, area: Rect) -> Option<SpawnCandidate> {
        let mut radius = 0;
        loop {
            let ring = inner_ring(&area, radius);
            if ring.is_empty() {
                return None;
            }
            if let Some(best) = self.best_of(ring) {
                return Some(best);
            }
            radius += 1;
        }
    }

    /// Up to `count` extra spawn tiles, one per world quadrant, skipping
    /// quadrants without a valid tile and never repeating `exclude`.
    pub fn find_spawn_points(&self, count: usize, exclude: Option<Position>) -> Vec<Position> {
        self.quadrants()
            .iter()
            .filter_map(|q| self.find_best_spawn_in_corner(*q))
            .map(|c| c.position)
            .filter(|p| Some(*p) != exclude)
            .take(count)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_room(width: u32, height: u32, room: Rect) -> TileMask {
        let mut mask = TileMask::filled(width, height, TileType::Background);
        for pos in room.positions() {
            mask.set_tile(pos, TileType::Room).unwrap();
        }
        mask
    }

    #[test]
    fn test_score_rules() {
        let mut mask = open_room(20, 20, Rect::new(2, 2, 16, 16));
        mask.set_tile(Position::new(5, 5), TileType::Corridor).unwrap();
        let planner = SpawnPlanner::new(&mask);

        assert_eq!(planner.score(Position::new(0, 0)), 0);
        assert_eq!(planner.score(Position::new(5, 5)), 0);
        // Room corner: only 3 walkable neighbours.
        assert_eq!(planner.score(Position::new(2, 2)), 0);

        // Fully open interior: 8 neighbours, 25 window cells, centre and all
        // four quadrant anchors in the same component.
        assert_eq!(planner.score(Position::new(10, 10)), 10 + 16 + 25 + 50 + 60);
    }

    #[test]
    fn test_hazard_tiles_score_zero() {
        let mask = open_room(20, 20, Rect::new(2, 2, 16, 16));
        let planner = SpawnPlanner::new(&mask).with_hazards(vec![Rect::new(9, 9, 3, 3)]);
        assert_eq!(planner.score(Position::new(10, 10)), 0);
        assert!(planner.score(Position::new(6, 6)) > 0);
    }

    #[test]
    fn test_best_spawn_prefers_clear_window() {
        let mask = open_room(30, 30, Rect::new(3, 3, 20, 20));
        let planner = SpawnPlanner::new(&mask);
        let best = planner.find_best_spawn().expect("open room has a spawn");

        assert!(best.score > 0);
        assert!(best.clear);
        assert_eq!(mask.get(best.position), Some(TileType::Room));
        assert!(planner.has_clear_window(best.position));
    }

    #[test]
    fn test_no_valid_spawn() {
        let mask = open_room(10, 10, Rect::new(2, 2, 1, 6));
        let planner = SpawnPlanner::new(&mask);
        assert_eq!(planner.find_best_spawn(), None);
    }

    #[test]
    fn test_corner_search_scans_inward() {
        let mask = open_room(40, 40, Rect::new(5, 5, 8, 8));
        let planner = SpawnPlanner::new(&mask);
        let quadrant = Rect::new(0, 0, 20, 20);

        let found = planner.find_best_spawn_in_corner(quadrant).expect("room inside quadrant");

        // Rings 0..=4 miss the room; ring 5 runs along its top row and left column.
        assert!(inner_ring(&quadrant, 5).contains(&found.position));
        assert!(found.position.x == 5 || found.position.y == 5);
        assert!(found.score > 0);
    }

    #[test]
    fn test_spawn_points_one_per_quadrant() {
        let mask = open_room(40, 40, Rect::new(2, 2, 36, 36));
        let planner = SpawnPlanner::new(&mask);
        let points = planner.find_spawn_points(4, None);

        assert_eq!(points.len(), 4);
        for (point, quadrant) in points.iter().zip(planner.quadrants()) {
            assert!(quadrant.contains(*point));
        }
        assert_eq!(planner.find_spawn_points(2, None).len(), 2);
    }
}
