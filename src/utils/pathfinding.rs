//! # Pathfinding Algorithms
//!
//! Grid searches used to reconnect isolated parts of a mask. Both searches are
//! 4-directional with unit step cost; the heavy lifting is done by the
//! `pathfinding` crate.

use crate::{Position, TileMask, TileType};
use ::pathfinding::prelude::{astar, bfs};

/// In-bounds 4-neighbours of `pos` accepted by `accept`.
fn cardinal_successors<F>(mask: &TileMask, pos: Position, accept: F) -> Vec<Position>
where
    F: Fn(Position, TileType) -> bool,
{
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter_map(|next| mask.get(next).map(|tile| (next, tile)))
        .filter(|(next, tile)| accept(*next, *tile))
        .map(|(next, _)| next)
        .collect()
}

/// Shortest path from `start` to `goal` over cells accepted by `traversable`.
///
/// Uses A* with the Manhattan heuristic, which is admissible and consistent
/// for unit-cost 4-directional moves, so the returned path is optimal. The
/// goal cell itself is always enterable. The path includes both endpoints.
///
/// # Examples
///
/// ```
/// use sectorgen::{astar_path, Position, TileMask, TileType};
///
/// let mask = TileMask::filled(5, 1, TileType::Room);
/// let path = astar_path(&mask, Position::new(0, 0), Position::new(4, 0), TileType::is_walkable);
/// assert_eq!(path.map(|p| p.len()), Some(5));
/// ```
pub fn astar_path<F>(
    mask: &TileMask,
    start: Position,
    goal: Position,
    traversable: F,
) -> Option<Vec<Position>>
where
    F: Fn(TileType) -> bool,
{
    if !mask.in_bounds(start) || !mask.in_bounds(goal) {
        return None;
    }

    astar(
        &start,
        |&pos| {
            cardinal_successors(mask, pos, |next, tile| next == goal || traversable(tile))
                .into_iter()
                .map(|next| (next, 1u32))
        },
        |&pos| pos.manhattan_distance(goal),
        |&pos| pos == goal,
    )
    .map(|(path, _cost)| path)
}

/// Breadth-first search from `start` to the nearest cell satisfying `is_goal`.
///
/// `passable` decides which cells the search may step through; goal cells are
/// entered regardless. The path includes both endpoints.
pub fn bfs_path<P, G>(
    mask: &TileMask,
    start: Position,
    passable: P,
    is_goal: G,
) -> Option<Vec<Position>>
where
    P: Fn(Position, TileType) -> bool,
    G: Fn(Position) -> bool,
{
    if !mask.in_bounds(start) {
        return None;
    }

    bfs(
        &start,
        |&pos| cardinal_successors(mask, pos, |next, tile| is_goal(next) || passable(next, tile)),
        |&pos| is_goal(pos),
    )
}

/// Nearest `Corridor` cell reachable from `start`, stepping through any cell.
///
/// This is the permissive fallback used when no path through `Room` cells
/// exists: the returned route may cross walls and background, which the
/// caller then carves.
pub fn find_path_to_nearest_corridor(mask: &TileMask, start: Position) -> Option<Vec<Position>> {
    bfs_path(
        mask,
        start,
        |_, _| true,
        |pos| mask.get(pos) == Some(TileType::Corridor),
    )
}
