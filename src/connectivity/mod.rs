//! # Connectivity
//!
//! Flood-fill component labeling over a mask and the repair passes that keep
//! a stitched world fully walkable.
//!
//! Repair functions mutate the mask in place and report which cells they
//! touched, so the caller can paint tiles and mirror the changes into the
//! owning sections.

pub mod spawn;

pub use spawn::*;

use crate::{
    astar_path, bfs_path, centroid, find_path_to_nearest_corridor, nearest_to, Position,
    TileMask, TileType,
};
use std::collections::VecDeque;

/// Result of a flood-fill labeling pass.
///
/// Ids start at 1; id 0 marks a cell outside every component. Two cells share
/// an id exactly when a 4-directional path of accepted cells joins them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTable {
    width: u32,
    height: u32,
    ids: Vec<u32>,
    sizes: Vec<usize>,
}

impl ComponentTable {
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    /// Number of components.
    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    /// Whether the accepted cells split into more than one component.
    pub fn is_fragmented(&self) -> bool {
        self.count() > 1
    }

    /// Component id of a cell, `None` if the cell is unlabeled.
    pub fn component_of(&self, pos: Position) -> Option<u32> {
        self.index(pos)
            .map(|idx| self.ids[idx])
            .filter(|id| *id != 0)
    }

    /// Cell count of a component.
    pub fn size_of(&self, id: u32) -> usize {
        id.checked_sub(1)
            .and_then(|i| self.sizes.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Ids of every component in labeling order.
    pub fn ids(&self) -> impl Iterator<Item = u32> {
        1..=self.sizes.len() as u32
    }

    /// The largest component; the lowest id wins ties.
    pub fn largest(&self) -> Option<u32> {
        let mut best: Option<(usize, u32)> = None;
        for id in self.ids() {
            let size = self.size_of(id);
            if best.map_or(true, |(best_size, _)| size > best_size) {
                best = Some((size, id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Cells of a component in row-major order.
    pub fn cells_of(&self, id: u32) -> Vec<Position> {
        let width = self.width as usize;
        self.ids
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == id)
            .map(|(idx, _)| Position::new((idx % width) as i32, (idx / width) as i32))
            .collect()
    }
}

/// Labels the 4-connected components of cells whose tile satisfies `accept`.
///
/// Components are numbered in the row-major order of their first cell.
///
/// # Examples
///
/// ```
/// use sectorgen::{label_components, Position, TileMask, TileType};
///
/// let mut mask = TileMask::filled(5, 1, TileType::Room);
/// mask.set_tile(Position::new(2, 0), TileType::Wall).unwrap();
/// let table = label_components(&mask, |t| t == TileType::Room);
/// assert_eq!(table.count(), 2);
/// assert!(table.is_fragmented());
/// ```
pub fn label_components<F>(mask: &TileMask, accept: F) -> ComponentTable
where
    F: Fn(TileType) -> bool,
{
    let mut table = ComponentTable {
        width: mask.width,
        height: mask.height,
        ids: vec![0; mask.width as usize * mask.height as usize],
        sizes: Vec::new(),
    };

    let mut queue = VecDeque::new();
    for (start, tile) in mask.iter() {
        let Some(start_idx) = table.index(start) else {
            continue;
        };
        if !accept(tile) || table.ids[start_idx] != 0 {
            continue;
        }

        let id = table.sizes.len() as u32 + 1;
        let mut size = 0;
        table.ids[start_idx] = id;
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            size += 1;
            for next in pos.cardinal_adjacent_positions() {
                let Some(next_idx) = table.index(next) else {
                    continue;
                };
                if table.ids[next_idx] == 0 && accept(mask.tile_or_none(next)) {
                    table.ids[next_idx] = id;
                    queue.push_back(next);
                }
            }
        }
        table.sizes.push(size);
    }

    table
}

/// Component whose cell lies nearest to the geometric centre of the mask.
pub fn find_central_component(mask: &TileMask, table: &ComponentTable) -> Option<u32> {
    let center = Position::new(mask.width as i32 / 2, mask.height as i32 / 2);
    let labeled = mask.positions().filter(|p| table.component_of(*p).is_some());
    nearest_to(labeled, center).and_then(|pos| table.component_of(pos))
}

/// Cells changed by a repair pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Components that received a connecting path
    pub components_connected: usize,
    /// Cells turned into `Corridor`
    pub carved: Vec<Position>,
    /// Cells reverted to `Background`
    pub pruned: Vec<Position>,
}

impl RepairReport {
    pub fn merge(&mut self, other: RepairReport) {
        self.components_connected += other.components_connected;
        self.carved.extend(other.carved);
        self.pruned.extend(other.pruned);
    }

    pub fn is_empty(&self) -> bool {
        self.components_connected == 0 && self.carved.is_empty() && self.pruned.is_empty()
    }
}

/// Marks every non-walkable cell of `path` as `Corridor`, recording it.
fn carve_path(mask: &mut TileMask, path: &[Position], carved: &mut Vec<Position>) {
    for &pos in path {
        if mask.is_walkable(pos) {
            continue;
        }
        if mask.set_tile(pos, TileType::Corridor).is_ok() {
            carved.push(pos);
        }
    }
}

/// Connects every `Room` component that does not touch a corridor.
///
/// For each such component the member nearest its centroid is joined to the
/// globally nearest `Corridor` cell: first by A* over `Room` cells, and if
/// that fails by the permissive breadth-first route to the nearest corridor.
/// Masks without any corridor are left unchanged.
pub fn repair_isolated_components(mask: &mut TileMask) -> RepairReport {
    let mut report = RepairReport::default();
    let rooms = label_components(mask, |t| t == TileType::Room);

    for id in rooms.ids() {
        let cells = rooms.cells_of(id);
        if cells
            .iter()
            .any(|c| mask.has_cardinal_neighbor(*c, TileType::Corridor))
        {
            continue;
        }

        let Some(start) = centroid(&cells).and_then(|c| nearest_to(cells.iter().copied(), c)) else {
            continue;
        };
        let Some(target) = nearest_to(mask.positions_of(TileType::Corridor), start) else {
            log::debug!("No corridor to connect room component {} to", id);
            continue;
        };

        let path = astar_path(mask, start, target, |t| t == TileType::Room)
            .or_else(|| find_path_to_nearest_corridor(mask, start));
        match path {
            Some(path) => {
                carve_path(mask, &path, &mut report.carved);
                report.components_connected += 1;
                log::debug!(
                    "Connected room component {} ({} cells) from {:?}",
                    id,
                    cells.len(),
                    start
                );
            }
            None => log::warn!("No path from room component {} to any corridor", id),
        }
    }

    report
}

/// Joins every walkable component to the largest one.
///
/// Each smaller component is connected by the shortest breadth-first route
/// from its centroid-nearest member to the largest component, avoiding
/// obstacles when possible. Afterwards the mask has at most one walkable
/// component.
pub fn connect_walkable_network(mask: &mut TileMask) -> RepairReport {
    let mut report = RepairReport::default();
    let initial = label_components(mask, TileType::is_walkable).count();

    for _ in 0..initial {
        let table = label_components(mask, TileType::is_walkable);
        if !table.is_fragmented() {
            break;
        }
        let Some(main) = table.largest() else {
            break;
        };
        let Some(stray) = table.ids().find(|id| *id != main) else {
            break;
        };

        let cells = table.cells_of(stray);
        let Some(start) = centroid(&cells).and_then(|c| nearest_to(cells.iter().copied(), c)) else {
            break;
        };
        let in_main = |pos: Position| table.component_of(pos) == Some(main);
        let path = bfs_path(mask, start, |_, t| t != TileType::Decoration, in_main)
            .or_else(|| bfs_path(mask, start, |_, _| true, in_main));

        let Some(path) = path else {
            log::warn!("Walkable component {} cannot reach the main network", stray);
            break;
        };
        carve_path(mask, &path, &mut report.carved);
        report.components_connected += 1;
    }

    report
}

/// Keeps the walkable component that holds the largest `Room` component and
/// reverts every walkable cell outside it to `Background`, returning the
/// pruned cells.
///
/// Corridor-only networks never win over rooms. A mask without rooms keeps
/// its largest walkable component.
pub fn preserve_largest_walkable_component(mask: &mut TileMask) -> Vec<Position> {
    let table = label_components(mask, TileType::is_walkable);
    let rooms = label_components(mask, |t| t == TileType::Room);
    let main = rooms
        .largest()
        .and_then(|id| rooms.cells_of(id).first().copied())
        .and_then(|cell| table.component_of(cell))
        .or_else(|| table.largest());
    let Some(main) = main else {
        return Vec::new();
    };

    let mut doomed: Vec<Position> = mask
        .positions()
        .filter(|p| matches!(table.component_of(*p), Some(id) if id != main))
        .collect();
    doomed.retain(|pos| mask.set_tile(*pos, TileType::Background).is_ok());
    if !doomed.is_empty() {
        log::debug!(
            "Pruned {} cells outside the main component ({} cells)",
            doomed.len(),
            table.size_of(main)
        );
    }
    doomed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;

    /// Two rooms and a corridor touching only the left one.
    fn split_mask() -> TileMask {
        let mut mask = TileMask::filled(30, 12, TileType::Background);
        for pos in Rect::new(2, 2, 5, 5).positions() {
            mask.set_tile(pos, TileType::Room).unwrap();
        }
        for pos in Rect::new(20, 3, 6, 6).positions() {
            mask.set_tile(pos, TileType::Room).unwrap();
        }
        for x in 7..12 {
            mask.set_tile(Position::new(x, 4), TileType::Corridor).unwrap();
        }
        mask
    }

    #[test]
    fn test_labels_partition_room_cells() {
        let mask = split_mask();
        let table = label_components(&mask, |t| t == TileType::Room);

        assert_eq!(table.count(), 2);
        assert_eq!(table.size_of(1), 25);
        assert_eq!(table.size_of(2), 36);
        assert_eq!(table.largest(), Some(2));
        for (pos, tile) in mask.iter() {
            assert_eq!(table.component_of(pos).is_some(), tile == TileType::Room);
        }
        assert_eq!(table.component_of(Position::new(-1, 0)), None);
    }

    #[test]
    fn test_walkable_labeling_includes_corridors() {
        let mask = split_mask();
        let table = label_components(&mask, TileType::is_walkable);
        assert_eq!(table.count(), 2);
        assert_eq!(table.size_of(1), 25 + 5);
    }

    #[test]
    fn test_central_component() {
        let mut mask = TileMask::filled(21, 21, TileType::Background);
        mask.set_tile(Position::new(0, 0), TileType::Room).unwrap();
        mask.set_tile(Position::new(11, 10), TileType::Room).unwrap();
        let table = label_components(&mask, TileType::is_walkable);
        assert_eq!(find_central_component(&mask, &table), Some(2));
    }

    #[test]
    fn test_repair_connects_isolated_room() {
        let mut mask = split_mask();
        let report = repair_isolated_components(&mut mask);

        assert_eq!(report.components_connected, 1);
        assert!(!report.carved.is_empty());
        for pos in &report.carved {
            assert_eq!(mask.get(*pos), Some(TileType::Corridor));
        }
        assert_eq!(label_components(&mask, TileType::is_walkable).count(), 1);
    }

    #[test]
    fn test_repair_without_corridors_is_noop() {
        let mut mask = TileMask::filled(10, 10, TileType::Background);
        mask.set_tile(Position::new(4, 4), TileType::Room).unwrap();
        let before = mask.clone();
        let report = repair_isolated_components(&mut mask);
        assert!(report.is_empty());
        assert_eq!(mask, before);
    }

    #[test]
    fn test_walkable_network_joins_everything() {
        let mut mask = TileMask::filled(40, 20, TileType::Wall);
        for pos in Rect::new(1, 1, 4, 4).positions() {
            mask.set_tile(pos, TileType::Room).unwrap();
        }
        for pos in Rect::new(30, 12, 6, 6).positions() {
            mask.set_tile(pos, TileType::Room).unwrap();
        }
        for pos in Rect::new(36, 0, 3, 3).positions() {
            mask.set_tile(pos, TileType::Corridor).unwrap();
        }

        let report = connect_walkable_network(&mut mask);

        assert_eq!(report.components_connected, 2);
        assert_eq!(label_components(&mask, TileType::is_walkable).count(), 1);
    }

    #[test]
    fn test_network_routes_around_obstacles() {
        let mut mask = TileMask::filled(9, 5, TileType::Background);
        mask.set_tile(Position::new(0, 2), TileType::Room).unwrap();
        mask.set_tile(Position::new(8, 2), TileType::Room).unwrap();
        mask.set_tile(Position::new(8, 1), TileType::Room).unwrap();
        mask.set_tile(Position::new(4, 2), TileType::Decoration).unwrap();

        connect_walkable_network(&mut mask);

        assert_eq!(mask.get(Position::new(4, 2)), Some(TileType::Decoration));
        assert_eq!(label_components(&mask, TileType::is_walkable).count(), 1);
    }

    #[test]
    fn test_prune_keeps_largest() {
        let mut mask = split_mask();
        let pruned = preserve_largest_walkable_component(&mut mask);

        // The left room plus its corridor stub (30 cells) loses to 36.
        assert_eq!(pruned.len(), 30);
        assert_eq!(mask.count(TileType::Corridor), 0);
        assert_eq!(mask.count(TileType::Room), 36);
        assert!(!label_components(&mask, TileType::is_walkable).is_fragmented());
    }

    #[test]
    fn test_prune_never_keeps_corridors_over_rooms() {
        let mut mask = TileMask::filled(40, 12, TileType::Background);
        for pos in Rect::new(2, 2, 3, 3).positions() {
            mask.set_tile(pos, TileType::Room).unwrap();
        }
        // Corridor network of 60 cells, far larger than the 9-cell room.
        for pos in Rect::new(10, 4, 30, 2).positions() {
            mask.set_tile(pos, TileType::Corridor).unwrap();
        }

        let pruned = preserve_largest_walkable_component(&mut mask);

        assert_eq!(pruned.len(), 60);
        assert_eq!(mask.count(TileType::Room), 9);
        assert_eq!(mask.count(TileType::Corridor), 0);
    }

    #[test]
    fn test_prune_without_rooms_keeps_largest_walkable() {
        let mut mask = TileMask::filled(20, 5, TileType::Background);
        mask.set_tile(Position::new(1, 1), TileType::Corridor).unwrap();
        for x in 5..10 {
            mask.set_tile(Position::new(x, 2), TileType::Corridor).unwrap();
        }

        let pruned = preserve_largest_walkable_component(&mut mask);

        assert_eq!(pruned, vec![Position::new(1, 1)]);
        assert_eq!(mask.count(TileType::Corridor), 5);
    }
}
