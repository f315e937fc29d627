//! # Grid Mathematics
//!
//! Small geometric helpers over cell collections.

use crate::{Position, Rect};

/// Integer centroid of a set of cells, `None` for an empty set.
pub fn centroid(cells: &[Position]) -> Option<Position> {
    if cells.is_empty() {
        return None;
    }
    let (sum_x, sum_y) = cells.iter().fold((0i64, 0i64), |(sx, sy), p| {
        (sx + p.x as i64, sy + p.y as i64)
    });
    let n = cells.len() as i64;
    Some(Position::new((sum_x / n) as i32, (sum_y / n) as i32))
}

/// Cell nearest to `target` by squared Euclidean distance.
///
/// Ties resolve to the earliest cell in iteration order, which keeps the
/// choice deterministic for row-major scans.
pub fn nearest_to<I>(cells: I, target: Position) -> Option<Position>
where
    I: IntoIterator<Item = Position>,
{
    let mut best: Option<(i64, Position)> = None;
    for cell in cells {
        let d = cell.distance_squared(target);
        if best.map_or(true, |(best_d, _)| d < best_d) {
            best = Some((d, cell));
        }
    }
    best.map(|(_, cell)| cell)
}

/// Cells of the ring `radius` steps inside the border of `rect`.
///
/// Radius 0 is the border itself. Cells are returned clockwise from the
/// top-left; an empty vector means the rectangle has no ring that deep.
pub fn inner_ring(rect: &Rect, radius: i32) -> Vec<Position> {
    let inner = rect.grow(-radius);
    let (w, h) = (inner.width(), inner.height());
    if w <= 0 || h <= 0 {
        return Vec::new();
    }
    let Position { x: x0, y: y0 } = inner.position;
    let (x1, y1) = (x0 + w - 1, y0 + h - 1);
    if w == 1 || h == 1 {
        return inner.positions().collect();
    }

    let mut ring = Vec::with_capacity((2 * (w + h) - 4) as usize);
    ring.extend((x0..=x1).map(|x| Position::new(x, y0)));
    ring.extend((y0 + 1..=y1).map(|y| Position::new(x1, y)));
    ring.extend((x0..x1).rev().map(|x| Position::new(x, y1)));
    ring.extend((y0 + 1..y1).rev().map(|y| Position::new(x0, y)));
    ring
}

/// Square window of side `2 * radius + 1` centred on `center`.
pub fn window(center: Position, radius: i32) -> impl Iterator<Item = Position> {
    Rect::new(
        center.x - radius,
        center.y - radius,
        radius * 2 + 1,
        radius * 2 + 1,
    )
    .positions()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_centroid() {
        let cells = [Position::new(0, 0), Position::new(4, 0), Position::new(2, 6)];
        assert_eq!(centroid(&cells), Some(Position::new(2, 2)));
        assert_eq!(centroid(&[]), None);
    }

    #[test]
    fn test_nearest_prefers_first_on_tie() {
        let cells = vec![Position::new(1, 0), Position::new(-1, 0), Position::new(5, 5)];
        assert_eq!(nearest_to(cells, Position::origin()), Some(Position::new(1, 0)));
    }

    #[test]
    fn test_inner_ring_sizes() {
        let rect = Rect::new(0, 0, 6, 4);
        let border = inner_ring(&rect, 0);
        assert_eq!(border.len(), 16);
        assert_eq!(border.iter().collect::<HashSet<_>>().len(), 16);

        let inner = inner_ring(&rect, 1);
        assert_eq!(inner.len(), 4 * 2);
        assert!(inner.iter().all(|p| p.y == 1 || p.y == 2));

        assert!(inner_ring(&rect, 2).is_empty());
    }

    #[test]
    fn test_window() {
        let cells: Vec<_> = window(Position::new(5, 5), 2).collect();
        assert_eq!(cells.len(), 25);
        assert!(cells.contains(&Position::new(3, 3)));
        assert!(cells.contains(&Position::new(7, 7)));
    }
}
