//! # Grid Module
//!
//! Integer grid primitives shared by every generation stage.
//!
//! - [`Position`]: a cell coordinate
//! - [`Direction`]: the four cardinal steps used by carving and flood fill
//! - [`Rect`]: an axis-aligned rectangle of cells (rooms, hazard patches, search regions)
//! - [`TileMask`]: the per-cell semantic classification

pub mod mask;

pub use mask::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D cell coordinate.
///
/// # Examples
///
/// ```
/// use sectorgen::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorgen::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Chebyshev (king move) distance to another position.
    pub fn chebyshev_distance(self, other: Position) -> u32 {
        (self.x - other.x).abs().max((self.y - other.y).abs()) as u32
    }

    /// Squared Euclidean distance, exact in integers.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Returns all 8 adjacent positions (including diagonals).
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1), // NW
            Position::new(self.x, self.y - 1),     // N
            Position::new(self.x + 1, self.y - 1), // NE
            Position::new(self.x - 1, self.y),     // W
            Position::new(self.x + 1, self.y),     // E
            Position::new(self.x - 1, self.y + 1), // SW
            Position::new(self.x, self.y + 1),     // S
            Position::new(self.x + 1, self.y + 1), // SE
        ]
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x - 1, self.y), // W
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x, self.y + 1), // S
        ]
    }

    /// Moves one step in the given direction.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Cardinal directions used for carving and adjacency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorgen::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Returns the opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Whether the direction runs along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    /// Returns all 4 cardinal directions.
    pub fn cardinal() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
        ]
    }
}

/// Axis-aligned rectangle of grid cells.
///
/// `position` is the top-left cell and `size` the extent, so the rectangle
/// covers `position.x..position.x + size.x` horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub position: Position,
    pub size: Position,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and extent.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorgen::{Position, Rect};
    ///
    /// let room = Rect::new(5, 5, 10, 8);
    /// assert_eq!(room.end(), Position::new(15, 13));
    /// assert_eq!(room.area(), 80);
    /// ```
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            position: Position::new(x, y),
            size: Position::new(width, height),
        }
    }

    pub fn width(&self) -> i32 {
        self.size.x
    }

    pub fn height(&self) -> i32 {
        self.size.y
    }

    /// One past the bottom-right cell.
    pub fn end(&self) -> Position {
        self.position + self.size
    }

    /// Gets the center cell of the rectangle.
    pub fn center(&self) -> Position {
        Position::new(
            self.position.x + self.size.x / 2,
            self.position.y + self.size.y / 2,
        )
    }

    /// Gets the area of the rectangle in cells.
    pub fn area(&self) -> i32 {
        self.size.x.max(0) * self.size.y.max(0)
    }

    /// Checks if a cell is inside this rectangle.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.position.x
            && pos.y >= self.position.y
            && pos.x < self.position.x + self.size.x
            && pos.y < self.position.y + self.size.y
    }

    /// Strict overlap test. Rectangles that only share an edge do not intersect.
    ///
    /// # Examples
    ///
    /// ```
    /// use sectorgen::Rect;
    ///
    /// let a = Rect::new(0, 0, 4, 4);
    /// assert!(a.intersects(&Rect::new(3, 3, 4, 4)));
    /// assert!(!a.intersects(&Rect::new(4, 0, 4, 4)));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        self.position.x < other.position.x + other.size.x
            && other.position.x < self.position.x + self.size.x
            && self.position.y < other.position.y + other.size.y
            && other.position.y < self.position.y + self.size.y
    }

    /// Returns the rectangle expanded by `amount` cells on every side.
    pub fn grow(&self, amount: i32) -> Rect {
        Rect::new(
            self.position.x - amount,
            self.position.y - amount,
            self.size.x + amount * 2,
            self.size.y + amount * 2,
        )
    }

    /// Translates the rectangle by an offset.
    pub fn translated(&self, offset: Position) -> Rect {
        Rect {
            position: self.position + offset,
            size: self.size,
        }
    }

    /// Closest cell inside the rectangle to `pos`.
    pub fn clamp(&self, pos: Position) -> Position {
        Position::new(
            pos.x.clamp(self.position.x, self.position.x + self.size.x - 1),
            pos.y.clamp(self.position.y, self.position.y + self.size.y - 1),
        )
    }

    /// All cells covered by the rectangle, row by row.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let Rect { position, size } = *self;
        (position.y..position.y + size.y)
            .flat_map(move |y| (position.x..position.x + size.x).map(move |x| Position::new(x, y)))
    }

    /// Cells strictly inside the one-cell border.
    pub fn interior_positions(&self) -> impl Iterator<Item = Position> {
        let inner = self.grow(-1);
        inner.positions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distances() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert_eq!(a.manhattan_distance(b), 7);
        assert_eq!(a.chebyshev_distance(b), 4);
        assert_eq!(a.distance_squared(b), 25);
    }

    #[test]
    fn test_position_cardinal_adjacent() {
        let pos = Position::new(5, 5);
        let adjacent = pos.cardinal_adjacent_positions();
        assert!(adjacent.contains(&Position::new(5, 4)));
        assert!(adjacent.contains(&Position::new(4, 5)));
        assert!(!adjacent.contains(&Position::new(4, 4)));
    }

    #[test]
    fn test_direction_opposites() {
        for direction in Direction::cardinal() {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(
                direction.to_delta() + direction.opposite().to_delta(),
                Position::origin()
            );
        }
        assert!(Direction::East.is_horizontal());
        assert!(!Direction::North.is_horizontal());
    }

    #[test]
    fn test_rect_geometry() {
        let room = Rect::new(5, 5, 10, 8);
        assert_eq!(room.center(), Position::new(10, 9));
        assert!(room.contains(Position::new(5, 5)));
        assert!(room.contains(Position::new(14, 12)));
        assert!(!room.contains(Position::new(15, 12)));
        assert_eq!(room.positions().count(), 80);
        assert_eq!(room.interior_positions().count(), 48);
    }

    #[test]
    fn test_rect_grow_and_intersect() {
        let a = Rect::new(10, 10, 5, 5);
        let b = Rect::new(17, 10, 5, 5);
        assert!(!a.intersects(&b));
        assert!(!a.grow(2).intersects(&b));
        assert!(a.grow(3).intersects(&b));
    }

    #[test]
    fn test_rect_clamp() {
        let room = Rect::new(5, 5, 4, 4);
        assert_eq!(room.clamp(Position::new(0, 6)), Position::new(5, 6));
        assert_eq!(room.clamp(Position::new(20, 20)), Position::new(8, 8));
        assert_eq!(room.clamp(Position::new(6, 6)), Position::new(6, 6));
    }
}
