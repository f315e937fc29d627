//! # Utilities Module
//!
//! Distance math and grid pathfinding shared by the generation and repair stages.

pub mod math;
pub mod pathfinding;

pub use self::math::*;
pub use self::pathfinding::*;
