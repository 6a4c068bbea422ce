use std::fmt::{self, Display};
use std::ops::{Add, Sub};

use serde::Serialize;

/// A point in the unit square. The domain is a torus, but [`Position::squared_distance`] is the
/// plain Euclidean distance and does not look across the seam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn squared_norm(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn squared_distance(self, other: Position) -> f64 {
        (self - other).squared_norm()
    }

    /// Folds each coordinate back into the unit square by adding or subtracting 1 at most once.
    /// A coordinate more than one domain width outside stays outside. A tiny negative coordinate
    /// whose sum with 1 rounds up to exactly 1 folds to 0, the same point on the torus.
    #[must_use]
    pub fn wrapped_once(self) -> Position {
        Position {
            x: wrap_once(self.x),
            y: wrap_once(self.y),
        }
    }
}

fn wrap_once(coordinate: f64) -> f64 {
    if coordinate >= 1.0 {
        coordinate - 1.0
    } else if coordinate < 0.0 {
        let wrapped = coordinate + 1.0;
        if wrapped >= 1.0 {
            0.0
        } else {
            wrapped
        }
    } else {
        coordinate
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
