//! Fundamental planar geometric types for truss modelling.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Position in the plane measured in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (other.to_vector() - self.to_vector()).norm()
    }
}

/// Planar force in newtons.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Force {
    /// Component along the global X axis.
    pub x: f64,
    /// Component along the global Y axis.
    pub y: f64,
}

impl Force {
    /// Create a [`Force`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Joint translation in metres.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Displacement {
    /// Component along the global X axis.
    pub x: f64,
    /// Component along the global Y axis.
    pub y: f64,
}

impl Displacement {
    /// Create a [`Displacement`] with explicit components.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Direction cosines of a member axis measured from its start node.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionCosines {
    /// Cosine of the angle to the global X axis, `Δx / L`.
    pub c: f64,
    /// Sine of the angle to the global X axis, `Δy / L`.
    pub s: f64,
}

impl DirectionCosines {
    /// Compute the length and direction cosines of the segment `start → end`.
    ///
    /// Returns `None` when the points coincide.
    #[must_use]
    pub fn between(start: Point, end: Point) -> Option<(f64, Self)> {
        let length = start.distance_to(end);
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some((
            length,
            Self {
                c: (end.x - start.x) / length,
                s: (end.y - start.y) / length,
            },
        ))
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use truss2d::point;
///
/// let origin = point(0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}
