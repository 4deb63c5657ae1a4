//! Circles and triangle circumcircles.

use serde::{Deserialize, Serialize};

use super::point::Point;

/// A circle described by its center and radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the circle.
    pub center: Point,
    /// Radius of the circle.
    pub radius: f64,
}

impl Circle {
    /// Creates a circle from center and radius.
    #[must_use]
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Closed containment test: `true` when the squared distance from the
    /// center is at most the squared radius, so points exactly on the circle
    /// are contained. The Bowyer-Watson bad-triangle search relies on the
    /// closed form to treat cocircular sites as conflicts.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        self.center.distance_squared_to(point) <= self.radius * self.radius
    }

    /// Circumcircle of the triangle `(a, b, c)`: the unique circle through
    /// all three vertices, from the closed-form solution of the
    /// perpendicular-bisector system.
    ///
    /// Returns `None` for collinear input, where no finite circumcircle
    /// exists. Degenerate seed-fan triangles over a concave border therefore
    /// never register as Bowyer-Watson conflicts.
    #[must_use]
    pub fn circumscribing(a: Point, b: Point, c: Point) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d == 0.0 {
            return None;
        }

        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;

        let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
        let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;

        let center = Point::new(ux, uy);
        Some(Self::new(center, center.distance_to(a)))
    }
}
