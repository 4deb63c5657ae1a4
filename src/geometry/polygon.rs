//! Polygons: vertex rings with derived edges, area, winding, and containment.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::circle::Circle;
use super::point::Point;
use super::segment::Segment;

/// Errors that can occur when constructing a [`Polygon`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PolygonError {
    /// Fewer than three vertices were supplied.
    #[error("polygon requires at least 3 vertices, got {actual}")]
    TooFewVertices {
        /// Number of vertices supplied.
        actual: usize,
    },
    /// Fewer than three *distinct* vertex values were supplied.
    #[error("polygon requires at least 3 distinct vertices, got {distinct}")]
    TooFewDistinctVertices {
        /// Number of distinct vertex values supplied.
        distinct: usize,
    },
}

/// Traversal direction of a polygon's vertex ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Winding {
    /// Negative signed area.
    Clockwise,
    /// Positive signed area.
    CounterClockwise,
}

/// An ordered ring of at least three distinct vertices.
///
/// The vertex order is preserved exactly as given; no normalization of
/// winding or starting vertex is performed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Creates a polygon from an ordered vertex ring.
    ///
    /// # Errors
    ///
    /// Returns a [`PolygonError`] when fewer than three vertices, or fewer
    /// than three distinct vertex values, are supplied.
    pub fn new(vertices: Vec<Point>) -> Result<Self, PolygonError> {
        if vertices.len() < 3 {
            return Err(PolygonError::TooFewVertices {
                actual: vertices.len(),
            });
        }
        let mut distinct: Vec<Point> = Vec::with_capacity(vertices.len());
        for v in &vertices {
            if !distinct.contains(v) {
                distinct.push(*v);
            }
        }
        if distinct.len() < 3 {
            return Err(PolygonError::TooFewDistinctVertices {
                distinct: distinct.len(),
            });
        }
        Ok(Self { vertices })
    }

    /// The vertex ring.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Edges as consecutive vertex pairs, wrapping from the last vertex back
    /// to the first.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| {
            Segment::from_distinct(self.vertices[i], self.vertices[(i + 1) % n])
        })
    }

    /// Vertex average. This is the fan center used to seed the border
    /// triangulation, not the area centroid.
    #[must_use]
    pub fn centroid(&self) -> Point {
        let mut sum = Point::default();
        for v in &self.vertices {
            sum = sum + *v;
        }
        // Constructor guarantees a non-empty ring.
        sum * (1.0 / self.vertices.len() as f64)
    }

    /// Signed shoelace area: positive for counter-clockwise rings.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut sum = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            sum += a.x * b.y - b.x * a.y;
        }
        sum / 2.0
    }

    /// Absolute enclosed area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Winding direction, from the sign of the shoelace area.
    #[must_use]
    pub fn winding(&self) -> Winding {
        if self.signed_area() < 0.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }

    /// Circumcircle of the polygon, defined only for triangles. Returns
    /// `None` for other vertex counts and for collinear triangles.
    #[must_use]
    pub fn circumcircle(&self) -> Option<Circle> {
        if self.vertices.len() != 3 {
            return None;
        }
        Circle::circumscribing(self.vertices[0], self.vertices[1], self.vertices[2])
    }

    /// Even-odd point-in-polygon test, with points on the boundary counted
    /// as inside.
    ///
    /// The boundary-inclusive rule is a requirement of the clipping stage:
    /// chop intersection points and border sub-segment endpoints lie exactly
    /// on the border, and the final external-segment sweep must not discard
    /// them.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        if self.edges().any(|e| e.contains_point(p)) {
            return true;
        }

        let n = self.vertices.len();
        let mut inside = false;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if p.x < x_cross {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "polygon[")?;
        for (i, v) in self.vertices.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}
