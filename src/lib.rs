//! # voronoi-tessellation
//!
//! Computes a planar subdivision of a bounded region into simple polygons
//! approximating a Voronoi tessellation. The diagram is derived from an
//! incrementally constructed Delaunay triangulation (Bowyer-Watson) and
//! clipped to an arbitrary, not necessarily convex, border polygon.
//!
//! # Pipeline
//!
//! The computation is a strict pipeline; each stage consumes and replaces the
//! previous stage's live point/segment/face collections:
//!
//! 1. **Triangulation** - interior sites are sampled inside the border with a
//!    seeded RNG, the triangulation is seeded with a centroid fan over the
//!    border, and sites are inserted one at a time with the Bowyer-Watson
//!    cavity algorithm.
//! 2. **Voronoi dual** - every interior Delaunay edge contributes a Voronoi
//!    edge between the circumcenters of its two incident triangles; open
//!    (unbounded) cells along the border are approximated with long
//!    perpendicular-bisector segments.
//! 3. **Border clip** - Voronoi edges are chopped against the border polygon,
//!    the border itself is split into sub-segments at every crossing, and the
//!    resulting border cycle is rewound into one consistent orientation.
//! 4. **Face assembly** - the surviving segment soup is treated as a planar
//!    graph and faces are extracted with a leftmost-turn walk.
//!
//! # Basic Usage
//!
//! ```rust
//! use voronoi_tessellation::prelude::*;
//!
//! let border = Polygon::new(vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(0.0, 100.0),
//!     Point::new(100.0, 100.0),
//!     Point::new(100.0, 0.0),
//! ])
//! .unwrap();
//!
//! let cells = tessellate(&border, 0, 42).unwrap();
//!
//! // With no interior sites the tessellation is the border region itself.
//! assert_eq!(cells.len(), 1);
//! ```
//!
//! # Determinism
//!
//! For identical `(border, point_count, seed)` arguments the output is
//! bit-identical across runs. The seed drives interior site sampling only;
//! every later stage is fully determined by the site set.
//!
//! # Error Handling
//!
//! Geometric predicates are total functions and never fail. The stage
//! algorithms report degenerate configurations as typed, recoverable
//! [`TessellationError`](core::TessellationError)s rather than panicking;
//! a failing call leaves no partial result behind.

#![forbid(unsafe_code)]

pub mod core;
pub mod geometry;

/// Commonly used types, re-exported for convenient glob imports.
pub mod prelude {
    pub use crate::core::{Snapshot, Stage, TessellationError, Tessellator, tessellate};
    pub use crate::geometry::{
        Circle, DEFAULT_MERGE_TOLERANCE, Point, Polygon, PolygonError, Segment, SegmentError,
        SegmentIntersection, Winding,
    };
}
