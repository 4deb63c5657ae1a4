//! Pure geometric value types and predicates.
//!
//! Everything in this module is a total function over well-formed inputs:
//! predicates never return errors, only constructors do. Equality on
//! [`Point`] is exact value equality; deduplication with a tolerance happens
//! at the arena boundary in [`crate::core`], not here.

pub mod circle;
pub mod point;
pub mod polygon;
pub mod segment;

pub use circle::Circle;
pub use point::{DEFAULT_MERGE_TOLERANCE, Point};
pub use polygon::{Polygon, PolygonError, Winding};
pub use segment::{Segment, SegmentError, SegmentIntersection};
