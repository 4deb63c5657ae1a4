//! Line segments and segment-segment intersection.
//!
//! The intersection predicate distinguishes a segment crossing another's
//! *interior* from merely touching at an endpoint. Downstream clipping and
//! face assembly treat those two cases completely differently: a proper
//! crossing splits a segment, an endpoint touch never does.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::point::{DEFAULT_MERGE_TOLERANCE, Point};

/// Maximum distance from the carrying line for [`Segment::contains_point`].
const ON_SEGMENT_TOLERANCE: f64 = 1e-6;

/// Errors that can occur when constructing a [`Segment`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SegmentError {
    /// Both endpoints were the same point.
    #[error("segment endpoints must be distinct")]
    CoincidentEndpoints,
}

/// Result of intersecting one segment with another.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentIntersection {
    /// Whether the segments meet at all (crossing or endpoint touch).
    pub intersects: bool,
    /// The meeting point, when one exists.
    pub point: Option<Point>,
    /// True when the meeting point coincides with an endpoint of either
    /// segment, i.e. the segments touch rather than cross each other's
    /// interior.
    pub endpoint_touch: bool,
}

impl SegmentIntersection {
    const NONE: Self = Self {
        intersects: false,
        point: None,
        endpoint_touch: false,
    };

    /// True only for a proper interior crossing.
    #[must_use]
    pub fn crosses(&self) -> bool {
        self.intersects && !self.endpoint_touch
    }
}

/// A pair of distinct endpoints.
///
/// A segment is logically an unordered pair ([`PartialEq`] compares both
/// orientations), but the stored `start`/`end` order is observable and the
/// clipping pipeline relies on it when it rewinds the border cycle.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Segment {
    /// First endpoint as stored.
    pub start: Point,
    /// Second endpoint as stored.
    pub end: Point,
}

impl Segment {
    /// Creates a segment, rejecting coincident endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::CoincidentEndpoints`] if `start == end`.
    pub fn new(start: Point, end: Point) -> Result<Self, SegmentError> {
        if start == end {
            return Err(SegmentError::CoincidentEndpoints);
        }
        Ok(Self { start, end })
    }

    /// Constructs a segment whose endpoints are already known to be distinct
    /// (e.g. they come from distinct arena keys).
    #[must_use]
    pub(crate) fn from_distinct(start: Point, end: Point) -> Self {
        debug_assert_ne!(start, end, "segment endpoints must be distinct");
        Self { start, end }
    }

    /// Midpoint of the segment.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Slope of the carrying line. Vertical segments yield `±inf`, matching
    /// plain double division; callers special-case where that matters.
    #[must_use]
    pub fn slope(&self) -> f64 {
        (self.end.y - self.start.y) / (self.end.x - self.start.x)
    }

    /// Direction vector `end - start`.
    #[must_use]
    pub fn direction(&self) -> Point {
        self.end - self.start
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(self.end)
    }

    /// Squared segment length, cheaper when only comparisons are needed.
    #[must_use]
    pub fn length_squared(&self) -> f64 {
        self.start.distance_squared_to(self.end)
    }

    /// Whether `p` lies on this segment, within a small distance tolerance.
    #[must_use]
    pub fn contains_point(&self, p: Point) -> bool {
        let d = self.direction();
        let ap = p - self.start;
        let len = d.magnitude();
        // Perpendicular distance from the carrying line.
        if (d.cross(ap) / len).abs() > ON_SEGMENT_TOLERANCE {
            return false;
        }
        let t = d.dot(ap);
        t >= -ON_SEGMENT_TOLERANCE * len && t <= len * len + ON_SEGMENT_TOLERANCE * len
    }

    /// Intersects this segment with `other`.
    ///
    /// Uses the parametric formulation: with `r = end - start` and
    /// `s = other.end - other.start`, the lines meet where
    /// `start + t*r == other.start + u*s`; the segments meet when both
    /// parameters fall in `[0, 1]`.
    ///
    /// Parallel (including collinear) segments report no intersection, except
    /// that a shared endpoint is still reported as an endpoint touch.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> SegmentIntersection {
        let r = self.direction();
        let s = other.direction();
        let denom = r.cross(s);

        if denom == 0.0 {
            // Parallel. A shared endpoint still counts as a touch so callers
            // never mistake collinear contact for a proper crossing.
            for a in [self.start, self.end] {
                for b in [other.start, other.end] {
                    if a.close_to(b, DEFAULT_MERGE_TOLERANCE) {
                        return SegmentIntersection {
                            intersects: true,
                            point: Some(a),
                            endpoint_touch: true,
                        };
                    }
                }
            }
            return SegmentIntersection::NONE;
        }

        let qp = other.start - self.start;
        let t = qp.cross(s) / denom;
        let u = qp.cross(r) / denom;

        if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
            return SegmentIntersection::NONE;
        }

        let point = self.start + r * t;
        let endpoint_touch = [self.start, self.end, other.start, other.end]
            .iter()
            .any(|e| point.close_to(*e, DEFAULT_MERGE_TOLERANCE));

        SegmentIntersection {
            intersects: true,
            point: Some(point),
            endpoint_touch,
        }
    }
}

impl PartialEq for Segment {
    /// Unordered-pair equality: a segment equals its own reverse.
    fn eq(&self, other: &Self) -> bool {
        (self.start == other.start && self.end == other.end)
            || (self.start == other.end && self.end == other.start)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}
