//! Arena-backed live collections for the pipeline.
//!
//! Points, segments, and faces live in [`SlotMap`] arenas and refer to each
//! other by key, replacing the object-graph back-references of a naive
//! implementation with index ownership. Every point insertion passes through
//! a merge-tolerance deduplication so that independently computed duplicates
//! (for example the same circumcenter reached from two triangles) collapse
//! onto one arena entry.
//!
//! Iteration over a slot map visits slots in index order, which is fully
//! determined by the sequence of insertions and removals. Given a fixed seed
//! the whole pipeline therefore replays bit-identically.

use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::geometry::{Circle, DEFAULT_MERGE_TOLERANCE, Point, Segment};

new_key_type! {
    /// Key of a live [`Point`] in the arena.
    pub struct PointKey;
    /// Key of a live segment in the arena.
    pub struct SegmentKey;
    /// Key of a live face in the arena.
    pub struct FaceKey;
}

/// A directed segment between two arena points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    /// Start point key.
    pub start: PointKey,
    /// End point key.
    pub end: PointKey,
}

impl Edge {
    /// Whether either endpoint is `point`.
    #[must_use]
    pub fn touches(&self, point: PointKey) -> bool {
        self.start == point || self.end == point
    }
}

/// A face as an ordered ring of arena points. Triangles during the
/// triangulation stage, arbitrary simple polygons after assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Face {
    /// Vertex ring, in order, without the closing repeat.
    pub vertices: SmallVec<[PointKey; 4]>,
}

impl Face {
    /// Edges as consecutive key pairs, wrapping.
    pub fn edges(&self) -> impl Iterator<Item = (PointKey, PointKey)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// The mutable live collections shared along the pipeline.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Live points.
    pub points: SlotMap<PointKey, Point>,
    /// Live segments.
    pub segments: SlotMap<SegmentKey, Edge>,
    /// Live faces.
    pub faces: SlotMap<FaceKey, Face>,
    merge_tolerance: f64,
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesh {
    /// Creates an empty mesh with [`DEFAULT_MERGE_TOLERANCE`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_merge_tolerance(DEFAULT_MERGE_TOLERANCE)
    }

    /// Creates an empty mesh with a custom point-merge tolerance.
    #[must_use]
    pub fn with_merge_tolerance(merge_tolerance: f64) -> Self {
        Self {
            points: SlotMap::with_key(),
            segments: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            merge_tolerance,
        }
    }

    /// The point-merge tolerance in effect.
    #[must_use]
    pub fn merge_tolerance(&self) -> f64 {
        self.merge_tolerance
    }

    /// Looks up an existing point within the merge tolerance of `p`.
    #[must_use]
    pub fn find_point(&self, p: Point) -> Option<PointKey> {
        self.points
            .iter()
            .find(|(_, q)| q.close_to(p, self.merge_tolerance))
            .map(|(k, _)| k)
    }

    /// Inserts a point, deduplicating against live points within the merge
    /// tolerance. Returns the existing key when a near-duplicate is found.
    pub fn insert_point(&mut self, p: Point) -> PointKey {
        match self.find_point(p) {
            Some(existing) => existing,
            None => self.points.insert(p),
        }
    }

    /// Coordinates of a live point.
    #[must_use]
    pub fn point(&self, key: PointKey) -> Point {
        self.points[key]
    }

    /// Adds a directed segment between two distinct live points.
    ///
    /// An exact same-direction duplicate is not re-added; its existing key is
    /// returned. The reverse direction is deliberately representable as a
    /// separate segment: face assembly doubles interior edges on purpose.
    pub fn add_segment(&mut self, start: PointKey, end: PointKey) -> SegmentKey {
        debug_assert_ne!(start, end, "segment endpoints must be distinct");
        if let Some((k, _)) = self
            .segments
            .iter()
            .find(|(_, e)| e.start == start && e.end == end)
        {
            return k;
        }
        self.segments.insert(Edge { start, end })
    }

    /// Whether a segment between the two points exists in either direction.
    #[must_use]
    pub fn has_segment_between(&self, a: PointKey, b: PointKey) -> bool {
        self.segments
            .values()
            .any(|e| (e.start == a && e.end == b) || (e.start == b && e.end == a))
    }

    /// Removes a live segment.
    pub fn remove_segment(&mut self, key: SegmentKey) {
        self.segments.remove(key);
    }

    /// Endpoint keys of a live segment.
    #[must_use]
    pub fn segment_endpoints(&self, key: SegmentKey) -> (PointKey, PointKey) {
        let e = self.segments[key];
        (e.start, e.end)
    }

    /// Geometric value of a live segment. Endpoints of a live segment are
    /// distinct by construction (distinct keys, deduplicated points).
    #[must_use]
    pub fn segment_geometry(&self, key: SegmentKey) -> Segment {
        let e = self.segments[key];
        Segment::from_distinct(self.points[e.start], self.points[e.end])
    }

    /// Reverses a segment's stored direction in place.
    pub fn flip_segment(&mut self, key: SegmentKey) {
        let e = &mut self.segments[key];
        std::mem::swap(&mut e.start, &mut e.end);
    }

    /// Number of live segments incident to `point`.
    #[must_use]
    pub fn degree(&self, point: PointKey) -> usize {
        self.segments.values().filter(|e| e.touches(point)).count()
    }

    /// Adds a triangular face.
    pub fn add_triangle(&mut self, a: PointKey, b: PointKey, c: PointKey) -> FaceKey {
        self.faces.insert(Face {
            vertices: SmallVec::from_slice(&[a, b, c]),
        })
    }

    /// Removes a live face.
    pub fn remove_face(&mut self, key: FaceKey) {
        self.faces.remove(key);
    }

    /// Circumcircle of a triangular face; `None` for non-triangles and for
    /// collinear triangles.
    #[must_use]
    pub fn face_circumcircle(&self, key: FaceKey) -> Option<Circle> {
        let face = &self.faces[key];
        if face.vertices.len() != 3 {
            return None;
        }
        Circle::circumscribing(
            self.points[face.vertices[0]],
            self.points[face.vertices[1]],
            self.points[face.vertices[2]],
        )
    }
}
