//! Data and operations on 2D points.
//!
//! # Equality Semantics
//!
//! `Point` equality is exact floating-point value equality with no epsilon.
//! Two points produced by independent computation paths (for example a
//! circumcenter computed from two different triangles) may therefore differ
//! in the last bit and compare unequal. The pipeline compensates by
//! deduplicating points within [`DEFAULT_MERGE_TOLERANCE`] whenever one is
//! inserted into the live arena; see [`crate::core::state::Mesh`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Canonical deduplication radius for points entering the live arena.
///
/// Two points closer than this (Euclidean distance) are considered the same
/// point during tessellation. The value is intentionally tiny relative to
/// typical map coordinates (tens to thousands of units) so that it only
/// merges last-bit duplicates from independent floating-point computation
/// paths, never geometrically distinct vertices.
pub const DEFAULT_MERGE_TOLERANCE: f64 = 1e-9;

/// A point (or free vector) in the plane, in double precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to `other`.
    #[must_use]
    pub fn distance_squared_to(&self, other: Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(&self, other: Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// Length of this point interpreted as a vector from the origin.
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Whether `other` lies within Euclidean distance `tolerance` of `self`.
    #[must_use]
    pub fn close_to(&self, other: Self, tolerance: f64) -> bool {
        self.distance_squared_to(other) <= tolerance * tolerance
    }

    /// 2D cross product of `self` and `other` as vectors (z component of the
    /// 3D cross product). Positive when `other` is counter-clockwise of
    /// `self`.
    #[must_use]
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Dot product of `self` and `other` as vectors.
    #[must_use]
    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
