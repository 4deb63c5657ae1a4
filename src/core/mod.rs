//! The tessellation pipeline: arena state, stage algorithms, and
//! orchestration.
//!
//! Stage functions live in their own modules and are crate-private; the
//! public surface is [`tessellate`] and the [`Tessellator`] builder in
//! [`pipeline`].

pub(crate) mod assemble;
pub(crate) mod clip;
pub(crate) mod dual;
pub mod pipeline;
pub mod state;
pub(crate) mod triangulate;

pub use pipeline::{Snapshot, Stage, Tessellator, tessellate};
pub use state::{FaceKey, PointKey, SegmentKey};

use thiserror::Error;

/// Errors reported by the tessellation pipeline.
///
/// All variants are recoverable at the pipeline boundary: a failing call
/// aborts the current tessellation attempt with no partial result, and the
/// caller may retry (typically with a different seed).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TessellationError {
    /// The border polygon is unusable: fewer than three distinct vertices or
    /// (near-)zero enclosed area.
    #[error("invalid border polygon: {reason}")]
    InvalidBorder {
        /// What made the border unusable.
        reason: String,
    },

    /// Hole-boundary chaining failed to form a single cycle, or a triangle
    /// needing a circumcenter was collinear. Typically caused by
    /// near-cocircular or collinear input points.
    #[error("degenerate triangulation: {detail}")]
    DegenerateTriangulation {
        /// Description of the degenerate configuration.
        detail: String,
    },

    /// A Delaunay edge had more than one triangle neighbor during dual
    /// construction. The triangulation is inconsistent and later stages
    /// cannot self-correct, so this always aborts the pipeline.
    #[error("non-manifold edge: {detail}")]
    NonManifoldEdge {
        /// Description of the offending edge.
        detail: String,
    },

    /// A face walk in the assembler closed with fewer than three vertices,
    /// or could not continue.
    #[error("degenerate face: {detail}")]
    DegenerateFace {
        /// Description of the failed walk.
        detail: String,
    },

    /// The chopped border did not form a single traversable cycle during
    /// winding repair.
    #[error("broken border cycle: {detail}")]
    BorderCycle {
        /// Description of where the walk failed.
        detail: String,
    },

    /// The caller's cancellation flag was set between stages.
    #[error("tessellation cancelled")]
    Cancelled,
}
