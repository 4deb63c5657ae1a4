//! Extracting the final cell polygons from the clipped segment soup.
//!
//! Every non-border segment is doubled into both directions, so each
//! interior edge can serve two cells while each border piece serves exactly
//! one. Faces are then peeled off one at a time: pick the first remaining
//! segment, repeatedly continue into the leftmost-turning candidate until
//! the walk returns to its starting vertex, and consume the walked
//! segments. With a counterclockwise border ring this enumerates every
//! interior face exactly once and never the unbounded outer face.

use log::trace;

use crate::geometry::{Point, Polygon};

use super::TessellationError;
use super::state::{Mesh, SegmentKey};

/// Assembles all cell polygons and consumes every segment in the mesh.
pub(crate) fn assemble_faces(
    border: &Polygon,
    mesh: &mut Mesh,
) -> Result<Vec<Polygon>, TessellationError> {
    double_interior_segments(border, mesh);
    trace!("assembling faces from {} directed segments", mesh.segments.len());

    let mut cells = Vec::new();
    while let Some(first) = mesh.segments.keys().next() {
        let walked = walk_face(mesh, first)?;

        let vertices: Vec<Point> = walked
            .iter()
            .map(|&key| mesh.point(mesh.segment_endpoints(key).0))
            .collect();
        for key in walked {
            mesh.remove_segment(key);
        }

        let cell =
            Polygon::new(vertices).map_err(|source| TessellationError::DegenerateFace {
                detail: format!("face walk closed on a bad polygon: {source}"),
            })?;
        cells.push(cell);
    }

    Ok(cells)
}

/// Adds the reverse of every segment not lying on the border, so interior
/// edges are traversable from both sides.
fn double_interior_segments(border: &Polygon, mesh: &mut Mesh) {
    let interior: Vec<SegmentKey> = mesh
        .segments
        .keys()
        .filter(|&key| {
            let s = mesh.segment_geometry(key);
            !border
                .edges()
                .any(|be| be.contains_point(s.start) && be.contains_point(s.end))
        })
        .collect();
    for key in interior {
        let (a, b) = mesh.segment_endpoints(key);
        mesh.add_segment(b, a);
    }
}

/// Walks one face: from `first`, keep taking the leftmost-turning unused
/// continuation until the walk arrives back at its starting vertex.
///
/// Leftness of a candidate is the signed turn angle from the current
/// direction, `atan2(cross, dot)`, so the sharpest left turn ranks highest
/// and the sharpest right turn lowest. A walk that dead-ends or exhausts
/// the mesh without closing is degenerate.
fn walk_face(mesh: &Mesh, first: SegmentKey) -> Result<Vec<SegmentKey>, TessellationError> {
    let (walk_start, mut cur_end) = mesh.segment_endpoints(first);
    let mut cur_start = walk_start;
    let mut walked = vec![first];
    let cap = mesh.segments.len();

    while cur_end != walk_start {
        if walked.len() > cap {
            return Err(TessellationError::DegenerateFace {
                detail: "face walk did not close".to_owned(),
            });
        }

        let cur_dir = mesh.point(cur_end) - mesh.point(cur_start);
        let mut best: Option<(SegmentKey, f64)> = None;
        for key in mesh.segments.keys() {
            if walked.contains(&key) {
                continue;
            }
            let (a, b) = mesh.segment_endpoints(key);
            // Continuations leave the current end but never double straight
            // back.
            if a != cur_end || b == cur_start {
                continue;
            }
            let dir = mesh.point(b) - mesh.point(a);
            let leftness = cur_dir.cross(dir).atan2(cur_dir.dot(dir));
            if best.is_none_or(|(_, most)| leftness > most) {
                best = Some((key, leftness));
            }
        }

        let Some((next, _)) = best else {
            return Err(TessellationError::DegenerateFace {
                detail: "face walk reached a dead end".to_owned(),
            });
        };
        walked.push(next);
        (cur_start, cur_end) = mesh.segment_endpoints(next);
    }

    Ok(walked)
}
