//! Clipping the Voronoi skeleton to the border polygon.
//!
//! Chopping walks every border edge against a worklist of segments that
//! poke outside the border, shortens them at their proper crossings, and
//! stitches the border itself into sub-segments between consecutive cut
//! points. A final sweep drops everything still carrying an exterior
//! endpoint. Winding repair then walks the resulting border ring once,
//! flipping segments in place until the ring reads head to tail in one
//! consistent direction, which the face assembler's turn measure depends
//! on.

use log::trace;

use crate::geometry::{Point, Polygon, Segment, Winding};

use super::TessellationError;
use super::state::{Mesh, PointKey, SegmentKey};

/// Chops every segment at its proper border crossings and rebuilds the
/// border as sub-segments between consecutive cut points.
///
/// A segment crossing with one endpoint inside keeps its interior piece. A
/// segment crossing with both endpoints outside keeps the piece heading to
/// the interior side of the crossed edge and is re-queued so another border
/// edge can chop its far end. Segments that merely touch the border at an
/// endpoint are left whole, but the touch point still splits the border
/// ring: a cell closing against the border needs a vertex to turn at.
pub(crate) fn chop_border(border: &Polygon, mesh: &mut Mesh) {
    trace!("chopping {} segments against the border", mesh.segments.len());

    let interior_is_left = border.winding() == Winding::CounterClockwise;

    let mut worklist: Vec<SegmentKey> = mesh
        .segments
        .keys()
        .filter(|&k| {
            let s = mesh.segment_geometry(k);
            !border.contains(s.start)
                || !border.contains(s.end)
                || border.edges().any(|be| be.intersection(&s).intersects)
        })
        .collect();

    let border_edges: Vec<Segment> = border.edges().collect();
    for border_edge in &border_edges {
        let corner_a = mesh.insert_point(border_edge.start);
        let corner_b = mesh.insert_point(border_edge.end);
        let mut cut_points: Vec<PointKey> = vec![corner_a, corner_b];

        for key in worklist.clone() {
            let s = mesh.segment_geometry(key);
            let hit = border_edge.intersection(&s);
            if !hit.crosses() {
                continue;
            }
            let Some(cut) = hit.point else {
                continue;
            };
            let cut_key = mesh.insert_point(cut);
            if !cut_points.contains(&cut_key) {
                cut_points.push(cut_key);
            }

            let (a_key, b_key) = mesh.segment_endpoints(key);
            if border.contains(s.start) && a_key != cut_key {
                mesh.add_segment(a_key, cut_key);
            } else if border.contains(s.end) {
                if cut_key != b_key {
                    mesh.add_segment(cut_key, b_key);
                }
            } else {
                // Both endpoints outside. Keep the half heading to the
                // interior side of this edge and let a later border edge
                // chop its far end.
                let side = border_edge.direction().cross(s.start - border_edge.start);
                let start_is_interior_side = if interior_is_left {
                    side > 0.0
                } else {
                    side < 0.0
                };
                let keep = if start_is_interior_side { a_key } else { b_key };
                if keep != cut_key {
                    worklist.push(mesh.add_segment(cut_key, keep));
                }
            }

            // The original stays in the mesh for now; the exterior sweep
            // below removes it.
            worklist.retain(|&k| k != key);
        }

        // Endpoints resting exactly on this edge split the ring as well,
        // even though nothing crosses there. Voronoi vertices of pristine
        // fan triangles land on border edge midpoints and would otherwise
        // leave the ring unsplit, dead-ending every face walk through them.
        let resting: Vec<PointKey> = mesh
            .segments
            .values()
            .flat_map(|e| [e.start, e.end])
            .filter(|&k| border_edge.contains_point(mesh.point(k)))
            .collect();
        for key in resting {
            if !cut_points.contains(&key) {
                cut_points.push(key);
            }
        }

        cut_points.sort_by(|&a, &b| {
            let da = border_edge.start.distance_squared_to(mesh.point(a));
            let db = border_edge.start.distance_squared_to(mesh.point(b));
            da.total_cmp(&db)
        });
        for pair in cut_points.windows(2) {
            mesh.add_segment(pair[0], pair[1]);
        }
    }

    let exterior: Vec<SegmentKey> = mesh
        .segments
        .keys()
        .filter(|&k| {
            let s = mesh.segment_geometry(k);
            !border.contains(s.start) || !border.contains(s.end)
        })
        .collect();
    trace!("sweeping {} exterior segments", exterior.len());
    for key in exterior {
        mesh.remove_segment(key);
    }
}

/// Reorients the chopped border ring counterclockwise.
///
/// Starting from the lowest-left border corner, walks segment to segment
/// around the ring, flipping each segment whose direction opposes the walk.
/// Once the ring reads head to tail, its cycle winding is measured and the
/// whole ring is flipped if it came out clockwise. The face assembler's
/// leftmost-turn rule needs the interior on the left of every border
/// segment. A ring that cannot be traversed end to end is reported as
/// [`TessellationError::BorderCycle`].
pub(crate) fn fix_border_winding(
    border: &Polygon,
    mesh: &mut Mesh,
) -> Result<(), TessellationError> {
    trace!("fixing border winding");

    let mut border_edges: Vec<Segment> = border.edges().collect();
    border_edges.sort_by(|a, b| {
        a.start
            .y
            .total_cmp(&b.start.y)
            .then(a.start.x.total_cmp(&b.start.x))
    });
    let start_edge = &border_edges[0];

    let start_corner = mesh
        .find_point(start_edge.start)
        .ok_or_else(|| TessellationError::BorderCycle {
            detail: "border corner missing from the arena".to_owned(),
        })?;

    let first = on_border_segment(mesh, border, |a, b| {
        (a == start_corner || b == start_corner) && lies_on(mesh, start_edge, a, b)
    })
    .ok_or_else(|| TessellationError::BorderCycle {
        detail: "no border segment at the start corner".to_owned(),
    })?;

    let (mut cur_start, mut cur_end) = mesh.segment_endpoints(first);
    let walk_start = cur_start;
    let mut ring = vec![first];

    let step_cap = mesh.segments.len() + 1;
    while cur_end != walk_start {
        if ring.len() > step_cap {
            return Err(TessellationError::BorderCycle {
                detail: "border walk did not close".to_owned(),
            });
        }

        let next = on_border_segment(mesh, border, |a, b| {
            (a == cur_end || b == cur_end) && a != cur_start && b != cur_start
        })
        .ok_or_else(|| TessellationError::BorderCycle {
            detail: "border walk reached a dead end".to_owned(),
        })?;

        let (_, next_end) = mesh.segment_endpoints(next);
        if next_end == cur_end {
            mesh.flip_segment(next);
        }
        ring.push(next);
        (cur_start, cur_end) = mesh.segment_endpoints(next);
    }

    // Shoelace over the walk's start points. A clockwise ring gets every
    // segment flipped, which keeps it head to tail in the other direction.
    let mut doubled_area = 0.0;
    for pair in ring.iter().zip(ring.iter().cycle().skip(1)) {
        let a = mesh.point(mesh.segment_endpoints(*pair.0).0);
        let b = mesh.point(mesh.segment_endpoints(*pair.1).0);
        doubled_area += a.cross(b);
    }
    if doubled_area < 0.0 {
        trace!("border ring is clockwise, flipping {} segments", ring.len());
        for key in ring {
            mesh.flip_segment(key);
        }
    }

    Ok(())
}

/// First segment, in slot order, lying on some border edge and passing the
/// extra endpoint predicate.
fn on_border_segment<F>(mesh: &Mesh, border: &Polygon, pred: F) -> Option<SegmentKey>
where
    F: Fn(PointKey, PointKey) -> bool,
{
    mesh.segments.keys().find(|&k| {
        let (a, b) = mesh.segment_endpoints(k);
        if !pred(a, b) {
            return false;
        }
        border.edges().any(|be| lies_on(mesh, &be, a, b))
    })
}

/// A mesh segment belongs to a border edge when both its endpoints lie on
/// that one edge.
fn lies_on(mesh: &Mesh, border_edge: &Segment, a: PointKey, b: PointKey) -> bool {
    border_edge.contains_point(mesh.point(a)) && border_edge.contains_point(mesh.point(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_border() -> Polygon {
        Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ])
        .unwrap()
    }

    fn all_endpoints_inside(border: &Polygon, mesh: &Mesh) -> bool {
        mesh.segments.keys().all(|k| {
            let s = mesh.segment_geometry(k);
            border.contains(s.start) && border.contains(s.end)
        })
    }

    #[test]
    fn crossing_segment_keeps_its_interior_half() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let inner = mesh.insert_point(Point::new(50.0, 50.0));
        let outer = mesh.insert_point(Point::new(150.0, 50.0));
        mesh.add_segment(inner, outer);

        chop_border(&border, &mut mesh);

        // Interior half plus the border ring: three whole edges and the
        // right edge split at the crossing.
        assert_eq!(mesh.segments.len(), 6);
        let cut = mesh.find_point(Point::new(100.0, 50.0)).unwrap();
        assert!(mesh.has_segment_between(inner, cut));
        assert!(mesh.degree(outer) == 0);
        assert!(all_endpoints_inside(&border, &mesh));
    }

    #[test]
    fn fully_exterior_crossing_segment_is_rechopped() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let left = mesh.insert_point(Point::new(-50.0, 50.0));
        let right = mesh.insert_point(Point::new(150.0, 50.0));
        mesh.add_segment(left, right);

        chop_border(&border, &mut mesh);

        // The surviving piece spans the border interior between the two
        // crossings.
        let west = mesh.find_point(Point::new(0.0, 50.0)).unwrap();
        let east = mesh.find_point(Point::new(100.0, 50.0)).unwrap();
        assert!(mesh.has_segment_between(west, east));
        assert!(all_endpoints_inside(&border, &mesh));
        // Both the left and right border edges are split at the crossings.
        assert_eq!(mesh.segments.len(), 7);
    }

    #[test]
    fn segment_ending_on_the_border_splits_the_ring() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let inner = mesh.insert_point(Point::new(50.0, 50.0));
        let rim = mesh.insert_point(Point::new(0.0, 50.0));
        mesh.add_segment(inner, rim);

        chop_border(&border, &mut mesh);

        // The touching segment survives whole and the west edge is split
        // at the touch point: three whole edges, two west pieces, and the
        // segment itself.
        assert_eq!(mesh.segments.len(), 6);
        assert!(mesh.has_segment_between(inner, rim));
        let bl = mesh.find_point(Point::new(0.0, 0.0)).unwrap();
        let tl = mesh.find_point(Point::new(0.0, 100.0)).unwrap();
        assert!(mesh.has_segment_between(bl, rim));
        assert!(mesh.has_segment_between(rim, tl));
        assert!(!mesh.has_segment_between(bl, tl));
    }

    #[test]
    fn interior_segments_survive_untouched() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(20.0, 20.0));
        let b = mesh.insert_point(Point::new(70.0, 60.0));
        let key = mesh.add_segment(a, b);

        chop_border(&border, &mut mesh);

        assert_eq!(mesh.segment_endpoints(key), (a, b));
        // Four whole border edges plus the untouched interior segment.
        assert_eq!(mesh.segments.len(), 5);
    }

    #[test]
    fn winding_repair_orients_the_ring_counterclockwise() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let bl = mesh.insert_point(Point::new(0.0, 0.0));
        let tl = mesh.insert_point(Point::new(0.0, 100.0));
        let tr = mesh.insert_point(Point::new(100.0, 100.0));
        let br = mesh.insert_point(Point::new(100.0, 0.0));

        let west = mesh.add_segment(bl, tl);
        let north = mesh.add_segment(tr, tl);
        let east = mesh.add_segment(tr, br);
        let south = mesh.add_segment(bl, br);

        fix_border_winding(&border, &mut mesh).unwrap();

        // The walk starts along bl -> tl, a clockwise traversal, so every
        // ring segment ends up flipped into the counterclockwise ring
        // bl -> br -> tr -> tl.
        assert_eq!(mesh.segment_endpoints(west), (tl, bl));
        assert_eq!(mesh.segment_endpoints(north), (tr, tl));
        assert_eq!(mesh.segment_endpoints(east), (br, tr));
        assert_eq!(mesh.segment_endpoints(south), (bl, br));
    }

    #[test]
    fn winding_repair_handles_split_border_edges() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let bl = mesh.insert_point(Point::new(0.0, 0.0));
        let wm = mesh.insert_point(Point::new(0.0, 40.0)); // mid west edge
        let tl = mesh.insert_point(Point::new(0.0, 100.0));
        let tr = mesh.insert_point(Point::new(100.0, 100.0));
        let br = mesh.insert_point(Point::new(100.0, 0.0));

        mesh.add_segment(bl, wm);
        let upper_west = mesh.add_segment(tl, wm);
        mesh.add_segment(tl, tr);
        mesh.add_segment(tr, br);
        mesh.add_segment(br, bl);

        fix_border_winding(&border, &mut mesh).unwrap();

        // Clockwise walk, so the normalization flips the whole ring and the
        // upper west piece reads tl -> wm.
        assert_eq!(mesh.segment_endpoints(upper_west), (tl, wm));
    }

    #[test]
    fn broken_ring_reports_border_cycle() {
        let border = square_border();
        let mut mesh = Mesh::new();
        let bl = mesh.insert_point(Point::new(0.0, 0.0));
        let tl = mesh.insert_point(Point::new(0.0, 100.0));
        let tr = mesh.insert_point(Point::new(100.0, 100.0));

        mesh.add_segment(bl, tl);
        mesh.add_segment(tl, tr);
        // No east or south edges, so the walk dead-ends.

        let err = fix_border_winding(&border, &mut mesh).unwrap_err();
        assert!(matches!(err, TessellationError::BorderCycle { .. }));
    }
}
