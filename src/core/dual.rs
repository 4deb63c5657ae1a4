//! The Voronoi dual: circumcenter edges plus open-cell approximation.
//!
//! Every pair of triangles sharing a Delaunay edge contributes one Voronoi
//! edge between their circumcenters. Cells along the border are open (their
//! circumcenter has too few incident edges to close a loop), so a
//! perpendicular-bisector segment through a border-crossing triangle edge
//! stands in for the missing ray. Stand-ins generally poke past the border;
//! the clipping stage trims them back.

use std::collections::HashMap;

use log::{trace, warn};

use crate::geometry::{Point, Polygon, Segment};

use super::TessellationError;
use super::state::{FaceKey, Mesh, PointKey};

/// Connects the circumcenters of every pair of edge-adjacent triangles,
/// replacing no faces yet. Returns the circumcenter point key of each face
/// that contributed at least one Voronoi edge.
///
/// Adjacent cocircular triangles share a circumcenter after deduplication;
/// their zero-length edge is silently dropped.
pub(crate) fn build_voronoi_edges(
    mesh: &mut Mesh,
) -> Result<HashMap<FaceKey, PointKey>, TessellationError> {
    trace!("building voronoi edges from {} triangles", mesh.faces.len());

    let face_keys: Vec<FaceKey> = mesh.faces.keys().collect();

    let mut owners: HashMap<(PointKey, PointKey), Vec<FaceKey>> = HashMap::new();
    for &f in &face_keys {
        for (a, b) in mesh.faces[f].edges() {
            owners.entry(unordered(a, b)).or_default().push(f);
        }
    }

    let mut centers: HashMap<FaceKey, PointKey> = HashMap::new();
    for &f in &face_keys {
        let edges: Vec<(PointKey, PointKey)> = mesh.faces[f].edges().collect();
        for (a, b) in edges {
            let sharing = &owners[&unordered(a, b)];
            if sharing.len() > 2 {
                return Err(TessellationError::NonManifoldEdge {
                    detail: format!("delaunay edge shared by {} triangles", sharing.len()),
                });
            }
            let Some(&neighbor) = sharing.iter().find(|&&g| g != f) else {
                // Hull edge; the open cell is handled separately.
                continue;
            };

            let ck = circumcenter_key(mesh, &mut centers, f)?;
            let nk = circumcenter_key(mesh, &mut centers, neighbor)?;
            if ck != nk && !mesh.has_segment_between(ck, nk) {
                mesh.add_segment(ck, nk);
            }
        }
    }

    Ok(centers)
}

fn circumcenter_key(
    mesh: &mut Mesh,
    centers: &mut HashMap<FaceKey, PointKey>,
    face: FaceKey,
) -> Result<PointKey, TessellationError> {
    if let Some(&key) = centers.get(&face) {
        return Ok(key);
    }
    let circle = mesh.face_circumcircle(face).ok_or_else(|| {
        TessellationError::DegenerateTriangulation {
            detail: "collinear triangle has no circumcenter".to_owned(),
        }
    })?;
    let key = mesh.insert_point(circle.center);
    centers.insert(face, key);
    Ok(key)
}

/// Approximates the missing edge of each open cell along the border.
///
/// A circumcenter strictly inside the border with fewer than three incident
/// Voronoi edges belongs to an open cell. For each triangle owning such a
/// circumcenter, the perpendicular bisector of its first border-crossing
/// edge is emitted as an overlong stand-in segment. A circumcenter resting
/// exactly on the border gets no stand-in: its cell terminates there and
/// the clipper splits the border ring at it, while a stand-in would lie
/// collinear over the real Voronoi edges through that vertex and corrupt
/// the planar segment soup. The triangle faces are consumed here; from
/// this point on the mesh carries only the Voronoi skeleton.
pub(crate) fn approximate_open_cells(
    border: &Polygon,
    mesh: &mut Mesh,
    centers: &HashMap<FaceKey, PointKey>,
) {
    trace!("approximating open cells");

    let face_keys: Vec<FaceKey> = mesh.faces.keys().collect();
    let mut visited: Vec<PointKey> = Vec::new();

    for &f in &face_keys {
        let Some(&center_key) = centers.get(&f) else {
            continue;
        };
        if visited.contains(&center_key) {
            continue;
        }
        visited.push(center_key);

        let center = mesh.point(center_key);
        // Circumcenters outside the border are healthy extremes; clipping
        // removes their segments later.
        if !border.contains(center) {
            continue;
        }
        if border.edges().any(|be| be.contains_point(center)) {
            continue;
        }
        if mesh.degree(center_key) >= 3 {
            continue;
        }

        // Cocircular triangles share the circumcenter; each owner emits its
        // own stand-in edge.
        for &owner in face_keys.iter().filter(|&&g| centers.get(&g) == Some(&center_key)) {
            emit_bisector(border, mesh, owner, center);
        }
    }

    for f in face_keys {
        mesh.remove_face(f);
    }
}

/// Builds the stand-in segment for one open cell: the perpendicular
/// bisector of the owning triangle's first border-crossing edge.
///
/// The circumcenter lies on that bisector, so the general branch spans from
/// the circumcenter through the edge midpoint to its mirror image on the
/// far side, where the mirror endpoint usually lands outside the border.
/// The horizontal-edge branch instead shoots straight down (or up) past the
/// edge by twice the squared midpoint distance.
fn emit_bisector(border: &Polygon, mesh: &mut Mesh, face: FaceKey, center: Point) {
    let face_edges: Vec<(PointKey, PointKey)> = mesh.faces[face].edges().collect();
    let crossing = face_edges.iter().find_map(|&(a, b)| {
        let edge = Segment::from_distinct(mesh.point(a), mesh.point(b));
        border
            .edges()
            .any(|be| be.intersection(&edge).intersects)
            .then_some(edge)
    });
    let Some(edge) = crossing else {
        warn!("open cell at {center} has no border-crossing triangle edge, skipping");
        return;
    };

    let mid = edge.midpoint();
    let slope = edge.slope();
    let reach = center.distance_squared_to(mid);

    let (start, end) = if slope == 0.0 {
        // Horizontal edge: the bisector is vertical, anchored at the
        // circumcenter and shooting past the edge.
        let end_y = if center.y > mid.y {
            center.y - 2.0 * reach
        } else {
            center.y + 2.0 * reach
        };
        (center, Point::new(center.x, end_y))
    } else {
        let normal_slope = -1.0 / slope;
        let dx = (reach / (1.0 + normal_slope * normal_slope)).sqrt();
        let dy = normal_slope * dx;
        (
            Point::new(mid.x + dx, mid.y + dy),
            Point::new(mid.x - dx, mid.y - dy),
        )
    };

    let start_key = mesh.insert_point(start);
    let end_key = mesh.insert_point(end);
    if start_key != end_key && !mesh.has_segment_between(start_key, end_key) {
        mesh.add_segment(start_key, end_key);
    }
}

fn unordered(a: PointKey, b: PointKey) -> (PointKey, PointKey) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_edge_yields_one_voronoi_segment() {
        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(0.0, 0.0));
        let b = mesh.insert_point(Point::new(10.0, 0.0));
        let c = mesh.insert_point(Point::new(5.0, 8.0));
        let d = mesh.insert_point(Point::new(5.0, -8.0));
        let upper = mesh.add_triangle(a, b, c);
        let lower = mesh.add_triangle(a, b, d);

        let centers = build_voronoi_edges(&mut mesh).unwrap();

        assert_eq!(mesh.segments.len(), 1);
        let (s, e) = mesh.segment_endpoints(mesh.segments.keys().next().unwrap());
        assert_eq!(
            unordered(s, e),
            unordered(centers[&upper], centers[&lower])
        );
        // Both circumcenters sit on the shared edge's perpendicular bisector.
        assert_eq!(mesh.point(centers[&upper]).x, 5.0);
        assert_eq!(mesh.point(centers[&lower]).x, 5.0);
    }

    #[test]
    fn triply_shared_edge_is_non_manifold() {
        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(0.0, 0.0));
        let b = mesh.insert_point(Point::new(10.0, 0.0));
        for apex in [
            Point::new(5.0, 8.0),
            Point::new(5.0, -8.0),
            Point::new(2.0, 5.0),
        ] {
            let c = mesh.insert_point(apex);
            mesh.add_triangle(a, b, c);
        }

        let err = build_voronoi_edges(&mut mesh).unwrap_err();
        assert!(matches!(err, TessellationError::NonManifoldEdge { .. }));
    }

    #[test]
    fn cocircular_neighbors_produce_no_zero_length_edge() {
        // Two right triangles from one square share a diagonal and a
        // circumcenter (the square's center).
        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(0.0, 0.0));
        let b = mesh.insert_point(Point::new(10.0, 0.0));
        let c = mesh.insert_point(Point::new(10.0, 10.0));
        let d = mesh.insert_point(Point::new(0.0, 10.0));
        mesh.add_triangle(a, b, c);
        mesh.add_triangle(a, c, d);

        let centers = build_voronoi_edges(&mut mesh).unwrap();

        assert_eq!(mesh.segments.len(), 0);
        let keys: Vec<&PointKey> = centers.values().collect();
        assert_eq!(keys[0], keys[1]);
    }

    #[test]
    fn open_cell_stand_in_mirrors_the_circumcenter() {
        let border = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ])
        .unwrap();

        // One triangle crossing the bottom border edge, circumcenter inside.
        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(40.0, -10.0));
        let b = mesh.insert_point(Point::new(60.0, -10.0));
        let c = mesh.insert_point(Point::new(50.0, 30.0));
        let f = mesh.add_triangle(a, b, c);

        let circle = mesh.face_circumcircle(f).unwrap();
        assert_eq!(circle.center, Point::new(50.0, 8.75));
        assert!(border.contains(circle.center));
        let center_key = mesh.insert_point(circle.center);
        let centers = HashMap::from([(f, center_key)]);

        approximate_open_cells(&border, &mut mesh, &centers);

        assert_eq!(mesh.faces.len(), 0);
        assert_eq!(mesh.segments.len(), 1);
        let stand_in = mesh.segment_geometry(mesh.segments.keys().next().unwrap());

        // The first border-crossing edge is (b, c), midpoint (55, 10). The
        // stand-in runs from the circumcenter's mirror image through that
        // midpoint back to the circumcenter itself.
        assert_eq!(stand_in.start, Point::new(60.0, 11.25));
        assert_eq!(stand_in.end, Point::new(50.0, 8.75));
        let edge_dir = Point::new(50.0, 30.0) - Point::new(60.0, -10.0);
        assert_eq!(stand_in.direction().dot(edge_dir), 0.0);
    }

    #[test]
    fn border_resident_circumcenter_needs_no_stand_in() {
        let border = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ])
        .unwrap();

        // A pristine fan triangle: its circumcenter is the midpoint of the
        // west border edge. The cell closes against the border itself once
        // the clipper splits the ring there.
        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(50.0, 50.0));
        let b = mesh.insert_point(Point::new(0.0, 0.0));
        let c = mesh.insert_point(Point::new(0.0, 100.0));
        let f = mesh.add_triangle(a, b, c);

        let circle = mesh.face_circumcircle(f).unwrap();
        assert_eq!(circle.center, Point::new(0.0, 50.0));
        let center_key = mesh.insert_point(circle.center);
        let centers = HashMap::from([(f, center_key)]);

        approximate_open_cells(&border, &mut mesh, &centers);

        assert_eq!(mesh.segments.len(), 0);
        assert_eq!(mesh.faces.len(), 0);
    }

    #[test]
    fn exterior_and_saturated_circumcenters_emit_nothing() {
        let border = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
            Point::new(100.0, 0.0),
        ])
        .unwrap();

        let mut mesh = Mesh::new();
        let a = mesh.insert_point(Point::new(10.0, 10.0));
        let b = mesh.insert_point(Point::new(30.0, 10.0));
        let c = mesh.insert_point(Point::new(20.0, 11.0));
        let f = mesh.add_triangle(a, b, c);
        // Flat triangle, circumcenter far below the border.
        let circle = mesh.face_circumcircle(f).unwrap();
        assert!(!border.contains(circle.center));
        let center_key = mesh.insert_point(circle.center);

        let centers = HashMap::from([(f, center_key)]);
        approximate_open_cells(&border, &mut mesh, &centers);

        assert_eq!(mesh.segments.len(), 0);
        assert_eq!(mesh.faces.len(), 0);
    }
}
