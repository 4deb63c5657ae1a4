//! Incremental Bowyer-Watson triangulation seeded by a border fan.
//!
//! The triangulation starts from a fan of triangles joining the border's
//! centroid to each border edge, then inserts interior sites one at a time:
//! every triangle whose circumcircle contains the new site is removed, the
//! cavity boundary is chained into a single vertex cycle, and the cavity is
//! re-triangulated as a fan from the new site.
//!
//! A cavity boundary that does not chain into one cycle signals a degenerate
//! configuration (near-cocircular or collinear points). The recovery policy
//! is to skip the offending site and log it; the triangulation is left
//! exactly as it was before the attempt.

use std::collections::HashMap;

use log::{trace, warn};
use rand::Rng;
use rand::rngs::StdRng;

use crate::geometry::{Point, Polygon};

use super::state::{FaceKey, Mesh, PointKey};

/// Samples `count` interior sites uniformly inside `border`, by rejection
/// against the border's bounding box, and returns them sorted by `(y, x)`.
///
/// The sort only pins down a reproducible insertion order; any order yields
/// an equivalent Delaunay triangulation.
pub(crate) fn scatter_sites(
    border: &Polygon,
    count: u32,
    rng: &mut StdRng,
    mesh: &mut Mesh,
) -> Vec<PointKey> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for v in border.vertices() {
        min_x = min_x.min(v.x);
        min_y = min_y.min(v.y);
        max_x = max_x.max(v.x);
        max_y = max_y.max(v.y);
    }

    let mut sites = Vec::with_capacity(count as usize);
    while sites.len() < count as usize {
        let candidate = Point::new(
            rng.random_range(min_x..max_x),
            rng.random_range(min_y..max_y),
        );
        if !border.contains(candidate) {
            continue;
        }
        let key = mesh.insert_point(candidate);
        // A candidate merging onto an already accepted site is resampled.
        if !sites.contains(&key) {
            sites.push(key);
        }
    }

    sites.sort_by(|a, b| {
        let pa = mesh.point(*a);
        let pb = mesh.point(*b);
        pa.y.total_cmp(&pb.y).then(pa.x.total_cmp(&pb.x))
    });
    sites
}

/// Seeds the triangulation with the border fan: one triangle from the
/// border's centroid to each consecutive pair of border vertices.
///
/// For a concave border some fan triangles may be inverted or collinear;
/// collinear ones have no circumcircle and are never selected as conflicts.
pub(crate) fn seed_border_fan(border: &Polygon, mesh: &mut Mesh) {
    trace!("seeding border fan ({} border vertices)", border.vertex_count());

    let centroid = mesh.insert_point(border.centroid());
    let corners: Vec<PointKey> = border
        .vertices()
        .iter()
        .map(|v| mesh.insert_point(*v))
        .collect();

    let n = corners.len();
    for i in 0..n {
        mesh.add_triangle(centroid, corners[i], corners[(i + 1) % n]);
    }
}

/// Inserts every site into the triangulation with the Bowyer-Watson cavity
/// algorithm. Degenerate cavities skip their site rather than aborting.
pub(crate) fn insert_sites(sites: &[PointKey], mesh: &mut Mesh) {
    trace!("inserting {} sites", sites.len());

    for &site in sites {
        let p = mesh.point(site);

        let bad: Vec<FaceKey> = mesh
            .faces
            .keys()
            .filter(|&f| {
                mesh.face_circumcircle(f)
                    .is_some_and(|circle| circle.contains(p))
            })
            .collect();

        if bad.is_empty() {
            // Outside every circumcircle; can happen beyond the fan coverage
            // of a concave border.
            warn!("site {p} conflicts with no triangle, skipping");
            continue;
        }

        let boundary = cavity_boundary(mesh, &bad);
        let Some(cycle) = chain_boundary(&boundary) else {
            warn!("degenerate cavity boundary at site {p}, skipping");
            continue;
        };

        // Only mutate once the cavity is known to be well formed.
        for f in bad {
            mesh.remove_face(f);
        }
        let n = cycle.len();
        for i in 0..n {
            let j = (i + 1) % n;
            if cycle[i] != site && cycle[j] != site {
                mesh.add_triangle(site, cycle[i], cycle[j]);
            }
        }
    }
}

/// Edges of the cavity hull: every edge of a conflicting triangle that is not
/// shared with another conflicting triangle. Shared edges are interior to the
/// cavity and are discarded.
fn cavity_boundary(mesh: &Mesh, bad: &[FaceKey]) -> Vec<(PointKey, PointKey)> {
    let mut counts: HashMap<(PointKey, PointKey), usize> = HashMap::new();
    let mut edges = Vec::new();
    for &f in bad {
        for (a, b) in mesh.faces[f].edges() {
            *counts.entry(unordered(a, b)).or_insert(0) += 1;
            edges.push((a, b));
        }
    }
    edges
        .into_iter()
        .filter(|&(a, b)| counts[&unordered(a, b)] == 1)
        .collect()
}

/// Chains boundary edges into one ordered vertex cycle.
///
/// Each step must find exactly one unused edge continuing from the cursor
/// vertex; zero or several continuations, or a chain that does not close,
/// mean the cavity is degenerate and `None` is returned.
fn chain_boundary(edges: &[(PointKey, PointKey)]) -> Option<Vec<PointKey>> {
    let (first, rest) = edges.split_first()?;

    let mut remaining: Vec<(PointKey, PointKey)> = rest.to_vec();
    let mut cycle = vec![first.0];
    let mut cursor = first.1;

    while !remaining.is_empty() {
        let mut continuation = None;
        for (i, &(a, b)) in remaining.iter().enumerate() {
            if a == cursor || b == cursor {
                if continuation.is_some() {
                    return None; // ambiguous continuation
                }
                continuation = Some((i, if a == cursor { b } else { a }));
            }
        }
        let (i, far) = continuation?;
        remaining.remove(i);
        cycle.push(cursor);
        cursor = far;
    }

    (cursor == cycle[0]).then_some(cycle)
}

fn unordered(a: PointKey, b: PointKey) -> (PointKey, PointKey) {
    if a < b { (a, b) } else { (b, a) }
}
