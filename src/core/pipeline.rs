//! Pipeline orchestration: the [`Tessellator`] builder and the
//! [`tessellate`] convenience entry point.
//!
//! The pipeline runs four stages over one [`Mesh`]: Bowyer-Watson
//! triangulation, the Voronoi dual, border clipping, and face assembly.
//! Between stages the configured observer receives a [`Snapshot`] of the
//! live arena and the cancellation flag is polled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::trace;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::geometry::{DEFAULT_MERGE_TOLERANCE, Point, Polygon, Segment};

use super::state::{FaceKey, Mesh};
use super::{TessellationError, assemble, clip, dual, triangulate};

/// Borders enclosing less area than this are rejected outright.
const MIN_BORDER_AREA: f64 = 1e-9;

/// Relative tolerance for recognizing a cell that duplicates the whole
/// border.
const BORDER_AREA_EPSILON: f64 = 1e-9;

/// The four pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    /// Site scattering, border fan seeding, and Bowyer-Watson insertion.
    Triangulation,
    /// Circumcenter edges and open-cell stand-ins.
    VoronoiDual,
    /// Chopping at the border and winding repair.
    BorderClip,
    /// Leftmost-turn face extraction.
    FaceAssembly,
}

/// A copy of the arena contents after one stage, handed to the observer.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    /// The stage that just finished.
    pub stage: Stage,
    /// All live points, in arena order.
    pub points: Vec<Point>,
    /// All live segments, in arena order.
    pub segments: Vec<Segment>,
    /// Vertex rings of the live faces, or of the finished cells after
    /// [`Stage::FaceAssembly`].
    pub faces: Vec<Vec<Point>>,
}

/// Tessellates `border` into `point_count + 1` or fewer Voronoi cells,
/// reproducibly for a given `seed`.
///
/// Shorthand for [`Tessellator::new`] with only the point count and seed
/// configured.
pub fn tessellate(
    border: &Polygon,
    point_count: u32,
    seed: u64,
) -> Result<Vec<Polygon>, TessellationError> {
    Tessellator::new(border)
        .point_count(point_count)
        .seed(seed)
        .run()
}

/// Builder for a single tessellation run.
///
/// ```
/// use voronoi_tessellation::prelude::*;
///
/// let border = Polygon::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 100.0),
///     Point::new(100.0, 100.0),
///     Point::new(100.0, 0.0),
/// ])?;
/// match Tessellator::new(&border).point_count(12).seed(42).run() {
///     Ok(cells) => assert!(!cells.is_empty()),
///     Err(err) => eprintln!("degenerate configuration: {err}"),
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Tessellator<'a> {
    border: &'a Polygon,
    point_count: u32,
    seed: u64,
    merge_tolerance: f64,
    observer: Option<Box<dyn FnMut(&Snapshot) + 'a>>,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> Tessellator<'a> {
    /// Creates a tessellator for `border` with no interior sites, seed 0,
    /// and the default merge tolerance.
    #[must_use]
    pub fn new(border: &'a Polygon) -> Self {
        Self {
            border,
            point_count: 0,
            seed: 0,
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
            observer: None,
            cancel: None,
        }
    }

    /// Number of interior sites to scatter.
    #[must_use]
    pub fn point_count(mut self, point_count: u32) -> Self {
        self.point_count = point_count;
        self
    }

    /// Seed for the site scatter. Equal seeds give bit-identical output.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Point deduplication radius for the arena.
    #[must_use]
    pub fn merge_tolerance(mut self, merge_tolerance: f64) -> Self {
        self.merge_tolerance = merge_tolerance;
        self
    }

    /// Installs an observer called with a [`Snapshot`] after each stage.
    #[must_use]
    pub fn observe<F>(mut self, observer: F) -> Self
    where
        F: FnMut(&Snapshot) + 'a,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Installs a cancellation flag, polled between stages. Setting it
    /// makes the run return [`TessellationError::Cancelled`].
    #[must_use]
    pub fn cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Runs the pipeline to completion.
    pub fn run(mut self) -> Result<Vec<Polygon>, TessellationError> {
        if self.border.area() < MIN_BORDER_AREA {
            return Err(TessellationError::InvalidBorder {
                reason: "border encloses no area".to_owned(),
            });
        }

        let mut mesh = Mesh::with_merge_tolerance(self.merge_tolerance);
        let mut rng = StdRng::seed_from_u64(self.seed);

        self.check_cancelled()?;
        trace!("triangulation stage, seed {}", self.seed);
        let sites = triangulate::scatter_sites(self.border, self.point_count, &mut rng, &mut mesh);
        triangulate::seed_border_fan(self.border, &mut mesh);
        triangulate::insert_sites(&sites, &mut mesh);
        self.emit(Stage::Triangulation, &mesh, &[]);

        self.check_cancelled()?;
        trace!("voronoi dual stage");
        if sites.is_empty() {
            // With no interior sites the dual of the seed fan is
            // meaningless; the border alone becomes the single cell.
            let faces: Vec<FaceKey> = mesh.faces.keys().collect();
            for face in faces {
                mesh.remove_face(face);
            }
        } else {
            let centers = dual::build_voronoi_edges(&mut mesh)?;
            dual::approximate_open_cells(self.border, &mut mesh, &centers);
        }
        self.emit(Stage::VoronoiDual, &mesh, &[]);

        self.check_cancelled()?;
        trace!("border clip stage");
        clip::chop_border(self.border, &mut mesh);
        clip::fix_border_winding(self.border, &mut mesh)?;
        self.emit(Stage::BorderClip, &mesh, &[]);

        self.check_cancelled()?;
        trace!("face assembly stage");
        let mut cells = assemble::assemble_faces(self.border, &mut mesh)?;
        if cells.len() > 1 {
            // A ring disconnected from every interior segment walks into a
            // duplicate of the whole border; drop it in favor of the real
            // cells.
            let border_area = self.border.area();
            cells.retain(|cell| {
                (cell.area() - border_area).abs() > BORDER_AREA_EPSILON * border_area
            });
        }
        self.emit(Stage::FaceAssembly, &mesh, &cells);

        trace!("tessellation finished with {} cells", cells.len());
        Ok(cells)
    }

    fn check_cancelled(&self) -> Result<(), TessellationError> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(TessellationError::Cancelled),
            _ => Ok(()),
        }
    }

    fn emit(&mut self, stage: Stage, mesh: &Mesh, cells: &[Polygon]) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        let mut faces: Vec<Vec<Point>> = mesh
            .faces
            .values()
            .map(|face| face.vertices.iter().map(|&k| mesh.point(k)).collect())
            .collect();
        faces.extend(cells.iter().map(|cell| cell.vertices().to_vec()));
        let snapshot = Snapshot {
            stage,
            points: mesh.points.values().copied().collect(),
            segments: mesh.segments.keys().map(|k| mesh.segment_geometry(k)).collect(),
            faces,
        };
        observer(&snapshot);
    }
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

    #[test]
    fn zero_sites_yield_the_border_as_one_cell() {
        let border = square_border();
        let cells = tessellate(&border, 0, 7).unwrap();

        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].vertex_count(), 4);
        assert_eq!(cells[0].area(), border.area());
    }

    #[test]
    fn flat_border_is_rejected() {
        let border = Polygon::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ])
        .unwrap();

        let err = tessellate(&border, 5, 0).unwrap_err();
        assert!(matches!(err, TessellationError::InvalidBorder { .. }));
    }

    #[test]
    fn equal_seeds_give_identical_results() {
        let border = square_border();
        assert_eq!(tessellate(&border, 8, 123), tessellate(&border, 8, 123));
    }

    #[test]
    fn preset_cancel_flag_aborts_before_work() {
        let border = square_border();
        let flag = Arc::new(AtomicBool::new(true));

        let err = Tessellator::new(&border)
            .point_count(10)
            .cancel_flag(flag)
            .run()
            .unwrap_err();
        assert_eq!(err, TessellationError::Cancelled);
    }

    #[test]
    fn observer_sees_every_stage_in_order() {
        let border = square_border();
        let mut stages = Vec::new();

        Tessellator::new(&border)
            .observe(|snapshot: &Snapshot| stages.push(snapshot.stage))
            .run()
            .unwrap();

        assert_eq!(
            stages,
            vec![
                Stage::Triangulation,
                Stage::VoronoiDual,
                Stage::BorderClip,
                Stage::FaceAssembly,
            ]
        );
    }

    #[test]
    fn cancel_mid_run_stops_between_stages() {
        let border = square_border();
        let flag = Arc::new(AtomicBool::new(false));
        let trigger = Arc::clone(&flag);

        let err = Tessellator::new(&border)
            .observe(move |snapshot: &Snapshot| {
                if snapshot.stage == Stage::Triangulation {
                    trigger.store(true, Ordering::Relaxed);
                }
            })
            .cancel_flag(flag)
            .run()
            .unwrap_err();
        assert_eq!(err, TessellationError::Cancelled);
    }
}
