//! Property-based tests for the geometric primitives.
//!
//! Verified properties:
//! - Segment intersection is symmetric in its arguments
//! - Circumcircles are equidistant from all three defining points
//! - Reversing a polygon's vertex ring flips its winding and keeps its area
//! - A triangle contains its own centroid
//! - Point arithmetic round-trips through addition and subtraction

#![allow(missing_docs)]

use proptest::prelude::*;
use voronoi_tessellation::prelude::*;

fn finite_coordinate() -> impl Strategy<Value = f64> {
    -1000.0..1000.0
}

fn arb_point() -> impl Strategy<Value = Point> {
    (finite_coordinate(), finite_coordinate()).prop_map(|(x, y)| Point::new(x, y))
}

fn arb_segment() -> impl Strategy<Value = Segment> {
    (arb_point(), arb_point())
        .prop_filter_map("endpoints must be distinct", |(a, b)| Segment::new(a, b).ok())
}

/// Twice the signed triangle area, used to reject near-degenerate triples.
fn doubled_area(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

proptest! {
    #[test]
    fn intersection_is_symmetric(s1 in arb_segment(), s2 in arb_segment()) {
        let forward = s1.intersection(&s2);
        let backward = s2.intersection(&s1);

        prop_assert_eq!(forward.intersects, backward.intersects);
        prop_assert_eq!(forward.endpoint_touch, backward.endpoint_touch);
        // The two computed points only agree well away from parallel.
        if s1.direction().cross(s2.direction()).abs() > 1e-3 {
            if let (Some(p), Some(q)) = (forward.point, backward.point) {
                prop_assert!(p.close_to(q, 1e-6));
            }
        }
    }

    #[test]
    fn crossing_point_lies_on_both_segments(s1 in arb_segment(), s2 in arb_segment()) {
        // Near-parallel pairs make the crossing point ill-conditioned.
        prop_assume!(s1.direction().cross(s2.direction()).abs() > 1e-3);

        let hit = s1.intersection(&s2);
        if hit.crosses() {
            let p = hit.point.unwrap();
            prop_assert!(s1.contains_point(p));
            prop_assert!(s2.contains_point(p));
        }
    }

    #[test]
    fn circumcircle_is_equidistant(a in arb_point(), b in arb_point(), c in arb_point()) {
        prop_assume!(doubled_area(a, b, c).abs() > 1e-3);

        let circle = Circle::circumscribing(a, b, c).unwrap();
        let scale = circle.radius.max(1.0);
        for p in [a, b, c] {
            prop_assert!((circle.center.distance_to(p) - circle.radius).abs() < 1e-6 * scale);
        }
    }

    #[test]
    fn reversal_flips_winding_and_keeps_area(a in arb_point(), b in arb_point(), c in arb_point(), d in arb_point()) {
        let vertices = vec![a, b, c, d];
        prop_assume!(Polygon::new(vertices.clone()).is_ok());

        let forward = Polygon::new(vertices.clone()).unwrap();
        prop_assume!(forward.area() > 1e-3);

        let mut reversed_vertices = vertices;
        reversed_vertices.reverse();
        let reversed = Polygon::new(reversed_vertices).unwrap();

        prop_assert_ne!(forward.winding(), reversed.winding());
        prop_assert!((forward.area() - reversed.area()).abs() < 1e-9 * forward.area().max(1.0));
        prop_assert!((forward.signed_area() + reversed.signed_area()).abs() < 1e-9 * forward.area().max(1.0));
    }

    #[test]
    fn triangle_contains_its_centroid(a in arb_point(), b in arb_point(), c in arb_point()) {
        prop_assume!(doubled_area(a, b, c).abs() > 1e-3);

        let triangle = Polygon::new(vec![a, b, c]).unwrap();
        prop_assert!(triangle.contains(triangle.centroid()));
    }

    #[test]
    fn point_arithmetic_round_trips(a in arb_point(), b in arb_point()) {
        let sum = a + b;
        prop_assert!((sum - b).close_to(a, 1e-9));
        prop_assert_eq!(-(-a), a);
        prop_assert!(a.distance_to(b) >= 0.0);
        prop_assert_eq!(a.distance_to(b), b.distance_to(a));
    }
}
