//! Gilbert-Johnson-Keerthi intersection test
//!
//! Two convex shapes overlap exactly when their Minkowski difference `A - B`
//! contains the origin. GJK evolves a simplex inside `A - B` toward the
//! origin, one support point per iteration, until either a tetrahedron
//! encloses the origin or a support point proves the origin unreachable.
//!
//! The simplex state machine is keyed on the number of points:
//!
//! | Size | Case        | Reduction                                          |
//! |------|-------------|----------------------------------------------------|
//! | 1    | point       | search toward the origin                           |
//! | 2    | line        | keep the segment or its newest end                 |
//! | 3    | triangle    | pick the Voronoi region holding the origin         |
//! | 4    | tetrahedron | drop the vertex opposite a separating face or stop |
//!
//! The terminal tetrahedron is the starting polytope for
//! [`epa`](super::epa).

use log::{trace, warn};

use crate::foundation::math::{any_perpendicular, Vec3, DIRECTION_EPSILON};
use super::simplex::Simplex;
use super::support::{support, SupportMap};

/// Result of one state-machine step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextSimplex {
    /// Reduced simplex to continue from
    pub simplex: Simplex,
    /// Direction for the next support query
    pub direction: Vec3,
    /// True once the simplex encloses the origin
    pub finish_searching: bool,
}

impl NextSimplex {
    fn searching(simplex: Simplex, direction: Vec3) -> Self {
        Self {
            simplex,
            direction,
            finish_searching: false,
        }
    }
}

/// Result of a full GJK run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GjkOutcome {
    /// True if the shapes overlap
    pub intersecting: bool,
    /// Final simplex; a tetrahedron enclosing the origin when `intersecting`
    pub simplex: Simplex,
    /// Support queries performed after the initial point
    pub iterations: usize,
}

/// Test whether `a` and `b` overlap
///
/// `initial_direction` only seeds the search; any non-zero vector works and
/// the vector between the two shapes' centers converges fastest. Running out
/// of `max_iterations` is reported as no intersection.
pub fn intersect<A, B>(a: &A, b: &B, initial_direction: &Vec3, max_iterations: usize) -> GjkOutcome
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut direction = if initial_direction.norm_squared() > DIRECTION_EPSILON {
        *initial_direction
    } else {
        Vec3::x()
    };

    let mut simplex = Simplex::new();
    let first = support(a, b, &direction);
    simplex.push_front(first);
    direction = -first.point;

    for iteration in 1..=max_iterations {
        if direction.norm_squared() <= DIRECTION_EPSILON {
            direction = fallback_direction(&simplex);
        }

        let next = support(a, b, &direction);
        if next.point.dot(&direction) < 0.0 {
            trace!("GJK: separated after {} iterations", iteration);
            return GjkOutcome {
                intersecting: false,
                simplex,
                iterations: iteration,
            };
        }

        simplex.push_front(next);
        let step = next_simplex(&simplex);
        if step.finish_searching {
            trace!("GJK: origin enclosed after {} iterations", iteration);
            return GjkOutcome {
                intersecting: true,
                simplex: step.simplex,
                iterations: iteration,
            };
        }

        simplex = step.simplex;
        direction = step.direction;
    }

    warn!("GJK: iteration cap {} reached, treating as separated", max_iterations);
    GjkOutcome {
        intersecting: false,
        simplex,
        iterations: max_iterations,
    }
}

/// Run the case matching the simplex size
pub fn next_simplex(points: &Simplex) -> NextSimplex {
    match points.len() {
        2 => line_case(points),
        3 => triangle_case(points),
        4 => tetrahedron_case(points),
        _ => NextSimplex::searching(*points, fallback_direction(points)),
    }
}

fn same_direction(direction: &Vec3, to_origin: &Vec3) -> bool {
    direction.dot(to_origin) > 0.0
}

/// Non-zero search direction for a simplex whose natural direction vanished
///
/// Happens when the origin lies exactly on the current simplex (touching
/// contact or a support point at the origin).
fn fallback_direction(points: &Simplex) -> Vec3 {
    match points.len() {
        0 | 1 => {
            let to_origin = points.positions().next().map_or(Vec3::x(), |a| -a);
            if to_origin.norm_squared() > DIRECTION_EPSILON {
                to_origin
            } else {
                Vec3::x()
            }
        }
        2 => any_perpendicular(&(points[1].point - points[0].point)),
        _ => {
            let ab = points[1].point - points[0].point;
            let ac = points[2].point - points[0].point;
            let normal = ab.cross(&ac);
            if normal.norm_squared() > DIRECTION_EPSILON {
                normal
            } else {
                any_perpendicular(&ab)
            }
        }
    }
}

/// Direction perpendicular to `edge`, pointing at the origin
fn toward_origin_from_edge(edge: &Vec3, to_origin: &Vec3) -> Vec3 {
    let direction = edge.cross(to_origin).cross(edge);
    if direction.norm_squared() > DIRECTION_EPSILON {
        direction
    } else {
        // Origin lies on the edge's line
        any_perpendicular(edge)
    }
}

fn line_case(points: &Simplex) -> NextSimplex {
    let a = points[0];
    let b = points[1];

    let ab = b.point - a.point;
    let ao = -a.point;

    if same_direction(&ab, &ao) {
        NextSimplex::searching(Simplex::from_points(&[a, b]), toward_origin_from_edge(&ab, &ao))
    } else {
        NextSimplex::searching(Simplex::from_points(&[a]), ao)
    }
}

fn triangle_case(points: &Simplex) -> NextSimplex {
    let a = points[0];
    let b = points[1];
    let c = points[2];

    let ab = b.point - a.point;
    let ac = c.point - a.point;
    let ao = -a.point;

    let abc = ab.cross(&ac);
    if abc.norm_squared() <= DIRECTION_EPSILON {
        // Collinear points carry no more information than the newest edge
        return line_case(&Simplex::from_points(&[a, b]));
    }

    if same_direction(&abc.cross(&ac), &ao) {
        if same_direction(&ac, &ao) {
            return NextSimplex::searching(
                Simplex::from_points(&[a, c]),
                toward_origin_from_edge(&ac, &ao),
            );
        }
        return line_case(&Simplex::from_points(&[a, b]));
    }

    if same_direction(&ab.cross(&abc), &ao) {
        return line_case(&Simplex::from_points(&[a, b]));
    }

    if same_direction(&abc, &ao) {
        NextSimplex::searching(Simplex::from_points(&[a, b, c]), abc)
    } else {
        // Origin is below the plane: flip winding so the normal faces it
        NextSimplex::searching(Simplex::from_points(&[a, c, b]), -abc)
    }
}

fn tetrahedron_case(points: &Simplex) -> NextSimplex {
    let a = points[0];
    let b = points[1];
    let c = points[2];
    let d = points[3];

    let ab = b.point - a.point;
    let ac = c.point - a.point;
    let ad = d.point - a.point;
    let ao = -a.point;

    let abc = ab.cross(&ac);
    let acd = ac.cross(&ad);
    let adb = ad.cross(&ab);

    if same_direction(&abc, &ao) {
        return triangle_case(&Simplex::from_points(&[a, b, c]));
    }
    if same_direction(&acd, &ao) {
        return triangle_case(&Simplex::from_points(&[a, c, d]));
    }
    if same_direction(&adb, &ao) {
        return triangle_case(&Simplex::from_points(&[a, d, b]));
    }

    NextSimplex {
        simplex: *points,
        direction: Vec3::zeros(),
        finish_searching: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::support::{ConvexHull, SupportPoint};

    fn cube_at(center: Vec3, half: f32) -> ConvexHull {
        let mut vertices = Vec::new();
        for i in 0..8 {
            vertices.push(center + Vec3::new(
                if i & 1 == 0 { -half } else { half },
                if i & 2 == 0 { -half } else { half },
                if i & 4 == 0 { -half } else { half },
            ));
        }
        ConvexHull::new(vertices)
    }

    fn minkowski(p: Vec3) -> SupportPoint {
        SupportPoint::new(p, Vec3::zeros())
    }

    #[test]
    fn test_overlapping_cubes_intersect() {
        let a = cube_at(Vec3::zeros(), 0.5);
        let b = cube_at(Vec3::new(0.5, 0.0, 0.0), 0.5);

        let outcome = intersect(&a, &b, &Vec3::new(0.5, 0.0, 0.0), 64);
        assert!(outcome.intersecting);
        assert!(outcome.simplex.is_tetrahedron());
    }

    #[test]
    fn test_distant_cubes_do_not_intersect() {
        let a = cube_at(Vec3::zeros(), 0.5);
        let b = cube_at(Vec3::new(10.0, 0.0, 0.0), 0.5);

        let outcome = intersect(&a, &b, &Vec3::new(10.0, 0.0, 0.0), 64);
        assert!(!outcome.intersecting);
        assert!(outcome.simplex.len() <= 4);
    }

    #[test]
    fn test_zero_initial_direction_is_replaced() {
        let a = cube_at(Vec3::zeros(), 1.0);
        let b = cube_at(Vec3::zeros(), 0.5);

        let outcome = intersect(&a, &b, &Vec3::zeros(), 64);
        assert!(outcome.intersecting);
        for p in outcome.simplex.positions() {
            assert!(p.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_iteration_cap_reports_no_intersection() {
        let a = cube_at(Vec3::zeros(), 0.5);
        let b = cube_at(Vec3::new(0.25, 0.1, 0.0), 0.5);

        let outcome = intersect(&a, &b, &Vec3::x(), 0);
        assert!(!outcome.intersecting);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_line_case_keeps_segment_facing_origin() {
        let simplex = Simplex::from_points(&[
            minkowski(Vec3::new(-1.0, 1.0, 0.0)),
            minkowski(Vec3::new(1.0, 1.0, 0.0)),
        ]);
        let next = next_simplex(&simplex);

        assert_eq!(next.simplex.len(), 2);
        assert!(!next.finish_searching);
        let dir = next.direction.normalize();
        assert!((dir - Vec3::new(0.0, -1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_line_case_reduces_to_point() {
        let simplex = Simplex::from_points(&[
            minkowski(Vec3::new(1.0, 0.0, 0.0)),
            minkowski(Vec3::new(2.0, 0.0, 0.0)),
        ]);
        let next = next_simplex(&simplex);

        assert_eq!(next.simplex.len(), 1);
        assert_eq!(next.simplex[0].point, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(next.direction, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_line_through_origin_gets_perpendicular_direction() {
        let simplex = Simplex::from_points(&[
            minkowski(Vec3::new(-1.0, 0.0, 0.0)),
            minkowski(Vec3::new(1.0, 0.0, 0.0)),
        ]);
        let next = next_simplex(&simplex);

        assert!(next.direction.norm() > 0.0);
        assert!(next.direction.x.abs() < 1e-6);
    }

    #[test]
    fn test_triangle_case_flips_winding_below_plane() {
        // Triangle in the z = 1 plane; origin below it
        let simplex = Simplex::from_points(&[
            minkowski(Vec3::new(-1.0, -1.0, 1.0)),
            minkowski(Vec3::new(1.0, -1.0, 1.0)),
            minkowski(Vec3::new(0.0, 1.0, 1.0)),
        ]);
        let next = next_simplex(&simplex);

        assert_eq!(next.simplex.len(), 3);
        assert!(next.direction.z < 0.0);
        assert!(next.direction.dot(&-simplex[0].point) > 0.0);
    }

    #[test]
    fn test_tetrahedron_case_encloses_origin() {
        let simplex = Simplex::from_points(&[
            minkowski(Vec3::new(0.0, 0.0, 1.0)),
            minkowski(Vec3::new(-1.0, -1.0, -1.0)),
            minkowski(Vec3::new(1.0, -1.0, -1.0)),
            minkowski(Vec3::new(0.0, 1.0, -1.0)),
        ]);
        let next = next_simplex(&simplex);
        assert!(next.finish_searching);
        assert_eq!(next.simplex, simplex);
    }

    #[test]
    fn test_tetrahedron_case_drops_far_vertex() {
        // Same base, apex below the base: the origin is outside
        let simplex = Simplex::from_points(&[
            minkowski(Vec3::new(0.0, 0.0, -3.0)),
            minkowski(Vec3::new(-1.0, -1.0, -1.0)),
            minkowski(Vec3::new(1.0, -1.0, -1.0)),
            minkowski(Vec3::new(0.0, 1.0, -1.0)),
        ]);
        let next = next_simplex(&simplex);
        assert!(!next.finish_searching);
        assert!(next.simplex.len() < 4);
        assert!(next.direction.norm() > 0.0);
    }
}
