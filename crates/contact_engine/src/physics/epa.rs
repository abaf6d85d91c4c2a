//! Expanding Polytope Algorithm
//!
//! Starting from the tetrahedron GJK leaves behind, EPA grows a convex
//! polytope inside the Minkowski difference `A - B`. The face closest to the
//! origin is repeatedly pushed outward by the support point along its
//! normal. When the support point no longer moves past that face, the face's
//! normal and distance are the penetration normal and depth.
//!
//! Faces are stored as index triples wound counter-clockwise seen from
//! outside, so every normal points away from the polytope interior.
//! Inserting a vertex removes the connected patch of faces it can see,
//! starting from the closest face, and stitches the hole shut with a fan of
//! new faces around the horizon edges. Edge direction is preserved, which
//! keeps the winding consistent. An insertion that would leave a hull that
//! is not a closed triangulated sphere is refused and the current closest
//! face is returned instead.

use std::collections::HashMap;

use log::{trace, warn};

use crate::foundation::math::{try_normalize, Vec3};
use crate::geometry::Triangle;
use super::contact::CollisionPoint;
use super::simplex::Simplex;
use super::support::{support, SupportMap, SupportPoint};

/// Outward normal and signed origin distance of one polytope face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceNormal {
    /// Unit normal pointing away from the polytope interior (zero for degenerate faces)
    pub normal: Vec3,
    /// Signed distance from the origin to the face plane (infinite for degenerate faces)
    ///
    /// Negative when the origin lies outside the face.
    pub distance: f32,
}

impl FaceNormal {
    /// True for zero-area faces, which carry no usable plane
    pub fn is_degenerate(&self) -> bool {
        !self.distance.is_finite()
    }
}

/// Result of an EPA run, with diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct EpaOutcome {
    /// Penetration normal, depth and witness points
    pub collision: CollisionPoint,
    /// Number of closest-face selections performed
    pub iterations: usize,
    /// False when the iteration cap was hit or the input was unusable
    pub converged: bool,
    /// Distance of the selected face at every iteration
    pub face_distances: Vec<f32>,
}

impl EpaOutcome {
    fn new(collision: CollisionPoint, iterations: usize, converged: bool, face_distances: Vec<f32>) -> Self {
        Self {
            collision,
            iterations,
            converged,
            face_distances,
        }
    }
}

const INITIAL_FACES: [[usize; 3]; 4] = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];

/// Distance below which a point counts as lying on a plane
const PLANE_EPSILON: f32 = 1.0e-5;

/// Slack on barycentric weights when looking for the triangle holding the origin
const BARYCENTRIC_SLACK: f32 = 1.0e-4;

/// Vertices and outward-wound faces of the expanding hull
#[derive(Debug, Clone)]
struct Polytope {
    vertices: Vec<SupportPoint>,
    faces: Vec<[usize; 3]>,
}

/// How EPA starts from the terminal GJK simplex
#[derive(Debug)]
enum Seed {
    /// A closed hull around the origin, ready to expand
    Hull(Polytope),
    /// The origin lies on the boundary of `A - B`: zero-depth contact
    Touching(CollisionPoint),
    /// Nothing to expand
    Unusable,
}

/// Expand `simplex` into the penetration normal and depth of `a` against `b`
///
/// `simplex` must be the enclosing tetrahedron from a successful GJK run.
/// Hitting `max_iterations` is not an error: the closest face found so far
/// is returned with `converged == false`.
pub fn expand<A, B>(
    simplex: &Simplex,
    a: &A,
    b: &B,
    max_iterations: usize,
    tolerance: f32,
) -> EpaOutcome
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut polytope = match seed(simplex, a, b) {
        Seed::Hull(polytope) => polytope,
        Seed::Touching(collision) => {
            trace!("EPA: origin on the boundary of A - B, zero depth");
            return EpaOutcome::new(collision, 0, true, Vec::new());
        }
        Seed::Unusable => {
            warn!("EPA: cannot build a hull from a simplex of {} points", simplex.len());
            return EpaOutcome::new(CollisionPoint::degenerate(simplex), 0, false, Vec::new());
        }
    };

    let mut estimate = CollisionPoint::degenerate(simplex);
    let mut face_distances = Vec::new();

    for iteration in 1..=max_iterations {
        let (normals, min_face) = face_normals(&polytope.vertices, &polytope.faces);
        let closest = normals[min_face];
        if closest.is_degenerate() || closest.distance < -PLANE_EPSILON {
            warn!("EPA: polytope no longer encloses the origin at iteration {}", iteration);
            return EpaOutcome::new(estimate, iteration, false, face_distances);
        }
        face_distances.push(closest.distance);
        estimate = contact_from_face(&polytope.vertices, polytope.faces[min_face], &closest);

        let new_point = support(a, b, &closest.normal);
        let new_distance = closest.normal.dot(&new_point.point);

        if new_distance - closest.distance <= tolerance {
            trace!(
                "EPA: converged after {} iterations, depth {}",
                iteration,
                closest.distance
            );
            return EpaOutcome::new(estimate, iteration, true, face_distances);
        }

        if polytope.contains_vertex(&new_point) {
            warn!(
                "EPA: support point {:?} is already a polytope vertex, stopping at depth {}",
                new_point.point, closest.distance
            );
            return EpaOutcome::new(estimate, iteration, false, face_distances);
        }

        if let Err(reason) = polytope.insert(new_point, &normals, min_face) {
            warn!("EPA: {}, stopping at depth {}", reason, closest.distance);
            return EpaOutcome::new(estimate, iteration, false, face_distances);
        }
    }

    let (normals, min_face) = face_normals(&polytope.vertices, &polytope.faces);
    let closest = normals[min_face];
    if !closest.is_degenerate() && closest.distance >= -PLANE_EPSILON {
        estimate = contact_from_face(&polytope.vertices, polytope.faces[min_face], &closest);
    }
    warn!(
        "EPA: iteration cap {} reached, using closest face at depth {}",
        max_iterations, estimate.depth
    );
    EpaOutcome::new(estimate, max_iterations, false, face_distances)
}

/// Build the starting hull from the terminal GJK simplex
///
/// A tetrahedron with volume is used as is. A flat one means the origin sits
/// in its plane: either that plane supports `A - B` (touching contact) or the
/// hull is rebuilt as a double pyramid over the triangle holding the origin.
fn seed<A, B>(simplex: &Simplex, a: &A, b: &B) -> Seed
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    if !simplex.is_tetrahedron() {
        return Seed::Unusable;
    }
    let points = simplex.points();
    let p = |i: usize| points[i].point;

    let Some((base, scaled)) = INITIAL_FACES
        .iter()
        .map(|&[i, j, k]| ([i, j, k], Triangle::new(p(i), p(j), p(k)).scaled_normal()))
        .max_by(|(_, x), (_, y)| x.norm_squared().total_cmp(&y.norm_squared()))
    else {
        return Seed::Unusable;
    };
    let Some(normal) = try_normalize(&scaled) else {
        return Seed::Unusable;
    };

    let apex = 6 - base.iter().sum::<usize>();
    if normal.dot(&(p(apex) - p(base[0]))).abs() > PLANE_EPSILON {
        return Seed::Hull(Polytope {
            vertices: points.to_vec(),
            faces: initial_faces(points),
        });
    }

    if normal.dot(&p(base[0])).abs() > PLANE_EPSILON {
        return Seed::Unusable;
    }
    let Some((face, weights)) = enclosing_triangle(points) else {
        return Seed::Unusable;
    };

    let up = support(a, b, &normal);
    let down = support(a, b, &-normal);
    let touching = |normal: Vec3| {
        let [pa, pb, pc] = face.map(|i| points[i]);
        Seed::Touching(CollisionPoint {
            normal,
            depth: 0.0,
            point_on_a: pa.on_a * weights[0] + pb.on_a * weights[1] + pc.on_a * weights[2],
            point_on_b: pa.on_b * weights[0] + pb.on_b * weights[1] + pc.on_b * weights[2],
        })
    };
    if normal.dot(&up.point) <= PLANE_EPSILON {
        return touching(normal);
    }
    if -normal.dot(&down.point) <= PLANE_EPSILON {
        return touching(-normal);
    }

    let [i, mut j, mut k] = face;
    if Triangle::new(p(i), p(j), p(k)).scaled_normal().dot(&normal) < 0.0 {
        std::mem::swap(&mut j, &mut k);
    }
    Seed::Hull(Polytope {
        vertices: vec![points[i], points[j], points[k], up, down],
        faces: vec![[0, 1, 3], [1, 2, 3], [2, 0, 3], [1, 0, 4], [2, 1, 4], [0, 2, 4]],
    })
}

/// The four faces of the starting tetrahedron, wound outward
fn initial_faces(polytope: &[SupportPoint]) -> Vec<[usize; 3]> {
    let p = |i: usize| polytope[i].point;
    let normal = (p(1) - p(0)).cross(&(p(2) - p(0)));

    // Face 0 must face away from vertex 3
    if normal.dot(&(p(3) - p(0))) > 0.0 {
        INITIAL_FACES.iter().map(|&[i, j, k]| [i, k, j]).collect()
    } else {
        INITIAL_FACES.to_vec()
    }
}

/// A face of a flat tetrahedron whose triangle holds the origin
fn enclosing_triangle(points: &[SupportPoint]) -> Option<([usize; 3], [f32; 3])> {
    INITIAL_FACES.iter().find_map(|&face| {
        let [a, b, c] = face.map(|i| points[i].point);
        Triangle::new(a, b, c)
            .barycentric(&Vec3::zeros())
            .filter(|weights| weights.iter().all(|&w| w >= -BARYCENTRIC_SLACK))
            .map(|weights| (face, weights))
    })
}

impl Polytope {
    fn contains_vertex(&self, point: &SupportPoint) -> bool {
        self.vertices
            .iter()
            .any(|v| (v.point - point.point).norm_squared() <= PLANE_EPSILON * PLANE_EPSILON)
    }

    /// Add `point`, replacing every face it can see
    ///
    /// Visible faces are collected by walking across shared edges from
    /// `start`, so the removed patch is always connected. Degenerate faces
    /// are only removed when they border that patch. The hull is left
    /// untouched when the result would not satisfy `F = 2V - 4`.
    fn insert(&mut self, point: SupportPoint, normals: &[FaceNormal], start: usize) -> Result<(), &'static str> {
        let owners: HashMap<(usize, usize), usize> = self
            .faces
            .iter()
            .enumerate()
            .flat_map(|(index, &[i, j, k])| [((i, j), index), ((j, k), index), ((k, i), index)])
            .collect();

        let mut visible = vec![false; self.faces.len()];
        visible[start] = true;
        let mut pending = vec![start];
        while let Some(face) = pending.pop() {
            let [i, j, k] = self.faces[face];
            for (from, to) in [(i, j), (j, k), (k, i)] {
                let Some(&neighbor) = owners.get(&(to, from)) else {
                    return Err("polytope has an open edge");
                };
                if visible[neighbor] {
                    continue;
                }
                let normal = &normals[neighbor];
                let anchor = self.vertices[self.faces[neighbor][0]].point;
                if normal.is_degenerate() || normal.normal.dot(&(point.point - anchor)) > PLANE_EPSILON {
                    visible[neighbor] = true;
                    pending.push(neighbor);
                }
            }
        }

        let mut horizon: Vec<(usize, usize)> = Vec::new();
        let mut kept: Vec<[usize; 3]> = Vec::with_capacity(self.faces.len() + 4);
        for (face, &seen) in self.faces.iter().zip(&visible) {
            if seen {
                add_if_unique_edge(&mut horizon, face[0], face[1]);
                add_if_unique_edge(&mut horizon, face[1], face[2]);
                add_if_unique_edge(&mut horizon, face[2], face[0]);
            } else {
                kept.push(*face);
            }
        }
        if horizon.is_empty() {
            return Err("new vertex sees the whole polytope");
        }

        let new_index = self.vertices.len();
        for &(i, j) in &horizon {
            let fan = Triangle::new(self.vertices[i].point, self.vertices[j].point, point.point);
            if fan.normal().is_none() {
                return Err("new vertex is collinear with a horizon edge");
            }
            kept.push([i, j, new_index]);
        }

        let mut referenced = vec![false; new_index + 1];
        for index in kept.iter().flatten() {
            referenced[*index] = true;
        }
        let vertex_count = referenced.iter().filter(|&&r| r).count();
        if kept.len() + 4 != 2 * vertex_count {
            return Err("visible faces do not form a single patch");
        }

        self.vertices.push(point);
        self.faces = kept;
        Ok(())
    }
}

/// Normal of every face, plus the index of the face closest to the origin
///
/// Distances are signed. Degenerate faces are never selected and ties keep
/// the first face.
pub fn face_normals(polytope: &[SupportPoint], faces: &[[usize; 3]]) -> (Vec<FaceNormal>, usize) {
    let mut normals = Vec::with_capacity(faces.len());
    let mut min_face = 0;
    let mut min_distance = f32::INFINITY;

    for (index, &[i, j, k]) in faces.iter().enumerate() {
        let a = polytope[i].point;
        let b = polytope[j].point;
        let c = polytope[k].point;

        let face_normal = match try_normalize(&(b - a).cross(&(c - a))) {
            Some(normal) => FaceNormal {
                normal,
                distance: normal.dot(&a),
            },
            None => FaceNormal {
                normal: Vec3::zeros(),
                distance: f32::INFINITY,
            },
        };

        if face_normal.distance < min_distance {
            min_distance = face_normal.distance;
            min_face = index;
        }
        normals.push(face_normal);
    }

    (normals, min_face)
}

/// Record edge `a -> b` of a removed face, cancelling it against `b -> a`
///
/// An edge shared by two removed faces shows up once in each direction and
/// drops out; what remains is the horizon.
fn add_if_unique_edge(edges: &mut Vec<(usize, usize)>, a: usize, b: usize) {
    if let Some(reverse) = edges.iter().position(|&edge| edge == (b, a)) {
        edges.swap_remove(reverse);
    } else {
        edges.push((a, b));
    }
}

/// Map the closest face back onto both bodies
fn contact_from_face(polytope: &[SupportPoint], face: [usize; 3], closest: &FaceNormal) -> CollisionPoint {
    let [pa, pb, pc] = face.map(|i| polytope[i]);
    let depth = closest.distance.max(0.0);
    let projected = closest.normal * depth;

    let weights = Triangle::new(pa.point, pb.point, pc.point)
        .barycentric(&projected)
        .unwrap_or([1.0, 0.0, 0.0]);

    CollisionPoint {
        normal: closest.normal,
        depth,
        point_on_a: pa.on_a * weights[0] + pb.on_a * weights[1] + pc.on_a * weights[2],
        point_on_b: pa.on_b * weights[0] + pb.on_b * weights[1] + pc.on_b * weights[2],
    }
}
