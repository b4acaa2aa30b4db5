//! Point-in-solid queries against closed triangulated surfaces.
//!
//! Classification uses a ray-crossing parity test with bounding-volume
//! quick rejection. Points within tolerance of the surface are reported as
//! boundary points before any ray is cast, so queries near the surface do
//! not oscillate between inside and outside. Rays that graze an edge,
//! vertex or coplanar triangle are re-cast along a different direction.

use crate::geometry::{cross, dot, norm, sub, Point3, Triangle, TriangleMesh};

// Fallback ray directions for re-casting after an ambiguous hit. The
// components are irrational-looking on purpose: axis-aligned rays through
// structured meshes hit vertices and edges far too often.
const FALLBACK_DIRECTIONS: [Point3; 4] = [
    [0.5377397, 0.8323219, 0.1344918],
    [-0.2718281, 0.7182818, 0.6420926],
    [0.3141592, -0.6535897, 0.6887944],
    [-0.5772156, -0.4142135, 0.7040404],
];

/// Tri-state result of a containment query.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Containment {
    /// The point lies strictly inside the surface.
    Inside,
    /// The point lies strictly outside the surface.
    Outside,
    /// The point lies on the surface, within tolerance.
    Boundary,
}

enum Crossing {
    Hit,
    Miss,
    Ambiguous,
}

/// Classifies points against a borrowed closed triangulated surface.
///
/// The mesh must be closed and free of self-intersections; the locator
/// precomputes its bounding box, bounding sphere and a tolerance scaled to
/// the mesh extent.
pub struct InsideLocator<'m> {
    mesh: &'m TriangleMesh,
    box_min: Point3,
    box_max: Point3,
    center: Point3,
    radius: f64,
    eps: f64,
}

impl<'m> InsideLocator<'m> {
    /// Create a locator for the given mesh.
    pub fn new(mesh: &'m TriangleMesh) -> Self {
        let (lo, hi) = mesh.bounds();
        let center = [
            0.5 * (lo[0] + hi[0]),
            0.5 * (lo[1] + hi[1]),
            0.5 * (lo[2] + hi[2]),
        ];
        let half_diagonal = [
            0.5 * (hi[0] - lo[0]),
            0.5 * (hi[1] - lo[1]),
            0.5 * (hi[2] - lo[2]),
        ];
        let radius = norm(&half_diagonal);
        let eps = f64::EPSILON.sqrt() * (1.0 + radius);
        Self {
            mesh,
            box_min: lo,
            box_max: hi,
            center,
            radius,
            eps,
        }
    }

    /// Classify a query point as inside, outside or on the surface.
    pub fn locate(&self, point: &Point3) -> Containment {
        // Quick rejection against the bounding volumes.
        if !self.in_box(point) || !self.in_sphere(point) {
            return Containment::Outside;
        }

        // Exact surface proximity wins over the parity test; ties near the
        // surface break toward the boundary.
        for triangle in self.mesh.triangles() {
            if triangle.is_degenerate() {
                continue;
            }
            if point_triangle_distance(point, triangle) <= self.eps {
                return Containment::Boundary;
            }
        }

        // Parity of ray crossings, re-casting on grazing hits.
        let mut count = None;
        let primary = self.direction_to_nearest_face(point);
        for direction in std::iter::once(&primary).chain(FALLBACK_DIRECTIONS.iter()) {
            if let Some(crossings) = self.ray_crossings(point, direction) {
                count = Some(crossings);
                break;
            }
        }

        match count {
            Some(crossings) if crossings % 2 == 1 => Containment::Inside,
            _ => Containment::Outside,
        }
    }

    fn in_box(&self, point: &Point3) -> bool {
        (0..3).all(|k| {
            point[k] >= self.box_min[k] - self.eps && point[k] <= self.box_max[k] + self.eps
        })
    }

    fn in_sphere(&self, point: &Point3) -> bool {
        let d = sub(point, &self.center);
        norm(&d) <= self.radius + self.eps
    }

    // Shoot toward the closest bounding box face: the shortest way out of
    // the surface crosses the fewest triangles.
    fn direction_to_nearest_face(&self, point: &Point3) -> Point3 {
        let mut index = 0;
        let mut sign = 1.0;
        let mut min_distance = f64::MAX;
        for k in 0..3 {
            let hi = self.box_max[k] - point[k];
            let lo = point[k] - self.box_min[k];
            let d = hi.min(lo);
            if d < min_distance {
                index = k;
                sign = if lo < hi { -1.0 } else { 1.0 };
                min_distance = d;
            }
        }
        let mut direction = [self.eps; 3];
        direction[index] = sign;
        direction
    }

    fn ray_crossings(&self, origin: &Point3, direction: &Point3) -> Option<usize> {
        let mut count = 0;
        for triangle in self.mesh.triangles() {
            if triangle.is_degenerate() {
                continue;
            }
            match ray_triangle(origin, direction, triangle) {
                Crossing::Hit => count += 1,
                Crossing::Miss => {}
                Crossing::Ambiguous => return None,
            }
        }
        Some(count)
    }
}

// Barycentric tolerance for deciding that a ray grazes an edge or vertex.
const BARYCENTRIC_EPS: f64 = 1e-10;

fn ray_triangle(origin: &Point3, direction: &Point3, triangle: &Triangle) -> Crossing {
    let e1 = sub(&triangle.b, &triangle.a);
    let e2 = sub(&triangle.c, &triangle.a);
    let p = cross(direction, &e2);
    let det = dot(&e1, &p);
    let scale = norm(direction) * norm(&e1) * norm(&e2);

    if det.abs() <= 1e-12 * scale {
        // Ray parallel to the triangle plane. Decide hit or miss from the
        // plane offset: a clearly offset plane cannot be crossed.
        let normal = cross(&e1, &e2);
        let offset = dot(&sub(origin, &triangle.a), &normal);
        if offset.abs() > BARYCENTRIC_EPS * norm(&normal) {
            return Crossing::Miss;
        }
        return Crossing::Ambiguous;
    }

    let inv_det = 1.0 / det;
    let s = sub(origin, &triangle.a);
    let u = dot(&s, &p) * inv_det;
    if !(-BARYCENTRIC_EPS..=1.0 + BARYCENTRIC_EPS).contains(&u) {
        return Crossing::Miss;
    }

    let q = cross(&s, &e1);
    let v = dot(direction, &q) * inv_det;
    if v < -BARYCENTRIC_EPS || u + v > 1.0 + BARYCENTRIC_EPS {
        return Crossing::Miss;
    }

    let t = dot(&e2, &q) * inv_det;
    if t < -BARYCENTRIC_EPS {
        return Crossing::Miss;
    }

    // Grazing the border of the triangle or starting on its plane cannot
    // be counted reliably; ask for a different ray.
    let near_border = u < BARYCENTRIC_EPS
        || v < BARYCENTRIC_EPS
        || u + v > 1.0 - BARYCENTRIC_EPS
        || t < BARYCENTRIC_EPS;
    if near_border {
        Crossing::Ambiguous
    } else {
        Crossing::Hit
    }
}

fn point_segment_distance(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = sub(b, a);
    let ap = sub(point, a);
    let len2 = dot(&ab, &ab);
    let t = if len2 > 0.0 {
        (dot(&ap, &ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = [a[0] + t * ab[0], a[1] + t * ab[1], a[2] + t * ab[2]];
    norm(&sub(point, &closest))
}

fn point_triangle_distance(point: &Point3, triangle: &Triangle) -> f64 {
    let normal = triangle.unit_normal();
    let h = dot(&sub(point, &triangle.a), &normal);
    let proj = [
        point[0] - h * normal[0],
        point[1] - h * normal[1],
        point[2] - h * normal[2],
    ];

    // Barycentric coordinates of the projection.
    let v0 = sub(&triangle.b, &triangle.a);
    let v1 = sub(&triangle.c, &triangle.a);
    let v2 = sub(&proj, &triangle.a);
    let d00 = dot(&v0, &v0);
    let d01 = dot(&v0, &v1);
    let d11 = dot(&v1, &v1);
    let d20 = dot(&v2, &v0);
    let d21 = dot(&v2, &v1);
    let denom = d00 * d11 - d01 * d01;
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;

    if v >= 0.0 && w >= 0.0 && v + w <= 1.0 {
        h.abs()
    } else {
        let ab = point_segment_distance(point, &triangle.a, &triangle.b);
        let bc = point_segment_distance(point, &triangle.b, &triangle.c);
        let ca = point_segment_distance(point, &triangle.c, &triangle.a);
        ab.min(bc).min(ca)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Unit tetrahedron with outward-oriented faces.
    fn tetrahedron() -> TriangleMesh {
        let o = [0.0, 0.0, 0.0];
        let a = [1.0, 0.0, 0.0];
        let b = [0.0, 1.0, 0.0];
        let c = [0.0, 0.0, 1.0];
        TriangleMesh::new(vec![
            Triangle::new(o, b, a),
            Triangle::new(o, a, c),
            Triangle::new(o, c, b),
            Triangle::new(a, b, c),
        ])
    }

    #[test]
    fn test_interior_point() {
        let mesh = tetrahedron();
        let locator = InsideLocator::new(&mesh);
        assert_eq!(locator.locate(&[0.2, 0.2, 0.2]), Containment::Inside);
    }

    #[test]
    fn test_exterior_points() {
        let mesh = tetrahedron();
        let locator = InsideLocator::new(&mesh);
        assert_eq!(locator.locate(&[2.0, 2.0, 2.0]), Containment::Outside);
        assert_eq!(locator.locate(&[-0.3, 0.1, 0.1]), Containment::Outside);
        // Inside the bounding box but outside the solid.
        assert_eq!(locator.locate(&[0.9, 0.9, 0.9]), Containment::Outside);
    }

    #[test]
    fn test_boundary_points() {
        let mesh = tetrahedron();
        let locator = InsideLocator::new(&mesh);
        // A vertex, an edge midpoint and a face interior point.
        assert_eq!(locator.locate(&[1.0, 0.0, 0.0]), Containment::Boundary);
        assert_eq!(locator.locate(&[0.5, 0.5, 0.0]), Containment::Boundary);
        assert_eq!(locator.locate(&[0.2, 0.2, 0.0]), Containment::Boundary);
    }

    #[test]
    fn test_point_just_off_the_surface() {
        let mesh = tetrahedron();
        let locator = InsideLocator::new(&mesh);
        // Clearly separated from the surface relative to the tolerance.
        assert_eq!(locator.locate(&[0.2, 0.2, 1e-3]), Containment::Inside);
        assert_eq!(locator.locate(&[0.2, 0.2, -1e-3]), Containment::Outside);
    }

    #[test]
    fn test_point_triangle_distance() {
        let t = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        assert!((point_triangle_distance(&[0.2, 0.2, 0.5], &t) - 0.5).abs() < 1e-14);
        assert!((point_triangle_distance(&[2.0, 0.0, 0.0], &t) - 1.0).abs() < 1e-14);
        assert!(point_triangle_distance(&[0.5, 0.5, 0.0], &t) < 1e-14);
    }
}
