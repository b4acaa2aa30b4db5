//! Potential integrals of Laplace kernels over flat triangles.
//!
//! The far-field path maps a triangle rule onto the element. The
//! near-field path cancels the `1 / r` singularity analytically: the
//! element is fanned into signed wedges apexed at the in-plane projection
//! of the observer, the radial part of each wedge integral has a closed
//! form, and only a smooth one-dimensional integral over the opposite edge
//! is left for Gauss quadrature. The same decomposition is exact for the
//! observer on a vertex, an edge, the interior, or hovering just off the
//! element plane.

use crate::geometry::{cross, distance, dot, norm, sub, Point3, Triangle};
use crate::kernel;
use crate::quadrature::simplex_rules::{interval_rule, triangle_rule};
use crate::quadrature::types::{IntervalRule, QuadratureError, TriangleRule};

/// Default distance-to-diameter ratio below which the singular integration
/// path is used.
///
/// An observer closer to the element centroid than this multiple of the
/// element diameter is treated as near-singular. The value trades the cost
/// of the wedge decomposition against the accuracy loss of plain
/// quadrature close to the element; 2.0 keeps every observer inside or on
/// an element safely on the singular path.
pub const DEFAULT_NEAR_FIELD_RATIO: f64 = 2.0;

// Wedges with signed double area below this fraction of diameter^2 carry
// no area and are dropped from the fan.
const WEDGE_TOLERANCE: f64 = 1e-12;

// Observer heights below this fraction of the diameter count as lying in
// the element plane, where the double layer principal value vanishes.
const PLANE_TOLERANCE: f64 = 1e-12;

/// Errors from evaluating a single potential integral.
#[derive(thiserror::Error, Debug)]
pub enum IntegralError {
    /// The requested quadrature order has no rule.
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
    /// The source triangle has (numerically) zero area.
    #[error("source triangle is degenerate (area {area:.3e})")]
    DegenerateElement {
        /// The area of the offending triangle.
        area: f64,
    },
    /// The observer point has a non-finite coordinate.
    #[error("observer coordinates are not finite")]
    InvalidObserver,
}

/// Options controlling the integration path selection.
#[derive(Clone, Copy, Debug)]
pub struct IntegralOptions {
    /// Distance-to-diameter ratio separating the regular and singular
    /// paths.
    pub near_field_ratio: f64,
}

impl Default for IntegralOptions {
    fn default() -> Self {
        Self {
            near_field_ratio: DEFAULT_NEAR_FIELD_RATIO,
        }
    }
}

/// The surface integral of a Laplace kernel over one source triangle, for
/// one observer point.
///
/// The integral is finite for any observer position, including observers
/// on a vertex, an edge or the interior of the element.
pub struct PotentialIntegral {
    observer: Point3,
    triangle: Triangle,
    options: IntegralOptions,
}

impl PotentialIntegral {
    /// Create an integral for the given observer and source triangle with
    /// default options.
    pub fn new(observer: Point3, triangle: Triangle) -> Result<Self, IntegralError> {
        Self::with_options(observer, triangle, IntegralOptions::default())
    }

    /// Create an integral with explicit options.
    pub fn with_options(
        observer: Point3,
        triangle: Triangle,
        options: IntegralOptions,
    ) -> Result<Self, IntegralError> {
        if !observer.iter().all(|x| x.is_finite()) {
            return Err(IntegralError::InvalidObserver);
        }
        if !triangle.is_finite() || triangle.is_degenerate() {
            return Err(IntegralError::DegenerateElement {
                area: triangle.area(),
            });
        }
        Ok(Self {
            observer,
            triangle,
            options,
        })
    }

    /// Whether the observer is close enough to route through the singular
    /// path.
    pub fn is_near(&self) -> bool {
        distance(&self.observer, &self.triangle.centroid())
            < self.options.near_field_ratio * self.triangle.diameter()
    }

    /// Integrate the single layer kernel `1 / |x - y|` over the triangle.
    ///
    /// `order` selects the triangle rule on the regular path and the
    /// number of Gauss points of the edge integral on the singular path;
    /// on both paths the error decreases as `order` increases.
    pub fn single_layer(&self, order: usize) -> Result<f64, IntegralError> {
        if self.is_near() {
            let rule = interval_rule(order)?;
            Ok(single_layer_singular(&self.observer, &self.triangle, &rule))
        } else {
            let rule = triangle_rule(order)?;
            Ok(single_layer_regular(&self.observer, &self.triangle, &rule))
        }
    }

    /// Integrate the double layer kernel `d/dn_y (1 / |x - y|)` over the
    /// triangle.
    ///
    /// For an observer in the element plane this is the (vanishing)
    /// principal value; just off the plane it is the exact near-field
    /// value including the solid-angle jump term.
    pub fn double_layer(&self, order: usize) -> Result<f64, IntegralError> {
        if self.is_near() {
            let rule = interval_rule(order)?;
            Ok(double_layer_singular(&self.observer, &self.triangle, &rule))
        } else {
            let rule = triangle_rule(order)?;
            Ok(double_layer_regular(&self.observer, &self.triangle, &rule))
        }
    }
}

/// One wedge of the fan decomposition: the sub-triangle spanned by the
/// projected observer and one element edge.
struct Wedge {
    e1: Point3,
    e2: Point3,
    signed_double_area: f64,
}

/// Fan the triangle into signed wedges apexed at `apex`.
///
/// The signed double areas sum to twice the triangle area regardless of
/// where the apex lies in the element plane; wedges on the far side of an
/// edge enter with negative sign and cancel the area swept outside the
/// element.
fn wedge_fan(apex: &Point3, triangle: &Triangle, normal: &Point3) -> [Wedge; 3] {
    let verts = triangle.vertices();
    [0usize, 1, 2].map(|k| {
        let e1 = sub(&verts[k], apex);
        let e2 = sub(&verts[(k + 1) % 3], apex);
        Wedge {
            e1,
            e2,
            signed_double_area: dot(&cross(&e1, &e2), normal),
        }
    })
}

// Closed-form radial integral of rho / sqrt(h^2 + rho^2 l2) over [0, 1].
fn radial_single(h: f64, l2: f64) -> f64 {
    ((h * h + l2).sqrt() - h.abs()) / l2
}

// Closed-form radial integral of rho h / (h^2 + rho^2 l2)^(3/2) over [0, 1].
fn radial_double(h: f64, l2: f64) -> f64 {
    (h / l2) * (1.0 / h.abs() - 1.0 / (h * h + l2).sqrt())
}

fn observer_height(observer: &Point3, triangle: &Triangle, normal: &Point3) -> (f64, Point3) {
    let h = dot(&sub(observer, &triangle.a), normal);
    let proj = [
        observer[0] - h * normal[0],
        observer[1] - h * normal[1],
        observer[2] - h * normal[2],
    ];
    (h, proj)
}

/// Singular-path single layer integral.
pub(crate) fn single_layer_singular(
    observer: &Point3,
    triangle: &Triangle,
    rule: &IntervalRule,
) -> f64 {
    let normal = triangle.unit_normal();
    let (h, proj) = observer_height(observer, triangle, &normal);
    let d = triangle.diameter();

    let mut result = 0.0;
    for wedge in wedge_fan(&proj, triangle, &normal) {
        if wedge.signed_double_area.abs() <= WEDGE_TOLERANCE * d * d {
            continue;
        }
        let mut edge_integral = 0.0;
        for (t, w) in rule.points.iter().zip(&rule.weights) {
            let chord = [
                (1.0 - t) * wedge.e1[0] + t * wedge.e2[0],
                (1.0 - t) * wedge.e1[1] + t * wedge.e2[1],
                (1.0 - t) * wedge.e1[2] + t * wedge.e2[2],
            ];
            edge_integral += w * radial_single(h, dot(&chord, &chord));
        }
        result += wedge.signed_double_area * edge_integral;
    }
    result
}

/// Singular-path double layer integral.
pub(crate) fn double_layer_singular(
    observer: &Point3,
    triangle: &Triangle,
    rule: &IntervalRule,
) -> f64 {
    let normal = triangle.unit_normal();
    let (h, proj) = observer_height(observer, triangle, &normal);
    let d = triangle.diameter();

    // Observer in the element plane: the flat-element principal value is
    // exactly zero.
    if h.abs() <= PLANE_TOLERANCE * d {
        return 0.0;
    }

    let mut result = 0.0;
    for wedge in wedge_fan(&proj, triangle, &normal) {
        if wedge.signed_double_area.abs() <= WEDGE_TOLERANCE * d * d {
            continue;
        }
        let mut edge_integral = 0.0;
        for (t, w) in rule.points.iter().zip(&rule.weights) {
            let chord = [
                (1.0 - t) * wedge.e1[0] + t * wedge.e2[0],
                (1.0 - t) * wedge.e1[1] + t * wedge.e2[1],
                (1.0 - t) * wedge.e1[2] + t * wedge.e2[2],
            ];
            edge_integral += w * radial_double(h, dot(&chord, &chord));
        }
        result += wedge.signed_double_area * edge_integral;
    }
    result
}

/// Regular-path single layer integral.
pub(crate) fn single_layer_regular(
    observer: &Point3,
    triangle: &Triangle,
    rule: &TriangleRule,
) -> f64 {
    let jacobian = norm(&triangle.double_area_vector());
    let ab = sub(&triangle.b, &triangle.a);
    let ac = sub(&triangle.c, &triangle.a);

    let mut result = 0.0;
    for i in 0..rule.npoints {
        let u = rule.points[2 * i];
        let v = rule.points[2 * i + 1];
        let y = [
            triangle.a[0] + u * ab[0] + v * ac[0],
            triangle.a[1] + u * ab[1] + v * ac[1],
            triangle.a[2] + u * ab[2] + v * ac[2],
        ];
        // The dispatch keeps coincident points on the singular path; a
        // non-finite value here is caught by the assembler's output check.
        let value = kernel::single_layer(observer, &y).unwrap_or(f64::INFINITY);
        result += rule.weights[i] * jacobian * value;
    }
    result
}

/// Regular-path double layer integral.
pub(crate) fn double_layer_regular(
    observer: &Point3,
    triangle: &Triangle,
    rule: &TriangleRule,
) -> f64 {
    let jacobian = norm(&triangle.double_area_vector());
    let normal = triangle.unit_normal();
    let ab = sub(&triangle.b, &triangle.a);
    let ac = sub(&triangle.c, &triangle.a);

    let mut result = 0.0;
    for i in 0..rule.npoints {
        let u = rule.points[2 * i];
        let v = rule.points[2 * i + 1];
        let y = [
            triangle.a[0] + u * ab[0] + v * ac[0],
            triangle.a[1] + u * ab[1] + v * ac[1],
            triangle.a[2] + u * ab[2] + v * ac[2],
        ];
        let value = kernel::double_layer(observer, &y, &normal).unwrap_or(f64::INFINITY);
        result += rule.weights[i] * jacobian * value;
    }
    result
}
