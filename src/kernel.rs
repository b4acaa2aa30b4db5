//! Green's function kernels for the Laplace equation.
//!
//! The single layer kernel is `1 / |x - y|` and the double layer kernel is
//! its derivative along the source normal, `n_y . (x - y) / |x - y|^3`.
//! No `1 / (4 pi)` scaling is applied; callers that need the physical
//! Green's function fold the constant into their density.

use crate::geometry::{dot, sub, Point3};

/// Kernel selection for assembled operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KernelType {
    /// The kernel `1 / |x - y|`.
    SingleLayer,
    /// The kernel `d/dn_y (1 / |x - y|)`.
    DoubleLayer,
}

/// Evaluate the single layer kernel `1 / |x - y|`.
///
/// Returns `None` when `x` and `y` coincide. Coincidence is an expected
/// condition handled by the caller's singular integration path, not an
/// error.
pub fn single_layer(x: &Point3, y: &Point3) -> Option<f64> {
    let d = sub(x, y);
    let r2 = dot(&d, &d);
    if r2 == 0.0 {
        None
    } else {
        Some(1.0 / r2.sqrt())
    }
}

/// Evaluate the double layer kernel `n_y . (x - y) / |x - y|^3` for a
/// source point `y` with unit normal `normal_y`.
///
/// Returns `None` when `x` and `y` coincide.
pub fn double_layer(x: &Point3, y: &Point3, normal_y: &Point3) -> Option<f64> {
    let d = sub(x, y);
    let r2 = dot(&d, &d);
    if r2 == 0.0 {
        None
    } else {
        Some(dot(normal_y, &d) / (r2 * r2.sqrt()))
    }
}

/// A kernel bound to a fixed observer point.
///
/// The evaluator is immutable and may be shared freely between threads.
#[derive(Clone, Copy, Debug)]
pub struct KernelEvaluator {
    observer: Point3,
    kernel_type: KernelType,
}

impl KernelEvaluator {
    /// Create an evaluator for the given observer and kernel.
    pub fn new(observer: Point3, kernel_type: KernelType) -> Self {
        Self {
            observer,
            kernel_type,
        }
    }

    /// The observer point.
    pub fn observer(&self) -> &Point3 {
        &self.observer
    }

    /// The kernel this evaluator computes.
    pub fn kernel_type(&self) -> KernelType {
        self.kernel_type
    }

    /// Evaluate the kernel at the source point `y` with unit normal
    /// `normal_y`. The normal is ignored by the single layer kernel.
    ///
    /// Returns `None` when the source coincides with the observer.
    pub fn evaluate(&self, y: &Point3, normal_y: &Point3) -> Option<f64> {
        match self.kernel_type {
            KernelType::SingleLayer => single_layer(&self.observer, y),
            KernelType::DoubleLayer => double_layer(&self.observer, y, normal_y),
        }
    }
}
