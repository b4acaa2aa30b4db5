//! Dense assembly of boundary operators.
//!
//! For a mesh of `n` triangles the assembler produces `n x n` influence
//! matrices whose entry `[i, j]` is the potential integral of the kernel
//! over triangle `j`, observed from the centroid of triangle `i`. Entries
//! are independent, so row blocks are processed in parallel and each cell
//! of the pre-sized output is written exactly once.
//!
//! Matrices use rlst's column-major layout: entry `(i, j)` of an `n x n`
//! operator sits at `data()[i + n * j]`.

use crate::assembly::common::RawData2D;
use crate::assembly::integrals::{
    double_layer_regular, double_layer_singular, single_layer_regular, single_layer_singular,
    DEFAULT_NEAR_FIELD_RATIO,
};
use crate::geometry::{distance, Point3, TriangleMesh};
use crate::kernel::KernelType;
use crate::quadrature::simplex_rules::{interval_rule, triangle_rule};
use crate::quadrature::types::{IntervalRule, QuadratureError, TriangleRule};
use rayon::prelude::*;
use rlst::{rlst_dynamic_array2, DynamicArray, RawAccess, RawAccessMut};

// Elements with a larger aspect ratio than this are flagged once during
// validation; near the regular/singular threshold their integrals lose
// accuracy without becoming wrong.
const ASPECT_RATIO_WARNING: f64 = 25.0;

/// Assembly error
#[derive(thiserror::Error, Debug)]
pub enum AssemblyError {
    /// A requested quadrature order has no rule.
    #[error(transparent)]
    Quadrature(#[from] QuadratureError),
    /// A mesh triangle has (numerically) zero area.
    #[error("element {element} is degenerate (area {area:.3e})")]
    DegenerateElement {
        /// Index of the offending triangle.
        element: usize,
        /// Its area.
        area: f64,
    },
    /// A mesh triangle has a non-finite vertex, so its collocation point
    /// is not a valid observer.
    #[error("collocation point of element {element} is not finite")]
    InvalidObserver {
        /// Index of the offending triangle.
        element: usize,
    },
    /// An assembled entry came out as NaN or infinite.
    #[error("assembly produced a non-finite entry at ({row}, {col})")]
    NonFiniteEntry {
        /// Observer (row) index of the entry.
        row: usize,
        /// Source (column) index of the entry.
        col: usize,
    },
}

/// Options for a dense assembler
#[derive(Clone, Debug)]
pub struct AssemblerOptions {
    /// Triangle rule order for well-separated pairs.
    quadrature_order: usize,
    /// Gauss point count for the singular edge integrals.
    singular_quadrature_order: usize,
    /// Distance-to-diameter ratio separating the two paths.
    near_field_ratio: f64,
    /// Number of observer rows per parallel batch.
    batch_size: usize,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            quadrature_order: 4,
            singular_quadrature_order: 8,
            near_field_ratio: DEFAULT_NEAR_FIELD_RATIO,
            batch_size: 128,
        }
    }
}

impl AssemblerOptions {
    /// Set the triangle rule order used for well-separated pairs.
    pub fn set_regular_quadrature_order(&mut self, order: usize) {
        self.quadrature_order = order;
    }

    /// Set the number of Gauss points used by the singular path.
    pub fn set_singular_quadrature_order(&mut self, order: usize) {
        self.singular_quadrature_order = order;
    }

    /// Set the distance-to-diameter ratio below which a pair routes
    /// through the singular path.
    pub fn set_near_field_ratio(&mut self, ratio: f64) {
        self.near_field_ratio = ratio;
    }

    /// Set the number of observer rows per parallel batch.
    pub fn set_batch_size(&mut self, size: usize) {
        self.batch_size = size;
    }
}

/// The operator pair produced by a combined assembly pass.
pub struct AssembledOperators {
    /// The single layer matrix G.
    pub single_layer: DynamicArray<f64, 2>,
    /// The double layer matrix H.
    pub double_layer: DynamicArray<f64, 2>,
}

/// Dense assembler for Laplace boundary operators
///
/// Assembles operators by processing batches of observer rows in parallel.
pub struct LaplaceAssembler {
    options: AssemblerOptions,
}

impl Default for LaplaceAssembler {
    fn default() -> Self {
        Self::new(AssemblerOptions::default())
    }
}

impl LaplaceAssembler {
    /// Create a new assembler with the given options.
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    /// Assemble the single layer operator matrix.
    pub fn assemble_single_layer(
        &self,
        mesh: &TriangleMesh,
    ) -> Result<DynamicArray<f64, 2>, AssemblyError> {
        self.assemble_operator(KernelType::SingleLayer, mesh)
    }

    /// Assemble the double layer operator matrix.
    pub fn assemble_double_layer(
        &self,
        mesh: &TriangleMesh,
    ) -> Result<DynamicArray<f64, 2>, AssemblyError> {
        self.assemble_operator(KernelType::DoubleLayer, mesh)
    }

    /// Assemble the matrix of the selected operator.
    ///
    /// Fails without returning a matrix if the mesh contains a degenerate
    /// or non-finite element, or if any assembled entry is non-finite.
    pub fn assemble_operator(
        &self,
        kernel_type: KernelType,
        mesh: &TriangleMesh,
    ) -> Result<DynamicArray<f64, 2>, AssemblyError> {
        self.validate(mesh)?;
        let n = mesh.ncells();
        let regular = triangle_rule(self.options.quadrature_order)?;
        let singular = interval_rule(self.options.singular_quadrature_order)?;

        let mut output = rlst_dynamic_array2!(f64, [n, n]);
        {
            let raw = RawData2D {
                data: output.data_mut().as_mut_ptr(),
                shape: [n, n],
            };

            self.row_blocks(n).into_par_iter().for_each(|rows| {
                // Capture the whole `RawData2D` (which is `Sync`) rather than
                // letting disjoint closure capture grab the bare `*mut f64`.
                let raw = &raw;
                for i in rows {
                    let observer = *mesh.centroid(i);
                    for j in 0..n {
                        let value = self.entry(kernel_type, mesh, &observer, j, &regular, &singular);
                        unsafe {
                            *raw.data.add(i + raw.shape[0] * j) = value;
                        }
                    }
                }
            });
        }

        check_finite(&output, n)?;
        Ok(output)
    }

    /// Assemble the single and double layer operators in one pass over the
    /// element pairs.
    pub fn assemble_both(&self, mesh: &TriangleMesh) -> Result<AssembledOperators, AssemblyError> {
        self.validate(mesh)?;
        let n = mesh.ncells();
        let regular = triangle_rule(self.options.quadrature_order)?;
        let singular = interval_rule(self.options.singular_quadrature_order)?;

        let mut single = rlst_dynamic_array2!(f64, [n, n]);
        let mut double = rlst_dynamic_array2!(f64, [n, n]);
        {
            let raw_single = RawData2D {
                data: single.data_mut().as_mut_ptr(),
                shape: [n, n],
            };
            let raw_double = RawData2D {
                data: double.data_mut().as_mut_ptr(),
                shape: [n, n],
            };

            self.row_blocks(n).into_par_iter().for_each(|rows| {
                // Capture the whole `RawData2D`s (which are `Sync`) rather than
                // letting disjoint closure capture grab the bare `*mut f64`s.
                let raw_single = &raw_single;
                let raw_double = &raw_double;
                for i in rows {
                    let observer = *mesh.centroid(i);
                    for j in 0..n {
                        let (g, h) = self.entry_pair(mesh, &observer, j, &regular, &singular);
                        unsafe {
                            *raw_single.data.add(i + raw_single.shape[0] * j) = g;
                            *raw_double.data.add(i + raw_double.shape[0] * j) = h;
                        }
                    }
                }
            });
        }

        check_finite(&single, n)?;
        check_finite(&double, n)?;
        Ok(AssembledOperators {
            single_layer: single,
            double_layer: double,
        })
    }

    fn validate(&self, mesh: &TriangleMesh) -> Result<(), AssemblyError> {
        for (element, triangle) in mesh.triangles().iter().enumerate() {
            if !triangle.is_finite() {
                return Err(AssemblyError::InvalidObserver { element });
            }
            if triangle.is_degenerate() {
                return Err(AssemblyError::DegenerateElement {
                    element,
                    area: triangle.area(),
                });
            }
            if triangle.aspect_ratio() > ASPECT_RATIO_WARNING {
                log::warn!(
                    "element {} has aspect ratio {:.1}; integrals near the regular/singular threshold lose accuracy",
                    element,
                    triangle.aspect_ratio()
                );
            }
        }
        Ok(())
    }

    fn row_blocks(&self, n: usize) -> Vec<Vec<usize>> {
        let batch_size = self.options.batch_size.max(1);
        (0..n)
            .collect::<Vec<_>>()
            .chunks(batch_size)
            .map(|c| c.to_vec())
            .collect()
    }

    fn is_near(&self, mesh: &TriangleMesh, observer: &Point3, j: usize) -> bool {
        distance(observer, mesh.centroid(j)) < self.options.near_field_ratio * mesh.diameter(j)
    }

    fn entry(
        &self,
        kernel_type: KernelType,
        mesh: &TriangleMesh,
        observer: &Point3,
        j: usize,
        regular: &TriangleRule,
        singular: &IntervalRule,
    ) -> f64 {
        let triangle = mesh.triangle(j);
        match (kernel_type, self.is_near(mesh, observer, j)) {
            (KernelType::SingleLayer, true) => single_layer_singular(observer, triangle, singular),
            (KernelType::SingleLayer, false) => single_layer_regular(observer, triangle, regular),
            (KernelType::DoubleLayer, true) => double_layer_singular(observer, triangle, singular),
            (KernelType::DoubleLayer, false) => double_layer_regular(observer, triangle, regular),
        }
    }

    fn entry_pair(
        &self,
        mesh: &TriangleMesh,
        observer: &Point3,
        j: usize,
        regular: &TriangleRule,
        singular: &IntervalRule,
    ) -> (f64, f64) {
        let triangle = mesh.triangle(j);
        if self.is_near(mesh, observer, j) {
            (
                single_layer_singular(observer, triangle, singular),
                double_layer_singular(observer, triangle, singular),
            )
        } else {
            (
                single_layer_regular(observer, triangle, regular),
                double_layer_regular(observer, triangle, regular),
            )
        }
    }
}

fn check_finite(matrix: &DynamicArray<f64, 2>, n: usize) -> Result<(), AssemblyError> {
    if let Some(pos) = matrix.data().iter().position(|x| !x.is_finite()) {
        return Err(AssemblyError::NonFiniteEntry {
            row: pos % n,
            col: pos / n,
        });
    }
    Ok(())
}
