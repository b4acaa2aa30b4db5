//! tribem
//!
//! A collocation boundary element engine for Laplace problems on
//! triangulated closed surfaces. The crate provides quadrature rules on
//! the reference triangle, singularity-cancelling potential integrals of
//! the single and double layer kernels, parallel dense assembly of the
//! resulting influence matrices, and a point-in-solid locator used to
//! orient surface normals. Solving the assembled systems is left to an
//! external dense or iterative solver.
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod assembly;
pub mod geometry;
pub mod kernel;
pub mod laplace;
pub mod locator;
pub mod quadrature;
pub mod shapes;
