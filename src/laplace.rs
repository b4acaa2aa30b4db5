//! Laplace operators

/// Assemblers for Laplace problems.
pub mod assembler {
    use rlst::DynamicArray;

    use crate::{
        assembly::dense::{AssemblerOptions, AssemblyError, LaplaceAssembler},
        geometry::TriangleMesh,
    };

    /// Assemble the Laplace single layer operator.
    pub fn single_layer(
        mesh: &TriangleMesh,
        options: &AssemblerOptions,
    ) -> Result<DynamicArray<f64, 2>, AssemblyError> {
        LaplaceAssembler::new(options.clone()).assemble_single_layer(mesh)
    }

    /// Assemble the Laplace double layer operator.
    pub fn double_layer(
        mesh: &TriangleMesh,
        options: &AssemblerOptions,
    ) -> Result<DynamicArray<f64, 2>, AssemblyError> {
        LaplaceAssembler::new(options.clone()).assemble_double_layer(mesh)
    }
}
