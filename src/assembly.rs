//! Boundary operator assembly
pub(crate) mod common;
pub mod dense;
pub mod integrals;

pub use dense::{AssembledOperators, AssemblerOptions, AssemblyError, LaplaceAssembler};
pub use integrals::{IntegralError, IntegralOptions, PotentialIntegral};
