//! Integration tests for dense operator assembly on closed surfaces.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rlst::{RawAccess, Shape};
use std::f64::consts::PI;
use tribem::assembly::{AssemblerOptions, AssemblyError, LaplaceAssembler, PotentialIntegral};
use tribem::geometry::{Triangle, TriangleMesh};
use tribem::shapes::regular_sphere;

fn sphere_assembler() -> LaplaceAssembler {
    let mut options = AssemblerOptions::default();
    options.set_regular_quadrature_order(5);
    options.set_singular_quadrature_order(12);
    LaplaceAssembler::new(options)
}

#[test]
fn test_matrices_are_square_and_finite() {
    let mesh = regular_sphere(2);
    let n = mesh.ncells();
    let operators = sphere_assembler().assemble_both(&mesh).unwrap();

    assert_eq!(operators.single_layer.shape(), [n, n]);
    assert_eq!(operators.double_layer.shape(), [n, n]);
    assert!(operators
        .single_layer
        .data()
        .iter()
        .all(|x| x.is_finite()));
    assert!(operators
        .double_layer
        .data()
        .iter()
        .all(|x| x.is_finite()));
    // The single layer kernel is positive, so every entry is.
    assert!(operators.single_layer.data().iter().all(|x| *x > 0.0));
}

#[test]
fn test_double_layer_row_sums_give_boundary_solid_angle() {
    // For a collocation point on a closed polyhedral surface the double
    // layer kernel integrates to minus the half-space solid angle: every
    // row of H sums to -2 pi, up to quadrature error on far pairs.
    let mesh = regular_sphere(2);
    let n = mesh.ncells();
    let mut options = AssemblerOptions::default();
    options.set_regular_quadrature_order(5);
    options.set_singular_quadrature_order(12);
    let matrix = tribem::laplace::assembler::double_layer(&mesh, &options).unwrap();
    let data = matrix.data();

    for i in 0..n {
        let row_sum: f64 = (0..n).map(|j| data[i + n * j]).sum();
        assert_relative_eq!(row_sum, -2.0 * PI, max_relative = 1e-3);
    }
}

#[test]
fn test_reassembly_is_bitwise_identical() {
    let mesh = regular_sphere(1);
    let assembler = sphere_assembler();
    let first = assembler.assemble_both(&mesh).unwrap();
    let second = assembler.assemble_both(&mesh).unwrap();
    assert_eq!(first.single_layer.data(), second.single_layer.data());
    assert_eq!(first.double_layer.data(), second.double_layer.data());
}

#[test]
fn test_degenerate_element_aborts_assembly() {
    let mut triangles = regular_sphere(1).triangles().to_vec();
    let bad_index = triangles.len();
    triangles.push(Triangle::new(
        [0.0, 0.0, 2.0],
        [1.0, 0.0, 2.0],
        [2.0, 0.0, 2.0],
    ));
    let mesh = TriangleMesh::new(triangles);

    let result = sphere_assembler().assemble_single_layer(&mesh);
    match result {
        Err(AssemblyError::DegenerateElement { element, .. }) => {
            assert_eq!(element, bad_index);
        }
        other => panic!("expected DegenerateElement, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_far_observers_match_high_order_reference() {
    // Randomly placed distant observers exercise the regular path; a
    // moderate order must already match the highest tabulated rule.
    let triangle = Triangle::new([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
    let mut rng = StdRng::seed_from_u64(7);
    let mut tested = 0;
    while tested < 50 {
        let direction = [
            rng.gen_range(-1.0..1.0_f64),
            rng.gen_range(-1.0..1.0_f64),
            rng.gen_range(-1.0..1.0_f64),
        ];
        let len = direction.iter().map(|x| x * x).sum::<f64>().sqrt();
        if len < 0.1 {
            continue;
        }
        let distance = rng.gen_range(8.0..20.0);
        let observer = [
            direction[0] / len * distance,
            direction[1] / len * distance,
            direction[2] / len * distance,
        ];
        let integral = PotentialIntegral::new(observer, triangle).unwrap();
        assert!(!integral.is_near());
        assert_relative_eq!(
            integral.single_layer(5).unwrap(),
            integral.single_layer(7).unwrap(),
            max_relative = 1e-6
        );
        tested += 1;
    }
}
