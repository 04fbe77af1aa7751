use crate::unit_tests::fixtures::{square_loop_2d, unit_square_2d};
use matrixcompare::assert_matrix_eq;
use meshfun::assembly::{
    accumulate_numerical_gradient, gradient, map_integrand, numerical_gradient, par_gradient, par_map_integrand,
    par_numerical_gradient, par_total, total, ElementIntegrand, FiniteDifferenceSettings, SymmetryBehavior,
};
use meshfun::element::Element;
use meshfun::error::FunctionalError;
use meshfun::functionals::{Area, Length};
use meshfun::mesh::SimplicialMesh;
use meshfun::proptest::perturbed_unit_square_mesh;
use meshfun::selection::Selection;
use meshfun::Grade;
use nalgebra::{DMatrix, RowDVector};
use proptest::prelude::*;

/// Sum of squared distances of the edge vertices to the origin, failing once any coordinate
/// exceeds a threshold.
struct FragileEdgeIntegrand {
    threshold: f64,
}

impl ElementIntegrand<f64> for FragileEdgeIntegrand {
    fn grade(&self) -> Grade {
        1
    }

    fn evaluate(&self, mesh: &SimplicialMesh<f64>, element: Element<'_>) -> Result<f64, FunctionalError> {
        let mut value = 0.0;
        for &v in element.vertices() {
            let x = mesh.vertex(v);
            if x.iter().any(|&c| c > self.threshold) {
                return Err(FunctionalError::Degenerate {
                    grade: 1,
                    element: element.id(),
                });
            }
            value += x.norm_squared();
        }
        Ok(value)
    }
}

fn fd_settings() -> FiniteDifferenceSettings<f64> {
    FiniteDifferenceSettings { step: 1e-6 }
}

#[test]
fn total_and_map_over_all_elements() {
    let mesh = unit_square_2d();
    assert_eq!(total(&mesh, None, &Area).unwrap(), Some(1.0));
    assert_eq!(map_integrand(&mesh, None, &Area).unwrap(), RowDVector::from_row_slice(&[0.5, 0.5]));
}

#[test]
fn total_is_none_for_empty_grade() {
    let mut mesh = SimplicialMesh::from_vertices(DMatrix::<f64>::zeros(2, 3));
    mesh.add_elements(1, Vec::<[usize; 2]>::new()).unwrap();

    assert_eq!(total(&mesh, None, &Length).unwrap(), None);
    assert_eq!(map_integrand(&mesh, None, &Length).unwrap().len(), 0);
    assert_eq!(
        gradient(&mesh, None, &Length, SymmetryBehavior::Add).unwrap(),
        DMatrix::zeros(2, 3)
    );
    assert_eq!(par_total(&mesh, None, &Length).unwrap(), None);
}

#[test]
fn total_fails_without_relation() {
    let mesh = SimplicialMesh::from_vertices(DMatrix::<f64>::zeros(2, 3));
    assert!(matches!(
        total(&mesh, None, &Length),
        Err(FunctionalError::MissingRelation { from: 1, to: 0 })
    ));
}

#[test]
fn selection_restricts_evaluation() {
    let mesh = square_loop_2d();
    let selection = Selection::new().with_elements(1, [1, 3, 10]);

    assert_eq!(total(&mesh, Some(&selection), &Length).unwrap(), Some(4.0));
    assert_eq!(
        map_integrand(&mesh, Some(&selection), &Length).unwrap(),
        RowDVector::from_row_slice(&[0.0, 2.0, 0.0, 2.0])
    );

    let g = gradient(&mesh, Some(&selection), &Length, SymmetryBehavior::None).unwrap();
    // Edge 1 runs from (1, -1) to (1, 1), edge 3 from (-1, 1) to (-1, -1)
    #[rustfmt::skip]
    let expected = DMatrix::from_column_slice(2, 4, &[
        0.0, -1.0,
        0.0, -1.0,
        0.0,  1.0,
        0.0,  1.0,
    ]);
    assert_matrix_eq!(g, expected, comp = abs, tol = 1e-14);
}

#[test]
fn images_are_skipped_in_totals_but_not_in_gradients() {
    let mut mesh = square_loop_2d();
    mesh.identify(1, 0, 2).unwrap();

    assert_eq!(total(&mesh, None, &Length).unwrap(), Some(6.0));
    assert_eq!(
        map_integrand(&mesh, None, &Length).unwrap(),
        RowDVector::from_row_slice(&[2.0, 2.0, 0.0, 2.0])
    );

    // Parallel modes test image membership by search rather than by a cursor
    assert_eq!(par_total(&mesh, None, &Length).unwrap(), Some(6.0));
    let parallel_values = par_map_integrand(&mesh, None, &Length).unwrap();
    assert_eq!(parallel_values, map_integrand(&mesh, None, &Length).unwrap());
    assert_eq!(parallel_values[2], 0.0);

    let with_images = gradient(&mesh, None, &Length, SymmetryBehavior::None).unwrap();
    let without_identification = gradient(&square_loop_2d(), None, &Length, SymmetryBehavior::None).unwrap();
    assert_matrix_eq!(with_images, without_identification, comp = abs, tol = 1e-14);
    let parallel_with_images = par_gradient(&mesh, None, &Length, SymmetryBehavior::None).unwrap();
    assert_matrix_eq!(parallel_with_images, without_identification, comp = abs, tol = 1e-14);
}

#[test]
fn parallel_modes_skip_several_images() {
    let mut mesh = square_loop_2d();
    mesh.identify(1, 2, 3).unwrap();
    mesh.identify(1, 0, 1).unwrap();
    mesh.identify(1, 2, 1).unwrap();

    assert_eq!(total(&mesh, None, &Length).unwrap(), Some(4.0));
    assert_eq!(par_total(&mesh, None, &Length).unwrap(), Some(4.0));
    let expected = RowDVector::from_row_slice(&[2.0, 0.0, 2.0, 0.0]);
    assert_eq!(map_integrand(&mesh, None, &Length).unwrap(), expected);
    assert_eq!(par_map_integrand(&mesh, None, &Length).unwrap(), expected);

    // Images that are not selected stay zero, selected images are still skipped
    let selection = Selection::new().with_elements(1, [1, 2]);
    assert_eq!(par_total(&mesh, Some(&selection), &Length).unwrap(), Some(2.0));
    assert_eq!(
        par_map_integrand(&mesh, Some(&selection), &Length).unwrap(),
        RowDVector::from_row_slice(&[0.0, 0.0, 2.0, 0.0])
    );
}

#[test]
fn gradient_folds_forces_of_identified_vertices() {
    // Two disjoint edges, where the end of the first is identified with the start of the second
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(2, 4, &[
        0.0, 0.0,
        1.0, 0.0,
        5.0, 2.0,
        5.0, 0.0,
    ]);
    let mut mesh = SimplicialMesh::from_vertices_and_elements(vertices, 1, [[0, 1], [2, 3]]).unwrap();
    mesh.identify(0, 1, 2).unwrap();

    let unfolded = gradient(&mesh, None, &Length, SymmetryBehavior::None).unwrap();
    #[rustfmt::skip]
    let expected_unfolded = DMatrix::from_column_slice(2, 4, &[
        -1.0,  0.0,
         1.0,  0.0,
         0.0,  1.0,
         0.0, -1.0,
    ]);
    assert_matrix_eq!(unfolded, expected_unfolded, comp = abs, tol = 1e-14);

    let folded = gradient(&mesh, None, &Length, SymmetryBehavior::Add).unwrap();
    #[rustfmt::skip]
    let expected_folded = DMatrix::from_column_slice(2, 4, &[
        -1.0,  0.0,
         1.0,  1.0,
         1.0,  1.0,
         0.0, -1.0,
    ]);
    assert_matrix_eq!(folded, expected_folded, comp = abs, tol = 1e-14);

    let mut mesh_copy = mesh.clone();
    let numerical = numerical_gradient(&mut mesh_copy, None, &Length, SymmetryBehavior::Add, &fd_settings()).unwrap();
    assert_matrix_eq!(numerical, expected_folded, comp = abs, tol = 1e-6);
}

#[test]
fn integrand_failure_aborts_evaluation() {
    let mesh = square_loop_2d();
    let integrand = FragileEdgeIntegrand { threshold: 0.5 };
    assert!(matches!(
        total(&mesh, None, &integrand),
        Err(FunctionalError::Degenerate { grade: 1, .. })
    ));
    assert!(map_integrand(&mesh, None, &integrand).is_err());
    assert!(par_total(&mesh, None, &integrand).is_err());
    assert!(par_map_integrand(&mesh, None, &integrand).is_err());
}

#[test]
fn numerical_gradient_restores_mesh() {
    let mut mesh = square_loop_2d();
    let original = mesh.clone();

    let integrand = FragileEdgeIntegrand { threshold: 10.0 };
    let g = numerical_gradient(&mut mesh, None, &integrand, SymmetryBehavior::None, &fd_settings()).unwrap();
    assert_eq!(mesh, original);

    // Every vertex belongs to two edges, so the gradient is 2 * 2x
    let expected = original.vertices() * 4.0;
    assert_matrix_eq!(g, expected, comp = abs, tol = 1e-6);
}

#[test]
fn numerical_gradient_restores_mesh_on_failure() {
    // Vertex coordinates reach 1.0, so a perturbation beyond the threshold of 1.0 fails
    let mut mesh = square_loop_2d();
    let original = mesh.clone();
    let integrand = FragileEdgeIntegrand { threshold: 1.0 };

    // The unperturbed integrand is fine
    assert!(total(&mesh, None, &integrand).is_ok());

    let result = numerical_gradient(&mut mesh, None, &integrand, SymmetryBehavior::None, &fd_settings());
    assert!(matches!(result, Err(FunctionalError::Degenerate { .. })));
    assert_eq!(mesh, original);

    let result = par_numerical_gradient(&mesh, None, &integrand, SymmetryBehavior::None, &fd_settings());
    assert!(result.is_err());
}

#[test]
fn accumulate_numerical_gradient_only_touches_element_vertices() {
    let mut mesh = square_loop_2d();
    let mut g = DMatrix::repeat(2, 4, 1.0);
    accumulate_numerical_gradient(&mut mesh, 0, &[0, 1], &Length, 1e-6, &mut g).unwrap();

    // Edge 0 runs from (-1, -1) to (1, -1)
    #[rustfmt::skip]
    let expected = DMatrix::from_column_slice(2, 4, &[
        0.0, 1.0,
        2.0, 1.0,
        1.0, 1.0,
        1.0, 1.0,
    ]);
    assert_matrix_eq!(g, expected, comp = abs, tol = 1e-6);
    assert_eq!(mesh, square_loop_2d());
}

proptest! {
    #[test]
    fn analytic_area_gradient_matches_finite_differences(mesh in perturbed_unit_square_mesh(4)) {
        let analytic = gradient(&mesh, None, &Area, SymmetryBehavior::None).unwrap();
        let mut mesh = mesh;
        let numerical = numerical_gradient(&mut mesh, None, &Area, SymmetryBehavior::None, &fd_settings()).unwrap();
        assert_matrix_eq!(analytic, numerical, comp = abs, tol = 1e-6);
    }

    #[test]
    fn parallel_evaluation_matches_serial(mesh in perturbed_unit_square_mesh(6)) {
        let serial_total = total(&mesh, None, &Area).unwrap().unwrap();
        let parallel_total = par_total(&mesh, None, &Area).unwrap().unwrap();
        prop_assert!((serial_total - parallel_total).abs() <= 1e-14);
        // The perturbation leaves the boundary, and hence the total area, unchanged
        prop_assert!((serial_total - 1.0).abs() <= 1e-12);

        // Elements are evaluated identically in both versions
        prop_assert_eq!(map_integrand(&mesh, None, &Length).unwrap(), par_map_integrand(&mesh, None, &Length).unwrap());

        let serial_gradient = gradient(&mesh, None, &Length, SymmetryBehavior::Add).unwrap();
        let parallel_gradient = par_gradient(&mesh, None, &Length, SymmetryBehavior::Add).unwrap();
        assert_matrix_eq!(serial_gradient, parallel_gradient, comp = abs, tol = 1e-12);

        let parallel_numerical = par_numerical_gradient(&mesh, None, &Area, SymmetryBehavior::None, &fd_settings()).unwrap();
        let mut mesh = mesh;
        let serial_numerical = numerical_gradient(&mut mesh, None, &Area, SymmetryBehavior::None, &fd_settings()).unwrap();
        assert_matrix_eq!(serial_numerical, parallel_numerical, comp = abs, tol = 1e-12);
    }

    #[test]
    fn totals_are_additive_over_partitions(
        mesh in perturbed_unit_square_mesh(4),
        mask in proptest::collection::vec(any::<bool>(), 32)
    ) {
        let num_triangles = mesh.num_elements(2).unwrap();
        let (subset, complement): (Vec<usize>, Vec<usize>) =
            (0..num_triangles).partition(|&i| mask[i % mask.len()]);
        prop_assume!(!subset.is_empty() && !complement.is_empty());

        let subset = Selection::new().with_elements(2, subset);
        let complement = Selection::new().with_elements(2, complement);
        let full = total(&mesh, None, &Area).unwrap().unwrap();
        let parts = total(&mesh, Some(&subset), &Area).unwrap().unwrap()
            + total(&mesh, Some(&complement), &Area).unwrap().unwrap();
        prop_assert!((full - parts).abs() <= 1e-14);
    }
}
