use crate::unit_tests::fixtures::{octahedron, square_loop_2d, unit_square_2d, unit_tetrahedron};
use matrixcompare::assert_matrix_eq;
use meshfun::assembly::{gradient, numerical_gradient, total, ElementGradient, FiniteDifferenceSettings, SymmetryBehavior};
use meshfun::element::Element;
use meshfun::error::FunctionalError;
use meshfun::functionals::{element_size, Area, AreaEnclosed, Functional, Length, Volume, VolumeEnclosed};
use meshfun::mesh::procedural::create_unit_box_uniform_tet_mesh_3d;
use meshfun::mesh::SimplicialMesh;
use meshfun::proptest::simplex_mesh3;
use meshfun::selection::Selection;
use nalgebra::DMatrix;
use proptest::prelude::*;

fn assert_gradient_matches_finite_differences<G>(mesh: &SimplicialMesh<f64>, kernel: &G)
where
    G: ElementGradient<f64>,
{
    let analytic = gradient(mesh, None, kernel, SymmetryBehavior::None).unwrap();
    let mut mesh = mesh.clone();
    let settings = FiniteDifferenceSettings { step: 1e-6 };
    let numerical = numerical_gradient(&mut mesh, None, kernel, SymmetryBehavior::None, &settings).unwrap();
    assert_matrix_eq!(analytic, numerical, comp = abs, tol = 1e-5);
}

#[test]
fn totals_of_simple_shapes() {
    assert_eq!(total(&square_loop_2d(), None, &Length).unwrap(), Some(8.0));
    assert_eq!(total(&square_loop_2d(), None, &AreaEnclosed).unwrap(), Some(4.0));
    assert_eq!(total(&unit_square_2d(), None, &Area).unwrap(), Some(1.0));

    let volume = total(&unit_tetrahedron(), None, &Volume).unwrap().unwrap();
    assert!((volume - 1.0 / 6.0).abs() < 1e-15);

    let enclosed = total(&octahedron(), None, &VolumeEnclosed).unwrap().unwrap();
    assert!((enclosed - 4.0 / 3.0).abs() < 1e-14);

    let area = total(&octahedron(), None, &Area).unwrap().unwrap();
    // Eight equilateral triangles with side length sqrt(2)
    assert!((area - 8.0 * 3.0f64.sqrt() / 2.0).abs() < 1e-13);

    let box_volume = total(&create_unit_box_uniform_tet_mesh_3d::<f64>(3), None, &Volume)
        .unwrap()
        .unwrap();
    assert!((box_volume - 1.0).abs() < 1e-12);
}

#[test]
fn area_gradient_of_right_triangle() {
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(2, 3, &[
        0.0, 0.0,
        1.0, 0.0,
        0.0, 1.0,
    ]);
    let mesh = SimplicialMesh::from_vertices_and_elements(vertices, 2, [[0, 1, 2]]).unwrap();
    let g = gradient(&mesh, None, &Area, SymmetryBehavior::None).unwrap();
    #[rustfmt::skip]
    let expected = DMatrix::from_column_slice(2, 3, &[
        -0.5, -0.5,
         0.5,  0.0,
         0.0,  0.5,
    ]);
    assert_matrix_eq!(g, expected, comp = abs, tol = 1e-15);
}

#[test]
fn enclosed_area_gradient_points_outward() {
    let g = gradient(&square_loop_2d(), None, &AreaEnclosed, SymmetryBehavior::None).unwrap();
    // Each corner is shared by two edges, each pulling it away from the origin by half its position
    let expected = square_loop_2d().vertices().clone();
    assert_matrix_eq!(g, expected, comp = abs, tol = 1e-14);
}

#[test]
fn degenerate_elements_have_no_gradient() {
    let vertices = DMatrix::from_column_slice(3, 3, &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 2.0, 4.0, 6.0]);
    let mut mesh = SimplicialMesh::from_vertices_and_elements(vertices, 2, [[0, 1, 2]]).unwrap();
    mesh.generate_lower_grades().unwrap();

    // Coincident edge vertices have zero length, but no direction
    let first_edge = Selection::new().with_elements(1, [0]);
    assert_eq!(total(&mesh, Some(&first_edge), &Length).unwrap(), Some(0.0));
    assert!(matches!(
        gradient(&mesh, None, &Length, SymmetryBehavior::None),
        Err(FunctionalError::Degenerate { grade: 1, element: 0 })
    ));
    assert!(matches!(
        gradient(&mesh, None, &Area, SymmetryBehavior::None),
        Err(FunctionalError::Degenerate { grade: 2, element: 0 })
    ));
    // All vertices lie on a line through the origin
    assert!(matches!(
        gradient(&mesh, None, &AreaEnclosed, SymmetryBehavior::None),
        Err(FunctionalError::Degenerate { grade: 1, .. })
    ));
}

#[test]
fn cross_product_integrands_require_two_or_three_dimensions() {
    let vertices = DMatrix::from_column_slice(1, 3, &[0.0, 1.0, 3.0]);
    let mesh = SimplicialMesh::from_vertices_and_elements(vertices, 2, [[0, 1, 2]]).unwrap();
    assert!(matches!(
        total(&mesh, None, &Area),
        Err(FunctionalError::UnsupportedDimension(1))
    ));
}

#[test]
fn element_size_dispatches_on_grade() {
    let mesh = unit_tetrahedron();
    let tet = Element::new(0, mesh.element_vertices(3).unwrap().lane(0));
    assert!((element_size(&mesh, 3, tet).unwrap() - 1.0 / 6.0).abs() < 1e-15);
    let triangle = Element::new(0, mesh.element_vertices(2).unwrap().lane(0));
    assert!((element_size(&mesh, 2, triangle).unwrap() - 0.5).abs() < 1e-15);
    let edge = Element::new(0, mesh.element_vertices(1).unwrap().lane(0));
    assert!((element_size(&mesh, 1, edge).unwrap() - 1.0).abs() < 1e-15);
    assert!(matches!(
        element_size(&mesh, 0, Element::new(0, &[0])),
        Err(FunctionalError::InvalidGrade(0))
    ));
}

#[test]
fn functional_dispatches_to_analytic_gradients() {
    let mut mesh = octahedron();
    for functional in [
        Functional::from(Length),
        Functional::from(Area),
        Functional::from(VolumeEnclosed),
    ] {
        assert!(functional.has_analytic_gradient());
        assert_eq!(functional.symmetry(), SymmetryBehavior::Add);
        let expected = match &functional {
            Functional::Length(f) => gradient(&mesh, None, f, SymmetryBehavior::Add).unwrap(),
            Functional::Area(f) => gradient(&mesh, None, f, SymmetryBehavior::Add).unwrap(),
            Functional::VolumeEnclosed(f) => gradient(&mesh, None, f, SymmetryBehavior::Add).unwrap(),
            _ => unreachable!(),
        };
        assert_eq!(functional.gradient(&mut mesh, None).unwrap(), expected);
    }

    let functional = Functional::from(Area);
    let serial = total(&mesh, None, &Area).unwrap().unwrap();
    assert_eq!(functional.total(&mesh, None).unwrap(), Some(serial));
    let parallel = functional.par_total(&mesh, None).unwrap().unwrap();
    assert!((parallel - serial).abs() < 1e-14);
}

proptest! {
    #[test]
    fn length_gradient_matches_finite_differences(mesh in simplex_mesh3(1)) {
        assert_gradient_matches_finite_differences(&mesh, &Length);
    }

    #[test]
    fn area_gradient_matches_finite_differences(mesh in simplex_mesh3(2)) {
        assert_gradient_matches_finite_differences(&mesh, &Area);
    }

    #[test]
    fn volume_gradient_matches_finite_differences(mesh in simplex_mesh3(3)) {
        assert_gradient_matches_finite_differences(&mesh, &Volume);
    }

    #[test]
    fn enclosed_area_gradient_matches_finite_differences(mesh in simplex_mesh3(1)) {
        let enclosed = total(&mesh, None, &AreaEnclosed).unwrap().unwrap();
        prop_assume!(enclosed > 0.1);
        assert_gradient_matches_finite_differences(&mesh, &AreaEnclosed);
    }

    #[test]
    fn enclosed_volume_gradient_matches_finite_differences(mesh in simplex_mesh3(2)) {
        let enclosed = total(&mesh, None, &VolumeEnclosed).unwrap().unwrap();
        prop_assume!(enclosed > 0.1);
        assert_gradient_matches_finite_differences(&mesh, &VolumeEnclosed);
    }
}
