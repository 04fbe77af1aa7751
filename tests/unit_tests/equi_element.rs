use meshfun::assembly::{map_integrand, total, FiniteDifferenceSettings};
use meshfun::functionals::{EquiElement, Functional};
use meshfun::mesh::procedural::create_unit_square_uniform_tri_mesh_2d;
use meshfun::mesh::SimplicialMesh;
use nalgebra::DMatrix;

/// Two triangles sharing the edge (0, 2), with areas 0.5 and 1.5.
fn uneven_pair() -> SimplicialMesh<f64> {
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(2, 4, &[
         0.0, 0.0,
         1.0, 0.0,
         0.0, 1.0,
        -3.0, 0.0,
    ]);
    SimplicialMesh::from_vertices_and_elements(vertices, 2, [[0, 1, 2], [0, 2, 3]]).unwrap()
}

#[test]
fn uniform_triangulation_has_no_penalty() {
    let mesh = create_unit_square_uniform_tri_mesh_2d::<f64>(4);
    let value = total(&mesh, None, &EquiElement::new()).unwrap().unwrap();
    assert!(value.abs() < 1e-24);
}

#[test]
fn uneven_elements_are_penalized_at_shared_vertices() {
    let mesh = uneven_pair();
    // Mean area 1, so both shared vertices see (1 - 0.5)^2 + (1 - 1.5)^2
    let values = map_integrand(&mesh, None, &EquiElement::new()).unwrap();
    assert_eq!(values.len(), 4);
    assert!((values[0] - 0.5).abs() < 1e-15);
    assert_eq!(values[1], 0.0);
    assert!((values[2] - 0.5).abs() < 1e-15);
    assert_eq!(values[3], 0.0);

    let value = total(&mesh, None, &EquiElement::new()).unwrap().unwrap();
    assert!((value - 1.0).abs() < 1e-15);
}

#[test]
fn element_grade_falls_back_to_highest_grade() {
    let mut mesh = uneven_pair();
    assert_eq!(EquiElement::new().element_grade(&mesh), 2);
    assert_eq!(EquiElement::with_grade(5).element_grade(&mesh), 2);
    // No edges yet
    assert_eq!(EquiElement::with_grade(1).element_grade(&mesh), 2);

    mesh.generate_lower_grades().unwrap();
    assert_eq!(EquiElement::with_grade(1).element_grade(&mesh), 1);
    assert_eq!(EquiElement::with_grade(5).element_grade(&mesh), 2);
    assert_eq!(
        total(&mesh, None, &EquiElement::with_grade(5)).unwrap(),
        total(&mesh, None, &EquiElement::new()).unwrap()
    );
}

#[test]
fn gradient_only_moves_vertices_with_a_penalty() {
    let mut mesh = uneven_pair();
    let functional = Functional::from(EquiElement::new());
    assert!(!functional.has_analytic_gradient());

    let settings = FiniteDifferenceSettings { step: 1e-6 };
    let gradient = functional
        .gradient_with_settings(&mut mesh, None, &settings)
        .unwrap();
    assert_eq!(gradient.shape(), (2, 4));
    assert_eq!(gradient.column(1).norm(), 0.0);
    assert_eq!(gradient.column(3).norm(), 0.0);
    assert!(gradient.column(0).norm() > 0.0);
    // Both triangles have their base on the x-axis, so moving vertex 2 keeps their areas in
    // the ratio 1:3 and leaves its penalty unchanged
    assert!(gradient.column(2).norm() < 1e-8);
    assert_eq!(mesh, uneven_pair());
}
