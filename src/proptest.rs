use crate::mesh::procedural::create_unit_square_uniform_tri_mesh_2d;
use crate::mesh::SimplicialMesh;
use crate::Grade;
use ::proptest::prelude::*;
use nalgebra::{DMatrix, Point2, Point3, Vector3};

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Pick a reasonably small range to pick coordinates from,
    // otherwise we can easily get floating point numbers that are
    // so ridiculously large as to break anything we might want to do with them
    let range = -10.0..10.0;
    [range.clone(), range.clone()].prop_map(|[x, y]| Point2::new(x, y))
}

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range.clone()].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Builds a mesh consisting of a single simplex with the given vertices, together with all
/// of its faces.
pub fn single_simplex_mesh(vertices: &[Point3<f64>]) -> SimplicialMesh<f64> {
    let grade = vertices.len() - 1;
    let matrix = DMatrix::from_fn(3, vertices.len(), |k, i| vertices[i][k]);
    let simplex: Vec<usize> = (0..vertices.len()).collect();
    let mut mesh = SimplicialMesh::from_vertices_and_elements(matrix, grade, [simplex])
        .expect("A single simplex is a valid mesh");
    mesh.generate_lower_grades()
        .expect("Faces of a single simplex can always be generated");
    mesh
}

/// The size of the simplex spanned by the given points, computed directly from its vertices.
fn simplex_measure(vertices: &[Point3<f64>]) -> f64 {
    let edges: Vec<Vector3<f64>> = vertices[1..].iter().map(|x| x - vertices[0]).collect();
    match edges.len() {
        1 => edges[0].norm(),
        2 => 0.5 * edges[0].cross(&edges[1]).norm(),
        3 => edges[0].dot(&edges[1].cross(&edges[2])).abs() / 6.0,
        _ => 0.0,
    }
}

/// Strategy for a mesh holding a single, well-shaped simplex of the given grade in 3D,
/// together with its faces.
pub fn simplex_mesh3(grade: Grade) -> impl Strategy<Value = SimplicialMesh<f64>> {
    assert!(grade >= 1 && grade <= 3, "Grade must be 1, 2 or 3");
    prop::collection::vec(point3(), grade + 1)
        .prop_filter("simplex must not be nearly degenerate", move |vertices| {
            // Compare against the size of a regular simplex with the same longest edge
            let longest_edge = vertices
                .iter()
                .flat_map(|a| vertices.iter().map(move |b| (a - b).norm()))
                .fold(0.0, f64::max);
            simplex_measure(vertices) > 0.05 * longest_edge.powi(grade as i32)
        })
        .prop_map(|vertices| single_simplex_mesh(&vertices))
}

/// Strategy for a triangulation of the unit square whose interior vertices are randomly
/// displaced by less than a quarter of the cell size, so that no triangle degenerates.
pub fn perturbed_unit_square_mesh(max_cells_per_dim: usize) -> impl Strategy<Value = SimplicialMesh<f64>> {
    (1..=max_cells_per_dim.max(1))
        .prop_flat_map(|cells| {
            let n = (cells + 1) * (cells + 1);
            let displacement = -0.2..0.2;
            (Just(cells), prop::collection::vec([displacement.clone(), displacement], n))
        })
        .prop_map(|(cells, displacements)| {
            let mut mesh = create_unit_square_uniform_tri_mesh_2d(cells);
            let h = 1.0 / cells as f64;
            for (i, [dx, dy]) in displacements.into_iter().enumerate() {
                let x = mesh.vertex_coordinate(0, i);
                let y = mesh.vertex_coordinate(1, i);
                let interior = |c: f64| c > 0.5 * h && c < 1.0 - 0.5 * h;
                if interior(x) && interior(y) {
                    mesh.set_vertex_coordinate(0, i, x + dx * h);
                    mesh.set_vertex_coordinate(1, i, y + dy * h);
                }
            }
            mesh.generate_lower_grades()
                .expect("Faces of a triangulation can always be generated");
            mesh
        })
}
