//! Basic procedural mesh generation routines.
use crate::mesh::SimplicialMesh;
use crate::Real;
use nalgebra::DMatrix;

/// Uniform triangulation of the unit square $[0, 1]^2$, with every cell split into two triangles.
///
/// Only the triangles are generated. Call [`SimplicialMesh::generate_lower_grades`] to obtain
/// the edges.
pub fn create_unit_square_uniform_tri_mesh_2d<T>(cells_per_dim: usize) -> SimplicialMesh<T>
where
    T: Real,
{
    let num_vertices_per_dim = cells_per_dim + 1;
    let cell_size = T::one() / T::from_usize(cells_per_dim.max(1)).unwrap();
    let to_global_vertex_index = |i: usize, j: usize| num_vertices_per_dim * j + i;

    let vertices = DMatrix::from_fn(2, num_vertices_per_dim * num_vertices_per_dim, |k, v| {
        let (i, j) = (v % num_vertices_per_dim, v / num_vertices_per_dim);
        let index = if k == 0 { i } else { j };
        T::from_usize(index).unwrap() * cell_size
    });

    let mut triangles = Vec::with_capacity(2 * cells_per_dim * cells_per_dim);
    for j in 0..cells_per_dim {
        for i in 0..cells_per_dim {
            let idx = &to_global_vertex_index;
            triangles.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            triangles.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    SimplicialMesh::from_vertices_and_elements(vertices, 2, triangles)
        .expect("Procedurally generated triangles are always valid")
}

/// Uniform tetrahedralization of the unit cube $[0, 1]^3$, with every cell split into six
/// tetrahedra sharing the cell diagonal.
pub fn create_unit_box_uniform_tet_mesh_3d<T>(cells_per_dim: usize) -> SimplicialMesh<T>
where
    T: Real,
{
    let n = cells_per_dim + 1;
    let cell_size = T::one() / T::from_usize(cells_per_dim.max(1)).unwrap();
    let to_global_vertex_index = |i: usize, j: usize, k: usize| (n * n) * k + n * j + i;

    let vertices = DMatrix::from_fn(3, n * n * n, |d, v| {
        let index = [v % n, (v / n) % n, v / (n * n)][d];
        T::from_usize(index).unwrap() * cell_size
    });

    // Each path from the corner (0, 0, 0) to (1, 1, 1) along the cell edges defines one tetrahedron
    let paths: [[[usize; 3]; 2]; 6] = [
        [[1, 0, 0], [1, 1, 0]],
        [[1, 0, 0], [1, 0, 1]],
        [[0, 1, 0], [1, 1, 0]],
        [[0, 1, 0], [0, 1, 1]],
        [[0, 0, 1], [1, 0, 1]],
        [[0, 0, 1], [0, 1, 1]],
    ];

    let mut tets = Vec::with_capacity(6 * cells_per_dim * cells_per_dim * cells_per_dim);
    for k in 0..cells_per_dim {
        for j in 0..cells_per_dim {
            for i in 0..cells_per_dim {
                let idx = |[a, b, c]: [usize; 3]| to_global_vertex_index(i + a, j + b, k + c);
                for [first, second] in paths {
                    tets.push([idx([0, 0, 0]), idx(first), idx(second), idx([1, 1, 1])]);
                }
            }
        }
    }

    SimplicialMesh::from_vertices_and_elements(vertices, 3, tets)
        .expect("Procedurally generated tetrahedra are always valid")
}
