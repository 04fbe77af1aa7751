use meshfun::mesh::SimplicialMesh;
use nalgebra::DMatrix;

/// The unit square split into the triangles (0, 1, 2) and (0, 2, 3), with edges.
pub fn unit_square_2d() -> SimplicialMesh<f64> {
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(2, 4, &[
        0.0, 0.0,
        1.0, 0.0,
        1.0, 1.0,
        0.0, 1.0,
    ]);
    let mut mesh = SimplicialMesh::from_vertices_and_elements(vertices, 2, [[0, 1, 2], [0, 2, 3]]).unwrap();
    mesh.generate_lower_grades().unwrap();
    mesh
}

/// The closed boundary of the square $[-1, 1]^2$ in 2D, with edges of length 2.
pub fn square_loop_2d() -> SimplicialMesh<f64> {
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(2, 4, &[
        -1.0, -1.0,
         1.0, -1.0,
         1.0,  1.0,
        -1.0,  1.0,
    ]);
    SimplicialMesh::from_vertices_and_elements(vertices, 1, [[0, 1], [1, 2], [2, 3], [3, 0]]).unwrap()
}

/// The closed surface of the octahedron with vertices $\pm e_i$.
pub fn octahedron() -> SimplicialMesh<f64> {
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(3, 6, &[
         1.0,  0.0,  0.0,
        -1.0,  0.0,  0.0,
         0.0,  1.0,  0.0,
         0.0, -1.0,  0.0,
         0.0,  0.0,  1.0,
         0.0,  0.0, -1.0,
    ]);
    let mut faces = Vec::new();
    for x in [0, 1] {
        for y in [2, 3] {
            for z in [4, 5] {
                faces.push([x, y, z]);
            }
        }
    }
    let mut mesh = SimplicialMesh::from_vertices_and_elements(vertices, 2, faces).unwrap();
    mesh.generate_lower_grades().unwrap();
    mesh
}

/// The tetrahedron spanned by the origin and the unit vectors, with all faces.
pub fn unit_tetrahedron() -> SimplicialMesh<f64> {
    #[rustfmt::skip]
    let vertices = DMatrix::from_column_slice(3, 4, &[
        0.0, 0.0, 0.0,
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        0.0, 0.0, 1.0,
    ]);
    let mut mesh = SimplicialMesh::from_vertices_and_elements(vertices, 3, [[0, 1, 2, 3]]).unwrap();
    mesh.generate_lower_grades().unwrap();
    mesh
}
