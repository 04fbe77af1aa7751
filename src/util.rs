//! Small vector helpers shared by the integrands.
use crate::element::Element;
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::Real;
use nalgebra::{DMatrix, DVector, Vector3};
use numeric_literals::replace_float_literals;

/// Quantities whose magnitude falls below this threshold are treated as zero when they would
/// otherwise be inverted or normalized.
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub fn degeneracy_threshold<T: Real>() -> T {
    1e-16
}

/// Returns $1$ for non-negative values and $-1$ otherwise.
pub fn sign<T: Real>(x: T) -> T {
    if x >= T::zero() {
        T::one()
    } else {
        -T::one()
    }
}

/// The position of vertex `i` embedded in 3D space.
///
/// Planar vertices are given a zero $z$-coordinate, so that cross products of planar vectors
/// point along the $z$-axis.
pub fn vertex3<T: Real>(mesh: &SimplicialMesh<T>, i: usize) -> Result<Vector3<T>, FunctionalError> {
    let x = mesh.vertex(i);
    match x.len() {
        2 => Ok(Vector3::new(x[0], x[1], T::zero())),
        3 => Ok(Vector3::new(x[0], x[1], x[2])),
        dim => Err(FunctionalError::UnsupportedDimension(dim)),
    }
}

/// Adds `scale * v` to column `column` of the gradient, truncating `v` to the number of rows
/// of the gradient.
pub fn add_to_column<T: Real>(gradient: &mut DMatrix<T>, column: usize, scale: T, v: &Vector3<T>) {
    let mut target = gradient.column_mut(column);
    for (k, &v_k) in v.iter().take(target.nrows()).enumerate() {
        target[k] += scale * v_k;
    }
}

/// The Gram matrix $G_{ij} = e_i \cdot e_j$ of the edge vectors $e_i = x_i - x_0$ of an element.
pub fn gram_matrix<T: Real>(mesh: &SimplicialMesh<T>, element: &Element<'_>) -> DMatrix<T> {
    let vertices = element.vertices();
    let x0 = mesh.vertex(vertices[0]);
    let edges: Vec<DVector<T>> = vertices[1..]
        .iter()
        .map(|&v| mesh.vertex(v) - &x0)
        .collect();
    let n = edges.len();
    DMatrix::from_fn(n, n, |i, j| edges[i].dot(&edges[j]))
}
