//! Per-vertex data attached to a mesh.
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::Grade;
use nalgebra::{DMatrix, Scalar};

/// A field holding `psize` scalar entries per vertex of a mesh.
///
/// The entries of vertex $i$ are stored in column $i$ of a $p \times N$ matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T: Scalar> {
    values: DMatrix<T>,
}

impl<T: Scalar> Field<T> {
    pub fn from_values(values: DMatrix<T>) -> Self {
        Self { values }
    }

    /// Creates a field on the vertices of the mesh with `psize` entries per vertex, computed
    /// by `f(vertex_index, entry_index)`.
    pub fn from_fn(mesh: &SimplicialMesh<T>, psize: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        Self {
            values: DMatrix::from_fn(psize, mesh.num_vertices(), |p, i| f(i, p)),
        }
    }

    /// The number of scalar entries per vertex.
    pub fn psize(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_vertices(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &DMatrix<T> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut DMatrix<T> {
        &mut self.values
    }

    /// The entries of element `id` of the given grade.
    ///
    /// Fields only hold entries for vertices, so any other grade is reported as missing.
    pub fn element(&self, grade: Grade, id: usize) -> Result<&[T], FunctionalError> {
        let psize = self.psize();
        if grade != 0 || id >= self.num_vertices() {
            return Err(FunctionalError::MissingFieldElement { grade, element: id });
        }
        Ok(&self.values.as_slice()[psize * id..psize * (id + 1)])
    }

    pub fn value(&self, entry: usize, vertex: usize) -> T {
        self.values[(entry, vertex)].clone()
    }

    pub fn set_value(&mut self, entry: usize, vertex: usize, value: T) {
        self.values[(entry, vertex)] = value;
    }
}
