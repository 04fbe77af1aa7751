//! Evaluation of integral functionals and their gradients on simplicial meshes.
//!
//! A functional is a sum of per-element integrands over the elements of one grade of a
//! [`SimplicialMesh`](mesh::SimplicialMesh): vertices (grade 0), edges (grade 1),
//! triangles (grade 2) or tetrahedra (grade 3). The [`assembly`] module provides the generic
//! evaluation engine, which computes totals, per-element values and gradients with respect
//! to vertex positions, and the [`functionals`] module provides the concrete integrands.

pub mod assembly;
pub mod element;
pub mod error;
pub mod field;
pub mod functionals;
pub mod io;
pub mod mesh;
pub mod selection;
pub mod symmetry;
pub mod util;

pub mod optimize {
    pub use meshfun_optimize::*;
}

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use meshfun_optimize::Real;

/// The grade of a simplex, i.e. its number of vertices minus one.
pub type Grade = usize;

/// The highest element grade a mesh can store.
pub const MAX_GRADE: Grade = 3;
