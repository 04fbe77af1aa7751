//! Handling of symmetry-identified elements.
//!
//! When elements of a mesh are identified with each other, e.g. across a periodic boundary,
//! only one representative of each identified pair may contribute to a total. The *image*
//! elements are skipped when summing, whereas gradients are computed over all elements and
//! afterwards folded together across identified vertices by [`sum_forces`].
use crate::mesh::SimplicialMesh;
use crate::{Grade, Real};
use nalgebra::{DMatrix, Scalar};
use serde::{Deserialize, Serialize};

/// How a gradient is post-processed to account for identified vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymmetryBehavior {
    /// The gradient is used as computed.
    None,
    /// The gradient columns of identified vertices are replaced by their sum.
    Add,
}

impl Default for SymmetryBehavior {
    fn default() -> Self {
        SymmetryBehavior::Add
    }
}

/// The ids of the elements of the given grade that are images of some other element,
/// sorted ascending and without duplicates.
pub fn image_list<T: Scalar>(mesh: &SimplicialMesh<T>, grade: Grade) -> Vec<usize> {
    let mut images: Vec<usize> = mesh
        .identifications(grade)
        .iter()
        .map(|&(_, image)| image)
        .collect();
    images.sort_unstable();
    images.dedup();
    images
}

/// Tests element ids for membership in a sorted image list.
///
/// Ids queried in ascending order are matched by advancing a cursor through the list, so a
/// full pass over the elements costs time linear in the number of elements and images.
/// Queries that arrive out of order fall back to binary search.
#[derive(Debug, Clone)]
pub struct ImageSkipper<'a> {
    images: &'a [usize],
    cursor: usize,
    last: Option<usize>,
}

impl<'a> ImageSkipper<'a> {
    pub fn new(images: &'a [usize]) -> Self {
        Self {
            images,
            cursor: 0,
            last: None,
        }
    }

    pub fn is_image(&mut self, id: usize) -> bool {
        if self.last.map_or(false, |last| id < last) {
            return self.images.binary_search(&id).is_ok();
        }
        self.last = Some(id);
        while self.cursor < self.images.len() && self.images[self.cursor] < id {
            self.cursor += 1;
        }
        self.images.get(self.cursor) == Some(&id)
    }
}

/// Folds gradient contributions together across identified vertices.
///
/// For every identified vertex pair $(i, j)$, in ascending order, both columns $i$ and $j$
/// are replaced by their sum, so that all vertices of a pair see the total force acting on
/// the pair. Pairs referring to columns outside the matrix are ignored.
pub fn sum_forces<T: Real>(mesh: &SimplicialMesh<T>, gradient: &mut DMatrix<T>) {
    let ncols = gradient.ncols();
    for &(i, j) in mesh.identifications(0) {
        if i >= ncols || j >= ncols || i == j {
            continue;
        }
        let sum = gradient.column(i) + gradient.column(j);
        gradient.set_column(i, &sum);
        gradient.set_column(j, &sum);
    }
}
