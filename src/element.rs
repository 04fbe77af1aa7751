//! Resolution of the elements visited by an evaluation.
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::selection::Selection;
use crate::{Grade, MAX_GRADE};
use log::debug;
use nalgebra::Scalar;
use nalgebra_sparse::pattern::SparsityPattern;

/// An element of a mesh: its id within its grade and its (sorted) vertex ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
    id: usize,
    vertices: &'a [usize],
}

impl<'a> Element<'a> {
    pub fn new(id: usize, vertices: &'a [usize]) -> Self {
        Self { id, vertices }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn vertices(&self) -> &'a [usize] {
        self.vertices
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Checks that the element has the number of vertices an element of the given grade has.
    pub fn check_grade(&self, grade: Grade) -> Result<(), FunctionalError> {
        if self.vertices.len() == grade + 1 {
            Ok(())
        } else {
            Err(FunctionalError::WrongVertexCount {
                grade,
                expected: grade + 1,
                found: self.vertices.len(),
            })
        }
    }
}

/// The ordered set of elements of one grade that an evaluation visits.
///
/// Without a selection, all elements of the grade are visited in ascending id order.
/// With a selection, the selected ids of the grade are visited in ascending order, with ids
/// that do not name an element of the mesh dropped.
#[derive(Debug, Clone)]
pub struct ElementSet<'a> {
    grade: Grade,
    num_elements: usize,
    ids: Vec<usize>,
    incidence: Option<&'a SparsityPattern>,
}

impl<'a> ElementSet<'a> {
    pub fn resolve<T: Scalar>(
        mesh: &'a SimplicialMesh<T>,
        grade: Grade,
        selection: Option<&Selection>,
    ) -> Result<Self, FunctionalError> {
        if grade > MAX_GRADE {
            return Err(FunctionalError::InvalidGrade(grade));
        }

        let (num_elements, incidence) = if grade == 0 {
            (mesh.num_vertices(), None)
        } else {
            let pattern = mesh.element_vertices(grade)?;
            (pattern.major_dim(), Some(pattern))
        };

        let ids = match selection.and_then(|selection| selection.selected(grade)) {
            Some(selected) => {
                let ids: Vec<usize> = selected.filter(|&id| id < num_elements).collect();
                let dropped = selection.map_or(0, |s| s.len(grade)) - ids.len();
                if dropped > 0 {
                    debug!(
                        "Dropped {} selected ids of grade {} that exceed the number of elements ({}).",
                        dropped, grade, num_elements
                    );
                }
                ids
            }
            None => (0..num_elements).collect(),
        };

        Ok(Self {
            grade,
            num_elements,
            ids,
            incidence,
        })
    }

    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// The number of elements of this grade in the mesh, regardless of the selection.
    pub fn num_elements(&self) -> usize {
        self.num_elements
    }

    /// The number of elements visited.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The ids of the visited elements, in visiting order.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// The `k`-th element in visiting order.
    ///
    /// # Panics
    ///
    /// Panics if `k >= self.len()`.
    pub fn get(&self, k: usize) -> Element<'_> {
        let id = self.ids[k];
        match self.incidence {
            Some(pattern) => Element::new(id, pattern.lane(id)),
            None => Element::new(id, std::slice::from_ref(&self.ids[k])),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Element<'_>> + '_ {
        (0..self.len()).map(move |k| self.get(k))
    }
}

/// Copies the vertex ids of element `id` of the given grade into `vertices`, replacing its contents.
pub fn populate_element_vertices<T: Scalar>(
    mesh: &SimplicialMesh<T>,
    grade: Grade,
    id: usize,
    vertices: &mut Vec<usize>,
) -> Result<(), FunctionalError> {
    vertices.clear();
    if grade == 0 {
        vertices.push(id);
    } else {
        vertices.extend_from_slice(mesh.element_vertices(grade)?.lane(id));
    }
    Ok(())
}
