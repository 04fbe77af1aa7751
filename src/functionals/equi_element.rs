//! Penalty on the variation of element sizes around each vertex.
use crate::assembly::ElementIntegrand;
use crate::element::Element;
use crate::error::FunctionalError;
use crate::functionals::element_size;
use crate::mesh::SimplicialMesh;
use crate::util::degeneracy_threshold;
use crate::{Grade, Real};
use serde::{Deserialize, Serialize};

/// Measures how much the sizes of the elements incident on a vertex deviate from their mean.
///
/// The integrand is defined per vertex. For a vertex with incident elements of sizes
/// $s_1, \dots, s_n$ and mean size $\bar s$, it is
/// $$ \sum_{k=1}^n \left( 1 - \frac{s_k}{\bar s} \right)^2, $$
/// and zero for vertices with at most one incident element.
///
/// The incident elements are taken from the given grade, or from the highest grade of the
/// mesh if no grade is given or the mesh holds no elements of the given grade.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquiElement {
    grade: Option<Grade>,
}

impl EquiElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grade(grade: Grade) -> Self {
        Self { grade: Some(grade) }
    }

    /// The grade of the elements whose sizes are compared on the given mesh.
    pub fn element_grade<T: Real>(&self, mesh: &SimplicialMesh<T>) -> Grade {
        let max_grade = mesh.max_grade();
        match self.grade {
            Some(grade) if grade >= 1 && grade <= max_grade && mesh.has_grade(grade) => grade,
            _ => max_grade,
        }
    }
}

impl<T: Real> ElementIntegrand<T> for EquiElement {
    fn grade(&self) -> Grade {
        0
    }

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        let grade = self.element_grade(mesh);
        if grade == 0 {
            return Ok(T::zero());
        }

        let vertex = element.id();
        let incident = mesh.vertex_elements(grade)?.lane(vertex);
        if incident.len() <= 1 {
            return Ok(T::zero());
        }

        let element_vertices = mesh.element_vertices(grade)?;
        let sizes = incident
            .iter()
            .map(|&e| element_size(mesh, grade, Element::new(e, element_vertices.lane(e))))
            .collect::<Result<Vec<T>, _>>()?;

        let count = T::from_usize(sizes.len()).unwrap();
        let mean = sizes.iter().fold(T::zero(), |acc, &s| acc + s) / count;
        if mean.abs() < degeneracy_threshold() {
            return Err(FunctionalError::Degenerate { grade: 0, element: vertex });
        }

        Ok(sizes
            .iter()
            .map(|&s| {
                let deviation = T::one() - s / mean;
                deviation * deviation
            })
            .fold(T::zero(), |acc, x| acc + x))
    }
}
