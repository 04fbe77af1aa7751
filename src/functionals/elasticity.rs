//! Linear elastic energy of a mesh relative to a reference configuration.
use crate::assembly::ElementIntegrand;
use crate::element::Element;
use crate::error::FunctionalError;
use crate::functionals::element_size;
use crate::mesh::SimplicialMesh;
use crate::util::{degeneracy_threshold, gram_matrix};
use crate::{Grade, Real};
use nalgebra::{DMatrix, Scalar};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

impl<T: Real> From<YoungPoisson<T>> for LameParameters<T> {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let mu = 0.5 * young / (1.0 + poisson);
        let lambda = 2.0 * mu * poisson / (1.0 - 2.0 * poisson);
        Self { mu, lambda }
    }
}

/// Linear elastic energy of the elements of a mesh, measured against a reference mesh with
/// the same vertex numbering.
///
/// For an element with edge vectors $e_i = x_i - x_0$ in the current mesh and $\bar e_i$ in the
/// reference mesh, let $G_{ij} = e_i \cdot e_j$ and $\bar G_{ij} = \bar e_i \cdot \bar e_j$ be the
/// Gram matrices. The Cauchy-Green strain is
/// $$ C = \frac{1}{2} \left( G \bar G^{-1} - I \right) $$
/// and the integrand is
/// $$ \bar V \left( \mu \operatorname{tr}(C^2) + \frac{\lambda}{2} \operatorname{tr}^2(C) \right), $$
/// where $\bar V$ is the size of the element in the reference mesh. The material has unit
/// Young's modulus.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearElasticity<T: Scalar> {
    reference: SimplicialMesh<T>,
    grade: Grade,
    poisson: T,
}

impl<T: Real> LinearElasticity<T> {
    /// Creates the functional on the highest grade of the reference mesh, with Poisson's
    /// ratio 0.3.
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    pub fn new(reference: SimplicialMesh<T>) -> Self {
        let grade = reference.max_grade();
        Self {
            reference,
            grade,
            poisson: 0.3,
        }
    }

    pub fn with_grade(self, grade: Grade) -> Self {
        Self { grade, ..self }
    }

    pub fn with_poisson_ratio(self, poisson: T) -> Self {
        Self { poisson, ..self }
    }

    pub fn reference(&self) -> &SimplicialMesh<T> {
        &self.reference
    }

    pub fn poisson_ratio(&self) -> T {
        self.poisson
    }

    pub fn lame_parameters(&self) -> LameParameters<T> {
        LameParameters::from(YoungPoisson {
            young: T::one(),
            poisson: self.poisson,
        })
    }
}

impl<T: Real> ElementIntegrand<T> for LinearElasticity<T> {
    fn grade(&self) -> Grade {
        self.grade
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        let grade = self.grade;
        element.check_grade(grade)?;
        let num_reference_vertices = self.reference.num_vertices();
        if let Some(&vertex) = element
            .vertices()
            .iter()
            .find(|&&v| v >= num_reference_vertices)
        {
            return Err(FunctionalError::ReferenceMismatch {
                vertex,
                num_reference_vertices,
            });
        }

        let gram_reference = gram_matrix(&self.reference, &element);
        let gram_deformed = gram_matrix(mesh, &element);
        let singular = FunctionalError::SingularReference {
            grade,
            element: element.id(),
        };
        // The determinant scales with the element size, so compare it against the product of
        // the squared edge lengths rather than an absolute threshold
        let edge_scale = gram_reference
            .diagonal()
            .iter()
            .fold(T::one(), |acc, &g_ii| acc * g_ii);
        if gram_reference.determinant().abs() <= degeneracy_threshold::<T>() * edge_scale {
            return Err(singular);
        }
        let gram_reference_inv = gram_reference.try_inverse().ok_or(singular)?;

        let strain = (gram_deformed * gram_reference_inv - DMatrix::identity(grade, grade)) * 0.5;
        let trace = strain.trace();
        let trace_of_square = (&strain * &strain).trace();

        let LameParameters { mu, lambda } = self.lame_parameters();
        let weight = element_size(&self.reference, grade, element)?;
        Ok(weight * (mu * trace_of_square + 0.5 * lambda * trace * trace))
    }
}
