//! The evaluation engine: totals, per-element values and gradients of element integrands.
//!
//! Every functional is a sum $F = \sum_e f(e)$ of an integrand $f$ over the elements $e$ of
//! one grade of a mesh. The engine resolves which elements to visit (see
//! [`ElementSet`](crate::element::ElementSet)), skips symmetry images when summing, and
//! either sums the integrand with compensated summation, stores it per element, or
//! accumulates its gradient with respect to the vertex positions. Integrands without an
//! analytic gradient are differentiated numerically.
//!
//! Serial and parallel (rayon) variants of every mode are provided. Any failure of a single
//! element aborts the whole evaluation.
use crate::element::Element;
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::{Grade, Real};
use nalgebra::{DMatrix, Scalar};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

pub mod global;
pub mod numerical;

pub use global::*;
pub use numerical::*;

pub use crate::symmetry::SymmetryBehavior;

/// A scalar quantity defined per element of a mesh.
pub trait ElementIntegrand<T: Scalar> {
    /// The grade of the elements the integrand is defined on.
    fn grade(&self) -> Grade;

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError>;
}

/// An integrand with an analytic gradient with respect to the positions of its vertices.
pub trait ElementGradient<T: Scalar>: ElementIntegrand<T> {
    /// Adds the gradient of the integrand on the element to the columns of `gradient`
    /// belonging to the element's vertices.
    ///
    /// Implementations must add to, and never overwrite, the existing entries, since a vertex
    /// receives contributions from every element it is incident on.
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError>;
}

impl<T, X> ElementIntegrand<T> for &X
where
    T: Scalar,
    X: ?Sized + ElementIntegrand<T>,
{
    fn grade(&self) -> Grade {
        X::grade(self)
    }

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        X::evaluate(self, mesh, element)
    }
}

impl<T, X> ElementGradient<T> for &X
where
    T: Scalar,
    X: ?Sized + ElementGradient<T>,
{
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        X::accumulate_gradient(self, mesh, element, gradient)
    }
}

/// Settings for gradients computed by central finite differences.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiniteDifferenceSettings<T> {
    /// The perturbation applied to each coordinate.
    pub step: T,
}

impl<T: Real> Default for FiniteDifferenceSettings<T> {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn default() -> Self {
        Self { step: 1e-10 }
    }
}
