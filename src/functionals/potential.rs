//! Potentials evaluated at the vertices of a mesh.
use crate::assembly::{ElementGradient, ElementIntegrand};
use crate::element::Element;
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::{Grade, Real};
use nalgebra::{DMatrix, DVector, DVectorView, Scalar};
use std::fmt;

pub type PotentialFn<T> = dyn Fn(DVectorView<'_, T>) -> eyre::Result<T> + Send + Sync;
pub type PotentialGradientFn<T> = dyn Fn(DVectorView<'_, T>) -> eyre::Result<DVector<T>> + Send + Sync;

/// The sum of a scalar potential $V(x)$ over the vertex positions of a mesh.
///
/// If no gradient function is given, the gradient is computed by finite differences.
pub struct ScalarPotential<T: Scalar> {
    potential: Box<PotentialFn<T>>,
    gradient: Option<Box<PotentialGradientFn<T>>>,
}

impl<T: Scalar> fmt::Debug for ScalarPotential<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarPotential")
            .field("has_gradient", &self.gradient.is_some())
            .finish()
    }
}

impl<T: Real> ScalarPotential<T> {
    pub fn new<F>(potential: F) -> Self
    where
        F: Fn(DVectorView<'_, T>) -> eyre::Result<T> + Send + Sync + 'static,
    {
        Self {
            potential: Box::new(potential),
            gradient: None,
        }
    }

    /// Sets the gradient $\nabla V(x)$, which must return a vector with one entry per
    /// spatial dimension.
    pub fn with_gradient<G>(self, gradient: G) -> Self
    where
        G: Fn(DVectorView<'_, T>) -> eyre::Result<DVector<T>> + Send + Sync + 'static,
    {
        Self {
            gradient: Some(Box::new(gradient)),
            ..self
        }
    }

    pub fn has_gradient(&self) -> bool {
        self.gradient.is_some()
    }
}

impl<T: Real> ElementIntegrand<T> for ScalarPotential<T> {
    fn grade(&self) -> Grade {
        0
    }

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        (self.potential)(mesh.vertex(element.id())).map_err(FunctionalError::Callback)
    }
}

impl<T: Real> ElementGradient<T> for ScalarPotential<T> {
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        let potential_gradient = self
            .gradient
            .as_ref()
            .ok_or(FunctionalError::NoAnalyticGradient)?;
        let vertex = element.id();
        let g = potential_gradient(mesh.vertex(vertex)).map_err(FunctionalError::Callback)?;
        if g.len() != mesh.dim() {
            return Err(FunctionalError::CallbackShape {
                expected: mesh.dim(),
                found: g.len(),
            });
        }
        let mut column = gradient.column_mut(vertex);
        column += g;
        Ok(())
    }
}
