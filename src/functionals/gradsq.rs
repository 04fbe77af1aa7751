//! Squared gradient norm of a piecewise linear field.
use crate::assembly::{numerical_field_gradient, ElementIntegrand, FiniteDifferenceSettings};
use crate::element::Element;
use crate::error::FunctionalError;
use crate::field::Field;
use crate::functionals::geometry::Area;
use crate::mesh::SimplicialMesh;
use crate::selection::Selection;
use crate::util::degeneracy_threshold;
use crate::{Grade, Real};
use nalgebra::{DMatrix, DVector, Scalar};

/// The integral of $\|\nabla \phi\|^2$ over the triangles of a mesh, where $\phi$ is the
/// piecewise linear interpolant of a per-vertex field.
///
/// For fields with several entries per vertex, $\|\nabla \phi\|$ is the Frobenius norm of the
/// $D \times p$ gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct GradSq<T: Scalar> {
    field: Field<T>,
}

impl<T: Real> GradSq<T> {
    pub fn new(field: Field<T>) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &Field<T> {
        &self.field
    }

    pub fn field_mut(&mut self) -> &mut Field<T> {
        &mut self.field
    }

    /// The derivative of the functional with respect to the field entries, as a $p \times N$
    /// matrix, computed by central finite differences.
    pub fn field_gradient(
        &mut self,
        mesh: &SimplicialMesh<T>,
        selection: Option<&Selection>,
        settings: &FiniteDifferenceSettings<T>,
    ) -> Result<DMatrix<T>, FunctionalError> {
        numerical_field_gradient(mesh, selection, 2, &mut self.field, gradsq_integrand, settings)
    }
}

impl<T: Real> ElementIntegrand<T> for GradSq<T> {
    fn grade(&self) -> Grade {
        2
    }

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        gradsq_integrand(mesh, &self.field, element)
    }
}

/// Component of `a` orthogonal to `b`, scaled by the inverse of its squared length.
fn scaled_perpendicular<T: Real>(a: &DVector<T>, b: &DVector<T>) -> Option<DVector<T>> {
    let bb = b.dot(b);
    if bb.abs() < degeneracy_threshold() {
        return None;
    }
    let t = a - b * (a.dot(b) / bb);
    let tt = t.norm_squared();
    if tt.sqrt() < degeneracy_threshold() {
        return None;
    }
    Some(t / tt)
}

/// The gradient of the linear interpolant of the field on a triangle, as a $D \times p$ matrix.
///
/// The gradient of the hat function of vertex $i$ is the altitude vector pointing from the
/// opposite side to vertex $i$, scaled by the inverse of its squared length.
pub fn triangle_field_gradient<T: Real>(
    mesh: &SimplicialMesh<T>,
    field: &Field<T>,
    element: Element<'_>,
) -> Result<DMatrix<T>, FunctionalError> {
    element.check_grade(2)?;
    let v = element.vertices();
    let x: Vec<DVector<T>> = v.iter().map(|&i| mesh.vertex(i).clone_owned()).collect();
    let s0 = &x[1] - &x[0];
    let s1 = &x[2] - &x[1];
    let s2 = &x[0] - &x[2];

    let degenerate = || FunctionalError::Degenerate {
        grade: 2,
        element: element.id(),
    };
    let hat_gradients = [
        scaled_perpendicular(&s2, &s1).ok_or_else(degenerate)?,
        scaled_perpendicular(&s0, &s2).ok_or_else(degenerate)?,
        scaled_perpendicular(&s1, &s0).ok_or_else(degenerate)?,
    ];

    let mut gradient = DMatrix::zeros(mesh.dim(), field.psize());
    for (&vertex, hat_gradient) in v.iter().zip(&hat_gradients) {
        let values = field.element(0, vertex)?;
        for (p, &value) in values.iter().enumerate() {
            gradient.column_mut(p).axpy(value, hat_gradient, T::one());
        }
    }
    Ok(gradient)
}

fn gradsq_integrand<T: Real>(
    mesh: &SimplicialMesh<T>,
    field: &Field<T>,
    element: Element<'_>,
) -> Result<T, FunctionalError> {
    let area = Area.evaluate(mesh, element)?;
    let gradient = triangle_field_gradient(mesh, field, element)?;
    Ok(gradient.norm_squared() * area)
}
