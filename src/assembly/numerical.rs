//! Gradients by central finite differences.
//!
//! Each vertex coordinate of an element is perturbed in place by $\pm h$, the integrand of
//! that single element is re-evaluated, and the coordinate is restored before moving on.
//! The mesh is therefore left exactly as it was found, also when an evaluation fails.
use crate::assembly::{ElementIntegrand, FiniteDifferenceSettings, SymmetryBehavior};
use crate::element::{populate_element_vertices, Element, ElementSet};
use crate::error::FunctionalError;
use crate::field::Field;
use crate::mesh::SimplicialMesh;
use crate::optimize::calculus::try_central_difference;
use crate::selection::Selection;
use crate::symmetry::sum_forces;
use crate::{Grade, Real};
use nalgebra::DMatrix;
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Adds the finite difference gradient of the integrand on a single element to `gradient`.
///
/// Only the coordinates of the element's own `vertices` are perturbed, and the integrand is
/// only evaluated on this element.
pub fn accumulate_numerical_gradient<T, I>(
    mesh: &mut SimplicialMesh<T>,
    element_id: usize,
    vertices: &[usize],
    integrand: &I,
    step: T,
    gradient: &mut DMatrix<T>,
) -> Result<(), FunctionalError>
where
    T: Real,
    I: ?Sized + ElementIntegrand<T>,
{
    let dim = mesh.dim();
    for &v in vertices {
        for k in 0..dim {
            let df = try_central_difference(
                &mut *mesh,
                |mesh| mesh.vertex_coordinate(k, v),
                |mesh, x| mesh.set_vertex_coordinate(k, v, x),
                |mesh| integrand.evaluate(mesh, Element::new(element_id, vertices)),
                step,
            )?;
            gradient[(k, v)] += df;
        }
    }
    Ok(())
}

/// Computes the gradient of the functional with respect to the vertex positions by central
/// finite differences.
///
/// The mesh is borrowed mutably since vertex coordinates are perturbed during the
/// computation, but it is unchanged on return. Every selected element contributes, including
/// symmetry images.
pub fn numerical_gradient<T, I>(
    mesh: &mut SimplicialMesh<T>,
    selection: Option<&Selection>,
    integrand: &I,
    symmetry: SymmetryBehavior,
    settings: &FiniteDifferenceSettings<T>,
) -> Result<DMatrix<T>, FunctionalError>
where
    T: Real,
    I: ?Sized + ElementIntegrand<T>,
{
    let grade = integrand.grade();
    let ids = ElementSet::resolve(&*mesh, grade, selection)?.ids().to_vec();
    let mut gradient = DMatrix::zeros(mesh.dim(), mesh.num_vertices());
    let mut vertices = Vec::new();
    for id in ids {
        populate_element_vertices(&*mesh, grade, id, &mut vertices)?;
        if vertices.is_empty() {
            continue;
        }
        accumulate_numerical_gradient(mesh, id, &vertices, integrand, settings.step, &mut gradient)?;
    }
    if symmetry == SymmetryBehavior::Add {
        sum_forces(mesh, &mut gradient);
    }
    Ok(gradient)
}

/// Parallel version of [`numerical_gradient`].
///
/// Every worker perturbs its own copy of the mesh, so the given mesh is never modified.
pub fn par_numerical_gradient<T, I>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    integrand: &I,
    symmetry: SymmetryBehavior,
    settings: &FiniteDifferenceSettings<T>,
) -> Result<DMatrix<T>, FunctionalError>
where
    T: Real + Send + Sync,
    I: ?Sized + ElementIntegrand<T> + Sync,
{
    let elements = ElementSet::resolve(mesh, integrand.grade(), selection)?;
    let (dim, num_vertices) = (mesh.dim(), mesh.num_vertices());
    let step = settings.step;
    let mut gradient = (0..elements.len())
        .into_par_iter()
        .map(|k| elements.get(k))
        .filter(|element| element.num_vertices() > 0)
        .try_fold(
            || (mesh.clone(), DMatrix::zeros(dim, num_vertices)),
            |(mut local_mesh, mut partial), element| {
                accumulate_numerical_gradient(
                    &mut local_mesh,
                    element.id(),
                    element.vertices(),
                    integrand,
                    step,
                    &mut partial,
                )?;
                Ok::<_, FunctionalError>((local_mesh, partial))
            },
        )
        .map(|result| result.map(|(_, partial)| partial))
        .try_reduce(|| DMatrix::zeros(dim, num_vertices), |a, b| Ok(a + b))?;
    if symmetry == SymmetryBehavior::Add {
        sum_forces(mesh, &mut gradient);
    }
    Ok(gradient)
}

/// Computes the derivative of the functional with respect to the entries of a per-vertex
/// field by central finite differences.
///
/// The integrand takes the field as an explicit argument, so that it can be evaluated on the
/// perturbed field. Returns a $p \times N$ matrix, where $p$ is the number of entries per
/// vertex. The field is unchanged on return.
pub fn numerical_field_gradient<T, F>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    grade: Grade,
    field: &mut Field<T>,
    integrand: F,
    settings: &FiniteDifferenceSettings<T>,
) -> Result<DMatrix<T>, FunctionalError>
where
    T: Real,
    F: Fn(&SimplicialMesh<T>, &Field<T>, Element<'_>) -> Result<T, FunctionalError>,
{
    let elements = ElementSet::resolve(mesh, grade, selection)?;
    let psize = field.psize();
    let mut gradient = DMatrix::zeros(psize, field.num_vertices());
    for element in elements.iter() {
        for &v in element.vertices() {
            if v >= field.num_vertices() {
                return Err(FunctionalError::MissingFieldElement { grade: 0, element: v });
            }
            for p in 0..psize {
                let df = try_central_difference(
                    &mut *field,
                    |field| field.value(p, v),
                    |field, x| field.set_value(p, v, x),
                    |field| integrand(mesh, field, element),
                    settings.step,
                )?;
                gradient[(p, v)] += df;
            }
        }
    }
    Ok(gradient)
}
