//! Totals, per-element values and analytic gradients over all elements of a grade.
use crate::assembly::{ElementGradient, ElementIntegrand, SymmetryBehavior};
use crate::element::ElementSet;
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::optimize::summation::KahanSum;
use crate::selection::Selection;
use crate::symmetry::{image_list, sum_forces, ImageSkipper};
use crate::Real;
use log::debug;
use nalgebra::{DMatrix, RowDVector};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// Computes the sum of the integrand over the selected elements of its grade.
///
/// Symmetry images are skipped and the sum is accumulated with Kahan compensation in
/// ascending element order. Returns `None` if the mesh holds no elements of the grade, to
/// distinguish an empty sum from a sum that is zero.
pub fn total<T, I>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    integrand: &I,
) -> Result<Option<T>, FunctionalError>
where
    T: Real,
    I: ?Sized + ElementIntegrand<T>,
{
    let grade = integrand.grade();
    let elements = ElementSet::resolve(mesh, grade, selection)?;
    if elements.num_elements() == 0 {
        debug!("Mesh holds no elements of grade {}, nothing to sum.", grade);
        return Ok(None);
    }

    let images = image_list(mesh, grade);
    let mut skipper = ImageSkipper::new(&images);
    let mut sum = KahanSum::zero();
    for element in elements.iter() {
        if skipper.is_image(element.id()) || element.num_vertices() == 0 {
            continue;
        }
        sum.add(integrand.evaluate(mesh, element)?);
    }
    Ok(Some(sum.value()))
}

/// Evaluates the integrand on the selected elements of its grade.
///
/// Returns a row vector with one entry per element of the grade. Entries of elements that
/// are not selected, or that are symmetry images, are zero.
pub fn map_integrand<T, I>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    integrand: &I,
) -> Result<RowDVector<T>, FunctionalError>
where
    T: Real,
    I: ?Sized + ElementIntegrand<T>,
{
    let grade = integrand.grade();
    let elements = ElementSet::resolve(mesh, grade, selection)?;
    let images = image_list(mesh, grade);
    let mut skipper = ImageSkipper::new(&images);
    let mut values = RowDVector::zeros(elements.num_elements());
    for element in elements.iter() {
        if skipper.is_image(element.id()) || element.num_vertices() == 0 {
            continue;
        }
        values[element.id()] = integrand.evaluate(mesh, element)?;
    }
    Ok(values)
}

/// Computes the gradient of the functional with respect to the vertex positions.
///
/// Returns a $D \times N$ matrix whose column $i$ is the gradient with respect to vertex $i$.
/// Every selected element contributes, including symmetry images. With
/// [`SymmetryBehavior::Add`], contributions are afterwards folded together across identified
/// vertices.
pub fn gradient<T, G>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    kernel: &G,
    symmetry: SymmetryBehavior,
) -> Result<DMatrix<T>, FunctionalError>
where
    T: Real,
    G: ?Sized + ElementGradient<T>,
{
    let elements = ElementSet::resolve(mesh, kernel.grade(), selection)?;
    let mut gradient = DMatrix::zeros(mesh.dim(), mesh.num_vertices());
    for element in elements.iter() {
        if element.num_vertices() == 0 {
            continue;
        }
        kernel.accumulate_gradient(mesh, element, &mut gradient)?;
    }
    if symmetry == SymmetryBehavior::Add {
        sum_forces(mesh, &mut gradient);
    }
    Ok(gradient)
}

/// Parallel version of [`total`].
///
/// Each worker accumulates a compensated partial sum, and partial sums are combined with
/// compensation. The result may differ from the serial total in the last bits.
pub fn par_total<T, I>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    integrand: &I,
) -> Result<Option<T>, FunctionalError>
where
    T: Real + Send + Sync,
    I: ?Sized + ElementIntegrand<T> + Sync,
{
    let grade = integrand.grade();
    let elements = ElementSet::resolve(mesh, grade, selection)?;
    if elements.num_elements() == 0 {
        return Ok(None);
    }

    let images = image_list(mesh, grade);
    let sum = (0..elements.len())
        .into_par_iter()
        .map(|k| elements.get(k))
        .filter(|element| element.num_vertices() > 0 && images.binary_search(&element.id()).is_err())
        .try_fold(KahanSum::zero, |mut partial, element| {
            partial.add(integrand.evaluate(mesh, element)?);
            Ok::<_, FunctionalError>(partial)
        })
        .try_reduce(KahanSum::zero, |a, b| Ok(a.combine(b)))?;
    Ok(Some(sum.value()))
}

/// Parallel version of [`map_integrand`].
pub fn par_map_integrand<T, I>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    integrand: &I,
) -> Result<RowDVector<T>, FunctionalError>
where
    T: Real + Send + Sync,
    I: ?Sized + ElementIntegrand<T> + Sync,
{
    let grade = integrand.grade();
    let elements = ElementSet::resolve(mesh, grade, selection)?;
    let images = image_list(mesh, grade);
    let element_values: Vec<(usize, T)> = (0..elements.len())
        .into_par_iter()
        .map(|k| elements.get(k))
        .filter(|element| element.num_vertices() > 0 && images.binary_search(&element.id()).is_err())
        .map(|element| {
            integrand
                .evaluate(mesh, element)
                .map(|value| (element.id(), value))
        })
        .collect::<Result<_, _>>()?;

    let mut values = RowDVector::zeros(elements.num_elements());
    for (id, value) in element_values {
        values[id] = value;
    }
    Ok(values)
}

/// Parallel version of [`gradient`].
///
/// Each worker accumulates into a private gradient matrix, and the matrices are summed once
/// all elements have been visited.
pub fn par_gradient<T, G>(
    mesh: &SimplicialMesh<T>,
    selection: Option<&Selection>,
    kernel: &G,
    symmetry: SymmetryBehavior,
) -> Result<DMatrix<T>, FunctionalError>
where
    T: Real + Send + Sync,
    G: ?Sized + ElementGradient<T> + Sync,
{
    let elements = ElementSet::resolve(mesh, kernel.grade(), selection)?;
    let (dim, num_vertices) = (mesh.dim(), mesh.num_vertices());
    let mut gradient = (0..elements.len())
        .into_par_iter()
        .map(|k| elements.get(k))
        .filter(|element| element.num_vertices() > 0)
        .try_fold(
            || DMatrix::zeros(dim, num_vertices),
            |mut partial, element| {
                kernel.accumulate_gradient(mesh, element, &mut partial)?;
                Ok::<_, FunctionalError>(partial)
            },
        )
        .try_reduce(|| DMatrix::zeros(dim, num_vertices), |a, b| Ok(a + b))?;
    if symmetry == SymmetryBehavior::Add {
        sum_forces(mesh, &mut gradient);
    }
    Ok(gradient)
}
