//! Concrete functionals.
//!
//! Each functional is a type implementing [`ElementIntegrand`], and [`ElementGradient`] where
//! an analytic gradient is available. The [`Functional`] enum collects them behind a single
//! type and chooses between analytic and finite difference gradients.
use crate::assembly::{
    gradient, map_integrand, numerical_gradient, par_gradient, par_map_integrand, par_numerical_gradient,
    par_total, total, ElementGradient, ElementIntegrand, FiniteDifferenceSettings, SymmetryBehavior,
};
use crate::element::Element;
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::selection::Selection;
use crate::{Grade, Real};
use nalgebra::{DMatrix, RowDVector, Scalar};

mod elasticity;
mod equi_element;
mod geometry;
mod gradsq;
mod potential;

pub use elasticity::*;
pub use equi_element::*;
pub use geometry::*;
pub use gradsq::*;
pub use potential::*;

/// The size of an element: the length of an edge, the area of a triangle or the volume of a
/// tetrahedron.
pub fn element_size<T: Real>(
    mesh: &SimplicialMesh<T>,
    grade: Grade,
    element: Element<'_>,
) -> Result<T, FunctionalError> {
    match grade {
        1 => Length.evaluate(mesh, element),
        2 => Area.evaluate(mesh, element),
        3 => Volume.evaluate(mesh, element),
        _ => Err(FunctionalError::InvalidGrade(grade)),
    }
}

/// Any of the functionals provided by this crate.
#[derive(Debug)]
pub enum Functional<T: Scalar> {
    Length(Length),
    Area(Area),
    AreaEnclosed(AreaEnclosed),
    Volume(Volume),
    VolumeEnclosed(VolumeEnclosed),
    LinearElasticity(LinearElasticity<T>),
    EquiElement(EquiElement),
    GradSq(GradSq<T>),
    ScalarPotential(ScalarPotential<T>),
}

macro_rules! impl_from_functional {
    ($($variant:ident => $ty:ty),*) => {
        $(
            impl<T: Scalar> From<$ty> for Functional<T> {
                fn from(functional: $ty) -> Self {
                    Self::$variant(functional)
                }
            }
        )*
    };
}

impl_from_functional!(
    Length => Length,
    Area => Area,
    AreaEnclosed => AreaEnclosed,
    Volume => Volume,
    VolumeEnclosed => VolumeEnclosed,
    LinearElasticity => LinearElasticity<T>,
    EquiElement => EquiElement,
    GradSq => GradSq<T>,
    ScalarPotential => ScalarPotential<T>
);

impl<T: Real> ElementIntegrand<T> for Functional<T> {
    fn grade(&self) -> Grade {
        match self {
            Self::Length(f) => ElementIntegrand::<T>::grade(f),
            Self::Area(f) => ElementIntegrand::<T>::grade(f),
            Self::AreaEnclosed(f) => ElementIntegrand::<T>::grade(f),
            Self::Volume(f) => ElementIntegrand::<T>::grade(f),
            Self::VolumeEnclosed(f) => ElementIntegrand::<T>::grade(f),
            Self::LinearElasticity(f) => f.grade(),
            Self::EquiElement(f) => ElementIntegrand::<T>::grade(f),
            Self::GradSq(f) => f.grade(),
            Self::ScalarPotential(f) => f.grade(),
        }
    }

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        match self {
            Self::Length(f) => f.evaluate(mesh, element),
            Self::Area(f) => f.evaluate(mesh, element),
            Self::AreaEnclosed(f) => f.evaluate(mesh, element),
            Self::Volume(f) => f.evaluate(mesh, element),
            Self::VolumeEnclosed(f) => f.evaluate(mesh, element),
            Self::LinearElasticity(f) => f.evaluate(mesh, element),
            Self::EquiElement(f) => f.evaluate(mesh, element),
            Self::GradSq(f) => f.evaluate(mesh, element),
            Self::ScalarPotential(f) => f.evaluate(mesh, element),
        }
    }
}

impl<T: Real> ElementGradient<T> for Functional<T> {
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        match self {
            Self::Length(f) => f.accumulate_gradient(mesh, element, gradient),
            Self::Area(f) => f.accumulate_gradient(mesh, element, gradient),
            Self::AreaEnclosed(f) => f.accumulate_gradient(mesh, element, gradient),
            Self::Volume(f) => f.accumulate_gradient(mesh, element, gradient),
            Self::VolumeEnclosed(f) => f.accumulate_gradient(mesh, element, gradient),
            Self::ScalarPotential(f) => f.accumulate_gradient(mesh, element, gradient),
            Self::LinearElasticity(_) | Self::EquiElement(_) | Self::GradSq(_) => {
                Err(FunctionalError::NoAnalyticGradient)
            }
        }
    }
}

impl<T: Real> Functional<T> {
    /// How gradients of this functional treat identified vertices.
    pub fn symmetry(&self) -> SymmetryBehavior {
        match self {
            Self::ScalarPotential(_) => SymmetryBehavior::None,
            _ => SymmetryBehavior::Add,
        }
    }

    /// Whether the gradient is computed analytically rather than by finite differences.
    pub fn has_analytic_gradient(&self) -> bool {
        match self {
            Self::Length(_) | Self::Area(_) | Self::AreaEnclosed(_) | Self::Volume(_) | Self::VolumeEnclosed(_) => true,
            Self::ScalarPotential(potential) => potential.has_gradient(),
            Self::LinearElasticity(_) | Self::EquiElement(_) | Self::GradSq(_) => false,
        }
    }

    /// The value of the functional, or `None` if the mesh has no elements of its grade.
    pub fn total(&self, mesh: &SimplicialMesh<T>, selection: Option<&Selection>) -> Result<Option<T>, FunctionalError> {
        total(mesh, selection, self)
    }

    /// The integrand on every element of the functional's grade.
    pub fn map_integrand(
        &self,
        mesh: &SimplicialMesh<T>,
        selection: Option<&Selection>,
    ) -> Result<RowDVector<T>, FunctionalError> {
        map_integrand(mesh, selection, self)
    }

    /// The gradient with respect to the vertex positions, with default finite difference settings.
    ///
    /// The mesh is only modified transiently, by finite differencing.
    pub fn gradient(
        &self,
        mesh: &mut SimplicialMesh<T>,
        selection: Option<&Selection>,
    ) -> Result<DMatrix<T>, FunctionalError> {
        self.gradient_with_settings(mesh, selection, &FiniteDifferenceSettings::default())
    }

    pub fn gradient_with_settings(
        &self,
        mesh: &mut SimplicialMesh<T>,
        selection: Option<&Selection>,
        settings: &FiniteDifferenceSettings<T>,
    ) -> Result<DMatrix<T>, FunctionalError> {
        if self.has_analytic_gradient() {
            gradient(mesh, selection, self, self.symmetry())
        } else {
            numerical_gradient(mesh, selection, self, self.symmetry(), settings)
        }
    }
}

impl<T: Real + Send + Sync> Functional<T> {
    /// Parallel version of [`Functional::total`].
    pub fn par_total(
        &self,
        mesh: &SimplicialMesh<T>,
        selection: Option<&Selection>,
    ) -> Result<Option<T>, FunctionalError> {
        par_total(mesh, selection, self)
    }

    /// Parallel version of [`Functional::map_integrand`].
    pub fn par_map_integrand(
        &self,
        mesh: &SimplicialMesh<T>,
        selection: Option<&Selection>,
    ) -> Result<RowDVector<T>, FunctionalError> {
        par_map_integrand(mesh, selection, self)
    }

    /// Parallel version of [`Functional::gradient_with_settings`].
    ///
    /// Finite differences are computed on per-worker copies of the mesh, so the mesh is
    /// borrowed immutably.
    pub fn par_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        selection: Option<&Selection>,
        settings: &FiniteDifferenceSettings<T>,
    ) -> Result<DMatrix<T>, FunctionalError> {
        if self.has_analytic_gradient() {
            par_gradient(mesh, selection, self, self.symmetry())
        } else {
            par_numerical_gradient(mesh, selection, self, self.symmetry(), settings)
        }
    }
}
