//! Lengths, areas and volumes of elements, and of the regions they enclose.
//!
//! The enclosed quantities are measured with respect to the origin: an edge $(x_0, x_1)$
//! encloses the triangle $(0, x_0, x_1)$ and a triangle $(x_0, x_1, x_2)$ encloses the
//! tetrahedron $(0, x_0, x_1, x_2)$. Summed over a closed curve or surface, they give the
//! enclosed area or volume.
use crate::assembly::{ElementGradient, ElementIntegrand};
use crate::element::Element;
use crate::error::FunctionalError;
use crate::mesh::SimplicialMesh;
use crate::util::{add_to_column, degeneracy_threshold, sign, vertex3};
use crate::{Grade, Real};
use nalgebra::DMatrix;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Length of the edges of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Length;

/// Area of the triangles of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area;

/// Area enclosed by the edges of a mesh with respect to the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaEnclosed;

/// Volume of the tetrahedra of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume;

/// Volume enclosed by the triangles of a mesh with respect to the origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeEnclosed;

impl<T: Real> ElementIntegrand<T> for Length {
    fn grade(&self) -> Grade {
        1
    }

    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        element.check_grade(1)?;
        let v = element.vertices();
        Ok((mesh.vertex(v[1]) - mesh.vertex(v[0])).norm())
    }
}

impl<T: Real> ElementGradient<T> for Length {
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        element.check_grade(1)?;
        let v = element.vertices();
        let s = mesh.vertex(v[1]) - mesh.vertex(v[0]);
        let length = s.norm();
        if length < degeneracy_threshold() {
            return Err(FunctionalError::Degenerate {
                grade: 1,
                element: element.id(),
            });
        }
        gradient.column_mut(v[0]).axpy(-T::one() / length, &s, T::one());
        gradient.column_mut(v[1]).axpy(T::one() / length, &s, T::one());
        Ok(())
    }
}

impl<T: Real> ElementIntegrand<T> for Area {
    fn grade(&self) -> Grade {
        2
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        element.check_grade(2)?;
        let v = element.vertices();
        let (x0, x1, x2) = (vertex3(mesh, v[0])?, vertex3(mesh, v[1])?, vertex3(mesh, v[2])?);
        Ok(0.5 * (x1 - x0).cross(&(x2 - x1)).norm())
    }
}

impl<T: Real> ElementGradient<T> for Area {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        element.check_grade(2)?;
        let v = element.vertices();
        let (x0, x1, x2) = (vertex3(mesh, v[0])?, vertex3(mesh, v[1])?, vertex3(mesh, v[2])?);
        let s0 = x1 - x0;
        let s1 = x2 - x1;
        let n = s0.cross(&s1);
        let norm = n.norm();
        if norm < degeneracy_threshold() {
            return Err(FunctionalError::Degenerate {
                grade: 2,
                element: element.id(),
            });
        }

        let g0 = n.cross(&s1) * (0.5 / norm);
        let g2 = n.cross(&s0) * (0.5 / norm);
        let g1 = -(g0 + g2);
        add_to_column(gradient, v[0], 1.0, &g0);
        add_to_column(gradient, v[1], 1.0, &g1);
        add_to_column(gradient, v[2], 1.0, &g2);
        Ok(())
    }
}

impl<T: Real> ElementIntegrand<T> for AreaEnclosed {
    fn grade(&self) -> Grade {
        1
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        element.check_grade(1)?;
        let v = element.vertices();
        let (x0, x1) = (vertex3(mesh, v[0])?, vertex3(mesh, v[1])?);
        Ok(0.5 * x0.cross(&x1).norm())
    }
}

impl<T: Real> ElementGradient<T> for AreaEnclosed {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        element.check_grade(1)?;
        let v = element.vertices();
        let (x0, x1) = (vertex3(mesh, v[0])?, vertex3(mesh, v[1])?);
        let cx = x0.cross(&x1);
        let norm = cx.norm();
        if norm < degeneracy_threshold() {
            return Err(FunctionalError::Degenerate {
                grade: 1,
                element: element.id(),
            });
        }
        add_to_column(gradient, v[0], 0.5 / norm, &x1.cross(&cx));
        add_to_column(gradient, v[1], 0.5 / norm, &cx.cross(&x0));
        Ok(())
    }
}

impl<T: Real> ElementIntegrand<T> for Volume {
    fn grade(&self) -> Grade {
        3
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        element.check_grade(3)?;
        let v = element.vertices();
        let x0 = vertex3(mesh, v[0])?;
        let s10 = vertex3(mesh, v[1])? - x0;
        let s20 = vertex3(mesh, v[2])? - x0;
        let s30 = vertex3(mesh, v[3])? - x0;
        Ok(s10.dot(&s20.cross(&s30)).abs() / 6.0)
    }
}

impl<T: Real> ElementGradient<T> for Volume {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        element.check_grade(3)?;
        let v = element.vertices();
        let x: Vec<_> = v.iter().map(|&i| vertex3(mesh, i)).collect::<Result<_, _>>()?;
        let s10 = x[1] - x[0];
        let s20 = x[2] - x[0];
        let s30 = x[3] - x[0];
        let s21 = x[2] - x[1];
        let s31 = x[3] - x[1];
        let cx = s20.cross(&s30);
        let scale = sign(s10.dot(&cx)) / 6.0;

        add_to_column(gradient, v[0], scale, &s31.cross(&s21));
        add_to_column(gradient, v[1], scale, &cx);
        add_to_column(gradient, v[2], scale, &s30.cross(&s10));
        add_to_column(gradient, v[3], scale, &s10.cross(&s20));
        Ok(())
    }
}

impl<T: Real> ElementIntegrand<T> for VolumeEnclosed {
    fn grade(&self) -> Grade {
        2
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn evaluate(&self, mesh: &SimplicialMesh<T>, element: Element<'_>) -> Result<T, FunctionalError> {
        element.check_grade(2)?;
        let v = element.vertices();
        let (x0, x1, x2) = (vertex3(mesh, v[0])?, vertex3(mesh, v[1])?, vertex3(mesh, v[2])?);
        Ok(x0.cross(&x1).dot(&x2).abs() / 6.0)
    }
}

impl<T: Real> ElementGradient<T> for VolumeEnclosed {
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn accumulate_gradient(
        &self,
        mesh: &SimplicialMesh<T>,
        element: Element<'_>,
        gradient: &mut DMatrix<T>,
    ) -> Result<(), FunctionalError> {
        element.check_grade(2)?;
        let v = element.vertices();
        let (x0, x1, x2) = (vertex3(mesh, v[0])?, vertex3(mesh, v[1])?, vertex3(mesh, v[2])?);
        let cx = x0.cross(&x1);
        let scale = sign(cx.dot(&x2)) / 6.0;

        add_to_column(gradient, v[0], scale, &x1.cross(&x2));
        add_to_column(gradient, v[1], scale, &x2.cross(&x0));
        add_to_column(gradient, v[2], scale, &cx);
        Ok(())
    }
}
