//! Error types.
use crate::Grade;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Errors raised while evaluating a functional or its gradient.
#[derive(Debug)]
pub enum FunctionalError {
    /// The mesh does not hold the incidence between elements of grade `from` and grade `to`.
    MissingRelation { from: Grade, to: Grade },
    /// The grade is not one a mesh can hold.
    InvalidGrade(Grade),
    /// The field holds no entry for the requested element.
    MissingFieldElement { grade: Grade, element: usize },
    /// An element does not have the number of vertices its grade requires.
    WrongVertexCount { grade: Grade, expected: usize, found: usize },
    /// The integrand has no implementation for vertices of this spatial dimension.
    UnsupportedDimension(usize),
    /// A gradient (or a normalization) is undefined because the element is degenerate.
    Degenerate { grade: Grade, element: usize },
    /// The reference configuration of an element is singular.
    SingularReference { grade: Grade, element: usize },
    /// An element references a vertex that does not exist in the reference mesh.
    ReferenceMismatch { vertex: usize, num_reference_vertices: usize },
    /// The integrand provides no analytic gradient.
    NoAnalyticGradient,
    /// A user supplied callback failed.
    Callback(eyre::Report),
    /// A user supplied gradient callback returned a vector of the wrong length.
    CallbackShape { expected: usize, found: usize },
}

impl Display for FunctionalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::MissingRelation { from, to } => {
                write!(f, "Mesh has no incidence from grade {} to grade {}.", from, to)
            }
            Self::InvalidGrade(grade) => write!(f, "Invalid element grade {}.", grade),
            Self::MissingFieldElement { grade, element } => {
                write!(f, "Field has no entry for element {} of grade {}.", element, grade)
            }
            Self::WrongVertexCount { grade, expected, found } => write!(
                f,
                "Element of grade {} must have {} vertices, but has {}.",
                grade, expected, found
            ),
            Self::UnsupportedDimension(dim) => write!(f, "Unsupported spatial dimension {}.", dim),
            Self::Degenerate { grade, element } => {
                write!(f, "Element {} of grade {} is degenerate.", element, grade)
            }
            Self::SingularReference { grade, element } => write!(
                f,
                "Reference configuration of element {} of grade {} is singular.",
                element, grade
            ),
            Self::ReferenceMismatch {
                vertex,
                num_reference_vertices,
            } => write!(
                f,
                "Vertex {} does not exist in the reference mesh ({} vertices).",
                vertex, num_reference_vertices
            ),
            Self::NoAnalyticGradient => write!(f, "Integrand has no analytic gradient."),
            Self::Callback(err) => write!(f, "Callback failed. Error: {}", err),
            Self::CallbackShape { expected, found } => write!(
                f,
                "Callback returned a vector of length {}, expected {}.",
                found, expected
            ),
        }
    }
}

impl Error for FunctionalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Callback(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Errors raised while building or modifying a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    InvalidGrade(Grade),
    WrongVertexCount { grade: Grade, expected: usize, found: usize },
    VertexOutOfBounds { vertex: usize, num_vertices: usize },
    RepeatedVertex { grade: Grade, element: usize },
    ElementOutOfBounds { grade: Grade, element: usize, num_elements: usize },
    /// The mesh holds elements of a higher grade, but not of the grade directly above.
    MissingGrade(Grade),
}

impl Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            Self::InvalidGrade(grade) => write!(f, "Invalid element grade {}.", grade),
            Self::WrongVertexCount { grade, expected, found } => write!(
                f,
                "Element of grade {} must have {} vertices, but has {}.",
                grade, expected, found
            ),
            Self::VertexOutOfBounds { vertex, num_vertices } => {
                write!(f, "Vertex index {} out of bounds ({} vertices).", vertex, num_vertices)
            }
            Self::RepeatedVertex { grade, element } => {
                write!(f, "Element {} of grade {} repeats a vertex.", element, grade)
            }
            Self::ElementOutOfBounds {
                grade,
                element,
                num_elements,
            } => write!(
                f,
                "Element index {} of grade {} out of bounds ({} elements).",
                element, grade, num_elements
            ),
            Self::MissingGrade(grade) => write!(f, "Mesh holds no elements of grade {}.", grade),
        }
    }
}

impl Error for MeshError {}
