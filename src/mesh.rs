//! Simplicial meshes with incidence relations between grades.
use crate::error::{FunctionalError, MeshError};
use crate::{Grade, MAX_GRADE};
use itertools::Itertools;
use log::debug;
use nalgebra::{DMatrix, DVectorView, Scalar};
use nalgebra_sparse::pattern::SparsityPattern;
use std::collections::{BTreeSet, HashMap};

pub mod procedural;

/// A mesh made of simplices of grades 0 through 3.
///
/// Vertex positions are stored as the columns of a $D \times N$ matrix. For every grade
/// $g \geq 1$ that the mesh holds, the element-to-vertex incidence is stored as a
/// [`SparsityPattern`] whose rows list the (sorted) vertex ids of each element, together with
/// its transpose, the vertex-to-element incidence.
///
/// The mesh may additionally record *identifications* per grade: pairs $(i, j)$ stating that
/// element $j$ is a symmetry image of element $i$, as used for periodic boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplicialMesh<T: Scalar> {
    vertices: DMatrix<T>,
    // Indexed by grade - 1
    element_vertices: [Option<SparsityPattern>; MAX_GRADE],
    vertex_elements: [Option<SparsityPattern>; MAX_GRADE],
    identifications: [BTreeSet<(usize, usize)>; MAX_GRADE + 1],
}

impl<T: Scalar> SimplicialMesh<T> {
    /// Creates a mesh with the given vertices (one per column) and no elements of positive grade.
    pub fn from_vertices(vertices: DMatrix<T>) -> Self {
        Self {
            vertices,
            element_vertices: Default::default(),
            vertex_elements: Default::default(),
            identifications: Default::default(),
        }
    }

    /// Creates a mesh with the given vertices and elements of a single grade.
    pub fn from_vertices_and_elements<I, E>(vertices: DMatrix<T>, grade: Grade, elements: I) -> Result<Self, MeshError>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<[usize]>,
    {
        let mut mesh = Self::from_vertices(vertices);
        mesh.add_elements(grade, elements)?;
        Ok(mesh)
    }

    /// Sets the elements of the given grade, replacing any elements of that grade the mesh
    /// already holds.
    ///
    /// Each element must list exactly `grade + 1` distinct vertex ids. The ids are stored in
    /// ascending order.
    pub fn add_elements<I, E>(&mut self, grade: Grade, elements: I) -> Result<(), MeshError>
    where
        I: IntoIterator<Item = E>,
        E: AsRef<[usize]>,
    {
        if grade == 0 || grade > MAX_GRADE {
            return Err(MeshError::InvalidGrade(grade));
        }

        let num_vertices = self.num_vertices();
        let mut offsets = vec![0];
        let mut indices = Vec::new();
        for (element_idx, element) in elements.into_iter().enumerate() {
            let element = element.as_ref();
            if element.len() != grade + 1 {
                return Err(MeshError::WrongVertexCount {
                    grade,
                    expected: grade + 1,
                    found: element.len(),
                });
            }
            if let Some(&vertex) = element.iter().find(|&&v| v >= num_vertices) {
                return Err(MeshError::VertexOutOfBounds { vertex, num_vertices });
            }

            let start = indices.len();
            indices.extend_from_slice(element);
            let lane = &mut indices[start..];
            lane.sort_unstable();
            if lane.windows(2).any(|w| w[0] == w[1]) {
                return Err(MeshError::RepeatedVertex {
                    grade,
                    element: element_idx,
                });
            }
            offsets.push(indices.len());
        }

        let num_elements = offsets.len() - 1;
        // Lanes are sorted, free of duplicates and in bounds, so the pattern is always valid
        let pattern = SparsityPattern::try_from_offsets_and_indices(num_elements, num_vertices, offsets, indices)
            .map_err(|_| MeshError::InvalidGrade(grade))?;
        debug!("Added {} elements of grade {} to mesh.", num_elements, grade);
        self.vertex_elements[grade - 1] = Some(pattern.transpose());
        self.element_vertices[grade - 1] = Some(pattern);
        self.identifications[grade].clear();
        Ok(())
    }

    /// Generates the elements of every grade below the highest grade the mesh holds, as the
    /// unique faces of the elements one grade above.
    ///
    /// Grades the mesh already holds are left untouched. Faces are numbered in the order they
    /// are first encountered.
    pub fn generate_lower_grades(&mut self) -> Result<(), MeshError> {
        let max_grade = self.max_grade();
        for grade in (1..max_grade).rev() {
            if self.element_vertices[grade - 1].is_some() {
                continue;
            }

            let upper = self.element_vertices[grade]
                .as_ref()
                .ok_or(MeshError::MissingGrade(grade + 1))?;

            let mut seen = BTreeSet::new();
            let mut faces = Vec::new();
            for element_idx in 0..upper.major_dim() {
                // Combinations of a sorted lane are themselves sorted
                for face in upper.lane(element_idx).iter().copied().combinations(grade + 1) {
                    if seen.insert(face.clone()) {
                        faces.push(face);
                    }
                }
            }
            self.add_elements(grade, faces)?;
        }
        Ok(())
    }

    /// The highest grade of elements held by the mesh, or 0 for a bare point set.
    pub fn max_grade(&self) -> Grade {
        (1..=MAX_GRADE)
            .rev()
            .find(|&grade| self.element_vertices[grade - 1].is_some())
            .unwrap_or(0)
    }

    /// Whether the mesh holds elements of the given grade. Vertices always count as held.
    pub fn has_grade(&self, grade: Grade) -> bool {
        match grade {
            0 => true,
            g if g <= MAX_GRADE => self.element_vertices[g - 1].is_some(),
            _ => false,
        }
    }

    /// Spatial dimension of the vertices.
    pub fn dim(&self) -> usize {
        self.vertices.nrows()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.ncols()
    }

    /// The number of elements of the given grade.
    pub fn num_elements(&self, grade: Grade) -> Result<usize, FunctionalError> {
        if grade == 0 {
            Ok(self.num_vertices())
        } else {
            self.element_vertices(grade).map(|pattern| pattern.major_dim())
        }
    }

    pub fn vertices(&self) -> &DMatrix<T> {
        &self.vertices
    }

    pub fn vertices_mut(&mut self) -> &mut DMatrix<T> {
        &mut self.vertices
    }

    /// The position of vertex `i`.
    ///
    /// # Panics
    ///
    /// Panics if the vertex index is out of bounds.
    pub fn vertex(&self, i: usize) -> DVectorView<T> {
        self.vertices.column(i)
    }

    /// Coordinate `k` of vertex `i`.
    pub fn vertex_coordinate(&self, k: usize, i: usize) -> T {
        self.vertices[(k, i)].clone()
    }

    pub fn set_vertex_coordinate(&mut self, k: usize, i: usize, value: T) {
        self.vertices[(k, i)] = value;
    }

    /// Element-to-vertex incidence of the given grade. Row $e$ lists the vertices of element $e$.
    pub fn element_vertices(&self, grade: Grade) -> Result<&SparsityPattern, FunctionalError> {
        match grade {
            0 => Err(FunctionalError::MissingRelation { from: 0, to: 0 }),
            g if g <= MAX_GRADE => self.element_vertices[g - 1]
                .as_ref()
                .ok_or(FunctionalError::MissingRelation { from: g, to: 0 }),
            g => Err(FunctionalError::InvalidGrade(g)),
        }
    }

    /// Vertex-to-element incidence of the given grade. Row $v$ lists the elements incident
    /// on vertex $v$, in ascending order.
    pub fn vertex_elements(&self, grade: Grade) -> Result<&SparsityPattern, FunctionalError> {
        match grade {
            0 => Err(FunctionalError::MissingRelation { from: 0, to: 0 }),
            g if g <= MAX_GRADE => self.vertex_elements[g - 1]
                .as_ref()
                .ok_or(FunctionalError::MissingRelation { from: 0, to: g }),
            g => Err(FunctionalError::InvalidGrade(g)),
        }
    }

    /// Records that element `image` of the given grade is a symmetry image of element `source`.
    pub fn identify(&mut self, grade: Grade, source: usize, image: usize) -> Result<(), MeshError> {
        if grade > MAX_GRADE {
            return Err(MeshError::InvalidGrade(grade));
        }
        let num_elements = self
            .num_elements(grade)
            .map_err(|_| MeshError::MissingGrade(grade))?;
        for element in [source, image] {
            if element >= num_elements {
                return Err(MeshError::ElementOutOfBounds {
                    grade,
                    element,
                    num_elements,
                });
            }
        }
        self.identifications[grade].insert((source, image));
        Ok(())
    }

    /// The identification pairs $(i, j)$ recorded for the given grade, in ascending order.
    ///
    /// Returns an empty set for grades above the maximum grade.
    pub fn identifications(&self, grade: Grade) -> &BTreeSet<(usize, usize)> {
        static EMPTY: BTreeSet<(usize, usize)> = BTreeSet::new();
        self.identifications.get(grade).unwrap_or(&EMPTY)
    }

    /// Derives identifications between elements of the given grade from the vertex
    /// identifications.
    ///
    /// When the vertices of an element, mapped through the vertex identifications, form another
    /// element of the mesh, that other element is recorded as a symmetry image of the first.
    /// Every vertex with images is mapped. A vertex with several images is tried with each of
    /// them, so an element may receive several images. Returns the number of newly recorded
    /// pairs.
    pub fn lift_vertex_identifications(&mut self, grade: Grade) -> Result<usize, MeshError> {
        if grade == 0 {
            return Ok(0);
        }
        let mut vertex_images: HashMap<usize, Vec<usize>> = HashMap::new();
        for &(source, image) in &self.identifications[0] {
            vertex_images.entry(source).or_default().push(image);
        }
        if vertex_images.is_empty() {
            return Ok(0);
        }

        let pairs = {
            let pattern = self
                .element_vertices(grade)
                .map_err(|_| MeshError::MissingGrade(grade))?;
            let element_lookup: HashMap<&[usize], usize> = (0..pattern.major_dim())
                .map(|element| (pattern.lane(element), element))
                .collect();

            let mut pairs = Vec::new();
            for element in 0..pattern.major_dim() {
                let lane = pattern.lane(element);
                let candidates = lane
                    .iter()
                    .map(|v| {
                        vertex_images
                            .get(v)
                            .cloned()
                            .unwrap_or_else(|| vec![*v])
                    })
                    .multi_cartesian_product();
                for mut mapped in candidates {
                    mapped.sort_unstable();
                    if mapped.as_slice() == lane {
                        continue;
                    }
                    if let Some(&image) = element_lookup.get(mapped.as_slice()) {
                        pairs.push((element, image));
                    }
                }
            }
            pairs
        };

        let set = &mut self.identifications[grade];
        let added = pairs.into_iter().filter(|&pair| set.insert(pair)).count();
        debug!("Lifted {} vertex identifications to grade {}.", added, grade);
        Ok(added)
    }
}
