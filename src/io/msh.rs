use crate::mesh::SimplicialMesh;
use crate::{Grade, Real};
use eyre::{eyre, Context};
use log::{debug, warn};
use nalgebra::DMatrix;
use std::path::Path;

/// Loads a [`SimplicialMesh`] from a Gmsh MSH file at the given path.
///
/// See [`load_msh_from_bytes`].
pub fn load_msh_from_file<T, P>(file_path: P, dim: usize, grade: Grade) -> eyre::Result<SimplicialMesh<T>>
where
    T: Real,
    P: AsRef<Path>,
{
    let msh_bytes = std::fs::read(file_path).wrap_err("failed to read file")?;
    load_msh_from_bytes(&msh_bytes, dim, grade).wrap_err("failed to load mesh from msh file")
}

/// Loads a [`SimplicialMesh`] by parsing the given bytes as a Gmsh MSH file.
///
/// Vertices keep the first `dim` coordinates of the MSH nodes. Elements of the given grade
/// are read from the element blocks of the matching type (`Lin2`, `Tri3` or `Tet4`), and
/// blocks of other types are ignored. Lower grades are generated from the elements read.
pub fn load_msh_from_bytes<T>(bytes: &[u8], dim: usize, grade: Grade) -> eyre::Result<SimplicialMesh<T>>
where
    T: Real,
{
    if dim == 0 || dim > 3 {
        return Err(eyre!("vertex dimension must be 1, 2 or 3, got {}", dim));
    }
    let element_type = msh_element_type(grade)?;

    let mut msh_file = mshio::parse_msh_bytes(bytes).map_err(|e| eyre!("failed to parse msh file: {}", e))?;

    let msh_nodes = msh_file
        .data
        .nodes
        .take()
        .ok_or(eyre!("MSH file does not contain nodes"))?;
    let msh_elements = msh_file
        .data
        .elements
        .take()
        .ok_or(eyre!("MSH file does not contain elements"))?;

    let mut coordinates = Vec::new();
    for node_block in &msh_nodes.node_blocks {
        coordinates.extend(coordinates_from_node_block(node_block)?);
    }
    let num_vertices = coordinates.len();

    let mut elements = Vec::new();
    for element_block in &msh_elements.element_blocks {
        if element_block.element_type != element_type {
            continue;
        }
        elements.extend(elements_from_element_block(element_block, grade, num_vertices)?);
    }
    if elements.is_empty() {
        return Err(eyre!(
            "MSH file does not contain elements of the requested type ({:?})",
            element_type
        ));
    }
    debug!(
        "Read {} vertices and {} elements of grade {} from msh file.",
        num_vertices,
        elements.len(),
        grade
    );

    let vertices = DMatrix::from_fn(dim, num_vertices, |k, i| coordinates[i][k]);
    let vertices = vertices
        .iter()
        .map(|&x| T::from_f64(x).ok_or_else(|| eyre!("failed to convert node coordinate from f64 to mesh real type")))
        .collect::<eyre::Result<Vec<T>>>()?;
    let mut mesh = SimplicialMesh::from_vertices_and_elements(
        DMatrix::from_vec(dim, num_vertices, vertices),
        grade,
        elements,
    )?;
    mesh.generate_lower_grades()?;
    Ok(mesh)
}

fn msh_element_type(grade: Grade) -> eyre::Result<mshio::ElementType> {
    match grade {
        1 => Ok(mshio::ElementType::Lin2),
        2 => Ok(mshio::ElementType::Tri3),
        3 => Ok(mshio::ElementType::Tet4),
        _ => Err(eyre!("no MSH element type for elements of grade {}", grade)),
    }
}

fn coordinates_from_node_block<F, I>(node_block: &mshio::NodeBlock<u64, I, F>) -> eyre::Result<Vec<[f64; 3]>>
where
    F: mshio::MshFloatT,
    I: mshio::MshIntT,
{
    // Ensure that node tags are consecutive
    if node_block.node_tags.is_some() {
        return Err(eyre!("node block tags are not consecutive in msh file"));
    }

    node_block
        .nodes
        .iter()
        .map(|node| {
            let to_f64 = |x: F| {
                x.to_f64()
                    .ok_or_else(|| eyre!("failed to convert coordinate to f64"))
            };
            Ok::<_, eyre::Report>([to_f64(node.x)?, to_f64(node.y)?, to_f64(node.z)?])
        })
        .collect()
}

fn elements_from_element_block<I>(
    element_block: &mshio::ElementBlock<u64, I>,
    grade: Grade,
    num_vertices: usize,
) -> eyre::Result<Vec<Vec<usize>>>
where
    I: mshio::MshIntT,
{
    // Ensure that element tags are consecutive
    if element_block.element_tags.is_some() {
        return Err(eyre!("element block tags are not consecutive in msh file"));
    }

    if element_block.entity_dim.to_usize() != Some(grade) {
        warn!("Element block entity dimension does not match the element grade. Will be read as elements of grade {}.", grade);
    }

    element_block
        .elements
        .iter()
        .map(|element| {
            if element.nodes.len() < grade + 1 {
                return Err(eyre!("not enough nodes to initialize element"));
            }
            element.nodes[..=grade]
                .iter()
                .map(|&tag| {
                    // MSH node tags start at 1
                    (tag as usize)
                        .checked_sub(1)
                        .filter(|&v| v < num_vertices)
                        .ok_or_else(|| eyre!("element refers to nonexistent node {}", tag))
                })
                .collect()
        })
        .collect()
}
