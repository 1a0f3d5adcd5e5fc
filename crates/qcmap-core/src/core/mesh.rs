//! Triangulated surface connectivity.
//!
//! The line search never touches vertex positions directly; it only needs the
//! face list (for the self-intersection test) and the boundary vertex set
//! (for unit-disk clipping). [`SurfaceMesh`] bundles the two together with
//! the vertex count so index validity can be checked once, at construction.

use std::collections::HashMap;

use crate::core::error::{MappingError, Result};

/// Connectivity of a triangulated surface patch.
///
/// Vertices are identified by their index in the per-vertex vectors
/// (coefficient field, mapping). Faces are triples of vertex indices with
/// consistent winding; boundary vertices are those the mapping must keep on
/// or inside the unit disk.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    num_vertices: usize,
    faces: Vec<[usize; 3]>,
    boundary: Vec<usize>,
}

impl SurfaceMesh {
    /// Creates a mesh from an explicit face list and boundary vertex list.
    ///
    /// # Errors
    ///
    /// Returns [`MappingError::InvalidMesh`] if the face list is empty, a
    /// face references a vertex outside `0..num_vertices`, a face repeats a
    /// vertex, or a boundary index is out of range.
    pub fn new(
        num_vertices: usize,
        faces: Vec<[usize; 3]>,
        boundary: Vec<usize>,
    ) -> Result<Self> {
        if faces.is_empty() {
            return Err(MappingError::invalid_mesh("face list is empty"));
        }
        for (f, face) in faces.iter().enumerate() {
            for &v in face {
                if v >= num_vertices {
                    return Err(MappingError::invalid_mesh(format!(
                        "face {f} references vertex {v}, but the mesh has {num_vertices} vertices"
                    )));
                }
            }
            if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
                return Err(MappingError::invalid_mesh(format!(
                    "face {f} is degenerate: {face:?}"
                )));
            }
        }
        for &v in &boundary {
            if v >= num_vertices {
                return Err(MappingError::invalid_mesh(format!(
                    "boundary vertex {v} is out of range for {num_vertices} vertices"
                )));
            }
        }
        Ok(Self {
            num_vertices,
            faces,
            boundary,
        })
    }

    /// Creates a mesh and derives the boundary vertex list from connectivity.
    ///
    /// An edge that belongs to exactly one face is a boundary edge; its two
    /// endpoints are boundary vertices. The derived list is sorted and
    /// deduplicated.
    pub fn with_detected_boundary(num_vertices: usize, faces: Vec<[usize; 3]>) -> Result<Self> {
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for face in &faces {
            for (a, b) in [
                (face[0], face[1]),
                (face[1], face[2]),
                (face[2], face[0]),
            ] {
                let key = if a < b { (a, b) } else { (b, a) };
                *edge_count.entry(key).or_insert(0) += 1;
            }
        }

        let mut boundary: Vec<usize> = edge_count
            .iter()
            .filter(|(_, &count)| count == 1)
            .flat_map(|(&(a, b), _)| [a, b])
            .collect();
        boundary.sort_unstable();
        boundary.dedup();

        Self::new(num_vertices, faces, boundary)
    }

    /// The number of vertices in the mesh.
    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    /// The number of faces in the mesh.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// The triangle face list.
    pub fn faces(&self) -> &[[usize; 3]] {
        &self.faces
    }

    /// The boundary vertex indices.
    pub fn boundary_vertices(&self) -> &[usize] {
        &self.boundary
    }
}
