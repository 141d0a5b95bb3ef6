//! Mesh ingestion
//!
//! Turns the vertex and face buffers handed over by the geometry generator
//! into the flat triangle buffer the tree is built over. Vertex indices are
//! validated here, once, so nothing downstream re-checks them.

use crate::foundation::math::Vec3;
use crate::physics::collision::Triangle;

/// Mesh ingestion errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A face references a vertex past the end of the vertex buffer
    #[error("face {face} references vertex {index}, but the mesh has {vertex_count} vertices")]
    VertexIndexOutOfRange {
        /// Position of the offending face in the face buffer
        face: usize,
        /// The out-of-range vertex index
        index: u32,
        /// Length of the vertex buffer
        vertex_count: usize,
    },
}

/// Triangle buffer produced from indexed geometry
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    skipped_faces: usize,
    truncated_faces: usize,
}

impl TriangleMesh {
    /// Build from index faces, one triangle per face
    ///
    /// Each face contributes the triangle on its first three indices, so
    /// triangle `i` always comes from face `i` of the faces kept. Faces with
    /// fewer than 3 indices are skipped; indices past the third are ignored
    /// and never looked up. Callers holding polygons triangulate them first.
    pub fn from_faces<F>(vertices: &[Vec3], faces: &[F]) -> Result<Self, MeshError>
    where
        F: AsRef<[u32]>,
    {
        let mut triangles = Vec::with_capacity(faces.len());
        let mut skipped_faces = 0;
        let mut truncated_faces = 0;

        for (face_index, face) in faces.iter().enumerate() {
            let face = face.as_ref();
            let [a, b, c, ..] = face else {
                skipped_faces += 1;
                continue;
            };
            if face.len() > 3 {
                truncated_faces += 1;
            }

            triangles.push(Triangle::new(
                lookup(vertices, face_index, *a)?,
                lookup(vertices, face_index, *b)?,
                lookup(vertices, face_index, *c)?,
            ));
        }

        if skipped_faces > 0 {
            log::warn!("Skipped {} faces with fewer than 3 indices", skipped_faces);
        }
        if truncated_faces > 0 {
            log::debug!("Ignored indices past the third in {} faces", truncated_faces);
        }
        log::debug!(
            "Ingested {} triangles from {} faces over {} vertices",
            triangles.len(),
            faces.len(),
            vertices.len()
        );

        Ok(Self { triangles, skipped_faces, truncated_faces })
    }

    /// Build from a flat index buffer of triangle triples
    ///
    /// A trailing partial triple is skipped.
    pub fn from_indices(vertices: &[Vec3], indices: &[u32]) -> Result<Self, MeshError> {
        let faces: Vec<&[u32]> = indices.chunks(3).collect();
        Self::from_faces(vertices, &faces)
    }

    /// Wrap an existing triangle buffer
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles, skipped_faces: 0, truncated_faces: 0 }
    }

    /// The ingested triangles, in face order
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of faces dropped for having fewer than 3 indices
    pub fn skipped_faces(&self) -> usize {
        self.skipped_faces
    }

    /// Number of faces with more than 3 indices, of which only the first
    /// three were used
    pub fn truncated_faces(&self) -> usize {
        self.truncated_faces
    }

    /// Number of triangles
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Take the triangle buffer
    pub fn into_triangles(self) -> Vec<Triangle> {
        self.triangles
    }
}

fn lookup(vertices: &[Vec3], face: usize, index: u32) -> Result<Vec3, MeshError> {
    vertices
        .get(index as usize)
        .copied()
        .ok_or(MeshError::VertexIndexOutOfRange {
            face,
            index,
            vertex_count: vertices.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_vertices() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_triangle_faces() {
        let faces: Vec<Vec<u32>> = vec![vec![0, 1, 2], vec![0, 2, 3]];
        let mesh = TriangleMesh::from_faces(&quad_vertices(), &faces).expect("valid mesh");
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.triangles()[1].vertices()[2], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.skipped_faces(), 0);
    }

    #[test]
    fn test_short_faces_are_skipped() {
        let faces: Vec<Vec<u32>> = vec![vec![0, 1], vec![0, 1, 2], vec![], vec![3]];
        let mesh = TriangleMesh::from_faces(&quad_vertices(), &faces).expect("valid mesh");
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.skipped_faces(), 3);
    }

    #[test]
    fn test_long_face_uses_first_three_indices() {
        let faces: Vec<Vec<u32>> = vec![vec![0, 1, 2, 3]];
        let mesh = TriangleMesh::from_faces(&quad_vertices(), &faces).expect("valid mesh");
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.truncated_faces(), 1);
        let [a, b, c] = *mesh.triangles()[0].vertices();
        assert_eq!((a, b, c), (quad_vertices()[0], quad_vertices()[1], quad_vertices()[2]));
    }

    #[test]
    fn test_indices_past_the_third_are_not_validated() {
        let faces: Vec<Vec<u32>> = vec![vec![0, 1, 2], vec![0, 1, 2, 99]];
        let mesh = TriangleMesh::from_faces(&quad_vertices(), &faces).expect("extra index ignored");
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.triangles()[0], mesh.triangles()[1]);
        assert_eq!(mesh.skipped_faces(), 0);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let faces: Vec<Vec<u32>> = vec![vec![0, 1, 2], vec![0, 2, 9]];
        let err = TriangleMesh::from_faces(&quad_vertices(), &faces).unwrap_err();
        assert_eq!(
            err,
            MeshError::VertexIndexOutOfRange { face: 1, index: 9, vertex_count: 4 }
        );
        assert!(err.to_string().contains("vertex 9"));
    }

    #[test]
    fn test_flat_indices_drop_partial_triple() {
        let mesh = TriangleMesh::from_indices(&quad_vertices(), &[0, 1, 2, 0, 2, 3, 1])
            .expect("valid mesh");
        assert_eq!(mesh.len(), 2);
        assert_eq!(mesh.skipped_faces(), 1);
    }

    #[test]
    fn test_degenerate_triangles_are_kept() {
        let vertices = vec![Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0];
        let mesh = TriangleMesh::from_indices(&vertices, &[0, 1, 2]).expect("valid mesh");
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.triangles()[0].normal(), Vec3::zeros());
    }

    #[test]
    fn test_empty_input() {
        let mesh = TriangleMesh::from_indices(&[], &[]).expect("empty is fine");
        assert!(mesh.is_empty());
        assert!(mesh.into_triangles().is_empty());
    }
}
