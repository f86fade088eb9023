use crate::error::{Result, SkullStripError};

/// Closed triangulated surface in world (mm) coordinates
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub vertices: Vec<[f64; 3]>,
    pub faces: Vec<[usize; 3]>,
}

impl Mesh {
    /// Creates a new Mesh
    pub fn new(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Checks that the mesh is non-empty and every face index is in range
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.faces.is_empty() {
            return Err(SkullStripError::InvalidMesh(format!(
                "empty mesh ({} vertices, {} faces)",
                self.vertices.len(),
                self.faces.len()
            )));
        }
        let n = self.vertices.len();
        if let Some((f, face)) = self
            .faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.iter().any(|&v| v >= n))
        {
            return Err(SkullStripError::InvalidMesh(format!(
                "face {} references vertex out of range: {:?} (have {})",
                f, face, n
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tetrahedron() -> Mesh {
        Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 1.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
        )
    }

    #[test]
    fn test_valid_mesh() {
        let mesh = tetrahedron();
        assert!(mesh.validate().is_ok());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 4);
    }

    #[test]
    fn test_out_of_range_face() {
        let mut mesh = tetrahedron();
        mesh.faces.push([0, 1, 4]);
        assert!(matches!(mesh.validate(), Err(SkullStripError::InvalidMesh(_))));
    }

    #[test]
    fn test_empty_mesh() {
        assert!(Mesh::default().validate().is_err());
    }
}
