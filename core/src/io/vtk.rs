//! Legacy ASCII VTK polydata writer

use crate::error::{Result, SkullStripError};
use crate::types::Mesh;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "# vtk DataFile Version 3.0";
const TITLE: &str = "skullstrip brain surface";

/// Writes `mesh` as legacy ASCII VTK polydata, overwriting `path`
///
/// # Errors
///
/// Returns `InvalidMesh` for an empty or inconsistent mesh and `Io` if
/// the file cannot be written.
pub fn write_mesh(mesh: &Mesh, path: &Path) -> Result<()> {
    mesh.validate()?;
    let file = File::create(path).map_err(|e| SkullStripError::io("creating", path, e))?;
    let mut writer = BufWriter::new(file);
    encode(mesh, &mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| SkullStripError::io("writing", path, e))?;
    info!(
        "Wrote mesh ({} vertices, {} triangles) to {}",
        mesh.vertex_count(),
        mesh.face_count(),
        path.display()
    );
    Ok(())
}

/// Serializes the polydata body
pub fn encode<W: Write>(mesh: &Mesh, out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", HEADER)?;
    writeln!(out, "{}", TITLE)?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET POLYDATA")?;
    writeln!(out, "POINTS {} float", mesh.vertex_count())?;
    for v in &mesh.vertices {
        writeln!(out, "{} {} {}", v[0] as f32, v[1] as f32, v[2] as f32)?;
    }
    writeln!(
        out,
        "POLYGONS {} {}",
        mesh.face_count(),
        mesh.face_count() * 4
    )?;
    for [a, b, c] in &mesh.faces {
        writeln!(out, "3 {} {} {}", a, b, c)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn triangle_pair() -> Mesh {
        Mesh::new(
            vec![
                [0.0, 0.0, 0.0],
                [1.5, 0.0, 0.0],
                [0.0, 2.0, 0.0],
                [0.0, 0.0, -3.25],
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_encode_layout() {
        let mut buf = Vec::new();
        encode(&triangle_pair(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "# vtk DataFile Version 3.0");
        assert_eq!(lines[2], "ASCII");
        assert_eq!(lines[3], "DATASET POLYDATA");
        assert_eq!(lines[4], "POINTS 4 float");
        assert_eq!(lines[6], "1.5 0 0");
        assert_eq!(lines[8], "0 0 -3.25");
        assert_eq!(lines[9], "POLYGONS 2 8");
        assert_eq!(lines[10], "3 0 1 2");
        assert_eq!(lines[11], "3 0 2 3");
        assert_eq!(lines.len(), 12);
    }

    #[test]
    fn test_write_mesh_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("brain_mesh.vtk");
        std::fs::write(&path, "stale contents that are longer than nothing").unwrap();

        write_mesh(&triangle_pair(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# vtk DataFile Version 3.0\n"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn test_write_rejects_empty_mesh() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.vtk");
        assert!(matches!(
            write_mesh(&Mesh::default(), &path),
            Err(SkullStripError::InvalidMesh(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_write_to_missing_directory() {
        let err = write_mesh(&triangle_pair(), Path::new("/nonexistent/dir/mesh.vtk")).unwrap_err();
        assert!(matches!(err, SkullStripError::Io { .. }));
    }
}
