use crate::api::RunReport;
use std::fmt;

/// Text report formatter for a pipeline run
pub struct TextReport<'a> {
    report: &'a RunReport,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(report: &'a RunReport) -> Self {
        Self { report }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.report;
        writeln!(f, "Skull Stripping")?;
        writeln!(f, "===============")?;
        writeln!(f)?;
        writeln!(f, "Input:          {}", r.input.display())?;
        writeln!(f, "Format:         {}", r.format)?;
        writeln!(f, "Geometry:       {}", r.geometry)?;
        writeln!(f, "Extractor:      {}", r.extractor)?;
        writeln!(f, "Parameters:     {}", r.parameters)?;
        writeln!(f)?;

        writeln!(f, "Outputs")?;
        writeln!(f, "-------")?;
        writeln!(
            f,
            "Mesh:           {} ({} vertices, {} triangles)",
            r.outputs.mesh.display(),
            r.mesh_vertices,
            r.mesh_faces
        )?;
        writeln!(f, "Segmented:      {}", r.outputs.segmented.display())?;
        writeln!(
            f,
            "Brain Voxels:   {} of {}",
            r.brain_voxels,
            r.geometry.voxel_count()
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OutputPaths;
    use crate::types::{ExtractionParameters, VolumeFormat, VolumeGeometry};
    use std::path::PathBuf;

    #[test]
    fn test_text_report_format() {
        let report = RunReport {
            input: PathBuf::from("/data/subject01.mnc"),
            format: VolumeFormat::Minc,
            geometry: VolumeGeometry::new([181, 217, 181], [1.0, 1.0, 2.0], [-90.0, -126.0, -72.0]),
            parameters: ExtractionParameters::for_z_spacing(2.0),
            extractor: "surface-evolution".to_string(),
            outputs: OutputPaths {
                mesh: PathBuf::from("subject01_mesh.vtk"),
                segmented: PathBuf::from("subject01_seg.mnc"),
            },
            mesh_vertices: 2562,
            mesh_faces: 5120,
            brain_voxels: 1_200_000,
        };

        let output = format!("{}", TextReport::new(&report));

        assert!(output.contains("Skull Stripping"));
        assert!(output.contains("Input:          /data/subject01.mnc"));
        assert!(output.contains("Format:         MINC"));
        assert!(output.contains("181x217x181 voxels"));
        assert!(output.contains("BT=0.50"));
        assert!(output.contains("Mesh:           subject01_mesh.vtk (2562 vertices, 5120 triangles)"));
        assert!(output.contains("Segmented:      subject01_seg.mnc"));
        assert!(output.contains("Brain Voxels:   1200000 of 7109137"));
    }
}
