use crate::error::Result;
use crate::extraction::BrainExtractor;
use crate::io;
use crate::types::{ExtractionParameters, MeshFormat, VolumeFormat, VolumeGeometry};
use log::info;
use std::path::{Path, PathBuf};

/// Options for a single pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory the mesh and segmented volume are written to
    pub output_dir: PathBuf,
    /// Format of the surface mesh output
    pub mesh_format: MeshFormat,
}

impl RunOptions {
    /// Creates options writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            mesh_format: MeshFormat::default(),
        }
    }
}

impl Default for RunOptions {
    /// Writes into the current working directory
    fn default() -> Self {
        Self::new(".")
    }
}

/// Output file locations derived from the input file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub mesh: PathBuf,
    pub segmented: PathBuf,
}

impl OutputPaths {
    /// Derives `<base>_mesh.<ext>` and `<base>_seg.<ext>` inside `output_dir`
    ///
    /// The base name is the last path segment of `input` truncated at its
    /// first period, so `a.b.mnc` gives `a`.
    ///
    /// # Example
    ///
    /// ```
    /// use skullstrip_core::{MeshFormat, OutputPaths, VolumeFormat};
    /// use std::path::Path;
    ///
    /// let paths = OutputPaths::derive(
    ///     Path::new("/data/subject01.mnc"),
    ///     Path::new(""),
    ///     VolumeFormat::Minc,
    ///     MeshFormat::VtkLegacy,
    /// );
    /// assert_eq!(paths.mesh, Path::new("subject01_mesh.vtk"));
    /// assert_eq!(paths.segmented, Path::new("subject01_seg.mnc"));
    /// ```
    pub fn derive(
        input: &Path,
        output_dir: &Path,
        volume_format: VolumeFormat,
        mesh_format: MeshFormat,
    ) -> Self {
        let base = base_name(input);
        Self {
            mesh: output_dir.join(format!("{}_mesh.{}", base, mesh_format.extension())),
            segmented: output_dir.join(format!("{}_seg.{}", base, volume_format.extension())),
        }
    }
}

/// Last path segment truncated at the first period
pub fn base_name(input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.split('.').next().unwrap_or_default().to_string()
}

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub input: PathBuf,
    pub format: VolumeFormat,
    pub geometry: VolumeGeometry,
    pub parameters: ExtractionParameters,
    pub extractor: String,
    pub outputs: OutputPaths,
    pub mesh_vertices: usize,
    pub mesh_faces: usize,
    pub brain_voxels: usize,
}

/// Runs the whole pipeline: read, extract, write mesh, write volume
///
/// # Errors
///
/// Returns `UnsupportedFormat` for unknown extensions, `Io`/`Format` when
/// reading or writing fails, and whatever the extractor reports.
pub fn run(input: &Path, options: &RunOptions, extractor: &dyn BrainExtractor) -> Result<RunReport> {
    let format = VolumeFormat::from_path(input)?;
    info!("Reading {} volume {}", format, input.display());
    let volume = io::read_volume(format, input)?;

    let geometry = *volume.geometry();
    let parameters = ExtractionParameters::for_z_spacing(geometry.z_spacing());
    info!(
        "Running {} extractor with {} (z spacing {})",
        extractor.name(),
        parameters,
        geometry.z_spacing()
    );
    let extraction = extractor.extract(&volume, &parameters)?;

    let outputs = OutputPaths::derive(input, &options.output_dir, format, options.mesh_format);
    io::write_mesh(options.mesh_format, &extraction.mesh, &outputs.mesh)?;
    io::write_volume(format, &extraction.segmented, &outputs.segmented)?;

    Ok(RunReport {
        input: input.to_path_buf(),
        format,
        geometry,
        parameters,
        extractor: extractor.name().to_string(),
        outputs,
        mesh_vertices: extraction.mesh.vertex_count(),
        mesh_faces: extraction.mesh.face_count(),
        brain_voxels: extraction.segmented.brain_voxel_count(),
    })
}
