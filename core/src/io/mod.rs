//! File formats: MINC volumes (over a NetCDF classic codec) and VTK meshes

pub mod minc;
pub mod netcdf;
pub mod vtk;

use crate::error::Result;
use crate::types::{Mesh, MeshFormat, SegmentedVolume, Volume, VolumeFormat};
use std::path::Path;

/// Reads a volume with the reader for `format`
pub fn read_volume(format: VolumeFormat, path: &Path) -> Result<Volume> {
    match format {
        VolumeFormat::Minc => minc::read_volume(path),
    }
}

/// Writes a segmented volume with the writer for `format`
pub fn write_volume(format: VolumeFormat, segmented: &SegmentedVolume, path: &Path) -> Result<()> {
    match format {
        VolumeFormat::Minc => minc::write_volume(segmented, path),
    }
}

/// Writes a mesh with the writer for `format`
pub fn write_mesh(format: MeshFormat, mesh: &Mesh, path: &Path) -> Result<()> {
    match format {
        MeshFormat::VtkLegacy => vtk::write_mesh(mesh, path),
    }
}
