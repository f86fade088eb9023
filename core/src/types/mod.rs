//! Core type definitions for the skull-stripping pipeline
//!
//! - [`Volume`] / [`VolumeGeometry`] / [`VoxelType`]: the loaded image
//! - [`SegmentedVolume`]: brain mask and masked intensities on the same grid
//! - [`Mesh`]: triangulated brain surface
//! - [`ExtractionParameters`]: the five extractor parameters
//! - [`VolumeFormat`] / [`MeshFormat`]: closed sets of supported file formats

mod format;
mod mesh;
mod parameters;
mod volume;

pub use format::{MeshFormat, VolumeFormat};
pub use mesh::Mesh;
pub use parameters::{brightness_threshold, ExtractionParameters};
pub use volume::{SegmentedVolume, Volume, VolumeGeometry, VoxelType};
