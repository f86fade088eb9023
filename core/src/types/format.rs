use crate::error::{Result, SkullStripError};
use std::fmt;
use std::path::Path;

/// Supported volume file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeFormat {
    /// MINC 1 (NetCDF classic)
    Minc,
}

impl VolumeFormat {
    /// Selects the format from the file extension, case-insensitively
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();

        if extension.eq_ignore_ascii_case("mnc") {
            Ok(VolumeFormat::Minc)
        } else {
            Err(SkullStripError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            })
        }
    }

    /// Extension used for files written in this format
    pub fn extension(&self) -> &'static str {
        match self {
            VolumeFormat::Minc => "mnc",
        }
    }
}

impl fmt::Display for VolumeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VolumeFormat::Minc => write!(f, "MINC"),
        }
    }
}

/// Supported surface mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeshFormat {
    /// Legacy ASCII VTK polydata
    #[default]
    VtkLegacy,
}

impl MeshFormat {
    /// Extension used for files written in this format
    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::VtkLegacy => "vtk",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("subject01.mnc")]
    #[case("/data/SUBJECT01.MNC")]
    #[case("a.b.Mnc")]
    fn test_minc_extensions(#[case] path: &str) {
        assert_eq!(
            VolumeFormat::from_path(Path::new(path)).unwrap(),
            VolumeFormat::Minc
        );
    }

    #[rstest]
    #[case("brain.nii", "nii")]
    #[case("brain.mnc.gz", "gz")]
    #[case("brain", "")]
    fn test_unsupported_extensions(#[case] path: &str, #[case] ext: &str) {
        match VolumeFormat::from_path(Path::new(path)) {
            Err(SkullStripError::UnsupportedFormat { extension, .. }) => assert_eq!(extension, ext),
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_extensions() {
        assert_eq!(VolumeFormat::Minc.extension(), "mnc");
        assert_eq!(MeshFormat::VtkLegacy.extension(), "vtk");
    }
}
