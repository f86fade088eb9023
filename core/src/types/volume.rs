use crate::error::{Result, SkullStripError};
use std::fmt;

/// Spatial layout of a voxel grid
///
/// Axes are ordered x, y, z. `spacing` is the signed step between
/// adjacent voxel centres and `origin` is the world position of voxel
/// (0, 0, 0), both in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeGeometry {
    pub dims: [usize; 3],
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
}

impl VolumeGeometry {
    /// Creates a new VolumeGeometry
    pub fn new(dims: [usize; 3], spacing: [f64; 3], origin: [f64; 3]) -> Self {
        Self {
            dims,
            spacing,
            origin,
        }
    }

    /// Total number of voxels
    pub fn voxel_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Linear index of voxel (i, j, k), x fastest
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + j * self.dims[0] + k * self.dims[0] * self.dims[1]
    }

    /// World position of the centre of voxel (i, j, k)
    pub fn world_position(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        [
            self.origin[0] + i as f64 * self.spacing[0],
            self.origin[1] + j as f64 * self.spacing[1],
            self.origin[2] + k as f64 * self.spacing[2],
        ]
    }

    /// Absolute voxel size along the z axis
    pub fn z_spacing(&self) -> f64 {
        self.spacing[2].abs()
    }

    /// Absolute voxel sizes along every axis
    pub fn voxel_size(&self) -> [f64; 3] {
        [
            self.spacing[0].abs(),
            self.spacing[1].abs(),
            self.spacing[2].abs(),
        ]
    }

    fn validate(&self) -> Result<()> {
        if self.dims.iter().any(|&d| d == 0) {
            return Err(SkullStripError::InvalidVolume(format!(
                "zero-length dimension in {:?}",
                self.dims
            )));
        }
        if self.spacing.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(SkullStripError::InvalidVolume(format!(
                "degenerate spacing {:?}",
                self.spacing
            )));
        }
        Ok(())
    }
}

impl fmt::Display for VolumeGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{}x{} voxels, spacing {} x {} x {} mm",
            self.dims[0],
            self.dims[1],
            self.dims[2],
            self.spacing[0],
            self.spacing[1],
            self.spacing[2]
        )
    }
}

/// On-disk storage type of the voxels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoxelType {
    Byte { signed: bool },
    Short { signed: bool },
    Int { signed: bool },
    Float,
    Double,
}

impl VoxelType {
    /// Returns whether this is an integer storage type
    pub fn is_integer(&self) -> bool {
        !matches!(self, VoxelType::Float | VoxelType::Double)
    }

    /// Returns whether the stored values are signed
    pub fn is_signed(&self) -> bool {
        match self {
            VoxelType::Byte { signed } | VoxelType::Short { signed } | VoxelType::Int { signed } => {
                *signed
            }
            VoxelType::Float | VoxelType::Double => true,
        }
    }

    /// Full representable range of the storage type
    pub fn full_range(&self) -> (f64, f64) {
        match *self {
            VoxelType::Byte { signed: true } => (i8::MIN as f64, i8::MAX as f64),
            VoxelType::Byte { signed: false } => (u8::MIN as f64, u8::MAX as f64),
            VoxelType::Short { signed: true } => (i16::MIN as f64, i16::MAX as f64),
            VoxelType::Short { signed: false } => (u16::MIN as f64, u16::MAX as f64),
            VoxelType::Int { signed: true } => (i32::MIN as f64, i32::MAX as f64),
            VoxelType::Int { signed: false } => (u32::MIN as f64, u32::MAX as f64),
            VoxelType::Float => (f32::MIN as f64, f32::MAX as f64),
            VoxelType::Double => (f64::MIN, f64::MAX),
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            VoxelType::Byte { signed: true } => "signed byte",
            VoxelType::Byte { signed: false } => "unsigned byte",
            VoxelType::Short { signed: true } => "signed short",
            VoxelType::Short { signed: false } => "unsigned short",
            VoxelType::Int { signed: true } => "signed int",
            VoxelType::Int { signed: false } => "unsigned int",
            VoxelType::Float => "float",
            VoxelType::Double => "double",
        }
    }
}

impl fmt::Display for VoxelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// A loaded 3D image: geometry plus real-valued intensities in x-fastest order
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    geometry: VolumeGeometry,
    voxel_type: VoxelType,
    data: Vec<f64>,
}

impl Volume {
    /// Creates a volume, checking that the data fills the geometry exactly
    ///
    /// # Errors
    ///
    /// Returns an error if a dimension is zero, the spacing is degenerate,
    /// or `data.len()` differs from the voxel count.
    pub fn new(geometry: VolumeGeometry, voxel_type: VoxelType, data: Vec<f64>) -> Result<Self> {
        geometry.validate()?;
        if data.len() != geometry.voxel_count() {
            return Err(SkullStripError::InvalidVolume(format!(
                "expected {} voxels for {:?}, got {}",
                geometry.voxel_count(),
                geometry.dims,
                data.len()
            )));
        }
        Ok(Self {
            geometry,
            voxel_type,
            data,
        })
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn voxel_type(&self) -> VoxelType {
        self.voxel_type
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Intensity at voxel (i, j, k)
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.geometry.index(i, j, k)]
    }
}

/// Extractor output on the input grid: brain mask and masked intensities
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentedVolume {
    geometry: VolumeGeometry,
    voxel_type: VoxelType,
    mask: Vec<u8>,
    data: Vec<f64>,
}

impl SegmentedVolume {
    /// Applies a binary mask (1 = brain) to the source volume
    ///
    /// # Errors
    ///
    /// Returns an error if the mask length differs from the voxel count.
    pub fn from_mask(source: &Volume, mask: Vec<u8>) -> Result<Self> {
        if mask.len() != source.geometry.voxel_count() {
            return Err(SkullStripError::InvalidVolume(format!(
                "mask has {} voxels, volume has {}",
                mask.len(),
                source.geometry.voxel_count()
            )));
        }
        let data = source
            .data
            .iter()
            .zip(&mask)
            .map(|(&v, &m)| if m != 0 { v } else { 0.0 })
            .collect();
        Ok(Self {
            geometry: source.geometry,
            voxel_type: source.voxel_type,
            mask,
            data,
        })
    }

    pub fn geometry(&self) -> &VolumeGeometry {
        &self.geometry
    }

    pub fn voxel_type(&self) -> VoxelType {
        self.voxel_type
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Masked intensities, 0 outside the brain
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Number of voxels labelled brain
    pub fn brain_voxel_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> VolumeGeometry {
        VolumeGeometry::new([4, 3, 2], [1.0, 1.0, -2.0], [-10.0, 0.0, 5.0])
    }

    #[test]
    fn test_index_is_x_fastest() {
        let g = geometry();
        assert_eq!(g.index(0, 0, 0), 0);
        assert_eq!(g.index(1, 0, 0), 1);
        assert_eq!(g.index(0, 1, 0), 4);
        assert_eq!(g.index(0, 0, 1), 12);
        assert_eq!(g.index(3, 2, 1), 23);
    }

    #[test]
    fn test_world_position_uses_signed_step() {
        let g = geometry();
        assert_eq!(g.world_position(2, 1, 1), [-8.0, 1.0, 3.0]);
        assert_eq!(g.z_spacing(), 2.0);
    }

    #[test]
    fn test_volume_rejects_wrong_length() {
        let result = Volume::new(geometry(), VoxelType::Float, vec![0.0; 5]);
        assert!(matches!(result, Err(SkullStripError::InvalidVolume(_))));
    }

    #[test]
    fn test_volume_rejects_zero_dimension() {
        let g = VolumeGeometry::new([0, 3, 2], [1.0; 3], [0.0; 3]);
        assert!(Volume::new(g, VoxelType::Float, vec![]).is_err());
    }

    #[test]
    fn test_segmented_volume_masks_intensities() {
        let data: Vec<f64> = (0..24).map(|v| v as f64 + 1.0).collect();
        let volume = Volume::new(geometry(), VoxelType::Short { signed: true }, data).unwrap();
        let mut mask = vec![0u8; 24];
        mask[5] = 1;
        mask[6] = 1;

        let seg = SegmentedVolume::from_mask(&volume, mask).unwrap();
        assert_eq!(seg.brain_voxel_count(), 2);
        assert_eq!(seg.data()[5], 6.0);
        assert_eq!(seg.data()[6], 7.0);
        assert_eq!(seg.data()[0], 0.0);
        assert_eq!(seg.geometry(), volume.geometry());
        assert_eq!(seg.voxel_type(), VoxelType::Short { signed: true });
    }

    #[test]
    fn test_full_range() {
        assert_eq!(VoxelType::Byte { signed: false }.full_range(), (0.0, 255.0));
        assert_eq!(
            VoxelType::Short { signed: true }.full_range(),
            (-32768.0, 32767.0)
        );
        assert!(!VoxelType::Double.is_integer());
    }
}
