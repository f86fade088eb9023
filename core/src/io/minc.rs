//! MINC 1 volume reader and writer
//!
//! A MINC 1 file is a NetCDF classic dataset with an `image` variable over
//! the spatial dimensions `xspace`, `yspace` and `zspace`. Each dimension
//! has a same-named scalar variable whose `step` and `start` attributes
//! give the voxel spacing and the world coordinate of the first voxel.
//!
//! Integer images are stored as voxel values that map to real values
//! through `valid_range` and the `image-min` / `image-max` variables:
//!
//! ```text
//! real = (voxel - vmin) / (vmax - vmin) * (imax - imin) + imin
//! ```

use super::netcdf::{Attribute, Dataset, Dimension, NcType, NcValues, Variable};
use crate::error::{Result, SkullStripError};
use crate::types::{SegmentedVolume, Volume, VolumeGeometry, VoxelType};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

const IMAGE: &str = "image";
const IMAGE_MIN: &str = "image-min";
const IMAGE_MAX: &str = "image-max";
const SPATIAL_DIMS: [&str; 3] = ["xspace", "yspace", "zspace"];
const MINC_VERSION: &str = "MINC Version    1.0";

/// Reads a MINC file completely into memory
///
/// # Errors
///
/// Returns `Io` if the file cannot be read and `Format` if it is not a
/// valid 3D MINC 1 volume.
pub fn read_volume(path: &Path) -> Result<Volume> {
    let bytes = fs::read(path).map_err(|e| SkullStripError::io("reading", path, e))?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    let dataset = Dataset::from_bytes(&bytes)?;
    let volume = volume_from_dataset(&dataset)?;
    info!(
        "Loaded {} ({}, {})",
        path.display(),
        volume.geometry(),
        volume.voxel_type()
    );
    Ok(volume)
}

/// Writes a segmented volume as MINC 1, overwriting any existing file
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn write_volume(segmented: &SegmentedVolume, path: &Path) -> Result<()> {
    let dataset = dataset_from_segmented(segmented);
    let bytes = dataset.to_bytes()?;
    fs::write(path, &bytes).map_err(|e| SkullStripError::io("writing", path, e))?;
    info!("Wrote segmented volume to {}", path.display());
    Ok(())
}

/// Interprets a decoded NetCDF dataset as a MINC volume
pub fn volume_from_dataset(dataset: &Dataset) -> Result<Volume> {
    let image = dataset
        .variable(IMAGE)
        .ok_or_else(|| SkullStripError::Format("missing 'image' variable".to_string()))?;

    let file_dims = dataset.dimension_names(image);
    let axis_of = spatial_axes(&file_dims)?;
    let file_lens: Vec<usize> = image
        .dim_ids
        .iter()
        .map(|&id| dataset.dimensions[id].len)
        .collect();

    let mut dims = [0usize; 3];
    let mut spacing = [1.0f64; 3];
    let mut origin = [0.0f64; 3];
    for (file_axis, &axis) in axis_of.iter().enumerate() {
        dims[axis] = file_lens[file_axis];
        let name = SPATIAL_DIMS[axis];
        match dataset.variable(name) {
            Some(var) => {
                spacing[axis] = var.attribute_f64("step").unwrap_or_else(|| {
                    warn!("'{}' has no step attribute, assuming 1.0", name);
                    1.0
                });
                origin[axis] = var.attribute_f64("start").unwrap_or(0.0);
            }
            None => warn!("missing dimension variable '{}', assuming unit step", name),
        }
    }

    let voxel_type = voxel_type(image)?;
    let raw = raw_values(&image.values, voxel_type);
    let real = if voxel_type.is_integer() {
        rescale(dataset, image, voxel_type, raw)?
    } else {
        raw
    };

    let geometry = VolumeGeometry::new(dims, spacing, origin);
    let mut data = vec![0.0; real.len()];
    let mut file_index = 0;
    let mut coords = [0usize; 3];
    for a in 0..file_lens[0] {
        coords[axis_of[0]] = a;
        for b in 0..file_lens[1] {
            coords[axis_of[1]] = b;
            for c in 0..file_lens[2] {
                coords[axis_of[2]] = c;
                data[geometry.index(coords[0], coords[1], coords[2])] = real[file_index];
                file_index += 1;
            }
        }
    }

    debug!(
        "MINC image dimensions {:?} mapped to axes {:?}",
        file_dims, axis_of
    );
    Volume::new(geometry, voxel_type, data)
}

/// Maps each image dimension (file order) to its x/y/z axis index
fn spatial_axes(file_dims: &[&str]) -> Result<[usize; 3]> {
    if file_dims.len() != 3 {
        return Err(SkullStripError::Format(format!(
            "expected a 3D image over {:?}, found dimensions {:?}",
            SPATIAL_DIMS, file_dims
        )));
    }
    let mut axes = [0usize; 3];
    let mut seen = [false; 3];
    for (i, name) in file_dims.iter().enumerate() {
        let axis = SPATIAL_DIMS
            .iter()
            .position(|d| d == name)
            .ok_or_else(|| {
                SkullStripError::Format(format!("unsupported image dimension '{}'", name))
            })?;
        if seen[axis] {
            return Err(SkullStripError::Format(format!(
                "dimension '{}' appears twice",
                name
            )));
        }
        seen[axis] = true;
        axes[i] = axis;
    }
    Ok(axes)
}

fn voxel_type(image: &Variable) -> Result<VoxelType> {
    let signtype = image.attribute_text("signtype");
    let signed = |default: bool| match signtype.as_deref() {
        Some(s) if s.starts_with("unsigned") => false,
        Some(s) if s.starts_with("signed") => true,
        _ => default,
    };
    match image.values.nc_type() {
        NcType::Byte => Ok(VoxelType::Byte {
            signed: signed(false),
        }),
        NcType::Short => Ok(VoxelType::Short {
            signed: signed(true),
        }),
        NcType::Int => Ok(VoxelType::Int {
            signed: signed(true),
        }),
        NcType::Float => Ok(VoxelType::Float),
        NcType::Double => Ok(VoxelType::Double),
        NcType::Char => Err(SkullStripError::Format(
            "char image data is not supported".to_string(),
        )),
    }
}

/// Stored values as f64, honouring the signedness of the voxel type
fn raw_values(values: &NcValues, voxel_type: VoxelType) -> Vec<f64> {
    let unsigned = !voxel_type.is_signed();
    match values {
        NcValues::Byte(v) if unsigned => v.iter().map(|&x| x as u8 as f64).collect(),
        NcValues::Short(v) if unsigned => v.iter().map(|&x| x as u16 as f64).collect(),
        NcValues::Int(v) if unsigned => v.iter().map(|&x| x as u32 as f64).collect(),
        other => other.to_f64_vec(),
    }
}

/// Applies valid_range / image-min / image-max scaling to integer voxels
fn rescale(
    dataset: &Dataset,
    image: &Variable,
    voxel_type: VoxelType,
    raw: Vec<f64>,
) -> Result<Vec<f64>> {
    let (image_min, image_max) = match (dataset.variable(IMAGE_MIN), dataset.variable(IMAGE_MAX)) {
        (Some(min), Some(max)) => (min, max),
        _ => return Ok(raw),
    };

    let (vmin, vmax) = match image.attribute("valid_range") {
        Some(attr) => {
            let range = attr.values.to_f64_vec();
            if range.len() != 2 {
                return Err(SkullStripError::Format(format!(
                    "valid_range has {} values",
                    range.len()
                )));
            }
            (range[0].min(range[1]), range[0].max(range[1]))
        }
        None => voxel_type.full_range(),
    };
    if vmax <= vmin {
        return Err(SkullStripError::Format(format!(
            "empty valid_range [{}, {}]",
            vmin, vmax
        )));
    }

    let mins = image_min.values.to_f64_vec();
    let maxs = image_max.values.to_f64_vec();
    for scale in [image_min, image_max] {
        let is_prefix = scale.dim_ids.len() <= image.dim_ids.len()
            && scale.dim_ids == image.dim_ids[..scale.dim_ids.len()];
        if !is_prefix {
            return Err(SkullStripError::Format(format!(
                "'{}' dimensions are not a prefix of the image dimensions",
                scale.name
            )));
        }
    }
    if mins.is_empty() || mins.len() != maxs.len() || raw.len() % mins.len() != 0 {
        return Err(SkullStripError::Format(format!(
            "inconsistent image-min/image-max lengths ({} / {})",
            mins.len(),
            maxs.len()
        )));
    }

    let per_slice = raw.len() / mins.len();
    debug!(
        "Rescaling {} voxels with {} slice range(s), valid range [{}, {}]",
        raw.len(),
        mins.len(),
        vmin,
        vmax
    );
    Ok(raw
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let s = i / per_slice;
            if mins[s] == vmin && maxs[s] == vmax {
                v
            } else {
                (v - vmin) / (vmax - vmin) * (maxs[s] - mins[s]) + mins[s]
            }
        })
        .collect())
}

fn minc_attrs(vartype: &str) -> Vec<Attribute> {
    vec![
        Attribute::text("varid", "MINC standard variable"),
        Attribute::text("vartype", vartype),
        Attribute::text("version", MINC_VERSION),
    ]
}

fn dimension_variable(axis: usize, geometry: &VolumeGeometry) -> Variable {
    let mut cosines = vec![0.0; 3];
    cosines[axis] = 1.0;
    let mut attributes = minc_attrs("dimension____");
    attributes.extend([
        Attribute::text("spacing", "regular__"),
        Attribute::text("alignment", "centre"),
        Attribute::doubles("step", vec![geometry.spacing[axis]]),
        Attribute::doubles("start", vec![geometry.origin[axis]]),
        Attribute::text("units", "mm"),
        Attribute::doubles("direction_cosines", cosines),
    ]);
    Variable {
        name: SPATIAL_DIMS[axis].to_string(),
        dim_ids: vec![],
        attributes,
        values: NcValues::Int(vec![0]),
    }
}

/// Voxel values and the real range they map onto
struct Encoded {
    values: NcValues,
    valid_range: (f64, f64),
    real_range: Option<(f64, f64)>,
}

fn encode_voxels(data: &[f64], voxel_type: VoxelType) -> Encoded {
    let (lo, hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let (lo, hi) = if data.is_empty() { (0.0, 0.0) } else { (lo, hi) };

    if !voxel_type.is_integer() {
        let values = match voxel_type {
            VoxelType::Float => NcValues::Float(data.iter().map(|&v| v as f32).collect()),
            _ => NcValues::Double(data.to_vec()),
        };
        return Encoded {
            values,
            valid_range: (lo, hi),
            real_range: None,
        };
    }

    let (vmin, vmax) = voxel_type.full_range();
    let exact = data
        .iter()
        .all(|&v| v.fract() == 0.0 && v >= vmin && v <= vmax);

    // Exact integers are stored as-is with an identity mapping, anything else
    // is quantized over the full type range.
    let (real_min, real_max, quantized): (f64, f64, Vec<f64>) = if exact {
        (vmin, vmax, data.to_vec())
    } else if hi > lo {
        let scale = (vmax - vmin) / (hi - lo);
        let q = data
            .iter()
            .map(|&v| ((v - lo) * scale + vmin).round().clamp(vmin, vmax))
            .collect();
        (lo, hi, q)
    } else {
        // Constant image: every voxel maps to `lo` through a zero-width range.
        (lo, lo, vec![vmin; data.len()])
    };

    let values = match voxel_type {
        VoxelType::Byte { signed: true } => NcValues::Byte(quantized.iter().map(|&v| v as i8).collect()),
        VoxelType::Byte { signed: false } => {
            NcValues::Byte(quantized.iter().map(|&v| v as u8 as i8).collect())
        }
        VoxelType::Short { signed: true } => {
            NcValues::Short(quantized.iter().map(|&v| v as i16).collect())
        }
        VoxelType::Short { signed: false } => {
            NcValues::Short(quantized.iter().map(|&v| v as u16 as i16).collect())
        }
        VoxelType::Int { signed: true } => NcValues::Int(quantized.iter().map(|&v| v as i32).collect()),
        _ => NcValues::Int(quantized.iter().map(|&v| v as u32 as i32).collect()),
    };

    Encoded {
        values,
        valid_range: (vmin, vmax),
        real_range: Some((real_min, real_max)),
    }
}

/// Builds the MINC dataset for a segmented volume in its input storage type
pub fn dataset_from_segmented(segmented: &SegmentedVolume) -> Dataset {
    let geometry = segmented.geometry();
    let voxel_type = segmented.voxel_type();
    let [nx, ny, nz] = geometry.dims;

    let dimensions = vec![
        Dimension::new("zspace", nz),
        Dimension::new("yspace", ny),
        Dimension::new("xspace", nx),
    ];

    let mut variables: Vec<Variable> = (0..3).map(|axis| dimension_variable(axis, geometry)).collect();

    let encoded = encode_voxels(segmented.data(), voxel_type);

    if let Some((real_min, real_max)) = encoded.real_range {
        for (name, value) in [(IMAGE_MAX, real_max), (IMAGE_MIN, real_min)] {
            let mut attributes = minc_attrs("var_attribute");
            attributes.push(Attribute::text("units", ""));
            variables.push(Variable {
                name: name.to_string(),
                dim_ids: vec![],
                attributes,
                values: NcValues::Double(vec![value]),
            });
        }
    }

    let mut attributes = minc_attrs("group________");
    attributes.extend([
        Attribute::text(
            "signtype",
            if voxel_type.is_signed() {
                "signed__"
            } else {
                "unsigned"
            },
        ),
        Attribute::doubles(
            "valid_range",
            vec![encoded.valid_range.0, encoded.valid_range.1],
        ),
        Attribute::text("complete", "true_"),
    ]);
    variables.push(Variable {
        name: IMAGE.to_string(),
        dim_ids: vec![0, 1, 2],
        attributes,
        values: encoded.values,
    });

    Dataset {
        dimensions,
        attributes: vec![Attribute::text("history", "skullstrip: segmented volume")],
        variables,
    }
}
