//! NetCDF classic container codec
//!
//! MINC 1 files are NetCDF classic files. This module decodes and encodes
//! the subset needed for them: fixed-size variables of the six classic
//! types, with 32-bit (`CDF\x01`) or 64-bit (`CDF\x02`) offsets. Record
//! (unlimited) variables are rejected.
//!
//! Everything is big-endian and names, attribute values and variable data
//! are padded to 4-byte boundaries.

use crate::error::{Result, SkullStripError};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Cursor, Read, Seek, SeekFrom};

const MAGIC: &[u8; 3] = b"CDF";
const NC_DIMENSION: u32 = 0x0A;
const NC_VARIABLE: u32 = 0x0B;
const NC_ATTRIBUTE: u32 = 0x0C;
const STREAMING: u32 = 0xFFFF_FFFF;

/// Offset width of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    /// `CDF\x01`, 32-bit variable offsets
    Classic,
    /// `CDF\x02`, 64-bit variable offsets
    Offset64,
}

impl Version {
    fn byte(self) -> u8 {
        match self {
            Version::Classic => 1,
            Version::Offset64 => 2,
        }
    }
}

/// External data types of the classic format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NcType {
    Byte,
    Char,
    Short,
    Int,
    Float,
    Double,
}

impl NcType {
    fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(NcType::Byte),
            2 => Ok(NcType::Char),
            3 => Ok(NcType::Short),
            4 => Ok(NcType::Int),
            5 => Ok(NcType::Float),
            6 => Ok(NcType::Double),
            other => Err(SkullStripError::Format(format!(
                "unknown NetCDF type code {}",
                other
            ))),
        }
    }

    fn code(self) -> u32 {
        match self {
            NcType::Byte => 1,
            NcType::Char => 2,
            NcType::Short => 3,
            NcType::Int => 4,
            NcType::Float => 5,
            NcType::Double => 6,
        }
    }

    /// Size of one element in bytes
    pub fn size(self) -> usize {
        match self {
            NcType::Byte | NcType::Char => 1,
            NcType::Short => 2,
            NcType::Int | NcType::Float => 4,
            NcType::Double => 8,
        }
    }
}

/// Typed array of values, used for both attributes and variable data
#[derive(Debug, Clone, PartialEq)]
pub enum NcValues {
    Byte(Vec<i8>),
    Char(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl NcValues {
    pub fn nc_type(&self) -> NcType {
        match self {
            NcValues::Byte(_) => NcType::Byte,
            NcValues::Char(_) => NcType::Char,
            NcValues::Short(_) => NcType::Short,
            NcValues::Int(_) => NcType::Int,
            NcValues::Float(_) => NcType::Float,
            NcValues::Double(_) => NcType::Double,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            NcValues::Byte(v) => v.len(),
            NcValues::Char(v) => v.len(),
            NcValues::Short(v) => v.len(),
            NcValues::Int(v) => v.len(),
            NcValues::Float(v) => v.len(),
            NcValues::Double(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values widened to f64 (bytes as stored, i.e. signed)
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            NcValues::Byte(v) => v.iter().map(|&x| x as f64).collect(),
            NcValues::Char(v) => v.iter().map(|&x| x as f64).collect(),
            NcValues::Short(v) => v.iter().map(|&x| x as f64).collect(),
            NcValues::Int(v) => v.iter().map(|&x| x as f64).collect(),
            NcValues::Float(v) => v.iter().map(|&x| x as f64).collect(),
            NcValues::Double(v) => v.clone(),
        }
    }

    /// Char values as text, trailing NULs trimmed
    pub fn as_text(&self) -> Option<String> {
        match self {
            NcValues::Char(v) => Some(
                String::from_utf8_lossy(v)
                    .trim_end_matches('\0')
                    .to_string(),
            ),
            _ => None,
        }
    }

    fn read_from<R: Read>(reader: &mut R, nc_type: NcType, n: usize) -> std::io::Result<Self> {
        Ok(match nc_type {
            NcType::Byte => {
                let mut v = vec![0i8; n];
                reader.read_i8_into(&mut v)?;
                NcValues::Byte(v)
            }
            NcType::Char => {
                let mut v = vec![0u8; n];
                reader.read_exact(&mut v)?;
                NcValues::Char(v)
            }
            NcType::Short => {
                let mut v = vec![0i16; n];
                reader.read_i16_into::<BigEndian>(&mut v)?;
                NcValues::Short(v)
            }
            NcType::Int => {
                let mut v = vec![0i32; n];
                reader.read_i32_into::<BigEndian>(&mut v)?;
                NcValues::Int(v)
            }
            NcType::Float => {
                let mut v = vec![0f32; n];
                reader.read_f32_into::<BigEndian>(&mut v)?;
                NcValues::Float(v)
            }
            NcType::Double => {
                let mut v = vec![0f64; n];
                reader.read_f64_into::<BigEndian>(&mut v)?;
                NcValues::Double(v)
            }
        })
    }

    fn write_to(&self, out: &mut Vec<u8>) -> std::io::Result<()> {
        match self {
            NcValues::Byte(v) => v.iter().try_for_each(|&x| out.write_i8(x)),
            NcValues::Char(v) => {
                out.extend_from_slice(v);
                Ok(())
            }
            NcValues::Short(v) => v.iter().try_for_each(|&x| out.write_i16::<BigEndian>(x)),
            NcValues::Int(v) => v.iter().try_for_each(|&x| out.write_i32::<BigEndian>(x)),
            NcValues::Float(v) => v.iter().try_for_each(|&x| out.write_f32::<BigEndian>(x)),
            NcValues::Double(v) => v.iter().try_for_each(|&x| out.write_f64::<BigEndian>(x)),
        }
    }

    fn byte_len(&self) -> usize {
        self.len() * self.nc_type().size()
    }
}

/// Named dimension; length 0 marks the record dimension
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
}

impl Dimension {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub values: NcValues,
}

impl Attribute {
    pub fn text(name: impl Into<String>, value: &str) -> Self {
        Self {
            name: name.into(),
            values: NcValues::Char(value.as_bytes().to_vec()),
        }
    }

    pub fn doubles(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values: NcValues::Double(values),
        }
    }
}

/// Variable with its data fully loaded
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub dim_ids: Vec<usize>,
    pub attributes: Vec<Attribute>,
    pub values: NcValues,
}

impl Variable {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// First numeric value of an attribute
    pub fn attribute_f64(&self, name: &str) -> Option<f64> {
        self.attribute(name)
            .and_then(|a| a.values.to_f64_vec().first().copied())
    }

    pub fn attribute_text(&self, name: &str) -> Option<String> {
        self.attribute(name).and_then(|a| a.values.as_text())
    }
}

/// A complete in-memory NetCDF classic dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub dimensions: Vec<Dimension>,
    pub attributes: Vec<Attribute>,
    pub variables: Vec<Variable>,
}

struct VariableHeader {
    name: String,
    dim_ids: Vec<usize>,
    attributes: Vec<Attribute>,
    nc_type: NcType,
    begin: u64,
}

fn truncated(e: std::io::Error) -> SkullStripError {
    SkullStripError::Format(format!("truncated NetCDF header: {}", e))
}

fn padding(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn read_count<R: Read>(reader: &mut R) -> Result<usize> {
    Ok(reader.read_u32::<BigEndian>().map_err(truncated)? as usize)
}

/// Fails unless `count` elements of `unit` bytes fit in what is left of
/// the buffer
fn ensure_available(reader: &Cursor<&[u8]>, count: usize, unit: usize, what: &str) -> Result<()> {
    let remaining = (reader.get_ref().len() as u64).saturating_sub(reader.position());
    match count.checked_mul(unit) {
        Some(needed) if needed as u64 <= remaining => Ok(()),
        _ => Err(SkullStripError::Format(format!(
            "{} count {} exceeds the {} bytes left in the header",
            what, count, remaining
        ))),
    }
}

fn read_name(reader: &mut Cursor<&[u8]>) -> Result<String> {
    let len = read_count(reader)?;
    ensure_available(reader, len, 1, "name length")?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(truncated)?;
    reader
        .seek(SeekFrom::Current(padding(len) as i64))
        .map_err(truncated)?;
    String::from_utf8(buf).map_err(|e| SkullStripError::Format(format!("invalid name: {}", e)))
}

/// Reads the tag + element count of a list, treating ABSENT as empty
fn read_list_header(reader: &mut Cursor<&[u8]>, expected_tag: u32) -> Result<usize> {
    let tag = reader.read_u32::<BigEndian>().map_err(truncated)?;
    let count = read_count(reader)?;
    match tag {
        0 if count == 0 => Ok(0),
        // every list entry takes at least a name length and one more word
        t if t == expected_tag => {
            ensure_available(reader, count, 8, "list element")?;
            Ok(count)
        }
        t => Err(SkullStripError::Format(format!(
            "expected list tag {:#x}, found {:#x}",
            expected_tag, t
        ))),
    }
}

fn read_attributes(reader: &mut Cursor<&[u8]>) -> Result<Vec<Attribute>> {
    let count = read_list_header(reader, NC_ATTRIBUTE)?;
    let mut attributes = Vec::with_capacity(count);
    for _ in 0..count {
        let name = read_name(reader)?;
        let nc_type = NcType::from_code(reader.read_u32::<BigEndian>().map_err(truncated)?)?;
        let n = read_count(reader)?;
        ensure_available(reader, n, nc_type.size(), "attribute value")?;
        let values = NcValues::read_from(reader, nc_type, n).map_err(truncated)?;
        reader
            .seek(SeekFrom::Current(padding(values.byte_len()) as i64))
            .map_err(truncated)?;
        attributes.push(Attribute { name, values });
    }
    Ok(attributes)
}

impl Dataset {
    /// Decodes a whole file image, header and every variable
    ///
    /// # Errors
    ///
    /// Returns `Format` if the magic is wrong, the header is truncated or
    /// inconsistent, a variable lies outside the buffer, or a record
    /// variable is present.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Cursor::new(bytes);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(truncated)?;
        if &magic[..3] != MAGIC {
            return Err(SkullStripError::Format(
                "not a NetCDF classic file (bad magic)".to_string(),
            ));
        }
        let version = match magic[3] {
            1 => Version::Classic,
            2 => Version::Offset64,
            v => {
                return Err(SkullStripError::Format(format!(
                    "unsupported NetCDF version byte {}",
                    v
                )))
            }
        };

        let num_records = reader.read_u32::<BigEndian>().map_err(truncated)?;
        if num_records == STREAMING {
            return Err(SkullStripError::Format(
                "streaming NetCDF files are not supported".to_string(),
            ));
        }

        let dim_count = read_list_header(&mut reader, NC_DIMENSION)?;
        let mut dimensions = Vec::with_capacity(dim_count);
        for _ in 0..dim_count {
            let name = read_name(&mut reader)?;
            let len = read_count(&mut reader)?;
            dimensions.push(Dimension { name, len });
        }

        let attributes = read_attributes(&mut reader)?;

        let var_count = read_list_header(&mut reader, NC_VARIABLE)?;
        let mut headers = Vec::with_capacity(var_count);
        for _ in 0..var_count {
            let name = read_name(&mut reader)?;
            let ndims = read_count(&mut reader)?;
            ensure_available(&reader, ndims, 4, "variable dimension")?;
            let mut dim_ids = Vec::with_capacity(ndims);
            for _ in 0..ndims {
                let id = read_count(&mut reader)?;
                if id >= dimensions.len() {
                    return Err(SkullStripError::Format(format!(
                        "variable '{}' references dimension {} of {}",
                        name,
                        id,
                        dimensions.len()
                    )));
                }
                dim_ids.push(id);
            }
            let var_attributes = read_attributes(&mut reader)?;
            let nc_type = NcType::from_code(reader.read_u32::<BigEndian>().map_err(truncated)?)?;
            // vsize is recomputed from the dimensions
            let _vsize = reader.read_u32::<BigEndian>().map_err(truncated)?;
            let begin = match version {
                Version::Classic => reader.read_u32::<BigEndian>().map_err(truncated)? as u64,
                Version::Offset64 => reader.read_u64::<BigEndian>().map_err(truncated)?,
            };
            headers.push(VariableHeader {
                name,
                dim_ids,
                attributes: var_attributes,
                nc_type,
                begin,
            });
        }

        debug!(
            "NetCDF {:?}: {} dimensions, {} global attributes, {} variables",
            version,
            dimensions.len(),
            attributes.len(),
            headers.len()
        );

        let mut variables = Vec::with_capacity(headers.len());
        for header in headers {
            if header
                .dim_ids
                .first()
                .is_some_and(|&id| dimensions[id].len == 0)
            {
                return Err(SkullStripError::Format(format!(
                    "record variable '{}' is not supported",
                    header.name
                )));
            }
            let overflow = || {
                SkullStripError::Format(format!(
                    "variable '{}' size overflows the address space",
                    header.name
                ))
            };
            let count = header
                .dim_ids
                .iter()
                .try_fold(1usize, |acc, &id| acc.checked_mul(dimensions[id].len))
                .ok_or_else(overflow)?;
            let start = usize::try_from(header.begin).map_err(|_| overflow())?;
            let end = count
                .checked_mul(header.nc_type.size())
                .and_then(|len| start.checked_add(len))
                .ok_or_else(overflow)?;
            if end > bytes.len() {
                return Err(SkullStripError::Format(format!(
                    "variable '{}' data [{}, {}) exceeds file size {}",
                    header.name,
                    start,
                    end,
                    bytes.len()
                )));
            }
            let values = NcValues::read_from(&mut &bytes[start..end], header.nc_type, count)
                .map_err(truncated)?;
            variables.push(Variable {
                name: header.name,
                dim_ids: header.dim_ids,
                attributes: header.attributes,
                values,
            });
        }

        Ok(Self {
            dimensions,
            attributes,
            variables,
        })
    }

    /// Encodes the dataset, choosing 64-bit offsets only when needed
    ///
    /// # Errors
    ///
    /// Returns `Format` if a variable's data length does not match the
    /// product of its dimensions or references an unknown dimension.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        for var in &self.variables {
            let mut expected = 1usize;
            for &id in &var.dim_ids {
                let dim = self.dimensions.get(id).ok_or_else(|| {
                    SkullStripError::Format(format!(
                        "variable '{}' references dimension {}",
                        var.name, id
                    ))
                })?;
                expected *= dim.len;
            }
            if expected != var.values.len() {
                return Err(SkullStripError::Format(format!(
                    "variable '{}' has {} values, dimensions require {}",
                    var.name,
                    var.values.len(),
                    expected
                )));
            }
        }

        let data_len: u64 = self
            .variables
            .iter()
            .map(|v| padded_len(v.values.byte_len()) as u64)
            .sum();
        let header_len = self.encode_header(Version::Offset64, &[])?.len() as u64;
        let version = if header_len + data_len > u32::MAX as u64 {
            Version::Offset64
        } else {
            Version::Classic
        };

        let header_len = self.encode_header(version, &[])?.len() as u64;
        let mut begins = Vec::with_capacity(self.variables.len());
        let mut offset = header_len;
        for var in &self.variables {
            begins.push(offset);
            offset += padded_len(var.values.byte_len()) as u64;
        }

        let mut out = self.encode_header(version, &begins)?;
        out.reserve(data_len as usize);
        for var in &self.variables {
            var.values.write_to(&mut out).map_err(encode_error)?;
            out.resize(out.len() + padding(var.values.byte_len()), 0);
        }
        Ok(out)
    }

    /// Encodes the header; missing `begins` are written as zero
    fn encode_header(&self, version: Version, begins: &[u64]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.push(version.byte());
        write_u32(&mut out, 0)?;

        write_list_header(&mut out, NC_DIMENSION, self.dimensions.len())?;
        for dim in &self.dimensions {
            write_name(&mut out, &dim.name)?;
            write_u32(&mut out, dim.len)?;
        }

        write_attributes(&mut out, &self.attributes)?;

        write_list_header(&mut out, NC_VARIABLE, self.variables.len())?;
        for (i, var) in self.variables.iter().enumerate() {
            write_name(&mut out, &var.name)?;
            write_u32(&mut out, var.dim_ids.len())?;
            for &id in &var.dim_ids {
                write_u32(&mut out, id)?;
            }
            write_attributes(&mut out, &var.attributes)?;
            write_u32(&mut out, var.values.nc_type().code() as usize)?;
            let vsize = padded_len(var.values.byte_len()).min(u32::MAX as usize);
            write_u32(&mut out, vsize)?;
            let begin = begins.get(i).copied().unwrap_or(0);
            match version {
                Version::Classic => write_u32(&mut out, begin as usize)?,
                Version::Offset64 => out.write_u64::<BigEndian>(begin).map_err(encode_error)?,
            }
        }
        Ok(out)
    }

    pub fn dimension_id(&self, name: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.name == name)
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Dimension names of a variable, slowest varying first
    pub fn dimension_names(&self, var: &Variable) -> Vec<&str> {
        var.dim_ids
            .iter()
            .map(|&id| self.dimensions[id].name.as_str())
            .collect()
    }
}

fn padded_len(len: usize) -> usize {
    len + padding(len)
}

fn encode_error(e: std::io::Error) -> SkullStripError {
    SkullStripError::Format(format!("failed to encode NetCDF: {}", e))
}

fn write_u32(out: &mut Vec<u8>, value: usize) -> Result<()> {
    let value = u32::try_from(value)
        .map_err(|_| SkullStripError::Format(format!("value {} exceeds 32 bits", value)))?;
    out.write_u32::<BigEndian>(value).map_err(encode_error)
}

fn write_list_header(out: &mut Vec<u8>, tag: u32, count: usize) -> Result<()> {
    if count == 0 {
        write_u32(out, 0)?;
    } else {
        out.write_u32::<BigEndian>(tag).map_err(encode_error)?;
    }
    write_u32(out, count)
}

fn write_name(out: &mut Vec<u8>, name: &str) -> Result<()> {
    write_u32(out, name.len())?;
    out.extend_from_slice(name.as_bytes());
    out.resize(out.len() + padding(name.len()), 0);
    Ok(())
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[Attribute]) -> Result<()> {
    write_list_header(out, NC_ATTRIBUTE, attributes.len())?;
    for attr in attributes {
        write_name(out, &attr.name)?;
        write_u32(out, attr.values.nc_type().code() as usize)?;
        write_u32(out, attr.values.len())?;
        attr.values.write_to(out).map_err(encode_error)?;
        out.resize(out.len() + padding(attr.values.byte_len()), 0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        Dataset {
            dimensions: vec![Dimension::new("zspace", 2), Dimension::new("xspace", 3)],
            attributes: vec![Attribute::text("history", "created by test")],
            variables: vec![
                Variable {
                    name: "xspace".to_string(),
                    dim_ids: vec![],
                    attributes: vec![
                        Attribute::doubles("step", vec![0.5]),
                        Attribute::text("units", "mm"),
                    ],
                    values: NcValues::Int(vec![0]),
                },
                Variable {
                    name: "image".to_string(),
                    dim_ids: vec![0, 1],
                    attributes: vec![],
                    values: NcValues::Short(vec![1, -2, 3, 400, 5, 6]),
                },
            ],
        }
    }

    #[test]
    fn test_header_layout() {
        let bytes = sample_dataset().to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"CDF\x01");
        // numrecs
        assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
        // dimension list tag and count
        assert_eq!(&bytes[8..12], &[0, 0, 0, 0x0A]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 2]);
        // "zspace" padded to 8 bytes
        assert_eq!(&bytes[16..20], &[0, 0, 0, 6]);
        assert_eq!(&bytes[20..28], b"zspace\0\0");
        // header and data are 4-byte aligned
        assert_eq!(bytes.len() % 4, 0);
    }

    #[test]
    fn test_decode_encoded_dataset() {
        let dataset = sample_dataset();
        let bytes = dataset.to_bytes().unwrap();
        let decoded = Dataset::from_bytes(&bytes).unwrap();

        assert_eq!(decoded, dataset);
        let x = decoded.variable("xspace").unwrap();
        assert_eq!(x.attribute_f64("step"), Some(0.5));
        assert_eq!(x.attribute_text("units").as_deref(), Some("mm"));
        let image = decoded.variable("image").unwrap();
        assert_eq!(decoded.dimension_names(image), vec!["zspace", "xspace"]);
    }

    #[test]
    fn test_empty_lists_are_absent() {
        let bytes = Dataset::default().to_bytes().unwrap();
        // magic, numrecs, then three ABSENT lists
        assert_eq!(bytes.len(), 8 + 3 * 8);
        assert!(bytes[4..].iter().all(|&b| b == 0));
        assert_eq!(Dataset::from_bytes(&bytes).unwrap(), Dataset::default());
    }

    #[test]
    fn test_bad_magic() {
        let result = Dataset::from_bytes(b"HDF\x01\0\0\0\0");
        assert!(matches!(result, Err(SkullStripError::Format(_))));
    }

    #[test]
    fn test_truncated_file() {
        let bytes = sample_dataset().to_bytes().unwrap();
        let result = Dataset::from_bytes(&bytes[..bytes.len() - 6]);
        assert!(matches!(result, Err(SkullStripError::Format(_))));
    }

    #[test]
    fn test_mismatched_variable_length() {
        let mut dataset = sample_dataset();
        dataset.variables[1].values = NcValues::Short(vec![1, 2]);
        assert!(dataset.to_bytes().is_err());
    }

    fn patch_u32(bytes: &mut [u8], at: usize, value: u32) {
        bytes[at..at + 4].copy_from_slice(&value.to_be_bytes());
    }

    #[test]
    fn test_huge_dimensions_are_format_errors() {
        let mut bytes = sample_dataset().to_bytes().unwrap();
        // lengths of "zspace" and "xspace"
        patch_u32(&mut bytes, 28, u32::MAX);
        patch_u32(&mut bytes, 44, u32::MAX);

        let result = Dataset::from_bytes(&bytes);
        assert!(matches!(result, Err(SkullStripError::Format(_))), "{:?}", result);
    }

    #[test]
    fn test_oversized_header_counts_are_rejected() {
        let clean = sample_dataset().to_bytes().unwrap();

        let mut name = clean.clone();
        patch_u32(&mut name, 16, u32::MAX);
        let err = Dataset::from_bytes(&name).unwrap_err();
        assert!(err.to_string().contains("name length"), "{}", err);

        // element count of the "history" attribute
        let mut attribute = clean.clone();
        patch_u32(&mut attribute, 72, 0x7FFF_FFFF);
        let err = Dataset::from_bytes(&attribute).unwrap_err();
        assert!(err.to_string().contains("attribute value"), "{}", err);

        let mut list = clean;
        patch_u32(&mut list, 12, 0x4000_0000);
        let err = Dataset::from_bytes(&list).unwrap_err();
        assert!(err.to_string().contains("list element"), "{}", err);
    }

    #[test]
    fn test_record_variable_rejected() {
        let mut dataset = sample_dataset();
        dataset.dimensions[0].len = 0;
        dataset.variables[1].values = NcValues::Short(vec![]);
        let bytes = dataset.to_bytes().unwrap();
        let err = Dataset::from_bytes(&bytes).unwrap_err();
        assert!(err.to_string().contains("record variable"));
    }
}
