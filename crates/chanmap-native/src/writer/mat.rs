//! MATLAB level-5 MAT file encoding
//!
//! Writes each column as an uncompressed `N x 1` matrix, the layout Kilosort
//! loads with `load('chanMap.mat')`. `connected` is stored as a logical
//! array; every other column as double.
//!
//! # Layout
//!
//! ```text
//! CHAR[116]   – Descriptive header text, space padded
//! UINT8[8]    – Subsystem data offset (unused, zero)
//! UINT16      – Version (0x0100)
//! CHAR[2]     – Endian indicator "IM" (little-endian)
//! foreach variable
//!     UINT32  – miMATRIX (14)
//!     UINT32  – Byte count of the matrix body
//!     element – Array flags     (miUINT32, class + logical bit)
//!     element – Dimensions      (miINT32, rows, cols)
//!     element – Array name      (miINT8, padded to 8 bytes)
//!     element – Real part       (miDOUBLE or miUINT8)
//! end
//! ```
//!
//! Every data element is an 8-byte tag (type, byte count) followed by its
//! payload padded to a multiple of 8 bytes.

use std::fs;
use std::io;
use std::path::Path;

use chanmap_core::ChannelMap;

use crate::error::{ChanMapError, ChanMapResult};

/// MAT header size in bytes.
const HEADER_SIZE: usize = 128;

/// Header text length before the subsystem offset.
const HEADER_TEXT_SIZE: usize = 116;

const MI_INT8: u32 = 1;
const MI_UINT8: u32 = 2;
const MI_INT32: u32 = 5;
const MI_UINT32: u32 = 6;
const MI_DOUBLE: u32 = 9;
const MI_MATRIX: u32 = 14;

const MX_DOUBLE_CLASS: u32 = 6;
const MX_UINT8_CLASS: u32 = 9;

/// Logical flag, bit 1 of the flags byte.
const LOGICAL_FLAG: u32 = 0x0200;

/// One column ready for encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Column {
    /// Double-precision column
    Double(Vec<f64>),
    /// Logical column
    Logical(Vec<bool>),
}

impl Column {
    fn len(&self) -> usize {
        match self {
            Self::Double(v) => v.len(),
            Self::Logical(v) => v.len(),
        }
    }
}

/// Encode `map` as a complete MAT file.
///
/// # Errors
///
/// Returns an error if a column is too long for the 32-bit MAT v5 counts.
pub fn encode(map: &ChannelMap) -> io::Result<Vec<u8>> {
    let columns = [
        ("chanMap", Column::Double(map.chan_map().into_iter().map(f64::from).collect())),
        ("chanMap0ind", Column::Double(map.chan_map_0ind().into_iter().map(f64::from).collect())),
        ("connected", Column::Logical(map.connected())),
        ("xcoords", Column::Double(map.xcoords())),
        ("ycoords", Column::Double(map.ycoords())),
        ("kcoords", Column::Double(map.kcoords().into_iter().map(f64::from).collect())),
    ];

    let mut out = Vec::with_capacity(HEADER_SIZE + columns.len() * (64 + map.len() * 8));
    write_header(&mut out);
    for (name, column) in &columns {
        write_matrix(&mut out, name, column)?;
    }
    Ok(out)
}

fn write_header(out: &mut Vec<u8>) {
    let text = format!(
        "MATLAB 5.0 MAT-file, Platform: {}, Created by: chanmap {}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    let mut header = [b' '; HEADER_TEXT_SIZE];
    let len = text.len().min(HEADER_TEXT_SIZE);
    header[..len].copy_from_slice(&text.as_bytes()[..len]);

    out.extend_from_slice(&header);
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&0x0100u16.to_le_bytes());
    out.extend_from_slice(b"IM");
}

fn write_matrix(out: &mut Vec<u8>, name: &str, column: &Column) -> io::Result<()> {
    let rows = i32::try_from(column.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "column too long for MAT v5"))?;

    let mut body = Vec::new();

    let class = match column {
        Column::Double(_) => MX_DOUBLE_CLASS,
        Column::Logical(_) => MX_UINT8_CLASS | LOGICAL_FLAG,
    };
    let mut flags = Vec::with_capacity(8);
    flags.extend_from_slice(&class.to_le_bytes());
    flags.extend_from_slice(&0u32.to_le_bytes());
    write_element(&mut body, MI_UINT32, &flags)?;

    let mut dims = Vec::with_capacity(8);
    dims.extend_from_slice(&rows.to_le_bytes());
    dims.extend_from_slice(&1i32.to_le_bytes());
    write_element(&mut body, MI_INT32, &dims)?;

    write_element(&mut body, MI_INT8, name.as_bytes())?;

    match column {
        Column::Double(values) => {
            let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
            write_element(&mut body, MI_DOUBLE, &bytes)?;
        }
        Column::Logical(values) => {
            let bytes: Vec<u8> = values.iter().map(|&v| u8::from(v)).collect();
            write_element(&mut body, MI_UINT8, &bytes)?;
        }
    }

    out.extend_from_slice(&MI_MATRIX.to_le_bytes());
    out.extend_from_slice(&byte_count(body.len())?.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(())
}

fn write_element(out: &mut Vec<u8>, data_type: u32, payload: &[u8]) -> io::Result<()> {
    out.extend_from_slice(&data_type.to_le_bytes());
    out.extend_from_slice(&byte_count(payload.len())?.to_le_bytes());
    out.extend_from_slice(payload);
    out.resize(out.len() + padding(payload.len()), 0);
    Ok(())
}

fn byte_count(len: usize) -> io::Result<u32> {
    u32::try_from(len)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "element too large for MAT v5"))
}

const fn padding(len: usize) -> usize {
    (8 - len % 8) % 8
}

// ============================================================================
// Reading
// ============================================================================

/// Named columns decoded from a MAT file, in file order.
pub type MatColumns = Vec<(String, Column)>;

/// Decode the uncompressed numeric and logical column vectors of a MAT file.
///
/// # Errors
///
/// Returns a description of the first structural problem found.
pub fn decode(bytes: &[u8]) -> Result<MatColumns, String> {
    if bytes.len() < HEADER_SIZE {
        return Err(format!("file is {} bytes, shorter than the MAT header", bytes.len()));
    }
    if &bytes[126..128] != b"IM" {
        return Err("not a little-endian MAT v5 file".to_string());
    }

    let mut cursor = Cursor { bytes, pos: HEADER_SIZE };
    let mut columns = Vec::new();
    while cursor.pos < bytes.len() {
        let (data_type, body) = cursor.element()?;
        if data_type != MI_MATRIX {
            return Err(format!("unsupported top-level element type {data_type}"));
        }
        columns.push(decode_matrix(body)?);
    }
    Ok(columns)
}

fn decode_matrix(body: &[u8]) -> Result<(String, Column), String> {
    let mut cursor = Cursor { bytes: body, pos: 0 };

    let (_, flags) = cursor.element()?;
    let flags = read_u32(flags, 0)?;
    let logical = flags & LOGICAL_FLAG != 0;
    let class = flags & 0xFF;

    let (_, dims) = cursor.element()?;
    let rows = read_u32(dims, 0)? as usize;
    let cols = read_u32(dims, 4)? as usize;

    let (_, name) = cursor.element()?;
    let name = String::from_utf8(name.to_vec()).map_err(|e| e.to_string())?;

    let (data_type, data) = cursor.element()?;
    let count = rows * cols;
    let column = match (data_type, logical) {
        (MI_DOUBLE, false) if class == MX_DOUBLE_CLASS => Column::Double(
            data.chunks_exact(8)
                .take(count)
                .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        (MI_UINT8, true) => Column::Logical(data.iter().take(count).map(|&b| b != 0).collect()),
        _ => return Err(format!("variable '{name}' has unsupported data type {data_type}")),
    };
    if column.len() != count {
        return Err(format!("variable '{name}' holds {} of {count} values", column.len()));
    }
    Ok((name, column))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Read one data element, handling the small (packed) element format.
    fn element(&mut self) -> Result<(u32, &'a [u8]), String> {
        let word = read_u32(self.bytes, self.pos)?;
        if word >> 16 != 0 {
            // Small element: type and size share the first word, payload in the next 4 bytes
            let size = (word >> 16) as usize;
            let start = self.pos + 4;
            let payload = self.bytes.get(start..start + size).ok_or("truncated small element")?;
            self.pos += 8;
            return Ok((word & 0xFFFF, payload));
        }

        let size = read_u32(self.bytes, self.pos + 4)? as usize;
        let start = self.pos + 8;
        let payload = self
            .bytes
            .get(start..start + size)
            .ok_or_else(|| format!("element at byte {} overruns the file", self.pos))?;
        self.pos = start + size + padding(size);
        Ok((word, payload))
    }
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, String> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| format!("unexpected end of data at byte {at}"))
}

/// Read a MAT channel map artifact written by [`encode`].
///
/// # Errors
///
/// Returns [`ChanMapError::MalformedArtifact`] if the file is not a MAT file,
/// lacks one of the six columns, or holds a column of the wrong type.
pub fn read_channel_map_mat(path: &Path) -> ChanMapResult<ChannelMap> {
    let malformed = |reason: String| ChanMapError::MalformedArtifact { path: path.to_path_buf(), reason };

    let bytes = fs::read(path)?;
    let columns = decode(&bytes).map_err(malformed)?;

    let find = |name: &str| {
        columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
            .ok_or_else(|| malformed(format!("missing variable '{name}'")))
    };
    let doubles = |name: &str| match find(name)? {
        Column::Double(v) => Ok(v.clone()),
        Column::Logical(_) => Err(malformed(format!("variable '{name}' is logical, expected double"))),
    };
    let indices = |name: &str| doubles(name).map(|v| v.into_iter().map(index_from_f64).collect::<Vec<u32>>());

    let connected = match find("connected")? {
        Column::Logical(v) => v.clone(),
        Column::Double(v) => v.iter().map(|&x| x != 0.0).collect(),
    };

    Ok(ChannelMap::from_columns(
        &indices("chanMap")?,
        &indices("chanMap0ind")?,
        &connected,
        &doubles("xcoords")?,
        &doubles("ycoords")?,
        &indices("kcoords")?,
    )?)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn index_from_f64(value: f64) -> u32 {
    value as u32
}
