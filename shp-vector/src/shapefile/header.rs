/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 12/10/2026
Last Modified: 15/10/2026
License: MIT
*/
use super::error::{Result, ShapefileError};
use super::geometry::ShapeType;
use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use shp_common::structures::{BoundingBox, ValueRange};
use shp_common::utils::{ByteOrderReader, Endianness};
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, Cursor, ErrorKind};
use std::path::Path;

/// The magic number that opens every .shp and .shx file.
pub const FILE_CODE: i32 = 9994;
pub const VERSION: i32 = 1000;
/// Size in bytes of the file header shared by .shp and .shx files.
pub const HEADER_SIZE: usize = 100;
/// Size in bytes of a record header and of an index entry.
pub const RECORD_HEADER_SIZE: usize = 8;

/// The 100-byte header at the top of both the geometry file and the index.
/// `file_length` is counted in 16-bit words and includes the header itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapefileHeader {
    pub file_code: i32,
    pub file_length: i32,
    pub version: i32,
    pub shape_type: ShapeType,
    pub bbox: BoundingBox,
    pub z_range: ValueRange,
    pub m_range: ValueRange,
}

impl ShapefileHeader {
    /// A placeholder header: zero length and empty bounds.
    pub fn new(shape_type: ShapeType) -> ShapefileHeader {
        ShapefileHeader {
            file_code: FILE_CODE,
            file_length: 0,
            version: VERSION,
            shape_type: shape_type,
            bbox: BoundingBox::empty(),
            z_range: ValueRange::empty(),
            m_range: ValueRange::empty(),
        }
    }

    /// Reads and checks the 100-byte header.
    pub fn read<R: Read>(reader: &mut R) -> Result<ShapefileHeader> {
        let mut buffer = [0u8; HEADER_SIZE];
        reader.read_exact(&mut buffer).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                ShapefileError::InvalidFormat(format!(
                    "the file is shorter than the {} byte header",
                    HEADER_SIZE
                ))
            } else {
                e.into()
            }
        })?;

        let mut bor = ByteOrderReader::new(Cursor::new(&buffer[..]), Endianness::BigEndian)?;
        let file_code = bor.read_i32()?;
        if file_code != FILE_CODE {
            return Err(ShapefileError::InvalidFormat(format!(
                "unexpected file code {} (expected {})",
                file_code, FILE_CODE
            )));
        }
        bor.seek(24)?;
        let file_length = bor.read_i32()?;
        if file_length < 0 {
            return Err(ShapefileError::InvalidFormat(format!(
                "negative file length {}",
                file_length
            )));
        }

        bor.set_byte_order(Endianness::LittleEndian);
        let version = bor.read_i32()?;
        if version != VERSION {
            warn!("Unexpected shapefile version {} (expected {})", version, VERSION);
        }
        let code = bor.read_i32()?;
        let shape_type = ShapeType::from_int(code).map_err(|_| {
            ShapefileError::InvalidFormat(format!("unrecognized shape type {} in header", code))
        })?;

        // Bounds of a file without records, and ranges of a dimension the
        // type lacks, are stored as zeros and read back as empty.
        let v = bor.read_f64_array(8)?;
        let has_records = file_length as usize * 2 > HEADER_SIZE && shape_type != ShapeType::Null;
        let bbox = if has_records {
            BoundingBox {
                min_x: v[0],
                min_y: v[1],
                max_x: v[2],
                max_y: v[3],
            }
        } else {
            BoundingBox::empty()
        };
        let z_range = if has_records && shape_type.has_z() {
            ValueRange::new(v[4], v[5])
        } else {
            ValueRange::empty()
        };
        let m_range = if has_records && shape_type.has_m() {
            ValueRange::new(v[6], v[7])
        } else {
            ValueRange::empty()
        };
        Ok(ShapefileHeader {
            file_code: file_code,
            file_length: file_length,
            version: version,
            shape_type: shape_type,
            bbox: bbox,
            z_range: z_range,
            m_range: m_range,
        })
    }

    /// Writes the 100-byte header. Empty bounds are stored as zeros.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<BigEndian>(self.file_code)?;
        for _ in 0..5 {
            writer.write_i32::<BigEndian>(0i32)?;
        }
        writer.write_i32::<BigEndian>(self.file_length)?;
        writer.write_i32::<byteorder::LittleEndian>(self.version)?;
        writer.write_i32::<byteorder::LittleEndian>(self.shape_type.to_int())?;

        let (min_x, min_y, max_x, max_y) = if self.bbox.is_empty() {
            (0f64, 0f64, 0f64, 0f64)
        } else {
            (self.bbox.min_x, self.bbox.min_y, self.bbox.max_x, self.bbox.max_y)
        };
        let (min_z, max_z) = range_or_zero(&self.z_range);
        let (min_m, max_m) = range_or_zero(&self.m_range);
        for v in [min_x, min_y, max_x, max_y, min_z, max_z, min_m, max_m].iter() {
            writer.write_f64::<byteorder::LittleEndian>(*v)?;
        }
        Ok(())
    }
}

fn range_or_zero(range: &ValueRange) -> (f64, f64) {
    if range.is_empty() {
        (0f64, 0f64)
    } else {
        (range.min, range.max)
    }
}

impl fmt::Display for ShapefileHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = format!("file_code: {}", self.file_code);
        s = s + &format!("\nfile_length: {}", self.file_length);
        s = s + &format!("\nversion: {}", self.version);
        s = s + &format!("\nshape_type: {}", self.shape_type);
        s = s + &format!("\nx_min: {}", self.bbox.min_x);
        s = s + &format!("\nx_max: {}", self.bbox.max_x);
        s = s + &format!("\ny_min: {}", self.bbox.min_y);
        s = s + &format!("\ny_max: {}", self.bbox.max_y);
        s = s + &format!("\nz_min: {}", self.z_range.min);
        s = s + &format!("\nz_max: {}", self.z_range.max);
        s = s + &format!("\nm_min: {}", self.m_range.min);
        s = s + &format!("\nm_max: {}", self.m_range.max);
        write!(f, "{}", s)
    }
}

/// The big-endian frame that precedes each record's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordHeader {
    /// 1-based record number.
    pub record_number: i32,
    /// Content length in 16-bit words.
    pub content_length: i32,
}

impl RecordHeader {
    /// Reads the next record header. Returns `None` at a clean end of file;
    /// a header cut short by the end of the file is an error.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<RecordHeader>> {
        let mut buffer = [0u8; RECORD_HEADER_SIZE];
        let filled = read_frame(reader, &mut buffer)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < RECORD_HEADER_SIZE {
            return Err(ShapefileError::MalformedShape(format!(
                "record header truncated after {} bytes",
                filled
            )));
        }
        Ok(Some(RecordHeader {
            record_number: BigEndian::read_i32(&buffer[0..4]),
            content_length: BigEndian::read_i32(&buffer[4..8]),
        }))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<BigEndian>(self.record_number)?;
        writer.write_i32::<BigEndian>(self.content_length)
    }
}

/// One .shx entry: the record's offset in the geometry file and its content
/// length, both in 16-bit words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexEntry {
    pub offset: i32,
    pub content_length: i32,
}

impl IndexEntry {
    /// Reads the next entry, or `None` at a clean end of file.
    pub fn read<R: Read>(reader: &mut R) -> Result<Option<IndexEntry>> {
        let mut buffer = [0u8; RECORD_HEADER_SIZE];
        let filled = read_frame(reader, &mut buffer)?;
        if filled == 0 {
            return Ok(None);
        }
        if filled < RECORD_HEADER_SIZE {
            return Err(ShapefileError::InvalidFormat(format!(
                "index entry truncated after {} bytes",
                filled
            )));
        }
        Ok(Some(IndexEntry {
            offset: BigEndian::read_i32(&buffer[0..4]),
            content_length: BigEndian::read_i32(&buffer[4..8]),
        }))
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_i32::<BigEndian>(self.offset)?;
        writer.write_i32::<BigEndian>(self.content_length)
    }

    /// Byte offset of the record header in the geometry file. Negative for
    /// a corrupt entry.
    pub fn byte_offset(&self) -> i64 {
        self.offset as i64 * 2
    }
}

/// Reads a complete .shx file: its header and every entry.
pub fn read_index<P: AsRef<Path>>(path: P) -> Result<(ShapefileHeader, Vec<IndexEntry>)> {
    let f = File::open(path.as_ref())?;
    let num_entries = (f.metadata()?.len() as usize).saturating_sub(HEADER_SIZE) / RECORD_HEADER_SIZE;
    let mut reader = BufReader::new(f);
    let header = ShapefileHeader::read(&mut reader)?;
    let mut entries = Vec::with_capacity(num_entries);
    while let Some(entry) = IndexEntry::read(&mut reader)? {
        entries.push(entry);
    }
    Ok((header, entries))
}

/// Fills `buffer` as far as the reader allows and returns the number of
/// bytes read. Fewer than `buffer.len()` bytes means the end of the file.
fn read_frame<R: Read>(reader: &mut R, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_header() -> ShapefileHeader {
        let mut header = ShapefileHeader::new(ShapeType::PointZ);
        header.file_length = 92;
        header.bbox = BoundingBox::new(0.0, 10.0, 5.0, 10.0);
        header.z_range = ValueRange::new(50.0, 100.0);
        header
    }

    #[test]
    fn test_header_layout() {
        let mut bytes = vec![];
        sample_header().write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x27, 0x0a]);
        assert_eq!(BigEndian::read_i32(&bytes[24..28]), 92);
        assert_eq!(&bytes[28..32], &1000i32.to_le_bytes());
        assert_eq!(&bytes[32..36], &11i32.to_le_bytes());
        assert_eq!(&bytes[36..44], &0f64.to_le_bytes());
        assert_eq!(&bytes[52..60], &10f64.to_le_bytes());
        // the empty m range is stored as zeros
        assert_eq!(&bytes[84..100], &[0u8; 16]);
    }

    #[test]
    fn test_header_read_back() {
        let mut bytes = vec![];
        sample_header().write(&mut bytes).unwrap();
        let header = ShapefileHeader::read(&mut &bytes[..]).unwrap();
        assert_eq!(header.shape_type, ShapeType::PointZ);
        assert_eq!(header.file_length, 92);
        assert_eq!(header.bbox, BoundingBox::new(0.0, 10.0, 5.0, 10.0));
        assert_eq!(header.z_range, ValueRange::new(50.0, 100.0));
        assert_eq!(header.m_range, ValueRange::new(0.0, 0.0));
        assert!(header.to_string().contains("shape_type: PointZ"));
    }

    #[test]
    fn test_bad_file_code() {
        let mut bytes = vec![];
        sample_header().write(&mut bytes).unwrap();
        bytes[3] = 0x0b;
        assert!(matches!(
            ShapefileHeader::read(&mut &bytes[..]),
            Err(ShapefileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_short_header() {
        let bytes = vec![0u8; 60];
        assert!(matches!(
            ShapefileHeader::read(&mut &bytes[..]),
            Err(ShapefileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_negative_file_length() {
        let mut bytes = vec![];
        sample_header().write(&mut bytes).unwrap();
        bytes[24..28].copy_from_slice(&(-1i32).to_be_bytes());
        assert!(matches!(
            ShapefileHeader::read(&mut &bytes[..]),
            Err(ShapefileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_zeroed_bounds_read_back_empty() {
        // a file holding only its header
        let mut bytes = vec![];
        let mut header = ShapefileHeader::new(ShapeType::PolygonZ);
        header.file_length = 50;
        header.write(&mut bytes).unwrap();
        let header = ShapefileHeader::read(&mut &bytes[..]).unwrap();
        assert!(header.bbox.is_empty());
        assert!(header.z_range.is_empty());
        assert!(header.m_range.is_empty());

        // an x-y file has no z or m range
        let mut bytes = vec![];
        let mut header = ShapefileHeader::new(ShapeType::Point);
        header.file_length = 64;
        header.bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        header.write(&mut bytes).unwrap();
        let header = ShapefileHeader::read(&mut &bytes[..]).unwrap();
        assert_eq!(header.bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
        assert!(header.z_range.is_empty());
        assert!(header.m_range.is_empty());
    }

    #[test]
    fn test_unknown_header_shape_type() {
        let mut bytes = vec![];
        sample_header().write(&mut bytes).unwrap();
        bytes[32..36].copy_from_slice(&7i32.to_le_bytes());
        assert!(matches!(
            ShapefileHeader::read(&mut &bytes[..]),
            Err(ShapefileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_record_header_end_of_file() {
        let mut bytes = vec![];
        RecordHeader {
            record_number: 3,
            content_length: 10,
        }
        .write(&mut bytes)
        .unwrap();
        let mut reader = &bytes[..];
        let rh = RecordHeader::read(&mut reader).unwrap().unwrap();
        assert_eq!(rh.record_number, 3);
        assert_eq!(rh.content_length, 10);
        assert!(RecordHeader::read(&mut reader).unwrap().is_none());

        let partial = &bytes[..5];
        assert!(RecordHeader::read(&mut &partial[..]).is_err());
    }

    #[test]
    fn test_read_index_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.shx");
        let mut bytes = vec![];
        let mut header = ShapefileHeader::new(ShapeType::Point);
        header.file_length = 50 + 4 * 2;
        header.write(&mut bytes).unwrap();
        IndexEntry {
            offset: 50,
            content_length: 10,
        }
        .write(&mut bytes)
        .unwrap();
        IndexEntry {
            offset: 64,
            content_length: 10,
        }
        .write(&mut bytes)
        .unwrap();
        std::fs::write(&path, &bytes).unwrap();

        let (header, entries) = read_index(&path).unwrap();
        assert_eq!(header.file_length, 58);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].offset, 64);
        assert_eq!(entries[0].byte_offset(), 100);
    }
}
