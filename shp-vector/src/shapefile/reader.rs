/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 13/10/2026
Last Modified: 16/10/2026
License: MIT
*/
use super::error::{Result, ShapefileError};
use super::geometry::{Shape, ShapeType};
use super::header::{IndexEntry, RecordHeader, ShapefileHeader, HEADER_SIZE, RECORD_HEADER_SIZE};
use super::shp_path;
use shp_common::configs::Configs;
use shp_common::structures::BoundingBox;
use shp_common::utils::{ByteOrderReader, Endianness};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, Cursor, ErrorKind};
use std::path::{Path, PathBuf};

/// A decoded record and its position in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRecord {
    /// 0-based position of the record in the file.
    pub index: usize,
    /// The 1-based record number stored in the record header.
    pub record_number: i32,
    pub shape: Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Records remain to be read.
    Open,
    /// Every record has been read.
    Exhausted,
    /// A record could not be decoded; the failure is available from `err()`.
    Failed,
    /// The file handles have been released.
    Closed,
}

/// Reads the records of a shapefile in file order.
///
/// Decoding stops at the first bad record. The failure is sticky: `advance`
/// keeps returning it and `err()` reports it, while iterating with `next()`
/// yields it once and then ends.
///
/// ```no_run
/// use shp_vector::ShapefileReader;
///
/// let mut reader = ShapefileReader::open("roads.shp")?;
/// for record in &mut reader {
///     let record = record?;
///     println!("{}: {}", record.index, record.shape);
/// }
/// reader.close();
/// # Ok::<(), shp_vector::ShapefileError>(())
/// ```
pub struct ShapefileReader {
    pub file_name: PathBuf,
    pub header: ShapefileHeader,
    configs: Configs,
    shp: Option<BufReader<File>>,
    shx: Option<BufReader<File>>,
    shp_size: u64,
    num_records: usize,
    // byte offset of the next record header in the geometry file
    position: u64,
    next_index: usize,
    state: ReaderState,
    failure: Option<ShapefileError>,
}

impl ShapefileReader {
    pub fn open<P: AsRef<Path>>(file_name: P) -> Result<ShapefileReader> {
        ShapefileReader::open_with_configs(file_name, Configs::default())
    }

    /// Opens the geometry file and its index, and reads both headers. A path
    /// without an extension has `.shp` added.
    pub fn open_with_configs<P: AsRef<Path>>(
        file_name: P,
        configs: Configs,
    ) -> Result<ShapefileReader> {
        let file_name = shp_path(file_name.as_ref());
        let shx_file = file_name.with_extension("shx");

        let f = File::open(&file_name)?;
        let shp_size = f.metadata()?.len();
        let mut shp = BufReader::with_capacity(configs.buffer_size, f);
        let header = ShapefileHeader::read(&mut shp)?;
        let declared_size = header.file_length as u64 * 2;
        if declared_size != shp_size {
            warn!(
                "{} declares {} bytes but holds {}",
                file_name.display(),
                declared_size,
                shp_size
            );
        }

        let f = File::open(&shx_file)?;
        let shx_size = f.metadata()?.len();
        let mut shx = BufReader::with_capacity(configs.buffer_size, f);
        let index_header = ShapefileHeader::read(&mut shx).map_err(|e| match e {
            ShapefileError::InvalidFormat(msg) => {
                ShapefileError::InvalidFormat(format!("index file: {}", msg))
            }
            other => other,
        })?;
        if index_header.shape_type != header.shape_type {
            warn!(
                "{} declares {} but its index declares {}",
                file_name.display(),
                header.shape_type,
                index_header.shape_type
            );
        }
        let num_records = (shx_size as usize).saturating_sub(HEADER_SIZE) / RECORD_HEADER_SIZE;

        let msg = format!(
            "Opened {} ({}, {} records)",
            file_name.display(),
            header.shape_type,
            num_records
        );
        if configs.verbose_mode {
            info!("{}", msg);
        } else {
            debug!("{}", msg);
        }

        Ok(ShapefileReader {
            file_name: file_name,
            header: header,
            configs: configs,
            shp: Some(shp),
            shx: Some(shx),
            shp_size: shp_size,
            num_records: num_records,
            position: HEADER_SIZE as u64,
            next_index: 0,
            state: ReaderState::Open,
            failure: None,
        })
    }

    /// The governing shape type declared in the header.
    pub fn shape_type(&self) -> ShapeType {
        self.header.shape_type
    }

    /// The bounding box declared in the header.
    pub fn bbox(&self) -> BoundingBox {
        self.header.bbox
    }

    /// The number of records listed in the index.
    pub fn num_records(&self) -> usize {
        self.num_records
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// The failure that stopped reading, if any.
    pub fn err(&self) -> Option<&ShapefileError> {
        self.failure.as_ref()
    }

    /// Decodes the next record. Returns `Ok(None)` once every record has been
    /// read. After a failure every call returns the same error.
    pub fn advance(&mut self) -> Result<Option<ShapeRecord>> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        match self.state {
            ReaderState::Closed => return Err(ShapefileError::Closed),
            ReaderState::Exhausted | ReaderState::Failed => return Ok(None),
            ReaderState::Open => {}
        }
        match self.read_record() {
            Ok(Some(record)) => Ok(Some(record)),
            Ok(None) => {
                self.state = ReaderState::Exhausted;
                debug!(
                    "Read {} records from {}",
                    self.next_index,
                    self.file_name.display()
                );
                Ok(None)
            }
            Err(e) => {
                warn!(
                    "Reading {} stopped at record {}: {}",
                    self.file_name.display(),
                    self.next_index + 1,
                    e
                );
                self.state = ReaderState::Failed;
                self.failure = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Releases both file handles. Safe to call more than once; a stored
    /// failure stays available from `err()`.
    pub fn close(&mut self) {
        self.shp = None;
        self.shx = None;
        if self.state != ReaderState::Closed {
            debug!("Closed {}", self.file_name.display());
            self.state = ReaderState::Closed;
        }
    }

    fn read_record(&mut self) -> Result<Option<ShapeRecord>> {
        let shp = self.shp.as_mut().ok_or(ShapefileError::Closed)?;
        let rh = match RecordHeader::read(shp)? {
            Some(rh) => rh,
            None => {
                if self.configs.verify_index && self.next_index != self.num_records {
                    return Err(ShapefileError::IndexMismatch {
                        entry: self.next_index,
                        reason: format!(
                            "the index lists {} records but the geometry file holds {}",
                            self.num_records, self.next_index
                        ),
                    });
                }
                return Ok(None);
            }
        };

        if rh.content_length < 2 {
            return Err(ShapefileError::MalformedShape(format!(
                "record {} declares a content length of {} words",
                rh.record_number, rh.content_length
            )));
        }
        let content_bytes = rh.content_length as u64 * 2;
        let remaining = self
            .shp_size
            .saturating_sub(self.position + RECORD_HEADER_SIZE as u64);
        if content_bytes > remaining {
            return Err(ShapefileError::MalformedShape(format!(
                "record {} declares {} bytes but only {} remain in the file",
                rh.record_number, content_bytes, remaining
            )));
        }

        if self.configs.verify_index {
            self.check_index_entry(&rh)?;
        }

        let expected_number = self.next_index as i32 + 1;
        if rh.record_number != expected_number {
            warn!(
                "Record {} of {} is numbered {}",
                expected_number,
                self.file_name.display(),
                rh.record_number
            );
        }

        let mut content = vec![0u8; content_bytes as usize];
        let shp = self.shp.as_mut().ok_or(ShapefileError::Closed)?;
        shp.read_exact(&mut content).map_err(|e| {
            if e.kind() == ErrorKind::UnexpectedEof {
                ShapefileError::MalformedShape(format!("record {} is truncated", rh.record_number))
            } else {
                e.into()
            }
        })?;

        let mut bor = ByteOrderReader::new(Cursor::new(content), Endianness::LittleEndian)?;
        let shape = Shape::decode(&mut bor, rh.content_length).map_err(|e| match e {
            ShapefileError::MalformedShape(msg) => {
                ShapefileError::MalformedShape(format!("record {}: {}", rh.record_number, msg))
            }
            other => other,
        })?;

        let found = shape.shape_type();
        if found != ShapeType::Null && found != self.header.shape_type {
            return Err(ShapefileError::TypeMismatch {
                expected: self.header.shape_type,
                found: found,
            });
        }

        trace!("Record {}: {}", rh.record_number, shape);
        self.position += RECORD_HEADER_SIZE as u64 + content_bytes;
        self.next_index += 1;
        Ok(Some(ShapeRecord {
            index: self.next_index - 1,
            record_number: rh.record_number,
            shape: shape,
        }))
    }

    fn check_index_entry(&mut self, rh: &RecordHeader) -> Result<()> {
        let entry = self.next_index;
        let shx = self.shx.as_mut().ok_or(ShapefileError::Closed)?;
        let ie: IndexEntry = IndexEntry::read(shx)?.ok_or_else(|| ShapefileError::IndexMismatch {
            entry: entry,
            reason: "the index has no entry for this record".to_string(),
        })?;
        if ie.byte_offset() != self.position as i64 {
            return Err(ShapefileError::IndexMismatch {
                entry: entry,
                reason: format!(
                    "offset {} bytes, but the record starts at {}",
                    ie.byte_offset(),
                    self.position
                ),
            });
        }
        if ie.content_length != rh.content_length {
            return Err(ShapefileError::IndexMismatch {
                entry: entry,
                reason: format!(
                    "content length {} words, but the record header says {}",
                    ie.content_length, rh.content_length
                ),
            });
        }
        Ok(())
    }
}

impl Iterator for ShapefileReader {
    type Item = Result<ShapeRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        // a failure is yielded once, by the call that hit it
        if self.state != ReaderState::Open {
            return None;
        }
        self.advance().transpose()
    }
}
