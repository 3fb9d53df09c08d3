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
use super::reader::ShapefileReader;
use super::shp_path;
use shp_common::configs::Configs;
use shp_common::structures::{BoundingBox, ValueRange};
use shp_common::utils::{ByteOrderWriter, Endianness};
use std::fs::{File, OpenOptions};
use std::io::prelude::*;
use std::io::{BufWriter, SeekFrom};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    /// Records may be written.
    Writing,
    /// The headers have been patched and the files released.
    Finalized,
    /// An I/O failure interrupted the session; the headers were not patched.
    Aborted,
}

/// Writes a shapefile one record at a time.
///
/// Both headers are written as placeholders when the session starts and are
/// rewritten with the final length, bounding box and z/m ranges by `close`.
/// Dropping an open writer closes it.
///
/// ```no_run
/// use shp_vector::{Shape, ShapeType, ShapefileWriter};
///
/// let mut writer = ShapefileWriter::create("points.shp", ShapeType::Point)?;
/// writer.write(&Shape::point(0.0, 0.0))?;
/// writer.write(&Shape::point(5.0, 5.0))?;
/// writer.close()?;
/// # Ok::<(), shp_vector::ShapefileError>(())
/// ```
pub struct ShapefileWriter {
    pub file_name: PathBuf,
    shape_type: ShapeType,
    configs: Configs,
    shp: Option<BufWriter<File>>,
    shx: Option<BufWriter<File>>,
    // geometry file length in bytes, header included
    shp_length: u64,
    num_records: usize,
    bbox: BoundingBox,
    z_range: ValueRange,
    m_range: ValueRange,
    state: WriterState,
}

impl ShapefileWriter {
    pub fn create<P: AsRef<Path>>(file_name: P, shape_type: ShapeType) -> Result<ShapefileWriter> {
        ShapefileWriter::create_with_configs(file_name, shape_type, Configs::default())
    }

    /// Creates (or truncates) the geometry file and its index. A path without
    /// an extension has `.shp` added.
    pub fn create_with_configs<P: AsRef<Path>>(
        file_name: P,
        shape_type: ShapeType,
        configs: Configs,
    ) -> Result<ShapefileWriter> {
        let file_name = shp_path(file_name.as_ref());
        let shx_file = file_name.with_extension("shx");

        let mut shp = BufWriter::with_capacity(configs.buffer_size, File::create(&file_name)?);
        let mut shx = BufWriter::with_capacity(configs.buffer_size, File::create(&shx_file)?);
        let placeholder = ShapefileHeader::new(shape_type);
        placeholder.write(&mut shp)?;
        placeholder.write(&mut shx)?;

        debug!("Created {} ({})", file_name.display(), shape_type);
        Ok(ShapefileWriter {
            file_name: file_name,
            shape_type: shape_type,
            configs: configs,
            shp: Some(shp),
            shx: Some(shx),
            shp_length: HEADER_SIZE as u64,
            num_records: 0,
            bbox: BoundingBox::empty(),
            z_range: ValueRange::empty(),
            m_range: ValueRange::empty(),
            state: WriterState::Writing,
        })
    }

    pub fn append<P: AsRef<Path>>(file_name: P) -> Result<ShapefileWriter> {
        ShapefileWriter::append_with_configs(file_name, Configs::default())
    }

    /// Reopens an existing shapefile for further writes. The existing records
    /// are read once to recover the bounds and the record count; new records
    /// go after them and `close` patches the headers as usual.
    pub fn append_with_configs<P: AsRef<Path>>(
        file_name: P,
        configs: Configs,
    ) -> Result<ShapefileWriter> {
        let file_name = shp_path(file_name.as_ref());
        let shx_file = file_name.with_extension("shx");

        let mut reader = ShapefileReader::open_with_configs(&file_name, configs.clone())?;
        let shape_type = reader.shape_type();
        let mut bbox = BoundingBox::empty();
        let mut z_range = ValueRange::empty();
        let mut m_range = ValueRange::empty();
        let mut num_records = 0;
        while let Some(record) = reader.advance()? {
            bbox.expand_to(record.shape.bbox());
            if let Some(z) = record.shape.z_range() {
                z_range.expand_to(z);
            }
            if let Some(m) = record.shape.m_range() {
                m_range.expand_to(m);
            }
            num_records += 1;
        }
        reader.close();

        let mut shp = OpenOptions::new().write(true).open(&file_name)?;
        let shp_length = shp.seek(SeekFrom::End(0))?;
        let mut shx = OpenOptions::new().write(true).open(&shx_file)?;
        let shx_length = shx.seek(SeekFrom::End(0))?;
        if shx_length != (HEADER_SIZE + RECORD_HEADER_SIZE * num_records) as u64 {
            return Err(ShapefileError::IndexMismatch {
                entry: num_records,
                reason: format!(
                    "the index holds {} bytes for {} records",
                    shx_length, num_records
                ),
            });
        }

        debug!(
            "Appending to {} ({}, {} records)",
            file_name.display(),
            shape_type,
            num_records
        );
        Ok(ShapefileWriter {
            file_name: file_name,
            shape_type: shape_type,
            shp: Some(BufWriter::with_capacity(configs.buffer_size, shp)),
            shx: Some(BufWriter::with_capacity(configs.buffer_size, shx)),
            configs: configs,
            shp_length: shp_length,
            num_records: num_records,
            bbox: bbox,
            z_range: z_range,
            m_range: m_range,
            state: WriterState::Writing,
        })
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// The bounds of the records written so far.
    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    /// Appends a record to the geometry file and its entry to the index, and
    /// returns the record number assigned to it. Null shapes are accepted in
    /// any file; a shape of another type is rejected without writing
    /// anything.
    pub fn write(&mut self, shape: &Shape) -> Result<i32> {
        if self.state != WriterState::Writing {
            return Err(ShapefileError::Closed);
        }
        let found = shape.shape_type();
        if found != ShapeType::Null && found != self.shape_type {
            return Err(ShapefileError::TypeMismatch {
                expected: self.shape_type,
                found: found,
            });
        }
        shape.validate()?;

        let content_length = shape.content_length();
        let record_length = RECORD_HEADER_SIZE as u64 + content_length as u64 * 2;
        if (self.shp_length + record_length) / 2 > i32::MAX as u64 {
            return Err(ShapefileError::InvalidFormat(format!(
                "{} would exceed the largest length a shapefile header can state",
                self.file_name.display()
            )));
        }

        let mut bow = ByteOrderWriter::new(
            Vec::with_capacity(content_length as usize * 2),
            Endianness::LittleEndian,
        );
        shape.encode(&mut bow)?;
        let content = bow.into_inner();

        let record_number = self.num_records as i32 + 1;
        let rh = RecordHeader {
            record_number: record_number,
            content_length: content_length,
        };
        let ie = IndexEntry {
            offset: (self.shp_length / 2) as i32,
            content_length: content_length,
        };
        if let Err(e) = self.append_record(&rh, &content, &ie) {
            warn!(
                "Writing record {} to {} failed: {}",
                record_number,
                self.file_name.display(),
                e
            );
            self.state = WriterState::Aborted;
            return Err(e);
        }

        self.bbox.expand_to(shape.bbox());
        if let Some(z) = shape.z_range() {
            self.z_range.expand_to(z);
        }
        if let Some(m) = shape.m_range() {
            self.m_range.expand_to(m);
        }
        self.shp_length += record_length;
        self.num_records += 1;
        trace!("Record {}: {}", record_number, shape);
        Ok(record_number)
    }

    fn append_record(&mut self, rh: &RecordHeader, content: &[u8], ie: &IndexEntry) -> Result<()> {
        let shp = self.shp.as_mut().ok_or(ShapefileError::Closed)?;
        rh.write(shp)?;
        shp.write_all(content)?;
        let shx = self.shx.as_mut().ok_or(ShapefileError::Closed)?;
        ie.write(shx)?;
        Ok(())
    }

    /// The header that `close` will write to the geometry file.
    pub fn header(&self) -> ShapefileHeader {
        let mut header = ShapefileHeader::new(self.shape_type);
        header.file_length = (self.shp_length / 2) as i32;
        header.bbox = self.bbox;
        header.z_range = self.z_range;
        header.m_range = self.m_range;
        header
    }

    /// Patches both headers with the final lengths and bounds and releases
    /// the files. Calling it again does nothing. An aborted session only
    /// releases its files.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            WriterState::Finalized => return Ok(()),
            WriterState::Aborted => {
                self.shp = None;
                self.shx = None;
                return Ok(());
            }
            WriterState::Writing => {}
        }
        let result = self.finalize();
        self.shp = None;
        self.shx = None;
        match result {
            Ok(()) => {
                self.state = WriterState::Finalized;
                let msg = format!(
                    "Wrote {} records to {}",
                    self.num_records,
                    self.file_name.display()
                );
                if self.configs.verbose_mode {
                    info!("{}", msg);
                } else {
                    debug!("{}", msg);
                }
                Ok(())
            }
            Err(e) => {
                self.state = WriterState::Aborted;
                Err(e)
            }
        }
    }

    fn finalize(&mut self) -> Result<()> {
        let mut header = self.header();
        let shp = self.shp.as_mut().ok_or(ShapefileError::Closed)?;
        shp.seek(SeekFrom::Start(0))?;
        header.write(shp)?;
        shp.flush()?;

        header.file_length = ((HEADER_SIZE + RECORD_HEADER_SIZE * self.num_records) / 2) as i32;
        let shx = self.shx.as_mut().ok_or(ShapefileError::Closed)?;
        shx.seek(SeekFrom::Start(0))?;
        header.write(shx)?;
        shx.flush()?;
        Ok(())
    }
}

impl Drop for ShapefileWriter {
    fn drop(&mut self) {
        if self.state == WriterState::Writing {
            if let Err(e) = self.close() {
                warn!(
                    "Failed to finalize {} on drop: {}",
                    self.file_name.display(),
                    e
                );
            }
        }
    }
}
