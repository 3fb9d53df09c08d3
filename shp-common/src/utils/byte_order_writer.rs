use super::byte_order_reader::Endianness;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::prelude::*;
use std::io::Error;

/// Writes fixed-width fields with a switchable byte order and counts the
/// bytes written, so that encoders can verify their declared lengths.
pub struct ByteOrderWriter<W: Write> {
    is_le: bool,
    writer: W,
    num_bytes_written: usize,
}

impl<W: Write> ByteOrderWriter<W> {
    pub fn new(writer: W, byte_order: Endianness) -> ByteOrderWriter<W> {
        let is_le = byte_order == Endianness::LittleEndian;
        ByteOrderWriter::<W> {
            writer: writer,
            is_le: is_le,
            num_bytes_written: 0,
        }
    }

    pub fn get_num_bytes_written(&self) -> usize {
        self.num_bytes_written
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn write_i32(&mut self, value: i32) -> Result<(), Error> {
        self.num_bytes_written += 4;
        if self.is_le {
            self.writer.write_i32::<LittleEndian>(value)
        } else {
            self.writer.write_i32::<BigEndian>(value)
        }
    }

    pub fn write_f64(&mut self, value: f64) -> Result<(), Error> {
        self.num_bytes_written += 8;
        if self.is_le {
            self.writer.write_f64::<LittleEndian>(value)
        } else {
            self.writer.write_f64::<BigEndian>(value)
        }
    }

    pub fn write_i32_array(&mut self, values: &[i32]) -> Result<(), Error> {
        for v in values {
            self.write_i32(*v)?;
        }
        Ok(())
    }

    pub fn write_f64_array(&mut self, values: &[f64]) -> Result<(), Error> {
        for v in values {
            self.write_f64(*v)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
