/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: Unknown
Last Modified: 12/10/2026
License: MIT
*/
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::prelude::*;
use std::io::{Result, SeekFrom};

/// Reads fixed-width fields from an underlying reader with a switchable byte
/// order. The cursor position is tracked so that callers can measure how many
/// bytes a decoder consumed.
pub struct ByteOrderReader<R: Read + Seek> {
    is_le: bool,
    reader: R,
    pos: usize,
}

impl<R: Read + Seek> ByteOrderReader<R> {
    pub fn new(mut reader: R, byte_order: Endianness) -> Result<ByteOrderReader<R>> {
        reader.seek(SeekFrom::Start(0))?;
        Ok(ByteOrderReader {
            is_le: byte_order == Endianness::LittleEndian,
            reader: reader,
            pos: 0usize,
        })
    }

    pub fn set_byte_order(&mut self, byte_order: Endianness) {
        self.is_le = byte_order == Endianness::LittleEndian;
    }

    pub fn seek(&mut self, position: usize) -> Result<()> {
        self.pos = position;
        self.reader.seek(SeekFrom::Start(self.pos as u64))?;
        Ok(())
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let val = if self.is_le {
            self.reader.read_i32::<LittleEndian>()?
        } else {
            self.reader.read_i32::<BigEndian>()?
        };
        self.pos += 4;
        Ok(val)
    }

    pub fn read_f64(&mut self) -> Result<f64> {
        let val = if self.is_le {
            self.reader.read_f64::<LittleEndian>()?
        } else {
            self.reader.read_f64::<BigEndian>()?
        };
        self.pos += 8;
        Ok(val)
    }

    /// Reads `count` consecutive i32 values.
    pub fn read_i32_array(&mut self, count: usize) -> Result<Vec<i32>> {
        let mut ret = Vec::with_capacity(count);
        for _ in 0..count {
            ret.push(self.read_i32()?);
        }
        Ok(ret)
    }

    /// Reads `count` consecutive f64 values.
    pub fn read_f64_array(&mut self, count: usize) -> Result<Vec<f64>> {
        let mut ret = vec![0f64; count];
        if self.is_le {
            self.reader.read_f64_into::<LittleEndian>(&mut ret)?;
        } else {
            self.reader.read_f64_into::<BigEndian>(&mut ret)?;
        }
        self.pos += 8 * count;
        Ok(ret)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Endianness {
    LittleEndian,
    BigEndian,
}

impl Default for Endianness {
    fn default() -> Endianness {
        Endianness::LittleEndian
    }
}

#[cfg(test)]
mod test {
    use super::{ByteOrderReader, Endianness};
    use std::io::Cursor;

    #[test]
    fn test_mixed_endian_reads() {
        // 9994 big-endian followed by 1000 little-endian
        let bytes = vec![0x00, 0x00, 0x27, 0x0A, 0xE8, 0x03, 0x00, 0x00];
        let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::BigEndian).unwrap();
        assert_eq!(bor.read_i32().unwrap(), 9994);
        bor.set_byte_order(Endianness::LittleEndian);
        assert_eq!(bor.read_i32().unwrap(), 1000);
        assert_eq!(bor.pos(), 8);
    }

    #[test]
    fn test_read_f64_array_advances_cursor() {
        let mut bytes = vec![];
        for v in [1.5f64, -2.25, 1e10].iter() {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::LittleEndian).unwrap();
        assert_eq!(bor.read_f64_array(3).unwrap(), vec![1.5, -2.25, 1e10]);
        assert_eq!(bor.pos(), 24);
    }

    #[test]
    fn test_short_read_is_an_error() {
        let mut bor =
            ByteOrderReader::new(Cursor::new(vec![0u8; 6]), Endianness::LittleEndian).unwrap();
        assert!(bor.read_f64().is_err());
    }

    #[test]
    fn test_seek() {
        let bytes: Vec<u8> = (0u8..16).collect();
        let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::BigEndian).unwrap();
        bor.seek(4).unwrap();
        assert_eq!(bor.read_i32().unwrap(), 0x04050607);
        bor.seek(12).unwrap();
        assert_eq!(bor.pos(), 12);
        assert_eq!(bor.read_i32().unwrap(), 0x0C0D0E0F);
    }
}
