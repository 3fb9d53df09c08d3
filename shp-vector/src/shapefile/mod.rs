/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 21/06/2017
Last Modified: 16/10/2026
License: MIT

Notes: Reading and writing the geometry (.shp) and index (.shx) files of the
ESRI Shapefile format. Attribute (.dbf) and projection (.prj) files are not
handled here.
*/

// private sub-module defined in other files
pub mod error;
pub mod geometry;
pub mod header;
pub mod reader;
pub mod writer;

// exports identifiers from private sub-modules in the current module namespace
pub use self::error::{Result, ShapefileError};
pub use self::header::{
    read_index, IndexEntry, RecordHeader, ShapefileHeader, FILE_CODE, HEADER_SIZE, VERSION,
};
pub use self::reader::{ReaderState, ShapeRecord, ShapefileReader};
pub use self::writer::{ShapefileWriter, WriterState};

use std::path::{Path, PathBuf};

/// Adds the `.shp` extension to a path that has none.
pub(crate) fn shp_path(file_name: &Path) -> PathBuf {
    if file_name.extension().is_none() {
        file_name.with_extension("shp")
    } else {
        file_name.to_path_buf()
    }
}
