/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: June 21, 2017
Last Modified: 16/10/2026
License: MIT
*/

#[macro_use]
extern crate log;

// private sub-module defined in other files
pub mod shapefile;

// exports identifiers from private sub-modules in the current module namespace
pub use crate::shapefile::geometry::*;
pub use crate::shapefile::{
    read_index, IndexEntry, ReaderState, Result, ShapeRecord, ShapefileError, ShapefileHeader,
    ShapefileReader, ShapefileWriter, WriterState,
};
pub use shp_common::structures::{BoundingBox, Point2D, ValueRange};
