/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 12/10/2026
Last Modified: 14/10/2026
License: MIT
*/
use super::geometry::ShapeType;
use std::io;
use std::sync::Arc;

/// Errors raised while reading or writing a shapefile.
///
/// The error is `Clone` so that a reader that has failed can keep handing
/// out the same failure on every later call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShapefileError {
    /// Bad file code, short header, or otherwise unreadable header.
    #[error("Invalid shapefile format: {0}")]
    InvalidFormat(String),

    /// A record whose counts and declared length cannot be reconciled.
    #[error("Malformed shape: {0}")]
    MalformedShape(String),

    /// A record or shape type that disagrees with the file's governing type.
    #[error("Shape type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ShapeType, found: ShapeType },

    #[error("Unrecognized shape type code: {0}")]
    UnknownShapeType(i32),

    /// The index file and the geometry file disagree on a record boundary.
    #[error("Index entry {entry} disagrees with the geometry file: {reason}")]
    IndexMismatch { entry: usize, reason: String },

    /// The session has been closed or aborted.
    #[error("The shapefile session is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[source] Arc<io::Error>),
}

impl From<io::Error> for ShapefileError {
    fn from(e: io::Error) -> Self {
        ShapefileError::Io(Arc::new(e))
    }
}

pub type Result<T> = std::result::Result<T, ShapefileError>;
