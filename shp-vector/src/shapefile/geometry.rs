/*
This file is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: 10/04/2018
Last Modified: 14/10/2026
License: MIT
*/
use super::error::{Result, ShapefileError};
use shp_common::structures::{BoundingBox, Point2D, ValueRange};
use shp_common::utils::{ByteOrderReader, ByteOrderWriter, Endianness};
use std::fmt;
use std::io::prelude::*;

// Payload sizes in bytes. Every record content starts with a 4-byte type code.
const TYPE_CODE_BYTES: u64 = 4;
const BOX_BYTES: u64 = 32;
const RANGE_BYTES: u64 = 16;

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeType {
    Null = 0,
    Point = 1,
    PolyLine = 3,
    Polygon = 5,
    MultiPoint = 8,
    PointZ = 11,
    PolyLineZ = 13,
    PolygonZ = 15,
    MultiPointZ = 18,
    PointM = 21,
    PolyLineM = 23,
    PolygonM = 25,
    MultiPointM = 28,
    MultiPatch = 31,
}

impl ShapeType {
    pub fn from_int(value: i32) -> Result<ShapeType> {
        match value {
            0 => Ok(ShapeType::Null),
            1 => Ok(ShapeType::Point),
            3 => Ok(ShapeType::PolyLine),
            5 => Ok(ShapeType::Polygon),
            8 => Ok(ShapeType::MultiPoint),
            11 => Ok(ShapeType::PointZ),
            13 => Ok(ShapeType::PolyLineZ),
            15 => Ok(ShapeType::PolygonZ),
            18 => Ok(ShapeType::MultiPointZ),
            21 => Ok(ShapeType::PointM),
            23 => Ok(ShapeType::PolyLineM),
            25 => Ok(ShapeType::PolygonM),
            28 => Ok(ShapeType::MultiPointM),
            31 => Ok(ShapeType::MultiPatch),
            _ => Err(ShapefileError::UnknownShapeType(value)),
        }
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }

    pub fn base_shape_type(&self) -> ShapeType {
        match self {
            ShapeType::Null => ShapeType::Null,
            ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => ShapeType::Point,
            ShapeType::PolyLine | ShapeType::PolyLineZ | ShapeType::PolyLineM => {
                ShapeType::PolyLine
            }
            ShapeType::Polygon | ShapeType::PolygonZ | ShapeType::PolygonM => ShapeType::Polygon,
            ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
                ShapeType::MultiPoint
            }
            ShapeType::MultiPatch => ShapeType::MultiPatch,
        }
    }

    pub fn dimension(&self) -> ShapeTypeDimension {
        match self {
            ShapeType::Null
            | ShapeType::MultiPoint
            | ShapeType::Point
            | ShapeType::Polygon
            | ShapeType::PolyLine => ShapeTypeDimension::XY,
            ShapeType::MultiPointM
            | ShapeType::PointM
            | ShapeType::PolygonM
            | ShapeType::PolyLineM => ShapeTypeDimension::Measure,
            ShapeType::MultiPointZ
            | ShapeType::PointZ
            | ShapeType::PolygonZ
            | ShapeType::PolyLineZ
            | ShapeType::MultiPatch => ShapeTypeDimension::Z,
        }
    }

    pub fn has_z(&self) -> bool {
        self.dimension() == ShapeTypeDimension::Z
    }

    /// True when the type can carry measures. For the z types the measure
    /// block is optional.
    pub fn has_m(&self) -> bool {
        self.dimension() != ShapeTypeDimension::XY
    }
}

#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ShapeTypeDimension {
    XY,
    Measure,
    Z,
}

impl Default for ShapeType {
    fn default() -> ShapeType {
        ShapeType::Null
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let printable = match *self {
            ShapeType::Null => "Null",
            ShapeType::Point => "Point",
            ShapeType::PolyLine => "PolyLine",
            ShapeType::Polygon => "Polygon",
            ShapeType::MultiPoint => "MultiPoint",
            ShapeType::PointZ => "PointZ",
            ShapeType::PolyLineZ => "PolyLineZ",
            ShapeType::PolygonZ => "PolygonZ",
            ShapeType::MultiPointZ => "MultiPointZ",
            ShapeType::PointM => "PointM",
            ShapeType::PolyLineM => "PolyLineM",
            ShapeType::PolygonM => "PolygonM",
            ShapeType::MultiPointM => "MultiPointM",
            ShapeType::MultiPatch => "MultiPatch",
        };
        write!(f, "{}", printable)
    }
}

/// The kind of surface patch a MultiPatch part describes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PatchType {
    TriangleStrip = 0,
    TriangleFan = 1,
    OuterRing = 2,
    InnerRing = 3,
    FirstRing = 4,
    Ring = 5,
}

impl PatchType {
    pub fn from_int(value: i32) -> Option<PatchType> {
        match value {
            0 => Some(PatchType::TriangleStrip),
            1 => Some(PatchType::TriangleFan),
            2 => Some(PatchType::OuterRing),
            3 => Some(PatchType::InnerRing),
            4 => Some(PatchType::FirstRing),
            5 => Some(PatchType::Ring),
            _ => None,
        }
    }

    pub fn to_int(&self) -> i32 {
        *self as i32
    }
}

/// A run of z or m values, one per point, with its range.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueArray {
    pub range: ValueRange,
    pub values: Vec<f64>,
}

impl ValueArray {
    pub fn new(values: Vec<f64>) -> ValueArray {
        ValueArray {
            range: ValueRange::from_values(&values),
            values: values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The range spanned by the current values.
    pub fn extent(&self) -> ValueRange {
        ValueRange::from_values(&self.values)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointM {
    pub point: Point2D,
    pub m: f64,
}

impl PointM {
    pub fn new(x: f64, y: f64, m: f64) -> PointM {
        PointM {
            point: Point2D::new(x, y),
            m: m,
        }
    }
}

/// A 3-D point. The measure is optional in the file layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointZ {
    pub point: Point2D,
    pub z: f64,
    pub m: Option<f64>,
}

impl PointZ {
    pub fn new(x: f64, y: f64, z: f64) -> PointZ {
        PointZ {
            point: Point2D::new(x, y),
            z: z,
            m: None,
        }
    }

    pub fn with_measure(mut self, m: f64) -> PointZ {
        self.m = Some(m);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPoint {
    pub bbox: BoundingBox,
    pub points: Vec<Point2D>,
}

impl MultiPoint {
    pub fn new(points: Vec<Point2D>) -> MultiPoint {
        MultiPoint {
            bbox: BoundingBox::from_points(&points),
            points: points,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPointM {
    pub bbox: BoundingBox,
    pub points: Vec<Point2D>,
    pub m: ValueArray,
}

impl MultiPointM {
    pub fn new(points: Vec<Point2D>, measures: Vec<f64>) -> Result<MultiPointM> {
        check_parallel("measure", measures.len(), points.len())?;
        Ok(MultiPointM {
            bbox: BoundingBox::from_points(&points),
            points: points,
            m: ValueArray::new(measures),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPointZ {
    pub bbox: BoundingBox,
    pub points: Vec<Point2D>,
    pub z: ValueArray,
    pub m: Option<ValueArray>,
}

impl MultiPointZ {
    pub fn new(points: Vec<Point2D>, z_values: Vec<f64>) -> Result<MultiPointZ> {
        check_parallel("z", z_values.len(), points.len())?;
        Ok(MultiPointZ {
            bbox: BoundingBox::from_points(&points),
            points: points,
            z: ValueArray::new(z_values),
            m: None,
        })
    }

    pub fn with_measures(mut self, measures: Vec<f64>) -> Result<MultiPointZ> {
        check_parallel("measure", measures.len(), self.points.len())?;
        self.m = Some(ValueArray::new(measures));
        Ok(self)
    }
}

/// The payload of PolyLine and Polygon shapes: one flat point sequence
/// partitioned by part start offsets.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPart {
    pub bbox: BoundingBox,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
}

impl MultiPart {
    pub fn new(parts: Vec<i32>, points: Vec<Point2D>) -> Result<MultiPart> {
        check_parts(&parts, points.len()).map_err(ShapefileError::MalformedShape)?;
        Ok(MultiPart {
            bbox: BoundingBox::from_points(&points),
            parts: parts,
            points: points,
        })
    }

    /// Flattens a list of rings into one point sequence. Empty rings are
    /// dropped since a part must contain at least one point.
    pub fn from_rings<R: AsRef<[Point2D]>>(rings: &[R]) -> MultiPart {
        let (parts, points) = flatten(rings);
        MultiPart {
            bbox: BoundingBox::from_points(&points),
            parts: parts,
            points: points,
        }
    }

    pub fn part(&self, index: usize) -> Option<&[Point2D]> {
        part_slice(&self.parts, &self.points, index)
    }

    /// Slices the flat point sequence back into its rings.
    pub fn rings(&self) -> Vec<&[Point2D]> {
        part_slices(&self.parts, &self.points)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPartM {
    pub bbox: BoundingBox,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
    pub m: ValueArray,
}

impl MultiPartM {
    pub fn from_rings<R: AsRef<[Point2D]>, M: AsRef<[f64]>>(
        rings: &[R],
        measures: &[M],
    ) -> Result<MultiPartM> {
        let (parts, points) = flatten(rings);
        let m = flatten_parallel("measure", &parts, points.len(), measures)?;
        Ok(MultiPartM {
            bbox: BoundingBox::from_points(&points),
            parts: parts,
            points: points,
            m: m,
        })
    }

    pub fn part(&self, index: usize) -> Option<&[Point2D]> {
        part_slice(&self.parts, &self.points, index)
    }

    pub fn rings(&self) -> Vec<&[Point2D]> {
        part_slices(&self.parts, &self.points)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MultiPartZ {
    pub bbox: BoundingBox,
    pub parts: Vec<i32>,
    pub points: Vec<Point2D>,
    pub z: ValueArray,
    pub m: Option<ValueArray>,
}

impl MultiPartZ {
    pub fn from_rings<R: AsRef<[Point2D]>, Z: AsRef<[f64]>>(
        rings: &[R],
        z_values: &[Z],
    ) -> Result<MultiPartZ> {
        let (parts, points) = flatten(rings);
        let z = flatten_parallel("z", &parts, points.len(), z_values)?;
        Ok(MultiPartZ {
            bbox: BoundingBox::from_points(&points),
            parts: parts,
            points: points,
            z: z,
            m: None,
        })
    }

    pub fn with_measures<M: AsRef<[f64]>>(mut self, measures: &[M]) -> Result<MultiPartZ> {
        self.m = Some(flatten_parallel(
            "measure",
            &self.parts,
            self.points.len(),
            measures,
        )?);
        Ok(self)
    }

    pub fn part(&self, index: usize) -> Option<&[Point2D]> {
        part_slice(&self.parts, &self.points, index)
    }

    pub fn rings(&self) -> Vec<&[Point2D]> {
        part_slices(&self.parts, &self.points)
    }
}

/// A set of surface patches. The part types are carried through the codec
/// untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiPatch {
    pub bbox: BoundingBox,
    pub parts: Vec<i32>,
    pub part_types: Vec<PatchType>,
    pub points: Vec<Point2D>,
    pub z: ValueArray,
    pub m: Option<ValueArray>,
}

impl MultiPatch {
    pub fn from_patches<R: AsRef<[Point2D]>, Z: AsRef<[f64]>>(
        patches: &[(PatchType, R)],
        z_values: &[Z],
    ) -> Result<MultiPatch> {
        let rings: Vec<&[Point2D]> = patches.iter().map(|(_, r)| r.as_ref()).collect();
        let part_types: Vec<PatchType> = patches
            .iter()
            .filter(|(_, r)| !r.as_ref().is_empty())
            .map(|(t, _)| *t)
            .collect();
        let (parts, points) = flatten(&rings);
        let z = flatten_parallel("z", &parts, points.len(), z_values)?;
        Ok(MultiPatch {
            bbox: BoundingBox::from_points(&points),
            parts: parts,
            part_types: part_types,
            points: points,
            z: z,
            m: None,
        })
    }

    pub fn with_measures<M: AsRef<[f64]>>(mut self, measures: &[M]) -> Result<MultiPatch> {
        self.m = Some(flatten_parallel(
            "measure",
            &self.parts,
            self.points.len(),
            measures,
        )?);
        Ok(self)
    }

    pub fn part(&self, index: usize) -> Option<&[Point2D]> {
        part_slice(&self.parts, &self.points, index)
    }

    pub fn rings(&self) -> Vec<&[Point2D]> {
        part_slices(&self.parts, &self.points)
    }
}

/// A single shapefile geometry record.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Null,
    Point(Point2D),
    PointM(PointM),
    PointZ(PointZ),
    MultiPoint(MultiPoint),
    MultiPointM(MultiPointM),
    MultiPointZ(MultiPointZ),
    PolyLine(MultiPart),
    PolyLineM(MultiPartM),
    PolyLineZ(MultiPartZ),
    Polygon(MultiPart),
    PolygonM(MultiPartM),
    PolygonZ(MultiPartZ),
    MultiPatch(MultiPatch),
}

impl Shape {
    pub fn point(x: f64, y: f64) -> Shape {
        Shape::Point(Point2D::new(x, y))
    }

    pub fn polyline<R: AsRef<[Point2D]>>(rings: &[R]) -> Shape {
        Shape::PolyLine(MultiPart::from_rings(rings))
    }

    pub fn polygon<R: AsRef<[Point2D]>>(rings: &[R]) -> Shape {
        Shape::Polygon(MultiPart::from_rings(rings))
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Null => ShapeType::Null,
            Shape::Point(_) => ShapeType::Point,
            Shape::PointM(_) => ShapeType::PointM,
            Shape::PointZ(_) => ShapeType::PointZ,
            Shape::MultiPoint(_) => ShapeType::MultiPoint,
            Shape::MultiPointM(_) => ShapeType::MultiPointM,
            Shape::MultiPointZ(_) => ShapeType::MultiPointZ,
            Shape::PolyLine(_) => ShapeType::PolyLine,
            Shape::PolyLineM(_) => ShapeType::PolyLineM,
            Shape::PolyLineZ(_) => ShapeType::PolyLineZ,
            Shape::Polygon(_) => ShapeType::Polygon,
            Shape::PolygonM(_) => ShapeType::PolygonM,
            Shape::PolygonZ(_) => ShapeType::PolygonZ,
            Shape::MultiPatch(_) => ShapeType::MultiPatch,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Shape::Null)
    }

    pub fn points(&self) -> &[Point2D] {
        match self {
            Shape::Null => &[],
            Shape::Point(p) => std::slice::from_ref(p),
            Shape::PointM(p) => std::slice::from_ref(&p.point),
            Shape::PointZ(p) => std::slice::from_ref(&p.point),
            Shape::MultiPoint(s) => &s.points,
            Shape::MultiPointM(s) => &s.points,
            Shape::MultiPointZ(s) => &s.points,
            Shape::PolyLine(s) | Shape::Polygon(s) => &s.points,
            Shape::PolyLineM(s) | Shape::PolygonM(s) => &s.points,
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => &s.points,
            Shape::MultiPatch(s) => &s.points,
        }
    }

    /// Part start offsets; empty for shapes without parts.
    pub fn parts(&self) -> &[i32] {
        match self {
            Shape::PolyLine(s) | Shape::Polygon(s) => &s.parts,
            Shape::PolyLineM(s) | Shape::PolygonM(s) => &s.parts,
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => &s.parts,
            Shape::MultiPatch(s) => &s.parts,
            _ => &[],
        }
    }

    pub fn num_points(&self) -> usize {
        self.points().len()
    }

    pub fn num_parts(&self) -> usize {
        self.parts().len()
    }

    /// The x-y bound of the shape's points; empty for Null shapes. It is
    /// computed from the points, not taken from the stored `bbox` field.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_points(self.points())
    }

    /// The z range of the shape's values, computed from the values.
    pub fn z_range(&self) -> Option<ValueRange> {
        match self {
            Shape::PointZ(p) => Some(ValueRange::new(p.z, p.z)),
            Shape::MultiPointZ(s) => Some(s.z.extent()),
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => Some(s.z.extent()),
            Shape::MultiPatch(s) => Some(s.z.extent()),
            _ => None,
        }
    }

    /// The m range of the shape's measures, computed from the values.
    pub fn m_range(&self) -> Option<ValueRange> {
        match self {
            Shape::PointM(p) => Some(ValueRange::new(p.m, p.m)),
            Shape::PointZ(p) => p.m.map(|m| ValueRange::new(m, m)),
            Shape::MultiPointM(s) => Some(s.m.extent()),
            Shape::PolyLineM(s) | Shape::PolygonM(s) => Some(s.m.extent()),
            Shape::MultiPointZ(s) => s.m.as_ref().map(|m| m.extent()),
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => s.m.as_ref().map(|m| m.extent()),
            Shape::MultiPatch(s) => s.m.as_ref().map(|m| m.extent()),
            _ => None,
        }
    }

    fn is_partitioned(&self) -> bool {
        match self.shape_type().base_shape_type() {
            ShapeType::PolyLine | ShapeType::Polygon | ShapeType::MultiPatch => true,
            _ => false,
        }
    }

    /// The rings of a partitioned shape; a single ring holding every point
    /// otherwise.
    pub fn rings(&self) -> Vec<&[Point2D]> {
        match self {
            Shape::PolyLine(s) | Shape::Polygon(s) => s.rings(),
            Shape::PolyLineM(s) | Shape::PolygonM(s) => s.rings(),
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => s.rings(),
            Shape::MultiPatch(s) => s.rings(),
            Shape::Null => vec![],
            _ => vec![self.points()],
        }
    }

    /// Length of the record content in bytes, including the type code.
    fn content_bytes(&self) -> u64 {
        let n = self.num_points() as u64;
        let p = self.num_parts() as u64;
        TYPE_CODE_BYTES
            + match self {
                Shape::Null => 0,
                Shape::Point(_) => 16,
                Shape::PointM(_) => 24,
                Shape::PointZ(pz) => {
                    if pz.m.is_some() {
                        32
                    } else {
                        24
                    }
                }
                Shape::MultiPoint(_) => multipoint_bytes(n),
                Shape::MultiPointM(_) => multipoint_bytes(n) + value_array_bytes(n),
                Shape::MultiPointZ(s) => {
                    multipoint_bytes(n) + value_array_bytes(n) + optional_bytes(&s.m, n)
                }
                Shape::PolyLine(_) | Shape::Polygon(_) => multipart_bytes(p, n),
                Shape::PolyLineM(_) | Shape::PolygonM(_) => {
                    multipart_bytes(p, n) + value_array_bytes(n)
                }
                Shape::PolyLineZ(s) | Shape::PolygonZ(s) => {
                    multipart_bytes(p, n) + value_array_bytes(n) + optional_bytes(&s.m, n)
                }
                Shape::MultiPatch(s) => {
                    multipart_bytes(p, n) + 4 * p + value_array_bytes(n) + optional_bytes(&s.m, n)
                }
            }
    }

    /// Length of the record content in 16-bit words. This is the value
    /// stored in the record header and in the index entry.
    pub fn content_length(&self) -> i32 {
        (self.content_bytes() / 2) as i32
    }

    /// Checks the structural invariants: part offsets, per-point z/m arrays,
    /// one patch type per part, and counts that fit the file format.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_points();
        if self.content_bytes() / 2 > i32::MAX as u64 {
            return Err(ShapefileError::MalformedShape(format!(
                "a {} with {} points is too large for a shapefile record",
                self.shape_type(),
                n
            )));
        }
        if self.is_partitioned() {
            check_parts(self.parts(), n).map_err(ShapefileError::MalformedShape)?;
        }
        match self {
            Shape::MultiPointM(s) => check_parallel("measure", s.m.len(), n),
            Shape::PolyLineM(s) | Shape::PolygonM(s) => check_parallel("measure", s.m.len(), n),
            Shape::MultiPointZ(s) => check_z_and_m(&s.z, &s.m, n),
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => check_z_and_m(&s.z, &s.m, n),
            Shape::MultiPatch(s) => {
                if s.part_types.len() != s.parts.len() {
                    return Err(ShapefileError::MalformedShape(format!(
                        "{} patch types given for {} parts",
                        s.part_types.len(),
                        s.parts.len()
                    )));
                }
                check_z_and_m(&s.z, &s.m, n)
            }
            _ => Ok(()),
        }
    }

    /// Writes the record content: the type code followed by the payload.
    /// Bounds and z/m ranges are written as computed from the coordinates.
    pub fn encode<W: Write>(&self, bow: &mut ByteOrderWriter<W>) -> std::io::Result<()> {
        let bbox = self.bbox();
        bow.set_byte_order(Endianness::LittleEndian);
        bow.write_i32(self.shape_type().to_int())?;
        match self {
            Shape::Null => {}
            Shape::Point(p) => write_points(bow, std::slice::from_ref(p))?,
            Shape::PointM(p) => {
                write_points(bow, std::slice::from_ref(&p.point))?;
                bow.write_f64(p.m)?;
            }
            Shape::PointZ(p) => {
                write_points(bow, std::slice::from_ref(&p.point))?;
                bow.write_f64(p.z)?;
                if let Some(m) = p.m {
                    bow.write_f64(m)?;
                }
            }
            Shape::MultiPoint(s) => {
                write_multipoint_head(bow, &bbox, &s.points)?;
            }
            Shape::MultiPointM(s) => {
                write_multipoint_head(bow, &bbox, &s.points)?;
                write_value_array(bow, &s.m)?;
            }
            Shape::MultiPointZ(s) => {
                write_multipoint_head(bow, &bbox, &s.points)?;
                write_value_array(bow, &s.z)?;
                if let Some(m) = &s.m {
                    write_value_array(bow, m)?;
                }
            }
            Shape::PolyLine(s) | Shape::Polygon(s) => {
                write_multipart_head(bow, &bbox, &s.parts, s.points.len())?;
                write_points(bow, &s.points)?;
            }
            Shape::PolyLineM(s) | Shape::PolygonM(s) => {
                write_multipart_head(bow, &bbox, &s.parts, s.points.len())?;
                write_points(bow, &s.points)?;
                write_value_array(bow, &s.m)?;
            }
            Shape::PolyLineZ(s) | Shape::PolygonZ(s) => {
                write_multipart_head(bow, &bbox, &s.parts, s.points.len())?;
                write_points(bow, &s.points)?;
                write_value_array(bow, &s.z)?;
                if let Some(m) = &s.m {
                    write_value_array(bow, m)?;
                }
            }
            Shape::MultiPatch(s) => {
                write_multipart_head(bow, &bbox, &s.parts, s.points.len())?;
                for t in &s.part_types {
                    bow.write_i32(t.to_int())?;
                }
                write_points(bow, &s.points)?;
                write_value_array(bow, &s.z)?;
                if let Some(m) = &s.m {
                    write_value_array(bow, m)?;
                }
            }
        }
        Ok(())
    }

    /// Reads one record content of `content_length` 16-bit words, starting at
    /// the type code. The counts stored in the payload are cross-checked
    /// against the declared length before any array is read.
    pub fn decode<R: Read + Seek>(
        bor: &mut ByteOrderReader<R>,
        content_length: i32,
    ) -> Result<Shape> {
        if content_length < 2 {
            return Err(ShapefileError::MalformedShape(format!(
                "content length of {} words cannot hold a shape type",
                content_length
            )));
        }
        let declared = content_length as u64 * 2;
        let start = bor.pos();
        bor.set_byte_order(Endianness::LittleEndian);
        let shape_type = ShapeType::from_int(bor.read_i32()?)?;

        let shape = match shape_type {
            ShapeType::Null => {
                expect_length(shape_type, declared, TYPE_CODE_BYTES)?;
                Shape::Null
            }

            ShapeType::Point => {
                expect_length(shape_type, declared, TYPE_CODE_BYTES + 16)?;
                Shape::Point(read_point(bor)?)
            }

            ShapeType::PointM => {
                expect_length(shape_type, declared, TYPE_CODE_BYTES + 24)?;
                Shape::PointM(PointM {
                    point: read_point(bor)?,
                    m: bor.read_f64()?,
                })
            }

            ShapeType::PointZ => {
                let base = TYPE_CODE_BYTES + 24;
                let contains_m = optional_block(shape_type, declared, base, 8)?;
                let point = read_point(bor)?;
                let z = bor.read_f64()?;
                let m = if contains_m {
                    Some(bor.read_f64()?)
                } else {
                    None
                };
                Shape::PointZ(PointZ {
                    point: point,
                    z: z,
                    m: m,
                })
            }

            ShapeType::MultiPoint | ShapeType::MultiPointM | ShapeType::MultiPointZ => {
                let bbox = read_bbox(bor)?;
                let n = read_count(bor, "point")?;
                let mut expected = TYPE_CODE_BYTES + multipoint_bytes(n as u64);
                if shape_type != ShapeType::MultiPoint {
                    expected += value_array_bytes(n as u64);
                }
                let contains_m = if shape_type == ShapeType::MultiPointZ {
                    optional_block(shape_type, declared, expected, value_array_bytes(n as u64))?
                } else {
                    expect_length(shape_type, declared, expected)?;
                    false
                };
                let bbox = if n == 0 { BoundingBox::empty() } else { bbox };
                let points = read_points(bor, n)?;
                match shape_type {
                    ShapeType::MultiPoint => Shape::MultiPoint(MultiPoint {
                        bbox: bbox,
                        points: points,
                    }),
                    ShapeType::MultiPointM => Shape::MultiPointM(MultiPointM {
                        bbox: bbox,
                        points: points,
                        m: read_value_array(bor, n)?,
                    }),
                    _ => {
                        let z = read_value_array(bor, n)?;
                        let m = if contains_m {
                            Some(read_value_array(bor, n)?)
                        } else {
                            None
                        };
                        Shape::MultiPointZ(MultiPointZ {
                            bbox: bbox,
                            points: points,
                            z: z,
                            m: m,
                        })
                    }
                }
            }

            ShapeType::PolyLine
            | ShapeType::Polygon
            | ShapeType::PolyLineM
            | ShapeType::PolygonM
            | ShapeType::PolyLineZ
            | ShapeType::PolygonZ
            | ShapeType::MultiPatch => {
                let bbox = read_bbox(bor)?;
                let p = read_count(bor, "part")?;
                let n = read_count(bor, "point")?;
                let mut expected = TYPE_CODE_BYTES + multipart_bytes(p as u64, n as u64);
                if shape_type == ShapeType::MultiPatch {
                    expected += 4 * p as u64;
                }
                let dim = shape_type.dimension();
                if dim != ShapeTypeDimension::XY {
                    expected += value_array_bytes(n as u64);
                }
                let contains_m = if dim == ShapeTypeDimension::Z {
                    optional_block(shape_type, declared, expected, value_array_bytes(n as u64))?
                } else {
                    expect_length(shape_type, declared, expected)?;
                    false
                };
                let bbox = if n == 0 { BoundingBox::empty() } else { bbox };

                let parts = bor.read_i32_array(p)?;
                check_parts(&parts, n).map_err(ShapefileError::MalformedShape)?;
                let mut part_types = Vec::with_capacity(p);
                if shape_type == ShapeType::MultiPatch {
                    for code in bor.read_i32_array(p)? {
                        part_types.push(PatchType::from_int(code).ok_or_else(|| {
                            ShapefileError::MalformedShape(format!(
                                "unrecognized patch type {}",
                                code
                            ))
                        })?);
                    }
                }
                let points = read_points(bor, n)?;

                match dim {
                    ShapeTypeDimension::XY => {
                        let s = MultiPart {
                            bbox: bbox,
                            parts: parts,
                            points: points,
                        };
                        if shape_type == ShapeType::PolyLine {
                            Shape::PolyLine(s)
                        } else {
                            Shape::Polygon(s)
                        }
                    }
                    ShapeTypeDimension::Measure => {
                        let s = MultiPartM {
                            bbox: bbox,
                            parts: parts,
                            points: points,
                            m: read_value_array(bor, n)?,
                        };
                        if shape_type == ShapeType::PolyLineM {
                            Shape::PolyLineM(s)
                        } else {
                            Shape::PolygonM(s)
                        }
                    }
                    ShapeTypeDimension::Z => {
                        let z = read_value_array(bor, n)?;
                        let m = if contains_m {
                            Some(read_value_array(bor, n)?)
                        } else {
                            None
                        };
                        match shape_type {
                            ShapeType::MultiPatch => Shape::MultiPatch(MultiPatch {
                                bbox: bbox,
                                parts: parts,
                                part_types: part_types,
                                points: points,
                                z: z,
                                m: m,
                            }),
                            ShapeType::PolyLineZ => Shape::PolyLineZ(MultiPartZ {
                                bbox: bbox,
                                parts: parts,
                                points: points,
                                z: z,
                                m: m,
                            }),
                            _ => Shape::PolygonZ(MultiPartZ {
                                bbox: bbox,
                                parts: parts,
                                points: points,
                                z: z,
                                m: m,
                            }),
                        }
                    }
                }
            }
        };

        let consumed = (bor.pos() - start) as u64;
        if consumed != declared {
            return Err(ShapefileError::MalformedShape(format!(
                "{} consumed {} bytes of a {} byte record",
                shape_type, consumed, declared
            )));
        }
        Ok(shape)
    }
}

impl Default for Shape {
    fn default() -> Shape {
        Shape::Null
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} (parts: {}, points: {})",
            self.shape_type(),
            self.num_parts(),
            self.num_points()
        )
    }
}

fn multipoint_bytes(n: u64) -> u64 {
    BOX_BYTES + 4 + 16 * n
}

fn multipart_bytes(p: u64, n: u64) -> u64 {
    BOX_BYTES + 8 + 4 * p + 16 * n
}

fn value_array_bytes(n: u64) -> u64 {
    RANGE_BYTES + 8 * n
}

fn optional_bytes(m: &Option<ValueArray>, n: u64) -> u64 {
    if m.is_some() {
        value_array_bytes(n)
    } else {
        0
    }
}

fn expect_length(shape_type: ShapeType, declared: u64, expected: u64) -> Result<()> {
    if declared != expected {
        return Err(ShapefileError::MalformedShape(format!(
            "{} record declares {} bytes but its counts require {}",
            shape_type, declared, expected
        )));
    }
    Ok(())
}

/// Decides from the declared length whether a trailing optional block (the
/// measures of a z shape) is present.
fn optional_block(shape_type: ShapeType, declared: u64, base: u64, block: u64) -> Result<bool> {
    if declared == base {
        Ok(false)
    } else if declared == base + block {
        Ok(true)
    } else {
        Err(ShapefileError::MalformedShape(format!(
            "{} record declares {} bytes but its counts require {} or {}",
            shape_type,
            declared,
            base,
            base + block
        )))
    }
}

fn read_count<R: Read + Seek>(bor: &mut ByteOrderReader<R>, what: &str) -> Result<usize> {
    let count = bor.read_i32()?;
    if count < 0 {
        return Err(ShapefileError::MalformedShape(format!(
            "negative {} count {}",
            what, count
        )));
    }
    Ok(count as usize)
}

fn read_point<R: Read + Seek>(bor: &mut ByteOrderReader<R>) -> std::io::Result<Point2D> {
    Ok(Point2D::new(bor.read_f64()?, bor.read_f64()?))
}

fn read_points<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    n: usize,
) -> std::io::Result<Vec<Point2D>> {
    let coords = bor.read_f64_array(2 * n)?;
    Ok(coords
        .chunks_exact(2)
        .map(|c| Point2D::new(c[0], c[1]))
        .collect())
}

fn read_bbox<R: Read + Seek>(bor: &mut ByteOrderReader<R>) -> std::io::Result<BoundingBox> {
    Ok(BoundingBox {
        min_x: bor.read_f64()?,
        min_y: bor.read_f64()?,
        max_x: bor.read_f64()?,
        max_y: bor.read_f64()?,
    })
}

fn read_value_array<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    n: usize,
) -> std::io::Result<ValueArray> {
    let min = bor.read_f64()?;
    let max = bor.read_f64()?;
    let values = bor.read_f64_array(n)?;
    let range = if n == 0 {
        ValueRange::empty()
    } else {
        ValueRange::new(min, max)
    };
    Ok(ValueArray {
        range: range,
        values: values,
    })
}

fn write_points<W: Write>(bow: &mut ByteOrderWriter<W>, points: &[Point2D]) -> std::io::Result<()> {
    for p in points {
        bow.write_f64(p.x)?;
        bow.write_f64(p.y)?;
    }
    Ok(())
}

// An empty bound is stored as zeros.
fn write_bbox<W: Write>(bow: &mut ByteOrderWriter<W>, bbox: &BoundingBox) -> std::io::Result<()> {
    if bbox.is_empty() {
        return bow.write_f64_array(&[0f64; 4]);
    }
    bow.write_f64_array(&[bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y])
}

fn write_value_array<W: Write>(
    bow: &mut ByteOrderWriter<W>,
    values: &ValueArray,
) -> std::io::Result<()> {
    let range = values.extent();
    if range.is_empty() {
        bow.write_f64_array(&[0f64; 2])?;
    } else {
        bow.write_f64_array(&[range.min, range.max])?;
    }
    bow.write_f64_array(&values.values)
}

fn write_multipoint_head<W: Write>(
    bow: &mut ByteOrderWriter<W>,
    bbox: &BoundingBox,
    points: &[Point2D],
) -> std::io::Result<()> {
    write_bbox(bow, bbox)?;
    bow.write_i32(points.len() as i32)?;
    write_points(bow, points)
}

fn write_multipart_head<W: Write>(
    bow: &mut ByteOrderWriter<W>,
    bbox: &BoundingBox,
    parts: &[i32],
    num_points: usize,
) -> std::io::Result<()> {
    write_bbox(bow, bbox)?;
    bow.write_i32(parts.len() as i32)?;
    bow.write_i32(num_points as i32)?;
    bow.write_i32_array(parts)
}

/// Part offsets must start at 0, strictly increase and stay below the point
/// count, so that every part is non-empty and the last ends at the point count.
fn check_parts(parts: &[i32], num_points: usize) -> std::result::Result<(), String> {
    if parts.is_empty() {
        if num_points > 0 {
            return Err(format!("{} points but no parts", num_points));
        }
        return Ok(());
    }
    if parts[0] != 0 {
        return Err(format!("first part starts at {} rather than 0", parts[0]));
    }
    for w in parts.windows(2) {
        if w[1] <= w[0] {
            return Err(format!("part offsets {} and {} are not increasing", w[0], w[1]));
        }
    }
    let last = parts[parts.len() - 1];
    if last as usize >= num_points {
        return Err(format!(
            "part offset {} is out of range for {} points",
            last, num_points
        ));
    }
    Ok(())
}

fn check_parallel(what: &str, len: usize, num_points: usize) -> Result<()> {
    if len != num_points {
        return Err(ShapefileError::MalformedShape(format!(
            "{} {} values given for {} points",
            len, what, num_points
        )));
    }
    Ok(())
}

fn check_z_and_m(z: &ValueArray, m: &Option<ValueArray>, num_points: usize) -> Result<()> {
    check_parallel("z", z.len(), num_points)?;
    if let Some(m) = m {
        check_parallel("measure", m.len(), num_points)?;
    }
    Ok(())
}

fn flatten<T: Copy, R: AsRef<[T]>>(rings: &[R]) -> (Vec<i32>, Vec<T>) {
    let mut parts = Vec::with_capacity(rings.len());
    let mut items = vec![];
    for ring in rings {
        let ring = ring.as_ref();
        if ring.is_empty() {
            continue;
        }
        parts.push(items.len() as i32);
        items.extend_from_slice(ring);
    }
    (parts, items)
}

/// Flattens per-ring z or m values; the rings must line up with the point
/// rings that produced `parts`.
fn flatten_parallel<M: AsRef<[f64]>>(
    what: &str,
    parts: &[i32],
    num_points: usize,
    rings: &[M],
) -> Result<ValueArray> {
    let (value_parts, values) = flatten(rings);
    if value_parts != parts || values.len() != num_points {
        return Err(ShapefileError::MalformedShape(format!(
            "{} rings do not line up with the point rings",
            what
        )));
    }
    Ok(ValueArray::new(values))
}

fn part_slice<'a, T>(parts: &[i32], items: &'a [T], index: usize) -> Option<&'a [T]> {
    let start = *parts.get(index)? as usize;
    let end = match parts.get(index + 1) {
        Some(e) => *e as usize,
        None => items.len(),
    };
    items.get(start..end)
}

fn part_slices<'a, T>(parts: &[i32], items: &'a [T]) -> Vec<&'a [T]> {
    (0..parts.len())
        .filter_map(|i| part_slice(parts, items, i))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    fn encode(shape: &Shape) -> Vec<u8> {
        let mut bow = ByteOrderWriter::new(vec![], Endianness::LittleEndian);
        shape.encode(&mut bow).unwrap();
        assert_eq!(
            bow.get_num_bytes_written(),
            shape.content_length() as usize * 2,
            "declared length of {} disagrees with its encoding",
            shape.shape_type()
        );
        bow.into_inner()
    }

    fn decode(bytes: Vec<u8>, content_length: i32) -> Result<Shape> {
        let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::LittleEndian).unwrap();
        Shape::decode(&mut bor, content_length)
    }

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(0.0, 0.0),
        ]
    }

    fn sample_shapes() -> Vec<Shape> {
        let line1 = vec![Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0)];
        let line2 = vec![Point2D::new(10.0, 10.0), Point2D::new(15.0, 15.0)];
        let z1 = vec![0.0, 5.0];
        let z2 = vec![10.0, 15.0];
        vec![
            Shape::Null,
            Shape::point(10.0, 10.0),
            Shape::PointM(PointM::new(10.0, 10.0, 100.0)),
            Shape::PointZ(PointZ::new(10.0, 10.0, 100.0)),
            Shape::PointZ(PointZ::new(5.0, 5.0, 50.0).with_measure(7.0)),
            Shape::MultiPoint(MultiPoint::new(square())),
            Shape::MultiPointM(MultiPointM::new(square(), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap()),
            Shape::MultiPointZ(MultiPointZ::new(square(), vec![0.0, 5.0, 10.0, 15.0, 0.0]).unwrap()),
            Shape::polyline(&[line1.clone(), line2.clone()]),
            Shape::polygon(&[square()]),
            Shape::PolyLineM(MultiPartM::from_rings(&[&line1, &line2], &[&z1, &z2]).unwrap()),
            Shape::PolygonZ(
                MultiPartZ::from_rings(&[square()], &[vec![0.0, 5.0, 10.0, 15.0, 0.0]])
                    .unwrap()
                    .with_measures(&[vec![1.0; 5]])
                    .unwrap(),
            ),
            Shape::MultiPatch(
                MultiPatch::from_patches(
                    &[(PatchType::OuterRing, square()), (PatchType::TriangleFan, line1.clone())],
                    &[vec![0.0; 5], vec![10.0, 10.0]],
                )
                .unwrap(),
            ),
        ]
    }

    #[test]
    fn test_shape_type_codes() {
        for code in [0, 1, 3, 5, 8, 11, 13, 15, 18, 21, 23, 25, 28, 31].iter() {
            assert_eq!(ShapeType::from_int(*code).unwrap().to_int(), *code);
        }
        assert!(matches!(
            ShapeType::from_int(2),
            Err(ShapefileError::UnknownShapeType(2))
        ));
        assert_eq!(ShapeType::PolygonZ.base_shape_type(), ShapeType::Polygon);
        assert!(ShapeType::MultiPatch.has_z());
        assert!(ShapeType::PointM.has_m());
        assert!(!ShapeType::PolyLine.has_m());
    }

    #[test]
    fn test_content_lengths() {
        assert_eq!(Shape::Null.content_length(), 2);
        assert_eq!(Shape::point(1.0, 2.0).content_length(), 10);
        assert_eq!(Shape::PointM(PointM::new(1.0, 2.0, 3.0)).content_length(), 14);
        assert_eq!(Shape::PointZ(PointZ::new(1.0, 2.0, 3.0)).content_length(), 14);
        assert_eq!(
            Shape::PointZ(PointZ::new(1.0, 2.0, 3.0).with_measure(4.0)).content_length(),
            18
        );
        // 4 + 32 + 8 + 4 * 1 + 16 * 5 = 128 bytes
        assert_eq!(Shape::polygon(&[square()]).content_length(), 64);
    }

    #[test]
    fn test_every_variant_decodes_to_itself() {
        for shape in sample_shapes() {
            let bytes = encode(&shape);
            let decoded = decode(bytes, shape.content_length()).unwrap();
            assert_eq!(decoded, shape);
        }
    }

    #[test]
    fn test_rings_are_recovered_from_part_offsets() {
        let rings = vec![
            vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)],
            vec![Point2D::new(2.0, 2.0), Point2D::new(3.0, 3.0), Point2D::new(4.0, 4.0)],
            vec![Point2D::new(5.0, 5.0)],
        ];
        let shape = Shape::polyline(&rings);
        assert_eq!(shape.parts(), &[0, 2, 5]);
        let decoded = decode(encode(&shape), shape.content_length()).unwrap();
        let got: Vec<Vec<Point2D>> = decoded.rings().iter().map(|r| r.to_vec()).collect();
        assert_eq!(got, rings);
        if let Shape::PolyLine(s) = decoded {
            assert_eq!(s.part(1).unwrap().len(), 3);
            assert!(s.part(3).is_none());
        } else {
            panic!("expected a PolyLine");
        }
    }

    #[test]
    fn test_empty_rings_are_dropped() {
        let empty: Vec<Point2D> = vec![];
        let shape = MultiPart::from_rings(&[square(), empty, square()]);
        assert_eq!(shape.parts, vec![0, 5]);
        assert_eq!(shape.rings().len(), 2);
    }

    #[test]
    fn test_misaligned_measures_are_rejected() {
        let line = vec![Point2D::new(0.0, 0.0), Point2D::new(5.0, 5.0)];
        assert!(MultiPartM::from_rings(&[&line], &[vec![1.0]]).is_err());
        assert!(MultiPointZ::new(line.clone(), vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_bad_part_offsets() {
        assert!(MultiPart::new(vec![0, 0], square()).is_err());
        assert!(MultiPart::new(vec![1], square()).is_err());
        assert!(MultiPart::new(vec![0, 5], square()).is_err());
        assert!(MultiPart::new(vec![], square()).is_err());
        assert!(MultiPart::new(vec![], vec![]).is_ok());
        assert!(MultiPart::new(vec![0, 3], square()).is_ok());
    }

    #[test]
    fn test_declared_length_disagreeing_with_counts() {
        let shape = Shape::polyline(&[square()]);
        let mut bytes = encode(&shape);
        bytes.extend_from_slice(&[0u8; 16]);
        let err = decode(bytes, shape.content_length() + 8).unwrap_err();
        assert!(matches!(err, ShapefileError::MalformedShape(_)));

        // a point count that the declared length cannot hold
        let mut bytes = encode(&shape);
        bytes[40..44].copy_from_slice(&1000i32.to_le_bytes());
        let err = decode(bytes, shape.content_length()).unwrap_err();
        assert!(matches!(err, ShapefileError::MalformedShape(_)));
    }

    #[test]
    fn test_negative_count() {
        let shape = Shape::MultiPoint(MultiPoint::new(square()));
        let mut bytes = encode(&shape);
        bytes[36..40].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            decode(bytes, shape.content_length()),
            Err(ShapefileError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_z_measures_detected_from_length() {
        let z = vec![0.0, 5.0, 10.0, 15.0, 0.0];
        let without_m = Shape::MultiPointZ(MultiPointZ::new(square(), z.clone()).unwrap());
        let with_m = Shape::MultiPointZ(
            MultiPointZ::new(square(), z)
                .unwrap()
                .with_measures(vec![9.0; 5])
                .unwrap(),
        );
        assert_eq!(
            with_m.content_length() - without_m.content_length(),
            (16 + 8 * 5) / 2
        );
        let decoded = decode(encode(&without_m), without_m.content_length()).unwrap();
        assert_eq!(decoded.m_range(), None);
        let decoded = decode(encode(&with_m), with_m.content_length()).unwrap();
        assert_eq!(decoded.m_range(), Some(ValueRange::new(9.0, 9.0)));
    }

    #[test]
    fn test_unknown_patch_type() {
        let shape = Shape::MultiPatch(
            MultiPatch::from_patches(&[(PatchType::Ring, square())], &[vec![0.0; 5]]).unwrap(),
        );
        let mut bytes = encode(&shape);
        // the patch type follows the box, the two counts, and one part offset
        bytes[48..52].copy_from_slice(&42i32.to_le_bytes());
        assert!(matches!(
            decode(bytes, shape.content_length()),
            Err(ShapefileError::MalformedShape(_))
        ));
    }

    #[test]
    fn test_validate() {
        for shape in sample_shapes() {
            assert!(shape.validate().is_ok(), "{} failed validation", shape);
        }
        let mut s = MultiPatch::from_patches(&[(PatchType::Ring, square())], &[vec![0.0; 5]])
            .unwrap();
        s.part_types.clear();
        assert!(Shape::MultiPatch(s).validate().is_err());
        let mut s = MultiPartM::from_rings(&[square()], &[vec![0.0; 5]]).unwrap();
        s.m.values.pop();
        assert!(Shape::PolygonM(s).validate().is_err());
    }

    #[test]
    fn test_unpartitioned_shapes_validate() {
        let shapes = vec![
            Shape::point(1.0, 2.0),
            Shape::PointM(PointM::new(1.0, 2.0, 3.0)),
            Shape::PointZ(PointZ::new(1.0, 2.0, 3.0)),
            Shape::MultiPoint(MultiPoint::new(square())),
            Shape::MultiPointM(MultiPointM::new(square(), vec![0.0; 5]).unwrap()),
            Shape::MultiPointZ(MultiPointZ::new(square(), vec![0.0; 5]).unwrap()),
        ];
        for shape in shapes {
            assert!(shape.validate().is_ok(), "{} failed validation", shape);
        }
    }

    #[test]
    fn test_stale_cached_bounds_are_not_written() {
        let mut s = MultiPartM::from_rings(&[square()], &[vec![1.0; 5]]).unwrap();
        s.points.push(Point2D::new(100.0, 100.0));
        s.parts = vec![0];
        s.m.values.push(-3.0);
        let shape = Shape::PolyLineM(s);
        assert_eq!(shape.bbox(), BoundingBox::new(0.0, 100.0, 0.0, 100.0));
        assert_eq!(shape.m_range(), Some(ValueRange::new(-3.0, 1.0)));

        let decoded = decode(encode(&shape), shape.content_length()).unwrap();
        if let Shape::PolyLineM(d) = decoded {
            assert_eq!(d.bbox, BoundingBox::new(0.0, 100.0, 0.0, 100.0));
            assert_eq!(d.m.range, ValueRange::new(-3.0, 1.0));
        } else {
            panic!("expected a PolyLineM");
        }
    }

    #[test]
    fn test_empty_multipoint() {
        let shape = Shape::MultiPoint(MultiPoint::new(vec![]));
        assert!(shape.bbox().is_empty());
        let decoded = decode(encode(&shape), shape.content_length()).unwrap();
        assert_eq!(decoded, shape);
    }

    #[test]
    fn test_shape_bounds() {
        let shape = Shape::PointZ(PointZ::new(3.0, 4.0, 5.0).with_measure(6.0));
        assert_eq!(shape.bbox(), BoundingBox::new(3.0, 3.0, 4.0, 4.0));
        assert_eq!(shape.z_range(), Some(ValueRange::new(5.0, 5.0)));
        assert_eq!(shape.m_range(), Some(ValueRange::new(6.0, 6.0)));
        assert!(Shape::Null.bbox().is_empty());
        assert_eq!(Shape::polygon(&[square()]).bbox(), BoundingBox::new(0.0, 5.0, 0.0, 5.0));
    }
}
