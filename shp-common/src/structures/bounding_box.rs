/*
This code is part of the WhiteboxTools geospatial analysis library.
Authors: Dr. John Lindsay
Created: Unknown
Last Modified: 12/10/2026
License: MIT
*/
use super::Point2D;
use serde::{Deserialize, Serialize};
use std::f64;
use std::fmt;

/// An axis-aligned x-y bound.
///
/// `BoundingBox::empty()` is a sentinel (min = +inf, max = -inf) that adopts
/// the bound of whatever is first merged into it. It is never a valid
/// geometry bound; check `is_empty()` before presenting it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        let (x1, x2) = if min_x < max_x {
            (min_x, max_x)
        } else {
            (max_x, min_x)
        };
        let (y1, y2) = if min_y < max_y {
            (min_y, max_y)
        } else {
            (max_y, min_y)
        };
        BoundingBox {
            min_x: x1,
            min_y: y1,
            max_x: x2,
            max_y: y2,
        }
    }

    pub fn empty() -> BoundingBox {
        BoundingBox {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    /// The smallest box containing every point in `points`.
    pub fn from_points(points: &[Point2D]) -> BoundingBox {
        let mut bb = BoundingBox::empty();
        for p in points {
            bb.expand_to_point(p);
        }
        bb
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn expand_to(&mut self, other: BoundingBox) {
        if other.is_empty() {
            return;
        }
        self.max_y = if self.max_y >= other.max_y { self.max_y } else { other.max_y };
        self.max_x = if self.max_x >= other.max_x { self.max_x } else { other.max_x };
        self.min_y = if self.min_y <= other.min_y { self.min_y } else { other.min_y };
        self.min_x = if self.min_x <= other.min_x { self.min_x } else { other.min_x };
    }

    pub fn expand_to_point(&mut self, p: &Point2D) {
        if p.x < self.min_x {
            self.min_x = p.x;
        }
        if p.x > self.max_x {
            self.max_x = p.x;
        }
        if p.y < self.min_y {
            self.min_y = p.y;
        }
        if p.y > self.max_y {
            self.max_y = p.y;
        }
    }

    /// Returns the union of the two boxes.
    pub fn merge(mut self, other: BoundingBox) -> BoundingBox {
        self.expand_to(other);
        self
    }
}

impl Default for BoundingBox {
    fn default() -> BoundingBox {
        BoundingBox::empty()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(min_x: {}, min_y: {}, max_x: {}, max_y: {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// The extent of a single measured dimension, used for the z and m ranges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> ValueRange {
        ValueRange { min: min, max: max }
    }

    pub fn empty() -> ValueRange {
        ValueRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn from_values(values: &[f64]) -> ValueRange {
        let mut r = ValueRange::empty();
        for v in values {
            r.expand_to_value(*v);
        }
        r
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn expand_to_value(&mut self, value: f64) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn expand_to(&mut self, other: ValueRange) {
        if other.is_empty() {
            return;
        }
        self.expand_to_value(other.min);
        self.expand_to_value(other.max);
    }

    pub fn merge(mut self, other: ValueRange) -> ValueRange {
        self.expand_to(other);
        self
    }
}

impl Default for ValueRange {
    fn default() -> ValueRange {
        ValueRange::empty()
    }
}
