//! The polyline bundle data model shared by every algorithm in the crate.
//!
//! A bundle owns one pool of points. Each streamline is an ordered list of
//! indices into that pool. Named attribute arrays carry one tuple per point
//! (`point_attributes`) or one tuple per streamline (`cell_attributes`).
//! Algorithms never mutate their input bundle; they assemble a new one with
//! [`BundleBuilder`].

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::enums::CoordinateSystem;
use crate::error::{FiberError, Result};
use crate::geometry::Point3;

/// Storage of an attribute array, one variant per supported scalar type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValues {
    Float(Vec<f32>),
    Int(Vec<i32>),
    UnsignedChar(Vec<u8>),
}

impl AttributeValues {
    fn raw_len(&self) -> usize {
        match self {
            Self::Float(values) => values.len(),
            Self::Int(values) => values.len(),
            Self::UnsignedChar(values) => values.len(),
        }
    }

    fn empty_like(&self) -> Self {
        match self {
            Self::Float(_) => Self::Float(Vec::new()),
            Self::Int(_) => Self::Int(Vec::new()),
            Self::UnsignedChar(_) => Self::UnsignedChar(Vec::new()),
        }
    }
}

/// A named per-point or per-cell array of fixed-width tuples.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttributeArray {
    pub components: usize,
    pub values: AttributeValues,
}

impl AttributeArray {
    pub fn new(components: usize, values: AttributeValues) -> Self {
        Self { components, values }
    }

    pub fn float(components: usize, values: Vec<f32>) -> Self {
        Self::new(components, AttributeValues::Float(values))
    }

    pub fn int(components: usize, values: Vec<i32>) -> Self {
        Self::new(components, AttributeValues::Int(values))
    }

    pub fn unsigned_char(components: usize, values: Vec<u8>) -> Self {
        Self::new(components, AttributeValues::UnsignedChar(values))
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.values.raw_len().checked_div(self.components).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same kind and width, no tuples.
    pub fn empty_like(&self) -> Self {
        Self::new(self.components, self.values.empty_like())
    }

    /// Scalar value at `index` widened to `f64`, for single-component arrays.
    pub fn scalar(&self, index: usize) -> Option<f64> {
        if self.components != 1 {
            return None;
        }
        match &self.values {
            AttributeValues::Float(values) => values.get(index).map(|&v| f64::from(v)),
            AttributeValues::Int(values) => values.get(index).map(|&v| f64::from(v)),
            AttributeValues::UnsignedChar(values) => values.get(index).map(|&v| f64::from(v)),
        }
    }

    /// Appends the tuple at `index` of `source`.
    pub fn push_tuple_from(&mut self, source: &AttributeArray, index: usize) -> Result<()> {
        if self.components != source.components {
            return Err(FiberError::AttributeMismatch(format!(
                "cannot copy a {}-component tuple into a {}-component array",
                source.components, self.components
            )));
        }
        let range = index * source.components..(index + 1) * source.components;
        let out_of_range = || {
            FiberError::AttributeMismatch(format!(
                "tuple {index} is outside an array of {} tuples",
                source.len()
            ))
        };
        match (&mut self.values, &source.values) {
            (AttributeValues::Float(dst), AttributeValues::Float(src)) => {
                dst.extend_from_slice(src.get(range).ok_or_else(out_of_range)?)
            }
            (AttributeValues::Int(dst), AttributeValues::Int(src)) => {
                dst.extend_from_slice(src.get(range).ok_or_else(out_of_range)?)
            }
            (AttributeValues::UnsignedChar(dst), AttributeValues::UnsignedChar(src)) => {
                dst.extend_from_slice(src.get(range).ok_or_else(out_of_range)?)
            }
            _ => {
                return Err(FiberError::AttributeMismatch(
                    "cannot copy tuples between arrays of different value types".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn validate(&self, name: &str, expected: usize) -> Result<()> {
        if self.components == 0 {
            return Err(FiberError::InvalidBundle(format!(
                "attribute '{name}' has zero components"
            )));
        }
        if self.values.raw_len() % self.components != 0 {
            return Err(FiberError::InvalidBundle(format!(
                "attribute '{name}' holds {} values, not a multiple of {} components",
                self.values.raw_len(),
                self.components
            )));
        }
        if self.len() != expected {
            return Err(FiberError::InvalidBundle(format!(
                "attribute '{name}' has {} tuples, expected {expected}",
                self.len()
            )));
        }
        Ok(())
    }
}

/// Streamlines over a shared point pool, with point and cell attributes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolylineBundle {
    pub points: Vec<Point3>,
    pub streamlines: Vec<Vec<usize>>,
    #[serde(default)]
    pub point_attributes: BTreeMap<String, AttributeArray>,
    #[serde(default)]
    pub cell_attributes: BTreeMap<String, AttributeArray>,
    #[serde(default)]
    pub space: CoordinateSystem,
}

impl PolylineBundle {
    /// Bundle where every streamline owns consecutive points of the pool.
    pub fn from_streamlines<I, S>(streamlines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: IntoIterator<Item = Point3>,
    {
        let mut bundle = Self::default();
        for line in streamlines {
            let start = bundle.points.len();
            bundle.points.extend(line);
            bundle.streamlines.push((start..bundle.points.len()).collect());
        }
        bundle
    }

    pub fn with_space(mut self, space: CoordinateSystem) -> Self {
        self.space = space;
        self
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_streamlines(&self) -> usize {
        self.streamlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streamlines.is_empty()
    }

    /// Checks every index and attribute length invariant, and that all
    /// coordinates are finite.
    pub fn validate(&self) -> Result<()> {
        let num_points = self.points.len();
        if let Some(id) = self
            .points
            .iter()
            .position(|point| point.iter().any(|c| !c.is_finite()))
        {
            return Err(FiberError::InvalidBundle(format!(
                "point {id} has a non-finite coordinate {:?}",
                self.points[id]
            )));
        }
        for (line, ids) in self.streamlines.iter().enumerate() {
            if let Some(&bad) = ids.iter().find(|&&id| id >= num_points) {
                return Err(FiberError::InvalidBundle(format!(
                    "streamline {line} references point {bad}, but the bundle has {num_points} points"
                )));
            }
        }
        for (name, array) in &self.point_attributes {
            array.validate(name, num_points)?;
        }
        for (name, array) in &self.cell_attributes {
            array.validate(name, self.streamlines.len())?;
        }
        Ok(())
    }

    /// Coordinates of streamline `line`, in order.
    pub fn streamline_points(&self, line: usize) -> Result<Vec<Point3>> {
        let ids = self.streamlines.get(line).ok_or_else(|| {
            FiberError::InvalidBundle(format!(
                "streamline {line} does not exist in a bundle of {} streamlines",
                self.streamlines.len()
            ))
        })?;
        ids.iter()
            .map(|&id| {
                self.points.get(id).copied().ok_or_else(|| {
                    FiberError::InvalidBundle(format!(
                        "streamline {line} references point {id}, but the bundle has {} points",
                        self.points.len()
                    ))
                })
            })
            .collect()
    }
}

/// Incrementally assembles an output bundle.
#[derive(Debug, Default)]
pub struct BundleBuilder {
    bundle: PolylineBundle,
}

impl BundleBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty builder whose attribute arrays mirror the names, kinds and
    /// widths of `source`, in the same coordinate system.
    pub fn with_layout_of(source: &PolylineBundle) -> Self {
        let empty = |attributes: &BTreeMap<String, AttributeArray>| {
            attributes
                .iter()
                .map(|(name, array)| (name.clone(), array.empty_like()))
                .collect()
        };
        Self {
            bundle: PolylineBundle {
                point_attributes: empty(&source.point_attributes),
                cell_attributes: empty(&source.cell_attributes),
                space: source.space,
                ..PolylineBundle::default()
            },
        }
    }

    pub fn with_space(mut self, space: CoordinateSystem) -> Self {
        self.bundle.space = space;
        self
    }

    /// Appends a streamline made of fresh points and returns its index.
    ///
    /// # Errors
    ///
    /// Fresh points carry no attribute values, so builders that hold
    /// attribute arrays refuse them with [`FiberError::AttributeMismatch`].
    pub fn push_streamline(
        &mut self,
        points: impl IntoIterator<Item = Point3>,
    ) -> Result<usize> {
        if let Some(name) = self
            .bundle
            .point_attributes
            .keys()
            .chain(self.bundle.cell_attributes.keys())
            .next()
        {
            return Err(FiberError::AttributeMismatch(format!(
                "cannot push a streamline without values for attribute \"{name}\""
            )));
        }
        let start = self.bundle.points.len();
        self.bundle.points.extend(points);
        let ids = (start..self.bundle.points.len()).collect();
        self.bundle.streamlines.push(ids);
        Ok(self.bundle.streamlines.len() - 1)
    }

    /// Copies positions `range` (inclusive, by position along the streamline)
    /// of `source` streamline `line`, with all of their point attributes and
    /// the streamline's cell attributes.
    pub fn push_streamline_from(
        &mut self,
        source: &PolylineBundle,
        line: usize,
        range: RangeInclusive<usize>,
    ) -> Result<usize> {
        let ids = source.streamlines.get(line).ok_or_else(|| {
            FiberError::InvalidBundle(format!("streamline {line} does not exist"))
        })?;
        // an inverted range keeps the streamline with no points
        let kept = if range.is_empty() {
            &ids[..0]
        } else {
            ids.get(range.clone()).ok_or_else(|| {
                FiberError::InvalidBundle(format!(
                    "range {range:?} is outside streamline {line} of {} points",
                    ids.len()
                ))
            })?
        };

        let start = self.bundle.points.len();
        for &id in kept {
            let point = source.points.get(id).copied().ok_or_else(|| {
                FiberError::InvalidBundle(format!("streamline {line} references missing point {id}"))
            })?;
            self.bundle.points.push(point);
            for (name, array) in &mut self.bundle.point_attributes {
                if let Some(source_array) = source.point_attributes.get(name) {
                    array.push_tuple_from(source_array, id)?;
                }
            }
        }
        for (name, array) in &mut self.bundle.cell_attributes {
            if let Some(source_array) = source.cell_attributes.get(name) {
                array.push_tuple_from(source_array, line)?;
            }
        }

        self.bundle
            .streamlines
            .push((start..self.bundle.points.len()).collect());
        Ok(self.bundle.streamlines.len() - 1)
    }

    pub fn num_streamlines(&self) -> usize {
        self.bundle.streamlines.len()
    }

    pub fn build(self) -> PolylineBundle {
        self.bundle
    }
}
