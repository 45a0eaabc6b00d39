/*
Copyright 2022 Jakub Lewandowski

This file is part of Environmental Grid Resampler (EGR).

Environmental Grid Resampler (EGR) is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

Environmental Grid Resampler (EGR) is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with Environmental Grid Resampler (EGR). If not, see https://www.gnu.org/licenses/.
*/

//! Reader of variables stored in self-describing
//! multidimensional array files (netCDF).
//!
//! The file is opened once and kept open, so that the
//! windowed store can read consecutive periods from the
//! same handle without repeating axis discovery.

use super::discovery::discover_layout;
use super::{AxisLayout, CoordinateConvention, RawAxis, RawGridPayload};
use crate::configuration::TemporalResolution;
use crate::constants::MISSING_VALUE_ATTRIBUTES;
use crate::{errors::LoadError, Float};
use log::debug;
use netcdf::types::{FloatType, IntType, NcVariableType};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// On-disk numeric encodings that can be read.
/// All of them are promoted to [`Float`] on read.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Encoding {
    F32,
    F64,
    I32,
    I16,
}

impl Encoding {
    fn of(var: &netcdf::Variable, variable: &str) -> Result<Self, LoadError> {
        match var.vartype() {
            NcVariableType::Float(FloatType::F32) => Ok(Encoding::F32),
            NcVariableType::Float(FloatType::F64) => Ok(Encoding::F64),
            NcVariableType::Int(IntType::I32) => Ok(Encoding::I32),
            NcVariableType::Int(IntType::I16) => Ok(Encoding::I16),
            other => Err(LoadError::UnsupportedEncoding {
                variable: variable.to_string(),
                encoding: format!("{:?}", other),
            }),
        }
    }

    fn read(self, var: &netcdf::Variable, extents: &[Range<usize>]) -> Result<Vec<Float>, LoadError> {
        let values = match self {
            Encoding::F32 => var
                .get_values::<f32, _>(extents)?
                .into_iter()
                .map(Float::from)
                .collect(),
            Encoding::F64 => var.get_values::<f64, _>(extents)?,
            Encoding::I32 => var
                .get_values::<i32, _>(extents)?
                .into_iter()
                .map(Float::from)
                .collect(),
            Encoding::I16 => var
                .get_values::<i16, _>(extents)?
                .into_iter()
                .map(Float::from)
                .collect(),
        };

        Ok(values)
    }

    /// Sentinel as it compares against promoted data.
    ///
    /// A double attribute on a float variable (e.g. `1e20`)
    /// is only equal to the promoted data after rounding through `f32`.
    fn promote_sentinel(self, value: Float) -> Float {
        match self {
            Encoding::F32 => Float::from(value as f32),
            _ => value,
        }
    }
}

/// Open netCDF file with a resolved variable layout.
pub struct ArrayFileSource {
    file: netcdf::File,
    path: PathBuf,
    variable: String,
    resolution: TemporalResolution,
    layout: AxisLayout,
    shape: Vec<usize>,
    encoding: Encoding,
    lats: RawAxis,
    lons: RawAxis,
    missing_value: Float,
    units: String,
}

impl ArrayFileSource {
    /// Opens the file, discovers the axes of the variable
    /// and reads everything except the data itself.
    pub fn open(
        path: &Path,
        variable: &str,
        resolution: TemporalResolution,
    ) -> Result<Self, LoadError> {
        debug!("Opening {} to read {}", path.display(), variable);

        let file = netcdf::open(path)?;

        let (layout, shape, encoding, missing_value, units, lats, lons) = {
            let var = file
                .variable(variable)
                .ok_or_else(|| LoadError::VariableNotFound(variable.to_string()))?;

            let dimensions: Vec<String> =
                var.dimensions().iter().map(|d| d.name().to_string()).collect();
            let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();

            let layout = discover_layout(&dimensions, variable, resolution)?;
            debug!(
                "Discovered axes of {}: {:?} in dimensions {:?}",
                variable, layout, dimensions
            );

            let encoding = Encoding::of(&var, variable)?;
            let missing_value = encoding.promote_sentinel(read_missing_value(&var, variable)?);
            let units = read_units(&var);

            let lats = read_coordinate(&file, &dimensions[layout.lat])?;
            let lons = read_coordinate(&file, &dimensions[layout.lon])?;

            (layout, shape, encoding, missing_value, units, lats, lons)
        };

        Ok(ArrayFileSource {
            file,
            path: path.to_path_buf(),
            variable: variable.to_string(),
            resolution,
            layout,
            shape,
            encoding,
            lats,
            lons,
            missing_value,
            units,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> AxisLayout {
        self.layout
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn missing_value(&self) -> Float {
        self.missing_value
    }

    /// Number of time slices in the file, `1` for 2-D variables.
    pub fn time_len(&self) -> usize {
        self.layout.time.map_or(1, |t| self.shape[t])
    }

    /// Reads all time slices of the variable.
    pub fn read_all(&self) -> Result<RawGridPayload, LoadError> {
        self.read_slab(0, self.time_len())
    }

    /// Reads `length` consecutive time slices starting at `offset`.
    ///
    /// A 2-D variable has a single slice valid for every
    /// period, so it is returned regardless of the `offset`.
    pub fn read_window(&self, offset: usize, length: usize) -> Result<RawGridPayload, LoadError> {
        if self.layout.time.is_none() {
            return self.read_slab(0, 1);
        }

        let available = self.time_len();

        if offset + length > available {
            return Err(LoadError::WindowOutOfRange {
                offset,
                length,
                available,
            });
        }

        self.read_slab(offset, length)
    }

    fn read_slab(&self, offset: usize, length: usize) -> Result<RawGridPayload, LoadError> {
        let var = self
            .file
            .variable(&self.variable)
            .ok_or_else(|| LoadError::VariableNotFound(self.variable.clone()))?;

        let mut shape = self.shape.clone();
        if let Some(t) = self.layout.time {
            shape[t] = length;
        }

        let extents: Vec<Range<usize>> = self
            .shape
            .iter()
            .enumerate()
            .map(|(dim, &len)| {
                if Some(dim) == self.layout.time {
                    offset..offset + length
                } else {
                    0..len
                }
            })
            .collect();

        let data = self.encoding.read(&var, &extents)?;

        let times = if self.layout.time.is_some() {
            (offset..offset + length)
                .map(|i| self.resolution.time_label(i))
                .collect()
        } else {
            vec![self.resolution.time_label(0)]
        };

        Ok(RawGridPayload {
            variable: self.variable.clone(),
            lats: self.lats.clone(),
            lons: self.lons.clone(),
            times,
            shape,
            data,
            layout: self.layout,
            missing_value: self.missing_value,
            convention: CoordinateConvention::CellCentre,
            units: self.units.clone(),
        })
    }
}

/// Checks if a variable has an attribute with the given name
/// without asking the library for a missing one.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Reads the missing-value sentinel trying attribute
/// synonyms in order. Absence of all of them is fatal.
fn read_missing_value(var: &netcdf::Variable, variable: &str) -> Result<Float, LoadError> {
    let name = MISSING_VALUE_ATTRIBUTES
        .iter()
        .find(|name| has_attr(var, name))
        .ok_or_else(|| LoadError::MissingValueNotFound(variable.to_string()))?;

    let value = var
        .attribute_value(name)
        .ok_or_else(|| LoadError::MissingValueNotFound(variable.to_string()))??;

    Float::try_from(value).map_err(|_| {
        LoadError::MalformedAttribute(format!("{} of {} is not a number", name, variable))
    })
}

fn read_units(var: &netcdf::Variable) -> String {
    if !has_attr(var, "units") {
        return String::new();
    }

    match var.attribute_value("units") {
        Some(Ok(netcdf::AttributeValue::Str(units))) => units,
        _ => String::new(),
    }
}

/// Reads values of the coordinate variable
/// which shares the name with the dimension.
fn read_coordinate(file: &netcdf::File, dimension: &str) -> Result<RawAxis, LoadError> {
    let var = file
        .variable(dimension)
        .ok_or_else(|| LoadError::VariableNotFound(dimension.to_string()))?;

    let values = var.get_values::<f64, _>(..)?;

    if values.is_empty() {
        return Err(LoadError::MalformedData(format!(
            "coordinate {} is empty",
            dimension
        )));
    }

    Ok(RawAxis::new(values))
}
