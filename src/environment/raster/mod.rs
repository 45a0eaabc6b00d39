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

//! Sub-module responsible for reading raster sources
//! into a raw payload.
//!
//! Payload keeps the data in the order in which it is stored
//! on disk, together with the information which dimension
//! is latitude, longitude and time. Axis values are not
//! touched either, conversion to the canonical form is done
//! by the [`normalize`](super::grid::normalize) step.

pub mod array_file;
pub mod ascii_grid;
pub mod discovery;

use crate::configuration::{SourceKind, TemporalResolution};
use crate::{errors::LoadError, Float};
use log::debug;
use std::path::Path;

/// What the coordinate values of an axis denote.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CoordinateConvention {
    CellCentre,
    CellCorner,
}

/// Axis values as read from the source.
#[derive(Clone, PartialEq, Debug)]
pub struct RawAxis {
    pub values: Vec<Float>,

    /// Spacing declared by the source, needed when
    /// the axis has a single value.
    pub spacing: Option<Float>,
}

impl RawAxis {
    pub fn new(values: Vec<Float>) -> Self {
        RawAxis {
            values,
            spacing: None,
        }
    }
}

/// Positions of the geographical axes among
/// the dimensions of the raw data.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct AxisLayout {
    pub lat: usize,
    pub lon: usize,
    pub time: Option<usize>,
}

impl AxisLayout {
    pub fn ndim(&self) -> usize {
        if self.time.is_some() {
            3
        } else {
            2
        }
    }
}

/// Data of a single variable as read from the source,
/// before any normalization.
#[derive(Clone, PartialEq, Debug)]
pub struct RawGridPayload {
    pub variable: String,
    pub lats: RawAxis,
    pub lons: RawAxis,

    /// Labels of the read time slices.
    pub times: Vec<u32>,

    /// Row-major shape of `data` in on-disk dimension order.
    pub shape: Vec<usize>,
    pub data: Vec<Float>,
    pub layout: AxisLayout,
    pub missing_value: Float,
    pub convention: CoordinateConvention,
    pub units: String,
}

/// Reads the whole variable from the raster file.
///
/// For ASCII grids the `variable` is only used to label
/// the payload, as they hold a single band.
pub fn load(
    path: &Path,
    variable: &str,
    kind: SourceKind,
    resolution: TemporalResolution,
) -> Result<RawGridPayload, LoadError> {
    debug!(
        "Loading variable {} from {} ({:?}, {})",
        variable,
        path.display(),
        kind,
        resolution
    );

    match kind {
        SourceKind::AsciiGrid => ascii_grid::load(path, variable, resolution),
        SourceKind::ArrayFile => {
            array_file::ArrayFileSource::open(path, variable, resolution)?.read_all()
        }
    }
}
