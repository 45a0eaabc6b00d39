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

use super::{fill_cells, EnvironmentalLayer};
use crate::configuration::{SourceKind, TemporalResolution};
use crate::environment::cell::GridCell;
use crate::environment::grid::{normalize::normalize, CanonicalGrid};
use crate::environment::raster;
use crate::environment::resample::{area_weighted_value, QueryCell, Sample};
use crate::errors::{EnvironmentError, ResampleError};
use crate::Float;
use log::info;
use std::path::Path;

/// Layer holding the whole declared time range in memory.
///
/// The grid is built once at construction and never
/// modified afterwards, so the store can be shared
/// between threads for reading.
#[derive(Clone, Debug)]
pub struct StaticStore {
    name: String,
    grid: CanonicalGrid,
}

impl StaticStore {
    /// Loads every time slice of `variable` from the file
    /// and normalizes it.
    pub fn open(
        name: &str,
        path: &Path,
        variable: &str,
        kind: SourceKind,
        resolution: TemporalResolution,
    ) -> Result<Self, EnvironmentError> {
        let payload = raster::load(path, variable, kind, resolution)?;
        let grid = normalize(payload)?;

        info!(
            "Layer {} loaded: {} x {} cells, {} time slices",
            name,
            grid.num_lats(),
            grid.num_lons(),
            grid.num_times()
        );

        Ok(Self::from_grid(name, grid))
    }

    /// Wraps a grid constructed outside of the raster loaders,
    /// eg. synthesized from a remote data service.
    pub fn from_grid(name: &str, grid: CanonicalGrid) -> Self {
        StaticStore {
            name: name.to_string(),
            grid,
        }
    }

    pub fn grid(&self) -> &CanonicalGrid {
        &self.grid
    }

    /// Writes values of all held time slices into the cells.
    pub fn fill_cells(&self, cells: &mut [GridCell]) -> Result<(), ResampleError> {
        fill_cells(&self.grid, &self.name, cells, 0..self.grid.num_times(), 0)
    }
}

impl EnvironmentalLayer for StaticStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn missing_value(&self) -> Float {
        self.grid.missing_value()
    }

    fn get_value(
        &self,
        lat: Float,
        lon: Float,
        time_index: usize,
        lat_size: Float,
        lon_size: Float,
    ) -> Result<Sample, ResampleError> {
        area_weighted_value(
            &self.grid,
            &QueryCell {
                lat,
                lon,
                lat_size,
                lon_size,
                time_index,
            },
        )
    }
}
