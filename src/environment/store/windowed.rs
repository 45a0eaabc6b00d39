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
use crate::configuration::TemporalResolution;
use crate::environment::cell::GridCell;
use crate::environment::grid::{normalize::normalize, CanonicalGrid};
use crate::environment::raster::array_file::ArrayFileSource;
use crate::environment::resample::{area_weighted_value, QueryCell, Sample};
use crate::errors::{EnvironmentError, ResampleError};
use crate::Float;
use log::{debug, info};
use std::path::Path;

/// Currently materialized period of the layer.
struct Window {
    offset: usize,
    grid: CanonicalGrid,
}

/// Layer holding only one period (year) of data at a time.
///
/// The source file stays open for the lifetime of the store.
/// Each [`load_window`](WindowedStore::load_window) reads the
/// requested period from it and replaces the previous window
/// as a whole, so queries never see a mix of two periods.
pub struct WindowedStore {
    name: String,
    source: ArrayFileSource,
    resolution: TemporalResolution,
    window: Option<Window>,
}

impl WindowedStore {
    /// Opens the file and resolves the variable layout.
    /// No data is read until the first window is loaded.
    pub fn open(
        name: &str,
        path: &Path,
        variable: &str,
        resolution: TemporalResolution,
    ) -> Result<Self, EnvironmentError> {
        let source = ArrayFileSource::open(path, variable, resolution)?;

        debug!(
            "Layer {} opened with {} time slices in {}",
            name,
            source.time_len(),
            source.path().display()
        );

        Ok(WindowedStore {
            name: name.to_string(),
            source,
            resolution,
            window: None,
        })
    }

    /// Replaces the held window with the period starting
    /// at time slice `timestep_elapsed` of the file.
    pub fn load_window(&mut self, timestep_elapsed: usize) -> Result<(), EnvironmentError> {
        let length = self.resolution.slices_per_period();

        // drop the old window before reading the new one
        self.window = None;

        let payload = self.source.read_window(timestep_elapsed, length)?;
        let grid = normalize(payload)?;

        info!(
            "Layer {} window loaded from time slice {} ({} slices)",
            self.name,
            timestep_elapsed,
            grid.num_times()
        );

        self.window = Some(Window {
            offset: timestep_elapsed,
            grid,
        });

        Ok(())
    }

    /// Time slice of the file at which the current window starts.
    pub fn window_offset(&self) -> Option<usize> {
        self.window.as_ref().map(|w| w.offset)
    }

    /// Number of whole periods the file holds, `None` for
    /// a 2-D variable which serves every period.
    pub fn available_periods(&self) -> Option<usize> {
        self.source
            .layout()
            .time
            .map(|_| self.source.time_len() / self.resolution.slices_per_period())
    }

    /// Grid of the current window, if any has been loaded.
    pub fn window(&self) -> Option<&CanonicalGrid> {
        self.window.as_ref().map(|w| &w.grid)
    }

    /// Writes the whole period starting at `timestep_elapsed`
    /// into the cells, loading it first when it is not the
    /// current window.
    ///
    /// Slot position in the cell is relative to the window start.
    pub fn fill_cells_for_window(
        &mut self,
        cells: &mut [GridCell],
        timestep_elapsed: usize,
    ) -> Result<(), EnvironmentError> {
        if self.window_offset() != Some(timestep_elapsed) {
            self.load_window(timestep_elapsed)?;
        }

        let grid = self.current_grid()?;
        let t = timestep_elapsed;

        fill_cells(grid, &self.name, cells, t..t + grid.num_times(), t)?;

        Ok(())
    }

    fn current_grid(&self) -> Result<&CanonicalGrid, ResampleError> {
        self.window()
            .ok_or_else(|| ResampleError::WindowNotLoaded(self.name.clone()))
    }
}

impl EnvironmentalLayer for WindowedStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn missing_value(&self) -> Float {
        self.source.missing_value()
    }

    /// `time_index` is relative to the start of the current window.
    fn get_value(
        &self,
        lat: Float,
        lon: Float,
        time_index: usize,
        lat_size: Float,
        lon_size: Float,
    ) -> Result<Sample, ResampleError> {
        area_weighted_value(
            self.current_grid()?,
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
