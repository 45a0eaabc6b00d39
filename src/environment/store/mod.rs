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

//! Environmental data stores answering point queries
//! of the simulation.
//!
//! [`StaticStore`] keeps the whole time range of a variable in memory,
//! [`WindowedStore`] keeps only one period (year) at a time and
//! replaces it on request. Both expose the same query contract
//! through [`EnvironmentalLayer`].

mod static_store;
mod windowed;

pub use static_store::StaticStore;
pub use windowed::WindowedStore;

use super::cell::GridCell;
use super::grid::CanonicalGrid;
use super::resample::{area_weighted_value, Sample};
use crate::{errors::ResampleError, Float};
use rayon::prelude::*;
use std::ops::Range;

/// Point-query interface of an environmental layer.
pub trait EnvironmentalLayer {
    /// Name of the slot into which the layer writes in [`GridCell`].
    fn name(&self) -> &str;

    fn missing_value(&self) -> Float;

    /// Area-weighted value of the cell with lower-left corner at
    /// (`lat`, `lon`) and given size, at `time_index` of held data.
    fn get_value(
        &self,
        lat: Float,
        lon: Float,
        time_index: usize,
        lat_size: Float,
        lon_size: Float,
    ) -> Result<Sample, ResampleError>;
}

/// Resamples the grid onto every cell in parallel, writing
/// one sample per time index of `times` into the cell slot of `layer`.
///
/// `times` are absolute time indices, the grid holds them
/// from `offset` on, so both the grid slice and the slot
/// position of index `i` are `i - offset`.
fn fill_cells(
    grid: &CanonicalGrid,
    layer: &str,
    cells: &mut [GridCell],
    times: Range<usize>,
    offset: usize,
) -> Result<(), ResampleError> {
    cells.par_iter_mut().try_for_each(|cell| {
        let samples = times
            .clone()
            .map(|i| area_weighted_value(grid, &cell.query(i - offset)))
            .collect::<Result<Vec<Sample>, ResampleError>>()?;

        cell.set_environment(layer, samples);

        Ok(())
    })
}
