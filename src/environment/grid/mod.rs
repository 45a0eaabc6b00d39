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

//! Canonical in-memory representation of an environmental layer.
//!
//! Every grid, regardless of its source, ends up with ascending
//! latitude and longitude axes holding lower-left cell corners,
//! positive steps and longitudes within `[-180, 180)`.
//! Grids are immutable once constructed.

pub mod normalize;
pub mod transpose;

use crate::{errors::GridError, Float};
use ndarray::{Array3, ArrayView2};

/// Ascending axis of lower-left cell corners with uniform step.
#[derive(Clone, PartialEq, Debug)]
pub struct GridAxis {
    pub values: Vec<Float>,
    pub step: Float,
}

impl GridAxis {
    /// Coordinate of the upper edge of the last cell.
    pub fn end(&self) -> Float {
        self.values[0] + self.values.len() as Float * self.step
    }

    fn check(&self, name: &'static str) -> Result<(), GridError> {
        if self.values.is_empty() {
            return Err(GridError::AxisTooShort(name));
        }

        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(GridError::Invariant("axis step must be positive"));
        }

        if self.values.windows(2).any(|w| w[1] <= w[0]) {
            return Err(GridError::Invariant("axis must be strictly ascending"));
        }

        Ok(())
    }
}

/// Normalized environmental layer: one `[lat][lon]`
/// slice per time index.
#[derive(Clone, PartialEq, Debug)]
pub struct CanonicalGrid {
    lat: GridAxis,
    lon: GridAxis,
    times: Vec<u32>,
    data: Array3<Float>,
    missing_value: Float,
    units: String,
}

impl CanonicalGrid {
    /// Constructs the grid checking all invariants.
    ///
    /// `data` has the shape `(times, lats, lons)`.
    pub fn new(
        lat: GridAxis,
        lon: GridAxis,
        times: Vec<u32>,
        data: Array3<Float>,
        missing_value: Float,
        units: String,
    ) -> Result<Self, GridError> {
        lat.check("latitude")?;
        lon.check("longitude")?;

        if !(-180.0..180.0).contains(&lon.values[0]) {
            return Err(GridError::Invariant(
                "minimum longitude must be within [-180, 180)",
            ));
        }

        if data.dim() != (times.len(), lat.values.len(), lon.values.len()) {
            return Err(GridError::Invariant(
                "data shape does not match axes lengths",
            ));
        }

        Ok(CanonicalGrid {
            lat,
            lon,
            times,
            data,
            missing_value,
            units,
        })
    }

    pub fn num_lats(&self) -> usize {
        self.lat.values.len()
    }

    pub fn num_lons(&self) -> usize {
        self.lon.values.len()
    }

    pub fn num_times(&self) -> usize {
        self.times.len()
    }

    pub fn lat_min(&self) -> Float {
        self.lat.values[0]
    }

    pub fn lon_min(&self) -> Float {
        self.lon.values[0]
    }

    pub fn lat_step(&self) -> Float {
        self.lat.step
    }

    pub fn lon_step(&self) -> Float {
        self.lon.step
    }

    pub fn lat_axis(&self) -> &GridAxis {
        &self.lat
    }

    pub fn lon_axis(&self) -> &GridAxis {
        &self.lon
    }

    pub fn lats(&self) -> &[Float] {
        &self.lat.values
    }

    pub fn lons(&self) -> &[Float] {
        &self.lon.values
    }

    pub fn times(&self) -> &[u32] {
        &self.times
    }

    pub fn missing_value(&self) -> Float {
        self.missing_value
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn data(&self) -> &Array3<Float> {
        &self.data
    }

    /// `[lat][lon]` slice at given time index.
    pub fn slice(&self, time_index: usize) -> ArrayView2<Float> {
        self.data.index_axis(ndarray::Axis(0), time_index)
    }

    /// Checks the value against the missing-value sentinel.
    ///
    /// Comparison is exact; a NaN sentinel matches any NaN.
    pub fn is_missing(&self, value: Float) -> bool {
        value == self.missing_value || (self.missing_value.is_nan() && value.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(values: &[Float], step: Float) -> GridAxis {
        GridAxis {
            values: values.to_vec(),
            step,
        }
    }

    #[test]
    fn accepts_valid_grid() {
        let grid = CanonicalGrid::new(
            axis(&[0.0, 1.0], 1.0),
            axis(&[-180.0, -179.0, -178.0], 1.0),
            vec![1, 2],
            Array3::zeros((2, 2, 3)),
            -9999.0,
            "K".to_string(),
        )
        .unwrap();

        assert_eq!(grid.num_times(), 2);
        assert_eq!(grid.lat_axis().end(), 2.0);
        assert_eq!(grid.lon_axis().end(), -177.0);
        assert!(grid.is_missing(-9999.0));
        assert!(!grid.is_missing(-9999.000001));
    }

    #[test]
    fn rejects_descending_axis() {
        let grid = CanonicalGrid::new(
            axis(&[1.0, 0.0], 1.0),
            axis(&[0.0], 1.0),
            vec![1],
            Array3::zeros((1, 2, 1)),
            -9999.0,
            String::new(),
        );

        assert!(matches!(grid, Err(GridError::Invariant(_))));
    }

    #[test]
    fn rejects_longitude_out_of_range() {
        let grid = CanonicalGrid::new(
            axis(&[0.0], 1.0),
            axis(&[180.0], 1.0),
            vec![1],
            Array3::zeros((1, 1, 1)),
            -9999.0,
            String::new(),
        );

        assert!(matches!(grid, Err(GridError::Invariant(_))));
    }

    #[test]
    fn rejects_mismatched_shape() {
        let grid = CanonicalGrid::new(
            axis(&[0.0, 1.0], 1.0),
            axis(&[0.0], 1.0),
            vec![1],
            Array3::zeros((2, 2, 1)),
            -9999.0,
            String::new(),
        );

        assert!(matches!(grid, Err(GridError::Invariant(_))));
    }

    #[test]
    fn nan_sentinel_matches_nan() {
        let grid = CanonicalGrid::new(
            axis(&[0.0], 1.0),
            axis(&[0.0], 1.0),
            vec![1],
            Array3::zeros((1, 1, 1)),
            Float::NAN,
            String::new(),
        )
        .unwrap();

        assert!(grid.is_missing(Float::NAN));
        assert!(!grid.is_missing(0.0));
    }
}
