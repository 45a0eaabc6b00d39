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

//! Conversion of a raw payload into the canonical grid.
//!
//! Raw axes may be stored descending, as cell centres or
//! in the 0..360 longitude convention. All of that is
//! resolved here so that the resampler can rely on ascending
//! lower-left corners with positive steps.

use super::{transpose, CanonicalGrid, GridAxis};
use crate::environment::raster::{CoordinateConvention, RawAxis, RawGridPayload};
use crate::{errors::GridError, Float};
use float_cmp::approx_eq;
use log::{debug, warn};
use ndarray::{Array3, Axis};

/// Normalizes the payload into an immutable [`CanonicalGrid`].
pub fn normalize(payload: RawGridPayload) -> Result<CanonicalGrid, GridError> {
    let RawGridPayload {
        variable,
        lats,
        lons,
        times,
        shape,
        data,
        layout,
        missing_value,
        convention,
        units,
    } = payload;

    let mut data = transpose::to_canonical(data, &shape, layout)?;

    if data.dim().1 != lats.values.len() || data.dim().2 != lons.values.len() {
        return Err(GridError::Invariant(
            "data shape does not match axes lengths",
        ));
    }

    let (lat_values, lat_step, lat_inverted) = orient(lats, "latitude")?;
    if lat_inverted {
        debug!("Latitudes of {} are descending, inverting", variable);
        data.invert_axis(Axis(1));
    }

    let (lon_values, lon_step, lon_inverted) = orient(lons, "longitude")?;
    if lon_inverted {
        debug!("Longitudes of {} are descending, inverting", variable);
        data.invert_axis(Axis(2));
    }

    let lat_values = to_corners(lat_values, lat_step, convention);
    let lon_values = to_corners(lon_values, lon_step, convention);

    warn_non_uniform(&lat_values, lat_step, "latitude", &variable);
    warn_non_uniform(&lon_values, lon_step, "longitude", &variable);

    let (lon_values, data) = wrap_longitudes(lon_values, lon_step, data)?;

    CanonicalGrid::new(
        GridAxis {
            values: lat_values,
            step: lat_step,
        },
        GridAxis {
            values: lon_values,
            step: lon_step,
        },
        times,
        // invert_axis only flips strides, copy into standard layout
        data.as_standard_layout().into_owned(),
        missing_value,
        units,
    )
}

/// Makes the axis ascending.
///
/// Returns the axis values, the (positive) step and
/// whether the axis was inverted.
fn orient(axis: RawAxis, name: &'static str) -> Result<(Vec<Float>, Float, bool), GridError> {
    let RawAxis { mut values, spacing } = axis;

    if values.len() < 2 {
        let step = spacing
            .map(Float::abs)
            .filter(|s| s.is_finite() && *s > 0.0)
            .ok_or(GridError::AxisTooShort(name))?;

        return Ok((values, step, false));
    }

    if values[1] == values[0] {
        return Err(GridError::ZeroSpacing(name));
    }

    let inverted = values[1] < values[0];

    if inverted {
        values.reverse();
    }

    // mean spacing, so that rounding of single
    // coordinates does not accumulate along the axis
    let step = (values[values.len() - 1] - values[0]) / (values.len() - 1) as Float;

    if !(step.is_finite() && step > 0.0) {
        return Err(GridError::ZeroSpacing(name));
    }

    Ok((values, step, inverted))
}

/// Moves cell centres to lower-left corners.
fn to_corners(values: Vec<Float>, step: Float, convention: CoordinateConvention) -> Vec<Float> {
    match convention {
        CoordinateConvention::CellCorner => values,
        CoordinateConvention::CellCentre => values.into_iter().map(|v| v - step / 2.0).collect(),
    }
}

fn warn_non_uniform(values: &[Float], step: Float, name: &str, variable: &str) {
    let non_uniform = values
        .windows(2)
        .any(|w| !approx_eq!(Float, w[1] - w[0], step, epsilon = step * 1.0e-3));

    if non_uniform {
        warn!(
            "{} axis of {} is not uniformly spaced, assuming step {}",
            name, variable, step
        );
    }
}

/// Brings longitudes into `[-180, 180)`.
///
/// Out-of-range longitudes are shifted by 360 degrees and the
/// axis (together with data columns) is rotated so that it
/// starts with the minimum. The rotated axis must stay uniform,
/// which holds for global grids and for regional grids
/// not crossing the antimeridian.
fn wrap_longitudes(
    values: Vec<Float>,
    step: Float,
    data: Array3<Float>,
) -> Result<(Vec<Float>, Array3<Float>), GridError> {
    let in_range = |lon: &Float| (-180.0..180.0).contains(lon);

    if values.iter().all(in_range) {
        return Ok((values, data));
    }

    let wrapped: Vec<Float> = values
        .iter()
        .map(|&lon| {
            if lon >= 180.0 {
                lon - 360.0
            } else if lon < -180.0 {
                lon + 360.0
            } else {
                lon
            }
        })
        .collect();

    if !wrapped.iter().all(in_range) {
        return Err(GridError::LongitudeSeam);
    }

    let start = wrapped
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(idx, _)| idx);

    let order: Vec<usize> = (start..wrapped.len()).chain(0..start).collect();
    let rotated: Vec<Float> = order.iter().map(|&idx| wrapped[idx]).collect();

    if start > 0 {
        let seam = wrapped.len() - start;
        let gap = rotated[seam] - rotated[seam - 1];

        if !approx_eq!(Float, gap, step, epsilon = step * 1.0e-3) {
            return Err(GridError::LongitudeSeam);
        }
    }

    debug!(
        "Wrapped longitudes into [{}, {}]",
        rotated[0],
        rotated[rotated.len() - 1]
    );

    let data = data.select(Axis(2), &order);

    Ok((rotated, data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::raster::AxisLayout;

    fn payload(
        lats: Vec<Float>,
        lons: Vec<Float>,
        data: Vec<Float>,
        convention: CoordinateConvention,
    ) -> RawGridPayload {
        let shape = vec![lats.len(), lons.len()];

        RawGridPayload {
            variable: "v".to_string(),
            lats: RawAxis::new(lats),
            lons: RawAxis::new(lons),
            times: vec![0],
            shape,
            data,
            layout: AxisLayout {
                lat: 0,
                lon: 1,
                time: None,
            },
            missing_value: -9999.0,
            convention,
            units: "K".to_string(),
        }
    }

    #[test]
    fn descending_latitudes_are_inverted() {
        // rows from north to south
        let raw = payload(
            vec![20.0, 10.0, 0.0],
            vec![0.0, 10.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            CoordinateConvention::CellCorner,
        );
        let grid = normalize(raw.clone()).unwrap();

        assert!(grid.lat_step() > 0.0);
        assert_eq!(grid.lats(), &[0.0, 10.0, 20.0]);

        let raw_data = ndarray::Array2::from_shape_vec((3, 2), raw.data).unwrap();
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(grid.slice(0)[[i, j]], raw_data[[2 - i, j]]);
            }
        }
    }

    #[test]
    fn descending_longitudes_are_inverted() {
        let raw = payload(
            vec![0.0, 10.0],
            vec![20.0, 10.0, 0.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            CoordinateConvention::CellCorner,
        );
        let grid = normalize(raw).unwrap();

        assert!(grid.lon_step() > 0.0);
        assert_eq!(grid.lons(), &[0.0, 10.0, 20.0]);
        assert_eq!(grid.slice(0).row(0).to_vec(), vec![3.0, 2.0, 1.0]);
        assert_eq!(grid.slice(0).row(1).to_vec(), vec![6.0, 5.0, 4.0]);
    }

    #[test]
    fn centres_become_corners() {
        let raw = payload(
            vec![0.5, 1.5],
            vec![10.25, 10.75],
            vec![0.0; 4],
            CoordinateConvention::CellCentre,
        );
        let grid = normalize(raw).unwrap();

        assert_eq!(grid.lats(), &[0.0, 1.0]);
        assert_eq!(grid.lons(), &[10.0, 10.5]);
        assert_eq!(grid.lat_min(), 0.0);
        assert_eq!(grid.lon_min(), 10.0);
    }

    #[test]
    fn descending_centres_become_ascending_corners() {
        let raw = payload(
            vec![1.5, 0.5],
            vec![0.5],
            vec![2.0, 1.0],
            CoordinateConvention::CellCentre,
        );
        let mut raw = raw;
        raw.lons.spacing = Some(1.0);
        let grid = normalize(raw).unwrap();

        assert_eq!(grid.lats(), &[0.0, 1.0]);
        assert_eq!(grid.lons(), &[0.0]);
        assert_eq!(grid.slice(0)[[0, 0]], 1.0);
        assert_eq!(grid.slice(0)[[1, 0]], 2.0);
    }

    #[test]
    fn zero_to_360_longitudes_are_wrapped() {
        let raw = payload(
            vec![0.0, 10.0],
            vec![0.0, 90.0, 180.0, 270.0],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
            CoordinateConvention::CellCorner,
        );
        let grid = normalize(raw).unwrap();

        assert_eq!(grid.lons(), &[-180.0, -90.0, 0.0, 90.0]);
        assert_eq!(grid.lon_min(), -180.0);
        assert!(grid.lons().iter().all(|l| (-180.0..180.0).contains(l)));
        assert_eq!(grid.slice(0).row(0).to_vec(), vec![3.0, 4.0, 1.0, 2.0]);
        assert_eq!(grid.slice(0).row(1).to_vec(), vec![7.0, 8.0, 5.0, 6.0]);
    }

    #[test]
    fn wrapped_centres_of_global_grid() {
        let lons: Vec<Float> = (0..8).map(|i| 22.5 + 45.0 * i as Float).collect();
        let raw = payload(
            vec![0.0, 1.0],
            lons,
            (0..16).map(Float::from).collect(),
            CoordinateConvention::CellCentre,
        );
        let grid = normalize(raw).unwrap();

        assert_eq!(grid.lon_min(), -180.0);
        assert_eq!(grid.lons()[grid.num_lons() - 1], 135.0);
        assert_eq!(grid.slice(0)[[0, 0]], 4.0);
        assert_eq!(grid.slice(0)[[0, 4]], 0.0);
    }

    #[test]
    fn regional_grid_past_antimeridian_is_shifted() {
        let raw = payload(
            vec![0.0, 1.0],
            vec![200.0, 210.0],
            vec![1.0, 2.0, 3.0, 4.0],
            CoordinateConvention::CellCorner,
        );
        let grid = normalize(raw).unwrap();

        assert_eq!(grid.lons(), &[-160.0, -150.0]);
        assert_eq!(grid.slice(0).row(0).to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn regional_grid_across_antimeridian_is_rejected() {
        let raw = payload(
            vec![0.0, 1.0],
            vec![170.0, 175.0, 180.0, 185.0],
            vec![0.0; 8],
            CoordinateConvention::CellCorner,
        );

        assert!(matches!(normalize(raw), Err(GridError::LongitudeSeam)));
    }

    #[test]
    fn step_spans_whole_axis() {
        // single precision coordinates promoted to double
        let lats: Vec<Float> = (0..50).map(|i| Float::from(i as f32 * 0.1f32)).collect();
        let raw = payload(
            lats.clone(),
            vec![0.0, 1.0],
            vec![0.0; 100],
            CoordinateConvention::CellCorner,
        );
        let grid = normalize(raw).unwrap();

        let last = grid.lats()[0] + 49.0 * grid.lat_step();
        assert!(approx_eq!(Float, last, lats[49], epsilon = 1.0e-12));
        assert!(approx_eq!(Float, grid.lat_step(), 0.1, epsilon = 1.0e-6));
    }

    #[test]
    fn single_value_axis_needs_spacing() {
        let raw = payload(
            vec![0.0],
            vec![0.0, 1.0],
            vec![0.0; 2],
            CoordinateConvention::CellCorner,
        );

        assert!(matches!(
            normalize(raw),
            Err(GridError::AxisTooShort("latitude"))
        ));
    }

    #[test]
    fn zero_spacing_is_rejected() {
        let raw = payload(
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0; 4],
            CoordinateConvention::CellCorner,
        );

        assert!(matches!(
            normalize(raw),
            Err(GridError::ZeroSpacing("latitude"))
        ));
    }
}
