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

//! Area-weighted resampling of the canonical grid
//! onto query cells of arbitrary size.
//!
//! A query cell can span several canonical cells, partially or fully,
//! and canonical cells do not need to match the query cell size.
//! The value of the query cell is the average of all intersected
//! canonical cells weighted by the true (spherical) area of
//! their overlap with the query cell. Missing cells do not contribute
//! to either the weighted sum or the total area.

use super::area::cell_area;
use super::grid::{CanonicalGrid, GridAxis};
use crate::{errors::ResampleError, Float};
use ndarray::Array2;
use std::ops::RangeInclusive;

/// Cell for which the value is requested, described by
/// its lower-left corner and size in degrees.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct QueryCell {
    pub lat: Float,
    pub lon: Float,
    pub lat_size: Float,
    pub lon_size: Float,
    pub time_index: usize,
}

/// Result of a query: the aggregated value and
/// whether it is missing.
///
/// When `is_missing` is set, `value` holds the missing-value
/// sentinel of the queried layer.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Sample {
    pub value: Float,
    pub is_missing: bool,
}

impl Sample {
    pub fn present(value: Float) -> Self {
        Sample {
            value,
            is_missing: false,
        }
    }

    pub fn missing(sentinel: Float) -> Self {
        Sample {
            value: sentinel,
            is_missing: true,
        }
    }
}

/// Canonical cells intersected by a query cell
/// with the overlap area (km²) of each of them.
#[derive(Clone, PartialEq, Debug)]
pub struct OverlapWindow {
    pub lats: RangeInclusive<usize>,
    pub lons: RangeInclusive<usize>,

    /// Overlap areas indexed relative to the start of both ranges.
    pub areas: Array2<Float>,
}

/// Computes the area-weighted value of the query cell.
pub fn area_weighted_value(grid: &CanonicalGrid, query: &QueryCell) -> Result<Sample, ResampleError> {
    let window = overlap_window(grid, query)?;
    let slice = grid.slice(query.time_index);

    let mut weighted_sum = 0.0;
    let mut total_area = 0.0;

    for (i, lat_idx) in window.lats.clone().enumerate() {
        for (j, lon_idx) in window.lons.clone().enumerate() {
            let value = slice[[lat_idx, lon_idx]];

            if grid.is_missing(value) {
                continue;
            }

            let area = window.areas[[i, j]];
            weighted_sum += value * area;
            total_area += area;
        }
    }

    if total_area == 0.0 {
        return Ok(Sample::missing(grid.missing_value()));
    }

    Ok(Sample::present(weighted_sum / total_area))
}

/// Finds canonical cells intersected by the query cell
/// and computes their overlap areas.
///
/// The query cell's lower-left corner must lie within the grid
/// coverage. Cells extending past the grid edge are clamped
/// to the outermost row or column, which then covers the
/// query cell up to its own edge.
pub fn overlap_window(grid: &CanonicalGrid, query: &QueryCell) -> Result<OverlapWindow, ResampleError> {
    check_query(grid, query)?;

    let lat_upper = query.lat + query.lat_size;
    let lon_upper = query.lon + query.lon_size;

    let (low_lat, high_lat) = find_band(grid.lat_axis(), query.lat, lat_upper);
    let (low_lon, high_lon) = find_band(grid.lon_axis(), query.lon, lon_upper);

    let lat_bounds = overlap_bounds(grid.lat_axis(), low_lat, high_lat, query.lat, lat_upper);
    let lon_bounds = overlap_bounds(grid.lon_axis(), low_lon, high_lon, query.lon, lon_upper);

    let mut areas = Array2::zeros((lat_bounds.len(), lon_bounds.len()));

    for (i, &(south, north)) in lat_bounds.iter().enumerate() {
        for (j, &(west, east)) in lon_bounds.iter().enumerate() {
            areas[[i, j]] = cell_area(south, east - west, north - south);
        }
    }

    Ok(OverlapWindow {
        lats: low_lat..=high_lat,
        lons: low_lon..=high_lon,
        areas,
    })
}

fn check_query(grid: &CanonicalGrid, query: &QueryCell) -> Result<(), ResampleError> {
    if !(query.lat_size > 0.0 && query.lon_size > 0.0) {
        return Err(ResampleError::InvalidCellSize);
    }

    if query.time_index >= grid.num_times() {
        return Err(ResampleError::TimeOutOfRange {
            index: query.time_index,
            count: grid.num_times(),
        });
    }

    check_coverage("latitude", query.lat, grid.lat_axis())?;
    check_coverage("longitude", query.lon, grid.lon_axis())?;

    Ok(())
}

fn check_coverage(axis: &'static str, value: Float, grid_axis: &GridAxis) -> Result<(), ResampleError> {
    let min = grid_axis.values[0];
    let max = grid_axis.end();

    if !(min..max).contains(&value) {
        return Err(ResampleError::OutOfRange {
            axis,
            value,
            min,
            max,
        });
    }

    Ok(())
}

/// Relative (to the axis step) tolerance of edge comparisons.
const EDGE_TOLERANCE: Float = 1.0e-9;

/// Two-sided nearest-neighbour search over ascending lower edges.
///
/// Returns the index of the edge closest at or below `lower` and
/// the index of the edge closest strictly below `upper`. When no
/// edge qualifies, the last index is used.
///
/// Edges within `EDGE_TOLERANCE` of the step from a query edge
/// are treated as lying on it, so rounding of the coordinates
/// cannot pull in a neighbouring row with no real overlap.
fn find_band(axis: &GridAxis, lower: Float, upper: Float) -> (usize, usize) {
    let edges = &axis.values;
    let tolerance = axis.step * EDGE_TOLERANCE;
    let last = edges.len() - 1;

    let mut closest_lower: Option<(usize, Float)> = None;
    let mut closest_upper: Option<(usize, Float)> = None;

    for (idx, &edge) in edges.iter().enumerate() {
        let to_lower = lower - edge;
        if to_lower >= -tolerance && closest_lower.map_or(true, |(_, d)| to_lower < d) {
            closest_lower = Some((idx, to_lower));
        }

        let to_upper = upper - edge;
        if to_upper > tolerance && closest_upper.map_or(true, |(_, d)| to_upper < d) {
            closest_upper = Some((idx, to_upper));
        }
    }

    (
        closest_lower.map_or(last, |(idx, _)| idx),
        closest_upper.map_or(last, |(idx, _)| idx),
    )
}

/// Lower and upper bound of the overlap for each intersected
/// row (or column). Inner edges come from the canonical cells,
/// outermost edges from the query cell.
fn overlap_bounds(
    axis: &GridAxis,
    low: usize,
    high: usize,
    query_lower: Float,
    query_upper: Float,
) -> Vec<(Float, Float)> {
    (low..=high)
        .map(|idx| {
            let lower = if idx == low {
                query_lower.max(axis.values[idx])
            } else {
                axis.values[idx]
            };

            let upper = if idx == high {
                query_upper
            } else {
                query_upper.min(axis.values[idx] + axis.step)
            };

            (lower, upper)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use ndarray::Array3;

    const MISSING: Float = -9999.0;

    /// 4 × 4 one-degree grid from (0, 0) with two time slices,
    /// values `10 * row + col` in the first and negated in the second.
    fn grid() -> CanonicalGrid {
        let mut data = Array3::zeros((2, 4, 4));
        for i in 0..4 {
            for j in 0..4 {
                data[[0, i, j]] = (10 * i + j) as Float;
                data[[1, i, j]] = -((10 * i + j) as Float);
            }
        }

        CanonicalGrid::new(
            GridAxis {
                values: vec![0.0, 1.0, 2.0, 3.0],
                step: 1.0,
            },
            GridAxis {
                values: vec![0.0, 1.0, 2.0, 3.0],
                step: 1.0,
            },
            vec![1, 2],
            data,
            MISSING,
            String::new(),
        )
        .unwrap()
    }

    fn query(lat: Float, lon: Float, lat_size: Float, lon_size: Float) -> QueryCell {
        QueryCell {
            lat,
            lon,
            lat_size,
            lon_size,
            time_index: 0,
        }
    }

    #[test]
    fn exact_cell_returns_its_value() {
        let grid = grid();

        for i in 0..4 {
            for j in 0..4 {
                let sample =
                    area_weighted_value(&grid, &query(i as Float, j as Float, 1.0, 1.0)).unwrap();
                assert!(!sample.is_missing);
                assert!(approx_eq!(Float, sample.value, (10 * i + j) as Float, ulps = 2));
            }
        }
    }

    #[test]
    fn reads_requested_time_slice() {
        let grid = grid();
        let mut q = query(2.0, 1.0, 1.0, 1.0);
        q.time_index = 1;

        let sample = area_weighted_value(&grid, &q).unwrap();
        assert!(approx_eq!(Float, sample.value, -21.0, ulps = 2));
    }

    #[test]
    fn two_cells_are_weighted_by_spherical_area() {
        let grid = grid();
        let sample = area_weighted_value(&grid, &query(1.0, 2.0, 2.0, 1.0)).unwrap();

        let (v1, v2) = (12.0, 22.0);
        let a1 = cell_area(1.0, 1.0, 1.0);
        let a2 = cell_area(2.0, 1.0, 1.0);
        let expected = (v1 * a1 + v2 * a2) / (a1 + a2);

        assert!(approx_eq!(Float, sample.value, expected, epsilon = 1.0e-9));

        // flat weighting would give the plain mean
        assert!(sample.value < 17.0);
    }

    #[test]
    fn partial_overlap_uses_overlap_areas() {
        let grid = grid();
        let sample = area_weighted_value(&grid, &query(0.5, 0.5, 1.0, 1.0)).unwrap();

        let window = overlap_window(&grid, &query(0.5, 0.5, 1.0, 1.0)).unwrap();
        assert_eq!(window.lats, 0..=1);
        assert_eq!(window.lons, 0..=1);

        let south = cell_area(0.5, 0.5, 0.5);
        let north = cell_area(1.0, 0.5, 0.5);
        assert!(approx_eq!(Float, window.areas[[0, 0]], south, epsilon = 1.0e-9));
        assert!(approx_eq!(Float, window.areas[[1, 1]], north, epsilon = 1.0e-9));

        let expected = (0.0 * south + 1.0 * south + 10.0 * north + 11.0 * north) / (2.0 * (south + north));
        assert!(approx_eq!(Float, sample.value, expected, epsilon = 1.0e-9));
    }

    #[test]
    fn smaller_query_inside_one_cell() {
        let grid = grid();
        let window = overlap_window(&grid, &query(2.25, 3.5, 0.5, 0.25)).unwrap();

        assert_eq!(window.lats, 2..=2);
        assert_eq!(window.lons, 3..=3);
        assert!(approx_eq!(
            Float,
            window.areas[[0, 0]],
            cell_area(2.25, 0.25, 0.5),
            epsilon = 1.0e-9
        ));
    }

    #[test]
    fn query_past_grid_edge_is_clamped() {
        let grid = grid();
        let window = overlap_window(&grid, &query(3.0, 3.0, 2.0, 2.0)).unwrap();

        assert_eq!(window.lats, 3..=3);
        assert_eq!(window.lons, 3..=3);
        assert!(approx_eq!(
            Float,
            window.areas[[0, 0]],
            cell_area(3.0, 2.0, 2.0),
            epsilon = 1.0e-9
        ));

        let sample = area_weighted_value(&grid, &query(3.0, 3.0, 2.0, 2.0)).unwrap();
        assert!(approx_eq!(Float, sample.value, 33.0, ulps = 2));
    }

    #[test]
    fn all_missing_returns_sentinel() {
        let mut data = Array3::from_elem((1, 2, 2), MISSING);
        data[[0, 1, 1]] = 5.0;

        let grid = CanonicalGrid::new(
            GridAxis {
                values: vec![0.0, 1.0],
                step: 1.0,
            },
            GridAxis {
                values: vec![0.0, 1.0],
                step: 1.0,
            },
            vec![0],
            data,
            MISSING,
            String::new(),
        )
        .unwrap();

        let sample = area_weighted_value(&grid, &query(0.0, 0.0, 1.0, 2.0)).unwrap();
        assert_eq!(sample, Sample::missing(MISSING));

        // missing cells are excluded from the weights
        let sample = area_weighted_value(&grid, &query(0.0, 0.0, 2.0, 2.0)).unwrap();
        assert!(!sample.is_missing);
        assert!(approx_eq!(Float, sample.value, 5.0, ulps = 2));
    }

    #[test]
    fn missing_comparison_is_exact() {
        let mut data = Array3::from_elem((1, 1, 2), MISSING);
        data[[0, 0, 1]] = MISSING + 1.0e-9;

        let grid = CanonicalGrid::new(
            GridAxis {
                values: vec![0.0],
                step: 1.0,
            },
            GridAxis {
                values: vec![0.0, 1.0],
                step: 1.0,
            },
            vec![0],
            data,
            MISSING,
            String::new(),
        )
        .unwrap();

        let sample = area_weighted_value(&grid, &query(0.0, 0.0, 1.0, 2.0)).unwrap();
        assert!(!sample.is_missing);
        assert_eq!(sample.value, MISSING + 1.0e-9);
    }

    #[test]
    fn out_of_range_queries_are_rejected() {
        let grid = grid();

        for q in [
            query(-0.5, 0.0, 1.0, 1.0),
            query(4.0, 0.0, 1.0, 1.0),
            query(0.0, -0.1, 1.0, 1.0),
            query(0.0, 4.0, 1.0, 1.0),
        ] {
            assert!(matches!(
                area_weighted_value(&grid, &q),
                Err(ResampleError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn invalid_time_and_size_are_rejected() {
        let grid = grid();
        let mut q = query(0.0, 0.0, 1.0, 1.0);
        q.time_index = 2;

        assert!(matches!(
            area_weighted_value(&grid, &q),
            Err(ResampleError::TimeOutOfRange { index: 2, count: 2 })
        ));
        assert!(matches!(
            area_weighted_value(&grid, &query(0.0, 0.0, 0.0, 1.0)),
            Err(ResampleError::InvalidCellSize)
        ));
    }

    #[test]
    fn band_search_clamps_to_last_index() {
        let axis = GridAxis {
            values: vec![0.0, 1.0, 2.0],
            step: 1.0,
        };

        assert_eq!(find_band(&axis, 0.0, 1.0), (0, 0));
        assert_eq!(find_band(&axis, 0.5, 1.5), (0, 1));
        assert_eq!(find_band(&axis, 1.5, 10.0), (1, 2));
    }

    /// 0.1 degree column of cells with corners derived from centres,
    /// the second row missing.
    fn fine_column() -> CanonicalGrid {
        let step = 0.1;
        let lats: Vec<Float> = (0..20)
            .map(|i| (0.05 + step * i as Float) - step / 2.0)
            .collect();

        let mut data = Array3::from_elem((1, 20, 1), 5.0);
        data[[0, 1, 0]] = MISSING;

        CanonicalGrid::new(
            GridAxis { values: lats, step },
            GridAxis {
                values: vec![0.0],
                step: 1.0,
            },
            vec![0],
            data,
            MISSING,
            String::new(),
        )
        .unwrap()
    }

    #[test]
    fn rounded_edges_do_not_widen_the_band() {
        let grid = fine_column();

        for row in 0..20 {
            let lat = row as Float * 0.1;
            let window = overlap_window(&grid, &query(lat, 0.0, 0.1, 1.0)).unwrap();

            assert_eq!(window.lats, row..=row, "row {}", row);
        }
    }

    #[test]
    fn missing_fine_cell_stays_missing() {
        let grid = fine_column();
        let sample = area_weighted_value(&grid, &query(0.0 + 1.0 * 0.1, 0.0, 0.1, 1.0)).unwrap();

        assert_eq!(sample, Sample::missing(MISSING));
    }
}
