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

//! Permutation-aware transpose of raw data into
//! the canonical `[time][lat][lon]` order.
//!
//! Files store the dimensions of a variable in any order
//! (`lat-lon-time`, `time-lat-lon`, `lon-time-lat`, ...). Instead of
//! unrolling a loop per permutation, the raw buffer is viewed with its
//! on-disk shape, its axes are permuted according to the discovered
//! layout and the result is copied into standard (row-major) layout.

use crate::environment::raster::AxisLayout;
use crate::{errors::GridError, Float};
use ndarray::{Array3, ArrayD, Axis, Ix3, IxDyn};

/// Rearranges `data` of on-disk `shape` into `(time, lat, lon)` array.
///
/// 2-D data gets a single time slice.
pub fn to_canonical(
    data: Vec<Float>,
    shape: &[usize],
    layout: AxisLayout,
) -> Result<Array3<Float>, GridError> {
    if shape.len() != layout.ndim() {
        return Err(GridError::Layout(shape.len()));
    }

    let positions = match layout.time {
        Some(time) => vec![time, layout.lat, layout.lon],
        None => vec![layout.lat, layout.lon],
    };

    // permuted_axes panics on anything but a permutation
    let mut seen = vec![false; shape.len()];
    for &pos in &positions {
        if pos >= shape.len() || seen[pos] {
            return Err(GridError::Layout(shape.len()));
        }
        seen[pos] = true;
    }

    let raw = ArrayD::from_shape_vec(IxDyn(shape), data)?;
    let mut arranged = raw.permuted_axes(positions);

    if layout.time.is_none() {
        arranged = arranged.insert_axis(Axis(0));
    }

    let arranged = arranged.into_dimensionality::<Ix3>()?;

    Ok(arranged.as_standard_layout().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, PartialEq, Debug)]
    enum Role {
        Time,
        Lat,
        Lon,
    }

    const TIMES: usize = 3;
    const LATS: usize = 4;
    const LONS: usize = 5;

    fn value(t: usize, i: usize, j: usize) -> Float {
        (100 * t + 10 * i + j) as Float
    }

    fn len(role: Role) -> usize {
        match role {
            Role::Time => TIMES,
            Role::Lat => LATS,
            Role::Lon => LONS,
        }
    }

    /// Writes the synthetic dataset in on-disk order given by `roles`.
    fn raw_data(roles: [Role; 3]) -> (Vec<Float>, Vec<usize>, AxisLayout) {
        let shape: Vec<usize> = roles.iter().map(|&r| len(r)).collect();
        let mut data = Vec::with_capacity(TIMES * LATS * LONS);

        for a in 0..shape[0] {
            for b in 0..shape[1] {
                for c in 0..shape[2] {
                    let idx = [a, b, c];
                    let pick = |role: Role| idx[roles.iter().position(|&r| r == role).unwrap()];
                    data.push(value(pick(Role::Time), pick(Role::Lat), pick(Role::Lon)));
                }
            }
        }

        let layout = AxisLayout {
            lat: roles.iter().position(|&r| r == Role::Lat).unwrap(),
            lon: roles.iter().position(|&r| r == Role::Lon).unwrap(),
            time: roles.iter().position(|&r| r == Role::Time),
        };

        (data, shape, layout)
    }

    fn check_permutation(roles: [Role; 3]) {
        let (data, shape, layout) = raw_data(roles);
        let canonical = to_canonical(data, &shape, layout).unwrap();

        assert_eq!(canonical.dim(), (TIMES, LATS, LONS));

        for t in 0..TIMES {
            for i in 0..LATS {
                for j in 0..LONS {
                    assert_eq!(canonical[[t, i, j]], value(t, i, j), "{:?}", roles);
                }
            }
        }
    }

    #[test]
    fn lat_lon_time() {
        check_permutation([Role::Lat, Role::Lon, Role::Time]);
    }

    #[test]
    fn lat_time_lon() {
        check_permutation([Role::Lat, Role::Time, Role::Lon]);
    }

    #[test]
    fn lon_lat_time() {
        check_permutation([Role::Lon, Role::Lat, Role::Time]);
    }

    #[test]
    fn lon_time_lat() {
        check_permutation([Role::Lon, Role::Time, Role::Lat]);
    }

    #[test]
    fn time_lat_lon() {
        check_permutation([Role::Time, Role::Lat, Role::Lon]);
    }

    #[test]
    fn time_lon_lat() {
        check_permutation([Role::Time, Role::Lon, Role::Lat]);
    }

    #[test]
    fn static_lon_lat() {
        // 2 lons × 3 lats stored lon-major
        let data = vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0];
        let layout = AxisLayout {
            lat: 1,
            lon: 0,
            time: None,
        };
        let canonical = to_canonical(data, &[2, 3], layout).unwrap();

        assert_eq!(canonical.dim(), (1, 3, 2));
        assert_eq!(canonical[[0, 2, 1]], 12.0);
        assert_eq!(canonical[[0, 1, 0]], 1.0);
    }

    #[test]
    fn rejects_layout_of_wrong_rank() {
        let layout = AxisLayout {
            lat: 0,
            lon: 1,
            time: None,
        };
        let result = to_canonical(vec![0.0; 8], &[2, 2, 2], layout);

        assert!(matches!(result, Err(GridError::Layout(3))));
    }

    #[test]
    fn rejects_repeated_position() {
        let layout = AxisLayout {
            lat: 0,
            lon: 0,
            time: Some(1),
        };
        let result = to_canonical(vec![0.0; 8], &[2, 2, 2], layout);

        assert!(matches!(result, Err(GridError::Layout(3))));
    }

    #[test]
    fn rejects_wrong_data_length() {
        let layout = AxisLayout {
            lat: 0,
            lon: 1,
            time: None,
        };
        let result = to_canonical(vec![0.0; 5], &[2, 3], layout);

        assert!(matches!(result, Err(GridError::Shape(_))));
    }
}
