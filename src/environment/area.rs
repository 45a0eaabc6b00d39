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

//! True surface area of latitude/longitude rectangles.
//!
//! Area of a rectangle bounded by two parallels and two meridians
//! on a sphere of radius `R` is the difference of two spherical caps
//! scaled by the longitude span:
//!
//! `A = R² · Δλ · (sin φ_north − sin φ_south)`
//!
//! Unlike a product of degrees this accounts for meridians
//! converging towards the poles, so cells at high latitudes
//! get proportionally smaller weights.

use crate::constants::EARTH_MEAN_RADIUS_KM;
use crate::Float;

/// Computes the area (in km²) of a cell with given bottom
/// latitude, width in degrees of longitude and height
/// in degrees of latitude.
///
/// Latitudes past the poles are clamped to ±90.
pub fn cell_area(bottom_lat: Float, width: Float, height: Float) -> Float {
    let south = bottom_lat.clamp(-90.0, 90.0).to_radians();
    let north = (bottom_lat + height).clamp(-90.0, 90.0).to_radians();

    EARTH_MEAN_RADIUS_KM * EARTH_MEAN_RADIUS_KM * width.to_radians() * (north.sin() - south.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::f64::consts::PI;

    #[test]
    fn whole_sphere() {
        let area = cell_area(-90.0, 360.0, 180.0);
        let expected = 4.0 * PI * EARTH_MEAN_RADIUS_KM * EARTH_MEAN_RADIUS_KM;

        assert!(approx_eq!(Float, area / expected, 1.0, epsilon = 1.0e-12));
    }

    #[test]
    fn hemispheres_are_equal() {
        let north = cell_area(0.0, 360.0, 90.0);
        let south = cell_area(-90.0, 360.0, 90.0);

        assert!(approx_eq!(Float, north, south, epsilon = 1.0e-3));
    }

    #[test]
    fn shrinks_towards_poles() {
        let equator = cell_area(0.0, 1.0, 1.0);
        let mid = cell_area(45.0, 1.0, 1.0);
        let polar = cell_area(89.0, 1.0, 1.0);

        assert!(equator > mid);
        assert!(mid > polar);

        // one degree cell at the equator is close to 111.2 km × 111.2 km
        assert!((equator - 12_364.0).abs() < 20.0);
    }

    #[test]
    fn additive_along_both_axes() {
        let whole = cell_area(10.0, 2.0, 2.0);
        let parts = cell_area(10.0, 1.0, 1.0)
            + cell_area(10.0, 1.0, 1.0)
            + cell_area(11.0, 1.0, 1.0)
            + cell_area(11.0, 1.0, 1.0);

        assert!(approx_eq!(Float, whole, parts, epsilon = 1.0e-6));
    }
}
