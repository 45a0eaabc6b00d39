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

//! Module containing constants used by the resampler.

use crate::Float;

/// WGS84 ellipsoid semi-major axis
pub const WGS84_A: Float = 6_378_137.0;

/// WGS84 ellipsoid semi-minor axis
#[allow(clippy::excessive_precision)]
pub const WGS84_B: Float = 6_356_752.314_245;

/// Mean Earth radius in kilometres, `(2a + b) / 3` of the WGS84 ellipsoid.
///
/// Overlap areas are computed on a sphere of this radius so
/// they are reported in km².
pub const EARTH_MEAN_RADIUS_KM: Float = (2.0 * WGS84_A + WGS84_B) / 3.0 / 1000.0;

/// Names under which a latitude dimension is searched for, in priority order.
pub const LATITUDE_SYNONYMS: [&str; 10] = [
    "lat",
    "Lat",
    "latitude",
    "Latitude",
    "lats",
    "Lats",
    "latitudes",
    "Latitudes",
    "y",
    "Y",
];

/// Names under which a longitude dimension is searched for, in priority order.
pub const LONGITUDE_SYNONYMS: [&str; 10] = [
    "lon",
    "Lon",
    "longitude",
    "Longitude",
    "lons",
    "Lons",
    "longitudes",
    "Longitudes",
    "x",
    "X",
];

/// Names under which a time dimension is searched for, in priority order.
pub const TIME_SYNONYMS: [&str; 10] = [
    "time", "Time", "times", "Times", "month", "Month", "months", "Months", "t", "T",
];

/// Attribute names holding the missing-value sentinel, in priority order.
pub const MISSING_VALUE_ATTRIBUTES: [&str; 3] = ["missing_value", "MissingValue", "_FillValue"];

/// Number of slices in one monthly window.
pub const MONTHS_PER_YEAR: usize = 12;

/// Time label carried by every slice of a yearly layer.
pub const YEARLY_TIME_LABEL: u32 = 0;
