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

//! Discovery of latitude, longitude and time dimensions
//! by matching dimension names against lists of synonyms.

use super::AxisLayout;
use crate::configuration::TemporalResolution;
use crate::constants::{LATITUDE_SYNONYMS, LONGITUDE_SYNONYMS, TIME_SYNONYMS};
use crate::errors::LoadError;

/// Finds the position of the dimension matching one of the synonyms.
///
/// Synonyms are tried in order and the first match wins.
/// When more than one dimension matches any synonym,
/// the axis cannot be resolved uniquely and an error is returned.
pub fn find_axis(
    dimensions: &[String],
    synonyms: &[&str],
    axis: &'static str,
    variable: &str,
) -> Result<usize, LoadError> {
    let matching: Vec<&String> = dimensions
        .iter()
        .filter(|dim| synonyms.contains(&dim.as_str()))
        .collect();

    if matching.len() > 1 {
        return Err(LoadError::AmbiguousAxis {
            dimension: matching[1].clone(),
            variable: variable.to_string(),
        });
    }

    synonyms
        .iter()
        .find_map(|syn| dimensions.iter().position(|dim| dim == syn))
        .ok_or_else(|| LoadError::AxisNotFound {
            axis,
            variable: variable.to_string(),
        })
}

/// Resolves which dimension of the variable is latitude,
/// longitude and (for time-varying data) time.
///
/// Monthly layers must have a time dimension. Yearly layers
/// can be 2-D (single slice) or 3-D (one slice per year).
pub fn discover_layout(
    dimensions: &[String],
    variable: &str,
    resolution: TemporalResolution,
) -> Result<AxisLayout, LoadError> {
    if resolution == TemporalResolution::Month && dimensions.len() < 3 {
        return Err(LoadError::Dimensionality {
            variable: variable.to_string(),
            expected: "3",
            found: dimensions.len(),
        });
    }

    let lat = find_axis(dimensions, &LATITUDE_SYNONYMS, "latitude", variable)?;
    let lon = find_axis(dimensions, &LONGITUDE_SYNONYMS, "longitude", variable)?;

    let needs_time = resolution == TemporalResolution::Month || dimensions.len() == 3;

    let time = if needs_time {
        Some(find_axis(dimensions, &TIME_SYNONYMS, "time", variable)?)
    } else {
        None
    };

    let layout = AxisLayout { lat, lon, time };

    if dimensions.len() != layout.ndim() {
        return Err(LoadError::Dimensionality {
            variable: variable.to_string(),
            expected: if layout.time.is_some() { "3" } else { "2" },
            found: dimensions.len(),
        });
    }

    Ok(layout)
}
