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

//! Reader of single-band grids with a text header
//! (ESRI ASCII grid).
//!
//! The header holds the grid shape, the lower-left corner
//! (or centre) of the grid, the cell size and the missing-value
//! sentinel. Data follows row by row from north to south.
//!
//! ```text
//! ncols         4
//! nrows         2
//! xllcorner     -10.0
//! yllcorner     35.0
//! cellsize      0.5
//! NODATA_value  -9999
//! 1 2 3 4
//! 5 6 -9999 8
//! ```

use super::{AxisLayout, CoordinateConvention, RawAxis, RawGridPayload};
use crate::configuration::TemporalResolution;
use crate::{errors::LoadError, Float};
use log::debug;
use rustc_hash::FxHashMap;
use std::{fs, path::Path};

#[derive(Copy, Clone, PartialEq, Debug)]
struct Header {
    ncols: usize,
    nrows: usize,
    x_ll: Float,
    y_ll: Float,
    cellsize: Float,
    nodata: Float,
    convention: CoordinateConvention,
}

/// Reads the grid file. Only yearly (static) resolution
/// is available as the format holds a single band.
pub fn load(
    path: &Path,
    variable: &str,
    resolution: TemporalResolution,
) -> Result<RawGridPayload, LoadError> {
    if resolution != TemporalResolution::Year {
        return Err(LoadError::UnsupportedTemporalResolution(format!(
            "{} (ASCII grids hold a single yearly band)",
            resolution
        )));
    }

    let text = fs::read_to_string(path)?;

    parse(&text, variable, resolution)
}

fn parse(
    text: &str,
    variable: &str,
    resolution: TemporalResolution,
) -> Result<RawGridPayload, LoadError> {
    let mut tokens = text.split_whitespace().peekable();
    let mut entries: FxHashMap<String, Float> = FxHashMap::default();

    while let Some(key) = tokens.next_if(|t| is_header_key(t)) {
        let value = tokens
            .next()
            .ok_or_else(|| LoadError::MalformedHeader(format!("{} has no value", key)))?;
        let value: Float = value
            .parse()
            .map_err(|_| LoadError::MalformedHeader(format!("{} is not a number", key)))?;

        entries.insert(key.to_ascii_lowercase(), value);
    }

    let header = read_header(&entries, variable)?;
    debug!("Read ASCII grid header: {:?}", header);

    let data = tokens
        .map(|t| {
            t.parse::<Float>()
                .map_err(|_| LoadError::MalformedData(format!("{} is not a number", t)))
        })
        .collect::<Result<Vec<Float>, LoadError>>()?;

    if data.len() != header.nrows * header.ncols {
        return Err(LoadError::MalformedData(format!(
            "expected {} values, found {}",
            header.nrows * header.ncols,
            data.len()
        )));
    }

    // rows are stored from north to south, so latitudes are
    // synthesized descending to match the data order
    let lats = (0..header.nrows)
        .map(|r| header.y_ll + (header.nrows - 1 - r) as Float * header.cellsize)
        .collect();
    let lons = (0..header.ncols)
        .map(|c| header.x_ll + c as Float * header.cellsize)
        .collect();

    Ok(RawGridPayload {
        variable: variable.to_string(),
        lats: RawAxis {
            values: lats,
            spacing: Some(header.cellsize),
        },
        lons: RawAxis {
            values: lons,
            spacing: Some(header.cellsize),
        },
        times: vec![resolution.time_label(0)],
        shape: vec![header.nrows, header.ncols],
        data,
        layout: AxisLayout {
            lat: 0,
            lon: 1,
            time: None,
        },
        missing_value: header.nodata,
        convention: header.convention,
        units: String::new(),
    })
}

/// Header keys, matched case-insensitively. The first token
/// which is not one of them starts the data block.
const HEADER_KEYS: [&str; 8] = [
    "ncols",
    "nrows",
    "xllcorner",
    "yllcorner",
    "xllcenter",
    "yllcenter",
    "cellsize",
    "nodata_value",
];

fn is_header_key(token: &str) -> bool {
    HEADER_KEYS.iter().any(|key| key.eq_ignore_ascii_case(token))
}

fn read_header(entries: &FxHashMap<String, Float>, variable: &str) -> Result<Header, LoadError> {
    let required = |key: &str| {
        entries
            .get(key)
            .copied()
            .ok_or_else(|| LoadError::MalformedHeader(format!("{} is missing", key)))
    };

    let count = |key: &str| -> Result<usize, LoadError> {
        let value = required(key)?;
        if value < 1.0 || value.fract() != 0.0 {
            return Err(LoadError::MalformedHeader(format!(
                "{} must be a positive integer",
                key
            )));
        }
        Ok(value as usize)
    };

    let (x_ll, y_ll, convention) = match (
        entries.get("xllcorner"),
        entries.get("yllcorner"),
        entries.get("xllcenter"),
        entries.get("yllcenter"),
    ) {
        (Some(&x), Some(&y), None, None) => (x, y, CoordinateConvention::CellCorner),
        (None, None, Some(&x), Some(&y)) => (x, y, CoordinateConvention::CellCentre),
        _ => {
            return Err(LoadError::MalformedHeader(
                "lower-left coordinates must be both corners or both centres".to_string(),
            ))
        }
    };

    let cellsize = required("cellsize")?;
    if !(cellsize.is_finite() && cellsize > 0.0) {
        return Err(LoadError::MalformedHeader(
            "cellsize must be positive".to_string(),
        ));
    }

    let nodata = entries
        .get("nodata_value")
        .copied()
        .ok_or_else(|| LoadError::MissingValueNotFound(variable.to_string()))?;

    Ok(Header {
        ncols: count("ncols")?,
        nrows: count("nrows")?,
        x_ll,
        y_ll,
        cellsize,
        nodata,
        convention,
    })
}
