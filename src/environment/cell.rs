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

//! Cells of the simulation grid, the targets onto which
//! environmental layers are resampled.

use super::resample::{QueryCell, Sample};
use crate::Float;
use rustc_hash::FxHashMap;

/// A cell of the simulation grid holding the values
/// of environmental layers for the current period.
///
/// Each layer writes into its own named slot, one
/// [`Sample`] per time slice of the period.
#[derive(Clone, PartialEq, Debug)]
pub struct GridCell {
    pub lat: Float,
    pub lon: Float,
    pub lat_size: Float,
    pub lon_size: Float,
    environment: FxHashMap<String, Vec<Sample>>,
}

impl GridCell {
    /// Creates a cell with lower-left corner at (`lat`, `lon`)
    /// and no environmental data.
    pub fn new(lat: Float, lon: Float, lat_size: Float, lon_size: Float) -> Self {
        GridCell {
            lat,
            lon,
            lat_size,
            lon_size,
            environment: FxHashMap::default(),
        }
    }

    /// Query describing this cell at given time index.
    pub fn query(&self, time_index: usize) -> QueryCell {
        QueryCell {
            lat: self.lat,
            lon: self.lon,
            lat_size: self.lat_size,
            lon_size: self.lon_size,
            time_index,
        }
    }

    /// Values of the layer with given name, indexed by
    /// time slice within the period.
    pub fn environment(&self, layer: &str) -> Option<&[Sample]> {
        self.environment.get(layer).map(Vec::as_slice)
    }

    /// Replaces the whole slot of given layer.
    pub fn set_environment(&mut self, layer: &str, samples: Vec<Sample>) {
        self.environment.insert(layer.to_string(), samples);
    }
}

/// Builds a regular block of cells starting at the south-west corner,
/// row by row from south to north.
pub fn build_cells(
    ref_lat: Float,
    ref_lon: Float,
    cell_size: (Float, Float),
    shape: (usize, usize),
) -> Vec<GridCell> {
    let mut cells = Vec::with_capacity(shape.0 * shape.1);

    for row in 0..shape.0 {
        for col in 0..shape.1 {
            cells.push(GridCell::new(
                ref_lat + row as Float * cell_size.0,
                ref_lon + col as Float * cell_size.1,
                cell_size.0,
                cell_size.1,
            ));
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_laid_out_south_to_north() {
        let cells = build_cells(-10.0, 20.0, (0.5, 1.0), (2, 3));

        assert_eq!(cells.len(), 6);
        assert_eq!((cells[0].lat, cells[0].lon), (-10.0, 20.0));
        assert_eq!((cells[2].lat, cells[2].lon), (-10.0, 22.0));
        assert_eq!((cells[3].lat, cells[3].lon), (-9.5, 20.0));
    }

    #[test]
    fn slots_are_replaced() {
        let mut cell = GridCell::new(0.0, 0.0, 1.0, 1.0);
        assert!(cell.environment("temperature").is_none());

        cell.set_environment("temperature", vec![Sample::present(1.0)]);
        cell.set_environment("temperature", vec![Sample::present(2.0); 2]);

        assert_eq!(
            cell.environment("temperature").unwrap(),
            &[Sample::present(2.0), Sample::present(2.0)]
        );
    }
}
