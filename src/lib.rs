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

//! Environmental Grid Resampler (EGR) is the engine that feeds
//! gridded environmental data (temperature, precipitation,
//! land cover and alike) to the ecosystem simulation.
//!
//! Raster sources come in different formats, axis orders and
//! temporal resolutions. The resampler loads them, normalizes
//! them onto a canonical latitude/longitude/time grid and answers
//! area-weighted queries for cells of the simulation grid,
//! which do not need to match the cells of the source grid.
//!
//! The pipeline is strictly one-directional:
//! file → [`environment::raster`] → [`environment::grid`] →
//! [`environment::resample`] → caller. Data is kept either fully
//! in memory ([`StaticStore`]) or one year at a time ([`WindowedStore`]).

pub mod configuration;
pub mod constants;
pub mod environment;
pub mod errors;

pub use environment::cell::GridCell;
pub use environment::grid::CanonicalGrid;
pub use environment::resample::{QueryCell, Sample};
pub use environment::store::{EnvironmentalLayer, StaticStore, WindowedStore};

pub type Float = f64;
