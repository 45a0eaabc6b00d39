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

//! Module responsible for reading and storing environmental
//! layers, and providing area-weighted values of them to
//! the cells of the simulation grid.
//!
//! Raster sources are read by the [`raster`] loaders into
//! a raw payload that keeps the on-disk axis order, then
//! normalized by [`grid`] into an immutable [`CanonicalGrid`](grid::CanonicalGrid).
//! Queries are answered by [`resample`] and exposed through
//! the two [`store`] variants.

pub mod area;
pub mod cell;
pub mod grid;
pub mod raster;
pub mod resample;
pub mod store;
