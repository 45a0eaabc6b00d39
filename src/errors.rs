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

//! Error types of the resampler and of the driver.

use crate::Float;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Error while reading config.yaml: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while creating ThreadPool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Error while handling environmental data: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Error while writing output: {0}")]
    Output(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output directory is faulty: {0}")]
    FaultyOutput(&'static str),

    #[error("Cannot set memory limit: {0}")]
    MemoryLimit(String),

    #[error("Layer {layer} holds {available} whole years, the run needs {required}")]
    ShortLayer {
        layer: String,
        required: usize,
        available: usize,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open config.yaml: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize config.yaml: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Configuration component is out of bounds {0}")]
    OutOfBounds(&'static str),
}

/// Umbrella error returned by the environmental data stores.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("Error while loading raster source: {0}")]
    Load(#[from] LoadError),

    #[error("Error while normalizing grid: {0}")]
    Grid(#[from] GridError),

    #[error("Error while resampling grid: {0}")]
    Resample(#[from] ResampleError),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("NetCDF library error: {0}")]
    NetCdf(#[from] netcdf::Error),

    #[error("Cannot read raster file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Variable {0} not found in the file")]
    VariableNotFound(String),

    #[error("Cannot find plausible {axis} dimension of variable {variable}")]
    AxisNotFound {
        axis: &'static str,
        variable: String,
    },

    #[error("Dimension {dimension} of variable {variable} matches more than one axis")]
    AmbiguousAxis { dimension: String, variable: String },

    #[error("Variable {variable} is stored with unsupported encoding {encoding}")]
    UnsupportedEncoding { variable: String, encoding: String },

    #[error("Unsupported temporal resolution: {0}")]
    UnsupportedTemporalResolution(String),

    #[error("Variable {variable} has {found} dimensions, expected {expected}")]
    Dimensionality {
        variable: String,
        expected: &'static str,
        found: usize,
    },

    #[error("Variable {0} has no missing value attribute")]
    MissingValueNotFound(String),

    #[error("Malformed grid header: {0}")]
    MalformedHeader(String),

    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),

    #[error("Malformed grid data: {0}")]
    MalformedData(String),

    #[error("Window starting at {offset} with {length} slices exceeds {available} available time slices")]
    WindowOutOfRange {
        offset: usize,
        length: usize,
        available: usize,
    },
}

#[derive(Error, Debug)]
pub enum GridError {
    #[error("Data cannot be arranged into grid shape: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("{0} axis has too few values to infer spacing")]
    AxisTooShort(&'static str),

    #[error("{0} axis has zero spacing")]
    ZeroSpacing(&'static str),

    #[error("Longitude axis cannot be wrapped into a uniform -180..180 vector")]
    LongitudeSeam,

    #[error("Axis layout does not match data with {0} dimensions")]
    Layout(usize),

    #[error("Grid invariant violated: {0}")]
    Invariant(&'static str),
}

#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("Query {axis} {value} is outside of data coverage [{min}, {max})")]
    OutOfRange {
        axis: &'static str,
        value: Float,
        min: Float,
        max: Float,
    },

    #[error("Time index {index} is outside of {count} available slices")]
    TimeOutOfRange { index: usize, count: usize },

    #[error("Query cell size must be positive")]
    InvalidCellSize,

    #[error("No window has been loaded into layer {0}")]
    WindowNotLoaded(String),
}
