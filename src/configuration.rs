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

//! Module responsible for parsing and checking the configuration file.
//!
//! To provide meaningful error messages. The configuration file uses
//! [YAML](https://en.wikipedia.org/wiki/YAML) and `serde` to enforce
//! strong typing and automatic type checking.
//!
//! The structures and their fields in this module directly correspond to
//! the fields inside `config.yaml` so you can check this documentation
//! for more details how to set the config file.

use crate::constants::{MONTHS_PER_YEAR, YEARLY_TIME_LABEL};
use crate::errors::{ConfigError, LoadError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::{
    convert::TryFrom,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::Float;

/// Format in which a raster source is stored on disk.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Deserialize)]
pub enum SourceKind {
    /// Single-band grid with a text header (ESRI ASCII grid).
    #[serde(rename = "ascii_grid")]
    AsciiGrid,

    /// Self-describing multidimensional array file (netCDF).
    #[serde(rename = "netcdf")]
    ArrayFile,
}

/// Temporal resolution of a layer. Decides how many
/// slices make up one period (window).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Deserialize)]
#[serde(try_from = "String")]
pub enum TemporalResolution {
    Year,
    Month,
}

impl TemporalResolution {
    /// Number of time slices in one period.
    pub fn slices_per_period(self) -> usize {
        match self {
            TemporalResolution::Year => 1,
            TemporalResolution::Month => MONTHS_PER_YEAR,
        }
    }

    /// Label of the slice with given absolute time index.
    pub fn time_label(self, time_index: usize) -> u32 {
        match self {
            TemporalResolution::Year => YEARLY_TIME_LABEL,
            TemporalResolution::Month => (time_index % MONTHS_PER_YEAR) as u32 + 1,
        }
    }
}

impl FromStr for TemporalResolution {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(TemporalResolution::Year),
            "month" => Ok(TemporalResolution::Month),
            other => Err(LoadError::UnsupportedTemporalResolution(other.to_string())),
        }
    }
}

impl TryFrom<String> for TemporalResolution {
    type Error = LoadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for TemporalResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalResolution::Year => write!(f, "year"),
            TemporalResolution::Month => write!(f, "month"),
        }
    }
}

/// How much of the layer is kept in memory.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Storage {
    /// Whole time series is loaded at once.
    Static,

    /// Only one period is materialized at a time.
    Windowed,
}

impl Default for Storage {
    fn default() -> Self {
        Storage::Static
    }
}

/// Description of a single environmental layer.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct LayerSpec {
    /// Name of the layer, used as the slot name in target cells
    /// and as the name of the output file.
    pub name: String,

    /// Path to the raster file.
    pub file: PathBuf,

    /// Name of the variable inside the file.
    ///
    /// Ignored for `ascii_grid` sources which hold a single band.
    pub variable: String,

    pub source: SourceKind,

    /// Either `year` or `month`. Other values are rejected.
    pub resolution: TemporalResolution,

    /// _(Optional)_ Defaults to `static`.
    ///
    /// `windowed` storage is only available for `netcdf` sources.
    #[serde(default)]
    pub storage: Storage,
}

impl LayerSpec {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::OutOfBounds("Layer name cannot be empty"));
        }

        if self.storage == Storage::Windowed && self.source != SourceKind::ArrayFile {
            return Err(ConfigError::OutOfBounds(
                "Windowed storage is only available for netcdf sources",
            ));
        }

        if self.source == SourceKind::AsciiGrid && self.resolution != TemporalResolution::Year {
            return Err(ConfigError::OutOfBounds(
                "ASCII grid sources can only have yearly resolution",
            ));
        }

        Ok(())
    }
}

/// Fields describing the target (simulation) grid
/// onto which environmental data is resampled.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Domain {
    /// Latitude (in degrees) of south-west domain corner.
    ///
    /// Must meet the condition: `-90 <= ref_lat < 90`
    pub ref_lat: Float,

    /// Longitude (in degrees) of south-west domain corner.
    ///
    /// Must meet the condition: `-180 <= ref_lon < 180`
    pub ref_lon: Float,

    /// Cell size in degrees of latitude and longitude respectively.
    pub cell_size: (Float, Float),

    /// Number of cell rows (along latitude) and columns (along longitude).
    pub shape: (u16, u16),
}

impl Domain {
    /// Checks if domain specification follows conventions
    /// and limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if !(-90.0..90.0).contains(&self.ref_lat) {
            return Err(ConfigError::OutOfBounds(
                "Reference latitude is too low or too high",
            ));
        }

        if !(-180.0..180.0).contains(&self.ref_lon) {
            return Err(ConfigError::OutOfBounds(
                "Reference longitude is too low or too high",
            ));
        }

        if self.cell_size.0 <= 0.0 || self.cell_size.1 <= 0.0 {
            return Err(ConfigError::OutOfBounds("Cell size must be positive"));
        }

        if (u64::from(self.shape.0) * u64::from(self.shape.1)) < 1 {
            return Err(ConfigError::OutOfBounds(
                "Total number of cells cannot be less than 1",
            ));
        }

        if self.ref_lat + Float::from(self.shape.0) * self.cell_size.0 > 90.0 {
            return Err(ConfigError::OutOfBounds("Domain extends past the pole"));
        }

        Ok(())
    }
}

/// Fields with information about simulated period.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Run {
    /// Date of the first simulated month. Used only
    /// to label the output.
    pub start: NaiveDate,

    /// Number of simulated monthly timesteps.
    pub timesteps: usize,
}

impl Run {
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.timesteps < 1 {
            return Err(ConfigError::OutOfBounds(
                "Number of timesteps cannot be less than 1",
            ));
        }

        Ok(())
    }
}

/// _(Optional)_ Fields with information about
/// resources available for the resampler.
#[derive(Clone, PartialEq, PartialOrd, Debug, Deserialize)]
pub struct Resources {
    /// _(Optional)_ Thread count used for filling cells.
    ///
    /// Cannot be less than `1`. Defaults to `1`.
    #[serde(default = "Resources::default_threads")]
    pub threads: u16,

    /// _(Optional)_ Heap memory limit in MB.
    ///
    /// Cannot be less than `128`. Defaults to whole addressable-space.
    ///
    /// Static layers hold their whole time series in memory, so
    /// when the limit is hit consider switching large monthly
    /// layers to `windowed` storage.
    #[serde(default = "Resources::default_memory")]
    pub memory: usize,
}

impl Resources {
    fn default_threads() -> u16 {
        1
    }

    fn default_memory() -> usize {
        usize::MAX / (1024 * 1024)
    }

    /// Checks if thread count and memory limit are
    /// above limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::OutOfBounds(
                "Available threads cannot be less than 1",
            ));
        }

        if self.memory < 128 {
            return Err(ConfigError::OutOfBounds(
                "Available memory cannot be less than 128 MB",
            ));
        }

        Ok(())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            threads: Resources::default_threads(),
            memory: Resources::default_memory(),
        }
    }
}

/// Main config structure representing the fields in
/// configuration file.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Config {
    pub domain: Domain,

    pub run: Run,

    pub layers: Vec<LayerSpec>,

    #[serde(default)]
    pub resources: Resources,
}

impl Config {
    /// Config structure constructor, responsible for
    /// deserializing configuration and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        Config::new_from_slice(data.as_slice())
    }

    pub fn new_from_slice(data: &[u8]) -> Result<Config, ConfigError> {
        let config: Config = serde_yaml::from_slice(data)?;

        config.domain.check_bounds()?;
        config.run.check_bounds()?;
        config.resources.check_bounds()?;

        if config.layers.is_empty() {
            return Err(ConfigError::OutOfBounds("At least one layer is required"));
        }

        for layer in &config.layers {
            layer.check_bounds()?;
        }

        Ok(config)
    }
}
