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

//! Writing of resampled layers into CSV files.

use crate::model::Layer;
use chrono::{Months, NaiveDate};
use egr::{errors::ModelError, Float, GridCell};
use serde::Serialize;
use std::{fs::File, path::Path};

/// Single row of the output file.
#[derive(Clone, PartialEq, Debug, Serialize)]
struct Record {
    lat: Float,
    lon: Float,
    timestep: usize,
    date: String,
    value: Float,
    missing: bool,
}

/// Writer of `<layer>.csv` in the output directory.
///
/// Rows are written period by period, for every cell
/// all time slots of the period are written before
/// the next cell.
pub struct LayerWriter {
    writer: csv::Writer<File>,
    name: String,
    start: NaiveDate,
    timesteps: usize,
}

impl LayerWriter {
    pub fn new(
        out_dir: &Path,
        layer: &Layer,
        start: NaiveDate,
        timesteps: usize,
    ) -> Result<Self, ModelError> {
        let out_path = out_dir.join(format!("{}.csv", layer.name()));
        let writer = csv::Writer::from_path(out_path)?;

        Ok(LayerWriter {
            writer,
            name: layer.name().to_string(),
            start,
            timesteps,
        })
    }

    /// Writes the slots of all cells, slot `k` being
    /// the simulated month `first_timestep + k * stride`.
    ///
    /// Slots past the simulated period are skipped.
    pub fn write_cells(
        &mut self,
        cells: &[GridCell],
        first_timestep: usize,
        stride: usize,
    ) -> Result<(), ModelError> {
        for cell in cells {
            let samples = cell
                .environment(&self.name)
                .ok_or(ModelError::FaultyOutput("Cell has no values of the layer"))?;

            for (slot, sample) in samples.iter().enumerate() {
                let timestep = first_timestep + slot * stride;

                if timestep >= self.timesteps {
                    break;
                }

                self.writer.serialize(Record {
                    lat: cell.lat,
                    lon: cell.lon,
                    timestep,
                    date: self.date(timestep)?,
                    value: sample.value,
                    missing: sample.is_missing,
                })?;
            }
        }

        Ok(())
    }

    pub fn finish(mut self) -> Result<(), ModelError> {
        self.writer.flush()?;
        Ok(())
    }

    fn date(&self, timestep: usize) -> Result<String, ModelError> {
        let months = u32::try_from(timestep)
            .map_err(|_| ModelError::FaultyOutput("Timestep too large to be dated"))?;

        let date = self
            .start
            .checked_add_months(Months::new(months))
            .ok_or(ModelError::FaultyOutput("Timestep too large to be dated"))?;

        Ok(date.format("%Y-%m-%d").to_string())
    }
}
