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

//! Module containing the driver code.
//!
//! The driver opens every layer listed in the configuration,
//! builds the simulation grid cells from the domain and
//! resamples each layer onto them. Static layers are resampled
//! once for all held time slices. Windowed layers are advanced
//! one period (year) at a time, the same way the ecosystem
//! simulation does at its synchronization points.

mod output;

use crate::ALLOCATOR;
use egr::configuration::{Config, LayerSpec, Storage};
use egr::constants::MONTHS_PER_YEAR;
use egr::environment::cell::build_cells;
use egr::errors::{EnvironmentError, ModelError};
use egr::{EnvironmentalLayer, GridCell, StaticStore, WindowedStore};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use output::LayerWriter;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::{fs, path::Path};

/// Main driver function, responsible for all resampling steps.
pub fn main() -> Result<(), ModelError> {
    info!("Preparing the resampler core");

    prepare_output_dir()?;

    let mut core = Core::new()?;
    let out_dir = Path::new("./output/");

    let total: u64 = core
        .layers
        .iter()
        .map(|layer| layer.periods(core.config.run.timesteps) as u64)
        .sum();

    // set progress bar for resampled periods
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
            .progress_chars("#>-"),
    );
    bar.set_prefix("Resampled periods");

    for layer in core.layers.iter_mut() {
        let mut cells = prepare_cells(&core.config);
        let mut writer = LayerWriter::new(
            out_dir,
            layer,
            core.config.run.start,
            core.config.run.timesteps,
        )?;

        match layer {
            Layer::Static(store, stride) => {
                core.threadpool
                    .install(|| store.fill_cells(&mut cells))
                    .map_err(EnvironmentError::from)?;
                writer.write_cells(&cells, 0, *stride)?;
                bar.inc(1);
            }
            Layer::Windowed(store, stride) => {
                let slices = MONTHS_PER_YEAR / *stride;

                for period in 0..Layer::count_periods(core.config.run.timesteps) {
                    let offset = period * slices;

                    core.threadpool
                        .install(|| store.fill_cells_for_window(&mut cells, offset))?;
                    writer.write_cells(&cells, period * MONTHS_PER_YEAR, *stride)?;
                    bar.inc(1);
                }
            }
        }

        writer.finish()?;
        bar.println(format!("Layer {} written", layer.name()));
        info!("Layer {} resampled and written", layer.name());
    }

    bar.finish_with_message("All layers finished");

    Ok(())
}

/// Environmental layer opened by the driver, with the number
/// of simulated months covered by one time slice of it.
pub enum Layer {
    Static(StaticStore, usize),
    Windowed(WindowedStore, usize),
}

impl Layer {
    fn open(spec: &LayerSpec, timesteps: usize) -> Result<Self, ModelError> {
        let stride = MONTHS_PER_YEAR / spec.resolution.slices_per_period();

        let layer = match spec.storage {
            Storage::Static => Layer::Static(
                StaticStore::open(
                    &spec.name,
                    &spec.file,
                    &spec.variable,
                    spec.source,
                    spec.resolution,
                )?,
                stride,
            ),
            Storage::Windowed => {
                let store =
                    WindowedStore::open(&spec.name, &spec.file, &spec.variable, spec.resolution)?;
                check_coverage(&spec.name, store.available_periods(), timesteps)?;

                Layer::Windowed(store, stride)
            }
        };

        Ok(layer)
    }

    pub fn name(&self) -> &str {
        match self {
            Layer::Static(store, _) => store.name(),
            Layer::Windowed(store, _) => store.name(),
        }
    }

    fn periods(&self, timesteps: usize) -> usize {
        match self {
            Layer::Static(..) => 1,
            Layer::Windowed(..) => Layer::count_periods(timesteps),
        }
    }

    fn count_periods(timesteps: usize) -> usize {
        (timesteps + MONTHS_PER_YEAR - 1) / MONTHS_PER_YEAR
    }
}

/// Checks that a windowed layer holds every year the run
/// touches. Windows are always whole years, so a run ending
/// mid-year still needs the whole last year in the file.
fn check_coverage(
    layer: &str,
    available: Option<usize>,
    timesteps: usize,
) -> Result<(), ModelError> {
    let required = Layer::count_periods(timesteps);

    match available {
        Some(available) if available < required => Err(ModelError::ShortLayer {
            layer: layer.to_string(),
            required,
            available,
        }),
        _ => Ok(()),
    }
}

/// Structure containing driver parameters and opened layers.
pub struct Core {
    pub config: Config,
    pub threadpool: ThreadPool,
    pub layers: Vec<Layer>,
}

impl Core {
    /// Driver [`Core`] constructor.
    ///
    /// Configuration is read and checked, and all layers are
    /// opened (static layers are fully loaded) before any
    /// output is written.
    pub fn new() -> Result<Self, ModelError> {
        debug!("Reading configuration from config.yaml");
        let config = Config::new_from_file(Path::new("config.yaml"))?;

        debug!("Setting memory limit");
        ALLOCATOR
            .set_limit(config.resources.memory * 1024 * 1024)
            .map_err(|err| ModelError::MemoryLimit(format!("{:?}", err)))?;

        debug!("Setting up ThreadPool");
        let threadpool = ThreadPoolBuilder::new()
            .num_threads(config.resources.threads as usize)
            .stack_size(2 * 1024 * 1024)
            .build()?;

        debug!("Opening environmental layers");
        let layers = config
            .layers
            .iter()
            .map(|spec| Layer::open(spec, config.run.timesteps))
            .collect::<Result<Vec<Layer>, ModelError>>()?;

        Ok(Core {
            config,
            threadpool,
            layers,
        })
    }
}

/// Makes sure the output directory exists and is empty,
/// so that no results of previous runs are mixed in.
fn prepare_output_dir() -> Result<(), ModelError> {
    debug!("Checking and setting output directory");

    let out_path = Path::new("./output/");

    if out_path.is_dir() {
        if out_path.read_dir()?.next().is_none() {
            debug!("Output directory exists but is empty so continuing");
        } else {
            return Err(ModelError::FaultyOutput(
                "Output directory exists and is not empty",
            ));
        }
    } else {
        debug!("Output directory does not exist so creating a new one");
        fs::create_dir(out_path)?;
    }

    Ok(())
}

/// Simulation grid cells from the configured domain.
fn prepare_cells(config: &Config) -> Vec<GridCell> {
    let domain = &config.domain;

    build_cells(
        domain.ref_lat,
        domain.ref_lon,
        domain.cell_size,
        (usize::from(domain.shape.0), usize::from(domain.shape.1)),
    )
}
