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

//! Command-line driver of the Environmental Grid Resampler (EGR).
//!
//! Reads `config.yaml` from the working directory, resamples every
//! configured environmental layer onto the simulation grid and
//! writes the values into the `output` directory.

mod model;

use cap::Cap;
use env_logger::Env;
use log::{error, info};
use std::{alloc, process};

/// Global allocator used by the driver.
///
/// Use of static global allocator allows for capping the memory to the limit set by user
/// in configuration file, which matters for layers that do not fit in memory at once.
#[global_allocator]
static ALLOCATOR: Cap<alloc::System> = Cap::new(alloc::System, usize::MAX);

/// The main program function.
/// Prepares the runtime environment and calls the [`model::main`].
///
/// The logger must be initiated before any log messages
/// are possible to occur.
fn main() {
    #[cfg(not(feature = "debug"))]
    let logger_env = Env::new().filter_or("EGR_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = Env::new().filter_or("EGR_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();

    match model::main() {
        Ok(_) => info!("Resampling finished. Check the output directory and log."),
        Err(err) => {
            error!("Resampling failed with error: {}", err);
            process::exit(1);
        }
    }
}
