// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use crate::error::ConfigurationError;
use crate::fit::FitMethod;
use crate::impurity::SolverContext;
use crate::spectral::IntegrationRule;
use config::{Config, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Numerical settings which are not part of the physical problem
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Configuration {
    /// The energy quadrature of the lattice integral
    pub quadrature: QuadratureConfiguration,
    /// The bath fit
    pub fit: FitConfiguration,
    /// The runtime context of the impurity solver
    pub solver: SolverContext,
    /// Where the JSON log is written
    pub log: LogConfiguration,
}

/// Settings for the lattice energy integral
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct QuadratureConfiguration {
    /// The integration rule
    pub rule: IntegrationRule,
    /// The number of quadrature points
    pub number_of_points: usize,
}

/// Settings for the bath fit
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FitConfiguration {
    /// The minimization algorithm
    pub method: FitMethod,
    /// The coupling of every bath site in the default starting guess
    pub initial_coupling: f64,
    /// An explicit starting bath, couplings then energies
    pub initial_bath: Option<Vec<f64>>,
}

/// Settings for the log file
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LogConfiguration {
    /// The directory the log file is written to
    pub directory: PathBuf,
    /// The name of the log file
    pub file_name: String,
}

impl Default for Configuration {
    fn default() -> Self {
        let context = SolverContext::default();
        Self {
            quadrature: QuadratureConfiguration {
                rule: IntegrationRule::GaussLegendre,
                number_of_points: crate::constants::DEFAULT_QUADRATURE_POINTS,
            },
            fit: FitConfiguration {
                method: FitMethod::Simplex,
                initial_coupling: crate::constants::DEFAULT_INITIAL_COUPLING,
                initial_bath: None,
            },
            solver: context,
            log: LogConfiguration {
                directory: PathBuf::from("results"),
                file_name: "dmft.log".into(),
            },
        }
    }
}

impl Configuration {
    /// Layer `<config_dir>/default` and the `RUN_MODE` override over the built-in defaults
    pub fn build(config_dir: &Path) -> Result<Self, ConfigurationError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let defaults = Self::default();

        let s = Config::builder()
            .set_default("quadrature.rule", "GaussLegendre")?
            .set_default(
                "quadrature.number_of_points",
                defaults.quadrature.number_of_points as i64,
            )?
            .set_default("fit.method", "Simplex")?
            .set_default("fit.initial_coupling", defaults.fit.initial_coupling)?
            .set_default("solver.executable", defaults.solver.executable)?
            .set_default(
                "solver.working_directory",
                defaults.solver.working_directory.to_string_lossy().to_string(),
            )?
            .set_default("solver.output_file", defaults.solver.output_file)?
            .set_default(
                "log.directory",
                defaults.log.directory.to_string_lossy().to_string(),
            )?
            .set_default("log.file_name", defaults.log.file_name)?
            // The default settings for the calculation
            .add_source(
                File::with_name(&config_dir.join("default").to_string_lossy()).required(false),
            )
            // The override settings which may be set by the user
            .add_source(
                File::with_name(&config_dir.join(&run_mode).to_string_lossy()).required(false),
            )
            .build()?;

        let configuration: Self = s.try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if self.quadrature.number_of_points < 2 {
            return Err(ConfigurationError::InvalidValue {
                key: "quadrature.number_of_points",
                reason: "at least two quadrature points are needed".into(),
            });
        }
        Ok(())
    }
}
