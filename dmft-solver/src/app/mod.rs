// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

/// This module governs the high-level implementation of the calculation
mod configuration;
mod error;
mod telemetry;

pub use configuration::{Configuration, FitConfiguration, LogConfiguration, QuadratureConfiguration};
pub use error::DmftError;

use crate::bath::BathParameters;
use crate::density_of_states::DensityOfStates;
use crate::error::ConfigurationError;
use crate::fit::{initial_guess, BathFitter};
use crate::greens_functions::LatticeGreensFunctionBuilder;
use crate::impurity::build_impurity_solver;
use crate::outer_loop::{Convergence, DmftLoopBuilder, LoopOutcome, Outer};
use crate::params::ParamsDmftSolver;
use crate::postprocessor::Report;
use crate::spectral::{FrequencyFunction, MatsubaraGrid};
use clap::{ArgEnum, Parser};
use ndarray::Array1;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct App {
    /// The `key=value` input file describing the run
    file_path: PathBuf,
    #[clap(arg_enum, short, long, default_value = "info")]
    log_level: LogLevel,
    /// The directory holding the numerical configuration
    #[clap(short, long, default_value = ".config")]
    config_dir: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ArgEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        write!(f, "{}", level)
    }
}

/// Parse the command line, run the calculation and write the report to stdout
pub fn run() -> miette::Result<()> {
    let cli = App::parse();
    let config = Configuration::build(&cli.config_dir)?;

    let (subscriber, _guard) = telemetry::get_subscriber(cli.log_level, &config.log);
    telemetry::init_subscriber(subscriber)?;

    let params = ParamsDmftSolver::build(&cli.file_path)?;

    let stdout = std::io::stdout();
    let mut progress = stdout.lock();
    let outcome = run_calculation(&params, &config, &mut progress)?;
    tracing::info!(
        "Finished with status {:?} after pass {}",
        outcome.status,
        outcome.iteration
    );
    Ok(())
}

/// Set up the loop described by `params` and `config`, iterate it, and write the progress lines
/// followed by the report to `output`
///
/// Every configuration problem is reported before any frequency is computed.
pub fn run_calculation(
    params: &ParamsDmftSolver,
    config: &Configuration,
    output: &mut dyn Write,
) -> Result<LoopOutcome, DmftError> {
    params.validate()?;
    let density_of_states =
        DensityOfStates::new(&params.lattice_gf, params.half_bandwidth, params.mu)?;
    let impurity_solver = build_impurity_solver(params, &config.solver)?;
    let initial_bath = starting_bath(params, &config.fit)?;

    let grid = MatsubaraGrid::new(params.fictitious_beta, params.n_matsubaras);
    let lattice = LatticeGreensFunctionBuilder::new()
        .with_density_of_states(&density_of_states)
        .with_matsubara_grid(grid)
        .with_quadrature(config.quadrature.rule, config.quadrature.number_of_points)
        .build()?;
    let fitter = BathFitter::new(params.min_params, config.fit.method, initial_bath);
    let convergence = Convergence::from(params);

    let mut dmft = DmftLoopBuilder::new()
        .with_lattice(lattice)
        .with_fitter(fitter)
        .with_impurity_solver(impurity_solver)
        .with_convergence_settings(&convergence)
        .build();

    let outcome = dmft.run_loop(FrequencyFunction::zeros(grid), output)?;

    Report::new(&dmft, &outcome).write(output, params.precision)?;
    Ok(outcome)
}

// The configured starting bath, or the default guess spread over the band
fn starting_bath(
    params: &ParamsDmftSolver,
    fit: &FitConfiguration,
) -> Result<BathParameters, ConfigurationError> {
    match &fit.initial_bath {
        Some(values) if values.len() != 2 * params.n_bath => {
            Err(ConfigurationError::InvalidValue {
                key: "fit.initial_bath",
                reason: format!(
                    "{} bath sites need {} values, found {}",
                    params.n_bath,
                    2 * params.n_bath,
                    values.len()
                ),
            })
        }
        Some(values) => Ok(BathParameters::new(Array1::from(values.clone()))),
        None => Ok(initial_guess(
            params.n_bath,
            params.half_bandwidth,
            fit.initial_coupling,
        )),
    }
}

#[cfg(test)]
mod test {
    use super::{starting_bath, Configuration, LogLevel};
    use crate::error::ConfigurationError;
    use crate::fit::MinParams;
    use crate::params::ParamsDmftSolver;

    fn params(n_bath: usize) -> ParamsDmftSolver {
        ParamsDmftSolver {
            fictitious_beta: 10.,
            mu: 0.,
            n_matsubaras: 8,
            lattice_gf: "semicircular".into(),
            n_bath,
            dmft_iterations: 1,
            dmft_tolerance: 1e-6,
            gs_template: "gs.ain".into(),
            omega_template: "omega.ain".into(),
            impurity_solver: "exactdiag".into(),
            precision: None,
            half_bandwidth: 1.,
            min_params: MinParams::default(),
        }
    }

    #[test]
    fn log_levels_are_valid_filters() {
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[test]
    fn explicit_starting_bath_must_match_the_bath_size() {
        let mut config = Configuration::default();
        config.fit.initial_bath = Some(vec![0.5, 0., 0.1]);
        assert!(matches!(
            starting_bath(&params(1), &config.fit),
            Err(ConfigurationError::InvalidValue { key: "fit.initial_bath", .. })
        ));

        config.fit.initial_bath = Some(vec![0.5, 0.1]);
        let bath = starting_bath(&params(1), &config.fit).unwrap();
        assert_eq!(bath.energies().to_vec(), vec![0.1]);
    }

    #[test]
    fn default_starting_bath_uses_the_configured_coupling() {
        let mut config = Configuration::default();
        config.fit.initial_coupling = 0.25;
        let bath = starting_bath(&params(2), &config.fit).unwrap();
        assert_eq!(bath.couplings().to_vec(), vec![0.25, 0.25]);
    }
}
