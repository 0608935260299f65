// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use super::{ImpuritySolver, ImpuritySolverError, SolverContext};
use crate::bath::{BathParameters, ModelParams};
use crate::spectral::MatsubaraGrid;
use itertools::Itertools;
use ndarray::Array1;
use num_complex::Complex;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Drives an external DMRG code
///
/// Each solve renders the ground-state and the frequency templates with the cluster description,
/// runs the configured executable on both in the working directory and reads the impurity
/// Green's function back from the output file. The templates may reference
///
/// - `$sites`: the number of cluster sites
/// - `$potentialV`: the on-site energies, space separated
/// - `$hoppings`: the hopping matrix, one row per line
/// - `$fictitiousBeta`: the inverse temperature
/// - `$matsubaras`: the number of Matsubara frequencies
/// - `$output`: the path the code must write the Green's function to
///
/// The output holds one `ω re im` line per frequency, lines starting with `#` are skipped.
pub struct DensityMatrixRenormalizationGroup {
    grid: MatsubaraGrid,
    gs_template: PathBuf,
    omega_template: PathBuf,
    context: SolverContext,
    gimp: Option<Array1<Complex<f64>>>,
}

impl DensityMatrixRenormalizationGroup {
    /// A solver rendering `gs_template` and `omega_template` for a run on `grid`
    pub fn new(
        grid: MatsubaraGrid,
        gs_template: PathBuf,
        omega_template: PathBuf,
        context: SolverContext,
    ) -> Self {
        Self {
            grid,
            gs_template,
            omega_template,
            context,
            gimp: None,
        }
    }

    fn output_path(&self) -> PathBuf {
        self.context
            .working_directory
            .join(&self.context.output_file)
    }

    fn run(&self, template: &Path, model: &ModelParams, name: &str) -> Result<(), ImpuritySolverError> {
        let source =
            std::fs::read_to_string(template).map_err(|source| ImpuritySolverError::Template {
                path: template.to_path_buf(),
                source,
            })?;
        let input = self.context.working_directory.join(name);
        std::fs::write(&input, render(&source, model, &self.grid, &self.output_path()))?;

        tracing::debug!("Running {} on {}", self.context.executable, input.display());
        let status = Command::new(&self.context.executable)
            .arg(&input)
            .current_dir(&self.context.working_directory)
            .status()?;
        if !status.success() {
            return Err(ImpuritySolverError::Process {
                executable: self.context.executable.clone(),
                input,
                status,
            });
        }
        Ok(())
    }
}

impl ImpuritySolver for DensityMatrixRenormalizationGroup {
    #[tracing::instrument(name = "DMRG", level = "debug", skip_all)]
    fn solve(&mut self, bath: &BathParameters) -> Result<(), ImpuritySolverError> {
        let model = ModelParams::from(bath);
        std::fs::create_dir_all(&self.context.working_directory)?;
        // A run which writes nothing must not pick up an earlier pass's output
        let output = self.output_path();
        match std::fs::remove_file(&output) {
            Err(error) if error.kind() != std::io::ErrorKind::NotFound => return Err(error.into()),
            _ => {}
        }
        self.run(&self.gs_template, &model, "gs.inp")?;
        self.run(&self.omega_template, &model, "omega.inp")?;

        let contents = std::fs::read_to_string(&output)?;
        self.gimp = Some(parse_output(&contents, &output, &self.grid)?);
        Ok(())
    }

    fn gimp(&self) -> &Array1<Complex<f64>> {
        self.gimp
            .as_ref()
            .expect("the impurity Green's function was requested before a successful solve")
    }
}

/// Substitute the cluster description into a solver input template
pub(crate) fn render(
    template: &str,
    model: &ModelParams,
    grid: &MatsubaraGrid,
    output: &Path,
) -> String {
    let hoppings = model
        .hoppings()
        .row_iter()
        .map(|row| row.iter().join(" "))
        .join("\n");
    template
        .replace("$sites", &model.sites().to_string())
        .replace("$potentialV", &model.potential_v().iter().join(" "))
        .replace("$hoppings", &hoppings)
        .replace("$fictitiousBeta", &grid.fictitious_beta().to_string())
        .replace("$matsubaras", &grid.total_matsubaras().to_string())
        .replace("$output", &output.to_string_lossy())
}

/// Read one value of the impurity Green's function per frequency of `grid`
pub(crate) fn parse_output(
    contents: &str,
    path: &Path,
    grid: &MatsubaraGrid,
) -> Result<Array1<Complex<f64>>, ImpuritySolverError> {
    let malformed = |line: usize, reason: String| ImpuritySolverError::MalformedOutput {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut values = Vec::with_capacity(grid.total_matsubaras());
    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if values.len() == grid.total_matsubaras() {
            break;
        }
        let fields = line
            .split_whitespace()
            .map(|field| field.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| malformed(number + 1, e.to_string()))?;
        if fields.len() != 3 {
            return Err(malformed(
                number + 1,
                format!("expected `ω re im`, found {} columns", fields.len()),
            ));
        }
        let expected = grid.omega(values.len());
        if (fields[0] - expected).abs() > 1e-6 * expected.max(1.) {
            return Err(malformed(
                number + 1,
                format!("frequency {} does not match the grid value {}", fields[0], expected),
            ));
        }
        values.push(Complex::new(fields[1], fields[2]));
    }

    if values.len() < grid.total_matsubaras() {
        return Err(ImpuritySolverError::ShortOutput {
            path: path.to_path_buf(),
            expected: grid.total_matsubaras(),
            found: values.len(),
        });
    }
    Ok(Array1::from(values))
}

#[cfg(test)]
mod test {
    use super::{parse_output, render, DensityMatrixRenormalizationGroup};
    use crate::bath::{BathParameters, ModelParams};
    use crate::impurity::{ImpuritySolver, ImpuritySolverError, SolverContext};
    use crate::spectral::MatsubaraGrid;
    use num_complex::Complex;
    use std::f64::consts::PI;
    use std::path::{Path, PathBuf};

    fn scratch_directory(name: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(format!(
            "dmft-solver-dmrg-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&directory).unwrap();
        directory
    }

    #[test]
    fn every_placeholder_is_substituted() {
        let model = ModelParams::from(&BathParameters::from_couplings_and_energies(&[0.5], &[-0.25]));
        let grid = MatsubaraGrid::new(10., 8);
        let template = "sites=$sites\nV=$potentialV\nT=\n$hoppings\nbeta=$fictitiousBeta\nN=$matsubaras\nout=$output\n";
        let rendered = render(template, &model, &grid, Path::new("/tmp/gimp.dat"));

        assert!(!rendered.contains('$'));
        assert_eq!(
            rendered.lines().collect::<Vec<_>>(),
            vec![
                "sites=2",
                "V=0 -0.25",
                "T=",
                "0 0.5",
                "0.5 0",
                "beta=10",
                "N=8",
                "out=/tmp/gimp.dat"
            ]
        );
    }

    #[test]
    fn output_with_comments_is_parsed() {
        let grid = MatsubaraGrid::new(PI, 2);
        let contents = "# omega re im\n1.0 0.1 -0.5\n\n3.0 0.05 -0.3\n";
        let values = parse_output(contents, Path::new("gimp.dat"), &grid).unwrap();
        assert_eq!(values.to_vec(), vec![Complex::new(0.1, -0.5), Complex::new(0.05, -0.3)]);
    }

    #[test]
    fn short_output_is_rejected() {
        let grid = MatsubaraGrid::new(PI, 3);
        let contents = "1.0 0.1 -0.5\n3.0 0.05 -0.3\n";
        assert!(matches!(
            parse_output(contents, Path::new("gimp.dat"), &grid),
            Err(ImpuritySolverError::ShortOutput {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_output_is_rejected() {
        let grid = MatsubaraGrid::new(PI, 1);
        assert!(matches!(
            parse_output("1.0 nope -0.5\n", Path::new("gimp.dat"), &grid),
            Err(ImpuritySolverError::MalformedOutput { line: 1, .. })
        ));
    }

    #[test]
    fn missing_template_is_an_error() {
        let directory = scratch_directory("missing-template");
        let mut solver = DensityMatrixRenormalizationGroup::new(
            MatsubaraGrid::new(PI, 2),
            directory.join("absent-gs.ain"),
            directory.join("absent-omega.ain"),
            SolverContext {
                working_directory: directory.clone(),
                ..SolverContext::default()
            },
        );
        let result = solver.solve(&BathParameters::from_couplings_and_energies(&[0.5], &[0.]));
        std::fs::remove_dir_all(&directory).unwrap();
        assert!(matches!(result, Err(ImpuritySolverError::Template { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn rendered_inputs_are_run_by_the_executable() {
        let directory = scratch_directory("shell");
        let gs_template = directory.join("gs.ain");
        let omega_template = directory.join("omega.ain");
        std::fs::write(&gs_template, "test $sites -eq 2\n").unwrap();
        std::fs::write(
            &omega_template,
            "printf '# generated\\n1 0.25 -0.5\\n3 0.125 -0.25\\n' > $output\n",
        )
        .unwrap();

        let mut solver = DensityMatrixRenormalizationGroup::new(
            MatsubaraGrid::new(PI, 2),
            gs_template,
            omega_template,
            SolverContext {
                executable: "sh".into(),
                working_directory: directory.clone(),
                output_file: "gimp.dat".into(),
            },
        );
        let result = solver.solve(&BathParameters::from_couplings_and_energies(&[0.5], &[0.]));
        let gimp = solver.gimp.clone();
        std::fs::remove_dir_all(&directory).unwrap();

        result.unwrap();
        assert_eq!(
            gimp.unwrap().to_vec(),
            vec![Complex::new(0.25, -0.5), Complex::new(0.125, -0.25)]
        );
    }

    #[cfg(unix)]
    #[test]
    fn output_left_by_an_earlier_run_is_not_reused() {
        let directory = scratch_directory("stale-output");
        let gs_template = directory.join("gs.ain");
        let omega_template = directory.join("omega.ain");
        std::fs::write(&gs_template, "true\n").unwrap();
        std::fs::write(&omega_template, "true\n").unwrap();
        std::fs::write(directory.join("gimp.dat"), "0.3141592653589793 9 9\n").unwrap();

        let mut solver = DensityMatrixRenormalizationGroup::new(
            MatsubaraGrid::new(10., 1),
            gs_template,
            omega_template,
            SolverContext {
                executable: "sh".into(),
                working_directory: directory.clone(),
                output_file: "gimp.dat".into(),
            },
        );
        let result = solver.solve(&BathParameters::from_couplings_and_energies(&[0.5], &[0.]));
        let gimp = solver.gimp.clone();
        std::fs::remove_dir_all(&directory).unwrap();

        assert!(matches!(result, Err(ImpuritySolverError::IO(_))));
        assert!(gimp.is_none());
    }
}
