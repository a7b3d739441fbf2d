use std::error::Error;
use std::fs;
use std::path::PathBuf;

use log::info;
use truss2d::{AnalysisError, AnalysisResults, InputTables, TrussSystem};

use crate::conditions::build_demonstration_truss;

/// Where the model to analyse comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// The built-in two-panel truss.
    Demonstration,
    /// An [`InputTables`] JSON document on disk.
    Tables(PathBuf),
}

/// Build an unsolved truss from the selected source.
///
/// Table documents go through row validation first, so a malformed row is
/// reported with its table and position rather than reaching the solver.
pub fn load_model(source: &ModelSource) -> Result<TrussSystem, Box<dyn Error>> {
    match source {
        ModelSource::Demonstration => Ok(build_demonstration_truss()?),
        ModelSource::Tables(path) => {
            info!("reading input tables from {}", path.display());
            let document = fs::read_to_string(path)?;
            let tables = InputTables::from_json_str(&document)?;
            let input = tables.validate()?;
            Ok(input.build()?)
        }
    }
}

/// Solve the truss and collect the results for reporting.
///
/// The truss is solved with the stiffness method described at
/// <https://en.wikipedia.org/wiki/Direct_stiffness_method>.
pub fn run_analysis(truss: &mut TrussSystem) -> Result<AnalysisResults, AnalysisError> {
    truss.solve()?;
    Ok(truss
        .results()
        .expect("results are available after a successful solve"))
}
