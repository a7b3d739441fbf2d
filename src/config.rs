//! Tunable thresholds for the solver.

use serde::{Deserialize, Serialize};

/// Condition number above which the reduced stiffness matrix is treated as singular.
pub const DEFAULT_MAX_CONDITION_NUMBER: f64 = 1.0e12;

/// Absolute axial force in newtons below which a member is reported as zero-force.
pub const DEFAULT_ZERO_FORCE_TOLERANCE: f64 = 1.0e-6;

/// Solver settings.
///
/// Missing fields fall back to their defaults when deserialised, so an empty JSON
/// object is a valid configuration.
///
/// # Examples
/// ```
/// use truss2d::SolverConfig;
///
/// let config = SolverConfig::from_json_str(r#"{ "max_condition_number": 1e10 }"#)
///     .expect("valid configuration");
/// assert_eq!(config.max_condition_number, 1.0e10);
/// assert_eq!(config.zero_force_tolerance, 1.0e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Upper bound on the 2-norm condition number of the reduced stiffness matrix.
    pub max_condition_number: f64,
    /// Force magnitude in newtons treated as zero when classifying members.
    pub zero_force_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_condition_number: DEFAULT_MAX_CONDITION_NUMBER,
            zero_force_tolerance: DEFAULT_ZERO_FORCE_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] when the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
