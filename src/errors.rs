//! Error types produced while building or analysing trusses.

use std::fmt;

use thiserror::Error;

/// Error returned when a member cannot be created.
///
/// Members are validated as they are added, so a model that reaches
/// [`TrussSystem::solve`](crate::TrussSystem::solve) never contains a member with
/// meaningless geometry or properties.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum ConstructionError {
    /// Returned when the cross-sectional area is zero, negative or not finite.
    #[error("member {member} has a non-positive area (received {area})")]
    NonPositiveArea {
        /// Identifier of the rejected member.
        member: usize,
        /// Rejected cross-sectional area in square metres.
        area: f64,
    },
    /// Returned when the elastic modulus is zero, negative or not finite.
    #[error("member {member} has a non-positive elastic modulus (received {elastic_modulus})")]
    NonPositiveElasticModulus {
        /// Identifier of the rejected member.
        member: usize,
        /// Rejected elastic modulus in pascals.
        elastic_modulus: f64,
    },
    /// Returned when both endpoints share the same coordinates.
    #[error("member {member} has zero length (nodes {node_i} and {node_j} coincide)")]
    ZeroLength {
        /// Identifier of the rejected member.
        member: usize,
        /// Start node identifier.
        node_i: usize,
        /// End node identifier.
        node_j: usize,
    },
    /// Returned when an endpoint does not exist in the system.
    #[error("member {member} references unknown node {node}")]
    UnknownNode {
        /// Identifier of the rejected member.
        member: usize,
        /// Node identifier that could not be found.
        node: usize,
    },
}

/// Error returned when a model has nothing to assemble.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ModelIncompleteError {
    /// The system contains no nodes.
    #[error("model has no nodes")]
    NoNodes,
    /// The system contains no members.
    #[error("model has no members")]
    NoMembers,
}

/// Error returned when the reduced stiffness system cannot be solved reliably.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum InstabilityError {
    /// Every degree of freedom is restrained.
    #[error("fully locked structure")]
    FullyLocked,
    /// The condition number of the reduced matrix exceeds the configured limit.
    #[error("singular/ill-conditioned system (condition number {condition_number:e})")]
    IllConditioned {
        /// Condition number of the reduced stiffness matrix.
        condition_number: f64,
    },
    /// The LU factorisation of the reduced matrix broke down.
    #[error("singular/ill-conditioned system (factorisation failed)")]
    Singular,
}

/// Error returned when a truss analysis fails.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when there is nothing to assemble.
    #[error(transparent)]
    ModelIncomplete(#[from] ModelIncompleteError),
    /// Returned when the structure is a mechanism or numerically singular.
    #[error(transparent)]
    Instability(#[from] InstabilityError),
}

/// Error returned when editing a [`TrussSystem`](crate::TrussSystem).
///
/// # Examples
///
/// ```
/// use truss2d::{TrussEditError, TrussSystem};
///
/// let mut truss = TrussSystem::new();
/// let error = truss
///     .add_load(7, 0.0, -1_000.0)
///     .expect_err("unknown node is rejected");
/// assert_eq!(error, TrussEditError::UnknownNode(7));
/// ```
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum TrussEditError {
    /// Returned when a node cannot be found in the system.
    #[error("node {0} does not exist in this truss")]
    UnknownNode(usize),
    /// Returned when a load component is NaN or infinite.
    #[error("load on node {node} is not finite (received {force_x}, {force_y})")]
    NonFiniteLoad {
        /// Loaded node identifier.
        node: usize,
        /// Rejected component along X in newtons.
        force_x: f64,
        /// Rejected component along Y in newtons.
        force_y: f64,
    },
    /// Returned when the system has already been solved.
    #[error("truss has already been solved; build a new system for a new analysis")]
    AlreadySolved,
    /// Returned when a member fails validation.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Table an input row belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Table {
    /// Node coordinates and restraints.
    Nodes,
    /// Member connectivity and properties.
    Members,
    /// Nodal point loads.
    Loads,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Nodes => "nodes",
            Table::Members => "members",
            Table::Loads => "loads",
        };
        f.write_str(name)
    }
}

/// A single rejected input row.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{table} row {row}: {reason}")]
pub struct RowError {
    /// Table containing the row.
    pub table: Table,
    /// One-based row position within the table.
    pub row: usize,
    /// Human-readable description of the problem.
    pub reason: String,
}

impl RowError {
    /// Create a row error.
    pub fn new(table: Table, row: usize, reason: impl Into<String>) -> Self {
        Self {
            table,
            row,
            reason: reason.into(),
        }
    }
}

/// Error returned when tabular input cannot be turned into a model.
#[derive(Debug, Error)]
pub enum InputError {
    /// The document is not valid JSON for the table layout.
    #[error("malformed input document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// One or more rows failed validation.
    #[error("{} invalid input row(s); first: {}", .0.len(), .0[0])]
    Rows(Vec<RowError>),
}

impl InputError {
    /// Row-level errors, empty when the document itself was malformed.
    #[must_use]
    pub fn rows(&self) -> &[RowError] {
        match self {
            InputError::Rows(rows) => rows,
            InputError::Malformed(_) => &[],
        }
    }
}
