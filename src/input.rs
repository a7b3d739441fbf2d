//! Validation of loosely typed tabular input into a typed model description.
//!
//! Table editors hand over rows whose cells may be numbers, numeric strings,
//! booleans or blank. [`InputTables::validate`] either produces a [`TrussInput`]
//! whose every field is typed and checked, or the complete list of rejected rows.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::SolverConfig;
use crate::errors::{InputError, RowError, Table, TrussEditError};
use crate::geometry::{point, Point};
use crate::truss::TrussSystem;

/// A single table cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value.
    Number(f64),
    /// Boolean value, accepted for restraint flags.
    Flag(bool),
    /// Free text, parsed on demand.
    Text(String),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

/// Parsed value of an optional cell.
enum Value<T> {
    /// Cell was absent or blank.
    Missing,
    /// Cell held a valid value.
    Present(T),
}

/// Read a real number; blank text counts as missing.
fn read_number(cell: Option<&Cell>, column: &str) -> Result<Value<f64>, String> {
    let value = match cell {
        None => return Ok(Value::Missing),
        Some(Cell::Number(value)) => *value,
        Some(Cell::Text(text)) if text.trim().is_empty() => return Ok(Value::Missing),
        Some(Cell::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{column} is not a number ({text:?})"))?,
        Some(Cell::Flag(_)) => return Err(format!("{column} must be a number")),
    };
    if value.is_finite() {
        Ok(Value::Present(value))
    } else {
        Err(format!("{column} must be finite"))
    }
}

/// Read a required real number.
fn require_number(cell: Option<&Cell>, column: &str) -> Result<f64, String> {
    match read_number(cell, column)? {
        Value::Present(value) => Ok(value),
        Value::Missing => Err(format!("{column} is missing")),
    }
}

/// Read a strictly positive real number.
fn require_positive(cell: Option<&Cell>, column: &str) -> Result<f64, String> {
    let value = require_number(cell, column)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{column} must be positive (received {value})"))
    }
}

/// Read a one-based row reference.
fn require_row(cell: Option<&Cell>, column: &str) -> Result<usize, String> {
    let value = require_number(cell, column)?;
    if value < 1.0 || value.fract() != 0.0 {
        return Err(format!("{column} must be a positive whole number (received {value})"));
    }
    // Truncation is exact: the value is a finite positive integer.
    Ok(value as usize)
}

/// Read a `0|1` restraint flag; absent cells mean free.
fn read_flag(cell: Option<&Cell>, column: &str) -> Result<bool, String> {
    match cell {
        None => Ok(false),
        Some(Cell::Flag(flag)) => Ok(*flag),
        Some(Cell::Number(value)) if *value == 0.0 => Ok(false),
        Some(Cell::Number(value)) if *value == 1.0 => Ok(true),
        Some(Cell::Text(text)) => match text.trim() {
            "" | "0" | "false" => Ok(false),
            "1" | "true" => Ok(true),
            other => Err(format!("{column} must be 0 or 1 (received {other:?})")),
        },
        Some(Cell::Number(value)) => Err(format!("{column} must be 0 or 1 (received {value})")),
    }
}

/// Raw node row: `X, Y, Restrain_X, Restrain_Y`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// X coordinate.
    #[serde(rename = "X", alias = "x", default)]
    pub x: Option<Cell>,
    /// Y coordinate.
    #[serde(rename = "Y", alias = "y", default)]
    pub y: Option<Cell>,
    /// X restraint flag.
    #[serde(rename = "Restrain_X", alias = "restrain_x", default)]
    pub restrain_x: Option<Cell>,
    /// Y restraint flag.
    #[serde(rename = "Restrain_Y", alias = "restrain_y", default)]
    pub restrain_y: Option<Cell>,
}

/// Raw member row: `Node_I, Node_J, Area, E`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Node row position of the start node.
    #[serde(rename = "Node_I", alias = "node_i", default)]
    pub node_i: Option<Cell>,
    /// Node row position of the end node.
    #[serde(rename = "Node_J", alias = "node_j", default)]
    pub node_j: Option<Cell>,
    /// Cross-sectional area in square metres.
    #[serde(rename = "Area", alias = "Area(sq.m)", alias = "area", default)]
    pub area: Option<Cell>,
    /// Elastic modulus in pascals.
    #[serde(rename = "E", alias = "E (N/sq.m)", alias = "elastic_modulus", default)]
    pub elastic_modulus: Option<Cell>,
}

/// Raw load row: `Node_ID, Force_X, Force_Y`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadRecord {
    /// Node row position of the loaded node.
    #[serde(rename = "Node_ID", alias = "node_id", default)]
    pub node: Option<Cell>,
    /// Load along X in newtons; blank means zero.
    #[serde(rename = "Force_X", alias = "Force_X (N)", alias = "force_x", default)]
    pub force_x: Option<Cell>,
    /// Load along Y in newtons; blank means zero.
    #[serde(rename = "Force_Y", alias = "Force_Y (N)", alias = "force_y", default)]
    pub force_y: Option<Cell>,
}

/// The three input tables plus optional solver settings.
///
/// # Examples
/// ```
/// use truss2d::InputTables;
///
/// let tables = InputTables::from_json_str(r#"{
///     "nodes": [
///         { "X": 0, "Y": 0, "Restrain_X": 1, "Restrain_Y": 1 },
///         { "X": 2, "Y": 0, "Restrain_Y": 1 }
///     ],
///     "members": [ { "Node_I": 1, "Node_J": 2, "Area": 0.01, "E": 2e11 } ],
///     "loads": [ { "Node_ID": 2, "Force_X": 1000 } ]
/// }"#).expect("well-formed document");
///
/// let mut truss = tables.validate().expect("valid rows").build().expect("valid members");
/// truss.solve().expect("stable bar");
/// assert!(truss.node(2).unwrap().ux() > 0.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputTables {
    /// Node rows.
    pub nodes: Vec<NodeRecord>,
    /// Member rows.
    pub members: Vec<MemberRecord>,
    /// Load rows.
    pub loads: Vec<LoadRecord>,
    /// Solver settings; defaults apply when absent.
    pub solver: Option<SolverConfig>,
}

impl InputTables {
    /// Parse the tables from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Malformed`] when the document does not match the table
    /// layout.
    pub fn from_json_str(json: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check every row and produce a typed model description.
    ///
    /// Node rows lacking X or Y are skipped; node identifiers are assigned to the
    /// remaining rows in order. Member endpoints and loaded nodes refer to node row
    /// positions and must point at a row that was kept.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Rows`] listing every rejected row.
    pub fn validate(&self) -> Result<TrussInput, InputError> {
        let mut errors = Vec::new();
        let mut nodes = Vec::new();
        let mut node_ids: HashMap<usize, usize> = HashMap::new();

        for (offset, record) in self.nodes.iter().enumerate() {
            let row = offset + 1;
            match Self::validate_node(record) {
                Ok(Some(node)) => {
                    nodes.push(node);
                    node_ids.insert(row, nodes.len());
                }
                Ok(None) => debug!("skipping node row {row} without coordinates"),
                Err(reason) => errors.push(RowError::new(Table::Nodes, row, reason)),
            }
        }

        let resolve = |cell: Option<&Cell>, column: &str| -> Result<usize, String> {
            let row = require_row(cell, column)?;
            node_ids.get(&row).copied().ok_or_else(|| {
                format!("{column} references node row {row}, which is missing or was skipped")
            })
        };

        let mut members = Vec::new();
        for (offset, record) in self.members.iter().enumerate() {
            let member = (|| {
                Ok::<_, String>(MemberInput {
                    node_i: resolve(record.node_i.as_ref(), "Node_I")?,
                    node_j: resolve(record.node_j.as_ref(), "Node_J")?,
                    area: require_positive(record.area.as_ref(), "Area")?,
                    elastic_modulus: require_positive(record.elastic_modulus.as_ref(), "E")?,
                })
            })();
            match member {
                Ok(member) => members.push(member),
                Err(reason) => errors.push(RowError::new(Table::Members, offset + 1, reason)),
            }
        }

        let mut loads = Vec::new();
        for (offset, record) in self.loads.iter().enumerate() {
            let load = (|| {
                Ok::<_, String>(LoadInput {
                    node: resolve(record.node.as_ref(), "Node_ID")?,
                    force_x: Self::optional_force(record.force_x.as_ref(), "Force_X")?,
                    force_y: Self::optional_force(record.force_y.as_ref(), "Force_Y")?,
                })
            })();
            match load {
                Ok(load) => loads.push(load),
                Err(reason) => errors.push(RowError::new(Table::Loads, offset + 1, reason)),
            }
        }

        if !errors.is_empty() {
            return Err(InputError::Rows(errors));
        }
        Ok(TrussInput {
            nodes,
            members,
            loads,
            config: self.solver.unwrap_or_default(),
        })
    }

    /// Validate one node row; `None` means the row is skipped.
    fn validate_node(record: &NodeRecord) -> Result<Option<NodeInput>, String> {
        let x = read_number(record.x.as_ref(), "X")?;
        let y = read_number(record.y.as_ref(), "Y")?;
        let restrain_x = read_flag(record.restrain_x.as_ref(), "Restrain_X")?;
        let restrain_y = read_flag(record.restrain_y.as_ref(), "Restrain_Y")?;
        match (x, y) {
            (Value::Present(x), Value::Present(y)) => Ok(Some(NodeInput {
                position: point(x, y),
                restrain_x,
                restrain_y,
            })),
            _ => Ok(None),
        }
    }

    /// Load component that defaults to zero when blank.
    fn optional_force(cell: Option<&Cell>, column: &str) -> Result<f64, String> {
        match read_number(cell, column)? {
            Value::Present(value) => Ok(value),
            Value::Missing => Ok(0.0),
        }
    }
}

/// Validated node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeInput {
    /// Position in metres.
    pub position: Point,
    /// X restraint.
    pub restrain_x: bool,
    /// Y restraint.
    pub restrain_y: bool,
}

/// Validated member with endpoints as node identifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MemberInput {
    /// Start node identifier.
    pub node_i: usize,
    /// End node identifier.
    pub node_j: usize,
    /// Cross-sectional area in square metres.
    pub area: f64,
    /// Elastic modulus in pascals.
    pub elastic_modulus: f64,
}

/// Validated load with the node as an identifier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoadInput {
    /// Loaded node identifier.
    pub node: usize,
    /// Load along X in newtons.
    pub force_x: f64,
    /// Load along Y in newtons.
    pub force_y: f64,
}

/// Fully typed model description produced by [`InputTables::validate`].
#[derive(Clone, Debug, PartialEq)]
pub struct TrussInput {
    /// Nodes in identifier order.
    nodes: Vec<NodeInput>,
    /// Members in identifier order.
    members: Vec<MemberInput>,
    /// Loads in input order.
    loads: Vec<LoadInput>,
    /// Solver settings.
    config: SolverConfig,
}

impl TrussInput {
    /// Validated nodes; the node at index `k` has identifier `k + 1`.
    #[must_use]
    pub fn nodes(&self) -> &[NodeInput] {
        &self.nodes
    }

    /// Validated members.
    #[must_use]
    pub fn members(&self) -> &[MemberInput] {
        &self.members
    }

    /// Validated loads.
    #[must_use]
    pub fn loads(&self) -> &[LoadInput] {
        &self.loads
    }

    /// Solver settings.
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Build a fresh, unsolved [`TrussSystem`].
    ///
    /// # Errors
    ///
    /// Returns [`TrussEditError::Construction`] when a member has coincident
    /// endpoints.
    pub fn build(&self) -> Result<TrussSystem, TrussEditError> {
        let mut truss = TrussSystem::with_config(self.config);
        for node in &self.nodes {
            truss.add_node(node.position, node.restrain_x, node.restrain_y)?;
        }
        for member in &self.members {
            truss.add_member(
                member.node_i,
                member.node_j,
                member.elastic_modulus,
                member.area,
            )?;
        }
        for load in &self.loads {
            truss.add_load(load.node, load.force_x, load.force_y)?;
        }
        Ok(truss)
    }
}
