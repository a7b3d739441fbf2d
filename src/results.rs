//! Flat, serialisable views of a solved truss for plotting and reporting.

use serde::{Deserialize, Serialize};

use crate::geometry::Force;
use crate::member::{Member, MemberNature};
use crate::node::Node;

/// Solved state of one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    /// One-based node identifier.
    pub id: usize,
    /// X coordinate in metres.
    pub x: f64,
    /// Y coordinate in metres.
    pub y: f64,
    /// Whether X translation is locked.
    pub restrain_x: bool,
    /// Whether Y translation is locked.
    pub restrain_y: bool,
    /// Applied load along X in newtons.
    pub force_x: f64,
    /// Applied load along Y in newtons.
    pub force_y: f64,
    /// Displacement along X in metres.
    pub ux: f64,
    /// Displacement along Y in metres.
    pub uy: f64,
    /// Reaction along X in newtons.
    pub reaction_x: f64,
    /// Reaction along Y in newtons.
    pub reaction_y: f64,
}

impl NodeResult {
    pub(crate) fn new(node: &Node, load: Force) -> Self {
        Self {
            id: node.id(),
            x: node.x(),
            y: node.y(),
            restrain_x: node.restrain_x(),
            restrain_y: node.restrain_y(),
            force_x: load.x,
            force_y: load.y,
            ux: node.ux(),
            uy: node.uy(),
            reaction_x: node.reaction_x(),
            reaction_y: node.reaction_y(),
        }
    }

    /// Whether the node carries a support.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.restrain_x || self.restrain_y
    }
}

/// Solved state of one member.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberResult {
    /// One-based member identifier.
    pub id: usize,
    /// Start node identifier.
    pub node_i: usize,
    /// End node identifier.
    pub node_j: usize,
    /// Cross-sectional area in square metres.
    pub area: f64,
    /// Elastic modulus in pascals.
    pub elastic_modulus: f64,
    /// Length in metres.
    pub length: f64,
    /// `Δx / L`.
    pub c: f64,
    /// `Δy / L`.
    pub s: f64,
    /// Element stiffness in global coordinates, row-major.
    pub stiffness: [[f64; 4]; 4],
    /// Axial force in newtons, tension positive.
    pub axial_force: f64,
    /// Axial stress in pascals.
    pub stress: f64,
    /// Tension, compression or zero-force.
    pub nature: MemberNature,
}

impl MemberResult {
    pub(crate) fn new(member: &Member, zero_force_tolerance: f64) -> Self {
        let k = member.stiffness();
        let mut stiffness = [[0.0; 4]; 4];
        for (row, entries) in stiffness.iter_mut().enumerate() {
            for (col, entry) in entries.iter_mut().enumerate() {
                *entry = k[(row, col)];
            }
        }
        let cosines = member.direction_cosines();
        Self {
            id: member.id(),
            node_i: member.node_i(),
            node_j: member.node_j(),
            area: member.area(),
            elastic_modulus: member.elastic_modulus(),
            length: member.length(),
            c: cosines.c,
            s: cosines.s,
            stiffness,
            axial_force: member.axial_force(),
            stress: member.stress(),
            nature: member.nature(zero_force_tolerance),
        }
    }
}

/// Everything a visualisation or report needs from a solved truss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    /// Condition number of the reduced stiffness matrix.
    pub condition_number: f64,
    /// Sorted free degrees of freedom.
    pub free_dofs: Vec<usize>,
    /// Per-node results in identifier order.
    pub nodes: Vec<NodeResult>,
    /// Per-member results in identifier order.
    pub members: Vec<MemberResult>,
}

impl AnalysisResults {
    /// Sum of the applied loads and the reactions at supports, `(ΣX, ΣY)`.
    ///
    /// Both components vanish for a structure in static equilibrium.
    #[must_use]
    pub fn equilibrium_residual(&self) -> (f64, f64) {
        self.nodes.iter().fold((0.0, 0.0), |(sum_x, sum_y), node| {
            let reaction_x = if node.restrain_x { node.reaction_x } else { 0.0 };
            let reaction_y = if node.restrain_y { node.reaction_y } else { 0.0 };
            (
                sum_x + node.force_x + reaction_x,
                sum_y + node.force_y + reaction_y,
            )
        })
    }

    /// Serialise the results as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
