//! Truss joints and their degrees of freedom.

use crate::geometry::{Displacement, Force, Point};

/// A pin joint of a planar truss.
///
/// Each node owns two global degrees of freedom, `2·id-2` along X and `2·id-1`
/// along Y. Displacements and reactions stay at zero until the owning
/// [`TrussSystem`](crate::TrussSystem) is solved.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// One-based identifier assigned in insertion order.
    id: usize,
    /// Position of the joint in metres.
    position: Point,
    /// Restraint flags along X and Y; `true` locks the displacement at zero.
    restraint: [bool; 2],
    /// Solved displacement in metres.
    displacement: Displacement,
    /// Solved reaction in newtons.
    reaction: Force,
}

impl Node {
    /// Create an unrestrained node.
    pub(crate) fn new(id: usize, position: Point) -> Self {
        Self {
            id,
            position,
            restraint: [false, false],
            displacement: Displacement::default(),
            reaction: Force::default(),
        }
    }

    /// One-based identifier of the node.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Position of the node.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// X coordinate in metres.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    /// Y coordinate in metres.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    /// Whether translation along X is locked.
    #[must_use]
    pub fn restrain_x(&self) -> bool {
        self.restraint[0]
    }

    /// Whether translation along Y is locked.
    #[must_use]
    pub fn restrain_y(&self) -> bool {
        self.restraint[1]
    }

    /// Whether the node carries any support.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.restraint.iter().any(|&locked| locked)
    }

    /// Global index of the X degree of freedom.
    #[must_use]
    pub fn dof_x(&self) -> usize {
        2 * self.id - 2
    }

    /// Global index of the Y degree of freedom.
    #[must_use]
    pub fn dof_y(&self) -> usize {
        2 * self.id - 1
    }

    /// Solved displacement.
    #[must_use]
    pub fn displacement(&self) -> Displacement {
        self.displacement
    }

    /// Solved displacement along X.
    #[must_use]
    pub fn ux(&self) -> f64 {
        self.displacement.x
    }

    /// Solved displacement along Y.
    #[must_use]
    pub fn uy(&self) -> f64 {
        self.displacement.y
    }

    /// Solved reaction. Only meaningful along restrained axes; along free axes it
    /// is the numerical equilibrium residual.
    #[must_use]
    pub fn reaction(&self) -> Force {
        self.reaction
    }

    /// Solved reaction along X.
    #[must_use]
    pub fn reaction_x(&self) -> f64 {
        self.reaction.x
    }

    /// Solved reaction along Y.
    #[must_use]
    pub fn reaction_y(&self) -> f64 {
        self.reaction.y
    }

    pub(crate) fn set_restraint(&mut self, restrain_x: bool, restrain_y: bool) {
        self.restraint = [restrain_x, restrain_y];
    }

    pub(crate) fn set_displacement(&mut self, displacement: Displacement) {
        self.displacement = displacement;
    }

    pub(crate) fn set_reaction(&mut self, reaction: Force) {
        self.reaction = reaction;
    }

    /// Drop solved values after an aborted analysis.
    pub(crate) fn reset_results(&mut self) {
        self.displacement = Displacement::default();
        self.reaction = Force::default();
    }
}
