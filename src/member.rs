//! Two-force truss members: geometry, element stiffness and axial force recovery.

use std::fmt;

use nalgebra::{Matrix4, RowVector4, Vector4};
use serde::{Deserialize, Serialize};

use crate::errors::ConstructionError;
use crate::geometry::DirectionCosines;
use crate::node::Node;

/// Sense of the axial force carried by a member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberNature {
    /// Positive axial force, the member is being stretched.
    Tension,
    /// Negative axial force, the member is being shortened.
    Compression,
    /// Axial force within the zero-force tolerance.
    ZeroForce,
}

impl MemberNature {
    /// Classify an axial force using an absolute tolerance in newtons.
    #[must_use]
    pub fn classify(axial_force: f64, tolerance: f64) -> Self {
        if axial_force.abs() <= tolerance {
            MemberNature::ZeroForce
        } else if axial_force > 0.0 {
            MemberNature::Tension
        } else {
            MemberNature::Compression
        }
    }
}

impl fmt::Display for MemberNature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MemberNature::Tension => "Tensile",
            MemberNature::Compression => "Compressive",
            MemberNature::ZeroForce => "Zero force",
        };
        f.write_str(label)
    }
}

/// A pin-ended bar connecting two nodes.
///
/// Members refer to their endpoints by node id; the nodes themselves are owned by
/// the [`TrussSystem`](crate::TrussSystem).
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    /// One-based identifier assigned in insertion order.
    id: usize,
    /// Start node identifier.
    node_i: usize,
    /// End node identifier.
    node_j: usize,
    /// Elastic modulus in pascals.
    elastic_modulus: f64,
    /// Cross-sectional area in square metres.
    area: f64,
    /// Distance between the endpoints in metres.
    length: f64,
    /// Orientation of the member axis.
    cosines: DirectionCosines,
    /// Last computed element stiffness in global coordinates.
    stiffness: Matrix4<f64>,
    /// End displacements `[i.ux, i.uy, j.ux, j.uy]` used for the last force recovery.
    local_displacements: Vector4<f64>,
    /// Row `[-c, -s, c, s]` mapping end displacements to elongation.
    transformation: RowVector4<f64>,
    /// Axial force after analysis in newtons; tension positive.
    axial_force: f64,
}

impl Member {
    /// Validate the properties and geometry of a new member.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when `area` or `elastic_modulus` is not a finite,
    /// strictly positive value or when both endpoints share coordinates.
    pub fn new(
        id: usize,
        node_i: &Node,
        node_j: &Node,
        elastic_modulus: f64,
        area: f64,
    ) -> Result<Self, ConstructionError> {
        if !area.is_finite() || area <= 0.0 {
            return Err(ConstructionError::NonPositiveArea { member: id, area });
        }
        if !elastic_modulus.is_finite() || elastic_modulus <= 0.0 {
            return Err(ConstructionError::NonPositiveElasticModulus {
                member: id,
                elastic_modulus,
            });
        }
        let (length, cosines) = DirectionCosines::between(node_i.position(), node_j.position())
            .ok_or(ConstructionError::ZeroLength {
                member: id,
                node_i: node_i.id(),
                node_j: node_j.id(),
            })?;
        Ok(Self {
            id,
            node_i: node_i.id(),
            node_j: node_j.id(),
            elastic_modulus,
            area,
            length,
            cosines,
            stiffness: Matrix4::zeros(),
            local_displacements: Vector4::zeros(),
            transformation: RowVector4::new(-cosines.c, -cosines.s, cosines.c, cosines.s),
            axial_force: 0.0,
        })
    }

    /// One-based identifier of the member.
    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Start node identifier.
    #[must_use]
    pub fn node_i(&self) -> usize {
        self.node_i
    }

    /// End node identifier.
    #[must_use]
    pub fn node_j(&self) -> usize {
        self.node_j
    }

    /// Elastic modulus in pascals.
    #[must_use]
    pub fn elastic_modulus(&self) -> f64 {
        self.elastic_modulus
    }

    /// Cross-sectional area in square metres.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Member length in metres.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Direction cosines of the axis from `node_i` to `node_j`.
    #[must_use]
    pub fn direction_cosines(&self) -> DirectionCosines {
        self.cosines
    }

    /// Axial stiffness `E·A/L` in newtons per metre.
    #[must_use]
    pub fn axial_stiffness(&self) -> f64 {
        self.elastic_modulus * self.area / self.length
    }

    /// Global degrees of freedom `[i.x, i.y, j.x, j.y]`.
    #[must_use]
    pub fn global_dofs(&self) -> [usize; 4] {
        [
            2 * self.node_i - 2,
            2 * self.node_i - 1,
            2 * self.node_j - 2,
            2 * self.node_j - 1,
        ]
    }

    /// Last computed element stiffness matrix. Zero until the first assembly.
    #[must_use]
    pub fn stiffness(&self) -> &Matrix4<f64> {
        &self.stiffness
    }

    /// End displacements used by the last force recovery.
    #[must_use]
    pub fn local_displacements(&self) -> &Vector4<f64> {
        &self.local_displacements
    }

    /// Transformation row `[-c, -s, c, s]`.
    #[must_use]
    pub fn transformation(&self) -> &RowVector4<f64> {
        &self.transformation
    }

    /// Axial force in newtons; negative is compressive, positive is tensile.
    #[must_use]
    pub fn axial_force(&self) -> f64 {
        self.axial_force
    }

    /// Axial stress in pascals.
    #[must_use]
    pub fn stress(&self) -> f64 {
        self.axial_force / self.area
    }

    /// Classify the axial force.
    #[must_use]
    pub fn nature(&self, tolerance: f64) -> MemberNature {
        MemberNature::classify(self.axial_force, tolerance)
    }

    /// Compute and cache the 4×4 element stiffness matrix in global coordinates.
    ///
    /// Rows and columns are ordered `[i.x, i.y, j.x, j.y]`.
    pub fn compute_element_stiffness(&mut self, node_i: &Node, node_j: &Node) -> Matrix4<f64> {
        if let Some((length, cosines)) =
            DirectionCosines::between(node_i.position(), node_j.position())
        {
            self.length = length;
            self.cosines = cosines;
        }
        let c = self.cosines.c;
        let s = self.cosines.s;

        self.stiffness = self.axial_stiffness()
            * Matrix4::new(
                c * c,
                c * s,
                -c * c,
                -c * s,
                c * s,
                s * s,
                -c * s,
                -s * s,
                -c * c,
                -c * s,
                c * c,
                c * s,
                -c * s,
                -s * s,
                c * s,
                s * s,
            );
        self.stiffness
    }

    /// Recover the axial force from the solved end displacements.
    pub fn recover_internal_force(&mut self, node_i: &Node, node_j: &Node) -> f64 {
        let c = self.cosines.c;
        let s = self.cosines.s;
        self.local_displacements = Vector4::new(node_i.ux(), node_i.uy(), node_j.ux(), node_j.uy());
        self.transformation = RowVector4::new(-c, -s, c, s);
        let elongation = self.transformation.dot(&self.local_displacements.transpose());
        self.axial_force = self.axial_stiffness() * elongation;
        self.axial_force
    }

    /// Drop the recovered force after an aborted analysis.
    pub(crate) fn reset_results(&mut self) {
        self.local_displacements = Vector4::zeros();
        self.axial_force = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{point, Displacement};

    fn node(id: usize, x: f64, y: f64) -> Node {
        Node::new(id, point(x, y))
    }

    #[test]
    fn horizontal_member_stiffness() {
        let a = node(1, 0.0, 0.0);
        let b = node(2, 2.0, 0.0);
        let mut member = Member::new(1, &a, &b, 200.0e9, 0.01).expect("valid member");
        let k = member.compute_element_stiffness(&a, &b);
        let ea_over_l = 200.0e9 * 0.01 / 2.0;
        assert_relative_eq!(k[(0, 0)], ea_over_l);
        assert_relative_eq!(k[(0, 2)], -ea_over_l);
        assert_relative_eq!(k[(1, 1)], 0.0);
        assert_eq!(member.stiffness(), &k);
    }

    #[test]
    fn inclined_member_stiffness_is_symmetric_and_singular() {
        let a = node(1, 0.0, 0.0);
        let b = node(2, 3.0, 4.0);
        let mut member = Member::new(1, &a, &b, 1.0, 5.0).expect("valid member");
        let k = member.compute_element_stiffness(&a, &b);
        assert_relative_eq!(k, k.transpose());
        assert_relative_eq!(k.determinant(), 0.0, epsilon = 1.0e-12);
        // E·A/L = 1, c = 0.6, s = 0.8
        assert_relative_eq!(k[(0, 1)], 0.48);
        assert_relative_eq!(k[(3, 3)], 0.64);
    }

    #[test]
    fn elongation_gives_tension() {
        let a = node(1, 0.0, 0.0);
        let mut b = node(2, 1.0, 0.0);
        let mut member = Member::new(1, &a, &b, 200.0e9, 0.01).expect("valid member");
        b.set_displacement(Displacement::new(1.0e-6, 0.0));
        let force = member.recover_internal_force(&a, &b);
        assert_relative_eq!(force, 2_000.0, max_relative = 1.0e-12);
        assert_eq!(member.nature(1.0e-6), MemberNature::Tension);
        assert_relative_eq!(member.stress(), 200_000.0, max_relative = 1.0e-12);
    }

    #[test]
    fn transverse_motion_carries_no_force() {
        let a = node(1, 0.0, 0.0);
        let mut b = node(2, 1.0, 0.0);
        let mut member = Member::new(1, &a, &b, 200.0e9, 0.01).expect("valid member");
        b.set_displacement(Displacement::new(0.0, 1.0e-3));
        assert_relative_eq!(member.recover_internal_force(&a, &b), 0.0);
        assert_eq!(member.nature(1.0e-6), MemberNature::ZeroForce);
    }

    #[test]
    fn invalid_properties_are_rejected() {
        let a = node(1, 0.0, 0.0);
        let b = node(2, 1.0, 0.0);
        assert!(matches!(
            Member::new(4, &a, &b, 200.0e9, 0.0),
            Err(ConstructionError::NonPositiveArea { member: 4, .. })
        ));
        assert!(matches!(
            Member::new(4, &a, &b, -1.0, 0.01),
            Err(ConstructionError::NonPositiveElasticModulus { member: 4, .. })
        ));
    }

    #[test]
    fn infinite_properties_are_rejected() {
        let a = node(1, 0.0, 0.0);
        let b = node(2, 1.0, 0.0);
        assert!(matches!(
            Member::new(2, &a, &b, 200.0e9, f64::INFINITY),
            Err(ConstructionError::NonPositiveArea { member: 2, .. })
        ));
        assert!(matches!(
            Member::new(2, &a, &b, f64::INFINITY, 0.01),
            Err(ConstructionError::NonPositiveElasticModulus { member: 2, .. })
        ));
    }

    #[test]
    fn coincident_endpoints_are_rejected() {
        let a = node(1, 2.0, 2.0);
        let b = node(2, 2.0, 2.0);
        assert_eq!(
            Member::new(1, &a, &b, 200.0e9, 0.01),
            Err(ConstructionError::ZeroLength {
                member: 1,
                node_i: 1,
                node_j: 2
            })
        );
    }

    #[test]
    fn nature_labels() {
        assert_eq!(MemberNature::classify(-5.0, 1.0), MemberNature::Compression);
        assert_eq!(MemberNature::Compression.to_string(), "Compressive");
    }
}
