#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use truss2d::{point, ConstructionError, MemberNature, TrussEditError, TrussSystem};

#[derive(Debug, Clone, Copy)]
struct BarProperties {
    length: f64,
    area: f64,
    elastic_modulus: f64,
    axial_load: f64,
}

impl Default for BarProperties {
    fn default() -> Self {
        Self {
            length: 2.5,
            area: 0.01,
            elastic_modulus: 200.0e9,
            axial_load: -1_000.0,
        }
    }
}

fn build_axial_bar(properties: BarProperties) -> TrussSystem {
    let mut truss = TrussSystem::new();
    let fixed = truss
        .add_node(point(0.0, 0.0), true, true)
        .expect("fixed node added");
    let loaded = truss
        .add_node(point(properties.length, 0.0), false, true)
        .expect("loaded node added");
    truss
        .add_member(fixed, loaded, properties.elastic_modulus, properties.area)
        .expect("member properties accepted");
    truss
        .add_load(loaded, properties.axial_load, 0.0)
        .expect("axial load applied");
    truss
}

#[test]
fn builds_expected_topology() {
    let truss = build_axial_bar(BarProperties::default());

    assert_eq!(truss.node_count(), 2);
    assert_eq!(truss.member_count(), 1);
    assert_eq!(truss.node(2).expect("loaded node").dof_x(), 2);
    assert_eq!(truss.member(1).expect("member").global_dofs(), [0, 1, 2, 3]);
}

#[test]
fn displacement_matches_closed_form_solution() {
    let properties = BarProperties::default();
    let mut truss = build_axial_bar(properties);
    truss.solve().expect("axial bar analysis succeeds");

    let expected =
        properties.axial_load * properties.length / (properties.elastic_modulus * properties.area);
    let loaded = truss.node(2).expect("loaded node");
    assert_relative_eq!(loaded.ux(), expected, max_relative = 1.0e-9);
    assert_eq!(loaded.uy(), 0.0);

    let fixed = truss.node(1).expect("fixed node");
    assert_eq!(fixed.ux(), 0.0);
    assert_eq!(fixed.uy(), 0.0);
}

#[test]
fn member_force_follows_sign_convention() {
    let properties = BarProperties::default();
    let mut truss = build_axial_bar(properties);
    truss.solve().expect("axial bar analysis succeeds");

    let member = truss.member(1).expect("member");
    assert_relative_eq!(member.axial_force(), properties.axial_load, max_relative = 1.0e-9);
    assert_eq!(member.nature(1.0e-6), MemberNature::Compression);
    assert_relative_eq!(
        member.stress(),
        properties.axial_load / properties.area,
        max_relative = 1.0e-9
    );
    assert_eq!(member.transformation().as_slice(), &[-1.0, -0.0, 1.0, 0.0]);
}

#[test]
fn pulling_the_bar_puts_it_in_tension() {
    let mut truss = build_axial_bar(BarProperties {
        axial_load: 4_000.0,
        ..BarProperties::default()
    });
    truss.solve().expect("axial bar analysis succeeds");

    let member = truss.member(1).expect("member");
    assert!(member.axial_force() > 0.0);
    assert_eq!(member.nature(1.0e-6), MemberNature::Tension);
    assert_relative_eq!(
        truss.node(1).expect("fixed node").reaction_x(),
        -4_000.0,
        max_relative = 1.0e-9
    );
}

#[test]
fn reduced_system_contains_only_the_free_axis() {
    let properties = BarProperties::default();
    let mut truss = build_axial_bar(properties);
    truss.solve().expect("axial bar analysis succeeds");

    assert_eq!(truss.free_dofs(), Some(&[2][..]));
    let reduced = truss.reduced_stiffness().expect("reduced stiffness");
    assert_eq!(reduced.shape(), (1, 1));
    assert_relative_eq!(
        reduced[(0, 0)],
        properties.elastic_modulus * properties.area / properties.length
    );
    assert_relative_eq!(truss.condition_number().expect("solved"), 1.0);
}

#[test]
fn coincident_endpoints_fail_before_solving() {
    let mut truss = TrussSystem::new();
    let a = truss.add_node(point(1.0, 1.0), true, true).expect("node added");
    let b = truss.add_node(point(1.0, 1.0), false, false).expect("node added");

    let error = truss
        .add_member(a, b, 200.0e9, 0.01)
        .expect_err("zero-length member rejected");
    assert_eq!(
        error,
        TrussEditError::Construction(ConstructionError::ZeroLength {
            member: 1,
            node_i: a,
            node_j: b
        })
    );
    assert_eq!(truss.member_count(), 0);
}
