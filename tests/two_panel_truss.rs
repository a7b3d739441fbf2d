use std::f64::consts::SQRT_2;

use approx::assert_relative_eq;
use truss2d::{point, MemberNature, TrussSystem};

const E: f64 = 2.0e11;
const A: f64 = 0.01;

/// Two square panels on a 3 m grid, pin at node 1, roller at node 3.
///
/// Member order: bottom chords, top chords, verticals, diagonals.
fn two_panel_truss(loads: &[(usize, f64, f64)]) -> TrussSystem {
    let mut truss = TrussSystem::new();
    let joints = [
        (0.0, 0.0, true, true),
        (3.0, 0.0, false, false),
        (6.0, 0.0, false, true),
        (0.0, 3.0, false, false),
        (3.0, 3.0, false, false),
        (6.0, 3.0, false, false),
    ];
    for (x, y, restrain_x, restrain_y) in joints {
        truss
            .add_node(point(x, y), restrain_x, restrain_y)
            .expect("node added");
    }
    for (start, end) in [
        (1, 2),
        (2, 3),
        (4, 5),
        (5, 6),
        (1, 4),
        (2, 5),
        (3, 6),
        (1, 5),
        (5, 3),
    ] {
        truss.add_member(start, end, E, A).expect("member added");
    }
    for &(node, force_x, force_y) in loads {
        truss.add_load(node, force_x, force_y).expect("load applied");
    }
    truss
}

fn design_loads() -> Vec<(usize, f64, f64)> {
    vec![(5, 0.0, -100_000.0), (4, 10_000.0, 0.0)]
}

fn solved(loads: &[(usize, f64, f64)]) -> TrussSystem {
    let mut truss = two_panel_truss(loads);
    truss.solve().expect("two-panel truss is stable");
    truss
}

fn force(truss: &TrussSystem, member: usize) -> f64 {
    truss.member(member).expect("member exists").axial_force()
}

#[test]
fn member_forces_match_method_of_joints() {
    let truss = solved(&design_loads());

    assert_relative_eq!(force(&truss, 1), 55_000.0, max_relative = 1.0e-6);
    assert_relative_eq!(force(&truss, 2), 55_000.0, max_relative = 1.0e-6);
    assert_relative_eq!(force(&truss, 3), -10_000.0, max_relative = 1.0e-6);
    assert_relative_eq!(force(&truss, 8), -45_000.0 * SQRT_2, max_relative = 1.0e-6);
    assert_relative_eq!(force(&truss, 9), -55_000.0 * SQRT_2, max_relative = 1.0e-6);
}

#[test]
fn zero_force_members_report_zero() {
    let truss = solved(&design_loads());
    let tolerance = truss.config().zero_force_tolerance;

    for member in [4, 5, 6, 7] {
        assert!(
            force(&truss, member).abs() < 1.0e-3,
            "member {member} carries {}",
            force(&truss, member)
        );
        assert_eq!(
            truss.member(member).expect("member exists").nature(tolerance.max(1.0e-3)),
            MemberNature::ZeroForce
        );
    }
    let natures: Vec<MemberNature> = truss
        .members()
        .map(|member| member.nature(1.0e-3))
        .collect();
    assert!(natures.contains(&MemberNature::Tension));
    assert!(natures.contains(&MemberNature::Compression));
}

#[test]
fn reactions_balance_applied_loads() {
    let truss = solved(&design_loads());

    let pin = truss.node(1).expect("pin");
    let roller = truss.node(3).expect("roller");
    assert_relative_eq!(pin.reaction_x(), -10_000.0, max_relative = 1.0e-9);
    assert_relative_eq!(pin.reaction_y(), 45_000.0, max_relative = 1.0e-9);
    assert_relative_eq!(roller.reaction_y(), 55_000.0, max_relative = 1.0e-9);

    let results = truss.results().expect("solved");
    let (sum_x, sum_y) = results.equilibrium_residual();
    assert_relative_eq!(sum_x, 0.0, epsilon = 1.0e-6);
    assert_relative_eq!(sum_y, 0.0, epsilon = 1.0e-6);
}

#[test]
fn global_stiffness_is_symmetric() {
    let truss = solved(&design_loads());
    let stiffness = truss.global_stiffness().expect("solved");

    assert_eq!(stiffness.shape(), (12, 12));
    for i in 0..12 {
        for j in 0..12 {
            assert_eq!(stiffness[(i, j)], stiffness[(j, i)], "K[{i}][{j}]");
        }
    }
}

#[test]
fn free_dof_residual_vanishes() {
    let truss = solved(&design_loads());
    let solution = truss.solution().expect("solved");

    let residual = &solution.global_stiffness * &solution.displacements - &solution.global_forces;
    for &dof in &solution.free_dofs {
        assert!(residual[dof].abs() < 1.0e-6, "residual at {dof}: {}", residual[dof]);
        assert_relative_eq!(solution.reactions[dof], residual[dof]);
    }
}

#[test]
fn free_dofs_exclude_supports_in_ascending_order() {
    let truss = solved(&design_loads());
    assert_eq!(
        truss.free_dofs().expect("solved"),
        &[2, 3, 4, 6, 7, 8, 9, 10, 11]
    );
    assert_eq!(truss.reduced_forces().expect("solved").len(), 9);
}

#[test]
fn restrained_dofs_do_not_move() {
    let truss = solved(&design_loads());
    let displacements = truss.displacements().expect("solved");
    for dof in [0, 1, 5] {
        assert_eq!(displacements[dof], 0.0);
    }
    assert!(truss.node(5).expect("loaded node").uy() < 0.0);
}

#[test]
fn responses_superpose() {
    let set_a = vec![(5, 0.0, -100_000.0)];
    let set_b = vec![(4, 10_000.0, 0.0), (6, -2_500.0, 7_500.0)];
    let combined: Vec<_> = set_a.iter().chain(set_b.iter()).copied().collect();

    let a = solved(&set_a);
    let b = solved(&set_b);
    let ab = solved(&combined);

    let u_a = a.displacements().expect("solved");
    let u_b = b.displacements().expect("solved");
    let u_ab = ab.displacements().expect("solved");
    let scale = u_ab.amax();
    for dof in 0..u_ab.len() {
        assert_relative_eq!(u_ab[dof], u_a[dof] + u_b[dof], epsilon = 1.0e-9 * scale);
    }
    for member in 1..=9 {
        assert_relative_eq!(
            force(&ab, member),
            force(&a, member) + force(&b, member),
            epsilon = 1.0e-6
        );
    }
}

#[test]
fn repeated_loads_accumulate() {
    let split = solved(&[(5, 0.0, -60_000.0), (5, 0.0, -40_000.0), (4, 10_000.0, 0.0)]);
    let whole = solved(&design_loads());
    assert_relative_eq!(
        split.node(5).expect("node").uy(),
        whole.node(5).expect("node").uy(),
        max_relative = 1.0e-12
    );
}

#[test]
fn results_serialise_to_json() {
    let truss = solved(&design_loads());
    let json = truss.results().expect("solved").to_json().expect("serialisable");
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["members"].as_array().map(Vec::len), Some(9));
    assert_eq!(value["members"][2]["nature"], "Compression");
}
