use std::fmt::Write;

use truss2d::{AnalysisResults, MemberNature};

/// Render a textual summary of a solved truss.
///
/// Forces are reported in kilonewtons with their sense spelled out, so a reader
/// can compare the numbers with a hand calculation by the method of joints
/// (<https://en.wikipedia.org/wiki/Truss#Method_of_joints>).
#[must_use]
pub fn render_summary(results: &AnalysisResults) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Planar truss analysis: {} nodes, {} members (condition number {:.3e})",
        results.nodes.len(),
        results.members.len(),
        results.condition_number
    )
    .expect("writing to string cannot fail");

    output.push_str("\nMaterial and section properties\n");
    for member in &results.members {
        writeln!(
            &mut output,
            "  member {:>3}: nodes {}-{}, A = {:.2e} m^2, E = {:.2e} Pa, L = {:.3} m",
            member.id,
            member.node_i,
            member.node_j,
            member.area,
            member.elastic_modulus,
            member.length
        )
        .expect("writing to string cannot fail");
    }

    output.push_str("\nNodal displacements\n");
    for node in &results.nodes {
        writeln!(
            &mut output,
            "  node {:>3}: ux = {:+.6e} m, uy = {:+.6e} m",
            node.id, node.ux, node.uy
        )
        .expect("writing to string cannot fail");
    }

    output.push_str("\nSupport reactions\n");
    for node in results.nodes.iter().filter(|node| node.is_supported()) {
        let reaction_x = if node.restrain_x { node.reaction_x } else { 0.0 };
        let reaction_y = if node.restrain_y { node.reaction_y } else { 0.0 };
        writeln!(
            &mut output,
            "  node {:>3}: Rx = {:+.2} kN, Ry = {:+.2} kN",
            node.id,
            reaction_x / 1_000.0,
            reaction_y / 1_000.0
        )
        .expect("writing to string cannot fail");
    }

    output.push_str("\nMember forces\n");
    for member in &results.members {
        // Magnitudes are printed unsigned; the label carries the sense.
        let magnitude = if member.nature == MemberNature::ZeroForce {
            0.0
        } else {
            member.axial_force.abs() / 1_000.0
        };
        writeln!(
            &mut output,
            "  member {:>3}: {:.2} kN ({})",
            member.id, magnitude, member.nature
        )
        .expect("writing to string cannot fail");
    }

    output
}
