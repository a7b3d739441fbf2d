use truss2d::{point, TrussEditError, TrussSystem};

/// Elastic modulus of every member in the demonstration truss, in pascals.
pub const ELASTIC_MODULUS: f64 = 2.0e11;

/// Cross-sectional area of every member in the demonstration truss, in square metres.
pub const AREA: f64 = 0.01;

/// Build the two-panel demonstration truss.
///
/// Six joints on a 3 m grid form two square panels, each braced by one diagonal
/// meeting at the top middle joint. A pin at the bottom left and a roller at the
/// bottom right make the structure statically determinate
/// (see <https://en.wikipedia.org/wiki/Truss#Statically_determinate_trusses>).
pub fn build_demonstration_truss() -> Result<TrussSystem, TrussEditError> {
    let mut truss = TrussSystem::new();

    // Bottom chord joints 1-3, then top chord joints 4-6.
    let n1 = truss.add_node(point(0.0, 0.0), true, true)?;
    let n2 = truss.add_node(point(3.0, 0.0), false, false)?;
    let n3 = truss.add_node(point(6.0, 0.0), false, true)?;
    let n4 = truss.add_node(point(0.0, 3.0), false, false)?;
    let n5 = truss.add_node(point(3.0, 3.0), false, false)?;
    let n6 = truss.add_node(point(6.0, 3.0), false, false)?;

    let members = [
        (n1, n2),
        (n2, n3),
        (n4, n5),
        (n5, n6),
        (n1, n4),
        (n2, n5),
        (n3, n6),
        (n1, n5),
        (n5, n3),
    ];
    for (start, end) in members {
        truss.add_member(start, end, ELASTIC_MODULUS, AREA)?;
    }

    // A heavy gravity load at the top middle joint and a lateral push at the top left.
    truss.add_load(n5, 0.0, -100_000.0)?;
    truss.add_load(n4, 10_000.0, 0.0)?;

    Ok(truss)
}
