mod analysis;
mod conditions;
mod report;

use std::error::Error;
use std::path::PathBuf;

use analysis::{load_model, run_analysis, ModelSource};
use report::render_summary;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // A path selects a JSON table document; `--json` switches the output format.
    let mut source = ModelSource::Demonstration;
    let mut emit_json = false;
    for argument in std::env::args().skip(1) {
        if argument == "--json" {
            emit_json = true;
        } else {
            source = ModelSource::Tables(PathBuf::from(argument));
        }
    }

    let mut truss = load_model(&source)?;
    let results = run_analysis(&mut truss)?;

    if emit_json {
        println!("{}", results.to_json()?);
    } else {
        println!("{}", render_summary(&results));
    }

    Ok(())
}
