use anyhow::{bail, Result};
use simmlst_sim::ParameterGrid;

use crate::args::GridArgs;
use crate::utils::{read_json, write_json};

pub fn run_grid(args: &GridArgs) -> Result<()> {
    let grid: ParameterGrid = read_json(&args.input)?;
    if grid.is_empty() {
        bail!(
            "Parameter grid in {} has an empty value list",
            args.input.display()
        );
    }

    let configs = grid.expand(args.replicates);
    write_json(&args.output, &configs)?;
    println!(
        "✓ Wrote {} configurations ({} distinct × {} replicates) to: {}",
        configs.len(),
        grid.len(),
        args.replicates,
        args.output.display()
    );

    Ok(())
}
