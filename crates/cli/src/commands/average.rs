use anyhow::Result;
use simmlst_sim::ResultRecord;
use tracing::info;

use crate::args::AverageArgs;
use crate::printing::print_summary;
use crate::utils::{read_json, write_json};

pub fn run_average(args: &AverageArgs) -> Result<()> {
    println!("🧮 Averaging results of {}", args.input.display());

    let records: Vec<ResultRecord> = read_json(&args.input)?;
    let averaged = simmlst_sim::average(&records);

    write_json(&args.output, &averaged)?;
    info!(output = %args.output.display(), records = averaged.len(), "Wrote averages");
    println!(
        "  {} records → {} configurations",
        records.len(),
        averaged.len()
    );
    print_summary(&averaged);
    println!("\n✓ Averages written to: {}", args.output.display());

    Ok(())
}
