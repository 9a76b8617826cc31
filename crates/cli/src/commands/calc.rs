use anyhow::{Context, Result};
use simmlst_sim::{Config, Pipeline, PipelineConfig, SimMlst};
use tracing::info;

use crate::args::CalcArgs;
use crate::defaults::CHANNEL_SLOTS_PER_WORKER;
use crate::printing::{print_settings, print_summary};
use crate::utils::{progress_bar, read_json, write_json};

pub fn run_calc(args: &CalcArgs, threads: Option<usize>) -> Result<()> {
    println!("🧬 simmlst - Computing Ks and Ct");
    println!("============================================");

    let configs: Vec<Config> = read_json(&args.input)?;
    let settings = pipeline_config(args, threads);
    print_settings(&settings, configs.len());
    info!(
        input = %args.input.display(),
        configs = configs.len(),
        max_lag = settings.max_lag,
        algorithm = %settings.algorithm,
        workers = settings.workers,
        channel_capacity = settings.channel_capacity,
        replicates = settings.replicates,
        "Read configurations"
    );

    let mut simulator = SimMlst::new(&args.simulator);
    if let Some(dir) = &args.temp_dir {
        simulator = simulator.with_temp_dir(dir);
    }
    let mut pipeline = Pipeline::new(settings, simulator).context("Invalid settings")?;

    let pb = progress_bar(args.progress, (configs.len() * args.replicates) as u64)?;

    let records = pipeline
        .run_with_progress(&configs, |_| {
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        })
        .context("Simulation batch failed")?;

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    write_json(&args.output, &records)?;
    info!(output = %args.output.display(), records = records.len(), "Wrote results");
    print_summary(&records);
    println!("\n✓ Results written to: {}", args.output.display());

    Ok(())
}

fn pipeline_config(args: &CalcArgs, threads: Option<usize>) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    let workers = threads.unwrap_or(defaults.workers);
    PipelineConfig {
        max_lag: args.max_lag,
        algorithm: args.algorithm,
        bias_corrected: args.bias_corrected,
        circular: args.circular,
        workers,
        channel_capacity: args
            .channel_capacity
            .unwrap_or(workers * CHANNEL_SLOTS_PER_WORKER),
        replicates: args.replicates,
    }
}
