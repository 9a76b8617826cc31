use anyhow::{Context, Result};
use serde::Deserialize;
use simmlst_sim::{Config, CorrAnalysis, Pipeline, PipelineConfig, SimMlst};
use tracing::info;

use crate::args::CorrArgs;
use crate::defaults::CHANNEL_SLOTS_PER_WORKER;
use crate::printing::{print_corr_settings, print_corr_summary};
use crate::utils::{progress_bar, read_json, write_json};

/// A configuration file holds one configuration or a list of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigInput {
    One(Config),
    Many(Vec<Config>),
}

impl ConfigInput {
    fn into_vec(self) -> Vec<Config> {
        match self {
            Self::One(config) => vec![config],
            Self::Many(configs) => configs,
        }
    }
}

pub fn run_corr(args: &CorrArgs, threads: Option<usize>) -> Result<()> {
    println!("🧬 simmlst - Averaging per-pair correlations");
    println!("============================================");

    let configs = read_json::<ConfigInput>(&args.input)?.into_vec();
    let settings = pipeline_config(args, threads);
    let analysis = CorrAnalysis::new(args.max_lag, args.by_row);
    print_corr_settings(&settings, &analysis, configs.len());
    info!(
        input = %args.input.display(),
        configs = configs.len(),
        max_lag = analysis.max_lag,
        by_row = analysis.by_row,
        workers = settings.workers,
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
        .correlate(&configs, &analysis, |_| {
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        })
        .context("Simulation batch failed")?;
    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    write_json(&args.output, &records)?;
    info!(output = %args.output.display(), records = records.len(), "Wrote correlations");
    print_corr_summary(&records);
    println!("\n✓ Correlations written to: {}", args.output.display());

    Ok(())
}

fn pipeline_config(args: &CorrArgs, threads: Option<usize>) -> PipelineConfig {
    let defaults = PipelineConfig::default();
    let workers = threads.unwrap_or(defaults.workers);
    PipelineConfig {
        max_lag: args.max_lag,
        workers,
        channel_capacity: workers * CHANNEL_SLOTS_PER_WORKER,
        replicates: args.replicates,
        ..defaults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_config_or_list() {
        let one = r#"{"N": 4, "NumGene": 2, "LenGene": 10, "Theta": 1.0, "Rho": 0.0, "Delta": 2}"#;
        let configs = serde_json::from_str::<ConfigInput>(one).unwrap().into_vec();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].num_gene, 2);

        let many = format!("[{one}, {one}]");
        let configs = serde_json::from_str::<ConfigInput>(&many).unwrap().into_vec();
        assert_eq!(configs.len(), 2);
    }

    #[test]
    fn test_threads_set_workers() {
        let args = CorrArgs {
            input: "cfg.json".into(),
            output: "out.json".into(),
            max_lag: 30,
            replicates: 5,
            by_row: false,
            simulator: "simmlst".into(),
            temp_dir: None,
            progress: false,
        };
        let settings = pipeline_config(&args, Some(2));
        assert_eq!(settings.workers, 2);
        assert_eq!(settings.channel_capacity, 4);
        assert_eq!(settings.max_lag, 30);
        assert_eq!(settings.replicates, 5);
        assert!(settings.validate().is_ok());
    }
}
