mod args;
mod commands;
pub mod defaults;
mod printing;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use args::{AverageArgs, CalcArgs, CorrArgs, GridArgs};
use commands::{average, calc, corr, grid};

/// simmlst: Ks and Ct of simulated bacterial populations
///
/// Runs the simmlst coalescent simulator over batches of population
/// parameters and reports pooled divergence (Ks) and the correlation of
/// substitutions as a function of distance (Ct).
#[derive(Parser, Debug)]
#[command(name = "simmlst")]
#[command(author, version, about = "Ks and Ct of simulated populations", long_about = None)]
struct Cli {
    /// Number of threads to use for parallel processing
    ///
    /// If not specified, defaults to the number of logical CPUs.
    #[arg(short = 't', long, global = true)]
    threads: Option<usize>,

    /// Log debug messages (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Simulate every configuration and compute Ks and Ct.
    ///
    /// Replicates of the same configuration are merged before the
    /// statistics are computed.
    Calc(Box<CalcArgs>),

    /// Average per-pair and by-site correlations over genes and replicates.
    ///
    /// Reports Cm, Cm2, Ks and Vd, plus Cs, Cr and P2 with --by-row.
    Corr(Box<CorrArgs>),

    /// Average result records of the same configuration.
    ///
    /// Undefined (null) values are skipped.
    Average(AverageArgs),

    /// Expand a parameter grid into a list of configurations.
    Grid(GridArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::init_tracing(cli.verbose);

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()?;
    }

    match cli.command {
        Commands::Calc(args) => {
            calc::run_calc(&args, cli.threads)?;
        }
        Commands::Corr(args) => {
            corr::run_corr(&args, cli.threads)?;
        }
        Commands::Average(args) => {
            average::run_average(&args)?;
        }
        Commands::Grid(args) => {
            grid::run_grid(&args)?;
        }
    }

    Ok(())
}
