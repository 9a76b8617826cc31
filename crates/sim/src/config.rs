//! Population parameters and run settings.

use crate::errors::SimError;
use serde::{Deserialize, Serialize};
use simmlst_cov::{CovError, CtAlgorithm, CtShape};
use std::fmt;
use std::hash::{Hash, Hasher};

/// One simulated population: the key under which replicates are merged.
///
/// Equality is structural over all fields. Rates compare by bit pattern so
/// the key can live in a hash map; configurations read from the same file
/// compare equal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    /// Population size.
    #[serde(alias = "n")]
    pub n: usize,
    /// Number of genes per genome.
    #[serde(alias = "num_gene")]
    pub num_gene: usize,
    /// Length of every gene in sites.
    #[serde(alias = "len_gene")]
    pub len_gene: usize,
    /// Population mutation rate.
    #[serde(alias = "theta")]
    pub theta: f64,
    /// Population recombination rate.
    #[serde(alias = "rho")]
    pub rho: f64,
    /// Mean recombination tract length.
    #[serde(alias = "delta")]
    pub delta: usize,
}

impl Config {
    /// Command line arguments understood by the `simmlst` simulator.
    pub fn simulator_args(&self) -> Vec<String> {
        let blocks = vec![self.len_gene.to_string(); self.num_gene].join(",");
        vec![
            "-N".to_string(),
            self.n.to_string(),
            "-D".to_string(),
            self.delta.to_string(),
            "-T".to_string(),
            format!("{:.6}", self.theta),
            "-R".to_string(),
            format!("{:.6}", self.rho),
            "-B".to_string(),
            blocks,
        ]
    }

    fn key(&self) -> (usize, usize, usize, u64, u64, usize) {
        (
            self.n,
            self.num_gene,
            self.len_gene,
            self.theta.to_bits(),
            self.rho.to_bits(),
            self.delta,
        )
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Config {}

impl Hash for Config {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} genes={}x{} theta={} rho={} delta={}",
            self.n, self.num_gene, self.len_gene, self.theta, self.rho, self.delta
        )
    }
}

/// Value lists whose Cartesian product is a batch of configurations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParameterGrid {
    pub sizes: Vec<usize>,
    pub num_genes: Vec<usize>,
    pub len_genes: Vec<usize>,
    pub thetas: Vec<f64>,
    pub rhos: Vec<f64>,
    pub deltas: Vec<usize>,
}

impl ParameterGrid {
    /// Number of distinct configurations in the grid.
    pub fn len(&self) -> usize {
        self.sizes.len()
            * self.num_genes.len()
            * self.len_genes.len()
            * self.thetas.len()
            * self.rhos.len()
            * self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every configuration of the grid, each repeated `replicates` times.
    pub fn expand(&self, replicates: usize) -> Vec<Config> {
        let mut configs = Vec::with_capacity(self.len() * replicates);
        for &n in &self.sizes {
            for &num_gene in &self.num_genes {
                for &len_gene in &self.len_genes {
                    for &theta in &self.thetas {
                        for &rho in &self.rhos {
                            for &delta in &self.deltas {
                                let config = Config {
                                    n,
                                    num_gene,
                                    len_gene,
                                    theta,
                                    rho,
                                    delta,
                                };
                                configs.extend(std::iter::repeat(config).take(replicates));
                            }
                        }
                    }
                }
            }
        }
        configs
    }
}

/// Settings of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Length of the Ct array.
    pub max_lag: usize,
    /// Ct accumulator implementation.
    pub algorithm: CtAlgorithm,
    /// Divide covariances by `n - 1` instead of `n`.
    pub bias_corrected: bool,
    /// Let lags wrap around the end of a gene.
    pub circular: bool,
    /// Number of worker threads.
    pub workers: usize,
    /// Capacity of the work and result channels.
    pub channel_capacity: usize,
    /// Replicates simulated for every configuration of the input.
    pub replicates: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            max_lag: 1000,
            algorithm: CtAlgorithm::Fft,
            bias_corrected: false,
            circular: false,
            workers,
            channel_capacity: 2 * workers,
            replicates: 1,
        }
    }
}

impl PipelineConfig {
    pub fn shape(&self) -> CtShape {
        CtShape {
            algorithm: self.algorithm,
            max_lag: self.max_lag,
            bias_corrected: self.bias_corrected,
            circular: self.circular,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.max_lag == 0 {
            return Err(CovError::InvalidMaxLag(self.max_lag).into());
        }
        if self.workers == 0 {
            return Err(SimError::InvalidParameter(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.replicates == 0 {
            return Err(SimError::InvalidParameter(
                "replicates must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
