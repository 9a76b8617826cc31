//! Averaging of result records across replicates.

use crate::config::Config;
use crate::result::{CovResult, ResultRecord};
use simmlst_cov::MeanVar;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{info, warn};

/// Mean and variance of Ks and of every Ct lag over the records of one
/// configuration. NaN values do not contribute.
#[derive(Debug, Clone, Default)]
pub struct Averager {
    ks: MeanVar,
    ct: Vec<MeanVar>,
    skipped: usize,
}

impl Averager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, result: &CovResult) {
        if result.ks.is_nan() {
            self.skipped += 1;
        } else {
            self.ks.increment(result.ks);
        }

        if self.ct.len() < result.ct.len() {
            self.ct.resize(result.ct.len(), MeanVar::new());
        }
        for (acc, &value) in self.ct.iter_mut().zip(&result.ct) {
            if value.is_nan() {
                self.skipped += 1;
            } else {
                acc.increment(value);
            }
        }
    }

    /// Number of NaN values left out so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `ks_n` and `ct_n` count contributing records, not sites.
    pub fn result(&self) -> CovResult {
        CovResult {
            ks: self.ks.mean(),
            ks_n: self.ks.n(),
            ks_var: self.ks.variance(),
            ct: self.ct.iter().map(MeanVar::mean).collect(),
            ct_n: self.ct.iter().map(MeanVar::n).collect(),
            ct_var: self.ct.iter().map(MeanVar::variance).collect(),
        }
    }
}

/// One averaged record per distinct configuration, in order of first
/// appearance.
pub fn average(records: &[ResultRecord]) -> Vec<ResultRecord> {
    let mut index: HashMap<Config, usize> = HashMap::new();
    let mut groups: Vec<(Config, Averager)> = Vec::new();

    for record in records {
        let slot = match index.entry(record.config) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                groups.push((record.config, Averager::new()));
                *e.insert(groups.len() - 1)
            }
        };
        groups[slot].1.add(&record.cov);
    }

    let skipped: usize = groups.iter().map(|(_, avg)| avg.skipped()).sum();
    if skipped > 0 {
        warn!(skipped, "Skipped undefined values while averaging");
    }
    info!(
        records = records.len(),
        configs = groups.len(),
        "Averaged replicates"
    );

    groups
        .into_iter()
        .map(|(config, avg)| ResultRecord {
            config,
            cov: avg.result(),
        })
        .collect()
}
