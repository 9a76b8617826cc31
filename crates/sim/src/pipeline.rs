//! Scatter/gather driver: simulate many replicates, merge them per
//! configuration.
//!
//! ```text
//!  scatterer ──work──▶ worker 0 ─┐
//!            (bounded) worker 1 ─┼──results──▶ reducer (calling thread)
//!                      worker k ─┘ (bounded)
//! ```
//!
//! Every worker turns a replicate into a fresh partial result (by default a
//! [`Calculators`] bundle) and hands it over to the reducer, which is the
//! only owner of the merged results. The first error or panic stops the
//! whole batch.

use crate::config::{Config, PipelineConfig};
use crate::errors::SimError;
use crate::result::ResultRecord;
use crate::simulator::AlignmentSource;
use crate::xmfa::GeneGroup;
use crossbeam_channel::{bounded, Receiver, Sender};
use simmlst_cov::{pair_count, Calculators, CtShape, FftPlans};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

type Outcome<T> = Result<(Config, T), SimError>;

/// What a worker computes from one replicate, and how the reducer merges two
/// results of the same configuration.
pub trait ReplicateAnalysis: Sync {
    type Output: Send;

    fn analyze(&self, config: &Config, groups: &[GeneGroup]) -> Result<Self::Output, SimError>;

    fn merge(&self, into: &mut Self::Output, other: Self::Output) -> Result<(), SimError>;
}

/// Pooled Ks and Ct of every pair of every gene.
#[derive(Debug, Clone)]
pub struct CovAnalysis {
    shape: CtShape,
    plans: FftPlans,
}

impl CovAnalysis {
    pub fn new(shape: CtShape, plans: FftPlans) -> Self {
        Self { shape, plans }
    }
}

impl ReplicateAnalysis for CovAnalysis {
    type Output = Calculators;

    fn analyze(&self, config: &Config, groups: &[GeneGroup]) -> Result<Calculators, SimError> {
        let bundle = Calculators::from_groups_with(self.shape, &self.plans, groups)?;
        debug!(
            config = %config,
            genes = groups.len(),
            pairs = groups.iter().map(|g| pair_count(g.len())).sum::<usize>(),
            "Replicate accumulated"
        );
        Ok(bundle)
    }

    fn merge(&self, into: &mut Calculators, other: Calculators) -> Result<(), SimError> {
        into.append(&other)?;
        Ok(())
    }
}

/// Where a pipeline run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Scattering,
    Reducing,
    Done,
}

/// Drives batches of configurations through an [`AlignmentSource`].
#[derive(Debug)]
pub struct Pipeline<S> {
    config: PipelineConfig,
    source: S,
    plans: FftPlans,
    state: PipelineState,
}

impl<S: AlignmentSource> Pipeline<S> {
    pub fn new(config: PipelineConfig, source: S) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            plans: FftPlans::new(),
            state: PipelineState::Idle,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// FFT plans shared by every worker of every run.
    pub fn plans(&self) -> &FftPlans {
        &self.plans
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Simulate every configuration `replicates` times and return one record
    /// per distinct configuration, in order of first arrival.
    pub fn run(&mut self, configs: &[Config]) -> Result<Vec<ResultRecord>, SimError> {
        self.run_with_progress(configs, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_replicate` on the calling thread
    /// each time a replicate reaches the reducer.
    pub fn run_with_progress<F>(
        &mut self,
        configs: &[Config],
        on_replicate: F,
    ) -> Result<Vec<ResultRecord>, SimError>
    where
        F: FnMut(&Config),
    {
        let merged = self.reduce(configs, on_replicate)?;
        Ok(merged
            .iter()
            .map(|(config, bundle)| ResultRecord::new(*config, bundle))
            .collect())
    }

    /// Scatter and gather without rendering: the merged bundle of every
    /// distinct configuration, in order of first arrival.
    pub fn reduce<F>(
        &mut self,
        configs: &[Config],
        on_replicate: F,
    ) -> Result<Vec<(Config, Calculators)>, SimError>
    where
        F: FnMut(&Config),
    {
        let shape = self.config.shape();
        debug!(max_lag = shape.max_lag, algorithm = %shape.algorithm, "Pooling Ks and Ct");
        let analysis = CovAnalysis::new(shape, self.plans.clone());
        self.reduce_with(&analysis, configs, on_replicate)
    }

    /// Scatter and gather with any per-replicate analysis.
    pub fn reduce_with<A, F>(
        &mut self,
        analysis: &A,
        configs: &[Config],
        mut on_replicate: F,
    ) -> Result<Vec<(Config, A::Output)>, SimError>
    where
        A: ReplicateAnalysis,
        F: FnMut(&Config),
    {
        let replicates = self.config.replicates;
        let workers = self.config.workers;
        let capacity = self.config.channel_capacity.max(1);
        let start = Instant::now();

        info!(
            configs = configs.len(),
            replicates,
            workers,
            "Starting batch"
        );

        self.state = PipelineState::Scattering;

        let (work_tx, work_rx) = bounded::<Config>(capacity);
        let (result_tx, result_rx) = bounded::<Outcome<A::Output>>(capacity);
        let abort = AtomicBool::new(false);
        let abort = &abort;
        let source = &self.source;

        let outcome = thread::scope(|scope| {
            let scatterer = scope.spawn(move || scatter(configs, replicates, work_tx, abort));
            let handles: Vec<_> = (0..workers)
                .map(|id| {
                    let jobs = work_rx.clone();
                    let results = result_tx.clone();
                    scope.spawn(move || work(id, source, analysis, jobs, results, abort))
                })
                .collect();
            // Only workers may hold these, so the results channel closes
            // once the last worker is done.
            drop(work_rx);
            drop(result_tx);

            self.state = PipelineState::Reducing;
            let reduced = gather(analysis, &result_rx, &mut on_replicate);
            if reduced.is_err() {
                abort.store(true, Ordering::Relaxed);
            }
            drop(result_rx);

            let mut panicked = scatterer.join().is_err();
            for handle in handles {
                panicked |= handle.join().is_err();
            }
            match reduced {
                Err(e) => Err(e),
                Ok(_) if panicked => Err(SimError::WorkerPanic),
                Ok(merged) => Ok(merged),
            }
        });

        self.state = PipelineState::Done;
        match &outcome {
            Ok(merged) => info!(
                configs = merged.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Batch complete"
            ),
            Err(e) => warn!(error = %e, "Batch aborted"),
        }
        outcome
    }
}

/// Raises the abort flag when the owning thread unwinds.
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.store(true, Ordering::Relaxed);
        }
    }
}

fn scatter(configs: &[Config], replicates: usize, jobs: Sender<Config>, abort: &AtomicBool) {
    let _guard = AbortOnPanic(abort);
    for config in configs {
        for _ in 0..replicates {
            if abort.load(Ordering::Relaxed) || jobs.send(*config).is_err() {
                return;
            }
        }
    }
}

fn work<S: AlignmentSource, A: ReplicateAnalysis>(
    id: usize,
    source: &S,
    analysis: &A,
    jobs: Receiver<Config>,
    results: Sender<Outcome<A::Output>>,
    abort: &AtomicBool,
) {
    let _guard = AbortOnPanic(abort);
    for config in jobs.iter() {
        if abort.load(Ordering::Relaxed) {
            break;
        }
        let outcome = source
            .alignments(&config)
            .and_then(|groups| analysis.analyze(&config, &groups))
            .map(|output| (config, output));
        let failed = outcome.is_err();
        if results.send(outcome).is_err() || failed {
            break;
        }
    }
    debug!(worker = id, "Worker finished");
}

fn gather<A: ReplicateAnalysis, F: FnMut(&Config)>(
    analysis: &A,
    results: &Receiver<Outcome<A::Output>>,
    on_replicate: &mut F,
) -> Result<Vec<(Config, A::Output)>, SimError> {
    let mut index: HashMap<Config, usize> = HashMap::new();
    let mut merged: Vec<(Config, A::Output)> = Vec::new();

    for outcome in results.iter() {
        let (config, output) = outcome?;
        match index.entry(config) {
            Entry::Occupied(slot) => analysis.merge(&mut merged[*slot.get()].1, output)?,
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push((config, output));
            }
        }
        on_replicate(&config);
    }
    Ok(merged)
}
