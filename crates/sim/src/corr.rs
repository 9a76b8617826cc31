//! Per-pair and site-by-site covariance, averaged over genes and replicates.
//!
//! Each gene of each replicate is one sample of every statistic; the
//! reducer keeps a mean and variance per statistic and lag.

use crate::config::Config;
use crate::errors::SimError;
use crate::pipeline::{Pipeline, ReplicateAnalysis};
use crate::simulator::AlignmentSource;
use crate::xmfa::GeneGroup;
use serde::{Deserialize, Serialize};
use simmlst_cov::{calc_cm, calc_cs, MeanCov, MeanVar};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Statistics reported by [`CorrAnalysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CorrKind {
    /// Per-pair circular covariance, averaged over pairs.
    Cm,
    /// `Cm / Ks`.
    Cm2,
    /// Mean per-pair divergence.
    Ks,
    /// Variance of the per-pair divergence.
    Vd,
    /// Mean over sites of the per-site covariance.
    Cs,
    /// Covariance over sites of the per-site divergences.
    Cr,
    /// Probability that both sites of a pair differ.
    P2,
}

impl fmt::Display for CorrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cm => "Cm",
            Self::Cm2 => "Cm2",
            Self::Ks => "Ks",
            Self::Vd => "Vd",
            Self::Cs => "Cs",
            Self::Cr => "Cr",
            Self::P2 => "P2",
        };
        f.write_str(name)
    }
}

/// Mean and variance of every statistic at every lag. NaN samples do not
/// contribute.
#[derive(Debug, Clone, Default)]
pub struct CorrSummary {
    series: BTreeMap<CorrKind, Vec<MeanVar>>,
    skipped: usize,
}

impl CorrSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one sample per lag.
    pub fn add(&mut self, kind: CorrKind, values: &[f64]) {
        let accs = self.series.entry(kind).or_default();
        if accs.len() < values.len() {
            accs.resize(values.len(), MeanVar::new());
        }
        for (acc, &value) in accs.iter_mut().zip(values) {
            if value.is_nan() {
                self.skipped += 1;
            } else {
                acc.increment(value);
            }
        }
    }

    /// Compute every statistic of one aligned gene and add it.
    pub fn add_gene(&mut self, gene: &[Vec<u8>], max_lag: usize, by_row: bool) -> Result<(), SimError> {
        let cm = calc_cm(gene, max_lag)?;
        self.add(CorrKind::Cm, &cm.cm);
        self.add(CorrKind::Cm2, &cm.cm2);
        self.add(CorrKind::Ks, &[cm.ks]);
        self.add(CorrKind::Vd, &[cm.vd]);

        if by_row {
            let rows = calc_cs(gene, max_lag)?;
            let values = |f: fn(&MeanCov) -> f64| rows.iter().map(f).collect::<Vec<_>>();
            self.add(CorrKind::Cs, &values(MeanCov::within));
            self.add(CorrKind::Cr, &values(MeanCov::between));
            self.add(CorrKind::P2, &values(MeanCov::mean_xy));
        }
        Ok(())
    }

    pub fn append(&mut self, other: &CorrSummary) {
        for (kind, theirs) in &other.series {
            let ours = self.series.entry(*kind).or_default();
            if ours.len() < theirs.len() {
                ours.resize(theirs.len(), MeanVar::new());
            }
            for (acc, other) in ours.iter_mut().zip(theirs) {
                acc.append(other);
            }
        }
        self.skipped += other.skipped;
    }

    /// Number of NaN samples left out so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn get(&self, kind: CorrKind) -> Option<&[MeanVar]> {
        self.series.get(&kind).map(Vec::as_slice)
    }

    /// One series per statistic, in the order of [`CorrKind`].
    pub fn series(&self) -> Vec<CorrSeries> {
        self.series
            .iter()
            .map(|(kind, accs)| CorrSeries {
                kind: *kind,
                mean: accs.iter().map(MeanVar::mean).collect(),
                var: accs.iter().map(MeanVar::variance).collect(),
                n: accs.iter().map(MeanVar::n).collect(),
            })
            .collect()
    }
}

/// Averaged values of one statistic, indexed by lag. Scalars have one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrSeries {
    pub kind: CorrKind,
    #[serde(with = "crate::result::nullable_vec")]
    pub mean: Vec<f64>,
    #[serde(with = "crate::result::nullable_vec")]
    pub var: Vec<f64>,
    pub n: Vec<usize>,
}

/// One output row of a correlation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrRecord {
    pub config: Config,
    pub series: Vec<CorrSeries>,
}

/// Cm, Cm2, Ks and Vd of every gene, plus Cs, Cr and P2 with `by_row`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrAnalysis {
    pub max_lag: usize,
    pub by_row: bool,
}

impl CorrAnalysis {
    pub fn new(max_lag: usize, by_row: bool) -> Self {
        Self { max_lag, by_row }
    }
}

impl ReplicateAnalysis for CorrAnalysis {
    type Output = CorrSummary;

    fn analyze(&self, config: &Config, groups: &[GeneGroup]) -> Result<CorrSummary, SimError> {
        let mut summary = CorrSummary::new();
        for gene in groups {
            summary.add_gene(gene, self.max_lag, self.by_row)?;
        }
        debug!(config = %config, genes = groups.len(), "Replicate correlated");
        Ok(summary)
    }

    fn merge(&self, into: &mut CorrSummary, other: CorrSummary) -> Result<(), SimError> {
        into.append(&other);
        Ok(())
    }
}

impl<S: AlignmentSource> Pipeline<S> {
    /// Simulate every configuration `replicates` times and average the
    /// statistics of `analysis` over all genes of all replicates.
    pub fn correlate<F>(
        &mut self,
        configs: &[Config],
        analysis: &CorrAnalysis,
        on_replicate: F,
    ) -> Result<Vec<CorrRecord>, SimError>
    where
        F: FnMut(&Config),
    {
        let merged = self.reduce_with(analysis, configs, on_replicate)?;
        let skipped: usize = merged.iter().map(|(_, s)| s.skipped()).sum();
        if skipped > 0 {
            warn!(skipped, "Skipped undefined values while averaging");
        }
        Ok(merged
            .into_iter()
            .map(|(config, summary)| CorrRecord {
                config,
                series: summary.series(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use simmlst_cov::CtAlgorithm;

    fn config(theta: f64) -> Config {
        Config {
            n: 2,
            num_gene: 2,
            len_gene: 4,
            theta,
            rho: 0.0,
            delta: 1,
        }
    }

    fn settings(replicates: usize) -> PipelineConfig {
        PipelineConfig {
            max_lag: 4,
            algorithm: CtAlgorithm::Fft,
            bias_corrected: false,
            circular: false,
            workers: 2,
            channel_capacity: 2,
            replicates,
        }
    }

    fn genes() -> Vec<GeneGroup> {
        vec![
            vec![b"AAAA".to_vec(), b"CACA".to_vec()],
            vec![b"AAAA".to_vec(), b"CAAA".to_vec()],
        ]
    }

    fn series<'a>(record: &'a CorrRecord, kind: CorrKind) -> &'a CorrSeries {
        record
            .series
            .iter()
            .find(|s| s.kind == kind)
            .expect("missing series")
    }

    #[test]
    fn test_add_skips_nan_and_grows() {
        let mut summary = CorrSummary::new();
        summary.add(CorrKind::Cm, &[0.5, f64::NAN]);
        summary.add(CorrKind::Cm, &[0.7, 0.1, 0.3]);
        assert_eq!(summary.skipped(), 1);

        let cm = summary.get(CorrKind::Cm).unwrap();
        assert_eq!(cm.len(), 3);
        assert_eq!(cm.iter().map(MeanVar::n).collect::<Vec<_>>(), vec![2, 1, 1]);
        assert!((cm[0].mean() - 0.6).abs() < 1e-12);
        assert!(summary.get(CorrKind::Cs).is_none());
    }

    #[test]
    fn test_gene_statistics() {
        let mut summary = CorrSummary::new();
        summary.add_gene(&genes()[0], 2, false).unwrap();
        let cm = summary.get(CorrKind::Cm).unwrap();
        assert_eq!(cm[0].mean(), 0.25);
        assert_eq!(cm[1].mean(), -0.25);
        assert_eq!(summary.get(CorrKind::Ks).unwrap()[0].mean(), 0.5);
        assert_eq!(summary.get(CorrKind::Vd).unwrap()[0].mean(), 0.0);
        assert!(summary.get(CorrKind::P2).is_none());

        summary.add_gene(&genes()[0], 2, true).unwrap();
        let p2 = summary.get(CorrKind::P2).unwrap();
        assert_eq!(p2[0].mean(), 0.5);
        assert!((summary.get(CorrKind::Cr).unwrap()[0].mean() - 0.25).abs() < 1e-12);
        assert_eq!(summary.get(CorrKind::Cs).unwrap()[0].mean(), 0.0);
    }

    #[test]
    fn test_append_matches_sequential_adds() {
        let mut sequential = CorrSummary::new();
        let mut a = CorrSummary::new();
        let mut b = CorrSummary::new();
        for (k, gene) in genes().iter().enumerate() {
            sequential.add_gene(gene, 3, true).unwrap();
            if k == 0 {
                a.add_gene(gene, 3, true).unwrap();
            } else {
                b.add_gene(gene, 3, true).unwrap();
            }
        }
        a.append(&b);

        let left = sequential.series();
        let right = a.series();
        assert_eq!(left.len(), 7);
        for (x, y) in left.iter().zip(&right) {
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.n, y.n);
            for (m, w) in x.mean.iter().zip(&y.mean) {
                assert!((m - w).abs() < 1e-12 || (m.is_nan() && w.is_nan()));
            }
        }
    }

    #[test]
    fn test_correlate_averages_genes_of_all_replicates() {
        let source = |_: &Config| -> Result<Vec<GeneGroup>, SimError> { Ok(genes()) };
        let mut pipeline = Pipeline::new(settings(3), source).unwrap();
        let mut seen = 0;
        let records = pipeline
            .correlate(&[config(1.0)], &CorrAnalysis::new(4, false), |_| seen += 1)
            .unwrap();
        assert_eq!(seen, 3);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        let kinds: Vec<CorrKind> = record.series.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![CorrKind::Cm, CorrKind::Cm2, CorrKind::Ks, CorrKind::Vd]);

        // divergences 0.5 and 0.25, three times each
        let ks = series(record, CorrKind::Ks);
        assert_eq!(ks.n, vec![6]);
        assert!((ks.mean[0] - 0.375).abs() < 1e-12);
        assert!((ks.var[0] - 0.01875).abs() < 1e-12);

        let cm = series(record, CorrKind::Cm);
        assert_eq!(cm.n, vec![6; 4]);
    }

    #[test]
    fn test_record_serializes_undefined_as_null() {
        let mut summary = CorrSummary::new();
        summary.add_gene(&[b"ACGT".to_vec(), b"ACGT".to_vec()], 2, false).unwrap();
        let record = CorrRecord {
            config: config(1.0),
            series: summary.series(),
        };
        let json = serde_json::to_string(&record).unwrap();
        // Cm2 is 0 / 0 for identical sequences
        assert!(json.contains(r#""kind":"Cm2","mean":[null,null]"#));
        let back: CorrRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.series.len(), 4);
        assert!(back.series[1].mean[0].is_nan());
    }
}
