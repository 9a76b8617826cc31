//! End-to-end runs of the scatter/gather pipeline through the facade.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simmlst::prelude::*;

/// Helper producing the same alignment for a configuration every time
fn deterministic_source(config: &Config) -> Result<Vec<GeneGroup>, SimError> {
    let seed = config.n as u64 * 1000 + config.delta as u64;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..config.num_gene)
        .map(|_| {
            (0..config.n)
                .map(|_| {
                    (0..config.len_gene)
                        .map(|_| if rng.gen_bool(0.2) { b'T' } else { b'A' })
                        .collect()
                })
                .collect()
        })
        .collect())
}

fn configs() -> Vec<Config> {
    vec![
        Config {
            n: 5,
            num_gene: 2,
            len_gene: 40,
            theta: 1.0,
            rho: 0.1,
            delta: 10,
        },
        Config {
            n: 4,
            num_gene: 3,
            len_gene: 30,
            theta: 2.0,
            rho: 0.2,
            delta: 20,
        },
    ]
}

fn settings(algorithm: CtAlgorithm, workers: usize) -> PipelineConfig {
    PipelineConfig {
        max_lag: 5,
        algorithm,
        workers,
        channel_capacity: 2,
        replicates: 3,
        ..PipelineConfig::default()
    }
}

#[test]
fn test_two_configurations_three_replicates() {
    let mut pipeline = Pipeline::new(settings(CtAlgorithm::Fft, 4), deterministic_source).unwrap();
    let records = pipeline.run(&configs()).unwrap();
    assert_eq!(pipeline.state(), PipelineState::Done);
    assert_eq!(records.len(), 2);

    for record in &records {
        let config = record.config;
        let groups = deterministic_source(&config).unwrap();
        let single = Calculators::from_groups(settings(CtAlgorithm::Fft, 1).shape(), &groups).unwrap();
        let mut expected = Calculators::new(single.shape());
        for _ in 0..3 {
            expected.append(&single).unwrap();
        }

        let pairs = config.n * (config.n - 1) / 2;
        assert_eq!(record.cov.ks_n, 3 * config.num_gene * pairs * config.len_gene);
        assert!((record.cov.ks - expected.ks().mean()).abs() < 1e-12);
        assert_eq!(record.cov.ct.len(), 5);
        assert_eq!(record.cov.ct_n, expected.ct().counts());
        for (got, want) in record.cov.ct.iter().zip(expected.ct().results()) {
            assert!((got - want).abs() < 1e-9);
        }
    }
}

#[test]
fn test_direct_and_fft_pipelines_agree() {
    let direct = Pipeline::new(settings(CtAlgorithm::Direct, 2), deterministic_source)
        .unwrap()
        .run(&configs())
        .unwrap();
    let fft = Pipeline::new(settings(CtAlgorithm::Fft, 3), deterministic_source)
        .unwrap()
        .run(&configs())
        .unwrap();

    for a in &direct {
        let b = fft.iter().find(|r| r.config == a.config).unwrap();
        assert_eq!(a.cov.ct_n, b.cov.ct_n);
        for (x, y) in a.cov.ct.iter().zip(&b.cov.ct) {
            assert!((x - y).abs() < 1e-9);
        }
    }
}

#[test]
fn test_grid_to_averaged_records() {
    let grid = ParameterGrid {
        sizes: vec![3, 4],
        num_genes: vec![1],
        len_genes: vec![25],
        thetas: vec![1.0],
        rhos: vec![0.0],
        deltas: vec![5],
    };
    let batch = grid.expand(2);
    assert_eq!(batch.len(), 4);

    let mut pipeline = Pipeline::new(
        PipelineConfig {
            replicates: 1,
            ..settings(CtAlgorithm::Fft, 2)
        },
        deterministic_source,
    )
    .unwrap();
    let records = pipeline.run(&batch).unwrap();
    assert_eq!(records.len(), 2);

    let json = serde_json::to_string(&records).unwrap();
    let back: Vec<ResultRecord> = serde_json::from_str(&json).unwrap();
    let averaged = average(&back);
    assert_eq!(averaged.len(), 2);
    for (avg, record) in averaged.iter().zip(&records) {
        assert_eq!(avg.config, record.config);
        assert_eq!(avg.cov.ks_n, 1);
        assert!((avg.cov.ks - record.cov.ks).abs() < 1e-12);
    }
}
