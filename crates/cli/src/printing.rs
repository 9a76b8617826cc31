use simmlst_sim::{CorrAnalysis, CorrKind, CorrRecord, PipelineConfig, ResultRecord};

pub fn print_settings(settings: &PipelineConfig, configs: usize) {
    println!("\n📋 Batch");
    println!("  • Configurations: {configs}");
    println!("  • Replicates: {} [-r, --replicates]", settings.replicates);
    println!("  • Threads: {} [-t, --threads]", settings.workers);

    println!("\n📈 Ct");
    println!("  • Max lag: {} [-m, --max-lag]", settings.max_lag);
    println!("  • Algorithm: {} [-a, --algorithm]", settings.algorithm);
    println!(
        "  • Lags: {} [--circular]",
        if settings.circular { "circular" } else { "linear" }
    );
    println!(
        "  • Denominator: {} [--bias-corrected]",
        if settings.bias_corrected { "n - 1" } else { "n" }
    );
    println!();
}

pub fn print_summary(records: &[ResultRecord]) {
    println!("\n📊 Results");
    for record in records {
        let cov = &record.cov;
        let ct1 = cov.ct.get(1).copied().unwrap_or(f64::NAN);
        println!(
            "  • {}: Ks = {:.6} (n = {}), C(1) = {:.6}",
            record.config, cov.ks, cov.ks_n, ct1
        );
    }
}

pub fn print_corr_settings(settings: &PipelineConfig, analysis: &CorrAnalysis, configs: usize) {
    println!("\n📋 Batch");
    println!("  • Configurations: {configs}");
    println!("  • Replicates: {} [-r, --replicates]", settings.replicates);
    println!("  • Threads: {} [-t, --threads]", settings.workers);

    println!("\n📈 Correlations");
    println!("  • Max lag: {} [-m, --max-lag]", analysis.max_lag);
    println!(
        "  • Statistics: {} [--by-row]",
        if analysis.by_row { "Cm, Cm2, Ks, Vd, Cs, Cr, P2" } else { "Cm, Cm2, Ks, Vd" }
    );
    println!();
}

pub fn print_corr_summary(records: &[CorrRecord]) {
    println!("\n📊 Results");
    for record in records {
        let first = |kind: CorrKind, lag: usize| {
            record
                .series
                .iter()
                .find(|s| s.kind == kind)
                .and_then(|s| s.mean.get(lag).copied())
                .unwrap_or(f64::NAN)
        };
        println!(
            "  • {}: Ks = {:.6}, Cm(1) = {:.6}",
            record.config,
            first(CorrKind::Ks, 0),
            first(CorrKind::Cm, 1)
        );
    }
}
