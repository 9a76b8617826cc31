//! Rendered results of a batch.

use crate::config::Config;
use serde::{Deserialize, Serialize};
use simmlst_cov::{Calculators, LagCovariance};

/// Ks and Ct of one configuration.
///
/// Undefined values (a lag without samples, a variance of fewer than two
/// values) are NaN in memory and `null` in JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CovResult {
    #[serde(with = "nullable")]
    pub ks: f64,
    pub ks_n: usize,
    #[serde(with = "nullable")]
    pub ks_var: f64,
    #[serde(with = "nullable_vec")]
    pub ct: Vec<f64>,
    pub ct_n: Vec<usize>,
    /// Variance of Ct across replicates; only filled by averaging.
    #[serde(with = "nullable_vec", default, skip_serializing_if = "Vec::is_empty")]
    pub ct_var: Vec<f64>,
}

impl CovResult {
    /// Read the final values out of a fully merged bundle.
    pub fn from_calculators(calculators: &Calculators) -> Self {
        let ks = calculators.ks();
        let ct = calculators.ct();
        Self {
            ks: ks.mean(),
            ks_n: ks.n(),
            ks_var: ks.variance(),
            ct: ct.results(),
            ct_n: ct.counts(),
            ct_var: Vec::new(),
        }
    }
}

/// One output row: a configuration and its statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub config: Config,
    pub cov: CovResult,
}

impl ResultRecord {
    pub fn new(config: Config, calculators: &Calculators) -> Self {
        Self {
            config,
            cov: CovResult::from_calculators(calculators),
        }
    }
}

pub(crate) mod nullable {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            s.serialize_f64(*value)
        } else {
            s.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
    }
}

pub(crate) mod nullable_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(values: &[f64], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(values.iter().map(|v| v.is_finite().then_some(*v)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Option<f64>>::deserialize(d)?;
        Ok(values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    }
}
