use crate::{FilterError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Tuning parameters for every strategy. Missing JSON fields fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub query: QueryParams,
    pub rocchio: RocchioParams,
    pub bayes: BayesParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Retrieve when the fraction of matched query terms exceeds this
    pub threshold: f64,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocchioParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub threshold: f64,
}

impl Default for RocchioParams {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 0.75, gamma: 0.15, threshold: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BayesParams {
    /// Weight of the topic title used as a pseudo relevant document
    pub query_weight: f64,
    pub min_instance_weight: f64,
    pub max_instance_weight: f64,
    /// Additive smoothing pseudo-count
    pub laplace: f64,
}

impl Default for BayesParams {
    fn default() -> Self {
        Self { query_weight: 4.0, min_instance_weight: 0.25, max_instance_weight: 4.0, laplace: 1.0 }
    }
}

impl BayesParams {
    /// Weights must be positive and the clipping bounds ordered.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("bayes.query_weight", self.query_weight),
            ("bayes.min_instance_weight", self.min_instance_weight),
            ("bayes.max_instance_weight", self.max_instance_weight),
            ("bayes.laplace", self.laplace),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(FilterError::Config(format!("{name} must be positive, got {value}")));
            }
        }
        if self.min_instance_weight > self.max_instance_weight {
            return Err(FilterError::Config(format!(
                "bayes.min_instance_weight {} exceeds bayes.max_instance_weight {}",
                self.min_instance_weight, self.max_instance_weight
            )));
        }
        Ok(())
    }
}

impl FilterConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FilterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut f = File::open(path)?;
        let mut buf = String::new();
        f.read_to_string(&mut buf)?;
        Self::from_json_str(&buf)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("query.threshold", self.query.threshold),
            ("rocchio.alpha", self.rocchio.alpha),
            ("rocchio.beta", self.rocchio.beta),
            ("rocchio.gamma", self.rocchio.gamma),
            ("rocchio.threshold", self.rocchio.threshold),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(FilterError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        self.bayes.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = FilterConfig::from_json_str(r#"{"rocchio":{"gamma":-0.25}}"#).unwrap();
        assert_eq!(config.rocchio.gamma, -0.25);
        assert_eq!(config.rocchio.beta, 0.75);
        assert_eq!(config.bayes, BayesParams::default());
        assert_eq!(config.query.threshold, 0.5);
    }

    #[test]
    fn rejects_inverted_weight_bounds() {
        let err = FilterConfig::from_json_str(
            r#"{"bayes":{"min_instance_weight":5.0,"max_instance_weight":4.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::Config(_)));
    }

    #[test]
    fn rejects_non_positive_laplace() {
        assert!(FilterConfig::from_json_str(r#"{"bayes":{"laplace":0.0}}"#).is_err());
    }
}
