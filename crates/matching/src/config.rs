use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid matching configuration: {0}")]
    Invalid(String),
}

/// Weights and thresholds of the payment matcher.
///
/// `Default` holds the canonical values every caller should use; other values
/// exist so tests and tuning sessions can probe the boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub amount_weight: f64,
    pub reference_weight: f64,
    pub name_weight: f64,
    pub recency_weight: f64,
    /// Largest accepted |paid - due| / due for a partial or over-payment.
    pub amount_tolerance_ratio: f64,
    /// Amount sub-score for an off-by-almost-nothing payment.
    pub partial_amount_ceiling: f64,
    /// Amount sub-score at the edge of the tolerance.
    pub partial_amount_floor: f64,
    /// Name sub-score when the bank gave no payer name.
    pub neutral_name_score: f64,
    pub min_accept_threshold: f64,
    pub medium_threshold: f64,
    pub high_threshold: f64,
    pub ambiguity_margin: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            amount_weight: 0.55,
            reference_weight: 0.20,
            name_weight: 0.15,
            recency_weight: 0.10,
            amount_tolerance_ratio: 0.05,
            partial_amount_ceiling: 0.70,
            partial_amount_floor: 0.30,
            neutral_name_score: 0.50,
            min_accept_threshold: 0.50,
            medium_threshold: 0.65,
            high_threshold: 0.80,
            ambiguity_margin: 0.05,
        }
    }
}

impl MatchingConfig {
    /// Parse a TOML table; keys left out keep their default value.
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: MatchingConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("amount_weight", self.amount_weight),
            ("reference_weight", self.reference_weight),
            ("name_weight", self.name_weight),
            ("recency_weight", self.recency_weight),
            ("partial_amount_ceiling", self.partial_amount_ceiling),
            ("partial_amount_floor", self.partial_amount_floor),
            ("neutral_name_score", self.neutral_name_score),
            ("min_accept_threshold", self.min_accept_threshold),
            ("medium_threshold", self.medium_threshold),
            ("high_threshold", self.high_threshold),
        ];
        for (name, value) in named {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1], got {value}")));
            }
        }

        let weight_sum =
            self.amount_weight + self.reference_weight + self.name_weight + self.recency_weight;
        if (weight_sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Invalid(format!(
                "signal weights must sum to 1.0, got {weight_sum}"
            )));
        }

        if !(self.min_accept_threshold > 0.0
            && self.min_accept_threshold <= self.medium_threshold
            && self.medium_threshold <= self.high_threshold)
        {
            return Err(ConfigError::Invalid(
                "thresholds must satisfy 0 < min_accept <= medium <= high <= 1".to_string(),
            ));
        }

        if self.partial_amount_floor > self.partial_amount_ceiling {
            return Err(ConfigError::Invalid(
                "partial_amount_floor must not exceed partial_amount_ceiling".to_string(),
            ));
        }

        for (name, value) in [
            ("amount_tolerance_ratio", self.amount_tolerance_ratio),
            ("ambiguity_margin", self.ambiguity_margin),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within [0, 1), got {value}")));
            }
        }

        Ok(())
    }
}
