//! Engine configuration.
//!
//! The library never reads files itself: callers build an [`AnalysisConfig`]
//! in code or deserialize one (the CLI accepts a JSON file), then hand it to
//! [`crate::analysis::engine::RiskEngine::new`], which validates it.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// How the Herfindahl index is mapped onto a `[0, 1]` risk score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskTransform {
    /// `risk = H`. A single supplier scores 1, `N` equal suppliers score `1/N`.
    Herfindahl,
    /// `risk = (H - 1/N) / (1 - 1/N)` clipped to `[0, 1]`, where `N` is the
    /// number of suppliers a well-diversified market plausibly has. An even
    /// split across `N` or more suppliers scores 0. `N` must be at least 3:
    /// with `N = 2` every duopoly scores 0 and becomes indistinguishable
    /// from a perfectly diversified market.
    Normalized { plausible_suppliers: usize },
}

impl RiskTransform {
    pub fn apply(&self, herfindahl: f64) -> f64 {
        match *self {
            RiskTransform::Herfindahl => herfindahl.clamp(0.0, 1.0),
            RiskTransform::Normalized {
                plausible_suppliers,
            } => {
                let floor = 1.0 / plausible_suppliers as f64;
                ((herfindahl - floor) / (1.0 - floor)).clamp(0.0, 1.0)
            }
        }
    }
}

/// How the risk increase after losing the top supplier becomes a
/// substitutability score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutabilityMode {
    /// `1 - max(0, risk_after - risk_before)`.
    AbsoluteIncrease,
    /// `1 - (risk_after - risk_before) / (1 - risk_before)`.
    RelativeHeadroom,
}

/// Smallest accepted `plausible_suppliers` for [`RiskTransform::Normalized`].
pub const MIN_PLAUSIBLE_SUPPLIERS: usize = 3;

/// Validated scoring choices shared by every metric computation.
///
/// Baseline and disrupted reports must be produced with the same model for
/// their comparison to mean anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskModel {
    pub risk_transform: RiskTransform,
    pub substitutability: SubstitutabilityMode,
}

impl Default for RiskModel {
    fn default() -> Self {
        Self {
            risk_transform: RiskTransform::Herfindahl,
            substitutability: SubstitutabilityMode::AbsoluteIncrease,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub risk_transform: RiskTransform,
    pub substitutability: SubstitutabilityMode,
    /// Number of suppliers listed in rendered reports.
    pub top_suppliers: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let model = RiskModel::default();
        Self {
            risk_transform: model.risk_transform,
            substitutability: model.substitutability,
            top_suppliers: 10,
        }
    }
}

impl AnalysisConfig {
    /// Check the configuration and extract the scoring model.
    pub fn validate(&self) -> Result<RiskModel> {
        if let RiskTransform::Normalized {
            plausible_suppliers,
        } = self.risk_transform
        {
            if plausible_suppliers < MIN_PLAUSIBLE_SUPPLIERS {
                return Err(AnalysisError::InvalidConfig(format!(
                    "plausible_suppliers must be at least {}, got {}",
                    MIN_PLAUSIBLE_SUPPLIERS,
                    plausible_suppliers
                )));
            }
        }
        if self.top_suppliers == 0 {
            return Err(AnalysisError::InvalidConfig(
                "top_suppliers must be positive".to_string(),
            ));
        }
        Ok(RiskModel {
            risk_transform: self.risk_transform,
            substitutability: self.substitutability,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AnalysisError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_is_valid() {
        let model = AnalysisConfig::default().validate().unwrap();
        assert_eq!(model, RiskModel::default());
    }

    #[test]
    fn test_normalized_transform_endpoints() {
        let t = RiskTransform::Normalized {
            plausible_suppliers: 10,
        };
        assert_relative_eq!(t.apply(1.0), 1.0);
        assert_relative_eq!(t.apply(0.1), 0.0);
        assert_relative_eq!(t.apply(0.05), 0.0);
    }

    #[test]
    fn test_rejects_degenerate_plausible_count() {
        let config = AnalysisConfig {
            risk_transform: RiskTransform::Normalized {
                plausible_suppliers: 1,
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_two_plausible_suppliers_rejected() {
        let config = AnalysisConfig {
            risk_transform: RiskTransform::Normalized {
                plausible_suppliers: 2,
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));

        let config = AnalysisConfig {
            risk_transform: RiskTransform::Normalized {
                plausible_suppliers: MIN_PLAUSIBLE_SUPPLIERS,
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{ "risk_transform": { "kind": "normalized", "plausible_suppliers": 20 } }"#,
        )
        .unwrap();
        assert_eq!(config.top_suppliers, 10);
        assert_eq!(config.substitutability, SubstitutabilityMode::AbsoluteIncrease);
        assert_eq!(
            config.risk_transform,
            RiskTransform::Normalized {
                plausible_suppliers: 20
            }
        );
    }
}
