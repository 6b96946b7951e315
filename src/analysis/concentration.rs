use crate::config::RiskModel;
use crate::core::distribution::SupplierDistribution;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Conventional antitrust bands on the 0–10 000 HHI scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationLevel {
    Low,
    Moderate,
    High,
}

impl ConcentrationLevel {
    pub const HIGH_THRESHOLD: f64 = 2500.0;
    pub const MODERATE_THRESHOLD: f64 = 1500.0;

    pub fn from_hhi(hhi_points: f64) -> Self {
        if hhi_points > Self::HIGH_THRESHOLD {
            ConcentrationLevel::High
        } else if hhi_points > Self::MODERATE_THRESHOLD {
            ConcentrationLevel::Moderate
        } else {
            ConcentrationLevel::Low
        }
    }
}

impl fmt::Display for ConcentrationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConcentrationLevel::Low => "Low",
            ConcentrationLevel::Moderate => "Moderate",
            ConcentrationLevel::High => "High",
        };
        write!(f, "{}", s)
    }
}

/// Concentration indices of a supplier distribution.
///
/// - `top_supplier_share`: largest supplier's share of the total.
/// - `top3_concentration`: combined share of the three largest (or fewer).
/// - `herfindahl`: `H = Σ share²`, in `[1/N, 1]`.
/// - `risk_score`: `H` mapped through the configured
///   [`RiskTransform`](crate::config::RiskTransform).
/// - `diversity_score`: `1 - risk_score`.
///
/// All scores lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationMetrics {
    pub top_supplier_share: f64,
    pub top3_concentration: f64,
    pub herfindahl: f64,
    /// `H × 10 000`, the scale trade analysts usually quote.
    pub hhi_points: f64,
    /// `1 / H`: the number of equal-sized suppliers with the same concentration.
    pub effective_suppliers: f64,
    pub risk_score: f64,
    pub diversity_score: f64,
    pub supplier_count: usize,
    pub level: ConcentrationLevel,
}

impl ConcentrationMetrics {
    /// Compute with the default [`RiskModel`].
    ///
    /// # Examples
    ///
    /// ```
    /// use supply_risk_engine::analysis::concentration::ConcentrationMetrics;
    /// use supply_risk_engine::core::distribution::SupplierDistribution;
    ///
    /// let dist = SupplierDistribution::from_values([("A", 60.0), ("B", 30.0), ("C", 10.0)]).unwrap();
    /// let metrics = ConcentrationMetrics::compute(&dist).unwrap();
    ///
    /// assert!((metrics.top_supplier_share - 0.60).abs() < 1e-12);
    /// assert!((metrics.top3_concentration - 1.00).abs() < 1e-12);
    /// ```
    pub fn compute(distribution: &SupplierDistribution) -> Result<Self> {
        Self::compute_with(distribution, &RiskModel::default())
    }

    pub fn compute_with(distribution: &SupplierDistribution, model: &RiskModel) -> Result<Self> {
        let total = positive_total(distribution)?;
        let ranked = distribution.ranked();

        let top_supplier_share = unit_interval("top_supplier_share", ranked[0].1 / total)?;

        let top3: f64 = ranked.iter().take(3).map(|(_, v)| v).sum();
        let top3_concentration = unit_interval("top3_concentration", top3 / total)?;

        let herfindahl: f64 = ranked
            .iter()
            .map(|(_, v)| {
                let share = v / total;
                share * share
            })
            .sum();
        let herfindahl = unit_interval("herfindahl", herfindahl)?;

        let effective_suppliers = 1.0 / herfindahl;
        if !effective_suppliers.is_finite() {
            return Err(AnalysisError::NonFiniteMetric {
                metric: "effective_suppliers",
            });
        }

        let risk_score = unit_interval("risk_score", model.risk_transform.apply(herfindahl))?;
        let hhi_points = herfindahl * 10_000.0;

        Ok(Self {
            top_supplier_share,
            top3_concentration,
            herfindahl,
            hhi_points,
            effective_suppliers,
            risk_score,
            diversity_score: 1.0 - risk_score,
            supplier_count: ranked.len(),
            level: ConcentrationLevel::from_hhi(hhi_points),
        })
    }
}

/// The distribution's total, or `EmptyDistribution` when it is not positive.
pub(crate) fn positive_total(distribution: &SupplierDistribution) -> Result<f64> {
    let total = distribution.total();
    if !total.is_finite() {
        return Err(AnalysisError::NonFiniteMetric { metric: "total" });
    }
    if total <= 0.0 {
        let context = distribution.context();
        return Err(AnalysisError::EmptyDistribution {
            scope: context.scope.clone(),
            years: context.years_label(),
        });
    }
    Ok(total)
}

/// Reject NaN/infinity and absorb rounding overshoot outside `[0, 1]`.
pub(crate) fn unit_interval(metric: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(AnalysisError::NonFiniteMetric { metric });
    }
    Ok(value.clamp(0.0, 1.0))
}
