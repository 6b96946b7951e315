use crate::analysis::concentration::{unit_interval, ConcentrationMetrics};
use crate::config::{RiskModel, SubstitutabilityMode};
use crate::core::country::CountryCode;
use crate::core::distribution::SupplierDistribution;
use crate::error::Result;
use crate::simulation::disruption::{DisruptionScenario, DisruptionSimulator, RedistributionPolicy};
use serde::Serialize;

/// How replaceable one supplier is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierSubstitutability {
    pub supplier: CountryCode,
    pub share: f64,
    /// Risk score once this supplier's volume is spread over the others.
    pub risk_after: f64,
    pub score: f64,
}

/// Estimates how readily the market could absorb the loss of a supplier.
///
/// The supplier is removed with [`RedistributionPolicy::Proportional`] and
/// the risk score of the counterfactual is compared to the baseline. A
/// market whose concentration barely moves scores close to 1; a market with
/// a single active supplier scores 0 because there is no alternative.
pub struct SubstitutabilityEstimator;

impl SubstitutabilityEstimator {
    /// Substitutability of the top supplier under the default [`RiskModel`].
    ///
    /// # Examples
    ///
    /// ```
    /// use supply_risk_engine::analysis::substitutability::SubstitutabilityEstimator;
    /// use supply_risk_engine::core::distribution::SupplierDistribution;
    ///
    /// let monopoly = SupplierDistribution::from_values([("A", 100.0)]).unwrap();
    /// let duopoly = SupplierDistribution::from_values([("A", 50.0), ("B", 50.0)]).unwrap();
    ///
    /// assert_eq!(SubstitutabilityEstimator::estimate(&monopoly).unwrap(), 0.0);
    /// assert!(SubstitutabilityEstimator::estimate(&duopoly).unwrap() > 0.0);
    /// ```
    pub fn estimate(distribution: &SupplierDistribution) -> Result<f64> {
        Self::estimate_with(distribution, &RiskModel::default())
    }

    pub fn estimate_with(distribution: &SupplierDistribution, model: &RiskModel) -> Result<f64> {
        let before = ConcentrationMetrics::compute_with(distribution, model)?;
        let ranked = distribution.ranked();
        let top = ranked[0].0;
        Ok(Self::assess(distribution, top, before.risk_score, model)?.score)
    }

    /// Score every active supplier in ranked order.
    pub fn per_supplier(
        distribution: &SupplierDistribution,
        model: &RiskModel,
    ) -> Result<Vec<SupplierSubstitutability>> {
        let before = ConcentrationMetrics::compute_with(distribution, model)?;
        distribution
            .ranked()
            .into_iter()
            .map(|(supplier, _)| Self::assess(distribution, supplier, before.risk_score, model))
            .collect()
    }

    fn assess(
        distribution: &SupplierDistribution,
        supplier: &CountryCode,
        risk_before: f64,
        model: &RiskModel,
    ) -> Result<SupplierSubstitutability> {
        let share = distribution.share(supplier).unwrap_or(0.0);

        if distribution.supplier_count() <= 1 || risk_before >= 1.0 {
            return Ok(SupplierSubstitutability {
                supplier: supplier.clone(),
                share,
                risk_after: 1.0,
                score: 0.0,
            });
        }

        let scenario =
            DisruptionScenario::new([supplier.clone()], RedistributionPolicy::Proportional);
        let after = DisruptionSimulator::simulate(distribution, &scenario)?;
        let risk_after = ConcentrationMetrics::compute_with(&after, model)?.risk_score;

        let raw = match model.substitutability {
            SubstitutabilityMode::AbsoluteIncrease => 1.0 - (risk_after - risk_before).max(0.0),
            SubstitutabilityMode::RelativeHeadroom => {
                1.0 - (risk_after - risk_before) / (1.0 - risk_before)
            }
        };

        Ok(SupplierSubstitutability {
            supplier: supplier.clone(),
            share,
            risk_after,
            score: unit_interval("substitutability_score", raw)?,
        })
    }
}
