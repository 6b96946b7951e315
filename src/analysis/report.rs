use crate::analysis::concentration::{ConcentrationLevel, ConcentrationMetrics};
use crate::analysis::substitutability::SubstitutabilityEstimator;
use crate::config::RiskModel;
use crate::core::country::CountryCode;
use crate::core::distribution::SupplierDistribution;
use crate::error::Result;
use crate::simulation::disruption::DisruptionScenario;
use serde::Serialize;
use std::fmt;

/// One row of a ranked supplier listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierShare {
    pub supplier: CountryCode,
    pub value: f64,
    pub share: f64,
}

/// Every metric for one (product scope, year selection, scenario).
///
/// Reports are immutable values: the dashboard layer decides which fields to
/// foreground for a stakeholder role, the engine always fills all of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub risk_score: f64,
    pub diversity_score: f64,
    pub substitutability_score: f64,
    pub top_supplier_share: f64,
    pub top3_concentration: f64,
    pub herfindahl: f64,
    pub hhi_points: f64,
    pub effective_suppliers: f64,
    pub concentration_level: ConcentrationLevel,
    pub supplier_count: usize,
    pub distribution: SupplierDistribution,
    /// `None` for a baseline report.
    pub scenario: Option<DisruptionScenario>,
}

impl MetricsReport {
    /// Score `distribution` with `model`.
    ///
    /// # Examples
    ///
    /// ```
    /// use supply_risk_engine::analysis::report::MetricsReport;
    /// use supply_risk_engine::config::RiskModel;
    /// use supply_risk_engine::core::distribution::SupplierDistribution;
    ///
    /// let dist = SupplierDistribution::from_values([("A", 100.0)]).unwrap();
    /// let report = MetricsReport::build(dist, &RiskModel::default()).unwrap();
    ///
    /// assert_eq!(report.risk_score, 1.0);
    /// assert_eq!(report.diversity_score, 0.0);
    /// assert_eq!(report.substitutability_score, 0.0);
    /// ```
    pub fn build(distribution: SupplierDistribution, model: &RiskModel) -> Result<Self> {
        let metrics = ConcentrationMetrics::compute_with(&distribution, model)?;
        let substitutability_score = SubstitutabilityEstimator::estimate_with(&distribution, model)?;

        Ok(Self {
            risk_score: metrics.risk_score,
            diversity_score: metrics.diversity_score,
            substitutability_score,
            top_supplier_share: metrics.top_supplier_share,
            top3_concentration: metrics.top3_concentration,
            herfindahl: metrics.herfindahl,
            hhi_points: metrics.hhi_points,
            effective_suppliers: metrics.effective_suppliers,
            concentration_level: metrics.level,
            supplier_count: metrics.supplier_count,
            distribution,
            scenario: None,
        })
    }

    pub(crate) fn with_scenario(mut self, scenario: DisruptionScenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    /// The `n` largest suppliers with their shares.
    pub fn top_suppliers(&self, n: usize) -> Vec<SupplierShare> {
        let total = self.distribution.total();
        self.distribution
            .ranked()
            .into_iter()
            .take(n)
            .map(|(supplier, value)| SupplierShare {
                supplier: supplier.clone(),
                value,
                share: value / total,
            })
            .collect()
    }

    pub fn is_baseline(&self) -> bool {
        self.scenario.is_none()
    }
}

impl fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = self.distribution.context();
        writeln!(f, "=== Supply Risk Report ===")?;
        writeln!(f, "Scope:            {}", context.scope)?;
        writeln!(f, "Years:            {}", context.years_label())?;
        if let Some(importer) = &context.importer {
            writeln!(f, "Importer:         {}", importer)?;
        }
        if let Some(scenario) = &self.scenario {
            writeln!(f, "Scenario:         {}", scenario)?;
        }
        writeln!(f, "Suppliers:        {}", self.supplier_count)?;
        writeln!(f, "Total Value:      {:.2}", self.distribution.total())?;
        writeln!(f, "Risk Score:       {:.3}", self.risk_score)?;
        writeln!(f, "Diversity:        {:.3}", self.diversity_score)?;
        writeln!(f, "Substitutability: {:.3}", self.substitutability_score)?;
        writeln!(f, "Top Supplier:     {:.1}%", self.top_supplier_share * 100.0)?;
        writeln!(f, "Top 3:            {:.1}%", self.top3_concentration * 100.0)?;
        writeln!(
            f,
            "HHI:              {:.0} ({})",
            self.hhi_points, self.concentration_level
        )?;
        writeln!(f, "Effective N:      {:.2}", self.effective_suppliers)?;
        Ok(())
    }
}

/// A baseline report paired with its disrupted counterpart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    pub baseline: MetricsReport,
    pub disrupted: MetricsReport,
    /// Volume taken from the removed suppliers and reassigned.
    pub reallocated_volume: f64,
}

impl ScenarioComparison {
    pub fn risk_delta(&self) -> f64 {
        self.disrupted.risk_score - self.baseline.risk_score
    }

    pub fn diversity_delta(&self) -> f64 {
        self.disrupted.diversity_score - self.baseline.diversity_score
    }

    pub fn substitutability_delta(&self) -> f64 {
        self.disrupted.substitutability_score - self.baseline.substitutability_score
    }

    pub fn top_supplier_share_delta(&self) -> f64 {
        self.disrupted.top_supplier_share - self.baseline.top_supplier_share
    }

    pub fn top3_delta(&self) -> f64 {
        self.disrupted.top3_concentration - self.baseline.top3_concentration
    }

    pub fn supplier_count_delta(&self) -> i64 {
        self.disrupted.supplier_count as i64 - self.baseline.supplier_count as i64
    }

    /// Share of the baseline volume that had to move.
    pub fn reallocated_share(&self) -> f64 {
        let total = self.baseline.distribution.total();
        if total > 0.0 {
            self.reallocated_volume / total
        } else {
            0.0
        }
    }
}

impl fmt::Display for ScenarioComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Disruption Comparison ===")?;
        if let Some(scenario) = &self.disrupted.scenario {
            writeln!(f, "Scenario:         {}", scenario)?;
        }
        writeln!(
            f,
            "Reallocated:      {:.2} ({:.1}% of supply)",
            self.reallocated_volume,
            self.reallocated_share() * 100.0
        )?;
        writeln!(f, "{:<18}{:>10}{:>10}{:>10}", "", "before", "after", "change")?;
        let rows = [
            (
                "Risk",
                self.baseline.risk_score,
                self.disrupted.risk_score,
                self.risk_delta(),
            ),
            (
                "Diversity",
                self.baseline.diversity_score,
                self.disrupted.diversity_score,
                self.diversity_delta(),
            ),
            (
                "Substitutability",
                self.baseline.substitutability_score,
                self.disrupted.substitutability_score,
                self.substitutability_delta(),
            ),
            (
                "Top supplier",
                self.baseline.top_supplier_share,
                self.disrupted.top_supplier_share,
                self.top_supplier_share_delta(),
            ),
            (
                "Top 3",
                self.baseline.top3_concentration,
                self.disrupted.top3_concentration,
                self.top3_delta(),
            ),
        ];
        for (label, before, after, change) in rows {
            writeln!(
                f,
                "{:<18}{:>10.3}{:>10.3}{:>+10.3}",
                label, before, after, change
            )?;
        }
        writeln!(
            f,
            "{:<18}{:>10}{:>10}{:>+10}",
            "Suppliers",
            self.baseline.supplier_count,
            self.disrupted.supplier_count,
            self.supplier_count_delta()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample() -> SupplierDistribution {
        SupplierDistribution::from_values([("A", 60.0), ("B", 30.0), ("C", 10.0)]).unwrap()
    }

    #[test]
    fn test_build_fills_every_metric() {
        let report = MetricsReport::build(sample(), &RiskModel::default()).unwrap();
        assert_relative_eq!(report.top_supplier_share, 0.6, epsilon = 1e-12);
        assert_relative_eq!(report.top3_concentration, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.risk_score + report.diversity_score, 1.0, epsilon = 1e-12);
        assert_relative_eq!(report.hhi_points, 4600.0, epsilon = 1e-8);
        assert_eq!(report.supplier_count, 3);
        assert!(report.is_baseline());
    }

    #[test]
    fn test_top_suppliers() {
        let report = MetricsReport::build(sample(), &RiskModel::default()).unwrap();
        let top = report.top_suppliers(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].supplier, CountryCode::new("A"));
        assert_relative_eq!(top[1].share, 0.3);
    }

    #[test]
    fn test_report_is_idempotent() {
        let a = MetricsReport::build(sample(), &RiskModel::default()).unwrap();
        let b = MetricsReport::build(sample(), &RiskModel::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_report_serializes() {
        let report = MetricsReport::build(sample(), &RiskModel::default()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["supplier_count"], 3);
        assert_eq!(json["concentration_level"], "high");
        assert!(json["distribution"]["values"]["A"].is_number());
        assert!(json["scenario"].is_null());
    }

    #[test]
    fn test_comparison_deltas() {
        use crate::simulation::disruption::{
            DisruptionScenario, DisruptionSimulator, RedistributionPolicy,
        };

        let model = RiskModel::default();
        let baseline = MetricsReport::build(sample(), &model).unwrap();
        let scenario = DisruptionScenario::new(["A"], RedistributionPolicy::Proportional);
        let comparison = DisruptionSimulator::compare(&baseline, &scenario, &model).unwrap();

        // {B:75, C:25}: H = 0.625, top 0.75, top-3 1.0
        assert_relative_eq!(comparison.risk_delta(), 0.625 - 0.46, epsilon = 1e-12);
        assert_relative_eq!(comparison.diversity_delta(), -comparison.risk_delta(), epsilon = 1e-12);
        assert_relative_eq!(comparison.top_supplier_share_delta(), 0.15, epsilon = 1e-12);
        assert_relative_eq!(comparison.top3_delta(), 0.0, epsilon = 1e-12);
        assert_eq!(comparison.supplier_count_delta(), -1);

        let expected_sub = comparison.disrupted.substitutability_score
            - comparison.baseline.substitutability_score;
        assert_relative_eq!(comparison.substitutability_delta(), expected_sub, epsilon = 1e-12);
        // two suppliers left: losing B raises H from 0.625 to 1
        assert_relative_eq!(comparison.disrupted.substitutability_score, 0.625, epsilon = 1e-12);

        let text = comparison.to_string();
        assert!(text.contains("Risk                   0.460     0.625    +0.165"));
        assert!(text.contains("Top supplier           0.600     0.750    +0.150"));
    }

    #[test]
    fn test_display_mentions_scores() {
        let report = MetricsReport::build(sample(), &RiskModel::default()).unwrap();
        let text = report.to_string();
        assert!(text.contains("Risk Score:       0.460"));
        assert!(text.contains("HHI:              4600 (High)"));
    }
}
