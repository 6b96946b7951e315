use crate::analysis::aggregator::SupplierAggregator;
use crate::analysis::report::{MetricsReport, ScenarioComparison};
use crate::analysis::substitutability::{SubstitutabilityEstimator, SupplierSubstitutability};
use crate::config::{AnalysisConfig, RiskModel};
use crate::core::country::CountryCode;
use crate::core::flow_table::FlowTable;
use crate::core::record::YearSelector;
use crate::error::Result;
use crate::simulation::disruption::{DisruptionScenario, DisruptionSimulator};

/// Request-level entry point: one flow table in, reports out.
///
/// The engine holds only its validated configuration, so a single instance
/// can serve concurrent requests. It does not know about stakeholder roles;
/// callers rank or filter report fields themselves.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::prelude::*;
/// use rust_decimal_macros::dec;
///
/// let table = FlowTable::from_records(ProductScope::labelled("steel", ["7208"]), vec![
///     TradeRecord::new("CHN".into(), "USA".into(), "7208".into(), 2023, dec!(60)).unwrap(),
///     TradeRecord::new("KOR".into(), "USA".into(), "7208".into(), 2023, dec!(30)).unwrap(),
///     TradeRecord::new("MEX".into(), "USA".into(), "7208".into(), 2023, dec!(10)).unwrap(),
/// ]).unwrap();
///
/// let engine = RiskEngine::new(AnalysisConfig::default()).unwrap();
/// let baseline = engine.analyze(&table, YearSelector::Single(2023)).unwrap();
///
/// let scenario = DisruptionScenario::new(["CHN"], RedistributionPolicy::Proportional);
/// let comparison = engine.simulate(&baseline, &scenario).unwrap();
/// assert!(comparison.risk_delta() > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: AnalysisConfig,
    model: RiskModel,
}

impl RiskEngine {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        let model = config.validate()?;
        Ok(Self { config, model })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn model(&self) -> &RiskModel {
        &self.model
    }

    /// Baseline report over every importer.
    pub fn analyze(&self, table: &FlowTable, selector: YearSelector) -> Result<MetricsReport> {
        let distribution = SupplierAggregator::aggregate(table, selector)?;
        MetricsReport::build(distribution, &self.model)
    }

    /// Baseline report for imports into `importer`.
    pub fn analyze_for_importer(
        &self,
        table: &FlowTable,
        importer: &CountryCode,
        selector: YearSelector,
    ) -> Result<MetricsReport> {
        let distribution = SupplierAggregator::aggregate_for_importer(table, importer, selector)?;
        MetricsReport::build(distribution, &self.model)
    }

    pub fn simulate(
        &self,
        baseline: &MetricsReport,
        scenario: &DisruptionScenario,
    ) -> Result<ScenarioComparison> {
        DisruptionSimulator::compare(baseline, scenario, &self.model)
    }

    /// Run several scenarios against one baseline. Each scenario succeeds or
    /// fails on its own.
    pub fn simulate_many<'a, I>(
        &self,
        baseline: &MetricsReport,
        scenarios: I,
    ) -> Vec<Result<ScenarioComparison>>
    where
        I: IntoIterator<Item = &'a DisruptionScenario>,
    {
        scenarios
            .into_iter()
            .map(|scenario| self.simulate(baseline, scenario))
            .collect()
    }

    /// Replaceability of each supplier in the baseline.
    pub fn supplier_substitutability(
        &self,
        baseline: &MetricsReport,
    ) -> Result<Vec<SupplierSubstitutability>> {
        SubstitutabilityEstimator::per_supplier(&baseline.distribution, &self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RiskTransform;
    use crate::core::product::ProductScope;
    use crate::core::record::TradeRecord;
    use crate::error::AnalysisError;
    use crate::simulation::disruption::RedistributionPolicy;
    use rust_decimal_macros::dec;

    fn table() -> FlowTable {
        FlowTable::from_records(
            ProductScope::labelled("chips", ["8542"]),
            vec![
                TradeRecord::new("TWN".into(), "USA".into(), "8542".into(), 2023, dec!(50)).unwrap(),
                TradeRecord::new("KOR".into(), "USA".into(), "8542".into(), 2023, dec!(30)).unwrap(),
                TradeRecord::new("MYS".into(), "USA".into(), "8542".into(), 2023, dec!(20)).unwrap(),
                TradeRecord::new("TWN".into(), "DEU".into(), "8542".into(), 2023, dec!(40)).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            top_suppliers: 0,
            ..Default::default()
        };
        assert!(matches!(
            RiskEngine::new(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_importer_slice_differs_from_global() {
        let engine = RiskEngine::new(AnalysisConfig::default()).unwrap();
        let usa = CountryCode::new("USA");
        let global = engine.analyze(&table(), YearSelector::Single(2023)).unwrap();
        let us = engine
            .analyze_for_importer(&table(), &usa, YearSelector::Single(2023))
            .unwrap();
        assert!(global.top_supplier_share > us.top_supplier_share);
    }

    #[test]
    fn test_simulate_many_isolates_failures() {
        let engine = RiskEngine::new(AnalysisConfig::default()).unwrap();
        let baseline = engine.analyze(&table(), YearSelector::Single(2023)).unwrap();
        let scenarios = vec![
            DisruptionScenario::new(["TWN"], RedistributionPolicy::Proportional),
            DisruptionScenario::new(["XXX"], RedistributionPolicy::Proportional),
            DisruptionScenario::new(["TWN", "KOR", "MYS"], RedistributionPolicy::BestFit),
        ];
        let results = engine.simulate_many(&baseline, &scenarios);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AnalysisError::UnknownSupplier { .. })));
        assert!(matches!(results[2], Err(AnalysisError::TotalDisruption { .. })));
    }

    #[test]
    fn test_same_transform_for_baseline_and_disruption() {
        let config = AnalysisConfig {
            risk_transform: RiskTransform::Normalized {
                plausible_suppliers: 5,
            },
            ..Default::default()
        };
        let engine = RiskEngine::new(config).unwrap();
        let baseline = engine.analyze(&table(), YearSelector::Single(2023)).unwrap();
        let scenario = DisruptionScenario::new(["MYS"], RedistributionPolicy::BestFit);
        let comparison = engine.simulate(&baseline, &scenario).unwrap();
        let expected = RiskTransform::Normalized {
            plausible_suppliers: 5,
        }
        .apply(comparison.disrupted.herfindahl);
        assert_eq!(comparison.disrupted.risk_score, expected);
    }

    #[test]
    fn test_supplier_substitutability_covers_every_supplier() {
        let engine = RiskEngine::new(AnalysisConfig::default()).unwrap();
        let baseline = engine.analyze(&table(), YearSelector::Single(2023)).unwrap();
        let scores = engine.supplier_substitutability(&baseline).unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].supplier, CountryCode::new("TWN"));
    }
}
