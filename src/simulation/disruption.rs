//! Counterfactual supplier-loss simulation.
//!
//! A [`DisruptionScenario`] removes one or more exporters from a supplier
//! distribution. Their volume is not destroyed: it is reassigned to the
//! remaining suppliers according to a [`RedistributionPolicy`], and the
//! resulting distribution is scored exactly like the baseline.

use crate::analysis::concentration::positive_total;
use crate::analysis::report::{MetricsReport, ScenarioComparison};
use crate::config::RiskModel;
use crate::core::country::CountryCode;
use crate::core::distribution::SupplierDistribution;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Rule for reassigning a removed supplier's volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedistributionPolicy {
    /// Spread over every remaining supplier in proportion to its share of
    /// the remaining total.
    #[default]
    Proportional,
    /// Hand everything to the largest remaining supplier. This is the
    /// worst-case concentration outcome and bounds risk from above.
    BestFit,
}

impl fmt::Display for RedistributionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedistributionPolicy::Proportional => write!(f, "proportional"),
            RedistributionPolicy::BestFit => write!(f, "best-fit"),
        }
    }
}

impl FromStr for RedistributionPolicy {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proportional" => Ok(RedistributionPolicy::Proportional),
            "best-fit" | "best_fit" | "bestfit" => Ok(RedistributionPolicy::BestFit),
            other => Err(AnalysisError::InvalidConfig(format!(
                "unknown redistribution policy '{}'",
                other
            ))),
        }
    }
}

/// A hypothetical loss of suppliers.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::simulation::disruption::{DisruptionScenario, RedistributionPolicy};
///
/// let scenario = DisruptionScenario::new(["CHN", "RUS"], RedistributionPolicy::BestFit);
/// assert_eq!(scenario.to_string(), "without CHN, RUS (best-fit)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisruptionScenario {
    removed_suppliers: BTreeSet<CountryCode>,
    policy: RedistributionPolicy,
}

impl DisruptionScenario {
    pub fn new<I, C>(removed: I, policy: RedistributionPolicy) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CountryCode>,
    {
        Self {
            removed_suppliers: removed.into_iter().map(Into::into).collect(),
            policy,
        }
    }

    pub fn removed_suppliers(&self) -> &BTreeSet<CountryCode> {
        &self.removed_suppliers
    }

    pub fn policy(&self) -> RedistributionPolicy {
        self.policy
    }
}

impl fmt::Display for DisruptionScenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let removed: Vec<&str> = self.removed_suppliers.iter().map(|c| c.as_str()).collect();
        write!(f, "without {} ({})", removed.join(", "), self.policy)
    }
}

/// Applies disruption scenarios to supplier distributions.
pub struct DisruptionSimulator;

impl DisruptionSimulator {
    /// Produce the counterfactual distribution for `scenario`.
    ///
    /// Removed suppliers are absent from the result, and the result's total
    /// equals the input total up to floating-point rounding.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::EmptyDistribution`] when the input total is zero.
    /// - [`AnalysisError::UnknownSupplier`] when a removed code is not a key of
    ///   the distribution.
    /// - [`AnalysisError::TotalDisruption`] when no supplier with positive
    ///   volume would remain. Zero supply is reported, never returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use supply_risk_engine::core::country::CountryCode;
    /// use supply_risk_engine::core::distribution::SupplierDistribution;
    /// use supply_risk_engine::simulation::disruption::{
    ///     DisruptionScenario, DisruptionSimulator, RedistributionPolicy,
    /// };
    ///
    /// let dist = SupplierDistribution::from_values([("A", 60.0), ("B", 30.0), ("C", 10.0)]).unwrap();
    /// let scenario = DisruptionScenario::new(["A"], RedistributionPolicy::Proportional);
    ///
    /// let after = DisruptionSimulator::simulate(&dist, &scenario).unwrap();
    /// assert_eq!(after.get(&CountryCode::new("B")), 75.0);
    /// assert_eq!(after.get(&CountryCode::new("C")), 25.0);
    /// assert_eq!(after.total(), 100.0);
    /// ```
    pub fn simulate(
        distribution: &SupplierDistribution,
        scenario: &DisruptionScenario,
    ) -> Result<SupplierDistribution> {
        positive_total(distribution)?;

        let unknown: Vec<CountryCode> = scenario
            .removed_suppliers
            .iter()
            .filter(|code| !distribution.contains(code))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(AnalysisError::UnknownSupplier { suppliers: unknown });
        }

        let removed_volume: f64 = scenario
            .removed_suppliers
            .iter()
            .map(|code| distribution.get(code))
            .sum();

        let mut remaining: BTreeMap<CountryCode, f64> = distribution
            .values()
            .iter()
            .filter(|(code, _)| !scenario.removed_suppliers.contains(*code))
            .map(|(code, &value)| (code.clone(), value))
            .collect();
        let remaining_total: f64 = remaining.values().sum();

        if remaining_total <= 0.0 {
            return Err(AnalysisError::TotalDisruption {
                scope: distribution.context().scope.clone(),
                removed: scenario.removed_suppliers.iter().cloned().collect(),
            });
        }

        if removed_volume > 0.0 {
            match scenario.policy {
                RedistributionPolicy::Proportional => {
                    for value in remaining.values_mut() {
                        *value += removed_volume * (*value / remaining_total);
                    }
                }
                RedistributionPolicy::BestFit => {
                    // BTreeMap iterates in code order, so `>` keeps the lowest
                    // code among equally large suppliers.
                    let mut largest: Option<(&CountryCode, f64)> = None;
                    for (code, &value) in &remaining {
                        if largest.map_or(true, |(_, best)| value > best) {
                            largest = Some((code, value));
                        }
                    }
                    if let Some((code, _)) = largest {
                        let code = code.clone();
                        if let Some(value) = remaining.get_mut(&code) {
                            *value += removed_volume;
                        }
                    }
                }
            }
        }

        log::debug!(
            "scenario {}: reallocated {:.3} across {} remaining supplier(s)",
            scenario,
            removed_volume,
            remaining.len()
        );

        Ok(SupplierDistribution::from_map(
            remaining,
            distribution.context().clone(),
        ))
    }

    /// Simulate `scenario` against an already-computed baseline report and
    /// score the result with the same model.
    pub fn compare(
        baseline: &MetricsReport,
        scenario: &DisruptionScenario,
        model: &RiskModel,
    ) -> Result<ScenarioComparison> {
        let disrupted = Self::simulate(&baseline.distribution, scenario)?;
        let reallocated_volume = scenario
            .removed_suppliers
            .iter()
            .map(|code| baseline.distribution.get(code))
            .sum();
        let disrupted = MetricsReport::build(disrupted, model)?.with_scenario(scenario.clone());
        Ok(ScenarioComparison {
            baseline: baseline.clone(),
            disrupted,
            reallocated_volume,
        })
    }
}
