use crate::core::country::CountryCode;
use crate::core::distribution::{DistributionContext, SupplierDistribution};
use crate::core::flow_table::FlowTable;
use crate::core::record::YearSelector;
use crate::error::{AnalysisError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Collapses a [`FlowTable`] into per-exporter totals.
///
/// # Averaging policy
///
/// For [`YearSelector::Average`] and [`YearSelector::AverageRange`] each
/// exporter's summed value is divided by the number of distinct years present
/// in the selected slice, not by the number of years that exporter happens
/// to appear in. A supplier that exited half-way through the range therefore
/// contributes zero for the missing years and is penalised instead of being
/// averaged over its active years only.
///
/// Sums are taken in exact decimal arithmetic and converted to `f64` once per
/// exporter, so the result does not depend on record order.
pub struct SupplierAggregator;

impl SupplierAggregator {
    /// Aggregate exports of every exporter to every importer.
    ///
    /// # Examples
    ///
    /// ```
    /// use supply_risk_engine::analysis::aggregator::SupplierAggregator;
    /// use supply_risk_engine::core::country::CountryCode;
    /// use supply_risk_engine::core::flow_table::FlowTable;
    /// use supply_risk_engine::core::product::ProductScope;
    /// use supply_risk_engine::core::record::{TradeRecord, YearSelector};
    /// use rust_decimal_macros::dec;
    ///
    /// let table = FlowTable::from_records(ProductScope::open(), vec![
    ///     TradeRecord::new("CHN".into(), "USA".into(), "7208".into(), 2022, dec!(30)).unwrap(),
    ///     TradeRecord::new("CHN".into(), "DEU".into(), "7208".into(), 2023, dec!(10)).unwrap(),
    ///     TradeRecord::new("KOR".into(), "USA".into(), "7208".into(), 2023, dec!(20)).unwrap(),
    /// ]).unwrap();
    ///
    /// let dist = SupplierAggregator::aggregate(&table, YearSelector::Average).unwrap();
    /// assert_eq!(dist.get(&CountryCode::new("CHN")), 20.0);
    /// assert_eq!(dist.get(&CountryCode::new("KOR")), 10.0);
    /// ```
    pub fn aggregate(table: &FlowTable, selector: YearSelector) -> Result<SupplierDistribution> {
        Self::aggregate_filtered(table, None, selector)
    }

    /// Aggregate only the flows shipped into `importer`.
    pub fn aggregate_for_importer(
        table: &FlowTable,
        importer: &CountryCode,
        selector: YearSelector,
    ) -> Result<SupplierDistribution> {
        Self::aggregate_filtered(table, Some(importer), selector)
    }

    fn aggregate_filtered(
        table: &FlowTable,
        importer: Option<&CountryCode>,
        selector: YearSelector,
    ) -> Result<SupplierDistribution> {
        let mut sums: BTreeMap<CountryCode, Decimal> = BTreeMap::new();
        let mut years = BTreeSet::new();

        for (key, value) in table.flows() {
            if !selector.includes(key.year) {
                continue;
            }
            if importer.map_or(false, |imp| &key.importer != imp) {
                continue;
            }
            years.insert(key.year);
            let sum = sums.entry(key.exporter.clone()).or_insert(Decimal::ZERO);
            *sum = sum
                .checked_add(value)
                .ok_or_else(|| AnalysisError::ValueOverflow {
                    scope: table.scope().clone(),
                    exporter: key.exporter.clone(),
                })?;
        }

        if years.is_empty() {
            return Err(AnalysisError::EmptyInput {
                scope: table.scope().clone(),
                years: selector.to_string(),
                importer: importer.cloned(),
            });
        }

        let divisor = if selector.is_average() {
            Decimal::from(years.len() as u64)
        } else {
            Decimal::ONE
        };

        let values: BTreeMap<CountryCode, f64> = sums
            .into_iter()
            .map(|(code, sum)| (code, (sum / divisor).to_f64().unwrap_or(0.0)))
            .collect();

        let context = DistributionContext {
            scope: table.scope().clone(),
            years: Some(selector),
            importer: importer.cloned(),
        };
        let distribution = SupplierDistribution::from_map(values, context);

        log::debug!(
            "aggregated {} exporters over {} year(s) for {} ({})",
            distribution.values().len(),
            years.len(),
            table.scope(),
            selector
        );
        if distribution.total() == 0.0 {
            log::warn!("all flows for {} ({}) have zero value", table.scope(), selector);
        }

        Ok(distribution)
    }
}
