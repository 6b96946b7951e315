use crate::core::country::CountryCode;
use crate::core::product::ProductScope;
use crate::core::record::{TradeRecord, Year};
use crate::error::{AnalysisError, Result};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Key of an aggregated flow: who shipped to whom, and when.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub exporter: CountryCode,
    pub importer: CountryCode,
    pub year: Year,
}

/// Trade flows for one product scope, keyed by `(exporter, importer, year)`.
///
/// Records sharing a key are summed on load (several HS codes inside one
/// scope routinely map onto the same country pair and year). Nothing is
/// dropped, and because values are exact decimals the resulting table is
/// identical regardless of the order records arrive in.
///
/// The running table total is checked on every insert. Values are
/// non-negative, so every partial sum (per flow, per year, per country) is
/// bounded by that total and cannot overflow once the table is built.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::country::CountryCode;
/// use supply_risk_engine::core::flow_table::FlowTable;
/// use supply_risk_engine::core::product::{ProductCode, ProductScope};
/// use supply_risk_engine::core::record::TradeRecord;
/// use rust_decimal_macros::dec;
///
/// let scope = ProductScope::new(["720851", "720852"]);
/// let records = vec![
///     TradeRecord::new("CHN".into(), "USA".into(), "720851".into(), 2023, dec!(40)).unwrap(),
///     TradeRecord::new("CHN".into(), "USA".into(), "720852".into(), 2023, dec!(20)).unwrap(),
/// ];
///
/// let table = FlowTable::from_records(scope, records).unwrap();
/// assert_eq!(table.flow_count(), 1);
/// assert_eq!(
///     table.flow_value(&CountryCode::new("CHN"), &CountryCode::new("USA"), 2023),
///     dec!(60)
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowTable {
    scope: ProductScope,
    flows: BTreeMap<FlowKey, Decimal>,
    total: Decimal,
    record_count: usize,
}

impl FlowTable {
    pub fn new(scope: ProductScope) -> Self {
        Self {
            scope,
            flows: BTreeMap::new(),
            total: Decimal::ZERO,
            record_count: 0,
        }
    }

    /// Build a table from records, all of which must fall inside `scope`.
    pub fn from_records<I>(scope: ProductScope, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = TradeRecord>,
    {
        let mut table = Self::new(scope);
        for record in records {
            table.add_record(&record)?;
        }
        Ok(table)
    }

    /// Merge one record into the table.
    ///
    /// Fails with [`AnalysisError::ValueOverflow`] when the table total would
    /// no longer fit in a `Decimal`; the table is left unchanged.
    pub fn add_record(&mut self, record: &TradeRecord) -> Result<()> {
        if !self.scope.contains(record.product()) {
            return Err(AnalysisError::OutOfScope {
                product: record.product().clone(),
                scope: self.scope.clone(),
            });
        }
        self.total = self
            .total
            .checked_add(record.value())
            .ok_or_else(|| AnalysisError::ValueOverflow {
                scope: self.scope.clone(),
                exporter: record.exporter().clone(),
            })?;
        let key = FlowKey {
            exporter: record.exporter().clone(),
            importer: record.importer().clone(),
            year: record.year(),
        };
        *self.flows.entry(key).or_insert(Decimal::ZERO) += record.value();
        self.record_count += 1;
        Ok(())
    }

    pub fn scope(&self) -> &ProductScope {
        &self.scope
    }

    /// Number of records merged into the table.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Number of distinct `(exporter, importer, year)` flows.
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// All flows in key order.
    pub fn flows(&self) -> impl Iterator<Item = (&FlowKey, Decimal)> + '_ {
        self.flows.iter().map(|(k, &v)| (k, v))
    }

    pub fn flow_value(&self, exporter: &CountryCode, importer: &CountryCode, year: Year) -> Decimal {
        let key = FlowKey {
            exporter: exporter.clone(),
            importer: importer.clone(),
            year,
        };
        self.flows.get(&key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn years(&self) -> BTreeSet<Year> {
        self.flows.keys().map(|k| k.year).collect()
    }

    pub fn exporters(&self) -> BTreeSet<&CountryCode> {
        self.flows.keys().map(|k| &k.exporter).collect()
    }

    pub fn importers(&self) -> BTreeSet<&CountryCode> {
        self.flows.keys().map(|k| &k.importer).collect()
    }

    pub fn total_value(&self) -> Decimal {
        self.total
    }

    /// Total imported by `country`, per year.
    pub fn yearly_imports(&self, country: &CountryCode) -> BTreeMap<Year, Decimal> {
        let mut totals = BTreeMap::new();
        for (key, value) in self.flows() {
            if &key.importer == country {
                *totals.entry(key.year).or_insert(Decimal::ZERO) += value;
            }
        }
        totals
    }

    /// Total exported by `country`, per year.
    pub fn yearly_exports(&self, country: &CountryCode) -> BTreeMap<Year, Decimal> {
        let mut totals = BTreeMap::new();
        for (key, value) in self.flows() {
            if &key.exporter == country {
                *totals.entry(key.year).or_insert(Decimal::ZERO) += value;
            }
        }
        totals
    }

    /// Total value shipped by each exporter across all importers and years.
    pub fn exporter_totals(&self) -> BTreeMap<&CountryCode, Decimal> {
        let mut totals = BTreeMap::new();
        for (key, value) in self.flows() {
            *totals.entry(&key.exporter).or_insert(Decimal::ZERO) += value;
        }
        totals
    }

    /// Total value received by each importer across all exporters and years.
    pub fn importer_totals(&self) -> BTreeMap<&CountryCode, Decimal> {
        let mut totals = BTreeMap::new();
        for (key, value) in self.flows() {
            *totals.entry(&key.importer).or_insert(Decimal::ZERO) += value;
        }
        totals
    }
}
