//! Descriptive trade statistics that accompany the risk metrics: a focal
//! country's import/export trend and balance, and whole-dataset summaries.

use crate::core::country::CountryCode;
use crate::core::dataset::TradeDataset;
use crate::core::flow_table::FlowTable;
use crate::core::product::{ProductCode, ProductScope};
use crate::core::record::Year;
use crate::error::{AnalysisError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A labelled value in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<K> {
    pub key: K,
    pub value: Decimal,
}

/// Exporter → importer pair and its total value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairValue {
    pub exporter: CountryCode,
    pub importer: CountryCode,
    pub value: Decimal,
}

/// One year of a focal country's trade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTrade {
    pub year: Year,
    pub imports: Decimal,
    pub exports: Decimal,
    /// `exports - imports`.
    pub balance: Decimal,
}

/// Trade picture for one focal country within a flow table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketOverview {
    pub focal: CountryCode,
    pub yearly: Vec<YearlyTrade>,
    pub total_imports: Decimal,
    pub total_exports: Decimal,
    pub trade_balance: Decimal,
    /// Import growth between the two latest import years, in percent.
    /// `None` with fewer than two years or a zero base year.
    pub import_growth_pct: Option<f64>,
    /// Focal imports as a share of all flows in the table.
    pub focal_import_share: Option<f64>,
    pub top_exporters: Vec<Ranked<CountryCode>>,
    pub top_importers: Vec<Ranked<CountryCode>>,
    pub top_suppliers: Vec<Ranked<CountryCode>>,
    pub focal_supplier_count: usize,
    pub global_exporter_count: usize,
}

impl MarketOverview {
    pub fn compute(table: &FlowTable, focal: &CountryCode, top_n: usize) -> Result<Self> {
        if table.is_empty() {
            return Err(AnalysisError::EmptyInput {
                scope: table.scope().clone(),
                years: "all years".to_string(),
                importer: Some(focal.clone()),
            });
        }

        let imports = table.yearly_imports(focal);
        let exports = table.yearly_exports(focal);
        let years: BTreeSet<Year> = imports.keys().chain(exports.keys()).copied().collect();

        let yearly: Vec<YearlyTrade> = years
            .into_iter()
            .map(|year| {
                let imp = imports.get(&year).copied().unwrap_or(Decimal::ZERO);
                let exp = exports.get(&year).copied().unwrap_or(Decimal::ZERO);
                YearlyTrade {
                    year,
                    imports: imp,
                    exports: exp,
                    balance: exp - imp,
                }
            })
            .collect();

        let total_imports: Decimal = imports.values().copied().sum();
        let total_exports: Decimal = exports.values().copied().sum();

        let import_values: Vec<Decimal> = imports.values().copied().collect();
        let import_growth_pct = match import_values.as_slice() {
            [.., previous, latest] if !previous.is_zero() => {
                ((*latest - *previous) / *previous * Decimal::from(100)).to_f64()
            }
            _ => None,
        };

        let table_total = table.total_value();
        let focal_import_share = if table_total.is_zero() {
            None
        } else {
            (total_imports / table_total).to_f64()
        };

        let mut supplier_totals: BTreeMap<&CountryCode, Decimal> = BTreeMap::new();
        for (key, value) in table.flows() {
            if &key.importer == focal {
                *supplier_totals.entry(&key.exporter).or_insert(Decimal::ZERO) += value;
            }
        }

        let exporter_totals = table.exporter_totals();
        Ok(Self {
            focal: focal.clone(),
            yearly,
            total_imports,
            total_exports,
            trade_balance: total_exports - total_imports,
            import_growth_pct,
            focal_import_share,
            top_importers: top_n_of(table.importer_totals(), top_n),
            focal_supplier_count: supplier_totals.len(),
            global_exporter_count: exporter_totals.len(),
            top_suppliers: top_n_of(supplier_totals, top_n),
            top_exporters: top_n_of(exporter_totals, top_n),
        })
    }
}

impl fmt::Display for MarketOverview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Market Overview: {} ===", self.focal)?;
        writeln!(f, "{:<8}{:>16}{:>16}{:>16}", "Year", "Imports", "Exports", "Balance")?;
        for y in &self.yearly {
            writeln!(
                f,
                "{:<8}{:>16}{:>16}{:>16}",
                y.year, y.imports, y.exports, y.balance
            )?;
        }
        writeln!(f, "Trade Balance:    {}", self.trade_balance)?;
        match self.import_growth_pct {
            Some(g) => writeln!(f, "Import Growth:    {:+.1}%", g)?,
            None => writeln!(f, "Import Growth:    n/a")?,
        }
        if let Some(share) = self.focal_import_share {
            writeln!(f, "Share of Flows:   {:.1}%", share * 100.0)?;
        }
        writeln!(
            f,
            "Suppliers:        {} of {} exporters",
            self.focal_supplier_count, self.global_exporter_count
        )?;
        writeln!(f, "\nTop Suppliers to {}:", self.focal)?;
        for r in &self.top_suppliers {
            writeln!(f, "  {:<12}{:>16}", r.key, r.value)?;
        }
        writeln!(f, "\nTop Exporters:")?;
        for r in &self.top_exporters {
            writeln!(f, "  {:<12}{:>16}", r.key, r.value)?;
        }
        writeln!(f, "\nTop Importers:")?;
        for r in &self.top_importers {
            writeln!(f, "  {:<12}{:>16}", r.key, r.value)?;
        }
        Ok(())
    }
}

/// Descriptive statistics over a whole dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub record_count: usize,
    pub year_count: usize,
    pub exporter_count: usize,
    pub importer_count: usize,
    pub product_count: usize,
    pub total_value: Decimal,
    pub top_products: Vec<Ranked<ProductCode>>,
    pub top_pairs: Vec<PairValue>,
    pub yearly_totals: BTreeMap<Year, Decimal>,
}

impl DatasetSummary {
    /// Fails with [`AnalysisError::ValueOverflow`] when the dataset total does
    /// not fit in a `Decimal`. Every other sum is bounded by that total.
    pub fn compute(dataset: &TradeDataset, top_n: usize) -> Result<Self> {
        let mut total_value = Decimal::ZERO;
        let mut exporters = BTreeSet::new();
        let mut importers = BTreeSet::new();
        let mut products: BTreeMap<&ProductCode, Decimal> = BTreeMap::new();
        let mut pairs: BTreeMap<(&CountryCode, &CountryCode), Decimal> = BTreeMap::new();
        let mut yearly_totals: BTreeMap<Year, Decimal> = BTreeMap::new();

        for record in dataset.records() {
            total_value = total_value.checked_add(record.value()).ok_or_else(|| {
                AnalysisError::ValueOverflow {
                    scope: ProductScope::open(),
                    exporter: record.exporter().clone(),
                }
            })?;
            exporters.insert(record.exporter());
            importers.insert(record.importer());
            *products.entry(record.product()).or_insert(Decimal::ZERO) += record.value();
            *pairs
                .entry((record.exporter(), record.importer()))
                .or_insert(Decimal::ZERO) += record.value();
            *yearly_totals.entry(record.year()).or_insert(Decimal::ZERO) += record.value();
        }

        let mut top_pairs: Vec<PairValue> = pairs
            .into_iter()
            .map(|((exporter, importer), value)| PairValue {
                exporter: exporter.clone(),
                importer: importer.clone(),
                value,
            })
            .collect();
        // stable sort keeps key order among equal values
        top_pairs.sort_by(|a, b| b.value.cmp(&a.value));
        top_pairs.truncate(top_n);

        Ok(Self {
            record_count: dataset.len(),
            year_count: yearly_totals.len(),
            exporter_count: exporters.len(),
            importer_count: importers.len(),
            product_count: products.len(),
            total_value,
            top_products: top_n_of(products, top_n),
            top_pairs,
            yearly_totals,
        })
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Dataset Summary ===")?;
        writeln!(f, "Records:   {}", self.record_count)?;
        writeln!(f, "Years:     {}", self.year_count)?;
        writeln!(f, "Exporters: {}", self.exporter_count)?;
        writeln!(f, "Importers: {}", self.importer_count)?;
        writeln!(f, "Products:  {}", self.product_count)?;
        writeln!(f, "Total:     {}", self.total_value)?;
        writeln!(f, "\nTop Products:")?;
        for r in &self.top_products {
            writeln!(f, "  {:<10}{:>18}", r.key, r.value)?;
        }
        writeln!(f, "\nTop Pairs:")?;
        for p in &self.top_pairs {
            writeln!(f, "  {} → {:<10}{:>18}", p.exporter, p.importer, p.value)?;
        }
        writeln!(f, "\nTotal by Year:")?;
        for (year, total) in &self.yearly_totals {
            writeln!(f, "  {:<6}{:>18}", year, total)?;
        }
        Ok(())
    }
}

/// Largest `n` entries, ties broken by key.
fn top_n_of<K: Clone + Ord>(totals: BTreeMap<&K, Decimal>, n: usize) -> Vec<Ranked<K>> {
    let mut ranked: Vec<Ranked<K>> = totals
        .into_iter()
        .map(|(key, value)| Ranked {
            key: key.clone(),
            value,
        })
        .collect();
    ranked.sort_by(|a, b| b.value.cmp(&a.value));
    ranked.truncate(n);
    ranked
}
