use crate::core::country::CountryCode;
use crate::core::product::ProductScope;
use crate::core::record::YearSelector;
use crate::error::{AnalysisError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Where a distribution came from. Only used to label errors and reports.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DistributionContext {
    pub scope: ProductScope,
    pub years: Option<YearSelector>,
    pub importer: Option<CountryCode>,
}

impl DistributionContext {
    pub fn years_label(&self) -> String {
        match &self.years {
            Some(selector) => selector.to_string(),
            None => "unspecified years".to_string(),
        }
    }
}

/// Aggregated trade value per exporting country.
///
/// Built once by the aggregator (or directly from values) and never edited
/// afterwards; the disruption simulator always returns a new distribution.
///
/// Zero-valued entries carry no weight: a distribution that keeps a supplier
/// at zero compares equal to one that omits it.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::country::CountryCode;
/// use supply_risk_engine::core::distribution::SupplierDistribution;
///
/// let dist = SupplierDistribution::from_values([("CHN", 60.0), ("MEX", 30.0), ("DEU", 10.0)]).unwrap();
/// assert_eq!(dist.total(), 100.0);
/// assert_eq!(dist.supplier_count(), 3);
///
/// let ranked = dist.ranked();
/// assert_eq!(ranked[0].0, &CountryCode::new("CHN"));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct SupplierDistribution {
    values: BTreeMap<CountryCode, f64>,
    total: f64,
    context: DistributionContext,
}

impl SupplierDistribution {
    /// Build a distribution from `(exporter, value)` pairs.
    ///
    /// Repeated exporters are summed. Negative, NaN or infinite values are
    /// rejected.
    pub fn from_values<I, C>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<CountryCode>,
    {
        let mut map: BTreeMap<CountryCode, f64> = BTreeMap::new();
        for (code, value) in values {
            let code = code.into();
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidValue {
                    supplier: code,
                    value,
                });
            }
            *map.entry(code).or_insert(0.0) += value;
        }
        Ok(Self::from_map(map, DistributionContext::default()))
    }

    /// Internal constructor for already-validated values.
    pub(crate) fn from_map(values: BTreeMap<CountryCode, f64>, context: DistributionContext) -> Self {
        let total = values.values().sum();
        Self {
            values,
            total,
            context,
        }
    }

    pub fn context(&self) -> &DistributionContext {
        &self.context
    }

    /// Sum of all entries.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Every entry, zero-valued ones included, in code order.
    pub fn values(&self) -> &BTreeMap<CountryCode, f64> {
        &self.values
    }

    /// Value for `supplier`, zero when absent.
    pub fn get(&self, supplier: &CountryCode) -> f64 {
        self.values.get(supplier).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, supplier: &CountryCode) -> bool {
        self.values.contains_key(supplier)
    }

    /// Number of suppliers with a positive value.
    pub fn supplier_count(&self) -> usize {
        self.values.values().filter(|v| **v > 0.0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.supplier_count() == 0
    }

    /// Share of the total held by `supplier`, `None` when the total is zero.
    pub fn share(&self, supplier: &CountryCode) -> Option<f64> {
        if self.total > 0.0 {
            Some(self.get(supplier) / self.total)
        } else {
            None
        }
    }

    /// Suppliers with positive value, largest first; ties go to the lower code.
    pub fn ranked(&self) -> Vec<(&CountryCode, f64)> {
        let mut ranked: Vec<(&CountryCode, f64)> = self
            .values
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(c, &v)| (c, v))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
    }

    /// Compare active entries within a relative tolerance of the larger total.
    pub fn approx_eq(&self, other: &Self, relative_tolerance: f64) -> bool {
        let scale = self.total.abs().max(other.total.abs()).max(f64::MIN_POSITIVE);
        let tolerance = relative_tolerance * scale;
        self.values
            .keys()
            .chain(other.values.keys())
            .all(|code| (self.get(code) - other.get(code)).abs() <= tolerance)
    }
}

impl PartialEq for SupplierDistribution {
    fn eq(&self, other: &Self) -> bool {
        let active = |d: &Self| -> Vec<(CountryCode, f64)> {
            d.values
                .iter()
                .filter(|(_, v)| **v != 0.0)
                .map(|(c, &v)| (c.clone(), v))
                .collect()
        };
        active(self) == active(other)
    }
}
