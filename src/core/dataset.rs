use crate::core::flow_table::FlowTable;
use crate::core::product::{ProductCode, ProductScope};
use crate::core::record::{TradeRecord, Year};
use crate::error::{AnalysisError, Result};
use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Read-only handle to the full source trade table.
///
/// Load it once at startup and clone the handle into every request: clones
/// share the same records, and nothing can mutate them afterwards. The
/// handle is `Send + Sync`, so independent analyses may slice it from
/// multiple threads without coordination.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::dataset::TradeDataset;
/// use supply_risk_engine::core::product::ProductScope;
/// use supply_risk_engine::core::record::TradeRecord;
/// use rust_decimal_macros::dec;
///
/// let dataset = TradeDataset::new(vec![
///     TradeRecord::new("CHN".into(), "USA".into(), "720851".into(), 2022, dec!(10)).unwrap(),
///     TradeRecord::new("KOR".into(), "USA".into(), "854231".into(), 2023, dec!(99)).unwrap(),
/// ]);
///
/// let steel = dataset
///     .flow_table(&ProductScope::new(["720851"]), None)
///     .unwrap();
/// assert_eq!(steel.record_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct TradeDataset {
    records: Arc<[TradeRecord]>,
}

impl TradeDataset {
    pub fn new(records: Vec<TradeRecord>) -> Self {
        log::info!("trade dataset loaded with {} records", records.len());
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[TradeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn years(&self) -> BTreeSet<Year> {
        self.records.iter().map(|r| r.year()).collect()
    }

    pub fn products(&self) -> BTreeSet<&ProductCode> {
        self.records.iter().map(|r| r.product()).collect()
    }

    /// Slice the dataset into a [`FlowTable`] for `scope`, optionally
    /// restricted to an inclusive year range.
    ///
    /// Fails with [`AnalysisError::EmptyInput`] when nothing matches.
    pub fn flow_table(
        &self,
        scope: &ProductScope,
        years: Option<RangeInclusive<Year>>,
    ) -> Result<FlowTable> {
        let matching = self.records.iter().filter(|r| {
            scope.contains(r.product())
                && years.as_ref().map_or(true, |range| range.contains(&r.year()))
        });

        let mut table = FlowTable::new(scope.clone());
        for record in matching {
            table.add_record(record)?;
        }

        if table.is_empty() {
            return Err(AnalysisError::EmptyInput {
                scope: scope.clone(),
                years: match &years {
                    Some(range) => format!("{}-{}", range.start(), range.end()),
                    None => "all years".to_string(),
                },
                importer: None,
            });
        }

        log::debug!(
            "sliced {} records into {} flows for {}",
            table.record_count(),
            table.flow_count(),
            scope
        );
        Ok(table)
    }
}

impl FromIterator<TradeRecord> for TradeDataset {
    fn from_iter<T: IntoIterator<Item = TradeRecord>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::country::CountryCode;
    use rust_decimal_macros::dec;
    use std::thread;

    fn sample() -> TradeDataset {
        vec![
            TradeRecord::new("CHN".into(), "USA".into(), "7208".into(), 2019, dec!(10)).unwrap(),
            TradeRecord::new("CHN".into(), "USA".into(), "7208".into(), 2023, dec!(20)).unwrap(),
            TradeRecord::new("KOR".into(), "USA".into(), "8542".into(), 2023, dec!(30)).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_flow_table_filters_scope_and_years() {
        let dataset = sample();
        let table = dataset
            .flow_table(&ProductScope::new(["7208"]), Some(2020..=2023))
            .unwrap();
        assert_eq!(table.record_count(), 1);
        assert_eq!(
            table.flow_value(&CountryCode::new("CHN"), &CountryCode::new("USA"), 2023),
            dec!(20)
        );
    }

    #[test]
    fn test_empty_slice_is_an_error() {
        let dataset = sample();
        let err = dataset
            .flow_table(&ProductScope::new(["0101"]), None)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyInput { .. }));
    }

    #[test]
    fn test_handle_is_shared_across_threads() {
        let dataset = sample();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ds = dataset.clone();
                thread::spawn(move || ds.flow_table(&ProductScope::open(), None).unwrap().flow_count())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 3);
        }
    }
}
