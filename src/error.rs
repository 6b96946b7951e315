use crate::core::country::CountryCode;
use crate::core::product::{ProductCode, ProductScope};
use crate::core::record::Year;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the analysis pipeline.
///
/// Every variant is a recoverable, caller-facing condition. None of them
/// indicate a bug in the engine; they carry enough context (scope, years,
/// offending suppliers) for the surrounding application to explain the
/// problem to a user.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No trade records exist for the requested scope.
    #[error("no trade records for {scope} ({years}{})", importer_suffix(.importer))]
    EmptyInput {
        scope: ProductScope,
        years: String,
        importer: Option<CountryCode>,
    },

    /// The distribution has zero total value, so shares are undefined.
    #[error("supplier distribution for {scope} ({years}) has zero total value")]
    EmptyDistribution { scope: ProductScope, years: String },

    /// A disruption scenario names suppliers absent from the distribution.
    #[error("unknown supplier(s) in disruption scenario: {}", join_codes(.suppliers))]
    UnknownSupplier { suppliers: Vec<CountryCode> },

    /// A disruption scenario removes every supplier with positive volume.
    #[error("scenario removes all supply for {scope}: {}", join_codes(.removed))]
    TotalDisruption {
        scope: ProductScope,
        removed: Vec<CountryCode>,
    },

    #[error("invalid trade record {exporter} -> {importer} ({year}): value {value} is negative")]
    InvalidRecord {
        exporter: CountryCode,
        importer: CountryCode,
        year: Year,
        value: Decimal,
    },

    #[error("product {product} is outside scope {scope}")]
    OutOfScope {
        product: ProductCode,
        scope: ProductScope,
    },

    /// A sum of trade values left the range `Decimal` can represent.
    #[error("trade value for {exporter} in {scope} exceeds the representable range")]
    ValueOverflow {
        scope: ProductScope,
        exporter: CountryCode,
    },

    #[error("supplier {supplier} has invalid value {value}")]
    InvalidValue { supplier: CountryCode, value: f64 },

    #[error("metric {metric} evaluated to a non-finite value")]
    NonFiniteMetric { metric: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

fn join_codes(codes: &[CountryCode]) -> String {
    codes
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn importer_suffix(importer: &Option<CountryCode>) -> String {
    match importer {
        Some(code) => format!(", importer {}", code),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_supplier_message_lists_codes() {
        let err = AnalysisError::UnknownSupplier {
            suppliers: vec![CountryCode::new("XXX"), CountryCode::new("YYY")],
        };
        assert_eq!(
            err.to_string(),
            "unknown supplier(s) in disruption scenario: XXX, YYY"
        );
    }

    #[test]
    fn test_empty_input_message_mentions_importer() {
        let err = AnalysisError::EmptyInput {
            scope: ProductScope::labelled("steel", ["7208"]),
            years: "2023".to_string(),
            importer: Some(CountryCode::new("USA")),
        };
        assert_eq!(
            err.to_string(),
            "no trade records for steel (2023, importer USA)"
        );
    }
}
