use crate::core::country::CountryCode;
use crate::core::product::ProductCode;
use crate::error::{AnalysisError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar year of a trade flow.
pub type Year = i32;

/// Which years a supplier distribution summarises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearSelector {
    /// Totals for one year.
    Single(Year),
    /// Annual average over every year present in the table.
    Average,
    /// Annual average over the years present within `from..=to`.
    AverageRange { from: Year, to: Year },
}

impl YearSelector {
    pub fn includes(&self, year: Year) -> bool {
        match *self {
            YearSelector::Single(y) => y == year,
            YearSelector::Average => true,
            YearSelector::AverageRange { from, to } => (from..=to).contains(&year),
        }
    }

    pub fn is_average(&self) -> bool {
        !matches!(self, YearSelector::Single(_))
    }
}

impl fmt::Display for YearSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSelector::Single(y) => write!(f, "{}", y),
            YearSelector::Average => write!(f, "average of all years"),
            YearSelector::AverageRange { from, to } => write!(f, "average {}-{}", from, to),
        }
    }
}

/// One bilateral trade flow: `exporter` shipped `value` worth of `product`
/// to `importer` during `year`.
///
/// Records are immutable once created. Values share a single currency unit
/// across a dataset (the source data uses thousands of USD).
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::country::CountryCode;
/// use supply_risk_engine::core::product::ProductCode;
/// use supply_risk_engine::core::record::TradeRecord;
/// use rust_decimal_macros::dec;
///
/// let record = TradeRecord::new(
///     CountryCode::new("CHN"),
///     CountryCode::new("USA"),
///     ProductCode::new("720851"),
///     2023,
///     dec!(1250.5),
/// ).unwrap();
///
/// assert_eq!(record.value(), dec!(1250.5));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    exporter: CountryCode,
    importer: CountryCode,
    product: ProductCode,
    year: Year,
    value: Decimal,
}

impl TradeRecord {
    /// Create a record, rejecting negative values.
    pub fn new(
        exporter: CountryCode,
        importer: CountryCode,
        product: ProductCode,
        year: Year,
        value: Decimal,
    ) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(AnalysisError::InvalidRecord {
                exporter,
                importer,
                year,
                value,
            });
        }
        Ok(Self {
            exporter,
            importer,
            product,
            year,
            value,
        })
    }

    // --- Accessors ---

    pub fn exporter(&self) -> &CountryCode {
        &self.exporter
    }

    pub fn importer(&self) -> &CountryCode {
        &self.importer
    }

    pub fn product(&self) -> &ProductCode {
        &self.product
    }

    pub fn year(&self) -> Year {
        self.year
    }

    pub fn value(&self) -> Decimal {
        self.value
    }
}
