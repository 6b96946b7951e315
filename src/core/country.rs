use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for a trading country (exporter or importer).
///
/// Codes are compared verbatim. Callers pick one convention (ISO 3166-1
/// alpha-3 such as "USA", or full dataset names) and stick with it across a
/// dataset; the engine never translates between conventions.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::country::CountryCode;
///
/// let china = CountryCode::new("CHN");
/// let mexico = CountryCode::new("MEX");
/// assert_ne!(china, mexico);
/// assert!(china < mexico);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a comma-separated list such as `"CHN, MEX,DEU"`.
    /// Blank items are skipped.
    pub fn parse_list(list: &str) -> Vec<CountryCode> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(CountryCode::new)
            .collect()
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for CountryCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CountryCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_ordering() {
        let a = CountryCode::new("BRA");
        let b = CountryCode::new("CHN");
        assert!(a < b);
    }

    #[test]
    fn test_parse_list_trims_and_skips_blanks() {
        let codes = CountryCode::parse_list(" CHN, MEX ,,DEU ");
        assert_eq!(
            codes,
            vec![
                CountryCode::new("CHN"),
                CountryCode::new("MEX"),
                CountryCode::new("DEU")
            ]
        );
    }
}
