use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Harmonized System product code (e.g. "720851").
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::product::ProductCode;
///
/// let steel = ProductCode::new("720851");
/// assert_eq!(steel.as_str(), "720851");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductCode(String);

impl ProductCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ProductCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// The set of product codes an analysis covers.
///
/// Mapping a free-text query ("steel", "semiconductors") onto codes happens
/// outside the engine; the resolved codes arrive here, optionally with the
/// query as a display label.
///
/// An open scope (no codes) accepts every product.
///
/// # Examples
///
/// ```
/// use supply_risk_engine::core::product::{ProductCode, ProductScope};
///
/// let scope = ProductScope::labelled("steel", ["720851", "720852"]);
/// assert!(scope.contains(&ProductCode::new("720851")));
/// assert!(!scope.contains(&ProductCode::new("854231")));
/// assert_eq!(scope.to_string(), "steel");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductScope {
    codes: BTreeSet<ProductCode>,
    label: Option<String>,
}

impl ProductScope {
    /// A scope that accepts every product.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn new<I, P>(codes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductCode>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            label: None,
        }
    }

    pub fn labelled<I, P>(label: impl Into<String>, codes: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductCode>,
    {
        Self {
            label: Some(label.into()),
            ..Self::new(codes)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_open(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, product: &ProductCode) -> bool {
        self.is_open() || self.codes.contains(product)
    }

    pub fn codes(&self) -> &BTreeSet<ProductCode> {
        &self.codes
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl fmt::Display for ProductScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            return write!(f, "{}", label);
        }
        if self.codes.is_empty() {
            return write!(f, "all products");
        }
        let codes: Vec<&str> = self.codes.iter().map(|c| c.as_str()).collect();
        write!(f, "{}", codes.join(","))
    }
}
