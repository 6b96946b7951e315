//! # supply-risk-engine
//!
//! Supply-chain concentration and disruption analytics over bilateral
//! trade flows.
//!
//! Given trade records (exporter, importer, product, year, value) for a
//! product scope, the engine aggregates a per-supplier distribution, scores
//! its concentration, diversity and substitutability, and simulates the loss
//! of suppliers to show how those scores would move.
//!
//! ## Architecture
//!
//! - **core** — Records, flow tables, the shared dataset handle, supplier distributions
//! - **analysis** — Aggregation, concentration and substitutability metrics, reports
//! - **simulation** — Disruption scenarios and synthetic flow generation
//! - **config** — Scoring choices (risk transform, substitutability mode)
//! - **error** — The error taxonomy shared by every operation

pub mod analysis;
pub mod config;
pub mod core;
pub mod error;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::analysis::aggregator::SupplierAggregator;
    pub use crate::analysis::concentration::ConcentrationMetrics;
    pub use crate::analysis::engine::RiskEngine;
    pub use crate::analysis::report::{MetricsReport, ScenarioComparison};
    pub use crate::analysis::substitutability::SubstitutabilityEstimator;
    pub use crate::config::{AnalysisConfig, RiskModel, RiskTransform, SubstitutabilityMode};
    pub use crate::core::country::CountryCode;
    pub use crate::core::dataset::TradeDataset;
    pub use crate::core::distribution::SupplierDistribution;
    pub use crate::core::flow_table::FlowTable;
    pub use crate::core::product::{ProductCode, ProductScope};
    pub use crate::core::record::{TradeRecord, Year, YearSelector};
    pub use crate::error::{AnalysisError, Result};
    pub use crate::simulation::disruption::{
        DisruptionScenario, DisruptionSimulator, RedistributionPolicy,
    };
}
