//! Supplier aggregation, concentration and substitutability metrics, and
//! the reports built from them.

pub mod aggregator;
pub mod concentration;
pub mod engine;
pub mod report;
pub mod substitutability;
pub mod trade_summary;
