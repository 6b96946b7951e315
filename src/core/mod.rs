//! Foundational types: trade records, flow tables, the shared dataset
//! handle and supplier distributions.

pub mod country;
pub mod dataset;
pub mod distribution;
pub mod flow_table;
pub mod product;
pub mod record;
