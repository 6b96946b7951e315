//! Disruption scenarios and synthetic flow generation.

pub mod disruption;
pub mod flow_generator;
