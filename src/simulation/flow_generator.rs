//! Synthetic trade-flow generation for benchmarks and demos.
//!
//! Exporter sizes follow a rough power law so generated markets show the
//! skewed concentration real product categories have.

use crate::core::country::CountryCode;
use crate::core::product::ProductCode;
use crate::core::record::{TradeRecord, Year};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Configuration for a generated flow set.
#[derive(Debug, Clone)]
pub struct FlowNetworkConfig {
    pub exporter_count: usize,
    pub importer_count: usize,
    pub products: Vec<ProductCode>,
    pub first_year: Year,
    pub last_year: Year,
    /// Flows drawn per year.
    pub flows_per_year: usize,
    pub min_value: Decimal,
    pub max_value: Decimal,
    /// Fixed seed for reproducible output; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for FlowNetworkConfig {
    fn default() -> Self {
        Self {
            exporter_count: 20,
            importer_count: 10,
            products: vec![ProductCode::new("720851")],
            first_year: 2019,
            last_year: 2023,
            flows_per_year: 100,
            min_value: Decimal::from(10),
            max_value: Decimal::from(100_000),
            seed: None,
        }
    }
}

/// Generate random trade records.
pub fn generate_flows(config: &FlowNetworkConfig) -> Vec<TradeRecord> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut records = Vec::new();

    if config.exporter_count == 0
        || config.importer_count == 0
        || config.products.is_empty()
        || config.first_year > config.last_year
    {
        return records;
    }

    let exporters: Vec<CountryCode> = (0..config.exporter_count)
        .map(|i| CountryCode::new(format!("EX{:03}", i)))
        .collect();
    let importers: Vec<CountryCode> = (0..config.importer_count)
        .map(|i| CountryCode::new(format!("IM{:03}", i)))
        .collect();

    let low = config.min_value.to_f64().unwrap_or(0.0).max(0.0);
    let high = config.max_value.to_f64().unwrap_or(low);
    let high = if high > low { high } else { low + 1.0 };

    for year in config.first_year..=config.last_year {
        for _ in 0..config.flows_per_year {
            // squaring a uniform draw biases towards low indices: the first
            // exporters become the dominant suppliers
            let u: f64 = rng.gen();
            let exporter_idx = ((u * u) * exporters.len() as f64) as usize;
            let exporter_idx = exporter_idx.min(exporters.len() - 1);
            let importer_idx = rng.gen_range(0..importers.len());
            let product_idx = rng.gen_range(0..config.products.len());

            let value_f64 = rng.gen_range(low..high);
            let value = Decimal::from_f64_retain(value_f64)
                .unwrap_or(config.min_value)
                .round_dp(2);

            if let Ok(record) = TradeRecord::new(
                exporters[exporter_idx].clone(),
                importers[importer_idx].clone(),
                config.products[product_idx].clone(),
                year,
                value,
            ) {
                records.push(record);
            }
        }
    }

    records
}
