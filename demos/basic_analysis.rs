//! Baseline supply-risk analysis example.
//!
//! Scores how concentrated US imports of a product are, first for a single
//! year and then averaged over several years.

use rust_decimal_macros::dec;
use supply_risk_engine::prelude::*;

fn record(exporter: &str, year: Year, value: rust_decimal::Decimal) -> TradeRecord {
    TradeRecord::new(exporter.into(), "USA".into(), "720851".into(), year, value)
        .expect("demo values are non-negative")
}

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  supply-risk-engine: Basic Analysis        ║");
    println!("╚════════════════════════════════════════════╝\n");

    let dataset = TradeDataset::new(vec![
        record("CHN", 2021, dec!(420_000_000)),
        record("KOR", 2021, dec!(180_000_000)),
        record("RUS", 2021, dec!(150_000_000)),
        record("MEX", 2021, dec!(90_000_000)),
        record("CHN", 2022, dec!(460_000_000)),
        record("KOR", 2022, dec!(200_000_000)),
        record("MEX", 2022, dec!(110_000_000)),
        record("CHN", 2023, dec!(510_000_000)),
        record("KOR", 2023, dec!(190_000_000)),
        record("MEX", 2023, dec!(140_000_000)),
        record("JPN", 2023, dec!(40_000_000)),
    ]);

    let scope = ProductScope::labelled("flat-rolled steel", ["720851"]);
    let table = dataset
        .flow_table(&scope, None)
        .expect("dataset covers the scope");
    let engine = RiskEngine::new(AnalysisConfig::default()).expect("default config is valid");
    let usa = CountryCode::new("USA");

    // --- Scenario 1: a single year ---
    println!("━━━ Scenario 1: 2023 Only ━━━\n");

    let latest = engine
        .analyze_for_importer(&table, &usa, YearSelector::Single(2023))
        .expect("2023 has flows");
    println!("{}", latest);
    for row in latest.top_suppliers(3) {
        println!("  {:<5} {:>6.1}%", row.supplier, row.share * 100.0);
    }
    println!();

    // --- Scenario 2: multi-year average ---
    println!("━━━ Scenario 2: Average 2021-2023 ━━━\n");

    let average = engine
        .analyze_for_importer(&table, &usa, YearSelector::AverageRange { from: 2021, to: 2023 })
        .expect("range has flows");
    println!("{}", average);
    println!(
        "RUS averaged over three years: {:.0}",
        average.distribution.get(&CountryCode::new("RUS"))
    );
    println!();

    // --- Scenario 3: who is hardest to replace ---
    println!("━━━ Scenario 3: Replaceability by Supplier ━━━\n");

    let scores = engine
        .supplier_substitutability(&latest)
        .expect("baseline has suppliers");
    for s in scores {
        println!(
            "  {:<5} share {:>5.1}%  risk if lost {:.3}  substitutability {:.3}",
            s.supplier,
            s.share * 100.0,
            s.risk_after,
            s.score
        );
    }
}
