//! Disruption scenario example.
//!
//! Removes suppliers from a baseline and compares the two redistribution
//! policies, including the failure modes a caller has to handle.

use supply_risk_engine::prelude::*;

fn main() {
    println!("╔════════════════════════════════════════════╗");
    println!("║  supply-risk-engine: Disruption Scenarios  ║");
    println!("╚════════════════════════════════════════════╝\n");

    let engine = RiskEngine::new(AnalysisConfig::default()).expect("default config is valid");
    let distribution = SupplierDistribution::from_values([
        ("TWN", 55.0),
        ("KOR", 20.0),
        ("CHN", 12.0),
        ("MYS", 8.0),
        ("VNM", 5.0),
    ])
    .expect("demo values are valid");
    let baseline = MetricsReport::build(distribution, engine.model()).expect("total is positive");

    println!("{}", baseline);

    // --- Scenario 1: lose the dominant supplier ---
    for policy in [RedistributionPolicy::Proportional, RedistributionPolicy::BestFit] {
        println!("━━━ Lose TWN ({}) ━━━\n", policy);
        let scenario = DisruptionScenario::new(["TWN"], policy);
        let comparison = engine
            .simulate(&baseline, &scenario)
            .expect("TWN is a known supplier");
        println!("{}", comparison);
    }

    // --- Scenario 2: several scenarios against one baseline ---
    println!("━━━ Batch of Scenarios ━━━\n");

    let scenarios = vec![
        DisruptionScenario::new(["CHN"], RedistributionPolicy::Proportional),
        DisruptionScenario::new(["KOR", "CHN"], RedistributionPolicy::BestFit),
        DisruptionScenario::new(["BRA"], RedistributionPolicy::Proportional),
        DisruptionScenario::new(
            ["TWN", "KOR", "CHN", "MYS", "VNM"],
            RedistributionPolicy::Proportional,
        ),
    ];

    for (scenario, result) in scenarios.iter().zip(engine.simulate_many(&baseline, &scenarios)) {
        match result {
            Ok(comparison) => println!(
                "  {:<36} risk {:.3} → {:.3} ({:+.3})",
                scenario.to_string(),
                comparison.baseline.risk_score,
                comparison.disrupted.risk_score,
                comparison.risk_delta()
            ),
            Err(e) => println!("  {:<36} {}", scenario.to_string(), e),
        }
    }
}
