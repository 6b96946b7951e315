use proptest::prelude::*;
use rust_decimal::Decimal;
use supply_risk_engine::analysis::aggregator::SupplierAggregator;
use supply_risk_engine::analysis::concentration::ConcentrationMetrics;
use supply_risk_engine::analysis::substitutability::SubstitutabilityEstimator;
use supply_risk_engine::config::{
    AnalysisConfig, RiskModel, RiskTransform, SubstitutabilityMode,
};
use supply_risk_engine::core::country::CountryCode;
use supply_risk_engine::core::distribution::SupplierDistribution;
use supply_risk_engine::core::flow_table::FlowTable;
use supply_risk_engine::core::product::ProductScope;
use supply_risk_engine::core::record::{TradeRecord, YearSelector};
use supply_risk_engine::simulation::disruption::{
    DisruptionScenario, DisruptionSimulator, RedistributionPolicy,
};

const POOL: [&str; 8] = ["AUS", "BRA", "CHN", "DEU", "IND", "KOR", "MEX", "USA"];

/// Generate a supplier code from a small pool (so repeats get summed).
fn arb_country() -> impl Strategy<Value = CountryCode> {
    prop::sample::select(POOL.to_vec()).prop_map(CountryCode::new)
}

/// Generate a positive trade value (0.01 to 10,000,000).
fn arb_value() -> impl Strategy<Value = f64> {
    (1u64..1_000_000_000u64).prop_map(|cents| cents as f64 / 100.0)
}

/// Generate a non-empty distribution with a positive total.
fn arb_distribution() -> impl Strategy<Value = SupplierDistribution> {
    prop::collection::vec((arb_country(), arb_value()), 1..20).prop_map(|entries| {
        SupplierDistribution::from_values(entries).expect("generated values are valid")
    })
}

fn arb_policy() -> impl Strategy<Value = RedistributionPolicy> {
    prop_oneof![
        Just(RedistributionPolicy::Proportional),
        Just(RedistributionPolicy::BestFit),
    ]
}

fn arb_model() -> impl Strategy<Value = RiskModel> {
    let transform = prop_oneof![
        Just(RiskTransform::Herfindahl),
        (3usize..20).prop_map(|n| RiskTransform::Normalized {
            plausible_suppliers: n
        }),
    ];
    let mode = prop_oneof![
        Just(SubstitutabilityMode::AbsoluteIncrease),
        Just(SubstitutabilityMode::RelativeHeadroom),
    ];
    (transform, mode).prop_map(|(risk_transform, substitutability)| RiskModel {
        risk_transform,
        substitutability,
    })
}

/// Generate a trade record for one product over a few years.
fn arb_record() -> impl Strategy<Value = TradeRecord> {
    (arb_country(), arb_country(), 2019i32..2024, 0u64..1_000_000u64).prop_map(
        |(exporter, importer, year, cents)| {
            TradeRecord::new(
                exporter,
                importer,
                "7208".into(),
                year,
                Decimal::new(cents as i64, 2),
            )
            .expect("generated values are non-negative")
        },
    )
}

/// Pick a subset of the suppliers present in `dist` that leaves at least one.
fn partial_removal(dist: &SupplierDistribution, mask: &[bool]) -> Vec<CountryCode> {
    let suppliers: Vec<CountryCode> = dist.ranked().into_iter().map(|(c, _)| c.clone()).collect();
    let mut removed: Vec<CountryCode> = suppliers
        .iter()
        .zip(mask.iter().cycle())
        .filter(|(_, drop)| **drop)
        .map(|(c, _)| c.clone())
        .collect();
    if removed.len() == suppliers.len() {
        removed.pop();
    }
    removed
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Every metric is bounded and top-3 dominates top-1.
    //
    // topSupplierShare ∈ [0,1], top3 ∈ [top1, 1], risk ∈ [0,1] and
    // diversity is exactly its complement, under every risk model.
    // ===================================================================
    #[test]
    fn metrics_are_bounded(dist in arb_distribution(), model in arb_model()) {
        let m = ConcentrationMetrics::compute_with(&dist, &model).unwrap();

        prop_assert!((0.0..=1.0).contains(&m.top_supplier_share));
        prop_assert!(m.top3_concentration >= m.top_supplier_share - 1e-12);
        prop_assert!(m.top3_concentration <= 1.0);
        prop_assert!((0.0..=1.0).contains(&m.risk_score));
        prop_assert!((m.diversity_score - (1.0 - m.risk_score)).abs() < 1e-12);
        prop_assert!(m.herfindahl > 0.0 && m.herfindahl <= 1.0 + 1e-12);
        prop_assert!(m.supplier_count >= 1);
    }

    // ===================================================================
    // INVARIANT 2: Disruption conserves total volume.
    //
    // For every successful simulation the output total equals the input
    // total to 1e-9 relative, under both redistribution policies.
    // ===================================================================
    #[test]
    fn disruption_conserves_volume(
        dist in arb_distribution(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
        policy in arb_policy(),
    ) {
        let removed = partial_removal(&dist, &mask);
        let scenario = DisruptionScenario::new(removed.clone(), policy);
        let after = DisruptionSimulator::simulate(&dist, &scenario).unwrap();

        let relative = (after.total() - dist.total()).abs() / dist.total();
        prop_assert!(relative <= 1e-9, "total drifted by {}", relative);
        for code in &removed {
            prop_assert_eq!(after.get(code), 0.0);
        }
    }

    // ===================================================================
    // INVARIANT 3: Metrics are a pure function of the distribution.
    // ===================================================================
    #[test]
    fn metrics_are_idempotent(dist in arb_distribution(), model in arb_model()) {
        let first = ConcentrationMetrics::compute_with(&dist, &model).unwrap();
        let second = ConcentrationMetrics::compute_with(&dist, &model).unwrap();
        prop_assert_eq!(first, second);
    }

    // ===================================================================
    // INVARIANT 4: Aggregation does not depend on record order.
    // ===================================================================
    #[test]
    fn aggregation_is_order_independent(
        records in prop::collection::vec(arb_record(), 1..60),
        rotate in 0usize..60,
    ) {
        let scope = ProductScope::new(["7208"]);
        let mut shuffled = records.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotate % len);

        let a = FlowTable::from_records(scope.clone(), records).unwrap();
        let b = FlowTable::from_records(scope, shuffled).unwrap();

        for selector in [YearSelector::Average, YearSelector::Single(2021)] {
            let da = SupplierAggregator::aggregate(&a, selector);
            let db = SupplierAggregator::aggregate(&b, selector);
            prop_assert_eq!(da, db);
        }
    }

    // ===================================================================
    // INVARIANT 5: Growing the top supplier never lowers risk.
    //
    // With every other supplier fixed, raising the largest value raises
    // its share and can only push the Herfindahl index up.
    // ===================================================================
    #[test]
    fn risk_grows_with_top_supplier(
        dist in arb_distribution(),
        extra in arb_value(),
        model in arb_model(),
    ) {
        let before = ConcentrationMetrics::compute_with(&dist, &model).unwrap();

        let (top, _) = dist.ranked()[0];
        let top = top.clone();
        let grown = SupplierDistribution::from_values(
            dist.values()
                .iter()
                .map(|(code, &v)| (code.clone(), if *code == top { v + extra } else { v })),
        )
        .unwrap();
        let after = ConcentrationMetrics::compute_with(&grown, &model).unwrap();

        prop_assert!(after.top_supplier_share >= before.top_supplier_share - 1e-12);
        prop_assert!(after.risk_score >= before.risk_score - 1e-12);
    }

    // ===================================================================
    // INVARIANT 6: Substitutability stays in [0,1] for every supplier.
    // ===================================================================
    #[test]
    fn substitutability_is_bounded(dist in arb_distribution(), model in arb_model()) {
        let score = SubstitutabilityEstimator::estimate_with(&dist, &model).unwrap();
        prop_assert!((0.0..=1.0).contains(&score));

        for s in SubstitutabilityEstimator::per_supplier(&dist, &model).unwrap() {
            prop_assert!((0.0..=1.0).contains(&s.score));
            prop_assert!((0.0..=1.0).contains(&s.risk_after));
        }
    }

    // ===================================================================
    // INVARIANT 7: Best fit is never less concentrated than proportional.
    // ===================================================================
    #[test]
    fn best_fit_bounds_risk_from_above(
        dist in arb_distribution(),
        mask in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let removed = partial_removal(&dist, &mask);
        let proportional = DisruptionSimulator::simulate(
            &dist,
            &DisruptionScenario::new(removed.clone(), RedistributionPolicy::Proportional),
        )
        .unwrap();
        let best_fit = DisruptionSimulator::simulate(
            &dist,
            &DisruptionScenario::new(removed, RedistributionPolicy::BestFit),
        )
        .unwrap();

        let p = ConcentrationMetrics::compute(&proportional).unwrap();
        let b = ConcentrationMetrics::compute(&best_fit).unwrap();
        prop_assert!(b.herfindahl >= p.herfindahl - 1e-12);
    }

    // ===================================================================
    // INVARIANT 8: Any duopoly is more substitutable than a monopoly.
    //
    // Holds for every configuration `validate()` accepts with the default
    // absolute-increase scoring, whatever the risk transform.
    // ===================================================================
    #[test]
    fn duopoly_beats_monopoly_under_valid_configs(
        plausible in 1usize..20,
        normalized in any::<bool>(),
        split in 50u32..100,
    ) {
        let risk_transform = if normalized {
            RiskTransform::Normalized { plausible_suppliers: plausible }
        } else {
            RiskTransform::Herfindahl
        };
        let config = AnalysisConfig {
            risk_transform,
            substitutability: SubstitutabilityMode::AbsoluteIncrease,
            ..Default::default()
        };
        prop_assume!(config.validate().is_ok());
        let model = config.validate().unwrap();

        let top = f64::from(split);
        let monopoly = SupplierDistribution::from_values([("A", 100.0)]).unwrap();
        let duopoly = SupplierDistribution::from_values([("A", top), ("B", 100.0 - top)]).unwrap();

        let mono = SubstitutabilityEstimator::estimate_with(&monopoly, &model).unwrap();
        let duo = SubstitutabilityEstimator::estimate_with(&duopoly, &model).unwrap();
        prop_assert!(duo > mono, "duopoly {} vs monopoly {} under {:?}", duo, mono, model);
    }
}

#[test]
fn duopoly_scores_above_monopoly() {
    let monopoly = SupplierDistribution::from_values([("A", 100.0)]).unwrap();
    for split in [50.0, 70.0, 90.0] {
        let duopoly =
            SupplierDistribution::from_values([("A", split), ("B", 100.0 - split)]).unwrap();
        assert!(
            SubstitutabilityEstimator::estimate(&duopoly).unwrap()
                > SubstitutabilityEstimator::estimate(&monopoly).unwrap()
        );
    }
}
