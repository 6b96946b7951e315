//! supply-risk-engine CLI
//!
//! Score supplier concentration and simulate disruptions from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Baseline report for US steel imports, averaged over 2019-2023
//! supply-risk-engine analyze --input flows.json --products 720851,720852 \
//!     --label steel --importer USA --from 2019 --to 2023
//!
//! # What if China stopped supplying?
//! supply-risk-engine simulate --input flows.json --importer USA --remove CHN
//!
//! # Generate a synthetic flow file
//! supply-risk-engine generate --exporters 30 --flows 200 --seed 7
//! ```

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::process;
use supply_risk_engine::analysis::engine::RiskEngine;
use supply_risk_engine::analysis::report::MetricsReport;
use supply_risk_engine::analysis::trade_summary::{DatasetSummary, MarketOverview};
use supply_risk_engine::config::AnalysisConfig;
use supply_risk_engine::core::country::CountryCode;
use supply_risk_engine::core::dataset::TradeDataset;
use supply_risk_engine::core::flow_table::FlowTable;
use supply_risk_engine::core::product::{ProductCode, ProductScope};
use supply_risk_engine::core::record::{TradeRecord, Year, YearSelector};
use supply_risk_engine::simulation::disruption::{DisruptionScenario, RedistributionPolicy};
use supply_risk_engine::simulation::flow_generator::{generate_flows, FlowNetworkConfig};

fn print_usage() {
    eprintln!(
        r#"supply-risk-engine — supply-chain concentration and disruption analytics

USAGE:
    supply-risk-engine <COMMAND> [OPTIONS]

COMMANDS:
    analyze     Score supplier concentration for a product scope
    simulate    Remove suppliers and compare before/after scores
    overview    Import/export trend and balance for one country
    summary     Descriptive statistics for a flow file
    generate    Generate a synthetic flow file (for testing)
    help        Show this message

OPTIONS (analyze, simulate, overview):
    --input <FILE>        Path to JSON flow file
    --products <LIST>     Comma-separated product codes (default: all)
    --label <TEXT>        Display name for the product scope
    --year <Y>            Single year (default: average of all years)
    --from <Y> --to <Y>   Average over a year range
    --importer <CODE>     Only flows into this importer (analyze, simulate)
    --config <FILE>       JSON analysis configuration
    --top <N>             Suppliers to list (default: from config)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (simulate):
    --remove <LIST>       Comma-separated suppliers to remove
    --policy <POLICY>     proportional (default) or best-fit

OPTIONS (overview):
    --country <CODE>      Focal country

OPTIONS (summary):
    --input <FILE>        Path to JSON flow file
    --top <N>             Entries per ranking (default: 10)
    --format <FORMAT>     Output format: text (default) or json

OPTIONS (generate):
    --exporters <N>       Number of exporters (default: 20)
    --importers <N>       Number of importers (default: 10)
    --products <LIST>     Product codes (default: 720851)
    --from <Y> --to <Y>   Year range (default: 2019-2023)
    --flows <N>           Flows per year (default: 100)
    --seed <N>            Seed for reproducible output
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    supply-risk-engine analyze --input flows.json --importer USA --year 2023
    supply-risk-engine simulate --input flows.json --remove CHN,RUS --policy best-fit
    supply-risk-engine overview --input flows.json --country USA
    supply-risk-engine generate --exporters 30 --seed 7 --output flows.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// JSON schema for input records.
#[derive(serde::Deserialize)]
struct RecordInput {
    exporter: String,
    importer: String,
    product: String,
    year: Year,
    value: ValueInput,
}

/// Values may be written as decimal strings or plain JSON numbers.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ValueInput {
    Text(String),
    Number(serde_json::Number),
}

impl ValueInput {
    fn to_decimal(&self) -> Option<Decimal> {
        let text = match self {
            ValueInput::Text(s) => s.trim().to_string(),
            ValueInput::Number(n) => n.to_string(),
        };
        text.parse::<Decimal>()
            .ok()
            .or_else(|| Decimal::from_scientific(&text).ok())
    }
}

#[derive(serde::Deserialize)]
struct FlowsFile {
    records: Vec<RecordInput>,
}

#[derive(serde::Serialize)]
struct OutputRecord {
    exporter: String,
    importer: String,
    product: String,
    year: Year,
    value: String,
}

#[derive(serde::Serialize)]
struct OutputFile {
    records: Vec<OutputRecord>,
}

/// `--key value` pairs, restricted to the options a command accepts.
fn parse_options(args: &[String], allowed: &[&str]) -> HashMap<String, String> {
    let mut options = HashMap::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let name = flag
            .strip_prefix("--")
            .unwrap_or_else(|| fail(format!("unexpected argument: {}", flag)));
        if !allowed.contains(&name) {
            fail(format!("unknown option: {}", flag));
        }
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        options.insert(name.to_string(), value);
        i += 1;
    }
    options
}

fn parse_number<T: std::str::FromStr>(options: &HashMap<String, String>, name: &str) -> Option<T> {
    options.get(name).map(|raw| {
        raw.parse()
            .unwrap_or_else(|_| fail(format!("--{} requires a number, got '{}'", name, raw)))
    })
}

fn load_dataset(path: &str) -> TradeDataset {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));

    let file: FlowsFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "records": [
    {{ "exporter": "CHN", "importer": "USA", "product": "720851", "year": 2023, "value": "1250.5" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let records: Vec<TradeRecord> = file
        .records
        .into_iter()
        .map(|r| {
            let value = r.value.to_decimal().unwrap_or_else(|| {
                fail(format!(
                    "invalid value for {} -> {} ({})",
                    r.exporter, r.importer, r.year
                ))
            });
            TradeRecord::new(
                CountryCode::new(r.exporter),
                CountryCode::new(r.importer),
                ProductCode::new(r.product),
                r.year,
                value,
            )
            .unwrap_or_else(|e| fail(e))
        })
        .collect();

    TradeDataset::new(records)
}

fn load_config(options: &HashMap<String, String>) -> AnalysisConfig {
    match options.get("config") {
        Some(path) => {
            let content = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));
            AnalysisConfig::from_json(&content).unwrap_or_else(|e| fail(e))
        }
        None => AnalysisConfig::default(),
    }
}

fn scope_from(options: &HashMap<String, String>) -> ProductScope {
    let scope = match options.get("products") {
        Some(list) => ProductScope::new(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ProductCode::new),
        ),
        None => ProductScope::open(),
    };
    match options.get("label") {
        Some(label) => scope.with_label(label.clone()),
        None => scope,
    }
}

fn selector_from(options: &HashMap<String, String>) -> YearSelector {
    let year: Option<Year> = parse_number(options, "year");
    let from: Option<Year> = parse_number(options, "from");
    let to: Option<Year> = parse_number(options, "to");
    match (year, from, to) {
        (Some(y), None, None) => YearSelector::Single(y),
        (None, Some(from), Some(to)) if from <= to => YearSelector::AverageRange { from, to },
        (None, None, None) => YearSelector::Average,
        _ => fail("use either --year, or both --from and --to with from <= to"),
    }
}

fn wants_json(options: &HashMap<String, String>) -> bool {
    match options.get("format").map(String::as_str) {
        None | Some("text") => false,
        Some("json") => true,
        Some(other) => fail(format!("--format must be 'text' or 'json', got '{}'", other)),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

/// Everything `analyze` and `simulate` share: load, slice, score the baseline.
fn baseline(options: &HashMap<String, String>) -> (RiskEngine, MetricsReport, usize) {
    let path = options
        .get("input")
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let config = load_config(options);
    let top: usize = parse_number(options, "top").unwrap_or(config.top_suppliers);
    let engine = RiskEngine::new(config).unwrap_or_else(|e| fail(e));

    let dataset = load_dataset(path);
    let scope = scope_from(options);
    let selector = selector_from(options);
    let range = match selector {
        YearSelector::Single(y) => Some(y..=y),
        YearSelector::AverageRange { from, to } => Some(from..=to),
        YearSelector::Average => None,
    };
    let table: FlowTable = dataset
        .flow_table(&scope, range)
        .unwrap_or_else(|e| fail(e));

    let report = match options.get("importer") {
        Some(importer) => {
            engine.analyze_for_importer(&table, &CountryCode::new(importer.as_str()), selector)
        }
        None => engine.analyze(&table, selector),
    }
    .unwrap_or_else(|e| fail(e));

    (engine, report, top)
}

fn print_top_suppliers(report: &MetricsReport, top: usize) {
    println!("Top Suppliers:");
    for (rank, row) in report.top_suppliers(top).iter().enumerate() {
        println!(
            "  {:>2}. {:<10}{:>16.2}{:>8.1}%",
            rank + 1,
            row.supplier,
            row.value,
            row.share * 100.0
        );
    }
}

const SCORING_OPTIONS: &[&str] = &[
    "input", "products", "label", "year", "from", "to", "importer", "config", "top", "format",
];

fn cmd_analyze(args: &[String]) {
    let options = parse_options(args, SCORING_OPTIONS);
    let json = wants_json(&options);
    let (engine, report, top) = baseline(&options);

    if json {
        println!("{}", to_json(&report));
    } else {
        println!("{}", report);
        print_top_suppliers(&report, top);

        let per_supplier = engine
            .supplier_substitutability(&report)
            .unwrap_or_else(|e| fail(e));
        println!("\nReplaceability (score if supplier is lost):");
        for s in per_supplier.iter().take(top) {
            println!(
                "  {:<10} share {:>5.1}%  risk after {:.3}  score {:.3}",
                s.supplier,
                s.share * 100.0,
                s.risk_after,
                s.score
            );
        }
    }
}

fn cmd_simulate(args: &[String]) {
    let mut allowed = SCORING_OPTIONS.to_vec();
    allowed.extend(["remove", "policy"]);
    let options = parse_options(args, &allowed);
    let json = wants_json(&options);

    let removed = options
        .get("remove")
        .map(|list| CountryCode::parse_list(list))
        .unwrap_or_else(|| fail("--remove <LIST> is required"));
    let policy: RedistributionPolicy = match options.get("policy") {
        Some(p) => p.parse().unwrap_or_else(|e| fail(e)),
        None => RedistributionPolicy::default(),
    };
    let scenario = DisruptionScenario::new(removed, policy);

    let (engine, report, top) = baseline(&options);
    let comparison = engine
        .simulate(&report, &scenario)
        .unwrap_or_else(|e| fail(e));

    if json {
        println!("{}", to_json(&comparison));
    } else {
        println!("{}", comparison);
        println!("After disruption:");
        print_top_suppliers(&comparison.disrupted, top);
    }
}

fn cmd_overview(args: &[String]) {
    let options = parse_options(
        args,
        &["input", "products", "label", "from", "to", "country", "top", "format"],
    );
    let json = wants_json(&options);
    let path = options
        .get("input")
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let country = options
        .get("country")
        .map(|c| CountryCode::new(c.as_str()))
        .unwrap_or_else(|| fail("--country <CODE> is required"));
    let top: usize = parse_number(&options, "top").unwrap_or(5);
    let range = match (
        parse_number::<Year>(&options, "from"),
        parse_number::<Year>(&options, "to"),
    ) {
        (Some(from), Some(to)) => Some(from..=to),
        (None, None) => None,
        _ => fail("--from and --to must be given together"),
    };

    let dataset = load_dataset(path);
    let table = dataset
        .flow_table(&scope_from(&options), range)
        .unwrap_or_else(|e| fail(e));
    let overview = MarketOverview::compute(&table, &country, top).unwrap_or_else(|e| fail(e));

    if json {
        println!("{}", to_json(&overview));
    } else {
        println!("{}", overview);
    }
}

fn cmd_summary(args: &[String]) {
    let options = parse_options(args, &["input", "top", "format"]);
    let json = wants_json(&options);
    let path = options
        .get("input")
        .unwrap_or_else(|| fail("--input <FILE> is required"));
    let top: usize = parse_number(&options, "top").unwrap_or(10);

    let summary = DatasetSummary::compute(&load_dataset(path), top).unwrap_or_else(|e| fail(e));
    if json {
        println!("{}", to_json(&summary));
    } else {
        println!("{}", summary);
    }
}

fn cmd_generate(args: &[String]) {
    let options = parse_options(
        args,
        &[
            "exporters", "importers", "products", "from", "to", "flows", "seed", "output",
        ],
    );
    let defaults = FlowNetworkConfig::default();
    let config = FlowNetworkConfig {
        exporter_count: parse_number(&options, "exporters").unwrap_or(defaults.exporter_count),
        importer_count: parse_number(&options, "importers").unwrap_or(defaults.importer_count),
        products: options
            .get("products")
            .map(|list| list.split(',').map(|s| ProductCode::new(s.trim())).collect())
            .unwrap_or_else(|| defaults.products.clone()),
        first_year: parse_number(&options, "from").unwrap_or(defaults.first_year),
        last_year: parse_number(&options, "to").unwrap_or(defaults.last_year),
        flows_per_year: parse_number(&options, "flows").unwrap_or(defaults.flows_per_year),
        seed: parse_number(&options, "seed"),
        ..defaults
    };

    let records = generate_flows(&config);
    let output = OutputFile {
        records: records
            .iter()
            .map(|r| OutputRecord {
                exporter: r.exporter().to_string(),
                importer: r.importer().to_string(),
                product: r.product().to_string(),
                year: r.year(),
                value: r.value().to_string(),
            })
            .collect(),
    };
    let json = to_json(&output);

    if let Some(path) = options.get("output") {
        fs::write(path, &json).unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} records from {} exporters → {}",
            records.len(),
            config.exporter_count,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "analyze" => cmd_analyze(rest),
        "simulate" => cmd_simulate(rest),
        "overview" => cmd_overview(rest),
        "summary" => cmd_summary(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
