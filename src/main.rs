//! power-recon CLI
//!
//! Reconcile internal and clearer trade books from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Reconcile two monthly books
//! power-recon reconcile --internal internal.csv --clearer clearer.csv
//!
//! # Net multi-leg books per month first, output JSON
//! power-recon reconcile --internal internal.csv --clearer clearer.csv --net --format json
//!
//! # Split quarterly contracts into monthly legs
//! power-recon decompose --input quarterly.csv --net
//!
//! # Stress a reconciliation
//! power-recon scenario --internal internal.csv --clearer clearer.csv --shocks-internal shocks.json
//!
//! # Generate a random pair of books
//! power-recon generate --months 12 --trades 4 --out-internal int.csv --out-clearer clr.csv
//! ```
//!
//! Diagnostics go to stderr through `env_logger`; set `RUST_LOG=debug` for more.

use power_recon::core::trade::TradeTable;
use power_recon::decomposition::quarterly::{decompose_table, CalendarPolicy, DecomposeConfig, DEFAULT_QUARTER};
use power_recon::io::loader::{load_data, read_scenarios, read_shock_spec, write_trade_table};
use power_recon::reconciliation::engine::{reconcile_trades, ReconciliationResult};
use power_recon::reconciliation::netting::NettingEngine;
use power_recon::reconciliation::summary::{render_reconciliation, ReconciliationSummary};
use power_recon::simulation::generator::{generate_book_pair, GeneratorConfig};
use power_recon::simulation::scenario::{run_scenario, run_scenarios};
use power_recon::simulation::shock::ShockSpec;
use std::collections::HashMap;
use std::process;

fn print_usage() {
    eprintln!(
        r#"power-recon: energy trade reconciliation and stress testing

USAGE:
    power-recon <COMMAND> [OPTIONS]

COMMANDS:
    reconcile   Reconcile an internal book against a clearer book
    decompose   Split quarterly contracts into monthly legs
    scenario    Shock both books, then reconcile
    generate    Generate a random pair of books (for testing)
    help        Show this message

OPTIONS (reconcile, scenario):
    --internal <FILE>         Internal book (.csv or .json)
    --clearer <FILE>          Clearer book (.csv or .json)
    --net                     Net each book per month before reconciling
    --format <FORMAT>         Output format: text (default) or json

OPTIONS (scenario):
    --shocks-internal <FILE>  JSON shock spec for the internal book
    --shocks-clearer <FILE>   JSON shock spec for the clearer book
    --scenarios <FILE>        JSON array of named scenarios (overrides the above)

OPTIONS (decompose):
    --input <FILE>            Quarterly contracts (.csv or .json)
    --from-period             Use each row's own quarter label instead of Q2-2025
    --net                     Net the legs per month
    --output <FILE>           Write to file instead of stdout
    --format <FORMAT>         Output format: text (default) or json

OPTIONS (generate):
    --months <N>              Delivery months (default: 12)
    --trades <N>              Internal trades per month (default: 4)
    --breaks <P>              Probability a clearer month is off (default: 0.2)
    --out-internal <FILE>     Write the internal book to a file
    --out-clearer <FILE>      Write the clearer book to a file

EXAMPLES:
    power-recon reconcile --internal data/internal_trades.csv --clearer data/clearer_trades.csv
    power-recon scenario --internal data/internal_trades.csv --clearer data/clearer_trades.csv \
        --scenarios data/scenarios.json
    power-recon decompose --input data/quarterly_trades.csv --net"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Parsed `--flag value` pairs and bare `--switch`es.
struct Options {
    values: HashMap<String, String>,
    switches: Vec<String>,
}

impl Options {
    fn parse(args: &[String], value_flags: &[&str], switch_flags: &[&str]) -> Self {
        let mut values = HashMap::new();
        let mut switches = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            if value_flags.contains(&arg) {
                i += 1;
                let value = args
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| fail(format!("{} requires a value", arg)));
                values.insert(arg.to_string(), value);
            } else if switch_flags.contains(&arg) {
                switches.push(arg.to_string());
            } else {
                fail(format!("unknown option: {}", arg));
            }
            i += 1;
        }
        Self { values, switches }
    }

    fn get(&self, flag: &str) -> Option<&str> {
        self.values.get(flag).map(String::as_str)
    }

    fn require(&self, flag: &str) -> &str {
        self.get(flag)
            .unwrap_or_else(|| fail(format!("{} <FILE> is required", flag)))
    }

    fn has(&self, flag: &str) -> bool {
        self.switches.iter().any(|s| s == flag)
    }

    fn json(&self) -> bool {
        match self.get("--format").unwrap_or("text") {
            "text" => false,
            "json" => true,
            other => fail(format!("--format must be 'text' or 'json', got '{}'", other)),
        }
    }

    fn parsed<T: std::str::FromStr>(&self, flag: &str, default: T) -> T {
        match self.get(flag) {
            Some(raw) => raw
                .parse()
                .unwrap_or_else(|_| fail(format!("{} requires a number, got '{}'", flag, raw))),
            None => default,
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| fail(e))
}

fn load_book(opts: &Options, flag: &str) -> TradeTable {
    let book = load_data(opts.require(flag));
    if opts.has("--net") {
        NettingEngine::net_monthly(&book).unwrap_or_else(|e| fail(e))
    } else {
        book
    }
}

fn print_result(result: &ReconciliationResult, json: bool) {
    if json {
        #[derive(serde::Serialize)]
        struct Output<'a> {
            summary: ReconciliationSummary,
            rows: &'a ReconciliationResult,
        }
        println!(
            "{}",
            to_json(&Output {
                summary: ReconciliationSummary::from_result(result),
                rows: result,
            })
        );
    } else {
        println!("{}", render_reconciliation(result));
    }
}

fn cmd_reconcile(args: &[String]) {
    let opts = Options::parse(args, &["--internal", "--clearer", "--format"], &["--net"]);
    let json = opts.json();
    let internal = load_book(&opts, "--internal");
    let clearer = load_book(&opts, "--clearer");

    let result = reconcile_trades(&internal, &clearer).unwrap_or_else(|e| fail(e));
    print_result(&result, json);
}

fn cmd_decompose(args: &[String]) {
    let opts = Options::parse(
        args,
        &["--input", "--output", "--format"],
        &["--from-period", "--net"],
    );
    let json = opts.json();
    let quarterly = load_data(opts.require("--input"));

    let config = DecomposeConfig {
        calendar: if opts.has("--from-period") {
            CalendarPolicy::FromPeriod {
                fallback: DEFAULT_QUARTER,
            }
        } else {
            CalendarPolicy::Fixed(DEFAULT_QUARTER)
        },
        ..Default::default()
    };
    let mut legs = decompose_table(&quarterly, &config);
    if opts.has("--net") {
        legs = NettingEngine::net_monthly(&legs).unwrap_or_else(|e| fail(e));
    }

    if let Some(path) = opts.get("--output") {
        write_trade_table(path, &legs).unwrap_or_else(|e| fail(e));
        eprintln!("Wrote {} legs → {}", legs.len(), path);
    } else if json {
        println!("{}", to_json(&legs));
    } else {
        println!("{}", legs);
    }
}

fn load_shocks(opts: &Options, flag: &str) -> Option<ShockSpec> {
    opts.get(flag)
        .map(|path| read_shock_spec(path).unwrap_or_else(|e| fail(format!("{}: {}", path, e))))
}

fn cmd_scenario(args: &[String]) {
    let opts = Options::parse(
        args,
        &[
            "--internal",
            "--clearer",
            "--shocks-internal",
            "--shocks-clearer",
            "--scenarios",
            "--format",
        ],
        &["--net"],
    );
    let json = opts.json();
    let internal = load_book(&opts, "--internal");
    let clearer = load_book(&opts, "--clearer");

    if let Some(path) = opts.get("--scenarios") {
        let scenarios = read_scenarios(path).unwrap_or_else(|e| fail(format!("{}: {}", path, e)));
        let outcomes = run_scenarios(&internal, &clearer, &scenarios).unwrap_or_else(|e| fail(e));
        if json {
            println!("{}", to_json(&outcomes));
        } else {
            for outcome in &outcomes {
                println!("━━━ Scenario: {} ━━━\n", outcome.name);
                println!("{}", render_reconciliation(&outcome.result));
            }
        }
        return;
    }

    let shocks_int = load_shocks(&opts, "--shocks-internal");
    let shocks_clr = load_shocks(&opts, "--shocks-clearer");
    let result = run_scenario(&internal, &clearer, shocks_int.as_ref(), shocks_clr.as_ref())
        .unwrap_or_else(|e| fail(e));
    print_result(&result, json);
}

fn cmd_generate(args: &[String]) {
    let opts = Options::parse(
        args,
        &["--months", "--trades", "--breaks", "--out-internal", "--out-clearer"],
        &[],
    );
    let defaults = GeneratorConfig::default();
    let config = GeneratorConfig {
        months: opts.parsed("--months", defaults.months),
        trades_per_month: opts.parsed("--trades", defaults.trades_per_month),
        break_probability: opts.parsed("--breaks", defaults.break_probability),
        ..defaults
    };
    if !(0.0..=1.0).contains(&config.break_probability) {
        fail("--breaks must be between 0 and 1");
    }

    let (internal, clearer) = generate_book_pair(&config).unwrap_or_else(|e| fail(e));

    match (opts.get("--out-internal"), opts.get("--out-clearer")) {
        (Some(int_path), Some(clr_path)) => {
            write_trade_table(int_path, &internal).unwrap_or_else(|e| fail(e));
            write_trade_table(clr_path, &clearer).unwrap_or_else(|e| fail(e));
            eprintln!(
                "Generated {} internal and {} clearer months → {}, {}",
                internal.len(),
                clearer.len(),
                int_path,
                clr_path
            );
        }
        (None, None) => {
            #[derive(serde::Serialize)]
            struct OutputBooks<'a> {
                internal: &'a TradeTable,
                clearer: &'a TradeTable,
            }
            println!(
                "{}",
                to_json(&OutputBooks {
                    internal: &internal,
                    clearer: &clearer,
                })
            );
        }
        _ => fail("--out-internal and --out-clearer must be given together"),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "reconcile" => cmd_reconcile(rest),
        "decompose" => cmd_decompose(rest),
        "scenario" => cmd_scenario(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
