//! Household demand simulator entry point — CLI wiring and config-driven run.

use std::path::{Path, PathBuf};
use std::process;

use rand::rngs::StdRng;
use rand::SeedableRng;

use dwellsim::config::{Detail, ScenarioConfig};
use dwellsim::io::export::{LabeledSeries, export_occupancy, export_series};
use dwellsim::runner::run_household;
use dwellsim::tables::Dataset;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    seed_override: Option<u64>,
    data_dir: Option<String>,
    out_dir: Option<String>,
    detail: Option<String>,
}

fn print_help() {
    eprintln!("dwellsim — single-household electricity demand simulator");
    eprintln!();
    eprintln!("Usage: dwellsim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --seed <u64>        Override random seed");
    eprintln!("  --data-dir <path>   Load input tables from a directory");
    eprintln!("  --out-dir <path>    Directory for result CSV files");
    eprintln!("  --detail <level>    Output granularity: \"total\" or \"per_entity\"");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("Without --scenario the baseline scenario is used (two residents,");
    eprintln!("January weekday, built-in demo tables).");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        seed_override: None,
        data_dir: None,
        out_dir: None,
        detail: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--data-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --data-dir requires a path argument");
                    process::exit(1);
                }
                cli.data_dir = Some(args[i].clone());
            }
            "--out-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --out-dir requires a path argument");
                    process::exit(1);
                }
                cli.out_dir = Some(args[i].clone());
            }
            "--detail" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --detail requires a level argument");
                    process::exit(1);
                }
                cli.detail = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

fn main() {
    let cli = parse_args();

    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::baseline()
    };

    // CLI overrides take priority over the scenario file
    if let Some(seed) = cli.seed_override {
        scenario.simulation.seed = Some(seed);
    }
    if let Some(dir) = cli.data_dir {
        scenario.data.dir = Some(dir);
    }
    if let Some(dir) = cli.out_dir {
        scenario.output.dir = dir;
    }
    if let Some(detail) = cli.detail {
        scenario.output.detail = detail;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    // Recoverable issues clamp with a warning and the run proceeds.
    let (settings, warnings) = scenario.settings();
    for w in &warnings {
        eprintln!("warning: {w}");
    }

    let data = match scenario.data.dir {
        Some(ref dir) => match Dataset::from_dir(Path::new(dir)) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("error: {e}");
                process::exit(1);
            }
        },
        None => Dataset::demo(),
    };

    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let day = match run_household(&settings, &data, &mut rng) {
        Ok(day) => day,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let out_dir = PathBuf::from(&scenario.output.dir);
    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("error: cannot create {}: {e}", out_dir.display());
        process::exit(1);
    }

    let (appliance_rows, lighting_rows): (Vec<LabeledSeries>, Vec<LabeledSeries>) =
        match settings.detail {
            Detail::PerEntity => (day.appliances.clone(), day.lighting.clone()),
            Detail::Total => (
                vec![("APPLIANCES".to_string(), day.appliance_total())],
                vec![("LIGHTING".to_string(), day.lighting_total())],
            ),
        };

    let result = export_occupancy(&day.occupancy, &out_dir.join("occupancy_output.csv"))
        .and_then(|()| export_series(&appliance_rows, &out_dir.join("appliance_output.csv")))
        .and_then(|()| export_series(&lighting_rows, &out_dir.join("lighting_output.csv")));
    if let Err(e) = result {
        eprintln!("error: failed to write results: {e}");
        process::exit(1);
    }

    println!(
        "Simulated {} residents, month {}, {}: {:.2} kWh over the day",
        settings.residents,
        settings.month,
        settings.day_type,
        day.total_energy_kwh()
    );
    println!("Results written to {}", out_dir.display());
}
