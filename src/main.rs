//! BESS dispatch simulator entry point: CLI wiring and config-driven runs.

use std::path::Path;
use std::process;
use std::str::FromStr;

use bess_sim::config::SimulatorConfig;
use bess_sim::dispatch::GreedyDispatch;
use bess_sim::generator::{Scenario, generate_market_data, sample_day_start};
use bess_sim::io::export::export_csv;

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    horizon_override: Option<u32>,
    interval_override: Option<u32>,
    scenario_override: Option<String>,
    schedule_out: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("bess-sim — grid-scale battery dispatch simulator");
    eprintln!();
    eprintln!("Usage: bess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from TOML file");
    eprintln!(
        "  --preset <name>          Use a built-in preset ({})",
        SimulatorConfig::PRESETS.join(", ")
    );
    eprintln!("  --seed <u64>             Override random seed");
    eprintln!("  --horizon-hours <u32>    Override dispatch horizon");
    eprintln!("  --interval-minutes <u32> Override interval granularity");
    eprintln!("  --scenario <name>        Override price scenario");
    eprintln!("  --schedule-out <path>    Export the schedule to CSV");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start REST API server instead of a one-off run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        seed_override: None,
        horizon_override: None,
        interval_override: None,
        scenario_override: None,
        schedule_out: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
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
            "--horizon-hours" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --horizon-hours requires a u32 argument");
                    process::exit(1);
                }
                if let Ok(h) = args[i].parse::<u32>() {
                    cli.horizon_override = Some(h);
                } else {
                    eprintln!(
                        "error: --horizon-hours value \"{}\" is not a valid u32",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--interval-minutes" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --interval-minutes requires a u32 argument");
                    process::exit(1);
                }
                if let Ok(m) = args[i].parse::<u32>() {
                    cli.interval_override = Some(m);
                } else {
                    eprintln!(
                        "error: --interval-minutes value \"{}\" is not a valid u32",
                        args[i]
                    );
                    process::exit(1);
                }
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a name argument");
                    process::exit(1);
                }
                cli.scenario_override = Some(args[i].clone());
            }
            "--schedule-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --schedule-out requires a path argument");
                    process::exit(1);
                }
                cli.schedule_out = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                if let Ok(p) = args[i].parse::<u16>() {
                    cli.port = p;
                } else {
                    eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                    process::exit(1);
                }
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

    // Load config: --config takes priority, then --preset, then baseline.
    let mut config = if let Some(ref path) = cli.config_path {
        match SimulatorConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match SimulatorConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        SimulatorConfig::baseline()
    };

    // Apply overrides
    if let Some(seed) = cli.seed_override {
        config.run.seed = seed;
    }
    if let Some(horizon) = cli.horizon_override {
        config.run.horizon_hours = horizon;
    }
    if let Some(interval) = cli.interval_override {
        config.run.interval_minutes = interval;
    }
    if let Some(ref scenario) = cli.scenario_override {
        config.run.scenario = scenario.clone();
    }

    // Validate
    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(bess_sim::api::AppState::new(config));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(bess_sim::api::serve(state, addr));
        return;
    }

    // One-off run over the reproducible sample day.
    let scenario = match Scenario::from_str(&config.run.scenario) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let data = generate_market_data(
        sample_day_start(),
        config.run.horizon_hours,
        config.run.interval_minutes,
        scenario,
        config.run.seed,
    );

    let mut battery = match config.battery.build(config.run.dt_hours()) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let schedule = match GreedyDispatch.optimize(&mut battery, &data.prices, &data.forecasts) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    // Print per-interval rows
    for row in schedule.rows() {
        println!("{row}");
    }

    // Print the summary
    println!("\n{}", schedule.summary());

    // Export CSV if requested
    if let Some(ref path) = cli.schedule_out {
        if let Err(e) = export_csv(schedule.rows(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("Schedule written to {path}");
    }
}
