use clap::Parser;
use lossdrill_core::{DrillError, SimulationReport, run_simulation};
use rand::SeedableRng;
use rand::rngs::StdRng;

mod config;

use config::{Cli, DrillConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize JSON logging once.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .json()
        .try_init();

    let result = match DrillConfig::from_cli(Cli::parse()) {
        Ok(config) => run(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!(
            error = %e,
            kind = e.kind(),
            stage = %e.stage_reached(),
            "Drill failed"
        );
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: DrillConfig) -> Result<(), DrillError> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut store = lossdrill_postgres::connect(&config.postgres).await?;
    let outcome = run_simulation(&mut store, config.plan, &mut rng, |event| {
        println!("{}", event)
    })
    .await;
    store.close().await;

    let report = outcome?;
    if config.json {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &SimulationReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => tracing::error!(error = %e, "Failed to serialize run report"),
    }
}
