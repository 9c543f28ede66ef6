//! DNS Latency Ranker - Main CLI Application
//!
//! Reads a list of candidate DNS resolvers, probes them concurrently and prints
//! or saves the ones that answer fast enough.

use clap::Parser;
use dns_latency_ranker::{
    candidates::load_candidates,
    cli::Cli,
    config::{display_config_summary, load_config},
    dns::ResolverTransport,
    error::{AppError, Result},
    executor::Dispatcher,
    log_debug, log_info,
    logging::LoggerFactory,
    output::{OutputDestination, OutputFormatterFactory, OutputWriter},
    selector::Selector,
    PKG_NAME, VERSION,
};
use std::{process, sync::Arc};

#[tokio::main]
async fn main() {
    // Print only; spawned task panics are caught and counted by the dispatcher
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Panic: {}", panic_info);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if let Err(message) = cli.validate() {
        eprintln!("{}", AppError::validation(message).format_for_console(use_color));
        process::exit(1);
    }

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{} v{}", PKG_NAME, VERSION);
        eprintln!(
            "Built {} from {} for {}",
            env!("BUILD_TIME"),
            env!("GIT_COMMIT"),
            env!("TARGET_TRIPLE")
        );
        eprintln!();
    }

    let config = load_config(cli.clone())?;

    let logger_factory = LoggerFactory::new(config.clone());
    let logger = logger_factory.create_logger("MAIN").await;
    log_debug!(logger, "Configuration loaded:\n{}", display_config_summary(&config));

    let candidates = load_candidates(&cli.file)?;
    log_info!(logger, "Loaded {} candidates from {}", candidates.len(), cli.file.display());

    let probe_logger = Arc::new(logger_factory.create_probe_logger().await);
    probe_logger.log_round_start(candidates.len(), &config).await;

    let dispatcher = Dispatcher::from_config(&config, Arc::new(ResolverTransport::new()))
        .with_logger(probe_logger);
    let selector = Selector::new(config.top_n);

    let (result, summary) = dispatcher.run_round(candidates, &selector).await?;

    let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
    let writer = OutputWriter::new(formatter, OutputDestination::from_path(cli.output.clone()));
    writer.write_results(&result)?;

    if result.is_empty() && summary.candidates > 0 && *writer.destination() == OutputDestination::Console {
        eprintln!(
            "{}",
            writer.warning(&format!(
                "No resolver answered every sample query in under {}ms",
                config.threshold_ms
            ))?
        );
    }

    if config.verbose {
        eprintln!();
        eprintln!("{}", writer.summary(&summary)?);
        if let Some(best) = result.best() {
            log_info!(logger, "Fastest resolver: {} ({:.2}ms)", best.address(), best.latency_ms());
        }
    }

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Check your .env file format");
            eprintln!("  - PROBE_CEILING_MS and QUALIFY_THRESHOLD_MS must be between 1 and 60000");
            eprintln!("  - RESOLVER_PORT must be between 1 and 65535");
        }
        AppError::Io(_) => {
            eprintln!();
            eprintln!("File help:");
            eprintln!("  - Check that the candidate list exists and is readable");
            eprintln!("  - Check that the output directory exists and is writable");
        }
        _ => {}
    }
}
