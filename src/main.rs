// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the run configuration (defaults < config file < flags)
// 3. Probe every target, printing results as they complete
// 4. Exit with proper code (0 = all alive, 1 = something not alive, 2 = error)
// =============================================================================

use anyhow::Result;
use clap::Parser;

use link_prober::cli::Cli;
use link_prober::logger::setup_logging;
use link_prober::pipeline::{run_file, Reporter};
use link_prober::report::{JsonReporter, TextReporter};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            log::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = cli.to_config()?;

    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::stdout())
    } else {
        Box::new(TextReporter::stdout())
    };

    let report = run_file(&config, reporter).await?;
    log::debug!(
        "Peak concurrency: {}/{}",
        report.peak_in_flight,
        config.max_concurrency
    );

    if report.summary.not_alive() > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}
