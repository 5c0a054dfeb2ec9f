use anyhow::{Context, Result};
use categorize::output::OutputFormatter;
use categorize::{Args, FilterConfig, RunConfig, run_cli};
use clap::Parser;
use std::process::ExitCode;
use tracing::error;

mod logging;

fn build_config(args: &Args) -> Result<RunConfig> {
    let mut config = args.to_run_config();
    if let Some(path) = &args.config {
        config.filters = FilterConfig::load(path)
            .and_then(FilterConfig::compile)
            .with_context(|| format!("loading filter rules from {}", path.display()))?;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(args.log_level);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_cli(&config) {
        Ok(report) => {
            if args.summary {
                OutputFormatter::summary_table(
                    &report.categories,
                    report.placed,
                    report.failed,
                    report.filtered,
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
