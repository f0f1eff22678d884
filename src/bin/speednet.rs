use anyhow::Result;
use colored::*;
use speednet::coordinator::{init_logging_with_config, CliOutcome, Config, Coordinator};
use speednet::probe::HttpSpeedProbe;
use std::io::{self, IsTerminal};
use tracing::error;

fn print_help() {
    eprintln!("{}", Config::help_text());
}

fn main() {
    let config = match Config::resolve(std::env::args_os()) {
        CliOutcome::Run(config) => config,
        CliOutcome::Help => {
            print_help();
            return;
        }
        CliOutcome::Invalid(_) => {
            println!(
                "\n{} Wrong command line options. Please try again!\n",
                "ERROR:".red().bold()
            );
            print_help();
            return;
        }
    };

    // -h combined with other options prints help and carries on
    if config.help {
        print_help();
    }

    init_logging_with_config(&config.log_level, config.is_json_format());

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        eprintln!("{} {}", "ERROR:".red().bold(), e);
        std::process::exit(1);
    }

    if let Err(e) = run(config) {
        error!(error = %e, "Speed check failed");
        eprintln!(
            "{} Failed to measure the connection speed due to:\n{:#}\n",
            "ERROR:".red().bold(),
            e
        );
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    let request = config.request()?;
    let probe = HttpSpeedProbe::connect(config.probe_settings())?;

    let mut coordinator = Coordinator::new(probe, request)
        .with_indicator(config.indicator_settings())
        .with_styled_report(io::stdout().is_terminal());

    coordinator.check_speed_stdout()?;
    Ok(())
}
