//! `satp` - configure mioty radio modules over a SATP serial link.

mod args;
mod commands;
mod error;

use std::process::ExitCode;

use clap::Parser;
use satp_link::{CancelFlag, MiotySensor, SerialChannel, SystemClock};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use crate::args::{Cli, CliCommand};
use crate::error::Result;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = commands::link_config(&cli)?;
    debug!("Link configuration: {:?}", config);

    let channel = SerialChannel::open(&config.port, config.baud_rate, config.read_timeout())?;
    let cancel = CancelFlag::new();
    commands::install_interrupt(&cancel)?;
    let mut sensor = MiotySensor::new(channel, SystemClock, &config).with_cancel(cancel);

    match &cli.command {
        CliCommand::Init(args) => commands::run_init(&mut sensor, args, cli.json),
        CliCommand::Send(args) => commands::run_send(&mut sensor, args, &config, cli.json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
