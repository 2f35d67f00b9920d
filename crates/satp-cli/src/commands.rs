//! `init` and `send` subcommands.

use std::io::Write;
use std::path::Path;

use satp_link::{
    ByteChannel, CancelFlag, Clock, Confirmation, Indication, InitOptions, InitReport, LinkConfig,
    MiotySensor, ParamAction, SendOptions, SendReport, StepReport, WaitProgress,
};
use tracing::info;

use crate::args::{Cli, InitArgs, SendArgs};
use crate::error::{CliError, Result};

/// Link settings from the config file (if any) with flags applied on top.
pub fn link_config(cli: &Cli) -> Result<LinkConfig> {
    let mut config = match &cli.config {
        Some(path) => LinkConfig::load(path)?,
        None => LinkConfig::default(),
    };
    if let Some(port) = &cli.port {
        config.port = port.clone();
    }
    if let Some(baud) = cli.baud {
        config.baud_rate = baud;
    }
    Ok(config)
}

fn param_action(value: Option<Option<u8>>) -> Option<ParamAction> {
    value.map(|v| v.map_or(ParamAction::Read, ParamAction::Write))
}

pub fn init_options(args: &InitArgs) -> InitOptions {
    InitOptions {
        network_key: args.network_key.0.clone(),
        tx_power: param_action(args.tx_power),
        mode: param_action(args.mioty_mode),
        profile: param_action(args.mioty_profile),
    }
}

pub fn run_init<C: ByteChannel, K: Clock>(
    sensor: &mut MiotySensor<C, K>,
    args: &InitArgs,
    json: bool,
) -> Result<()> {
    let report = sensor.initialize(&init_options(args))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_init(&report);
    }
    Ok(())
}

/// Uplink payload from the command line, or the first line of the data file.
pub fn payload(args: &SendArgs) -> Result<Vec<u8>> {
    match &args.data {
        Some(Some(payload)) => Ok(payload.0.clone()),
        _ => load_payload(&args.data_file),
    }
}

pub fn load_payload(path: &Path) -> Result<Vec<u8>> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::DataFile {
        path: path.to_path_buf(),
        source,
    })?;
    let line = content.lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return Err(CliError::EmptyDataFile(path.to_path_buf()));
    }
    crate::args::parse_hex(line).map_err(|message| CliError::InvalidDataFile {
        path: path.to_path_buf(),
        message,
    })
}

pub fn save_downlink(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, hex::encode(data)).map_err(|source| CliError::DataFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Downlink written to {}", path.display());
    Ok(())
}

pub fn run_send<C: ByteChannel, K: Clock>(
    sensor: &mut MiotySensor<C, K>,
    args: &SendArgs,
    config: &LinkConfig,
    json: bool,
) -> Result<()> {
    let options = SendOptions {
        data: payload(args)?,
        timeout: args.timeout.unwrap_or_else(|| config.indication_timeout()),
        poll_period: args.period.unwrap_or_else(|| config.poll_period()),
    };

    let report = sensor.send_data(&options, |progress| {
        if !json {
            eprint!("\r{}", progress_line(&progress));
            let _ = std::io::stderr().flush();
        }
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        eprintln!();
        print_send(&report);
    }

    if args.save_data {
        if let Some(downlink) = &report.downlink {
            save_downlink(&args.data_file, downlink)?;
            if !json {
                println!("      ⨽ WRITING TO {}: OK", args.data_file.display());
            }
        }
    }
    Ok(())
}

/// `>   WAITING FOR INDICATION: [▮▮▮-------] 1.5s`
pub fn progress_line(progress: &WaitProgress) -> String {
    let done = progress.iteration.min(progress.budget);
    format!(
        ">   WAITING FOR INDICATION: [{}{}] {:.1}s",
        "▮".repeat(done),
        "-".repeat(progress.budget - done),
        progress.elapsed.as_secs_f64()
    )
}

fn outcome_text(outcome: &Confirmation) -> String {
    match outcome {
        Confirmation::Success(_) => "OK".to_string(),
        Confirmation::DeviceError(code) => {
            format!("ERROR\n      ⨽ ERROR_CODE = {} ({})", u8::from(*code), code)
        }
        Confirmation::NoResponse => "NO RESPONSE".to_string(),
    }
}

fn print_step(step: &StepReport) {
    println!(">   {}: {}", step.label, outcome_text(&step.outcome));
}

fn print_init(report: &InitReport) {
    for step in &report.steps {
        print_step(step);
        if step.label.ends_with("MIOTY_EUI64") {
            if let Some(eui) = report.eui64_string() {
                println!("      ⨽ EUI64: {}", eui);
            }
        } else if step.label.ends_with("MIOTY_SHORT_ADDR") {
            if let Some(addr) = report.short_addr_string() {
                println!("      ⨽ SHORT_ADDR: {}", addr);
            }
        }
    }
    let read_values = [
        ("TX_POWER", report.tx_power),
        ("MIOTY_MODE", report.mode),
        ("MIOTY_PROFILE", report.profile),
    ];
    for (name, value) in read_values {
        if let Some(value) = value {
            println!("      ⨽ {}: {} (0x{:02x})", name, value, value);
        }
    }
}

fn print_send(report: &SendReport) {
    for step in &report.steps {
        print_step(step);
    }
    match &report.indication {
        Some(Indication::Found(_)) => {}
        Some(Indication::TimedOut) => println!(">   WAITING FOR INDICATION: TIMEOUT"),
        None => {}
    }
    if let Some(downlink) = &report.downlink {
        let bytes: Vec<String> = downlink.iter().map(|b| format!("0x{:02x}", b)).collect();
        println!("      ⨽ DATA: {}", bytes.join(", "));
    }
}

/// Route Ctrl-C to `flag`.
pub fn install_interrupt(flag: &CancelFlag) -> Result<()> {
    let flag = flag.clone();
    ctrlc::set_handler(move || flag.cancel())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{NetworkKey, Payload};
    use satp_link::{ManualClock, ScriptedChannel};
    use satp_protocol::encode_frame;
    use std::path::PathBuf;
    use std::time::Duration;

    fn send_args(data: Option<Option<Payload>>, data_file: PathBuf) -> SendArgs {
        SendArgs {
            data,
            timeout: Some(Duration::from_secs(2)),
            period: None,
            save_data: true,
            data_file,
        }
    }

    #[test]
    fn test_param_actions() {
        let args = InitArgs {
            network_key: NetworkKey(vec![0; 16]),
            tx_power: Some(None),
            mioty_mode: Some(Some(2)),
            mioty_profile: None,
        };
        let options = init_options(&args);
        assert_eq!(options.tx_power, Some(ParamAction::Read));
        assert_eq!(options.mode, Some(ParamAction::Write(2)));
        assert_eq!(options.profile, None);
    }

    #[test]
    fn test_progress_line() {
        let line = progress_line(&WaitProgress {
            iteration: 3,
            budget: 5,
            elapsed: Duration::from_millis(1500),
        });
        assert_eq!(line, ">   WAITING FOR INDICATION: [▮▮▮--] 1.5s");
    }

    #[test]
    fn test_payload_from_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, "0a0b0c\nignored\n").unwrap();

        let args = send_args(Some(None), path.clone());
        assert_eq!(payload(&args).unwrap(), vec![0x0A, 0x0B, 0x0C]);

        let args = send_args(Some(Some(Payload(vec![0x01]))), path);
        assert_eq!(payload(&args).unwrap(), vec![0x01]);
    }

    #[test]
    fn test_data_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        assert!(matches!(
            load_payload(&missing),
            Err(CliError::DataFile { .. })
        ));

        let empty = dir.path().join("empty");
        std::fs::write(&empty, "\n").unwrap();
        assert!(matches!(
            load_payload(&empty),
            Err(CliError::EmptyDataFile(_))
        ));

        let bad = dir.path().join("bad");
        std::fs::write(&bad, "xyz").unwrap();
        assert!(matches!(
            load_payload(&bad),
            Err(CliError::InvalidDataFile { .. })
        ));
    }

    #[test]
    fn test_send_saves_downlink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        std::fs::write(&path, "c0ffee\n").unwrap();

        let mut channel = ScriptedChannel::new();
        channel.push_reply(encode_frame(0x00, 0x08, &[0x00]).unwrap());
        channel.push_reply(encode_frame(0x00, 0x0C, &[0x00]).unwrap());
        channel.push_reply(encode_frame(0x00, 0x06, &[0x00, 0xAB, 0xCD]).unwrap());
        channel.arrive_on_poll(3, encode_frame(0x01, 0x02, &[0x03]).unwrap());
        let clock = ManualClock::new();
        let config = LinkConfig::default();

        let mut sensor = MiotySensor::new(&mut channel, &clock, &config);
        run_send(&mut sensor, &send_args(Some(None), path.clone()), &config, true).unwrap();
        drop(sensor);

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abcd");
        let expected_uplink = encode_frame(0x00, 0x0C, &[0xC0, 0xFF, 0xEE]).unwrap();
        assert_eq!(channel.written()[1], expected_uplink);
    }
}
