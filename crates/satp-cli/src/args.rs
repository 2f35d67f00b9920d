//! Command-line arguments and value parsers.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Configure and exercise mioty radio modules over a SATP serial link.
#[derive(Parser, Debug)]
#[command(name = "satp", version, about)]
pub struct Cli {
    /// Serial port: /dev/..., COMn, or a bare COM port number
    #[arg(long, global = true, value_parser = parse_port)]
    pub port: Option<String>,

    /// Line speed [default: 115200]
    #[arg(long, global = true)]
    pub baud: Option<u32>,

    /// YAML link configuration; flags take precedence
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the report as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Select the mioty stack, load the network key and read the device identity
    Init(InitArgs),
    /// Send one uplink and wait for the downlink
    Send(SendArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// 16-byte network key as 32 hex characters (dashes ignored)
    #[arg(value_parser = parse_network_key)]
    pub network_key: NetworkKey,

    /// Read the TX power, or write it when a value is given
    #[arg(long, value_name = "BYTE", value_parser = parse_signed_byte, allow_negative_numbers = true)]
    pub tx_power: Option<Option<u8>>,

    /// Read the mioty mode, or write it (0..=2)
    #[arg(long, value_name = "MODE", value_parser = parse_mioty_mode)]
    pub mioty_mode: Option<Option<u8>>,

    /// Read the mioty profile, or write it (eu0, eu1, eu2, us0 or 0..=3)
    #[arg(long, value_name = "PROFILE", value_parser = parse_mioty_profile)]
    pub mioty_profile: Option<Option<u8>>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Uplink payload in hex; without a value it is read from the data file
    #[arg(long, required = true, value_name = "HEX", value_parser = parse_payload)]
    pub data: Option<Option<Payload>>,

    /// Seconds to wait for the downlink indication, 0 to skip [default: 30]
    #[arg(short, long, value_name = "SECS", value_parser = parse_timeout)]
    pub timeout: Option<Duration>,

    /// Seconds between polls while waiting [default: 0.5]
    #[arg(short, long, value_name = "SECS", value_parser = parse_period)]
    pub period: Option<Duration>,

    /// Write the received downlink to the data file
    #[arg(long)]
    pub save_data: bool,

    /// File holding the hex payload
    #[arg(long, value_name = "PATH", default_value = "data")]
    pub data_file: PathBuf,
}

/// A validated network key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkKey(pub Vec<u8>);

/// A validated uplink payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(pub Vec<u8>);

/// Accept `/dev/...` as is, `COMn` in any case, or a bare port number.
pub fn parse_port(value: &str) -> Result<String, String> {
    if value.starts_with("/dev/") {
        return Ok(value.to_string());
    }
    let upper = value.to_uppercase();
    if let Some(number) = upper.strip_prefix("COM") {
        if is_digits(number) {
            return Ok(upper);
        }
    }
    if is_digits(&upper) {
        return Ok(format!("COM{}", upper));
    }
    Err("invalid port name".to_string())
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Decode hex text, ignoring dashes and surrounding whitespace.
pub fn parse_hex(value: &str) -> Result<Vec<u8>, String> {
    let cleaned: String = value.trim().chars().filter(|&c| c != '-').collect();
    hex::decode(&cleaned).map_err(|e| format!("invalid hex: {}", e))
}

pub fn parse_network_key(value: &str) -> Result<NetworkKey, String> {
    let key = parse_hex(value)?;
    if key.len() != satp_link::NETWORK_KEY_LEN {
        return Err("network key must be 32 hex characters long".to_string());
    }
    Ok(NetworkKey(key))
}

pub fn parse_payload(value: &str) -> Result<Payload, String> {
    let data = parse_hex(value)?;
    if data.is_empty() {
        return Err("payload is empty".to_string());
    }
    Ok(Payload(data))
}

/// A byte given as `0x..`, `0b..` (0..=255) or signed decimal (-128..=127).
///
/// Negative decimals are stored as two's complement.
pub fn parse_signed_byte(value: &str) -> Result<u8, String> {
    if let Some(digits) = value.strip_prefix("0x") {
        return u8::from_str_radix(digits, 16)
            .map_err(|_| "byte must be in range [0x00, 0xff]".to_string());
    }
    if let Some(digits) = value.strip_prefix("0b") {
        return u8::from_str_radix(digits, 2)
            .map_err(|_| "byte must be in range [0b00000000, 0b11111111]".to_string());
    }
    value
        .parse::<i8>()
        .map(|v| v as u8)
        .map_err(|_| "byte must be in range [-128, +127]".to_string())
}

pub fn parse_mioty_mode(value: &str) -> Result<u8, String> {
    match parse_signed_byte(value)? {
        mode @ 0..=2 => Ok(mode),
        _ => Err("mode index must be in range [0, 2]".to_string()),
    }
}

const PROFILES: [&str; 4] = ["eu0", "eu1", "eu2", "us0"];

pub fn parse_mioty_profile(value: &str) -> Result<u8, String> {
    let lower = value.to_lowercase();
    if let Some(index) = PROFILES.iter().position(|p| *p == lower) {
        return Ok(index as u8);
    }
    match parse_signed_byte(value)? {
        profile @ 0..=3 => Ok(profile),
        _ => Err("profile index must be in range [0, 3]".to_string()),
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("'{}' is not a valid duration", value))
}

pub fn parse_timeout(value: &str) -> Result<Duration, String> {
    parse_seconds(value)
}

pub fn parse_period(value: &str) -> Result<Duration, String> {
    let period = parse_seconds(value)?;
    if period.is_zero() {
        return Err("poll period must be greater than zero".to_string());
    }
    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_port_names() {
        assert_eq!(parse_port("/dev/ttyACM0").unwrap(), "/dev/ttyACM0");
        assert_eq!(parse_port("com3").unwrap(), "COM3");
        assert_eq!(parse_port("COM12").unwrap(), "COM12");
        assert_eq!(parse_port("7").unwrap(), "COM7");
        assert!(parse_port("ttyUSB0").is_err());
        assert!(parse_port("COM").is_err());
        assert!(parse_port("COMx").is_err());
    }

    #[test]
    fn test_signed_byte() {
        assert_eq!(parse_signed_byte("0x0e").unwrap(), 0x0E);
        assert_eq!(parse_signed_byte("0xFF").unwrap(), 0xFF);
        assert_eq!(parse_signed_byte("0b1010").unwrap(), 10);
        assert_eq!(parse_signed_byte("14").unwrap(), 14);
        assert_eq!(parse_signed_byte("-1").unwrap(), 0xFF);
        assert_eq!(parse_signed_byte("-128").unwrap(), 0x80);
        assert!(parse_signed_byte("128").is_err());
        assert!(parse_signed_byte("0x100").is_err());
        assert!(parse_signed_byte("0b102").is_err());
        assert!(parse_signed_byte("ten").is_err());
    }

    #[test]
    fn test_mode_and_profile() {
        assert_eq!(parse_mioty_mode("2").unwrap(), 2);
        assert!(parse_mioty_mode("3").is_err());
        assert!(parse_mioty_mode("-1").is_err());

        assert_eq!(parse_mioty_profile("EU1").unwrap(), 1);
        assert_eq!(parse_mioty_profile("us0").unwrap(), 3);
        assert_eq!(parse_mioty_profile("0x02").unwrap(), 2);
        assert!(parse_mioty_profile("4").is_err());
        assert!(parse_mioty_profile("eu3").is_err());
    }

    #[test]
    fn test_network_key() {
        let key = parse_network_key("00112233-44556677-8899AABB-CCDDEEFF").unwrap();
        assert_eq!(key.0.len(), 16);
        assert_eq!(key.0[15], 0xFF);
        assert!(parse_network_key("0011").is_err());
        assert!(parse_network_key("zz112233445566778899aabbccddeeff").is_err());
    }

    #[test]
    fn test_durations() {
        assert_eq!(parse_timeout("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_period("0.5").unwrap(), Duration::from_millis(500));
        assert!(parse_period("0").is_err());
        assert!(parse_timeout("-1").is_err());
    }

    #[test]
    fn test_init_flags_without_values_mean_read() {
        let cli = Cli::parse_from([
            "satp",
            "init",
            "00112233445566778899aabbccddeeff",
            "--tx-power",
            "--mioty-mode",
            "1",
        ]);
        let CliCommand::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.tx_power, Some(None));
        assert_eq!(args.mioty_mode, Some(Some(1)));
        assert_eq!(args.mioty_profile, None);
    }

    #[test]
    fn test_negative_tx_power() {
        let cli = Cli::parse_from([
            "satp",
            "--port",
            "4",
            "init",
            "00112233445566778899aabbccddeeff",
            "--tx-power",
            "-2",
        ]);
        assert_eq!(cli.port.as_deref(), Some("COM4"));
        let CliCommand::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.tx_power, Some(Some(0xFE)));
    }

    #[test]
    fn test_send_data_from_file() {
        let cli = Cli::parse_from(["satp", "send", "--data", "-t", "10", "--save-data"]);
        let CliCommand::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.data, Some(None));
        assert_eq!(args.timeout, Some(Duration::from_secs(10)));
        assert!(args.save_data);
        assert_eq!(args.data_file, PathBuf::from("data"));
    }

    #[test]
    fn test_send_requires_data() {
        assert!(Cli::try_parse_from(["satp", "send"]).is_err());
    }
}
