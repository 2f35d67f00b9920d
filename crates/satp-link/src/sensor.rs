//! mioty sensor workflows.
//!
//! [`MiotySensor::initialize`] attaches a module to a network and reads back
//! its identity; [`MiotySensor::send_data`] sends one uplink and collects the
//! downlink received in the following RX window.

use std::time::Duration;

use satp_protocol::{Command, SendParam, StackEvent, StackId, StackParam};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::channel::ByteChannel;
use crate::clock::{CancelFlag, Clock};
use crate::config::LinkConfig;
use crate::error::Result;
use crate::indication::{Indication, WaitProgress};
use crate::session::{CommandSession, Confirmation};

/// Length of a mioty network key.
pub const NETWORK_KEY_LEN: usize = 16;

/// Whether to read or write an optional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamAction {
    Read,
    Write(u8),
}

/// Inputs to [`MiotySensor::initialize`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Network key bytes.
    pub network_key: Vec<u8>,
    pub tx_power: Option<ParamAction>,
    pub mode: Option<ParamAction>,
    pub profile: Option<ParamAction>,
}

/// One command of a workflow and how the module answered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub label: String,
    pub outcome: Confirmation,
}

/// Result of [`MiotySensor::initialize`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub steps: Vec<StepReport>,
    #[serde(serialize_with = "hex_opt")]
    pub eui64: Option<Vec<u8>>,
    #[serde(serialize_with = "hex_opt")]
    pub short_addr: Option<Vec<u8>>,
    /// First byte of each parameter that was read.
    pub tx_power: Option<u8>,
    pub mode: Option<u8>,
    pub profile: Option<u8>,
}

impl InitReport {
    /// EUI-64 as dash-separated hex, e.g. `70-B3-D5-67-70-00-12-34`.
    pub fn eui64_string(&self) -> Option<String> {
        self.eui64.as_ref().map(|eui| {
            eui.iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join("-")
        })
    }

    /// Short address as contiguous hex.
    pub fn short_addr_string(&self) -> Option<String> {
        self.short_addr.as_ref().map(hex::encode_upper)
    }

    /// Whether every step succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_success())
    }
}

/// Inputs to [`MiotySensor::send_data`].
#[derive(Debug, Clone)]
pub struct SendOptions {
    /// Uplink payload.
    pub data: Vec<u8>,
    /// How long to wait for the downlink indication; zero skips the wait.
    pub timeout: Duration,
    pub poll_period: Duration,
}

/// Result of [`MiotySensor::send_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendReport {
    pub steps: Vec<StepReport>,
    /// `None` when no wait took place.
    pub indication: Option<Indication>,
    #[serde(serialize_with = "hex_opt")]
    pub downlink: Option<Vec<u8>>,
}

fn hex_opt<S: serde::Serializer>(
    bytes: &Option<Vec<u8>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match bytes {
        Some(bytes) => serializer.serialize_some(&hex::encode_upper(bytes)),
        None => serializer.serialize_none(),
    }
}

/// A mioty end device behind a SATP link.
#[derive(Debug)]
pub struct MiotySensor<C, K> {
    session: CommandSession<C, K>,
    cancel: Option<CancelFlag>,
}

impl<C: ByteChannel, K: Clock> MiotySensor<C, K> {
    pub fn new(channel: C, clock: K, config: &LinkConfig) -> Self {
        MiotySensor {
            session: CommandSession::new(channel, clock, config),
            cancel: None,
        }
    }

    /// Abort indication waits once `flag` is set.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn session(&self) -> &CommandSession<C, K> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut CommandSession<C, K> {
        &mut self.session
    }

    pub fn into_channel(self) -> C {
        self.session.into_channel()
    }

    /// Select the mioty stack, load the network key and read the device
    /// identity, then read or write the optional parameters.
    ///
    /// Device errors and missing replies are recorded and do not stop the
    /// sequence; channel failures do.
    pub fn initialize(&mut self, options: &InitOptions) -> Result<InitReport> {
        if options.network_key.len() != NETWORK_KEY_LEN {
            warn!(
                "Network key is {} bytes, expected {}",
                options.network_key.len(),
                NETWORK_KEY_LEN
            );
        }

        let mut report = InitReport::default();

        self.step(&mut report.steps, Command::SelectStack(StackId::Mioty))?;
        self.step(
            &mut report.steps,
            Command::Set {
                param: StackParam::MiotyNetworkKey,
                value: options.network_key.clone(),
            },
        )?;

        report.eui64 = self
            .step(
                &mut report.steps,
                Command::Get {
                    param: StackParam::MiotyEui64,
                },
            )?
            .payload()
            .map(<[u8]>::to_vec);
        if let Some(eui) = report.eui64_string() {
            info!("EUI64: {}", eui);
        }

        report.short_addr = self
            .step(
                &mut report.steps,
                Command::Get {
                    param: StackParam::MiotyShortAddr,
                },
            )?
            .payload()
            .map(<[u8]>::to_vec);
        if let Some(addr) = report.short_addr_string() {
            info!("Short address: {}", addr);
        }

        report.tx_power =
            self.apply(&mut report.steps, StackParam::MiotyTxPower, options.tx_power)?;
        report.mode = self.apply(&mut report.steps, StackParam::MiotyMode, options.mode)?;
        report.profile =
            self.apply(&mut report.steps, StackParam::MiotyProfile, options.profile)?;

        Ok(report)
    }

    /// Send one uplink with an RX window and fetch the downlink, if any.
    ///
    /// The indication wait is skipped when the timeout is zero or the module
    /// did not accept the uplink.
    pub fn send_data(
        &mut self,
        options: &SendOptions,
        on_progress: impl FnMut(WaitProgress),
    ) -> Result<SendReport> {
        let mut report = SendReport {
            steps: Vec::new(),
            indication: None,
            downlink: None,
        };

        self.step(
            &mut report.steps,
            Command::SendParams {
                param: SendParam::MiotyRxWindow,
                value: vec![0x01],
            },
        )?;
        let sent = self.step(
            &mut report.steps,
            Command::NbSend {
                data: options.data.clone(),
            },
        )?;

        if options.timeout.is_zero() {
            return Ok(report);
        }
        if !sent.is_accepted() {
            warn!("Uplink not accepted ({:?}), skipping downlink wait", sent);
            return Ok(report);
        }

        let indication = self.session.wait_for_event(
            StackEvent::RxSuccess.into(),
            options.timeout,
            options.poll_period,
            self.cancel.as_ref(),
            on_progress,
        )?;
        let found = indication.is_found();
        report.indication = Some(indication);

        if found {
            let received = self.step(&mut report.steps, Command::Receive)?;
            report.downlink = received.payload().map(<[u8]>::to_vec);
            if let Some(downlink) = &report.downlink {
                info!("Downlink: {}", hex::encode_upper(downlink));
            }
        } else {
            info!("No downlink within {:?}", options.timeout);
        }

        Ok(report)
    }

    fn step(&mut self, steps: &mut Vec<StepReport>, command: Command) -> Result<Confirmation> {
        let label = command.describe();
        let outcome = self.session.execute(&command)?;
        match &outcome {
            Confirmation::Success(_) => debug!("{}: OK", label),
            Confirmation::DeviceError(code) => warn!("{}: device error {}", label, code),
            Confirmation::NoResponse => warn!("{}: no response", label),
        }
        steps.push(StepReport {
            label,
            outcome: outcome.clone(),
        });
        Ok(outcome)
    }

    /// Read or write one optional parameter. Returns the value read.
    fn apply(
        &mut self,
        steps: &mut Vec<StepReport>,
        param: StackParam,
        action: Option<ParamAction>,
    ) -> Result<Option<u8>> {
        match action {
            None => Ok(None),
            Some(ParamAction::Read) => {
                let outcome = self.step(steps, Command::Get { param })?;
                let value = outcome.payload().and_then(|p| p.first().copied());
                if let Some(value) = value {
                    info!("{}: {} (0x{:02X})", param.label(), value, value);
                }
                Ok(value)
            }
            Some(ParamAction::Write(value)) => {
                self.step(
                    steps,
                    Command::Set {
                        param,
                        value: vec![value],
                    },
                )?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eui64_formatting() {
        let report = InitReport {
            eui64: Some(vec![0x70, 0xB3, 0xD5, 0x67, 0x70, 0x00, 0x12, 0x34]),
            short_addr: Some(vec![0xAB, 0x01]),
            ..InitReport::default()
        };
        assert_eq!(
            report.eui64_string().as_deref(),
            Some("70-B3-D5-67-70-00-12-34")
        );
        assert_eq!(report.short_addr_string().as_deref(), Some("AB01"));
    }

    #[test]
    fn test_all_succeeded() {
        let mut report = InitReport::default();
        report.steps.push(StepReport {
            label: "GET MIOTY_EUI64".to_string(),
            outcome: Confirmation::Success(vec![]),
        });
        assert!(report.all_succeeded());
        report.steps.push(StepReport {
            label: "GET MIOTY_SHORT_ADDR".to_string(),
            outcome: Confirmation::NoResponse,
        });
        assert!(!report.all_succeeded());
    }
}
