//! Command/confirmation sessions.
//!
//! The module answers every command with exactly one confirmation and the
//! link carries no request ids, so a session allows a single command in
//! flight. After sending, the session waits a fixed settle delay and takes the
//! reply to that command as the confirmation.

use std::time::{Duration, Instant};

use satp_protocol::{encode_frame, Command, Message, StackReturn, API_STACK_IND};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::channel::ByteChannel;
use crate::clock::{CancelFlag, Clock};
use crate::config::LinkConfig;
use crate::error::{LinkError, Result};
use crate::indication::{Indication, IndicationWaiter, WaitProgress};
use crate::transport::Transport;

/// Where the session is in its send/confirm cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No command outstanding.
    Idle,
    /// Frame handed to the channel, write not yet complete.
    Sent,
    /// Frame written, confirmation not yet read.
    AwaitingConfirmation,
}

/// The command currently awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCommand {
    /// API id of the frame that was written.
    pub api_id: u8,
    /// Command id of the frame that was written.
    pub command_id: u8,
    /// When the write completed.
    pub sent_at: Instant,
}

/// How the module answered a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Confirmation {
    /// Status 0; carries the parameter bytes after the status.
    Success(Vec<u8>),
    /// Nonzero status.
    DeviceError(StackReturn),
    /// Nothing decodable arrived within the settle delay.
    NoResponse,
}

impl Confirmation {
    /// Classify the first message received after a command.
    ///
    /// `None` when the message has no status byte.
    pub fn from_message(message: &Message) -> Option<Self> {
        let status = message.lead_byte()?;
        Some(if status == 0 {
            Confirmation::Success(message.tail().to_vec())
        } else {
            Confirmation::DeviceError(StackReturn::from(status))
        })
    }

    /// Status 0.
    pub fn is_success(&self) -> bool {
        matches!(self, Confirmation::Success(_))
    }

    /// Success, or a nonzero status that still means the module took the
    /// command (e.g. success-wait-for-event).
    pub fn is_accepted(&self) -> bool {
        match self {
            Confirmation::Success(_) => true,
            Confirmation::DeviceError(code) => code.is_success(),
            Confirmation::NoResponse => false,
        }
    }

    /// Result payload of a successful confirmation.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Confirmation::Success(payload) => Some(payload),
            _ => None,
        }
    }
}

/// Drives one command at a time over a [`Transport`].
#[derive(Debug)]
pub struct CommandSession<C, K> {
    transport: Transport<C>,
    clock: K,
    settle_delay: Duration,
    state: SessionState,
    pending: Option<PendingCommand>,
}

impl<C: ByteChannel, K: Clock> CommandSession<C, K> {
    /// Create a session over `channel` using the timing and resync policy of
    /// `config`.
    pub fn new(channel: C, clock: K, config: &LinkConfig) -> Self {
        CommandSession {
            transport: Transport::new(channel, config.resync),
            clock,
            settle_delay: config.settle_delay(),
            state: SessionState::Idle,
            pending: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The command awaiting confirmation, if any.
    pub fn pending(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    /// Settle delay used by [`CommandSession::execute`].
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Frame and write a command.
    pub fn send(&mut self, api_id: u8, command_id: u8, parameters: &[u8]) -> Result<()> {
        if let Some(pending) = &self.pending {
            return Err(LinkError::CommandInFlight {
                api_id: pending.api_id,
                command_id: pending.command_id,
            });
        }

        let frame = encode_frame(api_id, command_id, parameters)?;
        let stale = self.transport.retain_queued(is_indication);
        if stale > 0 {
            debug!("Dropped {} unclaimed replies before sending", stale);
        }
        trace!(
            "Sending command 0x{:02X}/0x{:02X} ({} bytes)",
            api_id,
            command_id,
            frame.len()
        );

        self.state = SessionState::Sent;
        if let Err(e) = self.transport.write_frame(&frame) {
            self.state = SessionState::Idle;
            return Err(e);
        }

        self.pending = Some(PendingCommand {
            api_id,
            command_id,
            sent_at: self.clock.now(),
        });
        self.state = SessionState::AwaitingConfirmation;
        Ok(())
    }

    /// Send a typed command.
    pub fn send_command(&mut self, command: &Command) -> Result<()> {
        self.send(command.api_id(), command.command_id(), &command.parameters())
    }

    /// Wait `settle_delay`, then classify the reply to the pending command.
    ///
    /// The reply is the first message echoing the command's api and command
    /// ids, or failing that the first message outside the indication API.
    /// Indications are never taken as confirmations. Every message not taken
    /// stays queued for the next read or indication wait.
    pub fn confirm(&mut self, settle_delay: Duration) -> Result<Confirmation> {
        let pending = self.pending.ok_or(LinkError::NotAwaiting)?;

        self.clock.sleep(settle_delay);
        let drained = self.transport.drain();
        self.pending = None;
        self.state = SessionState::Idle;
        let mut messages = drained?;

        let Some(index) = reply_position(&messages, &pending) else {
            debug!(
                "No response to 0x{:02X}/0x{:02X} after {:?}",
                pending.api_id, pending.command_id, settle_delay
            );
            self.transport.requeue(messages);
            return Ok(Confirmation::NoResponse);
        };
        let reply = messages.remove(index);
        self.transport.requeue(messages);

        if reply.api_id != pending.api_id || reply.command_id != pending.command_id {
            warn!(
                "Reply 0x{:02X}/0x{:02X} does not echo command 0x{:02X}/0x{:02X}",
                reply.api_id, reply.command_id, pending.api_id, pending.command_id
            );
        }

        let confirmation =
            Confirmation::from_message(&reply).ok_or(LinkError::MissingStatus {
                api_id: pending.api_id,
                command_id: pending.command_id,
            })?;
        debug!(
            "Command 0x{:02X}/0x{:02X} -> {:?} ({:?} after send)",
            pending.api_id,
            pending.command_id,
            confirmation,
            self.clock.now().saturating_duration_since(pending.sent_at)
        );
        Ok(confirmation)
    }

    /// Send a command and read its confirmation after the configured settle
    /// delay.
    pub fn execute(&mut self, command: &Command) -> Result<Confirmation> {
        debug!("Executing {}", command.describe());
        self.send_command(command)?;
        self.confirm(self.settle_delay)
    }

    /// Poll for an indication whose event code is `event_code`.
    ///
    /// Only allowed between commands.
    pub fn wait_for_event(
        &mut self,
        event_code: u8,
        timeout: Duration,
        poll_period: Duration,
        cancel: Option<&CancelFlag>,
        on_progress: impl FnMut(WaitProgress),
    ) -> Result<Indication> {
        if let Some(pending) = &self.pending {
            return Err(LinkError::CommandInFlight {
                api_id: pending.api_id,
                command_id: pending.command_id,
            });
        }
        let mut waiter = IndicationWaiter::new(&mut self.transport, &self.clock);
        if let Some(flag) = cancel {
            waiter = waiter.with_cancel(flag.clone());
        }
        waiter.wait_for_event(event_code, timeout, poll_period, on_progress)
    }

    /// The transport, e.g. to inspect the receive buffer.
    pub fn transport(&self) -> &Transport<C> {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut Transport<C> {
        &mut self.transport
    }

    /// The clock.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Give back the channel.
    pub fn into_channel(self) -> C {
        self.transport.into_channel()
    }
}

fn is_indication(message: &Message) -> bool {
    message.api_id == API_STACK_IND
}

/// Index of the message answering `pending`.
fn reply_position(messages: &[Message], pending: &PendingCommand) -> Option<usize> {
    messages
        .iter()
        .position(|m| m.api_id == pending.api_id && m.command_id == pending.command_id)
        .or_else(|| messages.iter().position(|m| !is_indication(m)))
}
