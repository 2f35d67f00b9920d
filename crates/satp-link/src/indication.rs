//! Waiting for unsolicited indications.

use std::time::Duration;

use satp_protocol::Message;
use serde::Serialize;
use tracing::{debug, trace};

use crate::channel::ByteChannel;
use crate::clock::{CancelFlag, Clock};
use crate::error::{LinkError, Result};
use crate::transport::Transport;

/// Outcome of an indication wait.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Indication {
    /// The event arrived; carries the parameter bytes after the event code.
    Found(Vec<u8>),
    /// The poll budget or the deadline ran out first.
    TimedOut,
}

impl Indication {
    /// The event arrived.
    pub fn is_found(&self) -> bool {
        matches!(self, Indication::Found(_))
    }
}

/// Progress of a poll that found nothing to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitProgress {
    /// 1-based poll index.
    pub iteration: usize,
    /// Total polls allowed.
    pub budget: usize,
    /// Time since the wait started.
    pub elapsed: Duration,
}

impl WaitProgress {
    /// Fraction of the budget used, in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.budget == 0 {
            return 1.0;
        }
        self.iteration as f64 / self.budget as f64
    }
}

/// Number of polls for a wait: `ceil(timeout / poll_period)`.
pub fn poll_budget(timeout: Duration, poll_period: Duration) -> usize {
    let period = poll_period.as_nanos();
    if period == 0 {
        return 0;
    }
    let polls = timeout.as_nanos().div_ceil(period);
    usize::try_from(polls).unwrap_or(usize::MAX)
}

/// Polls a transport on a fixed cadence until a matching indication arrives.
///
/// Any message whose first parameter equals the event code matches,
/// regardless of its api or command id. Messages decoded after the match are
/// put back on the transport queue.
pub struct IndicationWaiter<'a, C, K> {
    transport: &'a mut Transport<C>,
    clock: &'a K,
    cancel: Option<CancelFlag>,
}

impl<'a, C: ByteChannel, K: Clock> IndicationWaiter<'a, C, K> {
    /// Wait on `transport`, sleeping and reading time through `clock`.
    pub fn new(transport: &'a mut Transport<C>, clock: &'a K) -> Self {
        IndicationWaiter {
            transport,
            clock,
            cancel: None,
        }
    }

    /// Stop waiting with [`LinkError::Cancelled`] once `flag` is set.
    pub fn with_cancel(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Wait up to `timeout` for `event_code`, polling every `poll_period`.
    ///
    /// `on_progress` is called after every poll that found nothing to read.
    pub fn wait_for_event(
        &mut self,
        event_code: u8,
        timeout: Duration,
        poll_period: Duration,
        mut on_progress: impl FnMut(WaitProgress),
    ) -> Result<Indication> {
        if poll_period.is_zero() {
            return Err(LinkError::InvalidPeriod);
        }

        let budget = poll_budget(timeout, poll_period);
        let start = self.clock.now();
        let deadline = start + timeout;
        debug!(
            "Waiting for event 0x{:02X}: {} polls every {:?}",
            event_code, budget, poll_period
        );

        for iteration in 1..=budget {
            if self.is_cancelled() {
                debug!("Wait for event 0x{:02X} cancelled", event_code);
                return Err(LinkError::Cancelled);
            }

            self.clock.sleep(poll_period);
            let received = self.transport.poll()?;

            if received > 0 || self.transport.has_queued() {
                let messages = self.transport.take_messages();
                if let Some(payload) = self.scan(event_code, messages) {
                    debug!(
                        "Event 0x{:02X} received on poll {}/{}",
                        event_code, iteration, budget
                    );
                    return Ok(Indication::Found(payload));
                }
            } else {
                on_progress(WaitProgress {
                    iteration,
                    budget,
                    elapsed: self.clock.now().saturating_duration_since(start),
                });
            }

            if self.clock.now() >= deadline {
                break;
            }
        }

        debug!("Event 0x{:02X} not received within {:?}", event_code, timeout);
        Ok(Indication::TimedOut)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled)
    }

    /// Return the payload of the first match and requeue what follows it.
    fn scan(&mut self, event_code: u8, messages: Vec<Message>) -> Option<Vec<u8>> {
        let mut messages = messages.into_iter();
        while let Some(message) = messages.next() {
            if message.lead_byte() == Some(event_code) {
                self.transport.requeue(messages);
                return Some(message.tail().to_vec());
            }
            trace!(
                "Ignoring message 0x{:02X}/0x{:02X} while waiting for event 0x{:02X}",
                message.api_id,
                message.command_id,
                event_code
            );
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_budget_rounds_up() {
        let period = Duration::from_millis(500);
        assert_eq!(poll_budget(Duration::from_secs(5), period), 10);
        assert_eq!(poll_budget(Duration::from_millis(5100), period), 11);
        assert_eq!(poll_budget(Duration::from_millis(1), period), 1);
        assert_eq!(poll_budget(Duration::ZERO, period), 0);
        assert_eq!(poll_budget(Duration::from_secs(1), Duration::ZERO), 0);
    }

    #[test]
    fn test_progress_fraction() {
        let progress = WaitProgress {
            iteration: 3,
            budget: 12,
            elapsed: Duration::from_millis(1500),
        };
        assert!((progress.fraction() - 0.25).abs() < f64::EPSILON);
    }
}
