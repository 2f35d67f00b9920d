//! A byte channel paired with its receive buffer.

use std::collections::VecDeque;

use satp_protocol::{Message, ResyncPolicy, TransportReader};
use tracing::trace;

use crate::channel::ByteChannel;
use crate::error::Result;

/// Owns the channel and the receive buffer for the lifetime of a connection.
///
/// Messages decoded but not yet consumed (for example indications that
/// arrived together with a confirmation) are kept in a queue and handed out
/// before anything newly read.
#[derive(Debug)]
pub struct Transport<C> {
    channel: C,
    reader: TransportReader,
    queued: VecDeque<Message>,
}

impl<C: ByteChannel> Transport<C> {
    /// Wrap a channel with an empty receive buffer.
    pub fn new(channel: C, policy: ResyncPolicy) -> Self {
        Transport {
            channel,
            reader: TransportReader::with_policy(policy),
            queued: VecDeque::new(),
        }
    }

    /// Write a complete frame.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.channel.write_all(frame)?;
        Ok(())
    }

    /// Bytes waiting on the channel.
    pub fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.channel.bytes_available()?)
    }

    /// Check the channel once and move whatever is waiting into the receive
    /// buffer. Returns the number of bytes read.
    pub fn poll(&mut self) -> Result<usize> {
        let available = self.channel.bytes_available()?;
        if available == 0 {
            return Ok(0);
        }
        let bytes = self.channel.read(available)?;
        self.reader.accumulate(&bytes);
        trace!("Read {} bytes ({} buffered)", bytes.len(), self.reader.buffered_len());
        Ok(bytes.len())
    }

    /// Queued messages followed by every complete message in the receive
    /// buffer. Does not touch the channel.
    pub fn take_messages(&mut self) -> Vec<Message> {
        let mut messages: Vec<Message> = self.queued.drain(..).collect();
        messages.extend(self.reader.drain());
        messages
    }

    /// Poll the channel once, then take every available message.
    pub fn drain(&mut self) -> Result<Vec<Message>> {
        self.poll()?;
        Ok(self.take_messages())
    }

    /// Put unconsumed messages back at the front of the queue.
    pub fn requeue(&mut self, messages: impl IntoIterator<Item = Message>) {
        let mut messages: Vec<Message> = messages.into_iter().collect();
        messages.extend(self.queued.drain(..));
        self.queued = messages.into();
    }

    /// Keep only the queued messages matching `keep`. Returns how many were
    /// dropped.
    pub fn retain_queued(&mut self, keep: impl Fn(&Message) -> bool) -> usize {
        let before = self.queued.len();
        self.queued.retain(|m| keep(m));
        before - self.queued.len()
    }

    /// Whether decoded messages are waiting in the queue.
    pub fn has_queued(&self) -> bool {
        !self.queued.is_empty()
    }

    /// The receive buffer.
    pub fn reader(&self) -> &TransportReader {
        &self.reader
    }

    /// The receive buffer, mutably (e.g. to clear it after a stall).
    pub fn reader_mut(&mut self) -> &mut TransportReader {
        &mut self.reader
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// The underlying channel, mutably.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Give back the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}
