//! Byte channels
//!
//! The link needs three primitives from its environment: write bytes, ask how
//! many bytes are waiting, and read them. [`SerialChannel`] provides them over
//! a serial port; [`ScriptedChannel`] plays back canned module replies.

use std::collections::{BTreeMap, VecDeque};
use std::io::{self, Read, Write};
use std::time::Duration;

use tracing::{debug, trace};

use crate::error::Result;

/// A duplex byte stream with a non-blocking availability check.
pub trait ByteChannel {
    /// Write and flush all of `data`.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Number of received bytes that can be read without blocking.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read up to `max` bytes.
    fn read(&mut self, max: usize) -> io::Result<Vec<u8>>;
}

impl<T: ByteChannel + ?Sized> ByteChannel for &mut T {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        (**self).read(max)
    }
}

impl<T: ByteChannel + ?Sized> ByteChannel for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        (**self).bytes_available()
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        (**self).read(max)
    }
}

// ============================================================================
// Serial port
// ============================================================================

/// A serial port opened with the `serialport` crate (8N1, no flow control).
pub struct SerialChannel {
    name: String,
    port: Box<dyn serialport::SerialPort>,
}

impl SerialChannel {
    /// Open `port` at `baud_rate`. `timeout` bounds each blocking read.
    pub fn open(port: &str, baud_rate: u32, timeout: Duration) -> Result<Self> {
        let handle = serialport::new(port, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .stop_bits(serialport::StopBits::One)
            .parity(serialport::Parity::None)
            .flow_control(serialport::FlowControl::None)
            .timeout(timeout)
            .open()?;
        debug!("Opened serial port {} at {} baud", port, baud_rate);
        Ok(SerialChannel {
            name: port.to_string(),
            port: handle,
        })
    }

    /// Port name as given to [`SerialChannel::open`].
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel").field("name", &self.name).finish()
    }
}

impl ByteChannel for SerialChannel {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        trace!("{}: TX {} bytes", self.name, data.len());
        Write::write_all(&mut self.port, data)?;
        Write::flush(&mut self.port)
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; max];
        let n = match Read::read(&mut self.port, &mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => 0,
            Err(e) => return Err(e),
        };
        buf.truncate(n);
        trace!("{}: RX {} bytes", self.name, n);
        Ok(buf)
    }
}

// ============================================================================
// Scripted channel
// ============================================================================

/// An in-memory channel that answers writes with queued replies and releases
/// scheduled bytes on given availability polls.
///
/// Each call to [`ByteChannel::bytes_available`] counts as one poll.
#[derive(Debug, Default)]
pub struct ScriptedChannel {
    rx: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    arrivals: BTreeMap<usize, Vec<u8>>,
    written: Vec<Vec<u8>>,
    polls: usize,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to become readable right after the next write.
    pub fn push_reply(&mut self, bytes: impl Into<Vec<u8>>) {
        self.replies.push_back(bytes.into());
    }

    /// Make bytes readable now.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Make bytes readable on the `n`th availability poll from now (1-based).
    pub fn arrive_on_poll(&mut self, n: usize, bytes: impl Into<Vec<u8>>) {
        self.arrivals
            .entry(self.polls + n)
            .or_default()
            .extend(bytes.into());
    }

    /// Everything written so far, one entry per `write_all` call.
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Number of availability polls so far.
    pub fn polls(&self) -> usize {
        self.polls
    }

    /// Bytes readable right now.
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }
}

impl ByteChannel for ScriptedChannel {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.written.push(data.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> io::Result<usize> {
        self.polls += 1;
        if let Some(bytes) = self.arrivals.remove(&self.polls) {
            self.rx.extend(bytes);
        }
        Ok(self.rx.len())
    }

    fn read(&mut self, max: usize) -> io::Result<Vec<u8>> {
        let n = max.min(self.rx.len());
        Ok(self.rx.drain(..n).collect())
    }
}
