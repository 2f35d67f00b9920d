//! Receive buffer and frame extraction.

use bytes::{Buf, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::constants::SYNC_BYTE;
use crate::error::FrameError;
use crate::frame::{decode_frame, Decoded};
use crate::message::Message;

/// Initial receive buffer capacity.
pub const RECEIVE_BUFFER_CAPACITY: usize = 1024;

/// What the reader does when the bytes at the buffer head fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncPolicy {
    /// Stop extracting and leave the buffer untouched. A single bad byte at
    /// the head then blocks every later frame until [`TransportReader::clear`]
    /// is called.
    Halt,
    /// Drop the head byte and everything up to the next sync byte, then keep
    /// extracting.
    #[default]
    SkipByte,
}

/// Accumulates raw link bytes and extracts complete messages from them.
#[derive(Debug)]
pub struct TransportReader {
    buffer: BytesMut,
    policy: ResyncPolicy,
    errors: u64,
    discarded: u64,
    last_error: Option<FrameError>,
}

impl Default for TransportReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportReader {
    /// Create a reader with the default resync policy.
    pub fn new() -> Self {
        Self::with_policy(ResyncPolicy::default())
    }

    /// Create a reader with an explicit resync policy.
    pub fn with_policy(policy: ResyncPolicy) -> Self {
        TransportReader {
            buffer: BytesMut::with_capacity(RECEIVE_BUFFER_CAPACITY),
            policy,
            errors: 0,
            discarded: 0,
            last_error: None,
        }
    }

    /// The active resync policy.
    pub fn policy(&self) -> ResyncPolicy {
        self.policy
    }

    /// Append received bytes.
    pub fn accumulate(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to extract the next message.
    ///
    /// `Ok(None)` means the buffer holds no complete frame. A corrupt head is
    /// returned as an error; under [`ResyncPolicy::SkipByte`] the offending
    /// bytes are already gone when it is returned, so calling again makes
    /// progress.
    pub fn next_message(&mut self) -> Result<Option<Message>, FrameError> {
        match decode_frame(&self.buffer) {
            Ok(Decoded::Frame { consumed, message }) => {
                self.buffer.advance(consumed);
                trace!(
                    "Decoded frame api=0x{:02X} cmd=0x{:02X} ({} bytes, {} left)",
                    message.api_id,
                    message.command_id,
                    consumed,
                    self.buffer.len()
                );
                Ok(Some(message))
            }
            Ok(Decoded::NeedMoreData) => Ok(None),
            Err(err) => {
                self.errors += 1;
                self.last_error = Some(err.clone());
                if self.policy == ResyncPolicy::SkipByte {
                    let skipped = self.resync();
                    warn!("Discarded {} bytes after frame error: {}", skipped, err);
                } else {
                    warn!("Frame error, extraction halted: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Extract every complete message currently buffered, in arrival order.
    ///
    /// Stops at the first incomplete frame. Under [`ResyncPolicy::Halt`] it
    /// also stops at the first corrupt frame; under
    /// [`ResyncPolicy::SkipByte`] corrupt bytes are dropped and extraction
    /// continues.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        loop {
            match self.next_message() {
                Ok(Some(message)) => messages.push(message),
                Ok(None) => break,
                Err(_) if self.policy == ResyncPolicy::SkipByte => continue,
                Err(_) => break,
            }
        }
        messages
    }

    /// Drop the head byte and everything before the next sync candidate.
    fn resync(&mut self) -> usize {
        let skip = self
            .buffer
            .iter()
            .skip(1)
            .position(|&b| b == SYNC_BYTE)
            .map_or(self.buffer.len(), |pos| pos + 1);
        self.buffer.advance(skip);
        self.discarded += skip as u64;
        skip
    }

    /// Number of bytes waiting to be decoded.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes waiting to be decoded.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of corrupt frames seen so far.
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Number of bytes dropped while resynchronising.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// The most recent frame error.
    pub fn last_error(&self) -> Option<&FrameError> {
        self.last_error.as_ref()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.discarded += self.buffer.len() as u64;
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::encode_frame;

    fn frame(api: u8, cmd: u8, params: &[u8]) -> Vec<u8> {
        encode_frame(api, cmd, params).unwrap()
    }

    #[test]
    fn test_drain_two_frames() {
        let mut reader = TransportReader::new();
        reader.accumulate(&frame(0x00, 0x03, &[0x00, 0x11]));
        reader.accumulate(&frame(0x01, 0x02, &[0x03]));

        let messages = reader.drain();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].command_id, 0x03);
        assert_eq!(messages[0].parameters, Some(vec![0x00, 0x11]));
        assert_eq!(messages[1].api_id, 0x01);
        assert_eq!(messages[1].parameters, Some(vec![0x03]));
        assert_eq!(reader.buffered_len(), 0);
    }

    #[test]
    fn test_partial_frame_stays_buffered() {
        let bytes = frame(0x00, 0x06, &[0x00, 0x11, 0x22]);
        let mut reader = TransportReader::new();

        reader.accumulate(&bytes[..6]);
        assert!(reader.drain().is_empty());
        assert_eq!(reader.buffered_len(), 6);
        assert_eq!(reader.errors(), 0);

        reader.accumulate(&bytes[6..]);
        let messages = reader.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].parameters, Some(vec![0x00, 0x11, 0x22]));
        assert_eq!(reader.buffered_len(), 0);
    }

    #[test]
    fn test_byte_by_byte_delivery() {
        let bytes = frame(0x00, 0x02, &[0x00]);
        let mut reader = TransportReader::new();
        let mut decoded = Vec::new();
        for b in &bytes {
            reader.accumulate(&[*b]);
            decoded.extend(reader.drain());
        }
        assert_eq!(decoded.len(), 1);
        assert_eq!(reader.errors(), 0);
    }

    #[test]
    fn test_skip_byte_resyncs_past_garbage() {
        let mut reader = TransportReader::new();
        reader.accumulate(&[0x00, 0x13, 0x37]);
        reader.accumulate(&frame(0x00, 0x04, &[0x00]));

        let messages = reader.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].command_id, 0x04);
        assert_eq!(reader.errors(), 1);
        assert_eq!(reader.discarded(), 3);
        assert_eq!(reader.buffered_len(), 0);
    }

    #[test]
    fn test_skip_byte_drops_corrupt_frame() {
        let mut bad = frame(0x00, 0x03, &[0x00, 0x01]);
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;

        let mut reader = TransportReader::new();
        reader.accumulate(&bad);
        reader.accumulate(&frame(0x01, 0x02, &[0x03]));

        let messages = reader.drain();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].api_id, 0x01);
        assert!(matches!(reader.last_error(), Some(FrameError::Checksum { .. })));
    }

    #[test]
    fn test_halt_policy_stalls_on_corrupt_head() {
        let mut reader = TransportReader::with_policy(ResyncPolicy::Halt);
        reader.accumulate(&[0x00]);
        reader.accumulate(&frame(0x00, 0x04, &[0x00]));
        let before = reader.buffered_len();

        assert!(reader.drain().is_empty());
        assert!(reader.drain().is_empty());
        assert_eq!(reader.buffered_len(), before);
        assert_eq!(reader.errors(), 2);
        assert_eq!(reader.last_error(), Some(&FrameError::Sync { found: 0x00 }));

        reader.clear();
        reader.accumulate(&frame(0x00, 0x04, &[0x00]));
        assert_eq!(reader.drain().len(), 1);
    }

    #[test]
    fn test_garbage_without_sync_is_dropped_entirely() {
        let mut reader = TransportReader::new();
        reader.accumulate(&[0x01, 0x02, 0x03, 0x04]);
        assert!(reader.drain().is_empty());
        assert_eq!(reader.buffered_len(), 0);
        assert_eq!(reader.discarded(), 4);
    }
}
