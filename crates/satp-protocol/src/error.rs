//! Protocol error types.

use thiserror::Error;

/// Reasons a frame cannot be encoded or is rejected by the decoder.
///
/// An incomplete frame is not an error: the decoder reports it as
/// [`Decoded::NeedMoreData`](crate::Decoded::NeedMoreData).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The candidate frame does not start with the sync byte.
    #[error("sync byte mismatch: expected 0xA5, got 0x{found:02X}")]
    Sync {
        /// Byte found at the frame start.
        found: u8,
    },

    /// The length field disagrees with its complement.
    #[error("length check failed: length {length} does not match complement of {complement}")]
    Length {
        /// Declared payload length.
        length: u16,
        /// Raw complement field.
        complement: u16,
    },

    /// The checksum trailer does not match the payload.
    #[error("checksum mismatch: expected {expected:02X?}, got {actual:02X?}")]
    Checksum {
        /// Checksum computed over the payload.
        expected: [u8; 2],
        /// Checksum found in the trailer.
        actual: [u8; 2],
    },

    /// The payload is too short to carry stack, API and command ids.
    #[error("payload too short: {length} bytes, need at least 3")]
    PayloadTooShort {
        /// Declared payload length.
        length: usize,
    },

    /// The parameters do not fit the 16-bit length field.
    #[error("frame too long: maximum {max} parameter bytes, got {actual}")]
    TooLong {
        /// Maximum allowed parameter length.
        max: usize,
        /// Parameter length requested.
        actual: usize,
    },
}

impl FrameError {
    /// Whether the error describes bytes received from the link, as opposed
    /// to an unencodable outbound request.
    pub fn is_corrupt(&self) -> bool {
        !matches!(self, FrameError::TooLong { .. })
    }
}

/// Result type alias for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;
