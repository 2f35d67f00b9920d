//! Frame encoding/decoding.
//!
//! Every frame carries a big-endian payload length twice, the second time
//! bit-inverted, and ends with a two-byte checksum over the payload.
//!
//! ```text
//! +------+--------+--------+---------+---------+----------------------+--------+--------+
//! | 0xA5 | len_hi | len_lo | ~len_hi | ~len_lo | payload[0..len]      | crc_hi | crc_lo |
//! +------+--------+--------+---------+---------+----------------------+--------+--------+
//!
//! payload = 0x07 | api_id | command_id | parameters...
//! ```

use bytes::BufMut;

use crate::constants::*;
use crate::crc::checksum;
use crate::error::{FrameError, FrameResult};
use crate::message::Message;

/// Outcome of a decode attempt at the head of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A complete, verified frame.
    Frame {
        /// Bytes the frame occupied, header and trailer included.
        consumed: usize,
        /// The decoded payload.
        message: Message,
    },
    /// The buffer holds the start of a frame but not all of it yet.
    NeedMoreData,
}

/// Build the wire frame for a command.
///
/// Fails only when `parameters` is longer than [`MAX_PARAMETERS_LEN`].
pub fn encode_frame(api_id: u8, command_id: u8, parameters: &[u8]) -> FrameResult<Vec<u8>> {
    if parameters.len() > MAX_PARAMETERS_LEN {
        return Err(FrameError::TooLong {
            max: MAX_PARAMETERS_LEN,
            actual: parameters.len(),
        });
    }
    let length = (PAYLOAD_HEADER_SIZE + parameters.len()) as u16;

    let mut buf = Vec::with_capacity(FRAME_OVERHEAD + length as usize);
    buf.put_u8(SYNC_BYTE);
    buf.put_u16(length);
    buf.put_u16(!length);

    let payload_start = buf.len();
    buf.put_u8(STACK_SELECTOR);
    buf.put_u8(api_id);
    buf.put_u8(command_id);
    buf.extend_from_slice(parameters);

    let crc = checksum(&buf[payload_start..]);
    buf.extend_from_slice(&crc);
    Ok(buf)
}

/// Try to decode one frame from the start of `buf`.
///
/// Checks run in wire order: sync byte, then (once the header is buffered)
/// the length complement, then (once the whole frame is buffered) the
/// checksum.
pub fn decode_frame(buf: &[u8]) -> FrameResult<Decoded> {
    match buf.first() {
        None => return Ok(Decoded::NeedMoreData),
        Some(&SYNC_BYTE) => {}
        Some(&found) => return Err(FrameError::Sync { found }),
    }

    if buf.len() < FRAME_OVERHEAD {
        return Ok(Decoded::NeedMoreData);
    }

    let length = u16::from_be_bytes([buf[1], buf[2]]);
    let complement = u16::from_be_bytes([buf[3], buf[4]]);
    if length != !complement {
        return Err(FrameError::Length { length, complement });
    }

    let length = length as usize;
    let frame_len = FRAME_OVERHEAD + length;
    if buf.len() < frame_len {
        return Ok(Decoded::NeedMoreData);
    }

    let payload = &buf[HEADER_SIZE..HEADER_SIZE + length];
    let expected = checksum(payload);
    let actual = [buf[HEADER_SIZE + length], buf[HEADER_SIZE + length + 1]];
    if expected != actual {
        return Err(FrameError::Checksum { expected, actual });
    }

    let message = match payload {
        [stack_id, api_id, command_id, parameters @ ..] => Message {
            stack_id: *stack_id,
            api_id: *api_id,
            command_id: *command_id,
            parameters: if parameters.is_empty() {
                None
            } else {
                Some(parameters.to_vec())
            },
        },
        _ => return Err(FrameError::PayloadTooShort { length }),
    };

    Ok(Decoded::Frame {
        consumed: frame_len,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const GET_EUI64: [u8; 11] = [0xA5, 0x00, 0x04, 0xFF, 0xFB, 0x07, 0x00, 0x03, 0x62, 0x27, 0x05];

    fn expect_frame(buf: &[u8]) -> (usize, Message) {
        match decode_frame(buf).expect("should decode") {
            Decoded::Frame { consumed, message } => (consumed, message),
            Decoded::NeedMoreData => panic!("expected a complete frame"),
        }
    }

    #[test]
    fn test_encode_known_frames() {
        assert_eq!(encode_frame(0x00, 0x03, &[0x62]).unwrap(), GET_EUI64);
        assert_eq!(
            encode_frame(0x00, 0x07, &[]).unwrap(),
            [0xA5, 0x00, 0x03, 0xFF, 0xFC, 0x07, 0x00, 0x07, 0x8F, 0x58]
        );
    }

    #[test]
    fn test_decode_known_frame() {
        let (consumed, message) = expect_frame(&GET_EUI64);
        assert_eq!(consumed, GET_EUI64.len());
        assert_eq!(message.stack_id, STACK_SELECTOR);
        assert_eq!(message.api_id, API_STACK_CMD);
        assert_eq!(message.command_id, STACK_GET);
        assert_eq!(message.parameters, Some(vec![PARAM_MIOTY_EUI64]));
    }

    #[test]
    fn test_decode_without_parameters() {
        let frame = encode_frame(0x00, 0x07, &[]).unwrap();
        let (consumed, message) = expect_frame(&frame);
        assert_eq!(consumed, 10);
        assert_eq!(message.parameters, None);
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        let mut buf = GET_EUI64.to_vec();
        buf.extend_from_slice(&[SYNC_BYTE, 0x00]);
        let (consumed, _) = expect_frame(&buf);
        assert_eq!(consumed, GET_EUI64.len());
    }

    #[test]
    fn test_decode_needs_more_data() {
        assert_eq!(decode_frame(&[]), Ok(Decoded::NeedMoreData));
        for end in 1..GET_EUI64.len() {
            assert_eq!(
                decode_frame(&GET_EUI64[..end]),
                Ok(Decoded::NeedMoreData),
                "prefix of {} bytes",
                end
            );
        }
    }

    #[test]
    fn test_decode_sync_error() {
        let mut frame = GET_EUI64;
        frame[0] = 0x5A;
        assert_eq!(decode_frame(&frame), Err(FrameError::Sync { found: 0x5A }));
        // Checked before anything else, even on a single byte.
        assert_eq!(decode_frame(&[0x00]), Err(FrameError::Sync { found: 0x00 }));
    }

    #[test]
    fn test_decode_length_error() {
        let mut frame = GET_EUI64;
        frame[4] = 0xFA;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::Length {
                length: 0x0004,
                complement: 0xFFFA,
            })
        );
    }

    #[test]
    fn test_decode_checksum_error() {
        let mut frame = GET_EUI64;
        frame[10] ^= 0x01;
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::Checksum {
                expected: [0x27, 0x05],
                actual: [0x27, 0x04],
            })
        );
    }

    #[test]
    fn test_decode_short_payload() {
        // length 2, valid complement and checksum, but no command id.
        let payload = [0x07, 0x00];
        let crc = checksum(&payload);
        let frame = [0xA5, 0x00, 0x02, 0xFF, 0xFD, 0x07, 0x00, crc[0], crc[1]];
        assert_eq!(
            decode_frame(&frame),
            Err(FrameError::PayloadTooShort { length: 2 })
        );
    }

    #[test]
    fn test_encode_too_long() {
        let parameters = vec![0u8; MAX_PARAMETERS_LEN + 1];
        assert_eq!(
            encode_frame(0x00, 0x05, &parameters),
            Err(FrameError::TooLong {
                max: MAX_PARAMETERS_LEN,
                actual: MAX_PARAMETERS_LEN + 1,
            })
        );
    }

    #[test]
    fn test_encode_max_length() {
        let parameters = vec![0x5Au8; MAX_PARAMETERS_LEN];
        let frame = encode_frame(0x00, 0x05, &parameters).unwrap();
        assert_eq!(&frame[1..5], &[0xFF, 0xFF, 0x00, 0x00]);
        let (consumed, message) = expect_frame(&frame);
        assert_eq!(consumed, frame.len());
        assert_eq!(message.parameters.map(|p| p.len()), Some(MAX_PARAMETERS_LEN));
    }
}
