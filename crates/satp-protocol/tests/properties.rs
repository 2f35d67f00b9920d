//! Property tests for the frame codec and receive buffer.

use proptest::prelude::*;
use satp_protocol::{checksum, decode_frame, encode_frame, Decoded, FrameError, TransportReader};

proptest! {
    #[test]
    fn encoded_frames_decode_to_the_same_fields(
        api_id in any::<u8>(),
        command_id in any::<u8>(),
        params in proptest::collection::vec(any::<u8>(), 0..=250),
    ) {
        let frame = encode_frame(api_id, command_id, &params).unwrap();
        match decode_frame(&frame).unwrap() {
            Decoded::Frame { consumed, message } => {
                prop_assert_eq!(consumed, 7 + 3 + params.len());
                prop_assert_eq!(message.stack_id, 0x07);
                prop_assert_eq!(message.api_id, api_id);
                prop_assert_eq!(message.command_id, command_id);
                let expected = if params.is_empty() { None } else { Some(params.clone()) };
                prop_assert_eq!(message.parameters, expected);
            }
            Decoded::NeedMoreData => prop_assert!(false, "complete frame reported as partial"),
        }
    }

    #[test]
    fn single_bit_flips_change_the_checksum(
        params in proptest::collection::vec(any::<u8>(), 0..=64),
        bit in any::<prop::sample::Index>(),
    ) {
        let mut payload = vec![0x07, 0x00, 0x05];
        payload.extend_from_slice(&params);
        let original = checksum(&payload);

        let bit = bit.index(payload.len() * 8);
        payload[bit / 8] ^= 0x80 >> (bit % 8);
        prop_assert_ne!(checksum(&payload), original);
    }

    #[test]
    fn flipped_payload_bits_are_rejected(
        params in proptest::collection::vec(any::<u8>(), 1..=32),
        bit in any::<prop::sample::Index>(),
    ) {
        let mut frame = encode_frame(0x00, 0x05, &params).unwrap();
        let payload_bits = (frame.len() - 7) * 8;
        let bit = bit.index(payload_bits);
        frame[5 + bit / 8] ^= 0x80 >> (bit % 8);
        let is_checksum_error = matches!(decode_frame(&frame), Err(FrameError::Checksum { .. }));
        prop_assert!(is_checksum_error);
    }

    #[test]
    fn arbitrary_chunking_yields_every_frame(
        frames in proptest::collection::vec(
            (any::<u8>(), any::<u8>(), proptest::collection::vec(any::<u8>(), 0..=16)),
            1..=6,
        ),
        chunk in 1usize..=13,
    ) {
        let mut stream = Vec::new();
        for (api, cmd, params) in &frames {
            stream.extend(encode_frame(*api, *cmd, params).unwrap());
        }

        let mut reader = TransportReader::new();
        let mut decoded = Vec::new();
        for piece in stream.chunks(chunk) {
            reader.accumulate(piece);
            decoded.extend(reader.drain());
        }

        prop_assert_eq!(decoded.len(), frames.len());
        for (message, (api, cmd, _)) in decoded.iter().zip(&frames) {
            prop_assert_eq!(message.api_id, *api);
            prop_assert_eq!(message.command_id, *cmd);
        }
        prop_assert_eq!(reader.buffered_len(), 0);
        prop_assert_eq!(reader.errors(), 0);
    }
}

#[test]
fn corrupted_trailer_is_never_accepted() {
    let frame = encode_frame(0x00, 0x03, &[0x00, 0x11, 0x22]).unwrap();
    for idx in [frame.len() - 2, frame.len() - 1] {
        for mask in [0x01u8, 0x10, 0x80, 0xFF] {
            let mut bad = frame.clone();
            bad[idx] ^= mask;
            assert!(matches!(
                decode_frame(&bad),
                Err(FrameError::Checksum { .. })
            ));
        }
    }
}
