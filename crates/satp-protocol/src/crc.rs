//! Frame checksum.
//!
//! A 16-bit shift register with polynomial `0x3D65`, seeded directly from the
//! first two payload bytes and flushed with 16 zero bits at the end. The two
//! register halves are inverted before transmission. This is not one of the
//! catalogued CRC-16 variants, so it is implemented bit by bit.

use crate::constants::CRC_POLYNOMIAL;

/// One register step: shift in `bit`, fold the polynomial if the register
/// overflowed.
#[inline]
fn step(reg: u16, bit: bool) -> u16 {
    let carry = reg & 0x8000 != 0;
    let reg = (reg << 1) | u16::from(bit);
    if carry {
        reg ^ CRC_POLYNOMIAL
    } else {
        reg
    }
}

/// Compute the checksum trailer `[hi, lo]` for a frame payload.
pub fn checksum(payload: &[u8]) -> [u8; 2] {
    let mut reg = match payload {
        [] => 0,
        [first] => u16::from(*first) << 8,
        [first, second, ..] => (u16::from(*first) << 8) + u16::from(*second),
    };

    for &byte in payload.iter().skip(2) {
        let mut byte = byte;
        for _ in 0..8 {
            reg = step(reg, byte & 0x80 != 0);
            byte <<= 1;
        }
    }

    for _ in 0..16 {
        reg = step(reg, false);
    }

    let [hi, lo] = reg.to_be_bytes();
    [!hi, !lo]
}
