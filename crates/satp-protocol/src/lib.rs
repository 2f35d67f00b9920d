//! SATP Serial Framing
//!
//! This crate implements the framing layer used to talk to SATP radio modules
//! (mioty and other stacks) over a serial line. The line itself carries an
//! unstructured byte stream; this crate turns commands into frames and
//! recovers messages from whatever chunks the line delivers.
//!
//! # Protocol Overview
//!
//! - **Frames** start with `0xA5`, carry a big-endian length and its
//!   complement, the payload, and a two-byte checksum over the payload.
//! - **Payloads** are `0x07 | api_id | command_id | parameters`.
//! - **Confirmations** answer commands on the command API; the first
//!   parameter byte is a [`StackReturn`] status.
//! - **Indications** arrive unsolicited on the indication API; the first
//!   parameter byte is a [`StackEvent`].
//!
//! # Example
//!
//! ```rust
//! use satp_protocol::{Command, StackParam, TransportReader};
//!
//! let frame = Command::Get { param: StackParam::MiotyEui64 }.encode()?;
//!
//! let mut reader = TransportReader::new();
//! reader.accumulate(&frame);
//! let messages = reader.drain();
//! assert_eq!(messages[0].parameters, Some(vec![0x62]));
//! # Ok::<(), satp_protocol::FrameError>(())
//! ```

mod commands;
mod constants;
mod crc;
mod error;
mod frame;
mod message;
mod reader;
mod types;

pub use commands::*;
pub use constants::*;
pub use crc::*;
pub use error::*;
pub use frame::*;
pub use message::*;
pub use reader::*;
pub use types::*;
