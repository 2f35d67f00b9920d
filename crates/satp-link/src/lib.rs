//! SATP Link
//!
//! Drives a SATP radio module over a byte channel: one command at a time,
//! each answered by a confirmation read after a fixed settle delay, plus
//! polling waits for unsolicited indications.
//!
//! The environment is abstracted behind two traits so that sessions run the
//! same against a serial port and against scripted test doubles:
//!
//! - [`ByteChannel`] writes bytes, reports how many are waiting and reads them.
//!   [`SerialChannel`] is the real implementation, [`ScriptedChannel`] the
//!   test double.
//! - [`Clock`] gives monotonic time and sleeps. [`SystemClock`] uses wall
//!   time, [`ManualClock`] only advances when slept on.
//!
//! # Example
//!
//! ```rust
//! use satp_link::{CommandSession, Confirmation, LinkConfig, ManualClock, ScriptedChannel};
//! use satp_protocol::{encode_frame, Command, StackParam};
//!
//! let mut channel = ScriptedChannel::new();
//! channel.push_reply(encode_frame(0x00, 0x03, &[0x00, 0x12, 0x34])?);
//!
//! let clock = ManualClock::new();
//! let mut session = CommandSession::new(&mut channel, &clock, &LinkConfig::default());
//! let reply = session.execute(&Command::Get { param: StackParam::MiotyShortAddr })?;
//! assert_eq!(reply, Confirmation::Success(vec![0x12, 0x34]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod channel;
mod clock;
mod config;
mod error;
mod indication;
mod sensor;
mod session;
mod transport;

pub use channel::*;
pub use clock::*;
pub use config::*;
pub use error::*;
pub use indication::*;
pub use sensor::*;
pub use session::*;
pub use transport::*;
