//! Link error types.

use satp_protocol::FrameError;
use thiserror::Error;

/// Failures while driving the link. Device-reported statuses, missing
/// replies and indication timeouts are outcomes, not errors; see
/// [`Confirmation`](crate::Confirmation) and [`Indication`](crate::Indication).
#[derive(Debug, Error)]
pub enum LinkError {
    /// Reading from or writing to the channel failed.
    #[error("channel I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// The request could not be framed.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A command was sent while another one still awaits confirmation.
    #[error("command 0x{api_id:02X}/0x{command_id:02X} is still awaiting confirmation")]
    CommandInFlight {
        /// API id of the outstanding command.
        api_id: u8,
        /// Command id of the outstanding command.
        command_id: u8,
    },

    /// `confirm` was called with no command outstanding.
    #[error("no command is awaiting confirmation")]
    NotAwaiting,

    /// The reply to a command carried no status byte.
    #[error("reply to command 0x{api_id:02X}/0x{command_id:02X} carried no status byte")]
    MissingStatus {
        /// API id of the confirmed command.
        api_id: u8,
        /// Command id of the confirmed command.
        command_id: u8,
    },

    /// An indication wait was cancelled.
    #[error("wait cancelled")]
    Cancelled,

    /// An indication wait was started with a zero poll period.
    #[error("poll period must be greater than zero")]
    InvalidPeriod,

    /// The configuration file could not be loaded.
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for link operations.
pub type Result<T> = std::result::Result<T, LinkError>;
