//! Decoded messages.

use crate::types::{ApiId, StackEvent, StackReturn};
use serde::Serialize;

/// A frame payload split into its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Stack selector byte (0x07 for every frame seen so far).
    pub stack_id: u8,
    /// API the message belongs to.
    pub api_id: u8,
    /// Command or indication id within the API.
    pub command_id: u8,
    /// Parameter bytes; `None` when the payload ends after the command id.
    pub parameters: Option<Vec<u8>>,
}

impl Message {
    /// First parameter byte. Confirmations carry their status here and
    /// indications their event code.
    pub fn lead_byte(&self) -> Option<u8> {
        self.parameters.as_ref().and_then(|p| p.first().copied())
    }

    /// Parameter bytes after the lead byte.
    pub fn tail(&self) -> &[u8] {
        match self.parameters.as_deref() {
            Some([_, rest @ ..]) => rest,
            _ => &[],
        }
    }

    /// All parameter bytes, empty if absent.
    pub fn parameter_bytes(&self) -> &[u8] {
        self.parameters.as_deref().unwrap_or_default()
    }

    /// The API this message belongs to, if it is a known one.
    pub fn api(&self) -> Option<ApiId> {
        ApiId::from_u8(self.api_id)
    }

    /// Lead byte read as a confirmation status.
    pub fn status(&self) -> Option<StackReturn> {
        self.lead_byte().map(StackReturn::from)
    }

    /// Lead byte read as an indication event.
    pub fn event(&self) -> Option<StackEvent> {
        self.lead_byte().map(StackEvent::from)
    }
}
