//! Commands that can be sent to the radio module.

use crate::constants::*;
use crate::error::FrameResult;
use crate::frame::encode_frame;
use crate::types::*;

/// Requests of the stack command and manufacturer APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Activate a radio stack.
    SelectStack(StackId),

    /// Write a stack parameter.
    Set {
        /// Parameter to write.
        param: StackParam,
        /// Raw value, opaque to the link.
        value: Vec<u8>,
    },

    /// Read a stack parameter.
    Get {
        /// Parameter to read.
        param: StackParam,
    },

    /// Blocking uplink.
    Send {
        /// Application payload.
        data: Vec<u8>,
    },

    /// Fetch the downlink received in the last RX window.
    Receive,

    /// Query the active stack.
    GetActiveStack,

    /// Set a parameter that applies to the next uplink.
    SendParams {
        /// Parameter to set.
        param: SendParam,
        /// Raw value.
        value: Vec<u8>,
    },

    /// Non-blocking uplink. The module confirms immediately and reports the
    /// outcome through indications.
    NbSend {
        /// Application payload.
        data: Vec<u8>,
    },

    /// Manufacturer-specific request.
    Manufacturer {
        /// Raw request bytes.
        data: Vec<u8>,
    },
}

impl Command {
    /// API id of the request.
    pub fn api_id(&self) -> u8 {
        match self {
            Command::Manufacturer { .. } => API_STACK_MANUFACTURER,
            _ => API_STACK_CMD,
        }
    }

    /// Command id within the API.
    pub fn command_id(&self) -> u8 {
        match self {
            Command::SelectStack(_) => STACK_SELECT_STACK,
            Command::Set { .. } => STACK_SET,
            Command::Get { .. } => STACK_GET,
            Command::Send { .. } => STACK_SEND,
            Command::Receive => STACK_RECEIVE,
            Command::GetActiveStack => STACK_GET_ACTIVE_STACK,
            Command::SendParams { .. } => STACK_SEND_PARAMS,
            Command::NbSend { .. } => STACK_NB_SEND,
            Command::Manufacturer { .. } => STACK_MANUFACTURER,
        }
    }

    /// Parameter bytes of the request.
    pub fn parameters(&self) -> Vec<u8> {
        match self {
            Command::SelectStack(stack) => vec![stack.as_u8()],
            Command::Set { param, value } => prefixed(param.as_u8(), value),
            Command::Get { param } => vec![param.as_u8()],
            Command::SendParams { param, value } => prefixed(param.as_u8(), value),
            Command::Send { data } | Command::NbSend { data } | Command::Manufacturer { data } => {
                data.clone()
            }
            Command::Receive | Command::GetActiveStack => Vec::new(),
        }
    }

    /// Encode the request as a wire frame.
    pub fn encode(&self) -> FrameResult<Vec<u8>> {
        encode_frame(self.api_id(), self.command_id(), &self.parameters())
    }

    /// Human-readable name, e.g. `SET MIOTY_NWKKEY`.
    pub fn describe(&self) -> String {
        match self {
            Command::SelectStack(stack) => format!("SELECT_STACK {:?}", stack),
            Command::Set { param, .. } => format!("SET {}", param.label()),
            Command::Get { param } => format!("GET {}", param.label()),
            Command::Send { data } => format!("SEND ({} bytes)", data.len()),
            Command::Receive => "RECEIVE".to_string(),
            Command::GetActiveStack => "GET_ACTIVE_STACK".to_string(),
            Command::SendParams { param, .. } => format!("SEND_PARAMS {:?}", param),
            Command::NbSend { data } => format!("NB_SEND ({} bytes)", data.len()),
            Command::Manufacturer { data } => format!("MANUFACTURER ({} bytes)", data.len()),
        }
    }
}

fn prefixed(id: u8, value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + value.len());
    out.push(id);
    out.extend_from_slice(value);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_stack_frame() {
        let cmd = Command::SelectStack(StackId::Mioty);
        assert_eq!(
            cmd.encode().unwrap(),
            [0xA5, 0x00, 0x04, 0xFF, 0xFB, 0x07, 0x00, 0x04, 0x04, 0x3F, 0x34]
        );
    }

    #[test]
    fn test_set_prefixes_param_id() {
        let cmd = Command::Set {
            param: StackParam::MiotyTxPower,
            value: vec![0x0E],
        };
        assert_eq!(cmd.api_id(), API_STACK_CMD);
        assert_eq!(cmd.command_id(), STACK_SET);
        assert_eq!(cmd.parameters(), vec![PARAM_MIOTY_TX_POWER, 0x0E]);
    }

    #[test]
    fn test_send_params_and_receive() {
        let arm = Command::SendParams {
            param: SendParam::MiotyRxWindow,
            value: vec![0x01],
        };
        assert_eq!(arm.command_id(), STACK_SEND_PARAMS);
        assert_eq!(arm.parameters(), vec![SEND_PARAM_MIOTY_RX_WINDOW, 0x01]);

        assert_eq!(Command::Receive.parameters(), Vec::<u8>::new());
        assert_eq!(Command::Receive.command_id(), STACK_RECEIVE);
    }

    #[test]
    fn test_nb_send_carries_data_verbatim() {
        let cmd = Command::NbSend {
            data: vec![0xDE, 0xAD],
        };
        assert_eq!(cmd.command_id(), 0x0C);
        assert_eq!(cmd.parameters(), vec![0xDE, 0xAD]);
        assert_eq!(cmd.describe(), "NB_SEND (2 bytes)");
    }

    #[test]
    fn test_manufacturer_api() {
        let cmd = Command::Manufacturer { data: vec![0x01] };
        assert_eq!(cmd.api_id(), 0xFF);
        assert_eq!(cmd.command_id(), 0x01);
    }
}
