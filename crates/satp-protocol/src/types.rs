//! Typed identifier tables.
//!
//! The stack API addresses everything with single bytes. These enums give
//! those bytes names so responses can be classified with exhaustive matches.

use crate::constants::*;
use serde::Serialize;
use std::fmt;

/// Implements the byte conversions for a closed identifier table.
macro_rules! byte_enum {
    ($name:ident { $($variant:ident = $value:expr),+ $(,)? }) => {
        impl $name {
            /// Look up the identifier for a raw byte.
            pub fn from_u8(byte: u8) -> Option<Self> {
                match byte {
                    $(v if v == $value => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// The raw byte sent on the wire.
            pub fn as_u8(self) -> u8 {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                value.as_u8()
            }
        }
    };
}

/// API selector, the second payload byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ApiId {
    /// Requests and their confirmations.
    StackCmd,
    /// Unsolicited events.
    StackInd,
    /// Manufacturer-specific commands.
    Manufacturer,
}

byte_enum!(ApiId {
    StackCmd = API_STACK_CMD,
    StackInd = API_STACK_IND,
    Manufacturer = API_STACK_MANUFACTURER,
});

/// Commands of the stack command API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StackCommand {
    Set,
    Get,
    SelectStack,
    Send,
    Receive,
    GetActiveStack,
    SendParams,
    NbSend,
}

byte_enum!(StackCommand {
    Set = STACK_SET,
    Get = STACK_GET,
    SelectStack = STACK_SELECT_STACK,
    Send = STACK_SEND,
    Receive = STACK_RECEIVE,
    GetActiveStack = STACK_GET_ACTIVE_STACK,
    SendParams = STACK_SEND_PARAMS,
    NbSend = STACK_NB_SEND,
});

/// Radio stacks a module can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StackId {
    None,
    WMBus,
    LoRaWan,
    Sigfox,
    Mioty,
    MBusOverLoRaWan,
    WMBusCollector,
    MBusPrimary,
    MBusSecondary,
    Invalid,
}

byte_enum!(StackId {
    None = STACK_ID_NONE,
    WMBus = STACK_ID_WMBUS,
    LoRaWan = STACK_ID_LORAWAN,
    Sigfox = STACK_ID_SIGFOX,
    Mioty = STACK_ID_MIOTY,
    MBusOverLoRaWan = STACK_ID_MBUS_OVER_LORAWAN,
    WMBusCollector = STACK_ID_WMBUS_COLLECTOR,
    MBusPrimary = STACK_ID_MBUS_PRIMARY,
    MBusSecondary = STACK_ID_MBUS_SECONDARY,
    Invalid = STACK_ID_INVALID,
});

/// Parameters addressed by `Set` and `Get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StackParam {
    MiotyProfile,
    MiotyMode,
    MiotyEui64,
    MiotyNetworkKey,
    MiotyShortAddr,
    MiotyTxPower,
    MemoryOccupied,
    MemoryPeak,
    GenericRxDataLength,
}

byte_enum!(StackParam {
    MiotyProfile = PARAM_MIOTY_PROFILE,
    MiotyMode = PARAM_MIOTY_MODE,
    MiotyEui64 = PARAM_MIOTY_EUI64,
    MiotyNetworkKey = PARAM_MIOTY_NWKKEY,
    MiotyShortAddr = PARAM_MIOTY_SHORT_ADDR,
    MiotyTxPower = PARAM_MIOTY_TX_POWER,
    MemoryOccupied = PARAM_MEMORY_OCCUPIED,
    MemoryPeak = PARAM_MEMORY_PEAK,
    GenericRxDataLength = PARAM_GENERIC_RX_DATA_LENGTH,
});

impl StackParam {
    /// Short label used in logs and reports.
    pub fn label(self) -> &'static str {
        match self {
            StackParam::MiotyProfile => "MIOTY_PROFILE",
            StackParam::MiotyMode => "MIOTY_MODE",
            StackParam::MiotyEui64 => "MIOTY_EUI64",
            StackParam::MiotyNetworkKey => "MIOTY_NWKKEY",
            StackParam::MiotyShortAddr => "MIOTY_SHORT_ADDR",
            StackParam::MiotyTxPower => "MIOTY_TX_POWER",
            StackParam::MemoryOccupied => "MEMORY_OCCUPIED",
            StackParam::MemoryPeak => "MEMORY_PEAK",
            StackParam::GenericRxDataLength => "GENERIC_RX_DATA_LENGTH",
        }
    }
}

/// Parameters addressed by `SendParams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SendParam {
    MiotyMpf,
    MiotyAckRequest,
    MiotyRxWindow,
}

byte_enum!(SendParam {
    MiotyMpf = SEND_PARAM_MIOTY_MPF,
    MiotyAckRequest = SEND_PARAM_MIOTY_ACK_REQUEST,
    MiotyRxWindow = SEND_PARAM_MIOTY_RX_WINDOW,
});

/// Status carried in the first parameter byte of a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StackReturn {
    Success,
    Error,
    NullPointer,
    InvalidParam,
    NoActiveStack,
    Busy,
    NotAvailable,
    NotActivated,
    /// Accepted; completion is signalled later by an indication.
    SuccessWaitForEvent,
    Unknown(u8),
}

impl StackReturn {
    /// Whether the module accepted the command.
    pub fn is_success(self) -> bool {
        matches!(self, StackReturn::Success | StackReturn::SuccessWaitForEvent)
    }
}

impl From<u8> for StackReturn {
    fn from(code: u8) -> Self {
        match code {
            RETURN_SUCCESS => StackReturn::Success,
            RETURN_ERROR => StackReturn::Error,
            RETURN_ERROR_NPE => StackReturn::NullPointer,
            RETURN_ERROR_INVALID_PARAM => StackReturn::InvalidParam,
            RETURN_ERROR_NO_ACTIVE_STACK => StackReturn::NoActiveStack,
            RETURN_ERROR_BUSY => StackReturn::Busy,
            RETURN_NOT_AVAILABLE => StackReturn::NotAvailable,
            RETURN_NOT_ACTIVATED => StackReturn::NotActivated,
            RETURN_SUCCESS_WFE => StackReturn::SuccessWaitForEvent,
            _ => StackReturn::Unknown(code),
        }
    }
}

impl From<StackReturn> for u8 {
    fn from(code: StackReturn) -> Self {
        match code {
            StackReturn::Success => RETURN_SUCCESS,
            StackReturn::Error => RETURN_ERROR,
            StackReturn::NullPointer => RETURN_ERROR_NPE,
            StackReturn::InvalidParam => RETURN_ERROR_INVALID_PARAM,
            StackReturn::NoActiveStack => RETURN_ERROR_NO_ACTIVE_STACK,
            StackReturn::Busy => RETURN_ERROR_BUSY,
            StackReturn::NotAvailable => RETURN_NOT_AVAILABLE,
            StackReturn::NotActivated => RETURN_NOT_ACTIVATED,
            StackReturn::SuccessWaitForEvent => RETURN_SUCCESS_WFE,
            StackReturn::Unknown(code) => code,
        }
    }
}

impl fmt::Display for StackReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackReturn::Success => write!(f, "success"),
            StackReturn::Error => write!(f, "error"),
            StackReturn::NullPointer => write!(f, "null pointer"),
            StackReturn::InvalidParam => write!(f, "invalid parameter"),
            StackReturn::NoActiveStack => write!(f, "no active stack"),
            StackReturn::Busy => write!(f, "busy"),
            StackReturn::NotAvailable => write!(f, "not available"),
            StackReturn::NotActivated => write!(f, "not activated"),
            StackReturn::SuccessWaitForEvent => write!(f, "success, wait for event"),
            StackReturn::Unknown(code) => write!(f, "unknown status (0x{:02X})", code),
        }
    }
}

/// Event carried in the first parameter byte of an indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StackEvent {
    Sleep,
    RxError,
    TxSuccess,
    RxSuccess,
    PersistentDataUpdate,
    CryptoError,
    Wakeup,
    Unknown(u8),
}

impl From<u8> for StackEvent {
    fn from(code: u8) -> Self {
        match code {
            EVENT_SLEEP => StackEvent::Sleep,
            EVENT_RX_ERROR => StackEvent::RxError,
            EVENT_TX_SUCCESS => StackEvent::TxSuccess,
            EVENT_RX_SUCCESS => StackEvent::RxSuccess,
            EVENT_PERSISTENT_DATA_UPDATE => StackEvent::PersistentDataUpdate,
            EVENT_CRYPTO_ERROR => StackEvent::CryptoError,
            EVENT_WAKEUP => StackEvent::Wakeup,
            _ => StackEvent::Unknown(code),
        }
    }
}

impl From<StackEvent> for u8 {
    fn from(event: StackEvent) -> Self {
        match event {
            StackEvent::Sleep => EVENT_SLEEP,
            StackEvent::RxError => EVENT_RX_ERROR,
            StackEvent::TxSuccess => EVENT_TX_SUCCESS,
            StackEvent::RxSuccess => EVENT_RX_SUCCESS,
            StackEvent::PersistentDataUpdate => EVENT_PERSISTENT_DATA_UPDATE,
            StackEvent::CryptoError => EVENT_CRYPTO_ERROR,
            StackEvent::Wakeup => EVENT_WAKEUP,
            StackEvent::Unknown(code) => code,
        }
    }
}

impl fmt::Display for StackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackEvent::Sleep => write!(f, "sleep"),
            StackEvent::RxError => write!(f, "rx error"),
            StackEvent::TxSuccess => write!(f, "tx success"),
            StackEvent::RxSuccess => write!(f, "rx success"),
            StackEvent::PersistentDataUpdate => write!(f, "persistent data update"),
            StackEvent::CryptoError => write!(f, "crypto error"),
            StackEvent::Wakeup => write!(f, "wakeup"),
            StackEvent::Unknown(code) => write!(f, "unknown event (0x{:02X})", code),
        }
    }
}
