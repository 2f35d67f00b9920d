//! Protocol constants
//!
//! Wire-level values of the SATP serial framing and the identifier tables of
//! the stack API. The typed enums in [`crate::types`] map onto these.

// ============================================================================
// Framing
// ============================================================================

/// First byte of every frame.
pub const SYNC_BYTE: u8 = 0xA5;
/// First payload byte of every frame.
pub const STACK_SELECTOR: u8 = 0x07;
/// Sync byte plus the length field and its complement.
pub const HEADER_SIZE: usize = 5;
/// Checksum trailer.
pub const TRAILER_SIZE: usize = 2;
/// Bytes a frame occupies besides its payload.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + TRAILER_SIZE;
/// Stack selector, API id and command id.
pub const PAYLOAD_HEADER_SIZE: usize = 3;
/// Largest parameter block the 16-bit length field can describe.
pub const MAX_PARAMETERS_LEN: usize = u16::MAX as usize - PAYLOAD_HEADER_SIZE;
/// Checksum polynomial.
pub const CRC_POLYNOMIAL: u16 = 0x3D65;

// ============================================================================
// API identifiers
// ============================================================================

/// Stack command API (host → module requests and their confirmations).
pub const API_STACK_CMD: u8 = 0x00;
/// Stack indication API (unsolicited module events).
pub const API_STACK_IND: u8 = 0x01;
/// Manufacturer API.
pub const API_STACK_MANUFACTURER: u8 = 0xFF;

// ============================================================================
// Stack commands (API_STACK_CMD)
// ============================================================================

/// Write a stack parameter.
pub const STACK_SET: u8 = 0x02;
/// Read a stack parameter.
pub const STACK_GET: u8 = 0x03;
/// Activate a radio stack.
pub const STACK_SELECT_STACK: u8 = 0x04;
/// Blocking uplink.
pub const STACK_SEND: u8 = 0x05;
/// Fetch received downlink data.
pub const STACK_RECEIVE: u8 = 0x06;
/// Query the active stack.
pub const STACK_GET_ACTIVE_STACK: u8 = 0x07;
/// Set per-send parameters.
pub const STACK_SEND_PARAMS: u8 = 0x08;
/// Non-blocking uplink.
pub const STACK_NB_SEND: u8 = 0x0C;

/// Generic indication (API_STACK_IND).
pub const STACK_IND_GENERIC: u8 = 0x02;
/// Manufacturer command (API_STACK_MANUFACTURER).
pub const STACK_MANUFACTURER: u8 = 0x01;

// ============================================================================
// Stack identifiers
// ============================================================================

pub const STACK_ID_NONE: u8 = 0x00;
pub const STACK_ID_WMBUS: u8 = 0x01;
pub const STACK_ID_LORAWAN: u8 = 0x02;
pub const STACK_ID_SIGFOX: u8 = 0x03;
pub const STACK_ID_MIOTY: u8 = 0x04;
pub const STACK_ID_MBUS_OVER_LORAWAN: u8 = 0x05;
pub const STACK_ID_WMBUS_COLLECTOR: u8 = 0x06;
pub const STACK_ID_MBUS_PRIMARY: u8 = 0x07;
pub const STACK_ID_MBUS_SECONDARY: u8 = 0x08;
pub const STACK_ID_INVALID: u8 = 0xFF;

// ============================================================================
// Stack parameters (STACK_SET / STACK_GET)
// ============================================================================

pub const PARAM_MIOTY_PROFILE: u8 = 0x60;
pub const PARAM_MIOTY_MODE: u8 = 0x61;
pub const PARAM_MIOTY_EUI64: u8 = 0x62;
pub const PARAM_MIOTY_NWKKEY: u8 = 0x63;
pub const PARAM_MIOTY_SHORT_ADDR: u8 = 0x64;
pub const PARAM_MIOTY_TX_POWER: u8 = 0x65;
pub const PARAM_MEMORY_OCCUPIED: u8 = 0xFD;
pub const PARAM_MEMORY_PEAK: u8 = 0xFE;
pub const PARAM_GENERIC_RX_DATA_LENGTH: u8 = 0xFF;

// ============================================================================
// Send parameters (STACK_SEND_PARAMS)
// ============================================================================

pub const SEND_PARAM_MIOTY_MPF: u8 = 0x60;
pub const SEND_PARAM_MIOTY_ACK_REQUEST: u8 = 0x61;
pub const SEND_PARAM_MIOTY_RX_WINDOW: u8 = 0x62;

// ============================================================================
// Return codes (first parameter byte of a confirmation)
// ============================================================================

pub const RETURN_SUCCESS: u8 = 0x00;
pub const RETURN_ERROR: u8 = 0x01;
pub const RETURN_ERROR_NPE: u8 = 0x02;
pub const RETURN_ERROR_INVALID_PARAM: u8 = 0x03;
pub const RETURN_ERROR_NO_ACTIVE_STACK: u8 = 0x04;
pub const RETURN_ERROR_BUSY: u8 = 0x05;
pub const RETURN_NOT_AVAILABLE: u8 = 0x06;
pub const RETURN_NOT_ACTIVATED: u8 = 0x07;
pub const RETURN_SUCCESS_WFE: u8 = 0x08;

// ============================================================================
// Events (first parameter byte of an indication)
// ============================================================================

pub const EVENT_SLEEP: u8 = 0x00;
pub const EVENT_RX_ERROR: u8 = 0x01;
pub const EVENT_TX_SUCCESS: u8 = 0x02;
pub const EVENT_RX_SUCCESS: u8 = 0x03;
pub const EVENT_PERSISTENT_DATA_UPDATE: u8 = 0x04;
pub const EVENT_CRYPTO_ERROR: u8 = 0x05;
pub const EVENT_WAKEUP: u8 = 0x08;
