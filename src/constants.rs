//! DLT645 Protocol Constants
//!
//! This module defines constants used in the DLT645 protocol implementation,
//! based on the DL/T 645 multi-function meter communication standard.

use std::time::Duration;

/// Wake-up byte transmitted ahead of every request frame
pub const DLT645_LEADING_BYTE: u8 = 0xFE;

/// Frame delimiter, appears before the address and again before the control code
pub const DLT645_START_BYTE: u8 = 0x68;

/// Frame terminator
pub const DLT645_END_BYTE: u8 = 0x16;

/// Offset added to every data byte on the wire (subtracted on receive)
pub const DLT645_DATA_OFFSET: u8 = 0x33;

/// Byte filling the default (unlearned) meter address
pub const DLT645_WILDCARD_ADDRESS_BYTE: u8 = 0xAA;

// ----------------------------------------------------------------------------
// Control byte layout: top three bits carry the direction, low five bits
// the base function.
// ----------------------------------------------------------------------------

/// Mask selecting the direction bits of a control code
pub const DLT645_COMM_TYPE_MASK: u8 = 0xE0;
pub const DLT645_MASTER_QUERY: u8 = 0x00;
pub const DLT645_SLAVE_REPLY_NORMAL: u8 = 0x80;
pub const DLT645_SLAVE_REPLY_ERROR: u8 = 0xC0;

/// Mask selecting the base function bits of a control code
pub const DLT645_FUNC_CODE_MASK: u8 = 0x1F;

// Base function codes
pub const DLT645_PKT_TYPE_READ_DATA: u8 = 0x11;
pub const DLT645_PKT_TYPE_READ_DATA_LEFT: u8 = 0x12; // read + clear alarm
pub const DLT645_PKT_TYPE_READ_ADDRESS: u8 = 0x13;
pub const DLT645_PKT_TYPE_WRITE_DATA: u8 = 0x14;

// Write replies carry fixed full control codes rather than a masked family
pub const DLT645_PKT_TYPE_WRITE_DATA_RSP: u8 = 0x94;
pub const DLT645_PKT_TYPE_WRITE_DATA_ERR: u8 = 0xD4;

// ----------------------------------------------------------------------------
// Field and frame lengths
// ----------------------------------------------------------------------------

/// 4 leading bytes, 2 start bytes, 6 address, 1 control, 1 length, 1 checksum, 1 end
pub const DLT645_HEAD_TAIL_LEN: usize = 16;

/// Leading 0xFE bytes prefixed to every request
pub const DLT645_PRE_LEADING_LEN: usize = 4;

/// 4-byte little-endian data identification
pub const DLT645_DATA_TAG_LEN: usize = 4;

/// 6-byte meter address
pub const DLT645_ADDRESS_LEN: usize = 6;

/// Span from the first start byte through the length byte:
/// 2 start bytes, 6 address, 1 control, 1 length
pub const DLT645_FIXED_LEN: usize = 10;

/// Data-area length bounds on read replies (tag 4 + reading 2..=8)
pub const DLT645_MIN_DATA_LEN: usize = 6;
pub const DLT645_MAX_DATA_LEN: usize = 12;

pub const DLT645_PASSWORD_LEN: usize = 4;
pub const DLT645_OPERATOR_LEN: usize = 4;

/// Nominal reading length in a read reply
pub const DLT645_POWER_READING_LEN: usize = 4;

/// Slack allowed beyond the nominal reply size when waiting for a read reply
pub const DLT645_EXTRA_LEN: usize = 4;

/// Bytes to wait for before decoding a read reply
pub const DLT645_READ_REPLY_LEN: usize =
    DLT645_HEAD_TAIL_LEN + DLT645_DATA_TAG_LEN + DLT645_POWER_READING_LEN + DLT645_EXTRA_LEN;

/// Bytes to wait for before decoding a write acknowledgement
pub const DLT645_WRITE_REPLY_LEN: usize = DLT645_HEAD_TAIL_LEN;

// ----------------------------------------------------------------------------
// Timing defaults
// ----------------------------------------------------------------------------

/// Wall-clock budget for one synchronous reply
pub const DLT645_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// DLT645 links run 2400 baud, 8 data bits, even parity, 1 stop bit
pub const DLT645_DEFAULT_BAUDRATE: u32 = 2400;
