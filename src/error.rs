//! # DLT645 Error Handling
//!
//! This module defines the Dlt645Error enum, which represents the different error
//! types that can occur in the dlt645-rs crate.

/// Represents the different error types that can occur in the DLT645 crate.
#[derive(Debug, thiserror::Error)]
pub enum Dlt645Error {
    /// Indicates an error related to the serial port communication.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// Indicates the reply buffer held no frame start byte or a malformed header.
    #[error("Framing error: {0}")]
    Framing(String),

    /// Indicates a checksum mismatch on the synchronous reply path.
    #[error("Invalid checksum: expected {expected}, calculated {calculated}")]
    InvalidChecksum { expected: u8, calculated: u8 },

    /// Indicates the reply carried a different meter address than the learned one,
    /// or the duplicated address copies of an address reply disagree.
    #[error("Meter address mismatch")]
    AddressMismatch,

    /// Indicates the reply belongs to a different function family than the request,
    /// or the echoed data tag differs from the requested one.
    #[error("Function mismatch: {0}")]
    FunctionMismatch(String),

    /// Indicates the meter answered with an error reply (direction bits 0xC0).
    #[error("Meter signaled an error reply")]
    ReplyErrorIndicated,

    /// Indicates a data-area length outside the valid range.
    #[error("Data length out of range: {0}")]
    LengthOutOfRange(usize),

    /// Indicates no reply arrived within the configured budget.
    #[error("Timed out waiting for meter reply")]
    Timeout,

    /// Indicates a bad argument, such as a password or operator code of the wrong length.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Indicates a control code outside the supported function set.
    #[error("Unknown function code: 0x{0:02X}")]
    UnknownFunction(u8),
}
