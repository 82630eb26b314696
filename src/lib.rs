//! # dlt645-rs - A Rust Crate for DLT645 Electricity Meter Communication
//!
//! The dlt645-rs crate provides a Rust-based implementation of the DLT645
//! serial protocol, the Chinese national standard for data exchange with
//! multi-function electricity meters over a half-duplex serial link.
//!
//! ## Features
//!
//! - Connect to a DLT645 meter using a serial port connection
//! - Learn the meter address from the wildcard default and reuse it on every request
//! - Read measurements by data identification tag and decode packed-BCD readings
//! - Write tagged data to the meter authenticated by password and operator codes
//! - Scan the line in the background for spontaneous meter reports and alarms
//! - Typed protocol errors for framing, checksum, address, and timeout failures
//! - Support for logging and a mock serial port for hardware-free testing
//!
//! ## Usage
//!
//! To use the dlt645-rs crate in your Rust project, add the following to your
//! Cargo.toml file:
//!
//! ```toml
//! [dependencies]
//! dlt645-rs = "0.1.0"
//! ```
//!
//! Then, in your Rust code, you can import the necessary items:
//!
//! ```rust
//! use dlt645_rs::{
//!     connect, Dlt645Client, Dlt645Error, Dlt645Listener, FrameScanner,
//!     bcd_to_f64, init_logger, log_info,
//! };
//! ```
//!
//! A typical polling session reads the meter address once, then queries by tag:
//!
//! ```rust,no_run
//! use dlt645_rs::tags::DLT645_TAG_FORWARD_ACTIVE_ENERGY;
//!
//! # async fn demo() -> Result<(), dlt645_rs::Dlt645Error> {
//! let mut client = dlt645_rs::connect("/dev/ttyUSB0").await?;
//! client.read_address().await?;
//! let raw = client.read_data(DLT645_TAG_FORWARD_ACTIVE_ENERGY).await?;
//! let kwh = dlt645_rs::bcd_to_f64(&raw, 2)?;
//! # let _ = kwh;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod dlt645;
pub mod error;
pub mod logging;
pub mod payload;

pub use crate::error::Dlt645Error;
pub use crate::logging::{init_logger, log_info};

// Core DLT645 types
pub use dlt645::serial::SerialConfig;
pub use dlt645::{
    AddressStore, Checksum8, Dlt645Client, Dlt645Listener, FrameScanner, MeterTransport,
    ReplyPayload,
};
pub use dlt645::tags;
pub use payload::{bcd_range_to_f64, bcd_to_f64};

use tokio_serial::SerialStream;

/// Connect to a DLT645 meter via serial port.
///
/// # Arguments
/// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
///
/// # Returns
/// * `Ok(Dlt645Client)` - Connected client for synchronous transactions
/// * `Err(Dlt645Error)` - Connection failed
pub async fn connect(port: &str) -> Result<Dlt645Client<SerialStream>, Dlt645Error> {
    Dlt645Client::connect(port).await
}

/// Connect to a DLT645 meter with custom link configuration.
///
/// # Arguments
/// * `port` - Serial port path
/// * `config` - Baud rate and reply-timeout settings
///
/// # Returns
/// * `Ok(Dlt645Client)` - Connected client for synchronous transactions
/// * `Err(Dlt645Error)` - Connection failed
pub async fn connect_with_config(
    port: &str,
    config: SerialConfig,
) -> Result<Dlt645Client<SerialStream>, Dlt645Error> {
    Dlt645Client::connect_with_config(port, config).await
}
