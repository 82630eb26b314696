//! # DLT645 Serial Communication
//!
//! This module opens the serial port for a DLT645 meter link. DLT645 runs a
//! half-duplex line at 2400 baud, 8 data bits, even parity, one stop bit.

use crate::constants::{DLT645_DEFAULT_BAUDRATE, DLT645_REPLY_TIMEOUT};
use crate::dlt645::transaction::Dlt645Client;
use crate::error::Dlt645Error;
use std::time::Duration;
use tokio_serial::SerialPortBuilderExt;

/// Configuration for a meter link.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baudrate: u32,
    /// Wall-clock budget for one synchronous reply.
    pub reply_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baudrate: DLT645_DEFAULT_BAUDRATE,
            reply_timeout: DLT645_REPLY_TIMEOUT,
        }
    }
}

impl Dlt645Client<tokio_serial::SerialStream> {
    /// Opens the serial port with default settings and wraps it in a client.
    pub async fn connect(port_name: &str) -> Result<Self, Dlt645Error> {
        Self::connect_with_config(port_name, SerialConfig::default()).await
    }

    /// Opens the serial port with custom config.
    pub async fn connect_with_config(
        port_name: &str,
        config: SerialConfig,
    ) -> Result<Self, Dlt645Error> {
        let port = tokio_serial::new(port_name, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::Even)
            .timeout(config.reply_timeout)
            .open_native_async()
            .map_err(|e| Dlt645Error::SerialPortError(e.to_string()))?;

        Ok(Dlt645Client::new(port, config))
    }
}
