//! Transport seam between the protocol engine and the physical link.
//!
//! The engine and the scanner only need an async byte source/sink plus the
//! ability to drop whatever the line has buffered, so that is all the trait
//! asks for. Production code runs it over `tokio_serial::SerialStream`;
//! tests run it over [`MockSerialPort`](crate::dlt645::serial_mock::MockSerialPort).

use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Async byte source/sink with a clearable input side.
#[async_trait::async_trait]
pub trait MeterTransport: AsyncReadExt + AsyncWriteExt + Unpin + Send {
    /// Discards any unread bytes buffered on the receive side of the link.
    async fn clear_input(&mut self) -> Result<(), std::io::Error>;
}

#[async_trait::async_trait]
impl MeterTransport for tokio_serial::SerialStream {
    async fn clear_input(&mut self) -> Result<(), std::io::Error> {
        tokio_serial::SerialPort::clear(self, tokio_serial::ClearBuffer::Input)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
