//! Mock serial port implementation for testing
//!
//! This module provides a mock serial port that can be used to test the
//! DLT645 communication paths without requiring actual hardware. Written
//! requests land in a shared tx buffer for inspection; queued rx bytes are
//! served to readers. An empty rx buffer parks the reader until more bytes
//! are queued, which is how a quiet meter line behaves.

use crate::constants::{
    DLT645_ADDRESS_LEN, DLT645_DATA_OFFSET, DLT645_END_BYTE, DLT645_START_BYTE,
};
use crate::dlt645::frame::Checksum8;
use crate::dlt645::transport::MeterTransport;
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

/// Mock serial port that simulates bidirectional communication
#[derive(Clone, Default)]
pub struct MockSerialPort {
    /// Data written to the port (outgoing)
    tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Data to be read from the port (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated errors
    next_error: Arc<Mutex<Option<io::Error>>>,
    /// Reader parked on an empty rx buffer
    read_waker: Arc<Mutex<Option<Waker>>>,
}

impl MockSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue data to be read from the port, waking any parked reader.
    pub fn queue_rx_data(&self, data: &[u8]) {
        self.rx_buffer.lock().unwrap().extend(data);
        if let Some(waker) = self.read_waker.lock().unwrap().take() {
            waker.wake();
        }
    }

    /// Queue a complete reply frame: `68 addr 68 control len data+33 cs 16`.
    ///
    /// `data` is given untransformed; the wire offset and checksum are applied
    /// here. Pass `corrupt_checksum` to flip the embedded sum.
    pub fn queue_reply_frame(
        &self,
        address: &[u8; DLT645_ADDRESS_LEN],
        control: u8,
        data: &[u8],
        corrupt_checksum: bool,
    ) {
        let mut frame = Vec::with_capacity(12 + data.len());
        frame.push(DLT645_START_BYTE);
        frame.extend_from_slice(address);
        frame.push(DLT645_START_BYTE);
        frame.push(control);
        frame.push(data.len() as u8);
        for byte in data {
            frame.push(byte.wrapping_add(DLT645_DATA_OFFSET));
        }

        let mut checksum = Checksum8::new();
        checksum.update_slice(&frame);
        let mut cs = checksum.value();
        if corrupt_checksum {
            cs = cs.wrapping_add(1);
        }
        frame.push(cs);
        frame.push(DLT645_END_BYTE);

        self.queue_rx_data(&frame);
    }

    /// Get data that was written to the port
    pub fn get_tx_data(&self) -> Vec<u8> {
        self.tx_buffer.lock().unwrap().clone()
    }

    /// Bytes still waiting to be read from the port
    pub fn rx_pending(&self) -> usize {
        self.rx_buffer.lock().unwrap().len()
    }

    /// Clear all buffers
    pub fn clear(&self) {
        self.tx_buffer.lock().unwrap().clear();
        self.rx_buffer.lock().unwrap().clear();
    }

    /// Set an error to be returned on the next operation
    pub fn set_next_error(&self, error: io::Error) {
        *self.next_error.lock().unwrap() = Some(error);
    }
}

impl AsyncRead for MockSerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Poll::Ready(Err(error));
        }

        let mut rx = self.rx_buffer.lock().unwrap();
        let available = rx.len().min(buf.remaining());
        if available == 0 {
            // quiet line: park until queue_rx_data wakes us
            *self.read_waker.lock().unwrap() = Some(cx.waker().clone());
            return Poll::Pending;
        }

        let data: Vec<u8> = rx.drain(..available).collect();
        buf.put_slice(&data);
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockSerialPort {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Poll::Ready(Err(error));
        }

        self.tx_buffer.lock().unwrap().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[async_trait::async_trait]
impl MeterTransport for MockSerialPort {
    async fn clear_input(&mut self) -> Result<(), io::Error> {
        self.rx_buffer.lock().unwrap().clear();
        Ok(())
    }
}
