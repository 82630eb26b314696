//! # DLT645 Transaction Engine
//!
//! This module implements the synchronous request/reply side of the protocol:
//! one request on the line at a time, a fixed wall-clock budget for the reply,
//! and an input-buffer flush before every return so the next transaction
//! starts from clean framing state.
//!
//! The engine is generic over [`MeterTransport`], so the same code drives a
//! real serial port and the in-memory mock used by the tests.

use crate::constants::{
    DLT645_PKT_TYPE_READ_ADDRESS, DLT645_PKT_TYPE_READ_DATA, DLT645_PKT_TYPE_READ_DATA_LEFT,
    DLT645_PKT_TYPE_WRITE_DATA, DLT645_PKT_TYPE_WRITE_DATA_ERR, DLT645_READ_REPLY_LEN,
    DLT645_WRITE_REPLY_LEN,
};
use crate::dlt645::address::AddressStore;
use crate::dlt645::frame::{self, ReplyPayload};
use crate::dlt645::serial::SerialConfig;
use crate::dlt645::transport::MeterTransport;
use crate::error::Dlt645Error;
use crate::logging::{log_debug, log_warn};
use bytes::BytesMut;
use std::sync::Arc;
use tokio::time::{timeout_at, Instant};

/// Synchronous DLT645 client: one request/reply call in flight at any time.
///
/// Not reentrant; every operation takes `&mut self`, which is what serializes
/// transactions on the link. The learned meter address lives in an
/// [`AddressStore`] shared via `Arc`, updated by a successful
/// [`read_address`](Self::read_address).
pub struct Dlt645Client<P: MeterTransport> {
    port: P,
    config: SerialConfig,
    address: Arc<AddressStore>,
}

impl<P: MeterTransport> Dlt645Client<P> {
    /// Wraps an open transport with a fresh (wildcard) address store.
    pub fn new(port: P, config: SerialConfig) -> Self {
        Self::with_address_store(port, config, Arc::new(AddressStore::new()))
    }

    /// Wraps an open transport sharing an existing address store.
    pub fn with_address_store(port: P, config: SerialConfig, address: Arc<AddressStore>) -> Self {
        Dlt645Client {
            port,
            config,
            address,
        }
    }

    /// Returns a handle to the learned-address store.
    pub fn address_store(&self) -> Arc<AddressStore> {
        Arc::clone(&self.address)
    }

    /// Queries the meter for its address and learns it.
    ///
    /// Sent to whatever address the store currently holds; with the wildcard
    /// default any single meter on the line answers with its real address,
    /// which is stored for all subsequent requests.
    pub async fn read_address(&mut self) -> Result<[u8; 6], Dlt645Error> {
        let pkt = frame::pack_read_request(
            &self.address.get(),
            DLT645_PKT_TYPE_READ_ADDRESS,
            None,
        );
        match self
            .transact(&pkt, DLT645_PKT_TYPE_READ_ADDRESS, 0, DLT645_READ_REPLY_LEN)
            .await?
        {
            ReplyPayload::Address(address) => Ok(address),
            other => Err(unexpected_payload(other)),
        }
    }

    /// Reads one measurement by data identification, returning the raw
    /// (typically BCD) bytes that follow the tag echo in the reply.
    pub async fn read_data(&mut self, data_tag: u32) -> Result<Vec<u8>, Dlt645Error> {
        let pkt = frame::pack_read_request(
            &self.address.get(),
            DLT645_PKT_TYPE_READ_DATA,
            Some(data_tag),
        );
        match self
            .transact(&pkt, DLT645_PKT_TYPE_READ_DATA, data_tag, DLT645_READ_REPLY_LEN)
            .await?
        {
            ReplyPayload::Measurement(data) => Ok(data),
            other => Err(unexpected_payload(other)),
        }
    }

    /// Writes tagged data to the meter, authenticated by the 4-byte password
    /// and operator codes. Returns the acknowledgement payload; a meter error
    /// acknowledgement (0xD4) surfaces as [`Dlt645Error::ReplyErrorIndicated`].
    pub async fn write_data(
        &mut self,
        password: &[u8],
        operator: &[u8],
        data_tag: u32,
        payload: &[u8],
    ) -> Result<Vec<u8>, Dlt645Error> {
        let pkt = frame::pack_write_request(
            &self.address.get(),
            DLT645_PKT_TYPE_WRITE_DATA,
            password,
            operator,
            data_tag,
            payload,
        )?;
        match self
            .transact(&pkt, DLT645_PKT_TYPE_WRITE_DATA, data_tag, DLT645_WRITE_REPLY_LEN)
            .await?
        {
            ReplyPayload::WriteAck { control, data } => {
                if control == DLT645_PKT_TYPE_WRITE_DATA_ERR {
                    return Err(Dlt645Error::ReplyErrorIndicated);
                }
                Ok(data)
            }
            other => Err(unexpected_payload(other)),
        }
    }

    /// Sends a reading request without waiting for the reply.
    ///
    /// For use together with a [`FrameScanner`](crate::dlt645::scanner::FrameScanner)
    /// on the receive side.
    pub async fn send_reading_request(&mut self, data_tag: u32) -> Result<(), Dlt645Error> {
        let pkt = frame::pack_read_request(
            &self.address.get(),
            DLT645_PKT_TYPE_READ_DATA,
            Some(data_tag),
        );
        self.send(&pkt).await
    }

    /// Acknowledges an alarm report (read-and-clear, function 0x12), without
    /// waiting for a reply.
    pub async fn acknowledge_alarm(&mut self, data_tag: u32) -> Result<(), Dlt645Error> {
        let pkt = frame::pack_read_request(
            &self.address.get(),
            DLT645_PKT_TYPE_READ_DATA_LEFT,
            Some(data_tag),
        );
        self.send(&pkt).await
    }

    /// Sends a write request without waiting for the acknowledgement.
    pub async fn send_write_request(
        &mut self,
        password: &[u8],
        operator: &[u8],
        data_tag: u32,
        payload: &[u8],
    ) -> Result<(), Dlt645Error> {
        let pkt = frame::pack_write_request(
            &self.address.get(),
            DLT645_PKT_TYPE_WRITE_DATA,
            password,
            operator,
            data_tag,
            payload,
        )?;
        self.send(&pkt).await
    }

    /// One full transaction: send, collect the reply within the budget,
    /// decode, and flush the input buffer no matter how it went.
    async fn transact(
        &mut self,
        pkt: &[u8],
        func_code: u8,
        data_tag: u32,
        expect_len: usize,
    ) -> Result<ReplyPayload, Dlt645Error> {
        self.send(pkt).await?;

        let decoded = match self.collect_reply(expect_len).await {
            Ok(reply) => frame::parse_reply(&reply, func_code, data_tag, &self.address),
            Err(e) => Err(e),
        };

        self.flush_input().await;
        decoded
    }

    async fn send(&mut self, pkt: &[u8]) -> Result<(), Dlt645Error> {
        log_debug(&format!("send {}", hex::encode(pkt)));
        self.port
            .write_all(pkt)
            .await
            .map_err(|e| Dlt645Error::SerialPortError(e.to_string()))?;
        self.port
            .flush()
            .await
            .map_err(|e| Dlt645Error::SerialPortError(e.to_string()))
    }

    /// Accumulates reply bytes until at least `expect_len` have arrived or the
    /// budget runs out. An exhausted budget with nothing received is a
    /// timeout; a partial buffer is handed to the decoder as-is.
    async fn collect_reply(&mut self, expect_len: usize) -> Result<BytesMut, Dlt645Error> {
        let deadline = Instant::now() + self.config.reply_timeout;
        let mut reply = BytesMut::with_capacity(expect_len);

        while reply.len() < expect_len {
            match timeout_at(deadline, self.port.read_buf(&mut reply)).await {
                Ok(Ok(0)) => break, // transport closed; decode what arrived
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(Dlt645Error::SerialPortError(e.to_string())),
                Err(_) => break, // budget exhausted
            }
        }

        if reply.is_empty() {
            return Err(Dlt645Error::Timeout);
        }
        log_debug(&format!("recv {}", hex::encode(&reply)));
        Ok(reply)
    }

    /// Drops whatever the transport still has buffered so the next
    /// transaction starts from clean framing state.
    async fn flush_input(&mut self) {
        if let Err(e) = self.port.clear_input().await {
            log_warn(&format!("failed to clear input buffer: {e}"));
        }
    }
}

fn unexpected_payload(payload: ReplyPayload) -> Dlt645Error {
    Dlt645Error::FunctionMismatch(format!("unexpected reply payload: {payload:?}"))
}
