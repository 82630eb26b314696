//! # DLT645 Spontaneous Frame Scanner
//!
//! Some meters push reports on their own: periodic readings, alarms, valve
//! state changes. This module runs a background task that continuously scans
//! the byte stream for frames and hands each decoded `(function code, data
//! tag, data)` triple to a listener. Anything that is not a well-formed frame
//! is skipped a byte at a time; a per-frame decode problem never stops the
//! loop.
//!
//! Checksum policy on this path is advisory: a mismatch is logged at warn
//! level and the frame is still dispatched, tolerating line noise. The
//! synchronous path in [`transaction`](crate::dlt645::transaction) enforces
//! checksums strictly.
//!
//! The scanner owns its transport outright, so a link is either driven
//! synchronously by a [`Dlt645Client`](crate::dlt645::transaction::Dlt645Client)
//! or scanned by a `FrameScanner`, never both at once.

use crate::constants::{DLT645_ADDRESS_LEN, DLT645_START_BYTE};
use crate::dlt645::frame::{self, Checksum8};
use crate::dlt645::tags;
use crate::dlt645::transport::MeterTransport;
use crate::logging::{log_debug, log_warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Callback interface for spontaneous meter reports.
///
/// Write acknowledgements arrive with `data_tag == 0`; every other frame
/// carries the 4-byte identification that was split off the data area.
pub trait Dlt645Listener: Send {
    fn on_data_arrived(&mut self, func_code: u8, data_tag: u32, data: &[u8]);
}

/// Handle to a running background scan task.
pub struct FrameScanner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl FrameScanner {
    /// Spawns the scan loop on the tokio runtime, taking ownership of the
    /// transport. Without a listener, decoded frames are discarded silently.
    pub fn spawn<P>(port: P, listener: Option<Box<dyn Dlt645Listener>>) -> Self
    where
        P: MeterTransport + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(scan_loop(port, listener, shutdown_rx));
        FrameScanner { shutdown, handle }
    }

    /// Stops the scan loop and waits for the task to wind down.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}

async fn scan_loop<P: MeterTransport>(
    mut port: P,
    mut listener: Option<Box<dyn Dlt645Listener>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            scanned = scan_frame(&mut port) => match scanned {
                Ok(Some((func_code, data_tag, data))) => {
                    log_debug(&format!(
                        "spontaneous frame: func 0x{func_code:02X} tag 0x{data_tag:08X} ({})",
                        tags::describe_tag(data_tag).unwrap_or("unrecognized"),
                    ));
                    if let Some(listener) = listener.as_mut() {
                        listener.on_data_arrived(func_code, data_tag, &data);
                    }
                }
                Ok(None) => {} // noise byte or unusable frame, keep scanning
                Err(e) => {
                    log_warn(&format!("scan loop read failed: {e}"));
                    break;
                }
            }
        }
    }
}

/// Consumes bytes up to one complete frame (or one noise byte).
///
/// Returns `Ok(None)` when the stream position did not hold a frame; the
/// caller resumes scanning at the next byte.
async fn scan_frame<P: MeterTransport>(
    port: &mut P,
) -> Result<Option<(u8, u32, Vec<u8>)>, std::io::Error> {
    let mut byte = [0u8; 1];
    port.read_exact(&mut byte).await?;
    if byte[0] != DLT645_START_BYTE {
        return Ok(None);
    }

    let mut checksum = Checksum8::new();
    checksum.update(DLT645_START_BYTE);

    let mut address = [0u8; DLT645_ADDRESS_LEN];
    port.read_exact(&mut address).await?;
    checksum.update_slice(&address);

    port.read_exact(&mut byte).await?;
    if byte[0] != DLT645_START_BYTE {
        // mid-stream noise masquerading as a frame start
        return Ok(None);
    }
    checksum.update(DLT645_START_BYTE);

    let mut head = [0u8; 2];
    port.read_exact(&mut head).await?;
    let (func_code, data_len) = (head[0], head[1] as usize);
    checksum.update_slice(&head);

    // data area plus checksum and end byte
    let mut body = vec![0u8; data_len + 2];
    port.read_exact(&mut body).await?;
    checksum.update_slice(&body[..data_len]);

    let wire_checksum = body[data_len];
    if checksum.value() != wire_checksum {
        // advisory only on this path; see the module docs
        log_warn(&format!(
            "spontaneous frame checksum mismatch: wire 0x{wire_checksum:02X}, calculated 0x{:02X}",
            checksum.value(),
        ));
    }

    body.truncate(data_len);
    frame::remove_transform(&mut body);

    match frame::classify_data(func_code, &body) {
        Some((data_tag, data)) => Ok(Some((func_code, data_tag, data))),
        None => {
            log_debug("discarding spontaneous frame too short for a data identification");
            Ok(None)
        }
    }
}
