//! The dlt645 module contains the components responsible for the core DLT645
//! protocol implementation: frame packing and validation, the synchronous
//! transaction engine, the spontaneous-frame scanner, and the serial transport.

pub mod address;
pub mod frame;
pub mod scanner;
pub mod serial;
pub mod serial_mock;
pub mod tags;
pub mod transaction;
pub mod transport;

pub use address::AddressStore;
pub use frame::{Checksum8, ReplyPayload};
pub use scanner::{Dlt645Listener, FrameScanner};
pub use serial::SerialConfig;
pub use transaction::Dlt645Client;
pub use transport::MeterTransport;
