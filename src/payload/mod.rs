//! Payload decoding helpers shared by the synchronous and scanning paths.

pub mod bcd;

pub use bcd::{bcd_range_to_f64, bcd_to_f64};
