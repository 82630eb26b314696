//! # BCD Reading Decoder
//!
//! Meter readings travel as packed BCD, two decimal digits per byte, least
//! significant byte first. A 4-byte reading `XXXXXX.XX` therefore arrives
//! with the fractional digits in byte 0. The decoder walks the bytes
//! low-to-high, weighting each byte's low nibble as the lower of its two
//! digits, and scales the summed integer down by the caller's decimal-place
//! count at the end.

use crate::error::Dlt645Error;

/// Decodes a whole buffer of packed BCD into a scaled reading.
pub fn bcd_to_f64(input: &[u8], decimals: u32) -> Result<f64, Dlt645Error> {
    bcd_range_to_f64(input, 0, input.len(), decimals)
}

/// Decodes `len` packed-BCD bytes starting at `start` into a scaled reading.
///
/// Byte `i` of the slice contributes `(low nibble) * 100^i + (high nibble) *
/// 10 * 100^i`; the sum is then divided by `10^decimals`. Fails with
/// `LengthOutOfRange` when the requested slice runs past the buffer.
pub fn bcd_range_to_f64(
    input: &[u8],
    start: usize,
    len: usize,
    decimals: u32,
) -> Result<f64, Dlt645Error> {
    if start + len > input.len() {
        return Err(Dlt645Error::LengthOutOfRange(start + len));
    }

    let mut reading = 0.0_f64;
    let mut coef = 1.0_f64;
    for byte in &input[start..start + len] {
        reading += f64::from(byte & 0x0F) * coef;
        reading += f64::from(byte >> 4) * 10.0 * coef;
        coef *= 100.0;
    }

    Ok(reading / 10.0_f64.powi(decimals as i32))
}
