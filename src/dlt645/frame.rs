//! # DLT645 Frame Codec
//!
//! This module builds outgoing DLT645 request frames and validates and decodes
//! incoming reply frames. It leverages the `nom` crate for parsing the fixed
//! frame header out of a raw reply buffer.
//!
//! ## Wire format
//!
//! ```text
//! FE FE FE FE 68 A0..A5 68 C L D0..D(L-1) CS 16
//! ```
//!
//! Four `0xFE` leading bytes wake the meter, `0x68` delimits the 6-byte
//! address and again the control code `C`, `L` counts the data bytes, and the
//! 8-bit additive checksum `CS` covers everything from the first `0x68`
//! through the last data byte. Every data byte travels increased by `0x33`
//! (mod 256); receivers subtract the same offset before interpreting anything.
//!
//! ## Usage
//!
//! Packing a read request:
//! ```ignore
//! let pkt = pack_read_request(&address, DLT645_PKT_TYPE_READ_DATA, Some(tag));
//! ```
//!
//! Validating a reply buffer:
//! ```ignore
//! match parse_reply(&raw, DLT645_PKT_TYPE_READ_DATA, tag, &store) {
//!     Ok(ReplyPayload::Measurement(bytes)) => { /* BCD reading */ }
//!     Err(error) => { /* typed protocol failure */ }
//!     _ => {}
//! }
//! ```

use crate::constants::{
    DLT645_ADDRESS_LEN, DLT645_COMM_TYPE_MASK, DLT645_DATA_OFFSET, DLT645_DATA_TAG_LEN,
    DLT645_END_BYTE, DLT645_FIXED_LEN, DLT645_FUNC_CODE_MASK, DLT645_HEAD_TAIL_LEN,
    DLT645_LEADING_BYTE, DLT645_MASTER_QUERY, DLT645_MAX_DATA_LEN, DLT645_MIN_DATA_LEN,
    DLT645_OPERATOR_LEN, DLT645_PASSWORD_LEN, DLT645_PKT_TYPE_READ_ADDRESS,
    DLT645_PKT_TYPE_READ_DATA, DLT645_PKT_TYPE_READ_DATA_LEFT, DLT645_PKT_TYPE_WRITE_DATA,
    DLT645_PKT_TYPE_WRITE_DATA_ERR, DLT645_PKT_TYPE_WRITE_DATA_RSP, DLT645_PRE_LEADING_LEN,
    DLT645_SLAVE_REPLY_ERROR, DLT645_SLAVE_REPLY_NORMAL, DLT645_START_BYTE,
};
use crate::dlt645::address::AddressStore;
use crate::error::Dlt645Error;
use bytes::{BufMut, BytesMut};
use nom::number::complete::be_u8;
use nom::bytes::complete::take;
use nom::Err as NomErr;
use nom::IResult;

/// 8-bit modulo-256 additive checksum accumulator.
///
/// Used identically on both directions: the sender embeds `value()` after the
/// data area, the receiver recomputes over the same span and compares.
#[derive(Debug, Default, Clone, Copy)]
pub struct Checksum8 {
    sum: u8,
}

impl Checksum8 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the accumulator back to zero.
    pub fn reset(&mut self) {
        self.sum = 0;
    }

    /// Folds a single byte into the sum.
    pub fn update(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte);
    }

    /// Folds a byte range into the sum.
    pub fn update_slice(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.sum = self.sum.wrapping_add(*byte);
        }
    }

    /// Returns the current 8-bit sum.
    pub fn value(&self) -> u8 {
        self.sum
    }
}

/// Adds the wire offset `0x33` to every data byte in place.
pub fn apply_transform(data: &mut [u8]) {
    for byte in data {
        *byte = byte.wrapping_add(DLT645_DATA_OFFSET);
    }
}

/// Removes the wire offset `0x33` from every data byte in place.
pub fn remove_transform(data: &mut [u8]) {
    for byte in data {
        *byte = byte.wrapping_sub(DLT645_DATA_OFFSET);
    }
}

/// A validated, de-transformed reply.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplyPayload {
    /// Reply to an address read: the learned 6-byte meter address.
    Address([u8; DLT645_ADDRESS_LEN]),
    /// Reply to a data read: the raw measurement bytes following the tag echo.
    Measurement(Vec<u8>),
    /// Write acknowledgement (0x94) or write error (0xD4) with its payload.
    WriteAck { control: u8, data: Vec<u8> },
}

/// Assembles a read-style request (data read, alarm acknowledge, address read).
///
/// The data area is the 4-byte little-endian data identification, or empty for
/// an address read. `func_code` is OR'd into the master-query direction bits.
pub fn pack_read_request(
    address: &[u8; DLT645_ADDRESS_LEN],
    func_code: u8,
    data_tag: Option<u32>,
) -> BytesMut {
    let data = match data_tag {
        Some(tag) => tag.to_le_bytes().to_vec(),
        None => Vec::new(),
    };
    pack_request(address, DLT645_MASTER_QUERY | func_code, &data)
}

/// Assembles a write request carrying password and operator codes ahead of the
/// payload.
///
/// Fails with `InvalidArgument` unless password and operator are exactly 4
/// bytes each.
pub fn pack_write_request(
    address: &[u8; DLT645_ADDRESS_LEN],
    func_code: u8,
    password: &[u8],
    operator: &[u8],
    data_tag: u32,
    payload: &[u8],
) -> Result<BytesMut, Dlt645Error> {
    if password.len() != DLT645_PASSWORD_LEN || operator.len() != DLT645_OPERATOR_LEN {
        return Err(Dlt645Error::InvalidArgument(
            "password and operator codes must be 4 bytes each".into(),
        ));
    }

    let mut data =
        Vec::with_capacity(DLT645_DATA_TAG_LEN + DLT645_PASSWORD_LEN + DLT645_OPERATOR_LEN + payload.len());
    data.extend_from_slice(&data_tag.to_le_bytes());
    data.extend_from_slice(password);
    data.extend_from_slice(operator);
    data.extend_from_slice(payload);

    Ok(pack_request(address, DLT645_MASTER_QUERY | func_code, &data))
}

/// Frames a control code and data area: leading bytes, delimiters, transformed
/// data, checksum, terminator.
fn pack_request(address: &[u8; DLT645_ADDRESS_LEN], control: u8, data: &[u8]) -> BytesMut {
    let mut buf = BytesMut::with_capacity(DLT645_HEAD_TAIL_LEN + data.len());
    buf.put_bytes(DLT645_LEADING_BYTE, DLT645_PRE_LEADING_LEN);

    let body_start = buf.len();
    buf.put_u8(DLT645_START_BYTE);
    buf.put_slice(address);
    buf.put_u8(DLT645_START_BYTE);
    buf.put_u8(control);
    buf.put_u8(data.len() as u8);
    for byte in data {
        buf.put_u8(byte.wrapping_add(DLT645_DATA_OFFSET));
    }

    let mut checksum = Checksum8::new();
    checksum.update_slice(&buf[body_start..]);
    buf.put_u8(checksum.value());
    buf.put_u8(DLT645_END_BYTE);

    buf
}

/// Parses the fixed span from the first start byte through the length byte:
/// `68 A0..A5 68 C L`, yielding the address slice, control code, and data length.
fn parse_frame_header(input: &[u8]) -> IResult<&[u8], (&[u8], u8, u8)> {
    let (input, start1) = be_u8(input)?;
    if start1 != DLT645_START_BYTE {
        return Err(NomErr::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (input, address) = take(DLT645_ADDRESS_LEN)(input)?;
    let (input, start2) = be_u8(input)?;
    if start2 != DLT645_START_BYTE {
        return Err(NomErr::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        )));
    }
    let (input, control) = be_u8(input)?;
    let (input, data_len) = be_u8(input)?;
    Ok((input, (address, control, data_len)))
}

/// Validates and decodes one reply buffer against the request that produced it.
///
/// Steps: locate the first start byte (anything before it is wake-up padding
/// or line noise), parse the fixed header, enforce the checksum over
/// `[start, start + 10 + data_len)`, strip the `0x33` offset from the data
/// area, and apply the per-function structural checks. An address reply
/// updates `store` as a side effect.
pub fn parse_reply(
    raw: &[u8],
    expected_func: u8,
    expected_tag: u32,
    store: &AddressStore,
) -> Result<ReplyPayload, Dlt645Error> {
    let start = raw
        .iter()
        .position(|byte| *byte == DLT645_START_BYTE)
        .ok_or_else(|| Dlt645Error::Framing("no start byte in reply buffer".into()))?;
    let frame = &raw[start..];

    let (rest, (header_address, control, data_len)) = parse_frame_header(frame)
        .map_err(|e| Dlt645Error::Framing(format!("{e:?}")))?;
    let data_len = data_len as usize;

    // data area plus checksum and end byte must have arrived in full
    if rest.len() < data_len + 2 {
        return Err(Dlt645Error::Framing("reply truncated before checksum".into()));
    }

    let mut checksum = Checksum8::new();
    checksum.update_slice(&frame[..DLT645_FIXED_LEN + data_len]);
    let wire_checksum = frame[DLT645_FIXED_LEN + data_len];
    if checksum.value() != wire_checksum {
        return Err(Dlt645Error::InvalidChecksum {
            expected: wire_checksum,
            calculated: checksum.value(),
        });
    }

    if (expected_func & DLT645_FUNC_CODE_MASK) != (control & DLT645_FUNC_CODE_MASK) {
        return Err(Dlt645Error::FunctionMismatch(format!(
            "request function 0x{expected_func:02X}, reply control 0x{control:02X}"
        )));
    }

    let mut data = rest[..data_len].to_vec();
    remove_transform(&mut data);

    match control & DLT645_FUNC_CODE_MASK {
        DLT645_PKT_TYPE_READ_ADDRESS => {
            if data_len < DLT645_ADDRESS_LEN {
                return Err(Dlt645Error::LengthOutOfRange(data_len));
            }
            // the reply carries the address twice, header and data area;
            // both copies must agree before anything is learned
            if data[..DLT645_ADDRESS_LEN] != header_address[..] {
                return Err(Dlt645Error::AddressMismatch);
            }
            let mut address = [0u8; DLT645_ADDRESS_LEN];
            address.copy_from_slice(&data[..DLT645_ADDRESS_LEN]);
            store.set(address);
            Ok(ReplyPayload::Address(address))
        }

        DLT645_PKT_TYPE_READ_DATA | DLT645_PKT_TYPE_READ_DATA_LEFT => {
            if header_address != store.get() {
                return Err(Dlt645Error::AddressMismatch);
            }
            if control & DLT645_COMM_TYPE_MASK == DLT645_SLAVE_REPLY_ERROR {
                return Err(Dlt645Error::ReplyErrorIndicated);
            }
            if data.get(..DLT645_DATA_TAG_LEN) != Some(&expected_tag.to_le_bytes()[..]) {
                return Err(Dlt645Error::FunctionMismatch(
                    "data identification echo mismatch".into(),
                ));
            }
            if control & DLT645_COMM_TYPE_MASK != DLT645_SLAVE_REPLY_NORMAL {
                return Err(Dlt645Error::FunctionMismatch(
                    "reply direction is not a normal slave reply".into(),
                ));
            }
            if !(DLT645_MIN_DATA_LEN..=DLT645_MAX_DATA_LEN).contains(&data_len) {
                return Err(Dlt645Error::LengthOutOfRange(data_len));
            }
            Ok(ReplyPayload::Measurement(data[DLT645_DATA_TAG_LEN..].to_vec()))
        }

        DLT645_PKT_TYPE_WRITE_DATA => {
            if control != DLT645_PKT_TYPE_WRITE_DATA_RSP && control != DLT645_PKT_TYPE_WRITE_DATA_ERR
            {
                return Err(Dlt645Error::FunctionMismatch(format!(
                    "write acknowledgement has control 0x{control:02X}"
                )));
            }
            Ok(ReplyPayload::WriteAck { control, data })
        }

        _ => Err(Dlt645Error::UnknownFunction(control)),
    }
}

/// Splits a de-transformed data area into `(data_tag, value)` for dispatch.
///
/// Write acknowledgements carry no tag and report it as zero; every other
/// frame leads with the 4-byte little-endian identification. Returns `None`
/// when a tagged frame is too short to hold one.
pub fn classify_data(func_code: u8, data: &[u8]) -> Option<(u32, Vec<u8>)> {
    if func_code == DLT645_PKT_TYPE_WRITE_DATA_RSP || func_code == DLT645_PKT_TYPE_WRITE_DATA_ERR {
        return Some((0, data.to_vec()));
    }
    if data.len() < DLT645_DATA_TAG_LEN {
        return None;
    }
    let data_tag = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
    Some((data_tag, data[DLT645_DATA_TAG_LEN..].to_vec()))
}
