//! Unit tests for the frame codec: request packing, reply validation,
//! checksum accumulation, and the wire data transform.

use dlt645_rs::constants::{
    DLT645_PKT_TYPE_READ_ADDRESS, DLT645_PKT_TYPE_READ_DATA, DLT645_PKT_TYPE_WRITE_DATA,
};
use dlt645_rs::dlt645::frame::{
    apply_transform, pack_read_request, pack_write_request, parse_reply, remove_transform,
    Checksum8, ReplyPayload,
};
use dlt645_rs::tags::{
    DLT645_TAG_FORWARD_ACTIVE_ENERGY, DLT645_TAG_GRID_PHASE_VOLTAGE_B,
    DLT645_TAG_INSTANT_ACTIVE_POWER,
};
use dlt645_rs::{AddressStore, Dlt645Error};
use proptest::prelude::*;

const METER_ADDRESS: [u8; 6] = [0x66, 0x66, 0x66, 0x66, 0x66, 0x66];
const WILDCARD: [u8; 6] = [0xAA; 6];

/// Builds a reply frame the way a meter would: transformed data, valid
/// checksum over the span from the first start byte through the data area.
fn build_reply(address: &[u8; 6], control: u8, data: &[u8]) -> Vec<u8> {
    let mut frame = vec![0x68];
    frame.extend_from_slice(address);
    frame.push(0x68);
    frame.push(control);
    frame.push(data.len() as u8);
    for byte in data {
        frame.push(byte.wrapping_add(0x33));
    }
    let mut checksum = Checksum8::new();
    checksum.update_slice(&frame);
    frame.push(checksum.value());
    frame.push(0x16);
    frame
}

fn store_with(address: [u8; 6]) -> AddressStore {
    let store = AddressStore::new();
    store.set(address);
    store
}

/// Tests the golden encoding of an address-read request to the wildcard.
#[test]
fn test_pack_read_address_request() {
    let pkt = pack_read_request(&WILDCARD, DLT645_PKT_TYPE_READ_ADDRESS, None);
    assert_eq!(
        &pkt[..],
        &[
            0xFE, 0xFE, 0xFE, 0xFE, 0x68, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0x68, 0x13, 0x00,
            0xDF, 0x16,
        ]
    );
}

/// Tests the golden encoding of a data-read request for the cumulative
/// forward active energy tag.
#[test]
fn test_pack_read_data_request() {
    let pkt = pack_read_request(
        &METER_ADDRESS,
        DLT645_PKT_TYPE_READ_DATA,
        Some(DLT645_TAG_FORWARD_ACTIVE_ENERGY),
    );
    assert_eq!(
        &pkt[..],
        &[
            0xFE, 0xFE, 0xFE, 0xFE, 0x68, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x68, 0x11, 0x04,
            0x33, 0x33, 0x34, 0x33, 0x16, 0x16,
        ]
    );
}

/// The data area of every read request echoes the tag little-endian,
/// shifted by the wire offset.
#[test]
fn test_request_embeds_tag_little_endian() {
    for tag in [
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        DLT645_TAG_INSTANT_ACTIVE_POWER,
        DLT645_TAG_GRID_PHASE_VOLTAGE_B,
    ] {
        let pkt = pack_read_request(&METER_ADDRESS, DLT645_PKT_TYPE_READ_DATA, Some(tag));
        let mut data: Vec<u8> = pkt[14..18].to_vec();
        remove_transform(&mut data);
        assert_eq!(data, tag.to_le_bytes());
    }
}

#[test]
fn test_pack_write_request_layout() {
    let password = [0x00, 0x00, 0x00, 0x00];
    let operator = [0xC1, 0xC2, 0xC3, 0xC4];
    let payload = [0x01];
    let pkt = pack_write_request(
        &METER_ADDRESS,
        DLT645_PKT_TYPE_WRITE_DATA,
        &password,
        &operator,
        0x0400_010A,
        &payload,
    )
    .unwrap();

    assert_eq!(pkt[12], 0x14); // master query | write
    assert_eq!(pkt[13], 13); // tag 4 + password 4 + operator 4 + payload 1
    let mut data: Vec<u8> = pkt[14..27].to_vec();
    remove_transform(&mut data);
    assert_eq!(&data[..4], &0x0400_010Au32.to_le_bytes());
    assert_eq!(&data[4..8], &password);
    assert_eq!(&data[8..12], &operator);
    assert_eq!(&data[12..], &payload);
    assert_eq!(*pkt.last().unwrap(), 0x16);
}

#[test]
fn test_pack_write_request_rejects_bad_password_length() {
    let result = pack_write_request(
        &METER_ADDRESS,
        DLT645_PKT_TYPE_WRITE_DATA,
        &[0x00; 3],
        &[0xC1; 4],
        0x0400_010A,
        &[0x01],
    );
    assert!(matches!(result, Err(Dlt645Error::InvalidArgument(_))));

    let result = pack_write_request(
        &METER_ADDRESS,
        DLT645_PKT_TYPE_WRITE_DATA,
        &[0x00; 4],
        &[0xC1; 5],
        0x0400_010A,
        &[0x01],
    );
    assert!(matches!(result, Err(Dlt645Error::InvalidArgument(_))));
}

#[test]
fn test_checksum8_accumulator() {
    let mut checksum = Checksum8::new();
    assert_eq!(checksum.value(), 0);

    checksum.update(0xFF);
    checksum.update(0x02);
    assert_eq!(checksum.value(), 0x01); // 8-bit wraparound

    checksum.reset();
    checksum.update_slice(&[0x68, 0x11, 0x04]);
    assert_eq!(checksum.value(), 0x7D);
}

/// The embedded checksum equals the additive sum of the covered range, and
/// flipping any covered byte changes it.
#[test]
fn test_checksum_covers_frame_body() {
    let pkt = pack_read_request(
        &METER_ADDRESS,
        DLT645_PKT_TYPE_READ_DATA,
        Some(DLT645_TAG_FORWARD_ACTIVE_ENERGY),
    );
    let covered = &pkt[4..pkt.len() - 2];
    let sum = covered
        .iter()
        .fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    assert_eq!(sum, pkt[pkt.len() - 2]);

    for i in 0..covered.len() {
        let mut flipped = covered.to_vec();
        flipped[i] ^= 0x01;
        let flipped_sum = flipped
            .iter()
            .fold(0u8, |acc, byte| acc.wrapping_add(*byte));
        assert_ne!(flipped_sum, sum, "flipping covered byte {i} left the sum unchanged");
    }
}

#[test]
fn test_decode_read_data_reply() {
    let store = store_with(METER_ADDRESS);
    let mut data = DLT645_TAG_FORWARD_ACTIVE_ENERGY.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x78, 0x56, 0x34, 0x12]);
    let reply = build_reply(&METER_ADDRESS, 0x91, &data);

    let payload = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    )
    .unwrap();
    assert_eq!(
        payload,
        ReplyPayload::Measurement(vec![0x78, 0x56, 0x34, 0x12])
    );
}

/// Leading wake-up bytes ahead of the reply are skipped.
#[test]
fn test_decode_skips_leading_bytes() {
    let store = store_with(METER_ADDRESS);
    let mut data = DLT645_TAG_FORWARD_ACTIVE_ENERGY.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x00, 0x00]);
    let mut reply = vec![0xFE, 0xFE];
    reply.extend(build_reply(&METER_ADDRESS, 0x91, &data));

    let payload = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    )
    .unwrap();
    assert_eq!(payload, ReplyPayload::Measurement(vec![0x00, 0x00]));
}

/// A buffer of nothing but wake-up bytes never yields a partial decode.
#[test]
fn test_all_leading_bytes_is_framing_error() {
    let store = AddressStore::new();
    let result = parse_reply(&[0xFE; 20], DLT645_PKT_TYPE_READ_DATA, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::Framing(_))));
}

#[test]
fn test_missing_second_start_byte_is_framing_error() {
    let store = store_with(METER_ADDRESS);
    let mut reply = build_reply(&METER_ADDRESS, 0x91, &[0x33; 6]);
    reply[7] = 0x00; // clobber the second delimiter
    let result = parse_reply(&reply, DLT645_PKT_TYPE_READ_DATA, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::Framing(_))));
}

#[test]
fn test_truncated_reply_is_framing_error() {
    let store = store_with(METER_ADDRESS);
    let reply = build_reply(&METER_ADDRESS, 0x91, &[0x33; 6]);
    let result = parse_reply(&reply[..reply.len() - 4], DLT645_PKT_TYPE_READ_DATA, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::Framing(_))));
}

/// Checksum enforcement is strict on the synchronous path.
#[test]
fn test_checksum_mismatch_is_fatal() {
    let store = store_with(METER_ADDRESS);
    let mut data = DLT645_TAG_FORWARD_ACTIVE_ENERGY.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x00, 0x00]);
    let mut reply = build_reply(&METER_ADDRESS, 0x91, &data);
    let cs_pos = reply.len() - 2;
    reply[cs_pos] = reply[cs_pos].wrapping_add(1);

    let result = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    );
    assert!(matches!(result, Err(Dlt645Error::InvalidChecksum { .. })));
}

#[test]
fn test_reply_from_wrong_meter_is_address_mismatch() {
    let store = store_with(METER_ADDRESS);
    let mut data = DLT645_TAG_FORWARD_ACTIVE_ENERGY.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x00, 0x00]);
    let reply = build_reply(&[0x99; 6], 0x91, &data);

    let result = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    );
    assert!(matches!(result, Err(Dlt645Error::AddressMismatch)));
}

#[test]
fn test_error_reply_direction_is_reported() {
    let store = store_with(METER_ADDRESS);
    let data = [0x01]; // error code payload
    let reply = build_reply(&METER_ADDRESS, 0xD1, &data);

    let result = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    );
    assert!(matches!(result, Err(Dlt645Error::ReplyErrorIndicated)));
}

#[test]
fn test_tag_echo_mismatch() {
    let store = store_with(METER_ADDRESS);
    let mut data = DLT645_TAG_INSTANT_ACTIVE_POWER.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x00, 0x00]);
    let reply = build_reply(&METER_ADDRESS, 0x91, &data);

    let result = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    );
    assert!(matches!(result, Err(Dlt645Error::FunctionMismatch(_))));
}

#[test]
fn test_oversized_data_area_is_length_error() {
    let store = store_with(METER_ADDRESS);
    let mut data = DLT645_TAG_FORWARD_ACTIVE_ENERGY.to_le_bytes().to_vec();
    data.extend_from_slice(&[0x00; 9]); // data area of 13 bytes
    let reply = build_reply(&METER_ADDRESS, 0x91, &data);

    let result = parse_reply(
        &reply,
        DLT645_PKT_TYPE_READ_DATA,
        DLT645_TAG_FORWARD_ACTIVE_ENERGY,
        &store,
    );
    assert!(matches!(result, Err(Dlt645Error::LengthOutOfRange(13))));
}

#[test]
fn test_reply_family_mismatch() {
    let store = store_with(METER_ADDRESS);
    let reply = build_reply(&METER_ADDRESS, 0x94, &[]);
    let result = parse_reply(&reply, DLT645_PKT_TYPE_READ_DATA, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::FunctionMismatch(_))));
}

/// An unrecognized control code never yields a zero-filled result.
#[test]
fn test_unknown_function_code() {
    let store = store_with(METER_ADDRESS);
    let reply = build_reply(&METER_ADDRESS, 0x96, &[0x00; 6]);
    let result = parse_reply(&reply, 0x16, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::UnknownFunction(0x96))));
}

/// An address reply carries the address twice and learns it into the store.
#[test]
fn test_decode_address_reply_learns_address() {
    let store = AddressStore::new();
    assert!(store.is_wildcard());

    let reply = build_reply(&METER_ADDRESS, 0x93, &METER_ADDRESS);
    let payload = parse_reply(&reply, DLT645_PKT_TYPE_READ_ADDRESS, 0, &store).unwrap();
    assert_eq!(payload, ReplyPayload::Address(METER_ADDRESS));
    assert_eq!(store.get(), METER_ADDRESS);
}

#[test]
fn test_address_reply_with_disagreeing_copies() {
    let store = AddressStore::new();
    let reply = build_reply(&METER_ADDRESS, 0x93, &[0x55; 6]);
    let result = parse_reply(&reply, DLT645_PKT_TYPE_READ_ADDRESS, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::AddressMismatch)));
    assert!(store.is_wildcard(), "a rejected reply must not update the store");
}

#[test]
fn test_short_address_reply_is_length_error() {
    let store = AddressStore::new();
    let reply = build_reply(&METER_ADDRESS, 0x93, &METER_ADDRESS[..4]);
    let result = parse_reply(&reply, DLT645_PKT_TYPE_READ_ADDRESS, 0, &store);
    assert!(matches!(result, Err(Dlt645Error::LengthOutOfRange(4))));
}

#[test]
fn test_decode_write_ack_and_error() {
    let store = store_with(METER_ADDRESS);

    let reply = build_reply(&METER_ADDRESS, 0x94, &[]);
    let payload = parse_reply(&reply, DLT645_PKT_TYPE_WRITE_DATA, 0, &store).unwrap();
    assert_eq!(
        payload,
        ReplyPayload::WriteAck {
            control: 0x94,
            data: vec![],
        }
    );

    let reply = build_reply(&METER_ADDRESS, 0xD4, &[0x02]);
    let payload = parse_reply(&reply, DLT645_PKT_TYPE_WRITE_DATA, 0, &store).unwrap();
    assert_eq!(
        payload,
        ReplyPayload::WriteAck {
            control: 0xD4,
            data: vec![0x02],
        }
    );
}

proptest! {
    /// The wire transform is involutive for every byte value.
    #[test]
    fn prop_transform_involutive(byte in any::<u8>()) {
        let mut data = [byte];
        apply_transform(&mut data);
        remove_transform(&mut data);
        prop_assert_eq!(data[0], byte);
    }

    /// Every packed read request terminates correctly and carries a checksum
    /// matching its body, whatever the tag and address.
    #[test]
    fn prop_read_request_well_formed(
        tag in any::<u32>(),
        address in any::<[u8; 6]>(),
    ) {
        let pkt = pack_read_request(&address, DLT645_PKT_TYPE_READ_DATA, Some(tag));
        prop_assert_eq!(pkt.len(), 20);
        prop_assert_eq!(pkt[pkt.len() - 1], 0x16);

        let mut checksum = Checksum8::new();
        checksum.update_slice(&pkt[4..pkt.len() - 2]);
        prop_assert_eq!(checksum.value(), pkt[pkt.len() - 2]);
    }
}
