//! # DLT645 Data Identification Tags
//!
//! Every readable or writable meter quantity is selected by a 4-byte data
//! identification (DI0..DI3), transmitted little-endian in the data area of a
//! frame. The constants below form the closed set of identifications this
//! crate recognizes; the nibble structure groups them into measurement
//! categories (cumulative energy, instantaneous power, per-phase quantities).

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cumulative forward active energy, total
pub const DLT645_TAG_FORWARD_ACTIVE_ENERGY: u32 = 0x0001_0000;
/// Cumulative reverse active energy, total
pub const DLT645_TAG_BACKWARD_ACTIVE_ENERGY: u32 = 0x0002_0000;
/// Instantaneous total active power
pub const DLT645_TAG_INSTANT_ACTIVE_POWER: u32 = 0x0203_0000;

pub const DLT645_TAG_GRID_PHASE_VOLTAGE_A: u32 = 0x0201_0100;
pub const DLT645_TAG_GRID_PHASE_VOLTAGE_B: u32 = 0x0201_0200;
pub const DLT645_TAG_GRID_PHASE_VOLTAGE_C: u32 = 0x0201_0300;

pub const DLT645_TAG_GRID_PHASE_CURRENT_A: u32 = 0x0202_0100;
pub const DLT645_TAG_GRID_PHASE_CURRENT_B: u32 = 0x0202_0200;
pub const DLT645_TAG_GRID_PHASE_CURRENT_C: u32 = 0x0202_0300;

pub const DLT645_TAG_GRID_PHASE_POWER_A: u32 = 0x0203_0100;
pub const DLT645_TAG_GRID_PHASE_POWER_B: u32 = 0x0203_0200;
pub const DLT645_TAG_GRID_PHASE_POWER_C: u32 = 0x0203_0300;

// Cumulative forward active energy, tariffs 1-4
pub const DLT645_TAG_FORWARD_ACTIVE_ENERGY_1: u32 = 0x0001_0100;
pub const DLT645_TAG_FORWARD_ACTIVE_ENERGY_2: u32 = 0x0001_0200;
pub const DLT645_TAG_FORWARD_ACTIVE_ENERGY_3: u32 = 0x0001_0300;
pub const DLT645_TAG_FORWARD_ACTIVE_ENERGY_4: u32 = 0x0001_0400;

// Cumulative reverse active energy, tariffs 1-4
pub const DLT645_TAG_BACKWARD_ACTIVE_ENERGY_1: u32 = 0x0002_0100;
pub const DLT645_TAG_BACKWARD_ACTIVE_ENERGY_2: u32 = 0x0002_0200;
pub const DLT645_TAG_BACKWARD_ACTIVE_ENERGY_3: u32 = 0x0002_0300;
pub const DLT645_TAG_BACKWARD_ACTIVE_ENERGY_4: u32 = 0x0002_0400;

static TAG_DESCRIPTIONS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (DLT645_TAG_FORWARD_ACTIVE_ENERGY, "forward active energy, total"),
        (DLT645_TAG_BACKWARD_ACTIVE_ENERGY, "reverse active energy, total"),
        (DLT645_TAG_INSTANT_ACTIVE_POWER, "instantaneous total active power"),
        (DLT645_TAG_GRID_PHASE_VOLTAGE_A, "phase A voltage"),
        (DLT645_TAG_GRID_PHASE_VOLTAGE_B, "phase B voltage"),
        (DLT645_TAG_GRID_PHASE_VOLTAGE_C, "phase C voltage"),
        (DLT645_TAG_GRID_PHASE_CURRENT_A, "phase A current"),
        (DLT645_TAG_GRID_PHASE_CURRENT_B, "phase B current"),
        (DLT645_TAG_GRID_PHASE_CURRENT_C, "phase C current"),
        (DLT645_TAG_GRID_PHASE_POWER_A, "phase A active power"),
        (DLT645_TAG_GRID_PHASE_POWER_B, "phase B active power"),
        (DLT645_TAG_GRID_PHASE_POWER_C, "phase C active power"),
        (DLT645_TAG_FORWARD_ACTIVE_ENERGY_1, "forward active energy, tariff 1"),
        (DLT645_TAG_FORWARD_ACTIVE_ENERGY_2, "forward active energy, tariff 2"),
        (DLT645_TAG_FORWARD_ACTIVE_ENERGY_3, "forward active energy, tariff 3"),
        (DLT645_TAG_FORWARD_ACTIVE_ENERGY_4, "forward active energy, tariff 4"),
        (DLT645_TAG_BACKWARD_ACTIVE_ENERGY_1, "reverse active energy, tariff 1"),
        (DLT645_TAG_BACKWARD_ACTIVE_ENERGY_2, "reverse active energy, tariff 2"),
        (DLT645_TAG_BACKWARD_ACTIVE_ENERGY_3, "reverse active energy, tariff 3"),
        (DLT645_TAG_BACKWARD_ACTIVE_ENERGY_4, "reverse active energy, tariff 4"),
    ])
});

/// Returns a human-readable description of a recognized data identification.
pub fn describe_tag(data_tag: u32) -> Option<&'static str> {
    TAG_DESCRIPTIONS.get(&data_tag).copied()
}

/// Returns true if the data identification belongs to the recognized set.
pub fn is_known_tag(data_tag: u32) -> bool {
    TAG_DESCRIPTIONS.contains_key(&data_tag)
}
