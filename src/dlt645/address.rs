//! Learned meter address store.
//!
//! A DLT645 link starts out addressing the wildcard `AA AA AA AA AA AA`, which
//! any meter answers to during an address query. A successful address read
//! replaces it with the meter's real 6-byte address, and every later request
//! embeds the learned value. The store is the one piece of state shared
//! between the transaction engine and its callers, so access goes through an
//! internal mutex and the store itself is handed around as `Arc<AddressStore>`.

use crate::constants::{DLT645_ADDRESS_LEN, DLT645_WILDCARD_ADDRESS_BYTE};
use std::sync::Mutex;

/// Holds the 6-byte meter address learned from the link.
#[derive(Debug)]
pub struct AddressStore {
    inner: Mutex<[u8; DLT645_ADDRESS_LEN]>,
}

impl AddressStore {
    /// Creates a store holding the wildcard address.
    pub fn new() -> Self {
        AddressStore {
            inner: Mutex::new([DLT645_WILDCARD_ADDRESS_BYTE; DLT645_ADDRESS_LEN]),
        }
    }

    /// Returns a copy of the current address.
    pub fn get(&self) -> [u8; DLT645_ADDRESS_LEN] {
        *self.inner.lock().unwrap()
    }

    /// Replaces the stored address with one learned from an address reply.
    pub fn set(&self, address: [u8; DLT645_ADDRESS_LEN]) {
        *self.inner.lock().unwrap() = address;
    }

    /// Restores the wildcard address, forgetting anything learned.
    pub fn reset(&self) {
        self.set([DLT645_WILDCARD_ADDRESS_BYTE; DLT645_ADDRESS_LEN]);
    }

    /// Returns true while no real address has been learned yet.
    pub fn is_wildcard(&self) -> bool {
        self.get() == [DLT645_WILDCARD_ADDRESS_BYTE; DLT645_ADDRESS_LEN]
    }
}

impl Default for AddressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_wildcard() {
        let store = AddressStore::new();
        assert!(store.is_wildcard());
        assert_eq!(store.get(), [0xAA; 6]);
    }

    #[test]
    fn test_set_and_reset() {
        let store = AddressStore::new();
        store.set([0x66, 0x66, 0x66, 0x66, 0x66, 0x66]);
        assert!(!store.is_wildcard());
        assert_eq!(store.get(), [0x66; 6]);

        store.reset();
        assert!(store.is_wildcard());
    }
}
