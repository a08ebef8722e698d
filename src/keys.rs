//! Master key ownership and validity.
//!
//! The master key is an externally supplied long-lived secret — typically
//! a configuration phrase managed alongside the process configuration. It
//! is read fresh for every operation; the crate never caches key material
//! across process boundaries.
//!
//! A key is only considered *strong* when it is at least 32 bytes long and
//! is not the well-known placeholder that ships in default configuration
//! files. A weak key does not fail operations: the protection layer
//! degrades to a reversible, unauthenticated fallback encoding instead
//! (see [`crate::protect`]).

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KEY_LEN;

/// The placeholder secret shipped in default configuration files. A key
/// equal to this phrase provides no secrecy and is treated as absent.
const PLACEHOLDER: &[u8] = b"put your unique phrase here";

/// A master key. This is the single secret used for both encryption and
/// authentication of protected records.
///
/// - Not `Clone`. Cannot be duplicated without explicit conversion.
/// - Zeroised on drop. Memory is overwritten before deallocation.
/// - Raw bytes never leave the crate.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: Vec<u8>,
}

impl MasterKey {
    /// Construct a `MasterKey` from a configuration secret.
    ///
    /// Accepts any byte length. Strength is checked per operation, not at
    /// construction, because a weak key is a supported degraded mode
    /// rather than an error.
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: secret.into(),
        }
    }

    /// Construct a `MasterKey` from exactly 32 raw bytes.
    ///
    /// Used by `crate::generate_master_key()`; callers with an existing
    /// configuration secret should prefer [`MasterKey::new`].
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Whether this key is usable for authenticated encryption:
    /// at least 32 bytes and not the placeholder phrase.
    pub fn is_strong(&self) -> bool {
        self.bytes.len() >= KEY_LEN && self.bytes != PLACEHOLDER
    }

    /// The AES-256 cipher key: the first 32 bytes of the secret.
    ///
    /// Only meaningful on the strong path; callers must check
    /// [`is_strong`](Self::is_strong) first.
    pub(crate) fn cipher_key(&self) -> [u8; KEY_LEN] {
        debug_assert!(self.bytes.len() >= KEY_LEN);
        let mut key = [0u8; KEY_LEN];
        key.copy_from_slice(&self.bytes[..KEY_LEN]);
        key
    }

    /// The HMAC key: the full secret bytes.
    ///
    /// `pub(crate)` — raw bytes never leave the crate.
    pub(crate) fn mac_key(&self) -> &[u8] {
        &self.bytes
    }
}
