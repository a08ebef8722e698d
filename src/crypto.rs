//! Low-level cryptographic operations.
//!
//! This module is the only place in the crate that imports `ring`, `aes`
//! and `cbc` directly. All other modules encrypt, decrypt and authenticate
//! exclusively through the functions exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-CBC with PKCS#7 padding
//! - **Authentication**: HMAC-SHA256 over the ciphertext (encrypt-then-MAC)
//! - **IV**: 128-bit (16 bytes), generated fresh per operation via `SystemRandom`
//! - **Key size**: 256 bits (32 bytes)

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};

use crate::error::OptsealError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the initialization vector in bytes (one AES block).
pub const IV_LEN: usize = 16;

/// Size of an HMAC-SHA256 tag in bytes.
pub const MAC_LEN: usize = 32;

/// Size of the cipher key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Generate a cryptographically secure random IV.
///
/// Uses `ring::rand::SystemRandom` — the only source of randomness in the
/// crate. A fresh IV is generated for every encryption call; there is no
/// IV caching or counter-based generation. `SystemRandom` draws from the
/// operating system's CSPRNG, so a successful fill is by definition
/// cryptographically strong; a fill error aborts the operation.
pub fn generate_iv() -> Result<[u8; IV_LEN], OptsealError> {
    let rng = SystemRandom::new();
    let mut buf = [0u8; IV_LEN];
    rng.fill(&mut buf)
        .map_err(|_| OptsealError::RandomnessFailure)?;
    Ok(buf)
}

/// Generate a cryptographically secure random key.
///
/// This is the only function in the crate that produces raw key material
/// from scratch. It is used by `generate_master_key()` in the public API.
pub fn generate_random_key() -> Result<[u8; KEY_LEN], OptsealError> {
    let rng = SystemRandom::new();
    let mut key = [0u8; KEY_LEN];
    rng.fill(&mut key)
        .map_err(|_| OptsealError::RandomnessFailure)?;
    Ok(key)
}

/// Encrypt a plaintext payload using AES-256-CBC with PKCS#7 padding.
///
/// The caller supplies the IV and is responsible for bundling it with the
/// ciphertext. With fixed-size key and IV the operation cannot fail.
pub fn encrypt(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN], plaintext: &[u8]) -> Vec<u8> {
    Aes256CbcEnc::new(key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Decrypt a ciphertext payload using AES-256-CBC.
///
/// Fails if the ciphertext is not a whole number of blocks or the PKCS#7
/// padding is invalid. Callers must verify the MAC *before* calling this —
/// a padding failure on authenticated input indicates key mismatch, not
/// attacker-controlled probing.
pub fn decrypt(
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, OptsealError> {
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| OptsealError::DecryptFailure)
}

/// Compute an HMAC-SHA256 tag over `data`.
///
/// The MAC key may be any length; HMAC handles hashing long keys and
/// padding short ones internally.
pub fn sign(mac_key: &[u8], data: &[u8]) -> [u8; MAC_LEN] {
    let key = hmac::Key::new(hmac::HMAC_SHA256, mac_key);
    let tag = hmac::sign(&key, data);
    let mut out = [0u8; MAC_LEN];
    out.copy_from_slice(tag.as_ref());
    out
}

/// Verify an HMAC-SHA256 tag over `data` in constant time.
///
/// `ring::hmac::verify` performs the comparison without early exit, so the
/// check leaks no timing information about where the tags diverge.
pub fn verify(mac_key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let key = hmac::Key::new(hmac::HMAC_SHA256, mac_key);
    hmac::verify(&key, data, tag).is_ok()
}
