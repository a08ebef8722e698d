//! Secret sealing and opening.
//!
//! A protected token is built encrypt-then-MAC: the plaintext is encrypted
//! under AES-256-CBC with a fresh random IV, an HMAC-SHA256 tag is
//! computed over the ciphertext, and the whole record is base64 encoded.
//!
//! ## Layout of a decoded token
//! ```text
//! [ IV (16 bytes) ][ HMAC (32 bytes) ][ ciphertext ]
//! ```
//!
//! ## Fallback encoding
//!
//! When the master key is weak (shorter than 32 bytes, or the shipped
//! placeholder phrase), [`protect`] does NOT fail. It degrades to a plain
//! base64 encoding of the plaintext: reversible, but providing no secrecy
//! and no authentication. [`unprotect`] reads such records back under the
//! same weak-key condition. This keeps stored secrets readable across a
//! deployment that never configured a real key.
//!
//! ## Key rotation
//!
//! Tokens carry no key-version or algorithm identifier. Rotating the
//! master key makes every prior token fail authentication, and the result
//! is indistinguishable from tampering.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::crypto::{self, IV_LEN, MAC_LEN};
use crate::error::OptsealError;
use crate::keys::MasterKey;

/// Seal a secret for storage, returning an opaque base64 token.
///
/// - Empty plaintext returns an empty token.
/// - A weak master key yields the unauthenticated base64 fallback.
/// - Otherwise the token is authenticated: `base64(IV || MAC || ciphertext)`.
///
/// The only failure mode is the system randomness source refusing to
/// produce an IV.
pub fn protect(master: &MasterKey, plaintext: &str) -> Result<String, OptsealError> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }

    if !master.is_strong() {
        return Ok(BASE64.encode(plaintext));
    }

    let iv = crypto::generate_iv()?;
    let ciphertext = crypto::encrypt(&master.cipher_key(), &iv, plaintext.as_bytes());
    let mac = crypto::sign(master.mac_key(), &ciphertext);

    let mut record = Vec::with_capacity(IV_LEN + MAC_LEN + ciphertext.len());
    record.extend_from_slice(&iv);
    record.extend_from_slice(&mac);
    record.extend_from_slice(&ciphertext);

    Ok(BASE64.encode(record))
}

/// Open a token produced by [`protect`], returning the original secret.
///
/// - Empty token returns an empty string.
/// - The token must decode as strict base64 (`DecodeFailure` otherwise).
/// - A weak master key treats the decoded bytes as the legacy fallback
///   and returns them directly.
/// - Otherwise the MAC is verified in constant time *before* any
///   decryption is attempted. A mismatch (`TamperDetected`) means the
///   token was altered or was written under a different master key.
pub fn unprotect(master: &MasterKey, token: &str) -> Result<String, OptsealError> {
    if token.is_empty() {
        return Ok(String::new());
    }

    let record = BASE64
        .decode(token)
        .map_err(|_| OptsealError::DecodeFailure)?;

    if !master.is_strong() {
        return String::from_utf8(record).map_err(|_| OptsealError::DecodeFailure);
    }

    if record.len() < IV_LEN + MAC_LEN {
        return Err(OptsealError::TruncatedRecord);
    }

    let (iv_bytes, rest) = record.split_at(IV_LEN);
    let (mac, ciphertext) = rest.split_at(MAC_LEN);

    // MAC check gates decryption: a failed tag never reaches the cipher,
    // so padding errors cannot be probed.
    if !crypto::verify(master.mac_key(), ciphertext, mac) {
        return Err(OptsealError::TamperDetected);
    }

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(iv_bytes);

    let plaintext = crypto::decrypt(&master.cipher_key(), &iv, ciphertext)?;
    String::from_utf8(plaintext).map_err(|_| OptsealError::DecryptFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_key() -> MasterKey {
        MasterKey::new("an acceptable master key phrase, 32+ bytes long")
    }

    #[test]
    fn test_protect_roundtrip() {
        let master = strong_key();
        let token = protect(&master, "sk_live_abc123").unwrap();
        assert_ne!(token, "sk_live_abc123");
        assert_eq!(unprotect(&master, &token).unwrap(), "sk_live_abc123");
    }

    #[test]
    fn test_empty_is_noop() {
        let master = strong_key();
        assert_eq!(protect(&master, "").unwrap(), "");
        assert_eq!(unprotect(&master, "").unwrap(), "");
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let master = strong_key();
        let a = protect(&master, "same secret").unwrap();
        let b = protect(&master, "same secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_weak_key_fallback_roundtrip() {
        let weak = MasterKey::new("short");
        let token = protect(&weak, "sk_live_abc123").unwrap();
        // Fallback is plain base64 of the plaintext, nothing more.
        assert_eq!(token, "c2tfbGl2ZV9hYmMxMjM=");
        assert_eq!(unprotect(&weak, &token).unwrap(), "sk_live_abc123");
    }

    #[test]
    fn test_invalid_base64_rejected() {
        let master = strong_key();
        assert_eq!(
            unprotect(&master, "not//valid##base64!"),
            Err(OptsealError::DecodeFailure)
        );
    }

    #[test]
    fn test_short_record_rejected() {
        let master = strong_key();
        // 47 decoded bytes: one short of IV + MAC.
        let short = BASE64.encode([0u8; 47]);
        assert_eq!(
            unprotect(&master, &short),
            Err(OptsealError::TruncatedRecord)
        );
    }
}
