//! Error types for optseal.
//!
//! Every variant is a distinct failure mode in the protection pipeline.
//! Error messages are intentionally minimal — they signal *what* failed
//! without revealing *why* in ways that could leak cryptographic state.
//! In particular, a wrong master key and a tampered token are reported
//! identically (`TamperDetected`): tokens carry no key version, so the
//! two cases cannot be told apart.

use std::fmt;

/// The single error type for all optseal operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptsealError {
    /// The system's random number generator failed to produce bytes.
    RandomnessFailure,

    /// A token was not valid strict base64, or a fallback-encoded token
    /// did not decode to valid UTF-8.
    DecodeFailure,

    /// A decoded token is too short to hold an IV and a MAC.
    TruncatedRecord,

    /// The stored MAC does not match the ciphertext. The token was
    /// tampered with, or it was produced under a different master key.
    TamperDetected,

    /// Decryption failed after the MAC verified (bad padding), or the
    /// recovered plaintext was not valid UTF-8.
    DecryptFailure,
}

impl fmt::Display for OptsealError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RandomnessFailure => write!(f, "randomness source failed"),
            Self::DecodeFailure => write!(f, "token decoding failed"),
            Self::TruncatedRecord => write!(f, "token too short"),
            Self::TamperDetected => write!(f, "authentication failed"),
            Self::DecryptFailure => write!(f, "decryption failed"),
        }
    }
}

impl std::error::Error for OptsealError {}
