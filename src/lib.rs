//! # optseal
//!
//! Authenticated secret sealing and fail-closed settings sanitization.
//!
//! Secrets are sealed for storage with encrypt-then-MAC (AES-256-CBC +
//! HMAC-SHA256) under a caller-supplied master key and verified on the
//! way back out; a weak or placeholder key degrades to a reversible,
//! unauthenticated fallback encoding rather than failing. Around that
//! core sits a settings pipeline: per-field fail-closed sanitization, a
//! rate-limited save flow over a pluggable store, and a priority-ordered
//! hook registry bound at startup.
//!
//! ## Public API
//!
//! The public surface of this crate is intentionally narrow. The types
//! and functions re-exported here are the intended entry points; the
//! cryptographic primitives stay `pub(crate)`.

// Module declarations.
pub(crate) mod crypto;
pub mod error;
pub mod hooks;
pub mod keys;
pub mod limiter;
pub mod protect;
pub mod sanitize;
pub mod save;
pub mod settings;
pub mod store;

pub use error::OptsealError;
pub use keys::MasterKey;
pub use protect::{protect, unprotect};
pub use save::{Rejection, RejectionKind, SaveAck, SaveRequest, SettingsService};
pub use settings::{
    reveal_api_key, sanitize_settings, PluginMode, RawSettings, Settings,
};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};

/// Generate a cryptographically secure master key.
///
/// Convenience for deployments without an existing configuration secret.
/// The returned key is 32 random bytes and always passes the strength
/// check. In production, callers should source the master key from their
/// configuration layer and construct it with [`MasterKey::new`].
pub fn generate_master_key() -> Result<MasterKey, OptsealError> {
    let bytes = crypto::generate_random_key()?;
    Ok(MasterKey::from_bytes(bytes))
}
