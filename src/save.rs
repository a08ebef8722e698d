//! The settings save pipeline.
//!
//! [`SettingsService`] is the coordinating object the process entry point
//! constructs once and passes by reference to consumers — there is no
//! hidden global instance. It owns the master key, the store, the rate
//! limiter and the hook registry, and runs the write endpoint's checks in
//! a fixed order: rate-limit gate, one-time-token check, permission
//! check, then sanitize and store.
//!
//! The one-time token itself is validated by the hosting framework before
//! a request reaches this crate; the request carries only the verdict.

use std::fmt;

use crate::hooks::{HookRegistry, SETTINGS_SAVED};
use crate::keys::MasterKey;
use crate::limiter::RateLimiter;
use crate::settings::{sanitize_settings, RawSettings, Settings};
use crate::store::SettingsStore;

/// Store key the service persists the bag under.
const SETTINGS_KEY: &str = "optseal_settings";

/// Why a save request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// The identity exceeded the attempt quota.
    RateLimit,
    /// The one-time token did not verify upstream.
    SecurityCheck,
    /// The identity lacks the management capability.
    Permission,
    /// Request-level validation failed. Field-level problems never land
    /// here — bad fields are silently defaulted during sanitization.
    /// Reserved for callers layering their own request validation.
    Validation,
    /// The store refused a genuinely changed value.
    Storage,
}

/// A structured save refusal: classification plus a human-readable
/// message suitable for the transport response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub message: String,
}

impl Rejection {
    fn new(kind: RejectionKind, message: &str) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Rejection {}

/// A successful save acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAck {
    /// A changed bag was written.
    Saved,
    /// The sanitized bag equals what is already stored; nothing written.
    Unchanged,
}

impl SaveAck {
    /// The human-readable acknowledgment for the transport response.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Saved => "Settings saved.",
            Self::Unchanged => "No changes detected.",
        }
    }
}

/// One write request as it arrives from the transport boundary.
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    /// Who is saving; the rate-limit key.
    pub identity: String,
    /// Verdict of the framework's one-time-token check.
    pub token_valid: bool,
    /// Whether the identity holds the management capability.
    pub can_manage: bool,
    /// The raw fields to sanitize and store.
    pub input: RawSettings,
}

/// The settings coordinator: master key, store, limiter and hooks behind
/// one save/load surface.
pub struct SettingsService<S: SettingsStore> {
    master: MasterKey,
    store: S,
    limiter: RateLimiter,
    hooks: HookRegistry,
}

impl<S: SettingsStore> SettingsService<S> {
    /// Build a service with the default rate limit (10 saves per minute).
    pub fn new(master: MasterKey, store: S) -> Self {
        Self::with_limiter(master, store, RateLimiter::default())
    }

    /// Build a service with an explicit rate limiter.
    pub fn with_limiter(master: MasterKey, store: S, limiter: RateLimiter) -> Self {
        Self {
            master,
            store,
            limiter,
            hooks: HookRegistry::new(),
        }
    }

    /// The hook registry, for startup-time registration.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    /// Run one save request through the full pipeline.
    ///
    /// Check order matches the original endpoint: the rate limiter gates
    /// first (without consuming quota), then the token verdict, then the
    /// permission check; only a request that passed all three counts
    /// against the quota. Sanitization cannot fail — whatever survives
    /// the checks produces a well-formed bag.
    pub fn save(&mut self, request: &SaveRequest) -> Result<SaveAck, Rejection> {
        if !self.limiter.check(&request.identity) {
            return Err(Rejection::new(
                RejectionKind::RateLimit,
                "Too many requests. Please try again later.",
            ));
        }

        if !request.token_valid {
            return Err(Rejection::new(
                RejectionKind::SecurityCheck,
                "Security check failed.",
            ));
        }

        if !request.can_manage {
            return Err(Rejection::new(
                RejectionKind::Permission,
                "Permission denied.",
            ));
        }

        self.limiter.record(&request.identity);

        let sanitized = sanitize_settings(&self.master, &request.input);

        if !self.store.set(SETTINGS_KEY, &sanitized) {
            // A false write of an identical value is a no-op success.
            if self.store.get(SETTINGS_KEY).as_ref() == Some(&sanitized) {
                return Ok(SaveAck::Unchanged);
            }
            return Err(Rejection::new(
                RejectionKind::Storage,
                "Failed to save settings. Please try again.",
            ));
        }

        self.hooks.run(SETTINGS_SAVED, &sanitized);
        Ok(SaveAck::Saved)
    }

    /// The stored bag, or defaults when nothing was ever saved.
    pub fn load(&self) -> Settings {
        self.store.get(SETTINGS_KEY).unwrap_or_default()
    }

    /// Open the protected API key from the stored bag.
    ///
    /// Empty when no key is stored; errors surface the protection
    /// layer's failure (tampered record, wrong master key).
    pub fn reveal_api_key(&self) -> Result<String, crate::error::OptsealError> {
        crate::settings::reveal_api_key(&self.master, &self.load())
    }
}
