//! The settings bag and its sanitization pipeline.
//!
//! [`sanitize_settings`] turns one request's worth of raw transport fields
//! into an immutable [`Settings`] value. Every field is validated
//! independently and collapses to a safe default on bad input — the bag
//! that comes out is always well-formed, whatever went in. The API key is
//! the one field that passes through the protection layer on the way in.

use serde::{Deserialize, Serialize};

use crate::keys::MasterKey;
use crate::protect::{protect, unprotect};
use crate::sanitize;

/// Upper bound for the cache duration, in seconds (24 hours).
pub const CACHE_DURATION_MAX: u32 = 86_400;

/// Default cache duration, in seconds.
pub const CACHE_DURATION_DEFAULT: u32 = 3_600;

/// Operating mode. Unknown values parse as [`PluginMode::Basic`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginMode {
    #[default]
    Basic,
    Advanced,
    Pro,
}

impl PluginMode {
    /// Whitelist parse: anything outside the three known modes, including
    /// an absent field, falls back to `Basic`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("basic") => Self::Basic,
            Some("advanced") => Self::Advanced,
            Some("pro") => Self::Pro,
            _ => Self::Basic,
        }
    }

    /// The wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Advanced => "advanced",
            Self::Pro => "pro",
        }
    }
}

/// One save request's raw fields, exactly as the transport hands them
/// over: every field optional, booleans as presence markers.
#[derive(Debug, Clone, Default)]
pub struct RawSettings {
    pub enable_feature: Option<String>,
    pub plugin_mode: Option<String>,
    pub cache_duration: Option<String>,
    pub api_key: Option<String>,
    pub debug_mode: Option<String>,
    pub custom_css: Option<String>,
    pub enable_analytics: Option<String>,
    pub third_party_api_url: Option<String>,
    pub webhook_url: Option<String>,
}

/// A sanitized, immutable settings bag.
///
/// `api_key` holds the opaque protected token, never the plaintext; use
/// [`reveal_api_key`] to read it back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub enable_feature: bool,
    pub plugin_mode: PluginMode,
    pub cache_duration: u32,
    pub api_key: String,
    pub debug_mode: bool,
    pub custom_css: String,
    pub enable_analytics: bool,
    pub third_party_api_url: String,
    pub webhook_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_feature: false,
            plugin_mode: PluginMode::Basic,
            cache_duration: CACHE_DURATION_DEFAULT,
            api_key: String::new(),
            debug_mode: false,
            custom_css: String::new(),
            enable_analytics: false,
            third_party_api_url: String::new(),
            webhook_url: String::new(),
        }
    }
}

/// Build a sanitized [`Settings`] bag from raw input.
///
/// Field rules run independently; none of them can fail the call. A
/// cryptographic failure while protecting the API key empties that field
/// rather than surfacing an error — callers that need the distinction
/// use [`protect`] directly.
pub fn sanitize_settings(master: &MasterKey, raw: &RawSettings) -> Settings {
    let api_key = sanitize::text(raw.api_key.as_deref().unwrap_or_default());

    Settings {
        enable_feature: sanitize::flag(raw.enable_feature.as_deref()),
        plugin_mode: PluginMode::parse(raw.plugin_mode.as_deref()),
        cache_duration: sanitize::clamp_duration(
            raw.cache_duration.as_deref(),
            CACHE_DURATION_DEFAULT,
            CACHE_DURATION_MAX,
        ),
        api_key: protect(master, &api_key).unwrap_or_default(),
        debug_mode: sanitize::flag(raw.debug_mode.as_deref()),
        custom_css: sanitize::css(raw.custom_css.as_deref().unwrap_or_default()),
        enable_analytics: sanitize::flag(raw.enable_analytics.as_deref()),
        third_party_api_url: sanitize::absolute_url(
            raw.third_party_api_url.as_deref().unwrap_or_default(),
        ),
        webhook_url: sanitize::absolute_url(raw.webhook_url.as_deref().unwrap_or_default()),
    }
}

/// Open the protected API key stored in a bag.
///
/// An empty stored field yields an empty string; failures carry the
/// protection layer's error.
pub fn reveal_api_key(
    master: &MasterKey,
    settings: &Settings,
) -> Result<String, crate::error::OptsealError> {
    unprotect(master, &settings.api_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strong_key() -> MasterKey {
        MasterKey::new("an acceptable master key phrase, 32+ bytes long")
    }

    #[test]
    fn test_mode_whitelist() {
        assert_eq!(PluginMode::parse(Some("advanced")), PluginMode::Advanced);
        assert_eq!(PluginMode::parse(Some("pro")), PluginMode::Pro);
        assert_eq!(PluginMode::parse(Some("hacker")), PluginMode::Basic);
        assert_eq!(PluginMode::parse(None), PluginMode::Basic);
    }

    #[test]
    fn test_empty_input_yields_defaults() {
        let bag = sanitize_settings(&strong_key(), &RawSettings::default());
        assert_eq!(bag, Settings::default());
    }

    #[test]
    fn test_api_key_is_protected_in_bag() {
        let master = strong_key();
        let raw = RawSettings {
            api_key: Some("sk_live_abc123".into()),
            ..Default::default()
        };
        let bag = sanitize_settings(&master, &raw);
        assert_ne!(bag.api_key, "sk_live_abc123");
        assert!(!bag.api_key.is_empty());
        assert_eq!(reveal_api_key(&master, &bag).unwrap(), "sk_live_abc123");
    }

    #[test]
    fn test_api_key_markup_is_stripped_before_protection() {
        let master = strong_key();
        let raw = RawSettings {
            api_key: Some("<script>alert('xss')</script>sk_live".into()),
            ..Default::default()
        };
        let bag = sanitize_settings(&master, &raw);
        assert_eq!(reveal_api_key(&master, &bag).unwrap(), "sk_live");
    }

    #[test]
    fn test_settings_serde_roundtrip() {
        let master = strong_key();
        let raw = RawSettings {
            enable_feature: Some("1".into()),
            plugin_mode: Some("pro".into()),
            cache_duration: Some("120".into()),
            ..Default::default()
        };
        let bag = sanitize_settings(&master, &raw);
        let json = serde_json::to_string(&bag).unwrap();
        assert!(json.contains("\"pro\""));
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bag);
    }
}
