//! Per-field input sanitizers.
//!
//! Every function here is a pure, panic-free mapping from raw external
//! input to a safe value. Nothing is reported on rejection — a field that
//! fails its rule collapses to a safe default (usually the empty string).
//! The CSS and URL rules are fail-closed on purpose: a legitimate value
//! that happens to collide with a dangerous pattern is discarded whole
//! rather than partially cleaned.

use std::net::{Ipv4Addr, Ipv6Addr};

use url::{Host, Url};

/// Substrings that disqualify a CSS field outright, matched
/// case-insensitively after markup stripping.
const CSS_DENY: &[&str] = &[
    "@import",
    "expression",
    "behavior",
    "javascript:",
    "document.",
    "window.",
    "eval(",
];

/// Coerce a presence-marker field to a boolean.
///
/// Transport sends booleans as named fields that are simply present or
/// absent. Absent, empty and `"0"` are all false.
pub fn flag(raw: Option<&str>) -> bool {
    matches!(raw, Some(value) if !value.is_empty() && value != "0")
}

/// Strip all markup from a string.
///
/// `<script>` and `<style>` elements are removed together with their
/// contents; any remaining tags are dropped; the result is trimmed. An
/// unterminated tag swallows the rest of the input.
pub fn strip_tags(raw: &str) -> String {
    let without_blocks = remove_element(&remove_element(raw, "script"), "style");

    let mut out = String::with_capacity(without_blocks.len());
    let mut rest = without_blocks.as_str();
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => rest = "",
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Remove `<name ...>...</name>` elements, content included,
/// case-insensitively. An unclosed element swallows the rest.
fn remove_element(input: &str, name: &str) -> String {
    // ASCII lowering keeps byte offsets aligned between the two strings.
    let lower = input.to_ascii_lowercase();
    let open_tag = format!("<{name}");
    let close_tag = format!("</{name}");

    let mut out = String::with_capacity(input.len());
    let mut pos = 0;
    while let Some(start) = lower[pos..].find(&open_tag) {
        let start = pos + start;
        out.push_str(&input[pos..start]);
        match lower[start..].find(&close_tag) {
            Some(close) => {
                let close = start + close;
                match lower[close..].find('>') {
                    Some(end) => pos = close + end + 1,
                    None => return out,
                }
            }
            None => return out,
        }
    }
    out.push_str(&input[pos..]);
    out
}

/// Sanitize a single-line text field: markup stripped, whitespace runs
/// collapsed to single spaces.
pub fn text(raw: &str) -> String {
    strip_tags(raw).split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Coerce a duration field to a non-negative number of seconds in
/// `[0, max]`.
///
/// An absent field takes `default`. A present field is parsed the way the
/// original option store did: leading integer, absolute value; a value
/// with no leading integer collapses to 0.
pub fn clamp_duration(raw: Option<&str>, default: u32, max: u32) -> u32 {
    let raw = match raw {
        Some(value) => value.trim(),
        None => return default.min(max),
    };
    leading_int(raw).unsigned_abs().min(u64::from(max)) as u32
}

/// Parse the leading integer of a string, `intval`-style: optional sign,
/// then digits, ignoring any trailing garbage. No digits parses as 0.
fn leading_int(value: &str) -> i64 {
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let parsed: i64 = match digits[..end].parse() {
        Ok(value) => value,
        // Digits present but too many of them: saturate, the caller clamps.
        Err(_) if end > 0 => i64::MAX,
        Err(_) => 0,
    };
    if negative {
        -parsed
    } else {
        parsed
    }
}

/// Sanitize a CSS field.
///
/// Markup is stripped first, then the remainder is scanned against the
/// deny-list: import directives, the `expression`/`behavior` execution
/// hooks, `javascript:` and non-image `data:` URIs, DOM globals, and any
/// `url()` reference that does not point at inline image data. One match
/// discards the entire field.
pub fn css(raw: &str) -> String {
    let stripped = strip_tags(raw);
    if stripped.is_empty() {
        return String::new();
    }

    let lower = stripped.to_ascii_lowercase();

    for needle in CSS_DENY {
        if lower.contains(needle) {
            return String::new();
        }
    }

    // data: URIs are only tolerated when they carry image payloads.
    let mut search = lower.as_str();
    while let Some(idx) = search.find("data:") {
        if !search[idx + "data:".len()..].starts_with("image") {
            return String::new();
        }
        search = &search[idx + "data:".len()..];
    }

    // Bare url() references: the argument must start with data:image,
    // optionally quoted.
    let mut search = lower.as_str();
    while let Some(idx) = search.find("url") {
        let after = search[idx + "url".len()..].trim_start();
        if let Some(arg) = after.strip_prefix('(') {
            let arg = arg.trim_start();
            let arg = arg
                .strip_prefix('"')
                .or_else(|| arg.strip_prefix('\''))
                .unwrap_or(arg)
                .trim_start();
            if !arg.starts_with("data:image") {
                return String::new();
            }
        }
        search = &search[idx + "url".len()..];
    }

    stripped
}

/// Sanitize an outbound URL field.
///
/// The value must parse as an absolute `http`/`https` URL with a host.
/// Hosts pointing into the local machine or private address space are
/// rejected to keep stored endpoints from being used for server-side
/// request forgery. This is address-shape filtering only — no DNS
/// resolution is performed, so a public name resolving to a private
/// address is not caught here.
pub fn absolute_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(_) => return String::new(),
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return String::new();
    }

    let blocked = match parsed.host() {
        None => true,
        Some(Host::Domain(domain)) => {
            domain.eq_ignore_ascii_case("localhost")
                || domain.to_lowercase().ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => blocked_ipv4(ip),
        Some(Host::Ipv6(ip)) => blocked_ipv6(ip),
    };

    if blocked {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Loopback, RFC1918 private, link-local and unspecified addresses.
fn blocked_ipv4(ip: Ipv4Addr) -> bool {
    ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
}

/// Loopback, unique-local (fc00::/7), link-local (fe80::/10) and
/// unspecified addresses.
fn blocked_ipv6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80
}
