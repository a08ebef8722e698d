//! End-to-end save pipeline: checks, quota, acknowledgments, hooks,
//! persistence.

use std::sync::{Arc, Mutex};

use optseal::hooks::SETTINGS_SAVED;
use optseal::{
    generate_master_key, JsonFileStore, MemoryStore, RawSettings, RejectionKind, SaveAck,
    SaveRequest, Settings, SettingsService,
};

fn service() -> SettingsService<MemoryStore> {
    SettingsService::new(generate_master_key().unwrap(), MemoryStore::new())
}

fn valid_request() -> SaveRequest {
    SaveRequest {
        identity: "admin".into(),
        token_valid: true,
        can_manage: true,
        input: RawSettings::default(),
    }
}

#[test]
fn test_check_order_rate_limit_token_permission() {
    // Goal: the gates run in the endpoint's fixed order, so the first
    // failing gate names the rejection.
    let mut svc = service();

    let mut request = valid_request();
    request.token_valid = false;
    request.can_manage = false;
    assert_eq!(
        svc.save(&request).unwrap_err().kind,
        RejectionKind::SecurityCheck
    );

    let mut request = valid_request();
    request.can_manage = false;
    let rejection = svc.save(&request).unwrap_err();
    assert_eq!(rejection.kind, RejectionKind::Permission);
    assert_eq!(rejection.message, "Permission denied.");
}

#[test]
fn test_quota_exhaustion_rejects_with_rate_limit() {
    let mut svc = service();

    // The default limiter allows 10 recorded saves per minute. Saves of
    // an unchanged empty bag still count — quota is per attempt, not per
    // written change.
    for i in 0..10 {
        assert!(svc.save(&valid_request()).is_ok(), "save {i}");
    }
    let rejection = svc.save(&valid_request()).unwrap_err();
    assert_eq!(rejection.kind, RejectionKind::RateLimit);
    assert_eq!(rejection.message, "Too many requests. Please try again later.");
}

#[test]
fn test_unchanged_save_acknowledged_as_noop() {
    let mut svc = service();

    // First save writes the sanitized default bag.
    assert_eq!(svc.save(&valid_request()).unwrap(), SaveAck::Saved);
    // Saving identical input again stores an identical bag: the store
    // reports no write, the pipeline reads back and acknowledges.
    let ack = svc.save(&valid_request()).unwrap();
    assert_eq!(ack, SaveAck::Unchanged);
    assert_eq!(ack.message(), "No changes detected.");
}

#[test]
fn test_saved_hook_dispatched_with_sanitized_bag() {
    let mut svc = service();
    let seen: Arc<Mutex<Vec<Settings>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&seen);
    svc.hooks_mut().add(SETTINGS_SAVED, move |settings| {
        sink.lock().unwrap().push(settings.clone());
    });

    let mut request = valid_request();
    request.input.plugin_mode = Some("pro".into());
    request.input.custom_css = Some("@import url(evil.css);".into());
    svc.save(&request).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    // The hook receives the bag as stored: sanitized, not raw.
    assert_eq!(seen[0].plugin_mode.as_str(), "pro");
    assert_eq!(seen[0].custom_css, "");
}

#[test]
fn test_unchanged_save_does_not_dispatch_hook() {
    let mut svc = service();
    let count = Arc::new(Mutex::new(0));

    let sink = Arc::clone(&count);
    svc.hooks_mut().add(SETTINGS_SAVED, move |_| {
        *sink.lock().unwrap() += 1;
    });

    svc.save(&valid_request()).unwrap();
    svc.save(&valid_request()).unwrap();
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn test_file_store_persists_across_services() {
    let path = std::env::temp_dir().join(format!(
        "optseal-save-flow-{}.json",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    let master_bytes = *b"0123456789abcdef0123456789abcdef";

    {
        let master = optseal::MasterKey::from_bytes(master_bytes);
        let mut svc = SettingsService::new(master, JsonFileStore::new(&path));
        let mut request = valid_request();
        request.input.api_key = Some("sk_live_persisted".into());
        request.input.cache_duration = Some("7200".into());
        assert_eq!(svc.save(&request).unwrap(), SaveAck::Saved);
    }

    // A fresh service over the same file and master key sees the bag and
    // can open the protected key.
    let master = optseal::MasterKey::from_bytes(master_bytes);
    let svc = SettingsService::new(master, JsonFileStore::new(&path));
    let loaded = svc.load();
    assert_eq!(loaded.cache_duration, 7_200);
    assert_eq!(svc.reveal_api_key().unwrap(), "sk_live_persisted");

    let _ = std::fs::remove_file(&path);
}
