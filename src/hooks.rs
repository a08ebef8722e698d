//! Event subscription with priorities.
//!
//! A [`HookRegistry`] maps event names to ordered handler lists. Handlers
//! are registered once during startup and invoked with the sanitized
//! settings bag whenever the owning service dispatches the event. Lower
//! priority runs first; handlers sharing a priority run in registration
//! order.

use std::collections::HashMap;

use crate::settings::Settings;

/// Dispatched after a changed bag has been durably stored.
pub const SETTINGS_SAVED: &str = "settings_saved";

/// Default handler priority.
pub const DEFAULT_PRIORITY: i32 = 10;

type Handler = Box<dyn FnMut(&Settings) + Send>;

struct Entry {
    priority: i32,
    seq: u64,
    handler: Handler,
}

/// Event name to prioritized handler list.
#[derive(Default)]
pub struct HookRegistry {
    hooks: HashMap<String, Vec<Entry>>,
    next_seq: u64,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .hooks
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.len()))
            .collect();
        f.debug_struct("HookRegistry").field("hooks", &counts).finish()
    }
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `event` at [`DEFAULT_PRIORITY`].
    pub fn add(&mut self, event: &str, handler: impl FnMut(&Settings) + Send + 'static) {
        self.add_with_priority(event, DEFAULT_PRIORITY, handler);
    }

    /// Subscribe `handler` to `event` at an explicit priority.
    pub fn add_with_priority(
        &mut self,
        event: &str,
        priority: i32,
        handler: impl FnMut(&Settings) + Send + 'static,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let entries = self.hooks.entry(event.to_string()).or_default();
        entries.push(Entry {
            priority,
            seq,
            handler: Box::new(handler),
        });
        entries.sort_by_key(|entry| (entry.priority, entry.seq));
    }

    /// Invoke every handler subscribed to `event`, in priority order.
    /// Unknown events dispatch to nobody.
    pub fn run(&mut self, event: &str, settings: &Settings) {
        if let Some(entries) = self.hooks.get_mut(event) {
            for entry in entries.iter_mut() {
                (entry.handler)(settings);
            }
        }
    }

    /// Number of handlers subscribed to `event`.
    pub fn len(&self, event: &str) -> usize {
        self.hooks.get(event).map_or(0, Vec::len)
    }

    /// Whether `event` has no handlers.
    pub fn is_empty(&self, event: &str) -> bool {
        self.len(event) == 0
    }
}
