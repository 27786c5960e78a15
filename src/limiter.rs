use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_PER_WINDOW: u32 = 6;

struct WindowSlot {
    started: Instant,
    count: u32,
}

/// Fixed-window rate limiter keyed by sender identity. Checked before any
/// translation work; a rejected message costs nothing downstream.
pub struct FixedWindowLimiter {
    window: Duration,
    max_per_window: u32,
    slots: Mutex<HashMap<String, WindowSlot>>,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_per_window: u32) -> Self {
        Self {
            window,
            max_per_window: max_per_window.max(1),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Records one message from `sender`; false means the sender exhausted
    /// the current window.
    pub fn allow(&self, sender: &str) -> bool {
        self.allow_at(sender, Instant::now())
    }

    fn allow_at(&self, sender: &str, now: Instant) -> bool {
        let mut slots = self.slots.lock().expect("limiter mutex");

        // Stale senders accumulate forever otherwise; contention is low so a
        // full sweep on this threshold is fine.
        if slots.len() > 1024 {
            let window = self.window;
            slots.retain(|_, slot| now.duration_since(slot.started) < window);
        }

        let slot = slots.entry(sender.to_string()).or_insert(WindowSlot {
            started: now,
            count: 0,
        });
        if now.duration_since(slot.started) >= self.window {
            slot.started = now;
            slot.count = 0;
        }
        if slot.count >= self.max_per_window {
            return false;
        }
        slot.count += 1;
        true
    }
}
