//! Single versus double click disambiguation.
//!
//! Poll-based: the host reports clicks and polls for a resolution. A click
//! resolves as single once the window passes without a second one. The
//! counter resets on every resolution.

use std::time::Duration;

use web_time::Instant;

/// A resolved click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Single,
    Double,
}

#[derive(Debug, Clone)]
pub struct ClickDisambiguator {
    window: Duration,
    count: u32,
    first_at: Option<Instant>,
}

impl ClickDisambiguator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            count: 0,
            first_at: None,
        }
    }

    /// Record a click now.
    pub fn click(&mut self) -> Option<Click> {
        self.click_at(Instant::now())
    }

    /// Record a click at `now`.
    ///
    /// Returns `Double` immediately for a second click inside the window.
    /// A first click stays pending until `poll_at` resolves it.
    pub fn click_at(&mut self, now: Instant) -> Option<Click> {
        if let Some(first) = self.first_at {
            if now.duration_since(first) > self.window {
                // The earlier click expired unpolled; start over from this one.
                self.reset();
            }
        }
        self.count += 1;
        if self.count >= 2 {
            self.reset();
            return Some(Click::Double);
        }
        self.first_at = Some(now);
        None
    }

    /// Resolve a pending click whose window has elapsed.
    pub fn poll(&mut self) -> Option<Click> {
        self.poll_at(Instant::now())
    }

    pub fn poll_at(&mut self, now: Instant) -> Option<Click> {
        let first = self.first_at?;
        if now.duration_since(first) <= self.window {
            return None;
        }
        self.reset();
        Some(Click::Single)
    }

    pub fn is_pending(&self) -> bool {
        self.first_at.is_some()
    }

    fn reset(&mut self) {
        self.count = 0;
        self.first_at = None;
    }
}
