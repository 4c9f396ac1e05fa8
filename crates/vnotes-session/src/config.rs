//! Session configuration

use std::time::Duration;

/// Tunables for one editor session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay between autosave evaluations.
    pub autosave_interval: Duration,
    /// Consecutive save failures tolerated before editing is disabled.
    pub max_save_failures: u32,
    /// A save this long after the previous successful one always records a
    /// new backend revision, bounding how much history folds into one.
    pub max_revision_age: Duration,
    /// Event bus capacity per subscriber.
    pub event_capacity: usize,
}

impl SessionConfig {
    /// Create default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With autosave interval.
    #[inline]
    #[must_use]
    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave_interval = interval;
        self
    }

    /// With failure limit.
    #[inline]
    #[must_use]
    pub fn with_max_save_failures(mut self, limit: u32) -> Self {
        self.max_save_failures = limit;
        self
    }

    /// With revision age threshold.
    #[inline]
    #[must_use]
    pub fn with_max_revision_age(mut self, age: Duration) -> Self {
        self.max_revision_age = age;
        self
    }

    /// With event bus capacity.
    #[inline]
    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            autosave_interval: Duration::from_secs(15),
            max_save_failures: 5,
            max_revision_age: Duration::from_secs(60 * 60),
            event_capacity: 32,
        }
    }
}
