//! Request budget entity for externally rate-limited providers.

use chrono::{DateTime, Duration, Utc};

/// Persistent request counter for one upstream API.
///
/// Stored in the database rather than in memory so the budget survives
/// across independent invocations of a stateless worker. The limit and
/// window length are adapter configuration, not part of the stored state.
#[derive(Debug, Clone)]
pub struct RateBudget {
    pub name: String,
    pub window_start: DateTime<Utc>,
    pub request_count: i32,
    pub last_request: DateTime<Utc>,
}

impl RateBudget {
    /// True when the current window started more than `window` ago and the
    /// counter should be reset before further checks.
    pub fn window_elapsed(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.window_start >= window
    }

    /// True when the counter has reached the configured limit.
    pub fn is_exhausted(&self, limit: i32) -> bool {
        self.request_count >= limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_elapsed() {
        let now = Utc::now();
        let budget = RateBudget {
            name: "unsplash_api".to_string(),
            window_start: now - Duration::hours(2),
            request_count: 10,
            last_request: now,
        };

        assert!(budget.window_elapsed(now, Duration::hours(1)));
        assert!(!budget.window_elapsed(now, Duration::hours(3)));
    }

    #[test]
    fn test_is_exhausted() {
        let now = Utc::now();
        let budget = RateBudget {
            name: "unsplash_api".to_string(),
            window_start: now,
            request_count: 50,
            last_request: now,
        };

        assert!(budget.is_exhausted(50));
        assert!(!budget.is_exhausted(51));
    }
}
