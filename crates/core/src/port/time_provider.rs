// Time Provider Port (for testability)

use chrono::NaiveDate;

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Current calendar day in the service's local time zone
    fn today(&self) -> NaiveDate;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    /// Manually driven clock
    pub struct FixedTimeProvider {
        millis: AtomicI64,
        today: Mutex<NaiveDate>,
    }

    impl FixedTimeProvider {
        pub fn new(millis: i64, today: NaiveDate) -> Self {
            Self {
                millis: AtomicI64::new(millis),
                today: Mutex::new(today),
            }
        }

        pub fn advance_millis(&self, delta: i64) {
            self.millis.fetch_add(delta, Ordering::SeqCst);
        }

        pub fn set_today(&self, today: NaiveDate) {
            *self.today.lock().unwrap() = today;
        }
    }

    impl TimeProvider for FixedTimeProvider {
        fn now_millis(&self) -> i64 {
            self.millis.load(Ordering::SeqCst)
        }

        fn today(&self) -> NaiveDate {
            *self.today.lock().unwrap()
        }
    }
}
