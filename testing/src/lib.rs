//! # Cascade Testing
//!
//! Testing utilities and helpers for cascade reducers.
//!
//! This crate provides:
//! - Deterministic implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//! - Helpers that resolve effects into the actions they feed back
//!
//! ## Example
//!
//! ```ignore
//! use cascade_testing::{ReducerTest, test_clock};
//!
//! ReducerTest::new(SelectorReducer::new())
//!     .with_env(test_environment())
//!     .given_state(SelectorState::default())
//!     .when_action(SelectorAction::Initialize)
//!     .then_state(|state| assert!(state.regions.is_loading()))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use cascade_core::environment::Clock;


/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use cascade_testing::mocks::FixedClock;
    /// use cascade_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
pub use reducer_test::{ReducerTest, assertions, resolve_effects};
