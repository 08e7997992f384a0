//! # Circuit Breaker Module
//!
//! Stops hammering the order sheet once submissions keep failing. While the
//! breaker is open, submissions fail immediately and the user is asked to try
//! again later instead of waiting through a full retry cycle.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RetryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

/// Circuit breaker guarding order submission
///
/// # State Machine
///
/// - **Closed**: submissions pass through
/// - **Open**: `circuit_breaker_threshold` consecutive failures, submissions fail fast
/// - **Half-Open**: `circuit_breaker_reset_secs` elapsed, the next submission is let through
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    reset_after: Duration,
}

impl CircuitBreaker {
    /// Create a new circuit breaker from the retry settings
    ///
    /// # Examples
    ///
    /// ```rust
    /// use order_bot::config::RetryConfig;
    /// use order_bot::circuit_breaker::CircuitBreaker;
    ///
    /// let breaker = CircuitBreaker::new(&RetryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: config.circuit_breaker_threshold,
            reset_after: Duration::from_secs(config.circuit_breaker_reset_secs),
        }
    }

    /// Check if the circuit breaker is open (blocking submissions)
    ///
    /// Once the reset timeout has elapsed the failure count is cleared and the
    /// breaker reports closed again.
    pub fn is_open(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if state.failure_count >= self.threshold {
            if let Some(last_time) = state.last_failure_time {
                if last_time.elapsed() < self.reset_after {
                    return true;
                }
                *state = BreakerState::default();
            }
        }
        false
    }

    /// Record a failed submission
    pub fn record_failure(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.failure_count += 1;
        state.last_failure_time = Some(Instant::now());
    }

    /// Record a successful submission, closing the breaker
    pub fn record_success(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = BreakerState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: u32, reset_secs: u64) -> RetryConfig {
        RetryConfig {
            circuit_breaker_threshold: threshold,
            circuit_breaker_reset_secs: reset_secs,
            ..Default::default()
        }
    }

    #[test]
    fn test_opens_at_threshold() {
        let breaker = CircuitBreaker::new(&config(2, 60));
        assert!(!breaker.is_open());

        breaker.record_failure();
        assert!(!breaker.is_open());

        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn test_success_closes() {
        let breaker = CircuitBreaker::new(&config(1, 60));
        breaker.record_failure();
        assert!(breaker.is_open());

        breaker.record_success();
        assert!(!breaker.is_open());
    }

    #[test]
    fn test_half_open_after_reset_timeout() {
        let breaker = CircuitBreaker::new(&config(1, 0));
        breaker.record_failure();
        // A zero reset interval lets the next submission straight through.
        assert!(!breaker.is_open());
    }
}
