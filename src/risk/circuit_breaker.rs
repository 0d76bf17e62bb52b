use std::time::Duration;

use tokio::time::Instant;

use super::SafetyLog;

/// Snapshot of the breaker. `tripped_at` is set iff `tripped` is true.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircuitBreakerState {
    pub tripped: bool,
    pub tripped_at: Option<Instant>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TripOutcome {
    /// Breaker went from armed to tripped; one reset is due at `reset_at`
    Tripped { reset_at: Instant },
    /// Breaker was already tripped; nothing changed and no new reset was scheduled
    AlreadyTripped,
}

/// Circuit breaker that halts trading after abnormal market conditions
///
/// Armed -> tripped on `trip`, tripped -> armed once the timeout has elapsed.
/// A trip while already tripped is ignored, so each trip episode has exactly one
/// pending reset at `tripped_at + timeout`. The breaker itself owns no timer; the
/// session schedules the reset from the returned `TripOutcome`.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    state: CircuitBreakerState,
    timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(timeout: Duration) -> Self {
        Self {
            state: CircuitBreakerState::default(),
            timeout,
        }
    }

    pub fn trip(&mut self, reason: &str, now: Instant, log: &mut SafetyLog) -> TripOutcome {
        if self.state.tripped {
            tracing::debug!(
                reason,
                existing = ?self.state.reason,
                "Circuit breaker already tripped, ignoring"
            );
            return TripOutcome::AlreadyTripped;
        }

        self.state = CircuitBreakerState {
            tripped: true,
            tripped_at: Some(now),
            reason: Some(reason.to_string()),
        };
        log.push(format!("Circuit breaker triggered: {}", reason));

        tracing::warn!(
            reason,
            timeout_secs = self.timeout.as_secs(),
            "🛑 Circuit breaker tripped"
        );

        TripOutcome::Tripped {
            reset_at: now + self.timeout,
        }
    }

    /// Re-arm the breaker. Returns false if it wasn't tripped.
    pub(crate) fn reset(&mut self, log: &mut SafetyLog) -> bool {
        if !self.state.tripped {
            return false;
        }

        self.state = CircuitBreakerState::default();
        log.push("Circuit breaker reset, trading resumed");
        tracing::info!("✅ Circuit breaker reset, trading resumed");
        true
    }

    /// When the pending reset is due, if tripped
    pub fn reset_at(&self) -> Option<Instant> {
        self.state.tripped_at.map(|at| at + self.timeout)
    }

    pub fn reset_due(&self, now: Instant) -> bool {
        self.reset_at().is_some_and(|at| now >= at)
    }

    pub fn is_tripped(&self) -> bool {
        self.state.tripped
    }

    pub fn state(&self) -> &CircuitBreakerState {
        &self.state
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(15 * 60);

    #[test]
    fn test_starts_armed() {
        let breaker = CircuitBreaker::new(TIMEOUT);
        assert!(!breaker.is_tripped());
        assert_eq!(breaker.state(), &CircuitBreakerState::default());
        assert!(breaker.reset_at().is_none());
    }

    #[test]
    fn test_trip_records_reason_and_time() {
        let mut breaker = CircuitBreaker::new(TIMEOUT);
        let mut log = SafetyLog::new(10);
        let now = Instant::now();

        let outcome = breaker.trip("Extreme price volatility detected", now, &mut log);

        assert_eq!(outcome, TripOutcome::Tripped { reset_at: now + TIMEOUT });
        assert!(breaker.is_tripped());
        assert_eq!(breaker.state().tripped_at, Some(now));
        assert_eq!(
            breaker.state().reason.as_deref(),
            Some("Extreme price volatility detected")
        );
        assert_eq!(
            log.last().unwrap().message,
            "Circuit breaker triggered: Extreme price volatility detected"
        );
    }

    #[test]
    fn test_second_trip_is_ignored() {
        let mut breaker = CircuitBreaker::new(TIMEOUT);
        let mut log = SafetyLog::new(10);
        let first = Instant::now();

        breaker.trip("Extreme price volatility detected", first, &mut log);
        let outcome = breaker.trip(
            "Unable to fetch market data",
            first + Duration::from_secs(60),
            &mut log,
        );

        assert_eq!(outcome, TripOutcome::AlreadyTripped);
        assert_eq!(log.len(), 1);
        assert_eq!(breaker.state().tripped_at, Some(first));
        assert_eq!(breaker.reset_at(), Some(first + TIMEOUT));
        assert_eq!(
            breaker.state().reason.as_deref(),
            Some("Extreme price volatility detected")
        );
    }

    #[test]
    fn test_reset_due_only_after_timeout() {
        let mut breaker = CircuitBreaker::new(TIMEOUT);
        let mut log = SafetyLog::new(10);
        let now = Instant::now();
        breaker.trip("test", now, &mut log);

        assert!(!breaker.reset_due(now + TIMEOUT - Duration::from_millis(1)));
        assert!(breaker.reset_due(now + TIMEOUT));
    }

    #[test]
    fn test_reset_clears_state_once() {
        let mut breaker = CircuitBreaker::new(TIMEOUT);
        let mut log = SafetyLog::new(10);
        breaker.trip("test", Instant::now(), &mut log);

        assert!(breaker.reset(&mut log));
        assert_eq!(breaker.state(), &CircuitBreakerState::default());
        assert_eq!(
            log.last().unwrap().message,
            "Circuit breaker reset, trading resumed"
        );

        // Nothing to reset the second time
        assert!(!breaker.reset(&mut log));
        assert_eq!(log.len(), 2);
    }
}
