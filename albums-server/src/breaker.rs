//! Circuit breaker for store acquisition
//!
//! Counts consecutive acquisition failures across all requests. Once the
//! count reaches the threshold the breaker opens and requests fail fast
//! with 503 instead of piling onto a store that is down. After the cooldown
//! a single trial request is let through; its outcome closes or re-opens the circuit.
//!
//! - **Closed**: every acquisition allowed
//! - **Open**: acquisitions rejected until the cooldown elapses
//! - **Half-open**: one trial request in flight, everything else rejected

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default consecutive failures before opening.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Default time spent open before a trial request is allowed.
pub const DEFAULT_OPEN_DURATION: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy)]
pub struct BreakerPolicy {
    pub failure_threshold: u32,
    pub open_duration: Duration,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            open_duration: DEFAULT_OPEN_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// Outcome of asking the breaker for permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permit {
    Allowed,
    Rejected { remaining: Duration },
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    policy: BreakerPolicy,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(policy: BreakerPolicy) -> Self {
        // Zero would never let the circuit stay closed.
        let policy = BreakerPolicy {
            failure_threshold: policy.failure_threshold.max(1),
            ..policy
        };
        Self {
            policy,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Ask whether an acquisition may be attempted at `now`.
    pub fn check(&self, now: Instant) -> Permit {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Permit::Allowed,
            BreakerState::Open | BreakerState::HalfOpen => {
                // In half-open, `opened_at` is when the trial started; a trial
                // that never reported back (dropped request) is replaced once
                // the cooldown elapses again.
                let opened_at = inner.opened_at.unwrap_or(now);
                let elapsed = now.saturating_duration_since(opened_at);
                if elapsed >= self.policy.open_duration {
                    tracing::info!("circuit half-open, letting one request through");
                    inner.state = BreakerState::HalfOpen;
                    inner.opened_at = Some(now);
                    Permit::Allowed
                } else {
                    Permit::Rejected {
                        remaining: self.policy.open_duration - elapsed,
                    }
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != BreakerState::Closed {
            tracing::info!("circuit closed, store reachable again");
        }
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    pub fn record_failure(&self, now: Instant) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        let trip = match inner.state {
            BreakerState::HalfOpen => true,
            BreakerState::Closed => inner.consecutive_failures >= self.policy.failure_threshold,
            BreakerState::Open => false,
        };

        if trip {
            tracing::warn!(
                failures = inner.consecutive_failures,
                open_for_ms = self.policy.open_duration.as_millis() as u64,
                "circuit opened"
            );
            inner.state = BreakerState::Open;
            inner.opened_at = Some(now);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // State stays consistent across a poisoning panic: every write is a
        // single assignment.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerPolicy::default())
    }
}
