use crate::error::TransferError;
use std::time::Duration;

/// Attempts per download when nothing is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Give up; the error is final.
    NoRetry,
    /// Restart the transfer after the given delay.
    RetryAfter(Duration),
}

/// Fixed-ceiling retry policy. HTTP, network and stream failures are treated
/// the same; only storage failures stop early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Pause before each restart.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    /// `attempt` is 1-based (1 = first attempt).
    pub fn decide(&self, attempt: u32, err: &TransferError) -> RetryDecision {
        if attempt >= self.max_attempts || !err.is_retryable() {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn respects_max_attempts() {
        let p = RetryPolicy::default();
        let err = TransferError::Http(500);
        assert_eq!(p.decide(1, &err), RetryDecision::RetryAfter(Duration::ZERO));
        assert_eq!(p.decide(2, &err), RetryDecision::RetryAfter(Duration::ZERO));
        assert_eq!(p.decide(3, &err), RetryDecision::NoRetry);
    }

    #[test]
    fn client_errors_are_retried_too() {
        let p = RetryPolicy::default();
        assert!(matches!(
            p.decide(1, &TransferError::Http(404)),
            RetryDecision::RetryAfter(_)
        ));
    }

    #[test]
    fn save_failure_is_final() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, &TransferError::Save("read-only".into())),
            RetryDecision::NoRetry
        );
    }

    #[test]
    fn configured_delay_is_used() {
        let p = RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(40),
        };
        assert_eq!(
            p.decide(4, &TransferError::Stream("eof".into())),
            RetryDecision::RetryAfter(Duration::from_millis(40))
        );
        assert_eq!(
            p.decide(5, &TransferError::Stream("eof".into())),
            RetryDecision::NoRetry
        );
    }
}
