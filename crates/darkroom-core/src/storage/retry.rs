//! Retry utilities for transient storage failures.
//!
//! Provides classification of retryable errors and exponential backoff.

use crate::error::StorageError;
use std::time::Duration;

/// Determine whether a storage error is worth retrying.
///
/// Retryable errors: timeouts, unreachable backends, rate limits (429), server
/// errors (5xx). Non-retryable: other rejections, invalid keys, local I/O.
pub fn is_retryable(error: &StorageError) -> bool {
    match error {
        StorageError::Timeout { .. } | StorageError::Unavailable(_) => true,
        StorageError::Rejected { status, .. } => *status == 429 || (500..=599).contains(status),
        StorageError::InvalidKey(_) | StorageError::Io(_) => false,
    }
}

/// Calculate exponential backoff duration for a given attempt.
///
/// Uses `base_delay * 2^attempt` with a cap at 30 seconds.
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(30_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(is_retryable(&StorageError::Timeout { timeout_ms: 30_000 }));
    }

    #[test]
    fn test_unavailable_is_retryable() {
        assert!(is_retryable(&StorageError::Unavailable(
            "connection refused".to_string()
        )));
    }

    #[test]
    fn test_rate_limit_and_server_errors_are_retryable() {
        for status in [429, 500, 502, 503, 599] {
            let err = StorageError::Rejected {
                status,
                message: "slow down".to_string(),
            };
            assert!(is_retryable(&err), "status {status}");
        }
    }

    #[test]
    fn test_client_errors_not_retryable() {
        for status in [400, 401, 403, 404, 413] {
            let err = StorageError::Rejected {
                status,
                message: "nope".to_string(),
            };
            assert!(!is_retryable(&err), "status {status}");
        }
        assert!(!is_retryable(&StorageError::InvalidKey("../x".to_string())));
        assert!(!is_retryable(&StorageError::Io("disk full".to_string())));
    }

    #[test]
    fn test_backoff_exponential() {
        assert_eq!(backoff_duration(0, 250), Duration::from_millis(250));
        assert_eq!(backoff_duration(1, 250), Duration::from_millis(500));
        assert_eq!(backoff_duration(2, 250), Duration::from_millis(1000));
    }

    #[test]
    fn test_backoff_capped_at_30s() {
        assert_eq!(backoff_duration(10, 1000), Duration::from_millis(30_000));
        assert_eq!(backoff_duration(u32::MAX, u64::MAX), Duration::from_millis(30_000));
    }
}
