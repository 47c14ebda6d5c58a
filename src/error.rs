use std::time::Duration;

use thiserror::Error;

/// Failures that can happen while building a throttled client.
///
/// Once a client exists nothing in the throttling path can fail; errors from
/// the wrapped transport are returned as-is and never end up in here.
#[derive(Debug, Error)]
pub enum ThrottleError {
    #[error("bucket capacity must be between 1 and {max}, got {0}", max = crate::throttle::token_bucket::MAX_CAPACITY)]
    InvalidCapacity(usize),

    #[error("refill period must be positive, got {0:?}")]
    InvalidPeriod(Duration),

    #[error("refill scheduler requires a running tokio runtime")]
    NoRuntime,

    #[error("malformed throttle configuration: {0}")]
    Config(#[from] envy::Error),
}
